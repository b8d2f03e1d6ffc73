//! The `rulesets` use case: list the rulesets a configuration makes available.

use crate::check::load_config;
use complyguard_domain::checks::{RulesetInfo, catalog};
use complyguard_settings::Overrides;

/// Output from the rulesets use case.
#[derive(Clone, Debug)]
pub struct RulesetsOutput {
    pub rulesets: Vec<RulesetInfo>,
    /// Ruleset ids the rule engine runs under this configuration.
    pub selected: Vec<String>,
}

/// Rulesets (built-in and custom) with their rules at the configured severities.
///
/// Disabled rules are left out.
pub fn run_rulesets(config_text: &str, overrides: Overrides) -> anyhow::Result<RulesetsOutput> {
    let resolved = load_config(config_text, overrides)?;
    Ok(RulesetsOutput {
        rulesets: catalog(&resolved.effective),
        selected: resolved.effective.rulesets,
    })
}

/// Format the ruleset listing for terminal display; `selected` marks the
/// rulesets the rule engine runs.
pub fn format_rulesets(rulesets: &[RulesetInfo], selected: &[String]) -> String {
    let mut out = String::new();
    for ruleset in rulesets {
        let marker = if selected.contains(&ruleset.name) { "*" } else { " " };
        out.push_str(&format!("{marker} {} {}\n", ruleset.name, ruleset.version));
        for rule in &ruleset.rules {
            out.push_str(&format!(
                "    {:<40} {:<7} {:<5} {}\n",
                rule.id,
                rule.kind,
                rule.severity.as_str(),
                rule.description
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use complyguard_types::{Severity, ids};

    #[test]
    fn lists_builtin_and_custom_rulesets() {
        let config = r#"
[rules."basic.unknown_match_state"]
enabled = false

[rules."licensing.unknown_license"]
severity = "critical"

[[policy.custom_rulesets]]
name = "house"

[[policy.custom_rulesets.rules]]
id = "house.no_internal"
description = "internal builds stay out"
deny = ["generic:internal-*"]
"#;
        let output = run_rulesets(config, Overrides::default()).expect("rulesets");
        assert!(!output.selected.contains(&"house".to_string()));
        let rulesets = output.rulesets;
        let names: Vec<&str> = rulesets.iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&ids::RULESET_BASIC));
        assert!(names.contains(&ids::RULESET_LICENSING));
        assert!(names.contains(&"house"));

        let basic = rulesets.iter().find(|r| r.name == ids::RULESET_BASIC).expect("basic");
        assert!(basic.rules.iter().all(|r| r.id != ids::RULE_BASIC_UNKNOWN_MATCH_STATE));

        let licensing = rulesets
            .iter()
            .find(|r| r.name == ids::RULESET_LICENSING)
            .expect("licensing");
        let unknown = licensing
            .rules
            .iter()
            .find(|r| r.id == ids::RULE_LICENSING_UNKNOWN_LICENSE)
            .expect("unknown license rule");
        assert_eq!(unknown.severity, Severity::Fail);
    }

    #[test]
    fn format_marks_selected_rulesets() {
        let output = run_rulesets("", Overrides::default()).expect("rulesets");
        assert_eq!(output.selected, vec![ids::RULESET_BASIC, ids::RULESET_LICENSING]);
        let text = format_rulesets(&output.rulesets, &[ids::RULESET_BASIC.to_string()]);
        assert!(text.contains("* basic 1.0.0\n"));
        assert!(text.contains("  licensing 1.0.0\n"));
        assert!(text.contains(ids::RULE_BASIC_DUPLICATE_ARTIFACT));
    }
}
