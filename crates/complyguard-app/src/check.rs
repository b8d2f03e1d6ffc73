//! The `check` use case: read an inventory, run the pipeline and produce a report.

use anyhow::Context;
use camino::Utf8Path;
use complyguard_domain::{ProcessingReport, build_pipeline, build_report, fail_summary};
use complyguard_settings::{ComplyguardConfigV1, Overrides, ResolvedConfig};
use complyguard_types::{
    ComplyguardReport, ReportEnvelope, RunMeta, SCHEMA_REPORT_V1, ToolMeta, VerdictStatus,
};
use time::OffsetDateTime;
use tracing::{debug, info};

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Inventory document, or a directory of them.
    pub inventory_path: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    /// The generated report.
    pub report: ComplyguardReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
    /// Human-readable failure account, present only when the run failed.
    pub fail_summary: Option<String>,
}

/// Parse and resolve config text; empty text resolves the default profile.
pub fn load_config(config_text: &str, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    let cfg = if config_text.trim().is_empty() {
        ComplyguardConfigV1::default()
    } else {
        complyguard_settings::parse_config_toml(config_text).context("parse config")?
    };
    complyguard_settings::resolve_config(cfg, overrides).context("resolve config")
}

/// Run the check use case: resolve config, read inventory, evaluate policy, produce report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    let resolved = load_config(input.config_text, input.overrides.clone())?;
    let cfg = &resolved.effective;
    debug!(profile = %cfg.profile, fail_on = %cfg.fail_on, "configuration resolved");

    // Rulesets resolve before any artifact is read.
    let messages = ProcessingReport::new();
    let pipeline = build_pipeline(cfg, started_at, &messages).context("configure policy engine")?;

    let inventory = complyguard_inventory::read_inventory(input.inventory_path)
        .with_context(|| format!("read inventory {}", input.inventory_path))?;
    let result = pipeline.run(inventory.artifacts, &messages);

    let summary = result.fail_causing.as_ref().map(|causes| {
        let description = pipeline
            .rulesets()
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        fail_summary(&description, causes)
    });

    let domain = build_report(&result, &messages.messages(), pipeline.rulesets(), cfg);
    info!(
        verdict = ?domain.verdict.status,
        findings = domain.data.findings_total,
        "check finished"
    );

    let ended_at = OffsetDateTime::now_utc();
    let duration_ms = (ended_at - started_at).whole_milliseconds().max(0) as u64;

    let report = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "complyguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        run: RunMeta {
            started_at,
            ended_at: Some(ended_at),
            duration_ms: Some(duration_ms),
        },
        verdict: domain.verdict,
        findings: domain.findings,
        data: domain.data,
    };

    Ok(CheckOutput {
        report,
        resolved_config: resolved,
        fail_summary: summary,
    })
}

/// Map verdict status to process exit code.
pub fn verdict_exit_code(status: VerdictStatus) -> i32 {
    match status {
        VerdictStatus::Pass | VerdictStatus::Warn => 0,
        VerdictStatus::Fail => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use complyguard_types::{MessageType, ids};
    use tempfile::TempDir;

    const LICENSE_TEXTS: &str = r#"
[licenses.MIT]
text = "Permission is hereby granted"

[licenses."GPL-3.0-only"]
text = "GNU GENERAL PUBLIC LICENSE"
"#;

    fn write_inventory(tmp: &TempDir, json: &str) -> Utf8PathBuf {
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        let path = root.join("inventory.json");
        std::fs::write(&path, json).expect("write inventory");
        path
    }

    fn check(inventory: &Utf8Path, config_text: &str) -> anyhow::Result<CheckOutput> {
        run_check(CheckInput {
            inventory_path: inventory,
            config_text,
            overrides: Overrides::default(),
        })
    }

    #[test]
    fn clean_inventory_passes() {
        let tmp = TempDir::new().expect("temp dir");
        let path = write_inventory(
            &tmp,
            r#"[{"purls": ["pkg:generic/keep@1.0"], "declared_license": "MIT", "match_state": "exact"}]"#,
        );

        let output = check(&path, LICENSE_TEXTS).expect("run check");
        assert_eq!(output.report.schema, SCHEMA_REPORT_V1);
        assert_eq!(output.report.verdict.status, VerdictStatus::Pass);
        assert!(output.report.findings.is_empty());
        assert!(output.fail_summary.is_none());
        assert_eq!(output.report.data.artifacts_evaluated, 1);
        assert_eq!(output.report.data.profile, "standard");
        assert!(
            output
                .report
                .data
                .rulesets
                .iter()
                .any(|r| r.name == ids::VALIDATOR_LICENSE)
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let tmp = TempDir::new().expect("temp dir");
        let path = write_inventory(
            &tmp,
            r#"[{"purls": ["pkg:generic/keep@1.0"], "declared_license": "MIT", "match_state": "exact"}]"#,
        );

        let output = check(&path, "").expect("run check");
        assert_eq!(output.resolved_config.effective.profile, "standard");
        // Default knowledge base carries no license texts.
        assert_eq!(output.report.verdict.status, VerdictStatus::Warn);
        assert!(
            output
                .report
                .findings
                .iter()
                .all(|f| f.rule_id == ids::RULE_LICENSE_NO_TEXT)
        );
    }

    #[test]
    fn forbidden_license_fails_with_summary() {
        let tmp = TempDir::new().expect("temp dir");
        let path = write_inventory(
            &tmp,
            r#"[
                {"purls": ["pkg:generic/keep@1.0"], "declared_license": "MIT", "match_state": "exact"},
                {"purls": ["pkg:generic/gpl-lib@2.0"], "declared_license": "GPL-3.0-only", "match_state": "exact"}
            ]"#,
        );
        let config = format!("{LICENSE_TEXTS}\n[validators.license]\nforbidden = [\"GPL-3.0-only\"]\n");

        let output = check(&path, &config).expect("run check");
        let report = &output.report;
        assert_eq!(report.verdict.status, VerdictStatus::Fail);
        assert!(report.verdict.reasons.contains(&ids::RULE_LICENSE_FORBIDDEN.to_string()));
        let summary = output.fail_summary.expect("fail summary");
        assert!(summary.contains("pkg:generic/gpl-lib@2.0"));
        assert!(summary.ends_with("See generated report for details."));
        assert!(report.run.ended_at.is_some());
        assert!(
            report
                .findings
                .iter()
                .filter(|f| f.fail_causing)
                .all(|f| f.artifacts == vec!["pkg:generic/gpl-lib@2.0".to_string()])
        );
    }

    #[test]
    fn removals_are_reported_when_unnecessary() {
        let tmp = TempDir::new().expect("temp dir");
        let path = write_inventory(
            &tmp,
            r#"[{"purls": ["pkg:generic/keep@1.0"], "declared_license": "MIT", "match_state": "exact"}]"#,
        );
        let config = format!("{LICENSE_TEXTS}\n[[removals]]\nselector = \"generic:absent\"\n");

        let output = check(&path, &config).expect("run check");
        assert_eq!(output.report.verdict.status, VerdictStatus::Pass);
        assert!(
            output
                .report
                .data
                .messages
                .iter()
                .any(|m| m.kind == MessageType::UnnecessaryConfig)
        );
    }

    #[test]
    fn unknown_ruleset_is_an_error() {
        let tmp = TempDir::new().expect("temp dir");
        let path = write_inventory(&tmp, "[]");
        let err = check(&path, "[policy]\nrulesets = [\"nope\"]\n").expect_err("unknown ruleset");
        let text = format!("{err:#}");
        assert!(text.contains("configure policy engine"));
        assert!(text.contains("unknown ruleset 'nope'"));
    }

    #[test]
    fn ruleset_errors_win_over_inventory_errors() {
        let tmp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        let err = check(&root.join("absent.json"), "[policy]\nrulesets = [\"nope\"]\n")
            .expect_err("unknown ruleset");
        let text = format!("{err:#}");
        assert!(text.contains("unknown ruleset 'nope'"), "{text}");
        assert!(!text.contains("read inventory"), "{text}");
    }

    #[test]
    fn license_names_in_inventories_are_resolved() {
        let tmp = TempDir::new().expect("temp dir");
        let path = write_inventory(
            &tmp,
            r#"[{"purls": ["pkg:generic/named@1.0"], "declared_license": "The Apache Software License, Version 2.0", "match_state": "exact"}]"#,
        );

        let output = check(&path, LICENSE_TEXTS).expect("run check");
        let rule_ids: Vec<&str> = output.report.findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_ne!(output.report.verdict.status, VerdictStatus::Fail, "{rule_ids:?}");
        assert!(!rule_ids.contains(&ids::RULE_LICENSING_UNKNOWN_LICENSE), "{rule_ids:?}");
        assert!(!rule_ids.contains(&ids::RULE_LICENSE_NO_LICENSE), "{rule_ids:?}");
        // Canonicalized to Apache-2.0, which has no configured text.
        assert!(rule_ids.contains(&ids::RULE_LICENSE_NO_TEXT), "{rule_ids:?}");
    }

    #[test]
    fn missing_inventory_is_an_error() {
        let tmp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        let err = check(&root.join("absent.json"), "").expect_err("missing inventory");
        assert!(format!("{err:#}").contains("read inventory"));
    }

    #[test]
    fn verdict_exit_codes() {
        assert_eq!(verdict_exit_code(VerdictStatus::Pass), 0);
        assert_eq!(verdict_exit_code(VerdictStatus::Warn), 0);
        assert_eq!(verdict_exit_code(VerdictStatus::Fail), 2);
    }
}
