use crate::model::{
    ArtifactConfig, ComplyguardConfigV1, CustomRuleConfig, CustomRulesetConfig, LicenseValidatorToml,
    SCHEMA_CONFIG_V1, SecurityValidatorToml, SourceValidatorToml,
};
use crate::presets;
use crate::selector::{add_identities, parse_spec, parse_specs};
use anyhow::{Context, bail};
use complyguard_domain::policy::{
    ArtifactOverride, ComparePredicate, ConfiguredIssues, CustomCheck, CustomRule, CustomRuleset,
    EffectiveConfig, RulePolicy, Suppression, parse_any_severity,
};
use complyguard_domain_core::facts::{
    ArtifactFilename, ArtifactHomepage, ArtifactSourceUrl, ConfiguredLicenseInformation,
    CopyrightStatement, DeclaredLicenseInformation, IssueStatus, SecurityIssue,
};
use complyguard_domain_core::{
    Artifact, LicenseEntry, LicenseExpression, LicenseKnowledgeBase, flags,
};
use complyguard_types::{Severity, ids};
use std::collections::BTreeSet;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Analysis source recorded on artifacts declared in configuration.
const CONFIGURATION_SOURCE: &str = "configuration";

/// Command-line values that take precedence over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub fail_on: Option<String>,
    pub max_findings: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(
    cfg: ComplyguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != SCHEMA_CONFIG_V1
    {
        bail!("unsupported config schema: {schema} (expected {SCHEMA_CONFIG_V1})");
    }

    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "standard".to_string());

    let mut effective = presets::preset(&profile)?;

    // max findings
    if let Some(mf) = overrides.max_findings.or(cfg.max_findings) {
        effective.max_findings = mf as usize;
    }

    // fail_on: CLI beats file
    if let Some(fail_on_s) = overrides.fail_on.as_deref().or(cfg.fail_on.as_deref()) {
        effective.fail_on = fail_on_s
            .parse::<Severity>()
            .with_context(|| format!("invalid fail_on: {fail_on_s}"))?;
    }

    // rulesets
    if let Some(rulesets) = &cfg.policy.rulesets {
        if rulesets.is_empty() {
            bail!("policy.rulesets must name at least one ruleset");
        }
        effective.rulesets = rulesets.clone();
    }

    // per-rule overrides
    for (rule_id, rc) in &cfg.rules {
        let entry = effective
            .rules
            .entry(rule_id.clone())
            .or_insert(RulePolicy {
                enabled: true,
                severity: None,
            });
        if let Some(enabled) = rc.enabled {
            entry.enabled = enabled;
        }
        if let Some(sev) = rc.severity.as_deref() {
            entry.severity =
                Some(severity(sev).with_context(|| format!("invalid severity for {rule_id}"))?);
        }
    }

    for ruleset in &cfg.policy.custom_rulesets {
        effective.custom_rulesets.push(
            custom_ruleset(ruleset)
                .with_context(|| format!("invalid custom ruleset {}", ruleset.name))?,
        );
    }

    let kb = Arc::new(knowledge_base(&cfg)?);

    apply_license_validator(&mut effective, &cfg.validators.license, &kb)?;
    apply_security_validator(&mut effective, &cfg.validators.security)?;
    apply_source_validator(&mut effective, &cfg.validators.source)?;

    for (i, o) in cfg.overrides.iter().enumerate() {
        let selector = parse_spec(&o.selector).with_context(|| format!("invalid overrides[{i}]"))?;
        let artifact = build_artifact(Artifact::new(), &o.artifact)
            .with_context(|| format!("invalid overrides[{i}]"))?;
        effective.overrides.push(ArtifactOverride { selector, artifact });
    }

    for (i, a) in cfg.additions.iter().enumerate() {
        if a.coordinates.is_empty() && a.filename.is_none() {
            bail!("additions[{i}] needs coordinates or a filename");
        }
        let artifact = build_artifact(Artifact::from_source(CONFIGURATION_SOURCE), a)
            .with_context(|| format!("invalid additions[{i}]"))?;
        effective.additions.push(artifact);
    }

    for (i, r) in cfg.removals.iter().enumerate() {
        effective
            .removals
            .push(parse_spec(&r.selector).with_context(|| format!("invalid removals[{i}]"))?);
    }

    effective.knowledge_base = kb;

    Ok(ResolvedConfig { effective })
}

fn severity(v: &str) -> anyhow::Result<Severity> {
    match parse_any_severity(v) {
        Some(sev) => Ok(sev),
        None => bail!("unknown severity: {v} (expected info|warn|fail or warn|severe|critical)"),
    }
}

fn optional_severity(v: Option<&str>, key: &str) -> anyhow::Result<Option<Severity>> {
    v.map(|s| severity(s).with_context(|| format!("invalid {key}")))
        .transpose()
}

fn custom_ruleset(cfg: &CustomRulesetConfig) -> anyhow::Result<CustomRuleset> {
    if cfg.name == ids::RULESET_BASIC || cfg.name == ids::RULESET_LICENSING {
        bail!("custom ruleset name '{}' is reserved", cfg.name);
    }
    let rules = cfg
        .rules
        .iter()
        .map(|r| custom_rule(r).with_context(|| format!("invalid rule {}", r.id)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CustomRuleset {
        name: cfg.name.clone(),
        version: cfg.version.clone(),
        rules,
    })
}

fn custom_rule(cfg: &CustomRuleConfig) -> anyhow::Result<CustomRule> {
    let severity = match cfg.severity.as_deref().or(cfg.rule_severity.as_deref()) {
        Some(s) => severity(s)?,
        None => Severity::Warn,
    };
    let check = match (cfg.deny.is_empty(), cfg.compare.as_deref()) {
        (false, None) => CustomCheck::Deny(parse_specs(&cfg.deny)?),
        (true, Some(predicate)) => CustomCheck::Compare {
            predicate: predicate
                .parse::<ComparePredicate>()
                .map_err(anyhow::Error::msg)?,
            scope: parse_specs(&cfg.scope)?,
        },
        (false, Some(_)) => bail!("a rule takes either `deny` or `compare`, not both"),
        (true, None) => bail!("a rule needs `deny` selectors or a `compare` predicate"),
    };
    Ok(CustomRule {
        id: cfg.id.clone(),
        name: cfg.name.clone().unwrap_or_else(|| cfg.id.clone()),
        description: cfg.description.clone(),
        severity,
        check,
    })
}

fn knowledge_base(cfg: &ComplyguardConfigV1) -> anyhow::Result<LicenseKnowledgeBase> {
    let mut builder = LicenseKnowledgeBase::builder().defaults();
    for (id, lc) in &cfg.licenses {
        if id.trim().is_empty() {
            bail!("license ids must not be empty");
        }
        let mut entry = LicenseEntry::new(id.clone());
        entry.name = lc.name.clone();
        entry.text = lc.text.clone();
        entry.threat_group = lc.threat_group.clone();
        builder = builder.license(entry);
        for alias in &lc.aliases {
            builder = builder.alias(alias.clone(), id.clone());
        }
    }
    Ok(builder.build())
}

/// Canonical ids where the knowledge base knows the license.
fn canonical_ids(kb: &LicenseKnowledgeBase, ids: &[String]) -> BTreeSet<String> {
    ids.iter()
        .map(|id| kb.resolve(id).map_or_else(|| id.trim().to_string(), |e| e.id.clone()))
        .collect()
}

fn apply_license_validator(
    effective: &mut EffectiveConfig,
    cfg: &LicenseValidatorToml,
    kb: &LicenseKnowledgeBase,
) -> anyhow::Result<()> {
    let license = &mut effective.license;
    if let Some(enabled) = cfg.enabled {
        license.enabled = enabled;
    }
    license.forbidden.extend(canonical_ids(kb, &cfg.forbidden));
    license.ignored.extend(canonical_ids(kb, &cfg.ignored));
    if let Some(s) = optional_severity(cfg.forbidden_severity.as_deref(), "forbidden_severity")? {
        license.forbidden_severity = s;
    }
    if let Some(s) = optional_severity(cfg.missing_info_severity.as_deref(), "missing_info_severity")? {
        license.missing_info_severity = s;
    }
    if let Some(s) = optional_severity(cfg.missing_text_severity.as_deref(), "missing_text_severity")? {
        license.missing_text_severity = s;
    }
    Ok(())
}

fn issue_status(v: &str) -> anyhow::Result<IssueStatus> {
    match IssueStatus::parse(v) {
        Some(status) => Ok(status),
        None => bail!(
            "unknown issue status: {v} (expected open|acknowledged|confirmed|not_applicable|resolved)"
        ),
    }
}

fn apply_security_validator(
    effective: &mut EffectiveConfig,
    cfg: &SecurityValidatorToml,
) -> anyhow::Result<()> {
    let security = &mut effective.security;
    if let Some(enabled) = cfg.enabled {
        security.enabled = enabled;
    }
    for status in &cfg.forbidden_statuses {
        security.forbidden_statuses.push(issue_status(status)?);
    }
    if let Some(s) = optional_severity(cfg.status_severity.as_deref(), "status_severity")? {
        security.status_severity = s;
    }
    if let Some(limit) = cfg.severity_limit {
        if !limit.is_finite() || limit < 0.0 {
            bail!("severity_limit must be a non-negative number, got {limit}");
        }
        security.severity_limit = limit;
    }
    if let Some(s) = optional_severity(cfg.limit_severity.as_deref(), "limit_severity")? {
        security.limit_severity = s;
    }
    security
        .ignore_references
        .extend(cfg.ignore_references.iter().cloned());

    for (i, ic) in cfg.issues.iter().enumerate() {
        let selector = parse_spec(&ic.selector)
            .with_context(|| format!("invalid validators.security.issues[{i}]"))?;
        let mut issues = Vec::with_capacity(ic.issues.len());
        for issue in &ic.issues {
            let mut parsed = SecurityIssue::new(
                issue.reference.clone(),
                issue.severity,
                issue_status(&issue.status)?,
            );
            parsed.source = issue.source.clone();
            parsed.url = issue.url.clone();
            issues.push(parsed);
        }
        security.issues.push(ConfiguredIssues { selector, issues });
    }

    for (i, sc) in cfg.suppress.iter().enumerate() {
        let context = || format!("invalid validators.security.suppress[{i}]");
        security.suppressions.push(Suppression {
            reference: sc.reference.clone(),
            selector: parse_spec(&sc.selector).with_context(context)?,
            until: parse_until(&sc.until).with_context(context)?,
        });
    }
    Ok(())
}

fn apply_source_validator(
    effective: &mut EffectiveConfig,
    cfg: &SourceValidatorToml,
) -> anyhow::Result<()> {
    let source = &mut effective.source;
    if let Some(enabled) = cfg.enabled {
        source.enabled = enabled;
    }
    if let Some(s) = optional_severity(cfg.missing_severity.as_deref(), "missing_severity")? {
        source.missing_severity = s;
    }
    if let Some(s) = optional_severity(cfg.incomplete_severity.as_deref(), "incomplete_severity")? {
        source.incomplete_severity = s;
    }
    source.allow_missing.extend(
        parse_specs(&cfg.allow_missing).context("invalid validators.source.allow_missing")?,
    );
    source.allow_incomplete.extend(
        parse_specs(&cfg.allow_incomplete).context("invalid validators.source.allow_incomplete")?,
    );
    Ok(())
}

/// RFC 3339, or a plain `YYYY-MM-DD` meaning midnight UTC.
fn parse_until(v: &str) -> anyhow::Result<OffsetDateTime> {
    if let Ok(at) = OffsetDateTime::parse(v, &Rfc3339) {
        return Ok(at);
    }
    let date = Date::parse(v, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date: {v} (expected RFC 3339 or YYYY-MM-DD)"))?;
    Ok(date.midnight().assume_utc())
}

fn license(v: &str) -> anyhow::Result<LicenseExpression> {
    LicenseExpression::parse(v).with_context(|| format!("invalid license expression: {v}"))
}

fn build_artifact(mut artifact: Artifact, cfg: &ArtifactConfig) -> anyhow::Result<Artifact> {
    add_identities(&mut artifact, &cfg.coordinates)?;
    if let Some(filename) = &cfg.filename {
        artifact.add_fact(ArtifactFilename::new(filename));
    }
    if let Some(declared) = &cfg.declared_license {
        artifact.add_fact(DeclaredLicenseInformation::new(license(declared)?));
    }
    if let Some(configured) = &cfg.configured_license {
        artifact.add_fact(ConfiguredLicenseInformation::new(license(configured)?));
    }
    if let Some(copyright) = &cfg.copyright {
        artifact.add_fact(CopyrightStatement::new(copyright.clone()));
    }
    if let Some(url) = &cfg.source_url {
        artifact.add_fact(ArtifactSourceUrl(url.clone()));
    }
    if let Some(url) = &cfg.homepage {
        artifact.add_fact(ArtifactHomepage(url.clone()));
    }
    if let Some(proprietary) = cfg.proprietary {
        artifact.set_flag(flags::PROPRIETARY, proprietary);
    }
    if let Some(ignore) = cfg.ignore_for_download {
        artifact.set_flag(flags::IGNORE_FOR_DOWNLOAD, ignore);
    }
    Ok(artifact)
}
