use anyhow::Context;
use camino::Utf8Path;
use complyguard_types::{
    ComplyguardData, ComplyguardReport, Finding, ReportEnvelope, RunMeta, SCHEMA_REPORT_V1,
    Severity, ToolMeta, Verdict, VerdictCounts, VerdictStatus, ids,
};
use time::OffsetDateTime;

pub fn serialize_report(report: &ComplyguardReport) -> anyhow::Result<Vec<u8>> {
    let mut data = serde_json::to_vec_pretty(report).context("serialize complyguard report")?;
    data.push(b'\n');
    Ok(data)
}

pub fn parse_report_json(text: &str) -> anyhow::Result<ComplyguardReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;
    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema} (expected {SCHEMA_REPORT_V1})");
    }
    serde_json::from_value(value).context("parse complyguard report")
}

/// Write the report as pretty JSON, creating parent directories.
pub fn write_report(path: &Utf8Path, report: &ComplyguardReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    let data = serialize_report(report)?;
    std::fs::write(path, data).with_context(|| format!("write report: {path}"))?;
    Ok(())
}

/// A failing report for runs that could not be evaluated (bad config, unreadable inventory).
pub fn runtime_error_report(profile: &str, message: &str) -> ComplyguardReport {
    let now = OffsetDateTime::now_utc();
    ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "complyguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        run: RunMeta {
            started_at: now,
            ended_at: Some(now),
            duration_ms: Some(0),
        },
        verdict: Verdict {
            status: VerdictStatus::Fail,
            counts: VerdictCounts {
                info: 0,
                warn: 0,
                fail: 1,
            },
            reasons: vec![ids::RULE_TOOL_RUNTIME.to_string()],
        },
        findings: vec![Finding {
            severity: Severity::Fail,
            rule_id: ids::RULE_TOOL_RUNTIME.to_string(),
            ruleset: None,
            message: message.to_string(),
            artifacts: Vec::new(),
            fail_causing: true,
            fingerprint: None,
        }],
        data: ComplyguardData {
            profile: profile.to_string(),
            findings_total: 1,
            findings_emitted: 1,
            ..ComplyguardData::default()
        },
    }
}
