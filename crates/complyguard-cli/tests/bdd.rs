//! BDD test harness using cucumber-rs.
//!
//! Executes Gherkin feature files from `tests/features/` against the complyguard CLI.
//!
//! Run with: `cargo test --test bdd`

use assert_cmd::Command;
use complyguard_test_util::{finding_rule_ids, normalize_nondeterministic};
use cucumber::{World, given, then, when};
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test world that holds state between steps.
#[derive(Debug, Default, World)]
pub struct ComplyguardWorld {
    /// Scratch directory for generated inventories, configs and reports.
    temp_dir: Option<TempDir>,

    /// Inventory passed to `check`.
    inventory: Option<PathBuf>,

    /// Config passed via `--config`.
    config: Option<PathBuf>,

    /// Last command's exit code.
    exit_code: Option<i32>,

    /// Last command's stdout.
    stdout: String,

    /// Last command's stderr.
    stderr: String,

    /// Parsed JSON report (if any).
    report: Option<Value>,
}

impl ComplyguardWorld {
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .expect("complyguard-cli should have parent")
            .parent()
            .expect("crates should have parent")
            .join("tests")
            .join("fixtures")
    }

    #[allow(deprecated)]
    fn complyguard_cmd() -> Command {
        Command::cargo_bin("complyguard").expect("complyguard binary not found")
    }

    fn scratch(&mut self) -> PathBuf {
        self.temp_dir
            .get_or_insert_with(|| TempDir::new().expect("Failed to create temp dir"))
            .path()
            .to_path_buf()
    }

    fn report(&self) -> &Value {
        self.report.as_ref().expect("No report captured")
    }

    fn findings(&self) -> &Vec<Value> {
        self.report()["findings"]
            .as_array()
            .expect("Report should have findings array")
    }

    /// Run the binary with `args`; `check` gets the world's inventory and a
    /// scratch report path.
    fn run(&mut self, args: &[String]) {
        let scratch = self.scratch();
        let report_path = scratch.join("report.json");
        let _ = std::fs::remove_file(&report_path);

        let mut cmd = Self::complyguard_cmd();
        cmd.current_dir(&scratch);
        if let Some(config) = &self.config {
            cmd.arg("--config").arg(config);
        }
        cmd.args(args);
        if args.iter().any(|a| a == "check") {
            let inventory = self.inventory.clone().expect("No inventory given");
            cmd.arg("--inventory")
                .arg(inventory)
                .arg("--report-out")
                .arg(&report_path);
        }

        let output = cmd.output().expect("Failed to run command");
        self.exit_code = Some(output.status.code().unwrap_or(-1));
        self.stdout = String::from_utf8_lossy(&output.stdout).to_string();
        self.stderr = String::from_utf8_lossy(&output.stderr).to_string();
        self.report = std::fs::read_to_string(&report_path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .map(normalize_nondeterministic);
    }
}

fn docstring(step: &cucumber::gherkin::Step) -> String {
    step.docstring.clone().expect("step needs a docstring")
}

// =============================================================================
// Given steps - Setup
// =============================================================================

#[given(expr = "the fixture {string}")]
fn given_fixture(world: &mut ComplyguardWorld, name: String) {
    let fixture = ComplyguardWorld::fixtures_dir().join(&name);
    assert!(fixture.exists(), "Fixture '{name}' not found at {fixture:?}");
    world.inventory = Some(fixture.join("inventory.json"));
    let config = fixture.join("complyguard.toml");
    if config.exists() {
        world.config = Some(config);
    }
}

#[given("an inventory:")]
fn given_inventory(world: &mut ComplyguardWorld, step: &cucumber::gherkin::Step) {
    let path = world.scratch().join("inventory.json");
    std::fs::write(&path, docstring(step)).expect("write inventory");
    world.inventory = Some(path);
}

#[given("the configuration:")]
fn given_configuration(world: &mut ComplyguardWorld, step: &cucumber::gherkin::Step) {
    let path = world.scratch().join("complyguard.toml");
    std::fs::write(&path, docstring(step)).expect("write config");
    world.config = Some(path);
}

// =============================================================================
// When steps - Actions
// =============================================================================

#[when("I run the check")]
fn when_run_check(world: &mut ComplyguardWorld) {
    world.run(&["check".to_string()]);
}

#[when(expr = "I run the check with {string}")]
fn when_run_check_with(world: &mut ComplyguardWorld, options: String) {
    let mut args: Vec<String> = options.split_whitespace().map(str::to_string).collect();
    args.push("check".to_string());
    world.run(&args);
}

#[when(expr = "I run {string}")]
fn when_run_command(world: &mut ComplyguardWorld, command: String) {
    let parts: Vec<String> = command.split_whitespace().map(str::to_string).collect();
    assert_eq!(
        parts.first().map(String::as_str),
        Some("complyguard"),
        "Command must start with 'complyguard'"
    );
    world.run(&parts[1..]);
}

// =============================================================================
// Then steps - Assertions
// =============================================================================

#[then(expr = "the exit code is {int}")]
fn then_exit_code_is(world: &mut ComplyguardWorld, expected: i32) {
    let actual = world.exit_code.expect("No exit code captured");
    assert_eq!(
        actual, expected,
        "Expected exit code {expected}, got {actual}. stderr: {}",
        world.stderr
    );
}

#[then(expr = "the verdict is {string}")]
fn then_verdict_is(world: &mut ComplyguardWorld, expected: String) {
    let status = world.report()["verdict"]["status"]
        .as_str()
        .expect("Report should have verdict status");
    assert_eq!(status, expected);
}

#[then("the report has no findings")]
fn then_no_findings(world: &mut ComplyguardWorld) {
    assert!(
        world.findings().is_empty(),
        "Expected no findings, got {:?}",
        world.findings()
    );
}

#[then(expr = "the report contains exactly {int} findings")]
fn then_exactly_findings(world: &mut ComplyguardWorld, expected: usize) {
    assert_eq!(world.findings().len(), expected, "{:?}", world.findings());
}

#[then(expr = "a finding is emitted for rule {string}")]
fn then_finding_for_rule(world: &mut ComplyguardWorld, rule_id: String) {
    let ids = finding_rule_ids(world.report());
    assert!(ids.contains(&rule_id), "No {rule_id} finding in {ids:?}");
}

#[then(expr = "no finding is emitted for rule {string}")]
fn then_no_finding_for_rule(world: &mut ComplyguardWorld, rule_id: String) {
    let ids = finding_rule_ids(world.report());
    assert!(!ids.contains(&rule_id), "Unexpected {rule_id} finding in {ids:?}");
}

#[then(expr = "the {string} finding blames {string}")]
fn then_finding_blames(world: &mut ComplyguardWorld, rule_id: String, artifact: String) {
    let blamed = world
        .findings()
        .iter()
        .filter(|f| f["rule_id"] == rule_id.as_str())
        .any(|f| {
            f["artifacts"]
                .as_array()
                .is_some_and(|a| a.iter().any(|v| v == artifact.as_str()))
        });
    assert!(blamed, "No {rule_id} finding blames {artifact}");
}

#[then(expr = "all findings have severity {string}")]
fn then_all_findings_severity(world: &mut ComplyguardWorld, severity: String) {
    for finding in world.findings() {
        assert_eq!(finding["severity"], severity.as_str(), "{finding}");
    }
}

#[then(expr = "the verdict reasons include {string}")]
fn then_reasons_include(world: &mut ComplyguardWorld, rule_id: String) {
    let reasons = world.report()["verdict"]["reasons"]
        .as_array()
        .expect("reasons");
    assert!(reasons.iter().any(|r| r == rule_id.as_str()), "{reasons:?}");
}

#[then(expr = "the report lists a {string} message")]
fn then_report_message_kind(world: &mut ComplyguardWorld, kind: String) {
    let messages = world.report()["data"]["messages"]
        .as_array()
        .expect("messages");
    assert!(
        messages.iter().any(|m| m["kind"] == kind.as_str()),
        "No {kind} message in {messages:?}"
    );
}

#[then(expr = "the report has field {string} with value {string}")]
fn then_report_field(world: &mut ComplyguardWorld, pointer: String, expected: String) {
    let value = world
        .report()
        .pointer(&pointer)
        .unwrap_or_else(|| panic!("Report has no field {pointer}"));
    let actual = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    assert_eq!(actual, expected, "field {pointer}");
}

#[then(expr = "stdout contains {string}")]
fn then_stdout_contains(world: &mut ComplyguardWorld, needle: String) {
    assert!(
        world.stdout.contains(&needle),
        "stdout does not contain '{needle}':\n{}",
        world.stdout
    );
}

#[then(expr = "stderr contains {string}")]
fn then_stderr_contains(world: &mut ComplyguardWorld, needle: String) {
    assert!(
        world.stderr.contains(&needle),
        "stderr does not contain '{needle}':\n{}",
        world.stderr
    );
}

// =============================================================================
// Main entry point
// =============================================================================

fn main() {
    let features_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("cli crate should have parent")
        .parent()
        .expect("crates should have parent")
        .join("tests")
        .join("features");

    futures::executor::block_on(ComplyguardWorld::cucumber().run_and_exit(features_dir));
}
