use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to get a Command for the complyguard binary.
#[allow(deprecated)]
fn complyguard_cmd() -> Command {
    Command::cargo_bin("complyguard").unwrap()
}

#[test]
fn help_works() {
    complyguard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("explain"))
        .stdout(predicate::str::contains("rulesets"))
        .stdout(predicate::str::contains("schema"));
}

#[test]
fn check_requires_inventory() {
    complyguard_cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--inventory"));
}
