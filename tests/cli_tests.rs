//! CLI and basic command tests

mod common;

use common::{setup_test_workshop, shopfloor};
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    shopfloor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("job cards"));
}

#[test]
fn test_version_displays() {
    shopfloor()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shopfloor"));
}

#[test]
fn test_unknown_command_fails() {
    shopfloor()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_workshop_structure() {
    let tmp = TempDir::new().unwrap();

    shopfloor()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".shopfloor").is_dir());
    assert!(tmp.path().join(".shopfloor/config.yaml").is_file());
    assert!(tmp.path().join(".shopfloor/shop.db").is_file());
}

#[test]
fn test_init_twice_fails() {
    let tmp = setup_test_workshop();

    shopfloor()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn test_init_at_path() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("shop");
    std::fs::create_dir(&target).unwrap();

    shopfloor()
        .current_dir(tmp.path())
        .args(["init", "shop"])
        .assert()
        .success();

    assert!(target.join(".shopfloor/shop.db").is_file());
}

#[test]
fn test_command_outside_workshop_fails() {
    let tmp = TempDir::new().unwrap();

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not inside a shopfloor workshop"));
}

#[test]
fn test_workshop_flag_from_other_directory() {
    let tmp = setup_test_workshop();
    let elsewhere = TempDir::new().unwrap();

    shopfloor()
        .current_dir(elsewhere.path())
        .args(["-C", tmp.path().to_str().unwrap(), "job", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_discovers_workshop_from_subdirectory() {
    let tmp = setup_test_workshop();
    let nested = tmp.path().join("bench/left");
    std::fs::create_dir_all(&nested).unwrap();

    shopfloor()
        .current_dir(&nested)
        .args(["inv", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_empty_lists_report_nothing_found() {
    let tmp = setup_test_workshop();

    shopfloor()
        .current_dir(tmp.path())
        .args(["sup", "list", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No suppliers found."));
}

#[test]
fn test_completions_bash() {
    shopfloor()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shopfloor"));
}

#[test]
fn test_verbose_logging_goes_to_stderr() {
    let tmp = setup_test_workshop();

    shopfloor()
        .current_dir(tmp.path())
        .args(["-vv", "job", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n")
        .stderr(predicate::str::contains("Store opened"));
}

// ============================================================================
// Directory Tests
// ============================================================================

#[test]
fn test_supplier_create_and_show() {
    let tmp = setup_test_workshop();

    shopfloor()
        .current_dir(tmp.path())
        .args(["sup", "new", "--name", "Timber Co", "--eta", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created supplier"));

    shopfloor()
        .current_dir(tmp.path())
        .args(["sup", "show", "timber co", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"etaDays\": 5"));
}

#[test]
fn test_employee_rate_must_not_be_negative() {
    let tmp = setup_test_workshop();

    shopfloor()
        .current_dir(tmp.path())
        .args(["emp", "new", "--name", "Ada", "--rate=-5"])
        .assert()
        .failure();

    shopfloor()
        .current_dir(tmp.path())
        .args(["emp", "list", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No employees found."));
}
