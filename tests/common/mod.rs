//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get a shopfloor command
pub fn shopfloor() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("shopfloor"));
    cmd.env_remove("SHOPFLOOR_WORKSHOP")
        .env_remove("SHOPFLOOR_DB")
        .env_remove("SHOPFLOOR_LOG");
    cmd
}

/// Helper to create a test workshop in a temp directory
pub fn setup_test_workshop() -> TempDir {
    let tmp = TempDir::new().unwrap();
    shopfloor()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

/// Run a command with `-f id` and return the single ID it prints
fn created_id(tmp: &TempDir, args: &[&str]) -> String {
    let output = shopfloor()
        .current_dir(tmp.path())
        .args(args)
        .args(["-f", "id"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create an inventory item
pub fn create_test_item(
    tmp: &TempDir,
    code: &str,
    category: &str,
    stock: i64,
    reorder: i64,
    standard: i64,
    price: f64,
) -> String {
    created_id(
        tmp,
        &[
            "inv",
            "new",
            "--code",
            code,
            "--name",
            &format!("{} stock", code),
            "--category",
            category,
            "--stock",
            &stock.to_string(),
            "--reorder",
            &reorder.to_string(),
            "--standard",
            &standard.to_string(),
            "--price",
            &price.to_string(),
        ],
    )
}

/// Helper to create a job card
pub fn create_test_job(tmp: &TempDir) -> String {
    created_id(tmp, &["job", "new", "--qty", "1"])
}

/// Helper to create a supplier
pub fn create_test_supplier(tmp: &TempDir, name: &str, eta: u32) -> String {
    created_id(
        tmp,
        &["sup", "new", "--name", name, "--eta", &eta.to_string()],
    )
}

/// Helper to create an employee
pub fn create_test_employee(tmp: &TempDir, name: &str, rate: f64) -> String {
    created_id(
        tmp,
        &["emp", "new", "--name", name, "--rate", &rate.to_string()],
    )
}

/// Run a command in the workshop and return its stdout
pub fn run_ok(tmp: &TempDir, args: &[&str]) -> String {
    let output = shopfloor()
        .current_dir(tmp.path())
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}
