//! Job card lifecycle and QC settlement tests

mod common;

use common::{
    create_test_employee, create_test_item, create_test_job, run_ok, setup_test_workshop,
    shopfloor,
};
use predicates::prelude::*;

// ============================================================================
// Creation and Lookup
// ============================================================================

#[test]
fn test_job_codes_are_sequential() {
    let tmp = setup_test_workshop();
    create_test_job(&tmp);
    create_test_job(&tmp);

    let listing = run_ok(&tmp, &["job", "list", "-f", "tsv"]);
    assert!(listing.contains("JC-0001"));
    assert!(listing.contains("JC-0002"));
}

#[test]
fn test_job_show_by_code() {
    let tmp = setup_test_workshop();
    let id = create_test_job(&tmp);

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "show", "jc-0001", "-f", "id"])
        .assert()
        .success()
        .stdout(format!("{}\n", id));

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "show", "JC-0001", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"Pending\""));
}

#[test]
fn test_job_with_unknown_employee_fails() {
    let tmp = setup_test_workshop();

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "new", "--employee", "Nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Employee not found"));
}

#[test]
fn test_job_zero_quantity_fails() {
    let tmp = setup_test_workshop();

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "new", "--qty", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quantity"));
}

// ============================================================================
// Status Workflow
// ============================================================================

#[test]
fn test_work_cycle_to_awaiting_qc() {
    let tmp = setup_test_workshop();
    create_test_job(&tmp);

    for (cmd, expected) in [
        ("start", "In Progress"),
        ("pause", "Paused"),
        ("resume", "In Progress"),
        ("submit", "Awaiting QC"),
    ] {
        shopfloor()
            .current_dir(tmp.path())
            .args(["job", cmd, "JC-0001"])
            .assert()
            .success()
            .stdout(predicate::str::contains(expected));
    }

    let shown = run_ok(&tmp, &["job", "show", "JC-0001", "-f", "json"]);
    assert!(shown.contains("\"status\": \"Awaiting QC\""));
    assert!(shown.contains("\"pausedAt\": null"));
}

#[test]
fn test_pause_pending_job_rejected() {
    let tmp = setup_test_workshop();
    create_test_job(&tmp);

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "pause", "JC-0001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status transition"));

    let shown = run_ok(&tmp, &["job", "show", "JC-0001", "-f", "json"]);
    assert!(shown.contains("\"status\": \"Pending\""));
}

#[test]
fn test_complete_only_through_qc() {
    let tmp = setup_test_workshop();
    create_test_job(&tmp);
    run_ok(&tmp, &["job", "start", "JC-0001"]);
    run_ok(&tmp, &["job", "submit", "JC-0001"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "status", "JC-0001", "complete"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status transition"));
}

#[test]
fn test_approve_requires_awaiting_qc() {
    let tmp = setup_test_workshop();
    create_test_job(&tmp);
    run_ok(&tmp, &["job", "start", "JC-0001"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "approve", "JC-0001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status transition"));
}

// ============================================================================
// Consumables and Settlement
// ============================================================================

#[test]
fn test_approve_deducts_stock_and_queues_reorder() {
    let tmp = setup_test_workshop();
    create_test_item(&tmp, "OAK", "raw-material", 10, 8, 20, 10.0);
    create_test_job(&tmp);

    run_ok(&tmp, &["job", "start", "JC-0001"]);
    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "consume", "JC-0001", "OAK", "--qty", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("uses 3"));
    run_ok(&tmp, &["job", "submit", "JC-0001"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "approve", "JC-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("approved"))
        .stdout(predicate::str::contains("Material: 30.00"))
        .stdout(predicate::str::contains("OAK: 10 → 7"))
        .stdout(predicate::str::contains("queued reorder for OAK"));

    let item = run_ok(&tmp, &["inv", "show", "OAK", "-f", "json"]);
    assert!(item.contains("\"currentStock\": 7"));

    let queue = run_ok(&tmp, &["queue", "list", "-f", "tsv"]);
    assert!(queue.contains("OAK"));
    assert!(queue.contains("pending"));
    // recommended = standard 20 - stock 7
    assert!(queue.contains("\t13\t"));

    let job = run_ok(&tmp, &["job", "show", "JC-0001", "-f", "json"]);
    assert!(job.contains("\"status\": \"Complete\""));
    assert!(job.contains("\"totalCost\": 30.0"));
}

#[test]
fn test_products_cannot_be_consumed() {
    let tmp = setup_test_workshop();
    create_test_item(&tmp, "CHAIR", "product", 2, 0, 0, 80.0);
    create_test_job(&tmp);

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "consume", "JC-0001", "CHAIR"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be consumed"));
}

#[test]
fn test_free_text_consumable_requires_price() {
    let tmp = setup_test_workshop();
    create_test_job(&tmp);

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "consume", "JC-0001", "sandpaper"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No inventory item matches"));

    run_ok(
        &tmp,
        &["job", "consume", "JC-0001", "sandpaper", "--qty", "2", "--price", "1.5"],
    );
    run_ok(&tmp, &["job", "start", "JC-0001"]);
    run_ok(&tmp, &["job", "submit", "JC-0001"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "approve", "JC-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Material: 3.00"));
}

#[test]
fn test_reject_records_reason_and_leaves_stock() {
    let tmp = setup_test_workshop();
    create_test_item(&tmp, "OAK", "raw-material", 10, 8, 20, 10.0);
    create_test_job(&tmp);
    run_ok(&tmp, &["job", "consume", "JC-0001", "OAK", "--qty", "3"]);
    run_ok(&tmp, &["job", "start", "JC-0001"]);
    run_ok(&tmp, &["job", "submit", "JC-0001"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "reject", "JC-0001", "--reason", "wrong finish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected: wrong finish"));

    let job = run_ok(&tmp, &["job", "show", "JC-0001", "-f", "json"]);
    assert!(job.contains("\"status\": \"Issue\""));
    assert!(job.contains("\"issueReason\": \"wrong finish\""));

    let item = run_ok(&tmp, &["inv", "show", "OAK", "-f", "json"]);
    assert!(item.contains("\"currentStock\": 10"));
}

#[test]
fn test_closed_job_rejects_consumables() {
    let tmp = setup_test_workshop();
    create_test_job(&tmp);
    run_ok(&tmp, &["job", "start", "JC-0001"]);
    run_ok(&tmp, &["job", "submit", "JC-0001"]);
    run_ok(&tmp, &["job", "approve", "JC-0001"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "consume", "JC-0001", "glue", "--price", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("closed"));
}

#[test]
fn test_rework_after_rejection() {
    let tmp = setup_test_workshop();
    create_test_job(&tmp);
    run_ok(&tmp, &["job", "start", "JC-0001"]);
    run_ok(&tmp, &["job", "submit", "JC-0001"]);
    run_ok(&tmp, &["job", "reject", "JC-0001", "-r", "scratched"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["job", "start", "JC-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("In Progress"));
}

#[test]
fn test_archive_and_report() {
    let tmp = setup_test_workshop();
    let emp = create_test_employee(&tmp, "Ada", 30.0);
    assert!(!emp.is_empty());
    create_test_item(&tmp, "PINE", "raw-material", 50, 5, 60, 4.0);

    run_ok(&tmp, &["job", "new", "--employee", "Ada"]);
    run_ok(&tmp, &["job", "consume", "JC-0001", "PINE", "--qty", "5"]);
    run_ok(&tmp, &["job", "start", "JC-0001"]);
    run_ok(&tmp, &["job", "submit", "JC-0001"]);
    run_ok(&tmp, &["job", "approve", "JC-0001"]);

    let report = run_ok(&tmp, &["job", "report", "-f", "tsv"]);
    assert!(report.contains("JC-0001"));
    assert!(report.contains("20.00"));

    run_ok(&tmp, &["job", "archive", "JC-0001"]);
    let report = run_ok(&tmp, &["job", "report", "-f", "tsv"]);
    assert!(report.contains("No settled jobs found."));
    let report = run_ok(&tmp, &["job", "report", "--all", "-f", "tsv"]);
    assert!(report.contains("Archived"));
}
