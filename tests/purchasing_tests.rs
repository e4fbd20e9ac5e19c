//! Purchase queue command tests

mod common;

use common::{create_test_item, create_test_supplier, run_ok, setup_test_workshop, shopfloor};
use predicates::prelude::*;
use tempfile::TempDir;

fn workshop_with_low_oak() -> TempDir {
    let tmp = setup_test_workshop();
    create_test_item(&tmp, "OAK", "raw-material", 3, 8, 20, 10.0);
    tmp
}

#[test]
fn test_add_request() {
    let tmp = workshop_with_low_oak();

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "add", "OAK"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created purchase request"))
        .stdout(predicate::str::contains("Recommended order: 17 pcs"));

    let listing = run_ok(&tmp, &["queue", "list", "-f", "tsv"]);
    assert!(listing.contains("OAK\tOAK stock\tpending\t3\t8\t17"));
}

#[test]
fn test_add_request_is_deduplicated() {
    let tmp = workshop_with_low_oak();
    run_ok(&tmp, &["queue", "add", "OAK"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "add", "OAK"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already has an open request"));

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_order_with_supplier_and_override() {
    let tmp = workshop_with_low_oak();
    create_test_supplier(&tmp, "Timber Co", 5);
    run_ok(&tmp, &["queue", "add", "OAK"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "order", "OAK", "--supplier", "Timber Co", "--qty", "OAK=25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ordered 25"));

    let shown = run_ok(&tmp, &["queue", "list", "-s", "ordered", "-f", "json"]);
    assert!(shown.contains("\"status\": \"ordered\""));
    assert!(shown.contains("\"orderedQty\": 25"));
    assert!(shown.contains("\"expectedArrivalDate\""));
}

#[test]
fn test_order_all_pending() {
    let tmp = workshop_with_low_oak();
    create_test_item(&tmp, "PINE", "raw-material", 1, 5, 10, 4.0);
    run_ok(&tmp, &["queue", "add", "OAK"]);
    run_ok(&tmp, &["queue", "add", "PINE"]);

    run_ok(&tmp, &["queue", "order", "--all"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "list", "-s", "ordered", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_order_negative_override_rejected() {
    let tmp = workshop_with_low_oak();
    run_ok(&tmp, &["queue", "add", "OAK"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "order", "OAK", "--qty", "OAK=-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quantity"));

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "list", "-s", "pending", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_receive_adds_stock_and_completes() {
    let tmp = workshop_with_low_oak();
    run_ok(&tmp, &["queue", "add", "OAK"]);
    run_ok(&tmp, &["queue", "order", "OAK"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "receive", "OAK", "17"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Received 17"));

    let item = run_ok(&tmp, &["inv", "show", "OAK", "-f", "json"]);
    assert!(item.contains("\"currentStock\": 20"));

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "list", "-s", "completed", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_receive_zero_rejected() {
    let tmp = workshop_with_low_oak();
    run_ok(&tmp, &["queue", "add", "OAK"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "receive", "OAK", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quantity"));

    let item = run_ok(&tmp, &["inv", "show", "OAK", "-f", "json"]);
    assert!(item.contains("\"currentStock\": 3"));
}

#[test]
fn test_unknown_entry() {
    let tmp = setup_test_workshop();

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "receive", "NOPE", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Purchase request not found"));
}

#[test]
fn test_cancel_requeues_low_item() {
    let tmp = workshop_with_low_oak();
    run_ok(&tmp, &["queue", "add", "OAK"]);
    run_ok(&tmp, &["queue", "order", "OAK"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "cancel", "OAK", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("returned to pending"));

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "list", "-s", "pending", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_cancel_drops_request_when_stock_recovered() {
    let tmp = workshop_with_low_oak();
    run_ok(&tmp, &["queue", "add", "OAK"]);
    run_ok(&tmp, &["inv", "adjust", "OAK", "10"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "cancel", "OAK", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "list", "-s", "all", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_remove_only_pending() {
    let tmp = workshop_with_low_oak();
    run_ok(&tmp, &["queue", "add", "OAK"]);
    run_ok(&tmp, &["queue", "order", "OAK"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "remove", "OAK", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected pending"));
}

#[test]
fn test_export_csv_to_file() {
    let tmp = workshop_with_low_oak();
    run_ok(&tmp, &["queue", "add", "OAK"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "export", "--output", "queue.csv"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Exported 1 request(s)"));

    let csv = std::fs::read_to_string(tmp.path().join("queue.csv")).unwrap();
    assert!(csv.starts_with("id,item_code,item_name"));
    assert!(csv.contains(",OAK,OAK stock,Raw Material,pending,3,"));
}

#[test]
fn test_export_csv_to_stdout_filtered() {
    let tmp = workshop_with_low_oak();
    run_ok(&tmp, &["queue", "add", "OAK"]);

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "export", "--status", "pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OAK"));

    shopfloor()
        .current_dir(tmp.path())
        .args(["queue", "export", "--status", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OAK").not());
}
