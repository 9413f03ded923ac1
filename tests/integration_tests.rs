//! Integration tests for the ptrack CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a ptrack command isolated from the user's config and env
fn ptrack(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ptrack").unwrap();
    let home = tmp.path().join(".home");
    cmd.current_dir(tmp.path())
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("PTRACK_OPERATOR")
        .env_remove("PTRACK_LINE")
        .env_remove("PTRACK_BIND")
        .env_remove("PTRACK_DATABASE")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    ptrack(&tmp).arg("init").assert().success();
    tmp
}

/// Helper to register a product, returning its id
fn create_test_product(tmp: &TempDir, part_number: &str, product_type: &str) -> String {
    let output = ptrack(tmp)
        .args(["-f", "id", "product", "new", "-p", part_number, "-t", product_type])
        .output()
        .unwrap();
    assert!(output.status.success(), "product new failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to record a batch against a product reference
fn create_test_batch(tmp: &TempDir, code: &str, product: &str, quantity: &str) {
    ptrack(tmp)
        .args(["batch", "new", "-c", code, "-p", product, "-n", quantity])
        .assert()
        .success();
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    ptrack(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Record products and production batches in a local SQLite database",
        ))
        .stdout(predicate::str::contains("product"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_short_help_displays() {
    let tmp = TempDir::new().unwrap();
    ptrack(&tmp)
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Production batch tracker"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    ptrack(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ptrack"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    ptrack(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ptrack"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_project() {
    let tmp = TempDir::new().unwrap();
    ptrack(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized production tracker"));

    assert!(tmp.path().join(".ptrack/config.yaml").exists());
    assert!(tmp.path().join(".ptrack/ptrack.db").exists());
}

#[test]
fn test_init_twice_reports_existing() {
    let tmp = setup_test_project();
    ptrack(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_force_keeps_records() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "air-filter");

    ptrack(&tmp).args(["init", "--force"]).assert().success();
    ptrack(&tmp)
        .args(["product", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();
    ptrack(&tmp)
        .args(["product", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a ptrack project"));
}

// ============================================================================
// Product Tests
// ============================================================================

#[test]
fn test_product_new_and_list() {
    let tmp = setup_test_project();
    ptrack(&tmp)
        .args(["product", "new", "-p", "ab123", "-t", "oil-filter", "-d", "Spin-on"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created product AB123"));

    ptrack(&tmp)
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AB123"))
        .stdout(predicate::str::contains("Oil Filter"))
        .stdout(predicate::str::contains("1 product(s) found."));
}

#[test]
fn test_product_list_empty() {
    let tmp = setup_test_project();
    ptrack(&tmp)
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No products yet."));
}

#[test]
fn test_product_duplicate_part_number_fails() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "air-filter");

    ptrack(&tmp)
        .args(["product", "new", "-p", "ab123", "-t", "oil-filter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Part number already exists"));
}

#[test]
fn test_product_new_missing_type_fails() {
    let tmp = setup_test_project();
    ptrack(&tmp)
        .args(["product", "new", "-p", "AB123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Product type is required"));
}

#[test]
fn test_product_list_search_and_type_filter() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "air-filter");
    create_test_product(&tmp, "CD456", "oil-filter");
    create_test_product(&tmp, "AB789", "air-oil-separator");

    ptrack(&tmp)
        .args(["product", "list", "-s", "a b", "--count"])
        .assert()
        .success()
        .stdout("2\n");

    ptrack(&tmp)
        .args(["product", "list", "-t", "oil-filter", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CD456"))
        .stdout(predicate::str::contains("AB123").not());
}

#[test]
fn test_product_list_json() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "air-filter");

    let output = ptrack(&tmp)
        .args(["-f", "json", "product", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["part_number"], "AB123");
    assert_eq!(parsed[0]["product_type"], "AIR_FILTER");
}

// ============================================================================
// Batch Tests
// ============================================================================

#[test]
fn test_batch_new_by_part_number_and_id() {
    let tmp = setup_test_project();
    let id = create_test_product(&tmp, "AB123", "air-filter");

    ptrack(&tmp)
        .args(["batch", "new", "-c", "AB123-20260215-001", "-p", "ab123", "-n", "120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded batch AB123-20260215-001"));

    create_test_batch(&tmp, "AB123-20260215-002", &id, "80");

    ptrack(&tmp)
        .args(["batch", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_batch_new_unknown_product_fails() {
    let tmp = setup_test_project();
    ptrack(&tmp)
        .args(["batch", "new", "-c", "B-1", "-p", "NOPE", "-n", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Product not found"));

    ptrack(&tmp)
        .args(["batch", "new", "-c", "B-1", "-p", "42", "-n", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Product not found"));
}

#[test]
fn test_batch_new_invalid_quantity_fails() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "air-filter");
    ptrack(&tmp)
        .args(["batch", "new", "-c", "B-1", "-p", "AB123", "-n", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Quantity must be a positive number"));
}

#[test]
fn test_batch_duplicate_code_fails() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "air-filter");
    create_test_batch(&tmp, "B-1", "AB123", "5");

    ptrack(&tmp)
        .args(["batch", "new", "-c", "B-1", "-p", "AB123", "-n", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Batch code already exists"));
}

#[test]
fn test_batch_defaults_from_config() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "air-filter");
    ptrack(&tmp)
        .args(["config", "set", "operator", "Dana"])
        .assert()
        .success();

    create_test_batch(&tmp, "B-1", "AB123", "5");

    let output = ptrack(&tmp)
        .args(["-f", "json", "batch", "list"])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["produced_by"], "Dana");
    assert!(parsed[0]["production_line"].is_null());
}

#[test]
fn test_batch_list_search_newest_first() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "air-filter");
    create_test_product(&tmp, "CD456", "oil-filter");
    create_test_batch(&tmp, "AB123-20260215-001", "AB123", "10");
    create_test_batch(&tmp, "CD456-20260215-001", "CD456", "20");
    create_test_batch(&tmp, "AB123-20260216-001", "AB123", "30");

    let output = ptrack(&tmp)
        .args(["-f", "json", "batch", "list", "-s", "ab 123"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let codes: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["batch_code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["AB123-20260216-001", "AB123-20260215-001"]);

    ptrack(&tmp)
        .args(["batch", "list", "-s", "zzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No batches found."));
}

#[test]
fn test_batch_list_details_columns() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "air-filter");
    ptrack(&tmp)
        .args([
            "batch", "new", "-c", "B-1", "-p", "AB123", "-n", "5", "--line", "L2", "-r", "night shift",
        ])
        .assert()
        .success();

    ptrack(&tmp)
        .args(["batch", "list", "--details"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REMARKS"))
        .stdout(predicate::str::contains("night shift"))
        .stdout(predicate::str::contains("L2"));
}

// ============================================================================
// Export Tests
// ============================================================================

#[test]
fn test_batch_export_writes_csv() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "oil-filter");
    create_test_batch(&tmp, "AB123-20260215-001", "AB123", "120");

    ptrack(&tmp)
        .args(["batch", "export", "-o", "out.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 batch(es)"));

    let content = fs::read_to_string(tmp.path().join("out.csv")).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Batch Code,Part Number,Product Type,Quantity,Produced By,Production Line,Remarks,Created At,Updated At"
    );
    assert!(lines
        .next()
        .unwrap()
        .starts_with("AB123-20260215-001,AB123,OIL_FILTER,120,-,-,-,"));
}

#[test]
fn test_batch_export_default_filename() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "oil-filter");
    create_test_batch(&tmp, "B-1", "AB123", "1");

    ptrack(&tmp).args(["batch", "export"]).assert().success();

    let exported: Vec<String> = fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with("production_batches_") && n.ends_with(".csv"))
        .collect();
    assert_eq!(exported.len(), 1);
}

#[test]
fn test_batch_export_empty_fails() {
    let tmp = setup_test_project();
    ptrack(&tmp)
        .args(["batch", "export", "-o", "out.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No batches to export"));
    assert!(!tmp.path().join("out.csv").exists());
}

// ============================================================================
// Batch Code Tests
// ============================================================================

#[test]
fn test_batch_code_generate_with_date() {
    let tmp = TempDir::new().unwrap();
    ptrack(&tmp)
        .args(["batch", "code", "generate", "AB123", "--last-seq", "4", "--date", "2026-02-15"])
        .assert()
        .success()
        .stdout("AB123-20260215-005\n");
}

#[test]
fn test_batch_code_parse() {
    let tmp = TempDir::new().unwrap();
    ptrack(&tmp)
        .args(["batch", "code", "parse", "AB-123-20260215-007"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AB-123"))
        .stdout(predicate::str::contains("Feb 15, 2026"))
        .stdout(predicate::str::contains("7"));

    ptrack(&tmp)
        .args(["-f", "tsv", "batch", "code", "parse", "AB123-20260215-001"])
        .assert()
        .success()
        .stdout("AB123\t2026-02-15\t1\n");
}

#[test]
fn test_batch_code_parse_invalid_fails() {
    let tmp = TempDir::new().unwrap();
    ptrack(&tmp)
        .args(["batch", "code", "parse", "not-a-code"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a standard batch code"));
}

// ============================================================================
// Status Tests
// ============================================================================

#[test]
fn test_status_totals() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "AB123", "air-filter");
    create_test_batch(&tmp, "B-1", "AB123", "120");
    create_test_batch(&tmp, "B-2", "AB123", "30");

    let output = ptrack(&tmp).args(["-f", "json", "status"]).output().unwrap();
    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total_batches"], 2);
    assert_eq!(stats["total_quantity"], 150);
    assert_eq!(stats["total_products"], 1);
    assert_eq!(stats["recent_batches"][0]["batch_code"], "B-2");

    ptrack(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Production Status"))
        .stdout(predicate::str::contains("Recent batches"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_set_and_show() {
    let tmp = setup_test_project();
    ptrack(&tmp)
        .args(["config", "set", "production_line", "L1"])
        .assert()
        .success();
    ptrack(&tmp)
        .args(["config", "show", "production_line"])
        .assert()
        .success()
        .stdout("L1\n");

    ptrack(&tmp)
        .args(["config", "unset", "production_line"])
        .assert()
        .success();
    ptrack(&tmp)
        .args(["config", "show", "production_line"])
        .assert()
        .failure();
}

#[test]
fn test_config_rejects_unknown_key() {
    let tmp = setup_test_project();
    ptrack(&tmp)
        .args(["config", "set", "author", "me"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_config_env_overrides_file() {
    let tmp = setup_test_project();
    ptrack(&tmp)
        .args(["config", "set", "operator", "Dana"])
        .assert()
        .success();
    ptrack(&tmp)
        .env("PTRACK_OPERATOR", "Lee")
        .args(["config", "get", "operator"])
        .assert()
        .success()
        .stdout("Lee\n");
}
