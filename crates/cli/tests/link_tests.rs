// Integration tests for `formsync link`.
// Run with: cargo test -p formsync-cli --test link_tests

use std::path::Path;
use std::process::Command;

use httpmock::prelude::*;
use serde_json::json;

fn formsync() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_formsync"));
    // Clear env to avoid leaking a real token into tests
    cmd.env_remove("FORMSYNC_API_TOKEN");
    cmd
}

const PROFILE: &str = r#"
name = "Test sync"

[boards.formulas]
id = "900"

[boards.ingredients]
id = "901"

[links.formula_ingredients]
source = "formulas"
target = "ingredients"
relation_column = "rel_col"
entities = "formulas"

[pacing]
strategy = "fixed_delay"
delay_ms = 1
"#;

fn write_fixture(dir: &Path) -> (String, String) {
    let config = dir.join("formsync.toml");
    std::fs::write(&config, PROFILE).unwrap();

    let db = dir.join("formulations.db");
    let conn = formsync_db::Connection::open(&db).unwrap();
    conn.execute_batch(
        "CREATE TABLE formulas (id INTEGER PRIMARY KEY, name TEXT, version TEXT, status TEXT);
         CREATE TABLE ingredients (id INTEGER PRIMARY KEY, name TEXT, inci_name TEXT, category TEXT);
         CREATE TABLE formula_ingredients (formula_id INTEGER, ingredient_id INTEGER, percentage REAL);
         INSERT INTO formulas VALUES (1, 'Hydrating Serum', '1.0', 'approved');
         INSERT INTO ingredients VALUES (10, 'Glycerin', 'Glycerin', 'humectant');
         INSERT INTO formula_ingredients VALUES (1, 10, 5.0);",
    )
    .unwrap();

    (
        config.display().to_string(),
        db.display().to_string(),
    )
}

/// Mock both board fetches: one formula item (unlinked), one ingredient.
fn mock_boards(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST).body_includes("\"boardId\":[\"900\"]");
        then.status(200).json_body(json!({
            "data": { "boards": [{ "items_page": {
                "cursor": null,
                "items": [{
                    "id": "f1",
                    "name": "Hydrating Serum v1.0",
                    "column_values": [{ "id": "rel_col", "linked_item_ids": [] }]
                }]
            } }] }
        }));
    });
    server.mock(|when, then| {
        when.method(POST).body_includes("\"boardId\":[\"901\"]");
        then.status(200).json_body(json!({
            "data": { "boards": [{ "items_page": {
                "cursor": null,
                "items": [{ "id": "i1", "name": "Glycerin" }]
            } }] }
        }));
    });
}

#[test]
fn missing_api_token_exits_50() {
    let dir = tempfile::tempdir().unwrap();
    let (config, db) = write_fixture(dir.path());

    let output = formsync()
        .args(["link", "formula_ingredients", "--config", &config, "--db", &db, "--quiet"])
        .output()
        .expect("failed to run formsync");

    assert_eq!(
        output.status.code(),
        Some(50),
        "expected exit 50, got {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing API token"), "stderr: {}", stderr);
}

#[test]
fn unknown_link_exits_22() {
    let dir = tempfile::tempdir().unwrap();
    let (config, db) = write_fixture(dir.path());

    let output = formsync()
        .args(["link", "no_such_link", "--config", &config, "--db", &db, "--quiet"])
        .output()
        .expect("failed to run formsync");

    assert_eq!(output.status.code(), Some(22));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown link"));
}

#[test]
fn invalid_profile_exits_21() {
    let dir = tempfile::tempdir().unwrap();
    let (_, db) = write_fixture(dir.path());
    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "name = \"Bad\"\n").unwrap();

    let output = formsync()
        .args([
            "link", "formula_ingredients",
            "--config", &bad.display().to_string(),
            "--db", &db,
            "--quiet",
        ])
        .output()
        .expect("failed to run formsync");

    assert_eq!(output.status.code(), Some(21));
}

#[test]
fn missing_database_exits_10() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = write_fixture(dir.path());

    let output = formsync()
        .args([
            "link", "formula_ingredients",
            "--config", &config,
            "--db", &dir.path().join("missing.db").display().to_string(),
            "--api-token", "tok_test",
            "--quiet",
        ])
        .output()
        .expect("failed to run formsync");

    assert_eq!(output.status.code(), Some(10));
}

#[test]
fn dry_run_matches_but_never_writes() {
    let dir = tempfile::tempdir().unwrap();
    let (config, db) = write_fixture(dir.path());
    let server = MockServer::start();
    mock_boards(&server);
    // No mutation mock: a write attempt would hit a 404 and show up as a
    // failure in the summary.

    let output = formsync()
        .args([
            "link", "formula_ingredients", "--dry-run",
            "--config", &config,
            "--db", &db,
            "--api-token", "tok_test",
            "--api-base", &server.base_url(),
            "--quiet",
        ])
        .output()
        .expect("failed to run formsync");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[dry run]"), "stdout: {}", stdout);
    assert!(stdout.contains("1 linked"), "stdout: {}", stdout);
}

#[test]
fn live_run_writes_once_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let (config, db) = write_fixture(dir.path());
    let server = MockServer::start();
    mock_boards(&server);
    let write = server.mock(|when, then| {
        when.method(POST).body_includes("change_multiple_column_values");
        then.status(200).json_body(json!({
            "data": { "change_multiple_column_values": { "id": "f1" } }
        }));
    });

    let report_path = dir.path().join("run.json");
    let output = formsync()
        .args([
            "link", "formula_ingredients",
            "--config", &config,
            "--db", &db,
            "--api-token", "tok_test",
            "--api-base", &server.base_url(),
            "--report", &report_path.display().to_string(),
            "--quiet",
        ])
        .output()
        .expect("failed to run formsync");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    write.assert();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["summary"]["linked"], 1);
    assert_eq!(report["outcomes"][0]["state"], "linked");
    assert_eq!(report["outcomes"][0]["entity_name"], "Hydrating Serum v1.0");
}

#[test]
fn rejected_write_exits_3_and_pass_continues() {
    let dir = tempfile::tempdir().unwrap();
    let (config, db) = write_fixture(dir.path());
    let server = MockServer::start();
    mock_boards(&server);
    server.mock(|when, then| {
        when.method(POST).body_includes("change_multiple_column_values");
        then.status(200).json_body(json!({
            "errors": [{ "message": "Column not found" }],
            "data": null
        }));
    });

    let output = formsync()
        .args([
            "link", "formula_ingredients",
            "--config", &config,
            "--db", &db,
            "--api-token", "tok_test",
            "--api-base", &server.base_url(),
            "--quiet",
        ])
        .output()
        .expect("failed to run formsync");

    assert_eq!(
        output.status.code(),
        Some(3),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("1 failed"));
}

#[test]
fn unknown_flag_exits_2() {
    let output = formsync()
        .args(["link", "formula_ingredients", "--frobnicate"])
        .output()
        .expect("failed to run formsync");

    assert_eq!(output.status.code(), Some(2));
}
