use predicates::prelude::*;
mod test_env;
use test_env::{leadpipe_cmd, setup_test_env};

#[test]
fn test_add_and_list() {
    let (temp_dir, _guard) = setup_test_env("");

    leadpipe_cmd(&temp_dir)
        .args(["add", "Ada Lovelace", "555-0101", "--company", "Engines Ltd", "--source", "Referral"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created lead 1: Ada Lovelace"));
    leadpipe_cmd(&temp_dir).args(["add", "Bob Stone", "555-0202"]).assert().success();

    let output = leadpipe_cmd(&temp_dir).arg("list").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.starts_with("ID"));
    assert!(stdout.lines().any(|l| l.contains("Ada Lovelace") && l.contains("Referral") && l.contains("Engines Ltd")));
    assert!(stdout.lines().any(|l| l.contains("Bob Stone") && l.contains("Manual") && l.contains("Unassigned")));
    assert!(stdout.contains("2 lead(s)"));
}

#[test]
fn test_add_validates_input() {
    let (temp_dir, _guard) = setup_test_env("");

    leadpipe_cmd(&temp_dir)
        .args(["add", "  ", "555"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Name cannot be empty"));

    leadpipe_cmd(&temp_dir)
        .args(["add", "Ada", "call me"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid phone number"));

    leadpipe_cmd(&temp_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No leads found."));
}

#[test]
fn test_list_filters() {
    let (temp_dir, _guard) = setup_test_env("");
    leadpipe_cmd(&temp_dir).args(["agents", "add", "Grace"]).assert().success();
    leadpipe_cmd(&temp_dir).args(["add", "Ada", "555-0101"]).assert().success();
    leadpipe_cmd(&temp_dir).args(["add", "Bob", "777-0202"]).assert().success();
    leadpipe_cmd(&temp_dir).args(["move", "2", "Contacted", "--as", "Grace"]).assert().success();

    leadpipe_cmd(&temp_dir)
        .args(["list", "--search", "ADA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada").and(predicate::str::contains("Bob").not()));

    leadpipe_cmd(&temp_dir)
        .args(["list", "--search", "0202"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bob").and(predicate::str::contains("Ada").not()));

    leadpipe_cmd(&temp_dir)
        .args(["list", "--unassigned"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada").and(predicate::str::contains("Bob").not()));

    leadpipe_cmd(&temp_dir)
        .args(["list", "--status", "contacted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bob").and(predicate::str::contains("Ada").not()));

    leadpipe_cmd(&temp_dir)
        .args(["list", "--agent", "grace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 lead(s)"));

    leadpipe_cmd(&temp_dir)
        .args(["list", "--status", "pending"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid status filter"));
}

#[test]
fn test_list_json() {
    let (temp_dir, _guard) = setup_test_env("");
    leadpipe_cmd(&temp_dir).args(["add", "Ada", "555", "--email", "ada@example.com"]).assert().success();

    let output = leadpipe_cmd(&temp_dir).args(["list", "--json"]).assert().success();
    let leads: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    let first = &leads[0];
    assert_eq!(first["name"], "Ada");
    assert_eq!(first["email"], "ada@example.com");
    assert_eq!(first["status"], "New");
    assert!(first["assigned_to"].is_null());
}

#[test]
fn test_add_json_is_pure_json() {
    let (temp_dir, _guard) = setup_test_env("");
    let output = leadpipe_cmd(&temp_dir).args(["add", "Ada", "555", "--json"]).assert().success();
    let lead: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(lead["id"], 1);
    assert_eq!(lead["source"], "Manual");
}

#[test]
fn test_board_shows_unassigned_under_new() {
    let (temp_dir, _guard) = setup_test_env("");
    leadpipe_cmd(&temp_dir).args(["agents", "add", "Grace"]).assert().success();
    leadpipe_cmd(&temp_dir).args(["add", "Ada", "555"]).assert().success();
    leadpipe_cmd(&temp_dir).args(["add", "Bob", "556"]).assert().success();
    // Direct edit leaves Bob unassigned while changing his stage
    leadpipe_cmd(&temp_dir).args(["edit", "2", "--status", "Interested"]).assert().success();

    let output = leadpipe_cmd(&temp_dir).args(["board", "--json"]).assert().success();
    let board: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    let columns = board.as_array().unwrap();
    assert_eq!(columns.len(), 5);
    assert_eq!(columns[0]["stage"], "New");
    assert_eq!(columns[0]["leads"].as_array().unwrap().len(), 2);
    assert_eq!(columns[2]["stage"], "Interested");
    assert!(columns[2]["leads"].as_array().unwrap().is_empty());

    leadpipe_cmd(&temp_dir)
        .arg("board")
        .env("COLUMNS", "100")
        .assert()
        .success()
        .stdout(predicate::str::contains("New (2)").and(predicate::str::contains("#2 Bob")));
}

#[test]
fn test_show_and_bare_id() {
    let (temp_dir, _guard) = setup_test_env("");
    leadpipe_cmd(&temp_dir).args(["add", "Ada", "555", "--company", "Engines"]).assert().success();

    leadpipe_cmd(&temp_dir)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lead 1: Ada").and(predicate::str::contains("Company:  Engines")));

    leadpipe_cmd(&temp_dir)
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Owner:    Unassigned"));

    leadpipe_cmd(&temp_dir)
        .args(["show", "9"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Lead 9 not found"));

    leadpipe_cmd(&temp_dir)
        .args(["show", "abc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid lead ID"));
}

#[test]
fn test_edit_fields() {
    let (temp_dir, _guard) = setup_test_env("");
    leadpipe_cmd(&temp_dir).args(["agents", "add", "Grace"]).assert().success();
    leadpipe_cmd(&temp_dir).args(["add", "Ada", "555"]).assert().success();

    leadpipe_cmd(&temp_dir)
        .args(["edit", "1", "--name", "Ada King", "--assign", "Grace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lead updated successfully"));

    leadpipe_cmd(&temp_dir)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lead 1: Ada King").and(predicate::str::contains("Grace (agent 1)")));

    leadpipe_cmd(&temp_dir)
        .args(["edit", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Nothing to update"));

    leadpipe_cmd(&temp_dir)
        .args(["edit", "1", "--assign", "Nobody"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Agent 'Nobody' not found"));
}

#[test]
fn test_edit_clears_nullable_fields() {
    let (temp_dir, _guard) = setup_test_env("");
    leadpipe_cmd(&temp_dir).args(["agents", "add", "Grace"]).assert().success();
    leadpipe_cmd(&temp_dir)
        .args(["add", "Ada", "555", "--email", "ada@example.com", "--company", "Engines"])
        .assert()
        .success();
    leadpipe_cmd(&temp_dir).args(["edit", "1", "--assign", "Grace"]).assert().success();

    leadpipe_cmd(&temp_dir)
        .args(["edit", "1", "--email", "none", "--company", "none", "--assign", "none"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lead updated successfully"));

    let output = leadpipe_cmd(&temp_dir).args(["list", "--json"]).assert().success();
    let leads: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert!(leads[0]["email"].is_null());
    assert!(leads[0]["company"].is_null());
    assert!(leads[0]["assigned_to"].is_null());
    assert_eq!(leads[0]["name"], "Ada");
}

#[test]
fn test_delete_single_and_many() {
    let (temp_dir, _guard) = setup_test_env("");
    for (name, phone) in [("A", "1"), ("B", "2"), ("C", "3")] {
        leadpipe_cmd(&temp_dir).args(["add", name, phone]).assert().success();
    }

    leadpipe_cmd(&temp_dir)
        .args(["delete", "1-2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 lead(s)"));

    leadpipe_cmd(&temp_dir)
        .args(["delete", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lead removed permanently."));

    leadpipe_cmd(&temp_dir)
        .args(["delete", "3"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Delete lead 3 failed"));
}

#[test]
fn test_select_preview_does_not_change_anything() {
    let (temp_dir, _guard) = setup_test_env("");
    for (name, phone) in [("A", "1"), ("B", "2"), ("C", "3")] {
        leadpipe_cmd(&temp_dir).args(["add", name, phone]).assert().success();
    }

    let output = leadpipe_cmd(&temp_dir).args(["select", "new", "-n", "2", "--json"]).assert().success();
    let chosen: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    let ids: Vec<i64> = chosen.as_array().unwrap().iter().map(|l| l["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2]);

    leadpipe_cmd(&temp_dir)
        .args(["list", "--unassigned"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 lead(s)"));
}

#[test]
fn test_command_abbreviations() {
    let (temp_dir, _guard) = setup_test_env("");
    leadpipe_cmd(&temp_dir).args(["ag", "ad", "Grace"]).assert().success();
    leadpipe_cmd(&temp_dir).args(["add", "Ada", "555"]).assert().success();

    leadpipe_cmd(&temp_dir)
        .args(["1", "mov", "Contacted", "--as", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved to Contacted"));

    leadpipe_cmd(&temp_dir)
        .arg("a")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Ambiguous command 'a'"));
}

#[test]
fn test_unknown_arguments_fail() {
    let (temp_dir, _guard) = setup_test_env("");
    leadpipe_cmd(&temp_dir).args(["list", "--bogus"]).assert().code(1);
    leadpipe_cmd(&temp_dir).args(["move", "1", "Pending", "--as", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid stage"));
}

#[test]
fn test_version() {
    let (temp_dir, _guard) = setup_test_env("");
    leadpipe_cmd(&temp_dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
