use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn board_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dealflow").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd.env_remove("DEALFLOW_REMOTE");
    cmd
}

#[test]
fn test_unconfigured_remote_falls_back_to_demo_board() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir)
        .args(["board"])
        .assert()
        .success()
        .stdout(predicates::str::contains("demo board"))
        .stdout(predicates::str::contains("Example Country"))
        .stdout(predicates::str::contains("Todo"));
}

#[test]
fn test_add_card_appears_on_board_and_persists() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir)
        .args(["add", "France", "value=1200", "owner=Ana"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Added 'France' to Todo"));

    // Same session directory: the snapshot cache carries the edit over
    board_cmd(&temp_dir)
        .args(["board"])
        .assert()
        .success()
        .stdout(predicates::str::contains("France"))
        .stdout(predicates::str::contains("1,200"));
}

#[test]
fn test_add_rejects_duplicate_country() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir).args(["add", "France"]).assert().success();
    board_cmd(&temp_dir)
        .args(["add", "France"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("already exists"));
}

#[test]
fn test_add_rejects_empty_country_and_bad_fields() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir)
        .args(["add", "  "])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("Country cannot be empty"));

    board_cmd(&temp_dir)
        .args(["add", "France", "value=lots"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("Invalid value"));

    board_cmd(&temp_dir)
        .args(["add", "France", "county=FR"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("Unrecognized field name"));
}

#[test]
fn test_add_to_named_stage() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir)
        .args(["add", "Japan", "stage=Doing"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Added 'Japan' to Doing"));

    board_cmd(&temp_dir)
        .args(["show", "Japan"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Stage:    Doing"));
}

#[test]
fn test_move_card_between_stages() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir).args(["add", "France"]).assert().success();
    board_cmd(&temp_dir)
        .args(["move", "France", "Doing"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Moved 'France' to Doing"));

    board_cmd(&temp_dir)
        .args(["show", "France"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Stage:    Doing"));

    // Moving to the current stage is a no-op
    board_cmd(&temp_dir)
        .args(["move", "France", "Doing"])
        .assert()
        .success()
        .stdout(predicates::str::contains("already in Doing"));
}

#[test]
fn test_move_to_unknown_stage_fails() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir).args(["add", "France"]).assert().success();
    board_cmd(&temp_dir)
        .args(["move", "France", "Shipped"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("No stage named 'Shipped'"));
}

#[test]
fn test_modify_card_fields() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir).args(["add", "France"]).assert().success();
    board_cmd(&temp_dir)
        .args(["modify", "France", "value=900", "priority=High", "+nda"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Updated 'France'"));

    board_cmd(&temp_dir)
        .args(["show", "France"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Value:    900"))
        .stdout(predicates::str::contains("Priority: High"))
        .stdout(predicates::str::contains("NDA"));
}

#[test]
fn test_modify_rejects_stage_token() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir).args(["add", "France"]).assert().success();
    board_cmd(&temp_dir)
        .args(["modify", "France", "stage=Doing"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("dealflow move"));
}

#[test]
fn test_delete_card() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir).args(["add", "France"]).assert().success();
    board_cmd(&temp_dir)
        .args(["delete", "France"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Deleted 'France'"));

    board_cmd(&temp_dir)
        .args(["show", "France"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("No deal found"));
}

#[test]
fn test_board_json_output() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir)
        .args(["add", "France", "value=500"])
        .assert()
        .success();
    let output = board_cmd(&temp_dir)
        .args(["board", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["stages"].is_array());
    assert!(parsed["columns"].is_object());
}
