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
fn test_stages_list_shows_pipeline_order() {
    let temp_dir = TempDir::new().unwrap();

    let output = board_cmd(&temp_dir).args(["stages", "list"]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let todo = stdout.find("Todo").unwrap();
    let doing = stdout.find("Doing").unwrap();
    let done = stdout.find("Done").unwrap();
    assert!(todo < doing && doing < done, "stages listed in pipeline order");
}

#[test]
fn test_stages_set_replaces_pipeline() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir)
        .args(["stages", "set", "Prospect:10,Proposal:50:4,Won:100"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Replaced stage list"));

    board_cmd(&temp_dir)
        .args(["stages", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Prospect"))
        .stdout(predicates::str::contains("Proposal"))
        .stdout(predicates::str::contains("Won"))
        .stdout(predicates::str::contains("4"));
}

#[test]
fn test_stages_set_keeps_cards_of_surviving_stages() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir)
        .args(["add", "France", "stage=Doing"])
        .assert()
        .success();

    // Doing survives the batch edit (same name keeps the same stage id)
    board_cmd(&temp_dir)
        .args(["stages", "set", "Doing:40,Won:100"])
        .assert()
        .success();

    board_cmd(&temp_dir)
        .args(["show", "France"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Stage:    Doing"));

    // Cards of removed stages are gone with their column
    board_cmd(&temp_dir)
        .args(["show", "Example Country"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_stages_edit_retunes_probability_and_wip() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir)
        .args(["stages", "edit", "Doing", "prob=75", "wip=3"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Updated stage 'Doing'"));

    board_cmd(&temp_dir)
        .args(["stages", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("75"));
}

#[test]
fn test_stages_edit_rename_keeps_cards() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir).args(["add", "France"]).assert().success();
    board_cmd(&temp_dir)
        .args(["stages", "edit", "Todo", "name=Backlog"])
        .assert()
        .success();

    board_cmd(&temp_dir)
        .args(["show", "France"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Stage:    Backlog"));
}

#[test]
fn test_stages_edit_rejects_bad_probability() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir)
        .args(["stages", "edit", "Doing", "prob=140"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("between 0 and 100"));
}

#[test]
fn test_stages_reorder() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir)
        .args(["stages", "reorder", "Done,Doing,Todo"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Reordered stages"));

    let output = board_cmd(&temp_dir).args(["stages", "list"]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let done = stdout.find("Done").unwrap();
    let todo = stdout.find("Todo").unwrap();
    assert!(done < todo, "Done now sorts before Todo");
}

#[test]
fn test_stages_reorder_must_name_every_stage_once() {
    let temp_dir = TempDir::new().unwrap();

    board_cmd(&temp_dir)
        .args(["stages", "reorder", "Done,Doing"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("all 3 stages"));

    board_cmd(&temp_dir)
        .args(["stages", "reorder", "Done,Done,Todo"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("more than once"));
}
