//! Drives the `todo` binary's command-line subcommands against a temp
//! directory and checks stdout and the JSON files left behind.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn todo(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_todo"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_DATA_HOME", dir.join("data"))
        .output()
        .expect("failed to run todo")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn list_without_files_shows_default_list() {
    let tmp = TempDir::new().unwrap();
    let output = todo(tmp.path(), &["list"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "default_list.json\n  (empty)\n");
    assert!(!tmp.path().join("default_list.json").exists());
}

#[test]
fn add_appends_and_saves() {
    let tmp = TempDir::new().unwrap();
    assert!(todo(tmp.path(), &["add", "buy milk"]).status.success());
    assert!(todo(tmp.path(), &["add", "walk dog"]).status.success());

    let saved = fs::read_to_string(tmp.path().join("default_list.json")).unwrap();
    assert_eq!(
        saved,
        r#"[{"done":false,"text":"buy milk"},{"done":false,"text":"walk dog"}]"#
    );

    let output = todo(tmp.path(), &["list"]);
    assert_eq!(
        stdout(&output),
        "default_list.json\n  [ ] 0: buy milk\n  [ ] 1: walk dog\n"
    );
}

#[test]
fn remove_first_of_two() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("default_list.json");
    fs::write(&path, r#"[{"done":true,"text":"A"},{"done":false,"text":"B"}]"#).unwrap();

    let output = todo(tmp.path(), &["remove", "0"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Removed 0: A\n");
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        r#"[{"done":false,"text":"B"}]"#
    );
}

#[test]
fn toggle_second_of_two() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("default_list.json");
    fs::write(&path, r#"[{"done":false,"text":"X"},{"done":false,"text":"Y"}]"#).unwrap();

    let output = todo(tmp.path(), &["toggle", "1"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Marked 1 as done: Y\n");
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        r#"[{"done":false,"text":"X"},{"done":true,"text":"Y"}]"#
    );
}

#[test]
fn out_of_range_index_fails_without_writing() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("default_list.json");
    let original = r#"[{"done":false,"text":"only"}]"#;
    fs::write(&path, original).unwrap();

    let output = todo(tmp.path(), &["remove", "5"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("out of range"), "stderr: {}", stderr);
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn malformed_list_is_not_overwritten() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("default_list.json");
    fs::write(&path, "not json").unwrap();

    assert!(!todo(tmp.path(), &["add", "x"]).status.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
}

#[test]
fn config_names_the_list_file() {
    let tmp = TempDir::new().unwrap();
    let conf_dir = tmp.path().join("conf");
    fs::create_dir_all(&conf_dir).unwrap();
    let config = conf_dir.join("settings.json");
    fs::write(
        &config,
        r#"{"width":60,"height":20,"left":0,"top":0,"currentList":"work.json"}"#,
    )
    .unwrap();

    let config_arg = config.to_str().unwrap();
    assert!(todo(tmp.path(), &["--config", config_arg, "add", "ship it"])
        .status
        .success());
    assert_eq!(
        fs::read_to_string(conf_dir.join("work.json")).unwrap(),
        r#"[{"done":false,"text":"ship it"}]"#
    );
    let output = todo(tmp.path(), &["list", "--config", config_arg]);
    assert_eq!(stdout(&output), "work.json\n  [ ] 0: ship it\n");
}
