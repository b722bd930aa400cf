use assert_cmd::Command;
use predicates::prelude::*;

fn tmx(config_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("tmx").unwrap();
    cmd.env("TMX_CONFIG_DIR", config_dir)
        .env_remove("TMUX")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let tmp = tempfile::tempdir().unwrap();
    tmx(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("connect"))
        .stdout(predicate::str::contains("kill"))
        .stdout(predicate::str::contains("--depth"));
}

#[test]
fn test_missing_dir_is_usage_error() {
    let tmp = tempfile::tempdir().unwrap();
    tmx(tmp.path())
        .arg("/definitely/not/a/real/dir")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_file_dir_is_usage_error() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("notes.txt");
    std::fs::write(&file, "x").unwrap();

    tmx(tmp.path())
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn test_config_dir_is_created() {
    let tmp = tempfile::tempdir().unwrap();
    let config_dir = tmp.path().join("tmx");

    tmx(&config_dir).arg("/definitely/not/a/real/dir").assert().code(2);
    assert!(config_dir.is_dir());
}

#[test]
fn test_malformed_config_is_not_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("broken.toml"), "[[workspace]\n").unwrap();

    // Gets past config loading to argument validation
    tmx(tmp.path())
        .arg("/definitely/not/a/real/dir")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("broken.toml"));
}
