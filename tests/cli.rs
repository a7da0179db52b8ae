use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A `nibras` invocation confined to a throwaway home directory.
fn nibras(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nibras").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("NIBRAS_LOG");
    cmd
}

fn seed_hypr(home: &Path, contents: &str) {
    let hypr = home.join(".config/hypr");
    fs::create_dir_all(&hypr).unwrap();
    fs::write(hypr.join("hyprland.conf"), contents).unwrap();
}

fn containers(home: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(home.join(".config"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("nibras-backup-"))
        .collect();
    names.sort();
    names
}

#[test]
fn list_without_backups() {
    let home = TempDir::new().unwrap();

    nibras(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found."));
}

#[test]
fn backup_moves_config_and_shows_in_list() {
    let home = TempDir::new().unwrap();
    seed_hypr(home.path(), "A");

    nibras(home.path())
        .arg("backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created at"));

    assert!(!home.path().join(".config/hypr").exists());
    let names = containers(home.path());
    assert_eq!(names.len(), 1);
    assert_eq!(
        fs::read_to_string(home.path().join(".config").join(&names[0]).join("hypr-old/hyprland.conf"))
            .unwrap(),
        "A"
    );

    nibras(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(names[0].as_str()))
        .stdout(predicate::str::contains("[hypr]"));
}

#[test]
fn restore_by_index_puts_config_back_and_deletes() {
    let home = TempDir::new().unwrap();
    seed_hypr(home.path(), "A");
    nibras(home.path()).arg("backup").assert().success();
    seed_hypr(home.path(), "B");

    nibras(home.path())
        .args(&["restore", "1", "--delete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 1 path(s)"));

    assert_eq!(
        fs::read_to_string(home.path().join(".config/hypr/hyprland.conf")).unwrap(),
        "A"
    );
    assert!(containers(home.path()).is_empty());
}

#[test]
fn restore_zero_is_a_skip() {
    let home = TempDir::new().unwrap();
    seed_hypr(home.path(), "A");
    nibras(home.path()).arg("backup").assert().success();

    nibras(home.path())
        .args(&["restore", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restore skipped."));

    assert!(!home.path().join(".config/hypr").exists());
    assert_eq!(containers(home.path()).len(), 1);
}

#[test]
fn restore_out_of_range_fails_without_changes() {
    let home = TempDir::new().unwrap();
    seed_hypr(home.path(), "A");
    nibras(home.path()).arg("backup").assert().success();

    nibras(home.path())
        .args(&["restore", "5"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid selection 5"));

    assert!(!home.path().join(".config/hypr").exists());
    assert_eq!(containers(home.path()).len(), 1);
}

#[test]
fn restore_with_nothing_to_restore_is_skipped() {
    let home = TempDir::new().unwrap();

    nibras(home.path())
        .args(&["restore", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No backups found"))
        .stdout(predicate::str::contains("Restore skipped."));
}

#[test]
fn config_prints_the_built_in_layout() {
    let home = TempDir::new().unwrap();

    let output = nibras(home.path()).arg("config").output().unwrap();
    assert!(output.status.success());

    let rendered: toml::Value = toml::from_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    let managed = rendered["managed"].as_array().unwrap();
    let fish = managed
        .iter()
        .find(|m| m["name"].as_str() == Some("fish-config"))
        .unwrap();

    assert_eq!(managed.len(), 5);
    assert_eq!(fish["preserve"].as_str(), Some("copy"));
    assert_eq!(fish["path"].as_str(), Some("fish/config.fish"));
}

#[test]
fn duplicate_backup_entries_are_rejected() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("nibras.toml");
    fs::write(
        &file,
        r#"
        [repository]
        url = "file:///srv/dotfiles"
        checkout = { kind = "home", path = "dotfiles" }

        [[managed]]
        name = "hypr"
        path = "hypr"
        source = ".config/hypr"

        [[managed]]
        name = "quickshell"
        path = "quickshell"
        source = ".config/quickshell"
        entry = "hypr-old"
        "#,
    )
    .unwrap();
    seed_hypr(home.path(), "A");

    nibras(home.path())
        .args(&["backup", "-f"])
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("reuses backup entry 'hypr-old'"));

    assert!(home.path().join(".config/hypr/hyprland.conf").is_file());
    assert!(containers(home.path()).is_empty());
}

#[test]
fn explicit_config_file_must_exist() {
    let home = TempDir::new().unwrap();

    nibras(home.path())
        .args(&["config", "-f"])
        .arg(home.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
