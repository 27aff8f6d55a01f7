//! CLI contract tests.

use std::path::Path;

use assert_cmd::Command;

fn pogovorim() -> Command {
    Command::cargo_bin("pogovorim").expect("binary should build")
}

fn write_config(root: &Path) -> std::path::PathBuf {
    let config = root.join("config.toml");
    std::fs::write(
        &config,
        "[storage]\nbackend = \"json\"\npath = \"profiles.json\"\n",
    )
    .expect("write config");
    config
}

#[test]
fn help_lists_subcommands() {
    let output = pogovorim().arg("--help").output().expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["start", "list", "profile", "reset"] {
        assert!(stdout.contains(sub), "help should list {sub}: {stdout}");
    }
}

#[test]
fn reset_creates_a_profile_that_profile_prints() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(dir.path());

    let reset = pogovorim()
        .arg("--config")
        .arg(&config)
        .args(["reset", "1001"])
        .output()
        .expect("run reset");
    assert!(reset.status.success(), "{}", String::from_utf8_lossy(&reset.stderr));
    assert!(String::from_utf8_lossy(&reset.stdout).contains("profile 1001 reset"));
    assert!(dir.path().join("profiles.json").exists());

    let shown = pogovorim()
        .arg("--config")
        .arg(&config)
        .args(["profile", "1001"])
        .output()
        .expect("run profile");
    assert!(shown.status.success());
    let profile: serde_json::Value =
        serde_json::from_slice(&shown.stdout).expect("profile should print JSON");
    assert_eq!(profile["stage"], "greeting");
    assert_eq!(profile["plan"], "free");
}

#[test]
fn list_prints_stored_participants() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(dir.path());

    let empty = pogovorim()
        .arg("--config")
        .arg(&config)
        .arg("list")
        .output()
        .expect("run list");
    assert!(empty.status.success(), "{}", String::from_utf8_lossy(&empty.stderr));
    assert!(empty.stdout.is_empty());

    for id in ["2002", "1001"] {
        let reset = pogovorim()
            .arg("--config")
            .arg(&config)
            .args(["reset", id])
            .output()
            .expect("run reset");
        assert!(reset.status.success());
    }

    let listed = pogovorim()
        .arg("--config")
        .arg(&config)
        .arg("list")
        .output()
        .expect("run list");
    assert!(listed.status.success());
    assert_eq!(
        String::from_utf8_lossy(&listed.stdout),
        "1001\tgreeting\n2002\tgreeting\n"
    );
}

#[test]
fn profile_of_unknown_participant_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(dir.path());

    let output = pogovorim()
        .arg("--config")
        .arg(&config)
        .args(["profile", "404"])
        .output()
        .expect("run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no profile stored for 404"));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[provider]\ntemperature = 5.0\n").expect("write");

    let output = pogovorim()
        .arg("--config")
        .arg(&config)
        .args(["reset", "1"])
        .output()
        .expect("run");
    assert!(!output.status.success());
}
