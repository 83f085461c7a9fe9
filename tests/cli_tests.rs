use assert_cmd::Command;
use std::fs;
use std::path::Path;

fn gamedb(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gamedb").unwrap();
    // Keep a developer's own config file out of the run
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home);
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_seeded_games_text_report() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("games.db");

    let output = gamedb(dir.path())
        .args(["--db", db.to_str().unwrap(), "--seed", "always"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("/Studios/"));
    assert!(stdout.contains("(4, 'Half-Life', 'Action', 'Valve', 360, 'Sierra Ent.', 591)"));
    assert!(stdout.contains("/Full_Orders/"));
}

#[test]
fn test_json_report_for_library() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("books.db");

    let output = gamedb(dir.path())
        .args(["--dataset", "library", "--db", db.to_str().unwrap()])
        .args(["--seed", "if-empty", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report[0]["title"], "Books");
    assert_eq!(report[0]["records"][0]["title"], "Eragon");
}

#[test]
fn test_config_file_selects_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let db = dir.path().join("staff.db");
    fs::write(
        &config,
        format!(
            "[database]\npath = {:?}\n\n\
             [demo]\ndataset = \"staff\"\nseed = \"always\"\nview_id = 2\n",
            db.to_str().unwrap()
        ),
    )
    .unwrap();

    let output = gamedb(dir.path())
        .args(["--config", config.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("(2, 'Dylan', 'Ether', 'Microsoft')"));
    assert!(db.exists());
}

#[test]
fn test_bad_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[demo]\ndataset = \"arcade\"\n").unwrap();

    gamedb(dir.path())
        .args(["--config", config.to_str().unwrap()])
        .assert()
        .failure();
}
