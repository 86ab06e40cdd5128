//! Headless subcommands end to end against a SQLite file.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use tempfile::TempDir;

const SCHEMA: &str = "CREATE TABLE customer_profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    business_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    address TEXT,
    description TEXT
)";

struct Workspace {
    dir: TempDir,
    db: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("profiles.sqlite");
        Connection::open(&db).unwrap().execute_batch(SCHEMA).unwrap();
        Self { dir, db }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("customer-profiles").unwrap();
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env_remove("PROFILES_DB_DRIVER")
            .env_remove("PROFILES_DB_DATABASE")
            .env_remove("RUST_LOG")
            .arg("--driver")
            .arg("sqlite")
            .arg("--database")
            .arg(&self.db)
            .arg("--log-dir")
            .arg(self.dir.path().join("logs"));
        cmd
    }

    fn add(&self, name: &str, business: &str, email: &str) -> String {
        let output = self
            .cmd()
            .args(["add", "--name", name, "--business-name", business, "--email", email])
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }
}

#[test]
fn test_list_help() {
    let mut cmd = Command::cargo_bin("customer-profiles").unwrap();
    cmd.arg("list").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("case-insensitive"));
}

#[test]
fn test_add_then_list() {
    let ws = Workspace::new();
    assert_eq!(ws.add("Ada", "Engines", "ada@example.com"), "1");

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id\tname\tbusiness_name"))
        .stdout(predicate::str::contains("1\tAda\tEngines\tada@example.com"));
}

#[test]
fn test_add_rejects_empty_required_field() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["add", "--name", "Ada", "--business-name", "", "--email", "ada@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Business Name"));

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada").not());
}

#[test]
fn test_list_search() {
    let ws = Workspace::new();
    ws.add("Ada", "Engines", "ada@example.com");
    ws.add("Grace", "Navy", "grace@navy.mil");

    ws.cmd()
        .args(["list", "--search", "NAVY"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grace"))
        .stdout(predicate::str::contains("Ada").not());
}

#[test]
fn test_update_overwrites_all_fields() {
    let ws = Workspace::new();
    let id = ws.add("Ada", "Engines", "ada@example.com");

    ws.cmd()
        .args([
            "update",
            "--id",
            &id,
            "--name",
            "Ada Lovelace",
            "--business-name",
            "Analytical Engines",
            "--email",
            "ada@engines.example",
            "--address",
            "12 St James's Square\nLondon",
        ])
        .assert()
        .success();

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada Lovelace\tAnalytical Engines"))
        .stdout(predicate::str::contains("Square\\nLondon"));
}

#[test]
fn test_delete_removes_row() {
    let ws = Workspace::new();
    let id = ws.add("Ada", "Engines", "ada@example.com");
    ws.add("Alan", "Bombe", "alan@example.com");

    ws.cmd().args(["delete", "--id", &id]).assert().success();

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alan"))
        .stdout(predicate::str::contains("Ada").not());
}

#[test]
fn test_list_failure_exits_nonzero() {
    let ws = Workspace::new();
    Connection::open(&ws.db)
        .unwrap()
        .execute_batch("DROP TABLE customer_profiles")
        .unwrap();

    ws.cmd()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error fetching data"));
}

#[test]
fn test_settings_resolution_is_logged() {
    let ws = Workspace::new();
    let secrets = ws.dir.path().join("secrets.toml");
    std::fs::write(&secrets, "[mysql]\nhost = \"db.internal\"\n").unwrap();

    ws.cmd()
        .arg("--secrets")
        .arg(&secrets)
        .arg("list")
        .assert()
        .success();

    let logged: String = std::fs::read_dir(ws.dir.path().join("logs"))
        .unwrap()
        .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
        .collect();
    assert!(logged.contains("loaded connection secrets"));
}
