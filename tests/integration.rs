//! Integration tests for the cbook query command and configuration handling

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// Isolated config file and data directory
struct TestEnv {
    temp_dir: TempDir,
    config_path: PathBuf,
    data_dir: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        Self::with_config("")
    }

    fn with_config(body: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(&config_path, body).unwrap();

        Self {
            temp_dir,
            config_path,
            data_dir,
        }
    }

    fn write_contacts(&self, rows: &str) {
        fs::write(self.data_dir.join("contact.txt"), rows).unwrap();
    }

    /// Run cbook with this env's config and data dir
    fn cbook(&self) -> Command {
        let mut cmd = Command::cargo_bin("cbook").unwrap();
        cmd.args([
            "--config",
            self.config_path.to_str().unwrap(),
            "--data-dir",
            self.data_dir.to_str().unwrap(),
        ]);
        cmd
    }
}

// =============================================================================
// Query
// =============================================================================

#[test]
fn query_filters_by_name_case_insensitively() {
    let env = TestEnv::new();
    env.write_contacts("1,Bob,555-0001,al@bob.com\n2,alice,555-0002,alice@x.io\n");

    env.cbook()
        .args(["query", "AL"])
        .assert()
        .success()
        .stdout(
            "Found 1 contact(s) matching \"AL\"\n2\talice\t555-0002\talice@x.io\n",
        );
}

#[test]
fn query_without_term_lists_everything_sorted() {
    let env = TestEnv::new();
    env.write_contacts("1,carol,,\n2,Bob,,\n3,alice,,\n");

    env.cbook()
        .arg("query")
        .assert()
        .success()
        .stdout("3 contact(s)\n3\talice\t\t\n2\tBob\t\t\n1\tcarol\t\t\n");
}

#[test]
fn query_reports_no_matches() {
    let env = TestEnv::new();
    env.write_contacts("1,Bob,,\n");

    env.cbook()
        .args(["query", "zed"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("No matches for \"zed\""));
}

#[test]
fn query_on_missing_table_is_empty() {
    let env = TestEnv::new();

    env.cbook()
        .arg("query")
        .assert()
        .success()
        .stdout("0 contact(s)\n");
    assert!(!env.data_dir.join("contact.txt").exists());
}

#[test]
fn query_reads_quoted_fields_and_skips_malformed_rows() {
    let env = TestEnv::new();
    env.write_contacts(
        "1,\"Doe, \"\"Johnny\"\" Jr.\",555,j@d.com\nnot-an-id,Ghost,,\n2,Ann\n",
    );

    env.cbook()
        .args(["query", "doe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1\tDoe, \"Johnny\" Jr.\t555\tj@d.com"))
        .stdout(predicate::str::contains("Ghost").not());
}

#[test]
fn query_writes_a_log_file() {
    let env = TestEnv::new();

    env.cbook().arg("query").assert().success();

    let logs = env.data_dir.join("logs");
    assert!(logs.is_dir());
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn explicit_missing_config_fails() {
    let env = TestEnv::new();
    let missing = env.temp_dir.path().join("absent.toml");

    Command::cargo_bin("cbook")
        .unwrap()
        .args(["--config", missing.to_str().unwrap(), "query"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn colliding_key_bindings_fail() {
    let env = TestEnv::with_config("[keys.view]\nedit = \"e\"\ndelete = \"e\"\n");

    env.cbook()
        .arg("query")
        .assert()
        .failure()
        .stderr(predicate::str::contains("key binding collision in [keys.view]"));
}

#[test]
fn unknown_config_keys_are_warned_not_fatal() {
    let env = TestEnv::with_config("colour = \"blue\"\n");

    env.cbook()
        .arg("query")
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown configuration key `colour`"));
}

#[test]
fn contacts_file_setting_is_relative_to_data_dir() {
    let env = TestEnv::with_config("contacts_file = \"book.csv\"\n");
    fs::write(env.data_dir.join("book.csv"), "7,Zed,,\n").unwrap();

    env.cbook()
        .arg("query")
        .assert()
        .success()
        .stdout(predicate::str::contains("7\tZed"));
}
