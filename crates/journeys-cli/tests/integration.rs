//! Integration tests for the journeys CLI
//!
//! Each test runs the binary in a fresh temporary directory with its own
//! `HOME`, so neither the user's global config nor real data is touched.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

const DAY_MS: f64 = 86_400_000.0;

struct Sandbox {
    _temp: TempDir,
    home: PathBuf,
    work: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let home = temp.path().join("home");
        let work = temp.path().join("work");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(work.join(".journeys")).unwrap();
        Self {
            _temp: temp,
            home,
            work,
        }
    }

    #[allow(deprecated)]
    fn journeys(&self) -> Command {
        let mut cmd = Command::cargo_bin("journeys").expect("Failed to find journeys binary");
        cmd.current_dir(&self.work)
            .env("HOME", &self.home)
            .env_remove("JOURNEYS_DATA_DIR")
            .env_remove("JOURNEYS_CONFIG");
        cmd
    }

    fn write_history(&self, items: Value) {
        write_json(&self.work.join(".journeys/history.json"), &items);
    }

    fn write_local_config(&self, content: &str) {
        std::fs::write(self.work.join(".journeys/config.toml"), content).unwrap();
    }

    fn record(&self, from: &str, to: &str) {
        self.journeys().args(["record", from, to]).assert().success();
    }

    fn show_json(&self, extra: &[&str]) -> Value {
        let output = self
            .journeys()
            .arg("show")
            .args(extra)
            .arg("--json")
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "{}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as f64
}

fn three_pages() -> Value {
    let now = now_ms();
    json!([
        {"url": "https://a.example/", "title": "A", "lastVisitTime": now - 3000.0},
        {"url": "https://b.example/", "title": "B", "lastVisitTime": now - 2000.0},
        {"url": "https://c.example/", "title": "C", "lastVisitTime": now - 1000.0}
    ])
}

// ============================================================================
// Record and Edges
// ============================================================================

#[test]
fn test_record_then_list_edges() {
    let sandbox = Sandbox::new();

    sandbox
        .journeys()
        .args(["record", "https://a.example/", "https://b.example/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded"));

    sandbox
        .journeys()
        .args(["record", "https://a.example/", "https://b.example/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No new visit"));

    sandbox
        .journeys()
        .arg("edges")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://a.example/"))
        .stdout(predicate::str::contains("  -> https://b.example/"));

    sandbox
        .journeys()
        .args(["edges", "https://a.example/", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"https://b.example/\""));
}

#[test]
fn test_edges_empty_store() {
    let sandbox = Sandbox::new();

    sandbox
        .journeys()
        .arg("edges")
        .assert()
        .success()
        .stdout(predicate::str::contains("No links recorded"));
}

// ============================================================================
// Show
// ============================================================================

#[test]
fn test_show_prints_tree() {
    let sandbox = Sandbox::new();
    sandbox.write_history(three_pages());
    sandbox.record("https://a.example/", "https://b.example/");
    sandbox.record("https://b.example/", "https://c.example/");

    sandbox
        .journeys()
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("* A  (a.example)"))
        .stdout(predicate::str::contains("\n  └─ B  (b.example)"))
        .stdout(predicate::str::contains("\n    └─ C  (c.example)"));
}

#[test]
fn test_show_json_structure() {
    let sandbox = Sandbox::new();
    sandbox.write_history(three_pages());
    sandbox.record("https://a.example/", "https://b.example/");
    sandbox.record("https://b.example/", "https://c.example/");

    let journeys = sandbox.show_json(&[]);

    assert_eq!(journeys.as_array().unwrap().len(), 1);
    assert_eq!(
        journeys[0]["key"],
        json!({"scheme": "url", "id": "https://a.example/"})
    );
    assert_eq!(
        journeys[0]["children"][0]["children"][0]["url"],
        "https://c.example/"
    );
}

#[test]
fn test_show_recency_order_and_text_filter() {
    let sandbox = Sandbox::new();
    sandbox.write_history(three_pages());

    let journeys = sandbox.show_json(&["--order", "recency"]);
    let urls: Vec<_> = journeys
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["url"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://c.example/",
            "https://b.example/",
            "https://a.example/"
        ]
    );

    let filtered = sandbox.show_json(&["--text", "B.EXAMPLE"]);
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["title"], "B");
}

#[test]
fn test_show_respects_day_window() {
    let sandbox = Sandbox::new();
    let now = now_ms();
    sandbox.write_history(json!([
        {"url": "https://old.example/", "title": "Old", "lastVisitTime": now - 30.0 * DAY_MS}
    ]));

    sandbox
        .journeys()
        .args(["show", "--days", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No journeys in the last 7 days"));

    let journeys = sandbox.show_json(&["--days", "60"]);
    assert_eq!(journeys.as_array().unwrap().len(), 1);
}

#[test]
fn test_show_visit_chain() {
    let sandbox = Sandbox::new();
    let now = now_ms();
    sandbox.write_history(json!([
        {"url": "https://a.example/", "title": "A", "lastVisitTime": now - 2000.0,
         "visits": [{"visitId": "10", "referringVisitId": "0", "visitTime": now - 2000.0}]},
        {"url": "https://b.example/", "title": "", "lastVisitTime": now - 1000.0,
         "visits": [{"visitId": "11", "referringVisitId": "10", "visitTime": now - 1000.0}]}
    ]));

    let journeys = sandbox.show_json(&["--identity", "visit-chain"]);

    assert_eq!(journeys[0]["key"], json!({"scheme": "visit", "id": "10"}));
    assert_eq!(journeys[0]["children"][0]["title"], "https://b.example/");
}

#[test]
fn test_show_without_history_fails() {
    let sandbox = Sandbox::new();

    sandbox
        .journeys()
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No history export"));
}

#[test]
fn test_data_dir_override() {
    let sandbox = Sandbox::new();
    let custom = sandbox.work.join("custom");
    std::fs::create_dir_all(&custom).unwrap();
    write_json(&custom.join("history.json"), &three_pages());

    sandbox
        .journeys()
        .args(["--data-dir", "custom", "record"])
        .args(["https://c.example/", "https://a.example/"])
        .assert()
        .success();
    assert!(custom.join("edges.json").exists());

    let output = sandbox
        .journeys()
        .args(["show", "--data-dir", "custom", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let journeys: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(journeys[0]["url"], "https://c.example/");
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_show_defaults() {
    let sandbox = Sandbox::new();

    sandbox
        .journeys()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_passes = 16"))
        .stdout(predicate::str::contains("lookback_days = 7"));
}

#[test]
fn test_local_config_is_used() {
    let sandbox = Sandbox::new();
    sandbox.write_local_config("[build]\nroot_order = \"recency\"\n");

    sandbox
        .journeys()
        .args(["config", "get", "build.root_order"])
        .assert()
        .success()
        .stdout("recency\n");
}

#[test]
fn test_invalid_config_rejected() {
    let sandbox = Sandbox::new();
    sandbox.write_history(three_pages());
    sandbox.write_local_config("[build]\nmax_passes = 0\n");

    sandbox
        .journeys()
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("build.max_passes"));
}

#[test]
fn test_config_init_local() {
    let sandbox = Sandbox::new();

    sandbox
        .journeys()
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    assert!(sandbox.work.join(".journeys/config.toml").exists());
}
