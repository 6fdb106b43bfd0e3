#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Server, ServerGuard};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn ticketgen(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ticketgen").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("TICKETGEN_CONFIG")
        .env_remove("TICKETGEN_PASSWORD")
        .env("RUST_LOG", "off");
    cmd
}

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("ticketgen.yaml");
    std::fs::write(&path, body).unwrap();
    path
}

fn item(summary: &str, extra: &str) -> String {
    format!("<rss><channel><item><summary>{summary}</summary>{extra}</item></channel></rss>")
}

fn epic_link(epic: &str) -> String {
    format!(
        "<customfields><customfield id=\"customfield_10008\"><customfieldvalues>\
         <customfieldvalue>{epic}</customfieldvalue></customfieldvalues></customfield>\
         </customfields>"
    )
}

fn tracker() -> ServerGuard {
    let mut server = Server::new();
    server
        .mock("GET", "/browse/PROJ-1.xml")
        .match_header("authorization", "Basic YWxpY2U6czNjcmV0")
        .with_status(200)
        .with_body(item("Checkout flow", &epic_link("EPIC-9")))
        .create();
    server
        .mock("GET", "/browse/PROJ-2.xml")
        .with_status(200)
        .with_body(item("Refund flow", &epic_link("EPIC-9")))
        .create();
    server
        .mock("GET", "/browse/EPIC-9.xml")
        .with_status(200)
        .with_body(item("Payments", ""))
        .expect(1)
        .create();
    server
        .mock("GET", "/browse/PROJ-404.xml")
        .with_status(404)
        .create();
    server
}

fn tracker_config(dir: &TempDir, server: &ServerGuard) -> PathBuf {
    write_config(
        dir,
        &format!(
            "task_url: {}/browse/{{0}}.xml\nusername: alice\npassword: s3cret\n",
            server.url()
        ),
    )
}

fn sheets(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .map(|e| e.unwrap().path())
        .filter(|p| {
            let name = p.file_name().unwrap().to_string_lossy().into_owned();
            name.starts_with("tickets_") && name.ends_with(".html")
        })
        .collect()
}

// ---------------------------------------------------------------------------
// ticketgen init
// ---------------------------------------------------------------------------

#[test]
fn init_writes_default_config() {
    let dir = TempDir::new().unwrap();
    ticketgen(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));

    let yaml = std::fs::read_to_string(dir.path().join("ticketgen.yaml")).unwrap();
    assert!(yaml.contains("task_url"));
    assert!(yaml.contains("customfield_10008"));
}

#[test]
fn init_never_overwrites_without_force() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "task_url: http://mine/{0}\n");

    ticketgen(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists"));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "task_url: http://mine/{0}\n"
    );

    ticketgen(&dir).args(["init", "--force"]).assert().success();
    assert!(!std::fs::read_to_string(&path).unwrap().contains("http://mine"));
}

// ---------------------------------------------------------------------------
// ticketgen config
// ---------------------------------------------------------------------------

#[test]
fn missing_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    ticketgen(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config not found"));
}

#[test]
fn validate_reports_warnings_without_failing() {
    let dir = TempDir::new().unwrap();
    ticketgen(&dir).arg("init").assert().success();
    ticketgen(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[warning] username is empty"));
}

#[test]
fn validate_fails_on_bad_field_path() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "task_url: http://x/{0}\nusername: a\npassword: b\nfields:\n  epic:\n    color: \"relative\"\n",
    );
    ticketgen(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("fields.epic.color"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn config_found_by_walking_upward() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "task_url: http://x/{0}\nusername: a\npassword: b\n");
    let nested = dir.path().join("a/b");
    std::fs::create_dir_all(&nested).unwrap();

    ticketgen(&dir)
        .current_dir(&nested)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn explicit_config_flag_wins() {
    let dir = TempDir::new().unwrap();
    let other = dir.path().join("other.yaml");
    std::fs::write(&other, "task_url: http://other/{0}\nusername: a\n").unwrap();

    ticketgen(&dir)
        .args(["--config", other.to_str().unwrap(), "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://other/{0}"));
}

#[test]
fn show_lists_field_paths() {
    let dir = TempDir::new().unwrap();
    ticketgen(&dir).arg("init").assert().success();
    ticketgen(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("story.epic_link"))
        .stdout(predicate::str::contains("subtask.estimate"));
}

#[test]
fn show_json_redacts_password() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "task_url: http://x/{0}\nusername: a\npassword: hunter2\n");

    let output = ticketgen(&dir)
        .args(["--json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["config"]["password"], "********");
    assert_eq!(value["config"]["timeout_secs"], 30);
}

// ---------------------------------------------------------------------------
// ticketgen generate
// ---------------------------------------------------------------------------

#[test]
fn generate_writes_sheet_and_streams_progress() {
    let dir = TempDir::new().unwrap();
    let server = tracker();
    tracker_config(&dir, &server);
    let out = dir.path().join("out");

    ticketgen(&dir)
        .args(["generate", "proj-1, PROJ-2", "--no-open", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("[PROJ-1] Processing story... "))
        .stdout(predicate::str::contains("[PROJ-2] Processing story... "))
        .stdout(predicate::str::contains("All tickets generated: "))
        .stdout(predicate::str::contains("2 rendered, 0 failed (completed)"));

    let written = sheets(&out);
    assert_eq!(written.len(), 1);
    let html = std::fs::read_to_string(&written[0]).unwrap();
    assert!(html.contains("Checkout flow"));
    assert!(html.contains("Refund flow"));
    assert!(html.contains("Payments"));
    assert!(!html.contains("null"));
    assert!(html.find("Checkout flow").unwrap() < html.find("Refund flow").unwrap());
}

#[test]
fn generate_continues_past_failing_ticket() {
    let dir = TempDir::new().unwrap();
    let server = tracker();
    tracker_config(&dir, &server);
    let out = dir.path().join("out");

    ticketgen(&dir)
        .args(["generate", "PROJ-404,PROJ-1", "--no-open", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Error: request for PROJ-404 returned HTTP 404"))
        .stdout(predicate::str::contains("1 rendered, 1 failed"));

    assert_eq!(sheets(&out).len(), 1);
}

#[test]
fn generate_with_nothing_rendered_writes_no_file() {
    let dir = TempDir::new().unwrap();
    let server = tracker();
    tracker_config(&dir, &server);
    let out = dir.path().join("out");

    ticketgen(&dir)
        .args(["generate", "PROJ-404", "--no-open", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("No tickets generated."));

    assert!(sheets(&out).is_empty());
}

#[test]
fn generate_json_prints_report() {
    let dir = TempDir::new().unwrap();
    let server = tracker();
    tracker_config(&dir, &server);
    let out = dir.path().join("out");

    let output = ticketgen(&dir)
        .args(["--json", "generate", "PROJ-1,,PROJ-2", "--no-open", "--output-dir"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["state"], "completed");
    assert_eq!(report["rendered"], serde_json::json!(["PROJ-1"]));
    assert_eq!(report["epic_fetches"], 1);
    assert!(report["output"].as_str().unwrap().contains("tickets_"));
}

#[test]
fn generate_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "task_url: http://x/fixed.xml\nusername: a\npassword: b\n");

    ticketgen(&dir)
        .args(["generate", "PROJ-1", "--no-open"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn generate_password_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    server
        .mock("GET", "/browse/PROJ-1.xml")
        .match_header("authorization", "Basic YWxpY2U6b3RoZXI=")
        .with_status(200)
        .with_body(item("Checkout flow", ""))
        .expect(1)
        .create();
    tracker_config(&dir, &server);
    let out = dir.path().join("out");

    ticketgen(&dir)
        .args(["generate", "PROJ-1", "--no-open", "--password", "other", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 rendered, 0 failed"));
}
