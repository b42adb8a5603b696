//! Commands that talk to the backend, exercised up to the point where a
//! connection would be needed.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn enlighter_cmd() -> Command {
    let mut cmd = Command::cargo_bin("enlighter").expect("enlighter binary");
    for var in [
        "GITHUB_EVENT_NAME",
        "PR_NUMBER",
        "GITHUB_BASE_REF",
        "GITHUB_HEAD_REF",
        "SUPABASE_URL",
        "SUPABASE_KEY",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn delete_drafts_requires_a_pull_request() {
    enlighter_cmd()
        .arg("delete-drafts")
        .assert()
        .failure()
        .stderr(contains("not a pull request run"));
}

#[test]
fn delete_drafts_rejects_out_of_range_pr() {
    enlighter_cmd()
        .args(["delete-drafts", "--pr", "100000"])
        .assert()
        .failure()
        .stderr(contains("100000"));
}

#[test]
fn pr_event_without_number_is_a_config_error() {
    enlighter_cmd()
        .arg("delete-drafts")
        .env("GITHUB_EVENT_NAME", "pull_request")
        .assert()
        .failure()
        .stderr(contains("invalid CI environment"));
}

#[test]
fn pr_flag_stands_in_for_missing_pr_number() {
    enlighter_cmd()
        .args(["delete-drafts", "--pr", "5"])
        .env("GITHUB_EVENT_NAME", "pull_request")
        .assert()
        .failure()
        .stderr(contains("backend credentials are not configured"))
        .stderr(contains("invalid CI environment").not());
}

#[test]
fn sync_content_requires_credentials() {
    let root = TempDir::new().expect("root");
    enlighter_cmd()
        .args(["sync-content", "--root"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(contains("backend credentials are not configured"));
}

#[test]
fn sync_templates_requires_credentials() {
    let root = TempDir::new().expect("root");
    fs::create_dir_all(root.path().join("templates")).expect("mkdir");
    enlighter_cmd()
        .args(["sync-templates", "--dry-run", "--root"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(contains("SUPABASE_URL"));
}

#[test]
fn unreachable_backend_fails_the_run() {
    let root = TempDir::new().expect("root");
    let project = root.path().join("project_1_demo");
    fs::create_dir_all(&project).expect("mkdir");
    fs::write(project.join("project.json"), r#"{"id": 1, "title": "Demo"}"#).expect("sidecar");

    enlighter_cmd()
        .args(["sync-content", "--dry-run", "--root"])
        .arg(root.path())
        .env("SUPABASE_URL", "http://127.0.0.1:9")
        .env("SUPABASE_KEY", "test-key")
        .assert()
        .failure()
        .stderr(contains("content sync failed"));
}
