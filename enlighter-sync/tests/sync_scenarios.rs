//! End-to-end reconciliation runs against the in-memory store.

use std::fs;
use std::path::Path;

use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

use enlighter_core::{ContentError, PrNumber, RunContext, Settings};
use enlighter_store::{MemoryStore, Row, WriteOp};
use enlighter_sync::{
    delete_drafts, diff_content, sync_content, Action, ModifiedDirs, SyncError,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const INTRO: &str = "<!-- {\"title\": \"Intro\", \"next_button_title\": \"Start\"} -->\n<h1>Welcome</h1>\n";

fn write_project(root: &Path, dir: &str, sidecar: serde_json::Value, stages: &[(&str, &str)]) {
    let dir = root.join(dir);
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("project.json"), sidecar.to_string()).expect("sidecar");
    for (name, body) in stages {
        fs::write(dir.join(name), body).expect("stage");
    }
}

fn content_root() -> TempDir {
    let root = TempDir::new().expect("root");
    write_project(
        root.path(),
        "project_1_web_basics",
        json!({"id": 1, "title": "Web basics", "visible": true}),
        &[("1_37_intro.html", INTRO)],
    );
    root
}

fn ctx_for(pr: Option<i64>, lookup: &[(&str, &str)]) -> RunContext {
    let vars: Vec<(String, String)> = lookup
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let ctx = RunContext::from_lookup(|name| {
        vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    })
    .expect("ctx");
    match pr {
        Some(n) => ctx.with_pr_number(PrNumber::try_from(n).expect("pr")),
        None => ctx,
    }
}

fn row(value: serde_json::Value) -> Row {
    value.as_object().cloned().expect("object")
}

// ---------------------------------------------------------------------------
// 1. Content sync
// ---------------------------------------------------------------------------

#[test]
fn first_run_creates_project_and_stage() {
    let root = content_root();
    let store = MemoryStore::new();
    let ctx = ctx_for(None, &[]);

    let report = sync_content(
        &store,
        &ctx,
        &Settings::default(),
        &ModifiedDirs::default(),
        root.path(),
        false,
    )
    .expect("sync");

    assert_eq!(report.projects.created, 1);
    assert_eq!(report.stages.created, 1);

    let stage = &store.rows("stages")[0];
    assert_eq!(stage["id"], 37);
    assert_eq!(stage["order_num"], 1);
    assert_eq!(stage["title"], "Intro");
    assert_eq!(stage["next_button_title"], "Start");
    assert_eq!(stage["description"], "<h1>Welcome</h1>\n");
    assert_eq!(stage["project_id"], 1);
}

#[test]
fn second_run_issues_no_writes() {
    let root = content_root();
    let store = MemoryStore::new();
    let ctx = ctx_for(None, &[]);
    let settings = Settings::default();
    let modified = ModifiedDirs::default();

    sync_content(&store, &ctx, &settings, &modified, root.path(), false).expect("first");
    store.clear_writes();
    let report =
        sync_content(&store, &ctx, &settings, &modified, root.path(), false).expect("second");

    assert!(store.writes().is_empty(), "got writes: {:?}", store.writes());
    assert_eq!(report.projects.unchanged, 1);
    assert_eq!(report.stages.unchanged, 1);
}

#[test]
fn branch_change_updates_only_source_url() {
    let root = content_root();
    let store = MemoryStore::new();
    let settings = Settings::default();
    let modified = ModifiedDirs::default();

    let main = ctx_for(None, &[("GITHUB_REF_NAME", "main")]);
    sync_content(&store, &main, &settings, &modified, root.path(), false).expect("first");
    store.clear_writes();

    let release = ctx_for(None, &[("GITHUB_REF_NAME", "release")]);
    let report =
        sync_content(&store, &release, &settings, &modified, root.path(), false).expect("second");

    assert_eq!(report.stages.updated, 1);
    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    let WriteOp::Update { patch, .. } = &writes[0] else {
        panic!("expected update, got {writes:?}");
    };
    assert_eq!(patch.keys().collect::<Vec<_>>(), vec!["github_file_url"]);
    assert!(patch["github_file_url"]
        .as_str()
        .expect("url")
        .contains("/blob/release/project_1_web_basics/1_37_intro.html"));
}

#[test]
fn pr_run_creates_drafts_for_modified_dirs_only() {
    let root = content_root();
    write_project(
        root.path(),
        "project_2_other",
        json!({"id": 2, "title": "Other"}),
        &[("1_40_a.html", "<!-- {\"title\": \"A\"} -->\n<p>a</p>\n")],
    );
    let store = MemoryStore::new();
    let ctx = ctx_for(
        Some(5),
        &[
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("PR_NUMBER", "5"),
            ("GITHUB_BASE_REF", "main"),
            ("GITHUB_HEAD_REF", "feature/intro"),
        ],
    );
    let modified = ModifiedDirs::from_dirs(["project_1_web_basics"]);

    sync_content(&store, &ctx, &Settings::default(), &modified, root.path(), false).expect("sync");

    let project_ids: Vec<i64> = store
        .rows("projects")
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .collect();
    assert_eq!(project_ids, vec![-100005, 2]);

    let stages = store.rows("stages");
    let draft = stages.iter().find(|r| r["id"] == -3700005).expect("draft stage");
    assert_eq!(draft["project_id"], -100005);
    assert!(draft["github_file_url"]
        .as_str()
        .expect("url")
        .contains("/blob/feature/intro/"));
    let real = stages.iter().find(|r| r["id"] == 40).expect("real stage");
    assert!(real["github_file_url"].as_str().expect("url").contains("/blob/main/"));
}

#[test]
fn content_error_aborts_before_any_write() {
    let root = content_root();
    write_project(
        root.path(),
        "project_2_broken",
        json!({"id": 2, "title": "Broken"}),
        &[("1_40_no_meta.html", "<p>no metadata</p>\n")],
    );
    let store = MemoryStore::new();
    let ctx = ctx_for(None, &[]);

    let err = sync_content(
        &store,
        &ctx,
        &Settings::default(),
        &ModifiedDirs::default(),
        root.path(),
        false,
    )
    .unwrap_err();

    assert!(matches!(err, SyncError::Content(_)), "got: {err}");
    assert!(store.writes().is_empty());
}

#[rstest]
#[case::draft_run(Some(5))]
#[case::real_run(None)]
fn stage_with_zero_id_is_skipped_not_fatal(#[case] pr: Option<i64>) {
    let root = content_root();
    write_project(
        root.path(),
        "project_2_forms",
        json!({"id": 2, "title": "Forms"}),
        &[("1_0_y.html", "<!-- {\"title\": \"Y\"} -->\n<p>y</p>\n")],
    );
    let store = MemoryStore::new();
    let ctx = ctx_for(pr, &[]);
    let modified = ModifiedDirs::from_dirs(["project_1_web_basics", "project_2_forms"]);

    let report = sync_content(&store, &ctx, &Settings::default(), &modified, root.path(), false)
        .expect("sync");

    assert_eq!(report.projects.created, 2);
    assert_eq!(report.stages.created, 1);
    assert_eq!(report.stages.skipped, 1);
    assert_eq!(store.rows("stages").len(), 1);
}

#[rstest]
#[case::zero(0)]
#[case::negative(-2)]
fn non_positive_project_id_aborts_before_any_write(#[case] id: i64) {
    let root = content_root();
    write_project(
        root.path(),
        "project_2_forms",
        json!({"id": id, "title": "Forms"}),
        &[("1_40_form.html", INTRO)],
    );
    let store = MemoryStore::new();
    let ctx = ctx_for(Some(5), &[]);

    let err = sync_content(
        &store,
        &ctx,
        &Settings::default(),
        &ModifiedDirs::default(),
        root.path(),
        false,
    )
    .unwrap_err();

    assert!(
        matches!(err, SyncError::Content(ContentError::InvalidProjectId { id: got, .. }) if got == id),
        "got: {err}"
    );
    assert!(store.writes().is_empty());
}

#[test]
fn unparseable_file_names_are_counted_as_skipped() {
    let root = content_root();
    fs::write(
        root.path().join("project_1_web_basics/notes.html"),
        "<p>scratch</p>",
    )
    .expect("write");
    let store = MemoryStore::new();
    let ctx = ctx_for(None, &[]);

    let report = sync_content(
        &store,
        &ctx,
        &Settings::default(),
        &ModifiedDirs::default(),
        root.path(),
        false,
    )
    .expect("sync");
    assert_eq!(report.stages.skipped, 1);
    assert_eq!(report.stages.created, 1);
}

#[test]
fn store_failure_propagates() {
    let root = content_root();
    let store = MemoryStore::new();
    store.fail_writes(true);
    let ctx = ctx_for(None, &[]);

    let err = sync_content(
        &store,
        &ctx,
        &Settings::default(),
        &ModifiedDirs::default(),
        root.path(),
        false,
    )
    .unwrap_err();
    assert!(matches!(err, SyncError::Store(_)));
}

#[test]
fn diff_preview_matches_pending_update() {
    let root = content_root();
    let store = MemoryStore::new();
    let ctx = ctx_for(None, &[]);
    let settings = Settings::default();
    let modified = ModifiedDirs::default();
    sync_content(&store, &ctx, &settings, &modified, root.path(), false).expect("sync");

    fs::write(
        root.path().join("project_1_web_basics/1_37_intro.html"),
        INTRO.replace("Welcome", "Hello"),
    )
    .expect("edit");
    store.clear_writes();

    let diffs = diff_content(&store, &ctx, &settings, &modified, root.path()).expect("diff");
    assert!(store.writes().is_empty());
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].id, 37);
    assert!(!diffs[0].create);
    assert_eq!(diffs[0].fields[0].field, "description");
    assert!(diffs[0].fields[0].unified_diff.contains("-<h1>Welcome</h1>"));
    assert!(diffs[0].fields[0].unified_diff.contains("+<h1>Hello</h1>"));
}

// ---------------------------------------------------------------------------
// 2. Cleanup
// ---------------------------------------------------------------------------

#[rstest]
#[case(5, &[-1000123], &[-700005])]
#[case(123, &[-700005], &[-1000123])]
#[case(9, &[-700005, -1000123], &[])]
fn cleanup_only_touches_current_pr(
    #[case] pr: i64,
    #[case] kept: &[i64],
    #[case] deleted: &[i64],
) {
    let store = MemoryStore::new();
    store.seed(
        "projects",
        [
            row(json!({"id": -700005, "title": "Mine"})),
            row(json!({"id": -1000123, "title": "Theirs"})),
        ],
    );
    let settings = Settings::default();
    let report = delete_drafts(
        &store,
        &settings.tables,
        PrNumber::try_from(pr).expect("pr"),
        false,
    )
    .expect("cleanup");

    let remaining: Vec<i64> = store
        .rows("projects")
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .collect();
    assert_eq!(remaining, kept);
    assert_eq!(report.deleted_projects, deleted.len());
    for id in deleted {
        assert!(report
            .outcomes
            .iter()
            .any(|o| o.key == id.to_string() && o.action == Action::Deleted));
    }
}

#[test]
fn cleanup_skips_malformed_ids() {
    let store = MemoryStore::new();
    store.seed(
        "projects",
        [row(json!({"id": -42})), row(json!({"id": -700005}))],
    );
    let report = delete_drafts(
        &store,
        &Settings::default().tables,
        PrNumber::try_from(5).expect("pr"),
        false,
    )
    .expect("cleanup");
    assert_eq!(report.malformed, 1);
    assert_eq!(report.deleted_projects, 1);
    assert_eq!(store.rows("projects").len(), 1);
}

#[test]
fn drafts_from_sync_are_removed_by_cleanup() {
    let root = content_root();
    let store = MemoryStore::new();
    let ctx = ctx_for(Some(77), &[]);
    let modified = ModifiedDirs::from_dirs(["project_1_web_basics"]);
    let settings = Settings::default();

    sync_content(&store, &ctx, &settings, &modified, root.path(), false).expect("sync");
    assert_eq!(store.rows("stages")[0]["id"], -3_700_077);

    let report = delete_drafts(
        &store,
        &settings.tables,
        PrNumber::try_from(77).expect("pr"),
        false,
    )
    .expect("cleanup");
    assert_eq!(report.total_deleted(), 2);
    assert!(store.rows("projects").is_empty());
    assert!(store.rows("stages").is_empty());
}
