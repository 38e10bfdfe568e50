use std::path::Path;
use std::process::{Command, Output};

const MIXED_DIFF: &str = "\
diff --git a/src/test.js b/src/test.js
index 1111111..2222222 100644
--- a/src/test.js
+++ b/src/test.js
@@ -1 +1,2 @@
 const a = 1;
+console.log(\"hello world\");
diff --git a/package-lock.json b/package-lock.json
index 3333333..4444444 100644
--- a/package-lock.json
+++ b/package-lock.json
@@ -1 +1 @@
-\"lockfileVersion\": 2
+\"lockfileVersion\": 3
";

/// Run marquee in `dir` with a clean GitHub environment.
fn marquee(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_marquee"))
        .args(args)
        .current_dir(dir)
        .env_remove("GITHUB_ACTIONS")
        .env_remove("INPUT_SUGGEST_PR_TITLE")
        .env_remove("INPUT_LIGHT_MODEL")
        .env_remove("INPUT_OPENAI_BASE_URL")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

/// Config pointing the LLM at a port nothing listens on.
fn write_unreachable_config(dir: &Path) {
    std::fs::write(
        dir.join(".marquee.toml"),
        "[llm]\nbase_url = \"http://127.0.0.1:9\"\n",
    )
    .unwrap();
}

#[test]
fn files_lists_selection_as_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("changes.patch"), MIXED_DIFF).unwrap();

    let output = marquee(dir.path(), &["files", "--file", "changes.patch", "--format", "json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["files"][0]["filename"], "src/test.js");
    assert_eq!(value["excluded"][0]["filename"], "package-lock.json");
    assert_eq!(value["fellBack"], false);
}

#[test]
fn files_reports_lockfile_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let lock_only = MIXED_DIFF
        .split_once("diff --git a/package-lock.json")
        .map(|(_, rest)| format!("diff --git a/package-lock.json{rest}"))
        .unwrap();
    std::fs::write(dir.path().join("deps.patch"), lock_only).unwrap();

    let output = marquee(dir.path(), &["files", "--file", "deps.patch"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("package-lock.json"));
    assert!(stdout.contains("Only dependency files changed"));
}

#[test]
fn suggest_on_empty_diff_skips_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    write_unreachable_config(dir.path());
    std::fs::write(dir.path().join("empty.patch"), "").unwrap();

    let output = marquee(dir.path(), &["suggest", "--file", "empty.patch"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no files to analyze for PR title suggestion"));
    assert!(output.stdout.is_empty());
}

#[test]
fn suggest_backend_failure_still_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_unreachable_config(dir.path());
    std::fs::write(dir.path().join("changes.patch"), MIXED_DIFF).unwrap();

    let output = marquee(dir.path(), &["suggest", "--file", "changes.patch", "--title", "wip"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to generate PR title suggestions"));
    assert!(output.stdout.is_empty());
}

#[test]
fn suggest_disabled_through_action_input_does_nothing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("changes.patch"), MIXED_DIFF).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_marquee"))
        .args(["suggest", "--file", "changes.patch"])
        .current_dir(dir.path())
        .env_remove("GITHUB_ACTIONS")
        .env_remove("RUST_LOG")
        .env("INPUT_SUGGEST_PR_TITLE", "false")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
}

#[test]
fn suggest_rejects_malformed_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".marquee.toml"), "[suggest]\nenabled = \"sometimes\"\n").unwrap();

    let output = marquee(dir.path(), &["suggest", "--file", "missing.patch"]);

    assert!(!output.status.success());
}

#[test]
fn actions_push_event_skips_without_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let event_path = dir.path().join("event.json");
    std::fs::write(&event_path, r#"{"ref": "refs/heads/main", "commits": []}"#).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_marquee"))
        .arg("suggest")
        .current_dir(dir.path())
        .env("GITHUB_ACTIONS", "true")
        .env("GITHUB_EVENT_NAME", "push")
        .env("GITHUB_EVENT_PATH", &event_path)
        .env("GITHUB_REPOSITORY", "octocat/hello-world")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GH_TOKEN")
        .env_remove("INPUT_GITHUB_TOKEN")
        .env_remove("OPENAI_API_KEY")
        .env_remove("INPUT_SUGGEST_PR_TITLE")
        .env_remove("INPUT_OPENAI_BASE_URL")
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("current event is push, only support pull_request event"));
    assert!(output.stdout.is_empty());
}
