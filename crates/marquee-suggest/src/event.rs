//! GitHub Actions event context.
//!
//! Actions describes the triggering event through environment variables and a
//! JSON payload file. These helpers turn them into an [`EventContext`] that is
//! handed to the suggester explicitly.

use std::path::Path;

use marquee_core::{EventContext, MarqueeError, PullRequestPayload};
use serde::Deserialize;

#[derive(Deserialize)]
struct EventPayload {
    #[serde(default)]
    pull_request: Option<PullRequestPayload>,
}

/// Returns `true` when running inside a GitHub Actions job.
pub fn is_github_actions<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup("GITHUB_ACTIONS").is_some_and(|v| v == "true")
}

/// Build the event context from Actions environment variables.
///
/// Reads the event name from `GITHUB_EVENT_NAME` and the pull request from the
/// JSON file named by `GITHUB_EVENT_PATH`. A missing `GITHUB_EVENT_PATH` yields
/// an event without a pull request.
///
/// # Errors
///
/// Returns [`MarqueeError::Config`] if `GITHUB_EVENT_NAME` is unset, and
/// [`MarqueeError::Io`] / [`MarqueeError::Serialization`] if the payload file
/// cannot be read or parsed.
pub fn load_event<F>(lookup: F) -> Result<EventContext, MarqueeError>
where
    F: Fn(&str) -> Option<String>,
{
    let event_name = lookup("GITHUB_EVENT_NAME")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| MarqueeError::Config("GITHUB_EVENT_NAME is not set".into()))?;

    let pull_request = match lookup("GITHUB_EVENT_PATH").filter(|p| !p.is_empty()) {
        Some(path) => read_payload(Path::new(&path))?,
        None => None,
    };

    Ok(EventContext {
        event_name,
        pull_request,
    })
}

/// Shorthand for [`load_event`] over the process environment.
///
/// # Errors
///
/// See [`load_event`].
pub fn event_from_env() -> Result<EventContext, MarqueeError> {
    load_event(|name| std::env::var(name).ok())
}

fn read_payload(path: &Path) -> Result<Option<PullRequestPayload>, MarqueeError> {
    if !path.exists() {
        return Err(MarqueeError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let payload: EventPayload = serde_json::from_str(&content)?;
    Ok(payload.pull_request)
}

/// Read `owner` and `repo` from `GITHUB_REPOSITORY`.
///
/// # Errors
///
/// Returns [`MarqueeError::Config`] if the variable is unset or malformed.
pub fn repository_from_env<F>(lookup: F) -> Result<(String, String), MarqueeError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup("GITHUB_REPOSITORY")
        .ok_or_else(|| MarqueeError::Config("GITHUB_REPOSITORY is not set".into()))?;
    crate::github::parse_repository(&value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn loads_pull_request_from_payload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(
            &path,
            r#"{
                "action": "opened",
                "number": 5,
                "pull_request": {"number": 5, "title": "Add cache", "body": "Speeds up reads", "draft": false}
            }"#,
        )
        .unwrap();

        let event = load_event(env(&[
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_EVENT_PATH", path.to_str().unwrap()),
        ]))
        .unwrap();

        assert!(event.is_pull_request_event());
        let pr = event.pull_request.unwrap();
        assert_eq!(pr.number, 5);
        assert_eq!(pr.title, "Add cache");
        assert_eq!(pr.body.as_deref(), Some("Speeds up reads"));
    }

    #[test]
    fn push_payload_has_no_pull_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"ref": "refs/heads/main", "commits": []}"#).unwrap();

        let event = load_event(env(&[
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_EVENT_PATH", path.to_str().unwrap()),
        ]))
        .unwrap();

        assert_eq!(event.event_name, "push");
        assert!(event.pull_request.is_none());
    }

    #[test]
    fn missing_event_path_means_no_payload() {
        let event = load_event(env(&[("GITHUB_EVENT_NAME", "pull_request")])).unwrap();
        assert!(event.pull_request.is_none());
    }

    #[test]
    fn missing_event_name_is_a_config_error() {
        let err = load_event(env(&[])).unwrap_err();
        assert!(matches!(err, MarqueeError::Config(_)));
    }

    #[test]
    fn unreadable_payload_path_is_reported() {
        let err = load_event(env(&[
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_EVENT_PATH", "/nonexistent/event.json"),
        ]))
        .unwrap_err();
        assert!(matches!(err, MarqueeError::FileNotFound(_)));
    }

    #[test]
    fn repository_is_split_into_owner_and_repo() {
        let (owner, repo) =
            repository_from_env(env(&[("GITHUB_REPOSITORY", "octocat/hello-world")])).unwrap();
        assert_eq!(owner, "octocat");
        assert_eq!(repo, "hello-world");
        assert!(repository_from_env(env(&[])).is_err());
    }

    #[test]
    fn detects_actions_runner() {
        assert!(is_github_actions(env(&[("GITHUB_ACTIONS", "true")])));
        assert!(!is_github_actions(env(&[])));
    }
}
