use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Event names that carry a pull request payload.
pub const PULL_REQUEST_EVENTS: &[&str] = &["pull_request", "pull_request_target"];

/// A single file changed by a pull request.
///
/// Deserializes directly from an entry of GitHub's "list pull request files"
/// response; unknown fields are ignored.
///
/// # Examples
///
/// ```
/// use marquee_core::ChangedFile;
///
/// let file: ChangedFile = serde_json::from_str(
///     r#"{"filename":"src/main.rs","status":"modified","patch":"@@ -1 +1 @@\n-a\n+b"}"#,
/// ).unwrap();
/// assert_eq!(file.filename, "src/main.rs");
/// assert!(file.has_patch());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path of the file relative to the repository root.
    pub filename: String,
    /// Unified diff text for this file. `None` for binary or oversized changes.
    #[serde(default)]
    pub patch: Option<String>,
}

impl ChangedFile {
    /// Create a changed file with a patch.
    pub fn new(filename: impl Into<String>, patch: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            patch: Some(patch.into()),
        }
    }

    /// Create a changed file without patch text (e.g. a binary change).
    pub fn without_patch(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            patch: None,
        }
    }

    /// Returns `true` if the file carries non-empty patch text.
    pub fn has_patch(&self) -> bool {
        self.patch.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// The ordered set of files changed by a pull request.
///
/// Order is the platform's reported order and is preserved throughout.
///
/// # Examples
///
/// ```
/// use marquee_core::{ChangedFile, DiffSnapshot};
///
/// let snapshot = DiffSnapshot::from(vec![ChangedFile::new("a.rs", "+x")]);
/// assert_eq!(snapshot.len(), 1);
///
/// let empty: DiffSnapshot = serde_json::from_str("{}").unwrap();
/// assert!(empty.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSnapshot {
    /// Changed files in platform order.
    #[serde(default)]
    pub files: Vec<ChangedFile>,
}

impl DiffSnapshot {
    /// Number of changed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no files changed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl From<Vec<ChangedFile>> for DiffSnapshot {
    fn from(files: Vec<ChangedFile>) -> Self {
        Self { files }
    }
}

/// Values substituted into the title suggestion prompt.
///
/// # Examples
///
/// ```
/// use marquee_core::AnalysisInput;
///
/// let input = AnalysisInput {
///     title: "Update stuff".into(),
///     description: String::new(),
///     diff: "--- src/lib.rs\n+fn new() {}\n\n".into(),
/// };
/// assert!(input.description.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisInput {
    /// Current pull request title.
    pub title: String,
    /// Current pull request description, empty when absent.
    pub description: String,
    /// Consolidated diff of the files selected for analysis.
    pub diff: String,
}

/// The pull request attached to an event.
///
/// # Examples
///
/// ```
/// use marquee_core::PullRequestPayload;
///
/// let pr: PullRequestPayload = serde_json::from_str(
///     r#"{"number": 7, "title": "Add cache", "body": null, "state": "open"}"#,
/// ).unwrap();
/// assert_eq!(pr.number, 7);
/// assert!(pr.body.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestPayload {
    /// Pull request number.
    pub number: u64,
    /// Current title.
    #[serde(default)]
    pub title: String,
    /// Current description, if any.
    #[serde(default)]
    pub body: Option<String>,
}

/// The triggering event, passed explicitly to the suggester.
///
/// # Examples
///
/// ```
/// use marquee_core::{EventContext, PullRequestPayload};
///
/// let event = EventContext::pull_request(PullRequestPayload {
///     number: 1,
///     title: "Fix".into(),
///     body: None,
/// });
/// assert!(event.is_pull_request_event());
///
/// let push = EventContext { event_name: "push".into(), pull_request: None };
/// assert!(!push.is_pull_request_event());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    /// Name of the event, e.g. `pull_request` or `push`.
    pub event_name: String,
    /// Pull request payload, when the event carries one.
    pub pull_request: Option<PullRequestPayload>,
}

impl EventContext {
    /// Build a `pull_request` event around an existing payload.
    pub fn pull_request(payload: PullRequestPayload) -> Self {
        Self {
            event_name: "pull_request".into(),
            pull_request: Some(payload),
        }
    }

    /// Returns `true` if the event is one of [`PULL_REQUEST_EVENTS`].
    pub fn is_pull_request_event(&self) -> bool {
        PULL_REQUEST_EVENTS.contains(&self.event_name.as_str())
    }
}

/// Output format for CLI results.
///
/// # Examples
///
/// ```
/// use marquee_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summaries.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
