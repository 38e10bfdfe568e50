use std::fmt;
use std::sync::Arc;

use marquee_core::{AnalysisInput, DiffSnapshot, EventContext, MarqueeError, SuggestConfig};
use marquee_difflens::consolidate::{consolidate_diff, has_meaningful_content};
use marquee_difflens::filter::select_for_analysis;
use tracing::{debug, info, warn};

use crate::comment::{CommentMode, CommentPublisher, PR_TITLE_TAG};
use crate::llm::{ChatBackend, ChatOptions};
use crate::prompt::PromptRenderer;

/// Why a suggestion run stopped without posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The event is not a pull request event.
    UnsupportedEvent(String),
    /// The event carries no pull request.
    MissingPullRequest,
    /// The pull request changed no files.
    NoFiles,
    /// None of the selected files has patch text.
    NoDiffContent,
    /// The backend returned nothing usable.
    NoSuggestions,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedEvent(name) => write!(
                f,
                "current event is {name}, only support pull_request event"
            ),
            SkipReason::MissingPullRequest => {
                write!(f, "no pull request payload attached to the event")
            }
            SkipReason::NoFiles => write!(f, "no files to analyze for PR title suggestion"),
            SkipReason::NoDiffContent => {
                write!(f, "no meaningful diff content for PR title suggestion")
            }
            SkipReason::NoSuggestions => write!(f, "no PR title suggestions generated"),
        }
    }
}

/// What a suggestion run did. Every variant is a normal completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestOutcome {
    /// The feature is turned off.
    Disabled,
    /// The run stopped early.
    Skipped(SkipReason),
    /// Suggestions were published.
    Posted,
    /// A collaborator failed; carries the error message.
    Failed(String),
}

impl fmt::Display for SuggestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestOutcome::Disabled => write!(f, "PR title suggestions are disabled"),
            SuggestOutcome::Skipped(reason) => write!(f, "Skipped: {reason}"),
            SuggestOutcome::Posted => write!(f, "PR title suggestions posted"),
            SuggestOutcome::Failed(msg) => {
                write!(f, "Failed to generate PR title suggestions: {msg}")
            }
        }
    }
}

/// Builds the comment that carries the suggestions.
///
/// # Examples
///
/// ```
/// use marquee_suggest::suggest::format_suggestion_comment;
///
/// let body = format_suggestion_comment("1. feat: add cache");
/// assert!(body.starts_with("### 🏷️ Pull Request Title Suggestions"));
/// assert!(body.contains("1. feat: add cache"));
/// ```
pub fn format_suggestion_comment(suggestions: &str) -> String {
    format!(
        "### 🏷️ Pull Request Title Suggestions

Based on the changes in this PR, here are 3 conventional commit style title suggestions:

{suggestions}

---
*Feel free to use one of these suggestions or modify them to better fit your changes.*"
    )
}

/// Suggests pull request titles and publishes them as a single comment.
///
/// Lockfiles are left out of the analyzed diff unless nothing else changed.
/// Running it again on the same pull request replaces the earlier comment.
/// [`TitleSuggester::suggest`] never fails: every skip or collaborator error
/// is logged as a warning and reported through [`SuggestOutcome`].
pub struct TitleSuggester {
    chat: Arc<dyn ChatBackend>,
    prompts: Arc<dyn PromptRenderer>,
    commenter: Arc<dyn CommentPublisher>,
}

impl TitleSuggester {
    /// Create a suggester from its collaborators.
    pub fn new(
        chat: Arc<dyn ChatBackend>,
        prompts: Arc<dyn PromptRenderer>,
        commenter: Arc<dyn CommentPublisher>,
    ) -> Self {
        Self {
            chat,
            prompts,
            commenter,
        }
    }

    /// Run one suggestion pass for `event` over `snapshot`.
    pub async fn suggest(
        &self,
        config: &SuggestConfig,
        event: &EventContext,
        snapshot: &DiffSnapshot,
    ) -> SuggestOutcome {
        if !config.enabled {
            return SuggestOutcome::Disabled;
        }

        if !event.is_pull_request_event() {
            return skip(SkipReason::UnsupportedEvent(event.event_name.clone()));
        }

        let Some(pr) = event.pull_request.as_ref() else {
            return skip(SkipReason::MissingPullRequest);
        };

        if snapshot.is_empty() {
            return skip(SkipReason::NoFiles);
        }

        let selection = select_for_analysis(&snapshot.files);
        debug!(
            selected = selection.files.len(),
            excluded = selection.excluded.len(),
            fell_back = selection.fell_back,
            "selected files for title analysis"
        );

        let diff = consolidate_diff(&selection.files);
        if !has_meaningful_content(&diff) {
            return skip(SkipReason::NoDiffContent);
        }

        let input = AnalysisInput {
            title: pr.title.clone(),
            description: pr.body.clone().unwrap_or_default(),
            diff,
        };

        info!("Generating PR title suggestions...");

        match self.generate_and_publish(&input).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Failed to generate PR title suggestions: {e}");
                SuggestOutcome::Failed(e.to_string())
            }
        }
    }

    async fn generate_and_publish(
        &self,
        input: &AnalysisInput,
    ) -> Result<SuggestOutcome, MarqueeError> {
        let prompt = self.prompts.render_suggest_pr_title(input)?;
        let responses = self.chat.chat(&prompt, &ChatOptions::default()).await?;

        let Some(title_response) = responses.into_iter().next().filter(|r| !r.trim().is_empty())
        else {
            return Ok(skip(SkipReason::NoSuggestions));
        };

        let comment = format_suggestion_comment(&title_response);
        self.commenter
            .comment(&comment, PR_TITLE_TAG, CommentMode::Replace)
            .await?;

        info!("PR title suggestions posted successfully");
        Ok(SuggestOutcome::Posted)
    }
}

fn skip(reason: SkipReason) -> SuggestOutcome {
    warn!("Skipped: {reason}");
    SuggestOutcome::Skipped(reason)
}
