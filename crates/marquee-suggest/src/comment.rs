use async_trait::async_trait;
use marquee_core::MarqueeError;

/// Hidden marker identifying the title suggestion comment on a pull request.
pub const PR_TITLE_TAG: &str = "<!-- marquee: pr title suggestions -->";

/// How a tagged comment is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentMode {
    /// Edit the existing comment carrying the tag, or post one if none exists.
    Replace,
}

/// Publishes comments on the pull request under review.
#[async_trait]
pub trait CommentPublisher: Send + Sync {
    /// Publish `body`, identified by `tag`, according to `mode`.
    async fn comment(&self, body: &str, tag: &str, mode: CommentMode) -> Result<(), MarqueeError>;
}

/// Append the hidden tag so the comment can be found again later.
///
/// # Examples
///
/// ```
/// use marquee_suggest::comment::{tagged_body, PR_TITLE_TAG};
///
/// let body = tagged_body("### Titles", PR_TITLE_TAG);
/// assert!(body.starts_with("### Titles"));
/// assert!(body.ends_with(PR_TITLE_TAG));
/// ```
pub fn tagged_body(body: &str, tag: &str) -> String {
    format!("{body}\n\n{tag}")
}

/// Publisher that prints comments to stdout instead of posting them.
///
/// Used for dry runs and for local diffs that have no pull request to
/// comment on.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutPublisher;

#[async_trait]
impl CommentPublisher for StdoutPublisher {
    async fn comment(&self, body: &str, _tag: &str, _mode: CommentMode) -> Result<(), MarqueeError> {
        println!("{body}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_separated_by_blank_line() {
        assert_eq!(tagged_body("hello", "<!-- t -->"), "hello\n\n<!-- t -->");
    }

    #[test]
    fn tag_is_an_html_comment() {
        assert!(PR_TITLE_TAG.starts_with("<!--"));
        assert!(PR_TITLE_TAG.ends_with("-->"));
    }

    #[tokio::test]
    async fn stdout_publisher_never_fails() {
        let result = StdoutPublisher
            .comment("body", PR_TITLE_TAG, CommentMode::Replace)
            .await;
        assert!(result.is_ok());
    }
}
