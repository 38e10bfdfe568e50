use async_trait::async_trait;
use marquee_core::{ChangedFile, DiffSnapshot, MarqueeError, PullRequestPayload};
use serde::{Deserialize, Serialize};

use crate::comment::{tagged_body, CommentMode, CommentPublisher};

const PER_PAGE: u32 = 100;
// GitHub stops listing pull request files after 3000 entries.
const MAX_FILE_PAGES: u32 = 30;
const MAX_COMMENT_PAGES: u32 = 50;

#[derive(Serialize)]
struct PageParams {
    per_page: u32,
    page: u32,
}

/// An issue comment as returned by the GitHub REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    /// Comment id, used to edit it.
    pub id: u64,
    /// Markdown body.
    #[serde(default)]
    pub body: Option<String>,
}

/// GitHub client for reading pull requests and publishing comments.
///
/// # Examples
///
/// ```
/// use marquee_suggest::github::parse_pr_reference;
///
/// let (owner, repo, number) = parse_pr_reference("rust-lang/rust#12345").unwrap();
/// assert_eq!(owner, "rust-lang");
/// assert_eq!(repo, "rust");
/// assert_eq!(number, 12345);
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
}

impl GitHubClient {
    /// Create a client from an explicit token, `GITHUB_TOKEN`, or `GH_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`MarqueeError::Config`] if no token is available, or
    /// [`MarqueeError::GitHub`] if the client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use marquee_suggest::github::GitHubClient;
    ///
    /// let client = GitHubClient::new(Some("ghp_xxxx")).unwrap();
    /// ```
    pub fn new(token: Option<&str>) -> Result<Self, MarqueeError> {
        let token = match token {
            Some(t) => t.to_string(),
            None => std::env::var("GITHUB_TOKEN")
                .or_else(|_| std::env::var("GH_TOKEN"))
                .map_err(|_| {
                    MarqueeError::Config(
                        "GITHUB_TOKEN not set. Pass --github-token or set GITHUB_TOKEN env var"
                            .into(),
                    )
                })?,
        };

        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| MarqueeError::GitHub(format!("failed to create GitHub client: {e}")))?;

        Ok(Self { octocrab })
    }

    /// Fetch the title, body and number of a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`MarqueeError::GitHub`] on network or API errors.
    pub async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<PullRequestPayload, MarqueeError> {
        let route = format!("/repos/{owner}/{repo}/pulls/{pr_number}");
        self.octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| MarqueeError::GitHub(format!("failed to fetch pull request: {e}")))
    }

    /// List the files changed by a pull request, in GitHub's order.
    ///
    /// # Errors
    ///
    /// Returns [`MarqueeError::GitHub`] on network or API errors.
    pub async fn list_pr_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<DiffSnapshot, MarqueeError> {
        let route = format!("/repos/{owner}/{repo}/pulls/{pr_number}/files");
        let mut files: Vec<ChangedFile> = Vec::new();

        for page in 1..=MAX_FILE_PAGES {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<ChangedFile> = self
                .octocrab
                .get(&route, Some(&params))
                .await
                .map_err(|e| MarqueeError::GitHub(format!("failed to list PR files: {e}")))?;
            let last = batch.len() < PER_PAGE as usize;
            files.extend(batch);
            if last {
                break;
            }
        }

        tracing::debug!(count = files.len(), "fetched pull request files");
        Ok(DiffSnapshot::from(files))
    }

    /// Publish a tagged comment on a pull request.
    ///
    /// The first existing comment containing `tag` is edited in place; a new
    /// comment is created only when none exists (see [`upsert_target`]).
    ///
    /// # Errors
    ///
    /// Returns [`MarqueeError::GitHub`] on API errors.
    pub async fn upsert_comment(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        body: &str,
        tag: &str,
        mode: CommentMode,
    ) -> Result<(), MarqueeError> {
        let full_body = serde_json::json!({ "body": tagged_body(body, tag) });
        let comments = self.list_issue_comments(owner, repo, pr_number).await?;

        if let Some(comment_id) = upsert_target(&comments, tag, mode) {
            tracing::debug!(comment_id, "replacing tagged comment");
            let route = format!("/repos/{owner}/{repo}/issues/comments/{comment_id}");
            let _response: serde_json::Value = self
                .octocrab
                .patch(route, Some(&full_body))
                .await
                .map_err(|e| MarqueeError::GitHub(format!("failed to update comment: {e}")))?;
            return Ok(());
        }

        let route = format!("/repos/{owner}/{repo}/issues/{pr_number}/comments");
        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&full_body))
            .await
            .map_err(|e| MarqueeError::GitHub(format!("failed to create comment: {e}")))?;
        Ok(())
    }

    async fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<IssueComment>, MarqueeError> {
        let route = format!("/repos/{owner}/{repo}/issues/{pr_number}/comments");
        let mut comments = Vec::new();

        for page in 1..=MAX_COMMENT_PAGES {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<IssueComment> = self
                .octocrab
                .get(&route, Some(&params))
                .await
                .map_err(|e| MarqueeError::GitHub(format!("failed to list comments: {e}")))?;
            let last = batch.len() < PER_PAGE as usize;
            comments.extend(batch);
            if last {
                break;
            }
        }

        Ok(comments)
    }
}

/// Return the first comment whose body contains `tag`.
///
/// # Examples
///
/// ```
/// use marquee_suggest::github::{find_tagged_comment, IssueComment};
///
/// let comments = vec![
///     IssueComment { id: 1, body: Some("LGTM".into()) },
///     IssueComment { id: 2, body: Some("titles\n\n<!-- tag -->".into()) },
/// ];
/// assert_eq!(find_tagged_comment(&comments, "<!-- tag -->").map(|c| c.id), Some(2));
/// ```
pub fn find_tagged_comment<'a>(comments: &'a [IssueComment], tag: &str) -> Option<&'a IssueComment> {
    comments
        .iter()
        .find(|c| c.body.as_deref().is_some_and(|b| b.contains(tag)))
}

/// Id of the comment an upsert edits, or `None` when a new comment is posted.
///
/// # Examples
///
/// ```
/// use marquee_suggest::comment::CommentMode;
/// use marquee_suggest::github::{upsert_target, IssueComment};
///
/// let comments = vec![IssueComment { id: 7, body: Some("titles\n\n<!-- tag -->".into()) }];
/// assert_eq!(upsert_target(&comments, "<!-- tag -->", CommentMode::Replace), Some(7));
/// assert_eq!(upsert_target(&[], "<!-- tag -->", CommentMode::Replace), None);
/// ```
pub fn upsert_target(comments: &[IssueComment], tag: &str, mode: CommentMode) -> Option<u64> {
    match mode {
        CommentMode::Replace => find_tagged_comment(comments, tag).map(|c| c.id),
    }
}

/// A [`CommentPublisher`] bound to one pull request.
pub struct PrCommenter {
    client: GitHubClient,
    owner: String,
    repo: String,
    pr_number: u64,
}

impl PrCommenter {
    /// Bind `client` to `owner/repo#pr_number`.
    pub fn new(client: GitHubClient, owner: &str, repo: &str, pr_number: u64) -> Self {
        Self {
            client,
            owner: owner.to_string(),
            repo: repo.to_string(),
            pr_number,
        }
    }
}

#[async_trait]
impl CommentPublisher for PrCommenter {
    async fn comment(&self, body: &str, tag: &str, mode: CommentMode) -> Result<(), MarqueeError> {
        self.client
            .upsert_comment(&self.owner, &self.repo, self.pr_number, body, tag, mode)
            .await
    }
}

/// Parse a PR reference string (`owner/repo#number`) into its components.
///
/// # Errors
///
/// Returns [`MarqueeError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use marquee_suggest::github::parse_pr_reference;
///
/// let (owner, repo, num) = parse_pr_reference("octocat/hello-world#42").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// assert_eq!(num, 42);
/// ```
pub fn parse_pr_reference(pr_ref: &str) -> Result<(String, String, u64), MarqueeError> {
    let Some((owner_repo, number_str)) = pr_ref.split_once('#') else {
        return Err(MarqueeError::Config(format!(
            "invalid PR reference '{pr_ref}', expected owner/repo#number"
        )));
    };
    let (owner, repo) = parse_repository(owner_repo)?;
    let number: u64 = number_str
        .parse()
        .map_err(|_| MarqueeError::Config(format!("invalid PR number: {number_str}")))?;
    Ok((owner, repo, number))
}

/// Parse `owner/repo` into its components.
///
/// # Errors
///
/// Returns [`MarqueeError::Config`] if either side is missing.
pub fn parse_repository(owner_repo: &str) -> Result<(String, String), MarqueeError> {
    match owner_repo.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(MarqueeError::Config(format!(
            "invalid repository '{owner_repo}', expected owner/repo"
        ))),
    }
}
