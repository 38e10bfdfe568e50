use std::path::Path;

use marquee_core::{AnalysisInput, MarqueeError};
use minijinja::{Environment, UndefinedBehavior};

const SUGGEST_PR_TITLE_TEMPLATE: &str = "\
You are Marquee, an assistant that names pull requests.

Current title: `{{ title }}`

Current description:
```
{{ description }}
```

Changes in this pull request:
```diff
{{ diff }}
```

Suggest exactly 3 pull request titles for these changes.

Rules:
- Follow the Conventional Commits format: `type(scope): summary`
- Use one of: feat, fix, docs, style, refactor, perf, test, build, ci, chore, revert
- Keep each title under 72 characters, imperative mood, no trailing period
- Describe what changed for the reader, not how it was implemented
- If only dependency lockfiles changed, prefer `chore(deps): ...`

Respond with a markdown numbered list of the 3 titles and nothing else.";

/// Renders the prompt sent to the chat backend.
pub trait PromptRenderer: Send + Sync {
    /// Build the title suggestion prompt for `input`.
    fn render_suggest_pr_title(&self, input: &AnalysisInput) -> Result<String, MarqueeError>;
}

/// Prompt renderer backed by a minijinja template.
///
/// The template sees the analysis input as `title`, `description` and
/// `diff`. Any other variable is an error, so a template can never render
/// without the values it refers to.
///
/// # Examples
///
/// ```
/// use marquee_core::AnalysisInput;
/// use marquee_suggest::prompt::{PromptRenderer, TemplatePrompts};
///
/// let prompts = TemplatePrompts::new("Title: {{ title }}\n{{ diff }}");
/// let input = AnalysisInput {
///     title: "wip".into(),
///     description: String::new(),
///     diff: "+x".into(),
/// };
/// assert_eq!(prompts.render_suggest_pr_title(&input).unwrap(), "Title: wip\n+x");
/// ```
#[derive(Debug, Clone)]
pub struct TemplatePrompts {
    env: Environment<'static>,
    suggest_pr_title: String,
}

impl Default for TemplatePrompts {
    fn default() -> Self {
        Self::new(SUGGEST_PR_TITLE_TEMPLATE)
    }
}

impl TemplatePrompts {
    /// Use `template` for title suggestions.
    ///
    /// Syntax errors surface when the template is rendered.
    pub fn new(template: impl Into<String>) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self {
            env,
            suggest_pr_title: template.into(),
        }
    }

    /// Load the title suggestion template from a file.
    ///
    /// # Errors
    ///
    /// Returns [`MarqueeError::FileNotFound`] if `path` does not exist,
    /// [`MarqueeError::Io`] if it cannot be read, and
    /// [`MarqueeError::Prompt`] if it is empty or not a valid template.
    pub fn from_file(path: &Path) -> Result<Self, MarqueeError> {
        if !path.exists() {
            return Err(MarqueeError::FileNotFound(path.to_path_buf()));
        }
        let template = std::fs::read_to_string(path)?;
        if template.trim().is_empty() {
            return Err(MarqueeError::Prompt(format!(
                "prompt template {} is empty",
                path.display()
            )));
        }
        let prompts = Self::new(template);
        prompts
            .env
            .template_from_str(&prompts.suggest_pr_title)
            .map_err(|e| {
                MarqueeError::Prompt(format!("invalid prompt template {}: {e}", path.display()))
            })?;
        Ok(prompts)
    }
}

impl PromptRenderer for TemplatePrompts {
    fn render_suggest_pr_title(&self, input: &AnalysisInput) -> Result<String, MarqueeError> {
        self.env
            .render_str(&self.suggest_pr_title, input)
            .map_err(|e| MarqueeError::Prompt(format!("failed to render prompt: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AnalysisInput {
        AnalysisInput {
            title: "Update stuff".into(),
            description: "Adds a cache layer".into(),
            diff: "--- src/cache.rs\n+pub struct Cache;\n\n".into(),
        }
    }

    #[test]
    fn default_template_embeds_all_inputs() {
        let prompt = TemplatePrompts::default()
            .render_suggest_pr_title(&input())
            .unwrap();
        assert!(prompt.contains("`Update stuff`"));
        assert!(prompt.contains("Adds a cache layer"));
        assert!(prompt.contains("+pub struct Cache;"));
        assert!(prompt.contains("exactly 3"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn values_are_not_rendered_as_templates() {
        let prompts = TemplatePrompts::new("{{ title }}|{{ diff }}");
        let tricky = AnalysisInput {
            title: "mention {{ diff }} here".into(),
            description: String::new(),
            diff: "+let html = \"<b>{% raw %}\";".into(),
        };
        let prompt = prompts.render_suggest_pr_title(&tricky).unwrap();
        assert_eq!(prompt, "mention {{ diff }} here|+let html = \"<b>{% raw %}\";");
    }

    #[test]
    fn dollar_placeholders_are_plain_text() {
        let prompts = TemplatePrompts::new("Name this PR:\n${diff}\n{{ diff }}");
        let secret = AnalysisInput {
            diff: "+SECRET_DIFF".into(),
            ..AnalysisInput::default()
        };
        let prompt = prompts.render_suggest_pr_title(&secret).unwrap();
        assert_eq!(prompt, "Name this PR:\n${diff}\n+SECRET_DIFF");
    }

    #[test]
    fn undefined_variable_is_a_prompt_error() {
        let prompts = TemplatePrompts::new("Name this PR:\n{{ patch }}");
        let err = prompts.render_suggest_pr_title(&input()).unwrap_err();
        assert!(matches!(err, MarqueeError::Prompt(_)));
        assert!(err.to_string().contains("failed to render prompt"));
    }

    #[test]
    fn template_can_branch_on_empty_description() {
        let prompts =
            TemplatePrompts::new("{% if description %}has body{% else %}no body{% endif %}");
        let empty = AnalysisInput::default();
        assert_eq!(prompts.render_suggest_pr_title(&empty).unwrap(), "no body");
        assert_eq!(prompts.render_suggest_pr_title(&input()).unwrap(), "has body");
    }

    #[test]
    fn template_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        std::fs::write(&path, "Name this: {{ diff }}").unwrap();
        let prompts = TemplatePrompts::from_file(&path).unwrap();
        let prompt = prompts.render_suggest_pr_title(&input()).unwrap();
        assert!(prompt.starts_with("Name this: --- src/cache.rs"));
    }

    #[test]
    fn malformed_template_file_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        std::fs::write(&path, "Name this: {{ diff ").unwrap();
        let err = TemplatePrompts::from_file(&path).unwrap_err();
        assert!(matches!(err, MarqueeError::Prompt(ref m) if m.contains("invalid prompt template")));
    }

    #[test]
    fn missing_template_file_is_reported() {
        let err = TemplatePrompts::from_file(Path::new("/nonexistent/prompt.md")).unwrap_err();
        assert!(matches!(err, MarqueeError::FileNotFound(_)));
    }

    #[test]
    fn empty_template_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        std::fs::write(&path, "\n  \n").unwrap();
        let err = TemplatePrompts::from_file(&path).unwrap_err();
        assert!(matches!(err, MarqueeError::Prompt(_)));
    }
}
