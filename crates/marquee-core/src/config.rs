use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::MarqueeError;

/// Top-level configuration loaded from `.marquee.toml`.
///
/// Supports layered resolution: CLI flags > action inputs > local config > defaults.
///
/// # Examples
///
/// ```
/// use marquee_core::MarqueeConfig;
///
/// let config = MarqueeConfig::default();
/// assert!(config.suggest.enabled);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarqueeConfig {
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Title suggestion behavior.
    #[serde(default)]
    pub suggest: SuggestConfig,
}

impl MarqueeConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MarqueeError::Io`] if the file cannot be read, or
    /// [`MarqueeError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use marquee_core::MarqueeConfig;
    /// use std::path::Path;
    ///
    /// let config = MarqueeConfig::from_file(Path::new(".marquee.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, MarqueeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`MarqueeError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use marquee_core::MarqueeConfig;
    ///
    /// let toml = r#"
    /// [suggest]
    /// enabled = false
    /// "#;
    /// let config = MarqueeConfig::from_toml(toml).unwrap();
    /// assert!(!config.suggest.enabled);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, MarqueeError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay GitHub Actions inputs on top of the file configuration.
    ///
    /// Actions exposes step inputs as `INPUT_<NAME>` environment variables.
    /// `lookup` abstracts the environment so callers and tests can supply
    /// their own source. Recognized inputs: `suggest_pr_title`, `light_model`
    /// and `openai_base_url`. Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MarqueeError::Config`] if `suggest_pr_title` is not a boolean.
    ///
    /// # Examples
    ///
    /// ```
    /// use marquee_core::MarqueeConfig;
    ///
    /// let mut config = MarqueeConfig::default();
    /// config
    ///     .apply_action_inputs(|name| match name {
    ///         "INPUT_LIGHT_MODEL" => Some("gpt-4.1-mini".to_string()),
    ///         _ => None,
    ///     })
    ///     .unwrap();
    /// assert_eq!(config.llm.model, "gpt-4.1-mini");
    /// ```
    pub fn apply_action_inputs<F>(&mut self, lookup: F) -> Result<(), MarqueeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(raw) = input("INPUT_SUGGEST_PR_TITLE") {
            self.suggest.enabled = parse_bool(&raw).ok_or_else(|| {
                MarqueeError::Config(format!(
                    "suggest_pr_title must be true or false, got '{raw}'"
                ))
            })?;
        }
        if let Some(model) = input("INPUT_LIGHT_MODEL") {
            self.llm.model = model;
        }
        if let Some(base_url) = input("INPUT_OPENAI_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// LLM provider configuration.
///
/// Marquee talks to the provider through an OpenAI-compatible chat
/// completions endpoint, so `provider` only selects the API key variable.
///
/// # Examples
///
/// ```
/// use marquee_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-4o-mini");
/// assert_eq!(config.api_key_env_var(), "OPENAI_API_KEY");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name (e.g. `"openai"`, `"anthropic"`, `"ollama"`).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier. Title suggestions use a light model.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
    /// Sampling temperature. Provider default when unset.
    pub temperature: Option<f32>,
}

fn default_provider() -> String {
    "openai".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
            temperature: None,
        }
    }
}

impl LlmConfig {
    /// Environment variable consulted when `api_key` is not set.
    pub fn api_key_env_var(&self) -> &'static str {
        match self.provider.as_str() {
            "anthropic" => "ANTHROPIC_API_KEY",
            "gemini" => "GEMINI_API_KEY",
            _ => "OPENAI_API_KEY",
        }
    }

    /// Fill `api_key` from the provider's environment variable if unset.
    ///
    /// Returns `true` when a key is available afterwards.
    pub fn resolve_api_key<F>(&mut self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = lookup(self.api_key_env_var()).filter(|k| !k.is_empty());
        }
        self.api_key.is_some()
    }
}

/// Title suggestion configuration.
///
/// # Examples
///
/// ```
/// use marquee_core::SuggestConfig;
///
/// let config = SuggestConfig::default();
/// assert!(config.enabled);
/// assert!(config.prompt_template.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Whether title suggestions run at all (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Optional minijinja prompt template using `title`, `description` and `diff`.
    pub prompt_template: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            prompt_template: None,
        }
    }
}
