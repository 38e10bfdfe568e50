use std::time::Duration;

use async_trait::async_trait;
use marquee_core::{LlmConfig, MarqueeError};
use serde::Serialize;

/// Per-request options for a chat call. The default leaves every knob to
/// the backend.
///
/// # Examples
///
/// ```
/// use marquee_suggest::llm::ChatOptions;
///
/// let options = ChatOptions::default();
/// assert!(options.temperature.is_none());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChatOptions {
    /// Sampling temperature override.
    pub temperature: Option<f32>,
}

/// A text-generation backend.
///
/// Returns one or more candidate completions for `prompt`, in backend order.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send `prompt` and return the generated texts.
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<Vec<String>, MarqueeError>;
}

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use marquee_suggest::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Suggest a title".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Role in the chat conversation. Prompts are sent as a single user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input.
    User,
}

/// OpenAI-compatible chat completions client.
///
/// Works with any provider that exposes the `/v1/chat/completions` endpoint:
/// OpenAI, Ollama, vLLM, LiteLLM, etc.
///
/// # Examples
///
/// ```
/// use marquee_core::LlmConfig;
/// use marquee_suggest::llm::LlmClient;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// assert_eq!(client.model(), "gpt-4o-mini");
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MarqueeError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, MarqueeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| MarqueeError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Return the model name from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body(&self, messages: &[ChatMessage], options: &ChatOptions) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
        });
        if let Some(t) = options.temperature.or(self.config.temperature) {
            body["temperature"] = serde_json::json!(t);
        }
        body
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    /// Send a single user message to `{base_url}/v1/chat/completions`.
    ///
    /// # Errors
    ///
    /// Returns [`MarqueeError::Llm`] on HTTP errors or response parsing failures.
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<Vec<String>, MarqueeError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com")
            .trim_end_matches('/');
        let url = format!("{base_url}/v1/chat/completions");

        let messages = [ChatMessage {
            role: Role::User,
            content: prompt.to_string(),
        }];
        let body = self.request_body(&messages, options);

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }
        request = request.header("Content-Type", "application/json");

        tracing::debug!(model = %self.config.model, %url, "sending chat completion request");

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| MarqueeError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(MarqueeError::Llm(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MarqueeError::Llm(format!("failed to parse response: {e}")))?;

        parse_choices(&response_body)
    }
}

/// Extract every `choices[*].message.content` string from a chat
/// completions response.
///
/// Choices without string content (e.g. tool calls) are skipped.
///
/// # Errors
///
/// Returns [`MarqueeError::Llm`] if the response has no `choices` array.
///
/// # Examples
///
/// ```
/// use marquee_suggest::llm::parse_choices;
///
/// let body = serde_json::json!({
///     "choices": [{"message": {"role": "assistant", "content": "1. feat: add cache"}}]
/// });
/// assert_eq!(parse_choices(&body).unwrap(), vec!["1. feat: add cache"]);
/// ```
pub fn parse_choices(response: &serde_json::Value) -> Result<Vec<String>, MarqueeError> {
    let choices = response
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| MarqueeError::Llm(format!("unexpected response structure: {response}")))?;

    Ok(choices
        .iter()
        .filter_map(|c| c.get("message")?.get("content")?.as_str())
        .map(str::to_string)
        .collect())
}
