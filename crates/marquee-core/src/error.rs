use std::path::PathBuf;

/// Errors that can occur across Marquee.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate reports it through `miette`.
///
/// # Examples
///
/// ```
/// use marquee_core::MarqueeError;
///
/// let err = MarqueeError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum MarqueeError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(marquee::config))]
    Config(String),

    /// GitHub API failure.
    #[error("GitHub error: {0}")]
    #[diagnostic(code(marquee::github))]
    GitHub(String),

    /// Diff parsing failure.
    #[error("parse error: {0}")]
    Parse(String),

    /// LLM API or response error.
    #[error("LLM error: {0}")]
    #[diagnostic(code(marquee::llm))]
    Llm(String),

    /// Prompt rendering failure.
    #[error("prompt error: {0}")]
    Prompt(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MarqueeError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = MarqueeError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn llm_error_displays_message() {
        let err = MarqueeError::Llm("LLM API error 500".into());
        assert_eq!(err.to_string(), "LLM error: LLM API error 500");
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = MarqueeError::FileNotFound(PathBuf::from("/tmp/prompt.txt"));
        assert!(err.to_string().contains("/tmp/prompt.txt"));
    }
}
