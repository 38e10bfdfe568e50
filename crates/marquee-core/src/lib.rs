//! Core types, configuration, and error handling for Marquee.
//!
//! This crate provides the shared foundation used by the other Marquee crates:
//! - [`MarqueeError`]: unified error type using `thiserror`
//! - [`MarqueeConfig`]: configuration loaded from `.marquee.toml`
//! - Shared types: [`ChangedFile`], [`DiffSnapshot`], [`AnalysisInput`],
//!   [`EventContext`], [`PullRequestPayload`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{LlmConfig, MarqueeConfig, SuggestConfig};
pub use error::MarqueeError;
pub use types::{
    AnalysisInput, ChangedFile, DiffSnapshot, EventContext, OutputFormat, PullRequestPayload,
    PULL_REQUEST_EVENTS,
};

/// A convenience `Result` type for Marquee operations.
pub type Result<T> = std::result::Result<T, MarqueeError>;
