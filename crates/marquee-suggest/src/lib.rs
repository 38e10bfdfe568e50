//! PR title suggestion orchestration and its collaborators.
//!
//! Provides the suggester itself plus concrete backends: an OpenAI-compatible
//! chat client, a template prompt renderer, a GitHub comment publisher with
//! tag-based upsert, and a GitHub Actions event loader.

pub mod comment;
pub mod event;
pub mod github;
pub mod llm;
pub mod prompt;
pub mod suggest;
