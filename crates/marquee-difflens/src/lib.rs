//! Changed-file selection and diff consolidation.
//!
//! Decides which files of a pull request are worth showing to the LLM
//! (dependency lockfiles are dropped unless nothing else changed), joins
//! their patches into one text, and splits local `git diff` output into
//! per-file entries.

pub mod consolidate;
pub mod filter;
pub mod parser;
