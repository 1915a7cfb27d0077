//! # Reference Validator & Suggestion Engine
//!
//! Resolves each extracted reference against the corpus index (relative-path
//! resolution plus extension probing) and classifies it. Broken references
//! with `target_not_found` are annotated with a heuristic replacement drawn
//! from the source file's directory and its ancestors.
//!
//! Resolution is a pure function of (target string, source file, index) —
//! fully deterministic, no clock or network involvement.

mod resolve;
mod suggest;
mod types;

pub use resolve::resolve;
pub use suggest::SuggestionEngine;
pub use types::{ResolutionStatus, ResolvedReference};
