//! Two-tier task priority classification.
//!
//! # Responsibility
//! - Ask a language model for a priority label and fall back to a
//!   deterministic due-date rule when it cannot give one.
//!
//! # Invariants
//! - Classification is infallible from the caller's point of view.
//! - A decision comes from exactly one tier; model output is never blended
//!   with the fallback.

pub mod engine;
pub mod fallback;
pub mod prompt;

pub use engine::PriorityInferenceEngine;
pub use fallback::{days_until_due, fallback_priority};
pub use prompt::build_priority_prompt;
