//! Priority classification values.
//!
//! # Responsibility
//! - Define the authoritative `PriorityLabel` for task urgency.
//! - Provide the one-way numeric projection used for sorting/display.
//!
//! # Invariants
//! - `PriorityLabel` is the source of truth; the numeric value is derived.
//! - A `PriorityDecision` comes from exactly one tier.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Task urgency label.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLabel {
    Low,
    /// Default for tasks without a decision yet.
    #[default]
    Medium,
    High,
}

impl PriorityLabel {
    /// Stable label string (`HIGH|MEDIUM|LOW`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    /// Numeric projection: 1=LOW, 2=MEDIUM, 3=HIGH.
    pub fn as_numeric(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    /// Parses free-form model output.
    ///
    /// The text is trimmed and uppercased; anything other than an exact
    /// label match yields `None`.
    pub fn parse_label(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

impl Display for PriorityLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier that produced a priority decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrioritySource {
    /// Remote language-model judgment.
    Model,
    /// Deterministic due-date rule.
    Fallback,
}

impl PrioritySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        }
    }
}

/// Ephemeral classification result. Never persisted as its own entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityDecision {
    pub label: PriorityLabel,
    pub source: PrioritySource,
}

impl PriorityDecision {
    pub fn from_model(label: PriorityLabel) -> Self {
        Self {
            label,
            source: PrioritySource::Model,
        }
    }

    pub fn from_fallback(label: PriorityLabel) -> Self {
        Self {
            label,
            source: PrioritySource::Fallback,
        }
    }
}
