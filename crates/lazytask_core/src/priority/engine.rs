//! Priority inference engine.
//!
//! # Responsibility
//! - Combine the model tier and the due-date fallback into one decision.
//!
//! # Invariants
//! - `classify`/`decide` never fail and never retry the model.
//! - Only an exact `HIGH|MEDIUM|LOW` completion (after trim + uppercase) is
//!   accepted from the model; anything else falls through.
//! - Model errors are logged by code only; prompts and completions are not.

use crate::clock::Clock;
use crate::inference::LanguageModelClient;
use crate::model::priority::{PriorityDecision, PriorityLabel};
use crate::model::task::Task;
use crate::priority::fallback::fallback_priority;
use crate::priority::prompt::build_priority_prompt;
use log::{info, warn};
use std::time::Instant;

/// Two-tier classifier: remote model first, deterministic rule second.
pub struct PriorityInferenceEngine<M: LanguageModelClient, C: Clock> {
    client: Option<M>,
    clock: C,
}

impl<M: LanguageModelClient, C: Clock> PriorityInferenceEngine<M, C> {
    /// Creates an engine. `client = None` runs the fallback tier only.
    pub fn new(client: Option<M>, clock: C) -> Self {
        Self { client, clock }
    }

    /// Creates an engine without a model tier.
    pub fn without_model(clock: C) -> Self {
        Self::new(None, clock)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn has_model(&self) -> bool {
        self.client.is_some()
    }

    /// Returns the task's priority label.
    pub fn classify(&self, task: &Task) -> PriorityLabel {
        self.decide(task).label
    }

    /// Returns the priority label together with the tier that produced it.
    pub fn decide(&self, task: &Task) -> PriorityDecision {
        let decision = self
            .remote_strategy(task)
            .map(PriorityDecision::from_model)
            .unwrap_or_else(|| PriorityDecision::from_fallback(self.local_strategy(task)));
        info!(
            "event=priority_classify module=priority status=ok task_id={} source={} label={}",
            task.id,
            decision.source.as_str(),
            decision.label
        );
        decision
    }

    /// Model tier. `None` on any client error or unusable completion.
    pub fn remote_strategy(&self, task: &Task) -> Option<PriorityLabel> {
        let client = self.client.as_ref()?;
        let started_at = Instant::now();

        let completion = match client.complete(&build_priority_prompt(task)) {
            Ok(completion) => completion,
            Err(err) => {
                warn!(
                    "event=priority_remote module=priority status=error task_id={} error_code={} duration_ms={}",
                    task.id,
                    err.code(),
                    started_at.elapsed().as_millis()
                );
                return None;
            }
        };

        let label = PriorityLabel::parse_label(&completion);
        if label.is_none() {
            warn!(
                "event=priority_remote module=priority status=error task_id={} error_code=unparseable output_chars={}",
                task.id,
                completion.chars().count()
            );
        }
        label
    }

    /// Fallback tier driven by the task's due date.
    pub fn local_strategy(&self, task: &Task) -> PriorityLabel {
        fallback_priority(task.due_date, self.clock.now_ms())
    }
}
