//! Domain model for tasks, reminders and priority decisions.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep persisted shapes and ephemeral decision values apart.
//!
//! # Invariants
//! - Every task and reminder is identified by a stable UUID.
//! - Reminders are strict children of tasks.

pub mod priority;
pub mod reminder;
pub mod task;
