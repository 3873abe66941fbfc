//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, inference and scheduler calls into use-case
//!   level APIs.
//! - Keep CLI and host layers decoupled from storage details.

pub mod task_service;
