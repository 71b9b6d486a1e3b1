//! Core use-case services.
//!
//! # Responsibility
//! - Compose delta computation, filtering and pivoting into report runs.
//! - Keep hosts (CLI, store) decoupled from the engine's internal steps.

pub mod report_service;
