//! Temporal delta calculator.
//!
//! # Responsibility
//! - Compute, per (category, content) group, each observation's change
//!   relative to its immediately preceding period.
//!
//! # Invariants
//! - Deltas never cross group boundaries.
//! - The first observation of every group has null delta fields.
//! - Results attach to observation identity, not position.

pub mod branch;
pub mod calculator;
