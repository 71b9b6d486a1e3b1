//! Priority ranking service.
//!
//! # Responsibility
//! - Impose the fixed, domain-defined display order over open label sets.
//!
//! # Invariants
//! - Ordering is a presentation concern; aggregation never depends on it.

pub mod table;
