//! Domain model for periodic observations and pivot output.
//!
//! # Responsibility
//! - Define the normalized observation record consumed by the engine.
//! - Define pivot dimensions, keys, and annotated cell values.
//!
//! # Invariants
//! - Every observation has a stable `ObservationId`; deltas attach to it.
//! - Quarter is always derived from month, never supplied.

pub mod dimension;
pub mod observation;
pub mod pivot;
