//! Display-time classification and ordering of tasks.
//!
//! # Responsibility
//! - Map each task to an urgency section relative to a reference time.
//! - Provide a deterministic total order within a section.
//!
//! # Invariants
//! - Sorting is pure and never used for storage order.
//! - Completed tasks are kept out of urgency sections.

pub mod strategy;
