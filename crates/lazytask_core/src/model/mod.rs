//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record shared by store, manager and scheduler.
//! - Own text/date/time validation rules.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion removes the record; there are no tombstones.

pub mod task;
