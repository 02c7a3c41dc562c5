//! Pure task queries used by presentation and reminders.
//!
//! # Responsibility
//! - Filter task lists without touching storage.
//! - Decide overdue state and render short due labels.
//!
//! # Invariants
//! - Every function here is side-effect free; callers pass `now` explicitly.

pub mod due;
pub mod filter;
