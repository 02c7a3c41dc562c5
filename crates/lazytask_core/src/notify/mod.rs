//! Reminder notifications for tasks that are about to fall due.
//!
//! # Responsibility
//! - Define the pluggable host capability (permission + show).
//! - Run the periodic due-task sweep and its permission state machine.
//!
//! # Invariants
//! - Missing or refused host permission degrades silently to `Unarmed`.
//! - No sweep runs after its `SweepHandle` has been shut down or dropped.

pub mod host;
pub mod scheduler;
