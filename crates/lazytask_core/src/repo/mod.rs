//! Persistence contracts and implementations for the task collection.
//!
//! # Responsibility
//! - Define the whole-collection load/save contract.
//! - Isolate SQLite and JSON details from the manager and scheduler.
//!
//! # Invariants
//! - There is no update-in-place API; writers replace the whole collection.
//! - Reads fail soft: missing or corrupt data loads as an empty collection.

pub mod task_store;
