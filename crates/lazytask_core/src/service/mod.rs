//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store reads/writes into task use-cases.
//! - Keep presentation layers decoupled from storage details.

pub mod task_manager;
