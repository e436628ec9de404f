//! IncidentBuddy - IT incident deduplication
//!
//! Checks whether a newly reported incident matches one that was already
//! solved, reuses its solution when it does, and otherwise asks an LLM for a
//! new resolution. Every incident is stored with its solution and a keyword
//! priority so later incidents can match against it.
//!
//! # Architecture
//!
//! - **classifier**: keyword tiers → priority 1..=5
//! - **oracle** / **generator**: completion-service clients with retry
//! - **matcher**: reuse-or-generate decision over a priority-ordered snapshot
//! - **store** / **service**: SQLite persistence and the intake paths

pub mod errors;
pub use errors::{IncidentError, Result};

pub mod classifier;
pub mod completion;
pub mod generator;
pub mod matcher;
pub mod oracle;
pub mod retry;

pub mod cli;
pub mod logging;
pub mod service;
pub mod store;

pub use classifier::classify_priority;
pub use matcher::{Matcher, Resolution};
