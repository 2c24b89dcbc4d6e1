// src/lib.rs
// Intake - conversational benefits intake engine

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod error;
pub mod intake;
pub mod oracle;
pub mod store;
pub mod utils;

pub use error::{IntakeError, Result};
pub use intake::{CaseSubmission, Conversation, IntakeOrchestrator, TurnResult};
