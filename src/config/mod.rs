// src/config/mod.rs
// Configuration: environment credentials and file-based tunables

pub mod env;
pub mod file;

pub use env::{OracleCredentials, db_path_from_env};
pub use file::{IntakeConfig, LoggingSection, OracleSection};
