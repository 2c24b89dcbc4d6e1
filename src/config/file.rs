// src/config/file.rs
// File-based configuration from ~/.intake/config.toml

use crate::intake::gate::GatePolicy;
use crate::intake::stages::StageSettings;
use crate::error::{IntakeError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Default margin before declared token expiry at which a cached token is treated as stale
pub const DEFAULT_TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

/// Top-level config structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct IntakeConfig {
    /// Completion gate thresholds
    #[serde(default)]
    pub gate: GatePolicy,
    /// Per-stage oracle call settings (timeouts, history windows)
    #[serde(default)]
    pub stages: StageSettings,
    #[serde(default)]
    pub oracle: OracleSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Oracle transport section
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OracleSection {
    pub token_expiry_margin_secs: u64,
}

impl Default for OracleSection {
    fn default() -> Self {
        Self {
            token_expiry_margin_secs: DEFAULT_TOKEN_EXPIRY_MARGIN_SECS,
        }
    }
}

impl OracleSection {
    pub fn token_expiry_margin(&self) -> Duration {
        Duration::from_secs(self.token_expiry_margin_secs)
    }
}

/// Logging section
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSection {
    /// trace | debug | info | warn | error
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingSection {
    pub fn tracing_level(&self) -> Level {
        match self.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" | "warning" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

impl IntakeConfig {
    /// Read config from an explicit path.
    ///
    /// A missing file is `Ok(None)`; an unreadable or unparsable one is an
    /// error so the caller can report it once logging is up.
    pub fn try_load_from(path: &Path) -> Result<Option<Self>> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(IntakeError::Config(format!("{}: {}", path.display(), e)));
            }
        };
        toml::from_str(&contents)
            .map(Some)
            .map_err(|e| IntakeError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Path of ~/.intake/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".intake")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[gate]
question_threshold = 18

[stages]
history_window = 6

[oracle]
token_expiry_margin_secs = 120

[logging]
level = "debug"
"#;
        let config: IntakeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.gate.question_threshold, 18);
        // Unset keys keep their defaults
        assert_eq!(config.gate.mega_answer_min_topics, 5);
        assert_eq!(config.stages.history_window, 6);
        assert_eq!(config.oracle.token_expiry_margin(), Duration::from_secs(120));
        assert_eq!(config.logging.tracing_level(), Level::DEBUG);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: IntakeConfig = toml::from_str("").unwrap();
        assert_eq!(config.gate.question_threshold, 22);
        assert_eq!(config.oracle.token_expiry_margin_secs, 60);
        assert_eq!(config.logging.tracing_level(), Level::INFO);
    }

    #[test]
    fn test_load_from_missing_file() {
        let loaded = IntakeConfig::try_load_from(Path::new("/nonexistent/intake/config.toml"));
        assert!(loaded.unwrap().is_none());
    }

    #[test]
    fn test_load_from_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gate]\nquestion_threshold = 30").unwrap();
        let config = IntakeConfig::try_load_from(file.path()).unwrap().unwrap();
        assert_eq!(config.gate.question_threshold, 30);
    }

    #[test]
    fn test_load_from_invalid_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gate\nquestion_threshold = ").unwrap();
        let err = IntakeConfig::try_load_from(file.path()).unwrap_err();
        assert!(matches!(err, IntakeError::Config(_)));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
