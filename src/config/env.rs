// src/config/env.rs
// Environment-based configuration - single source of truth for oracle credentials

use crate::error::{IntakeError, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Default model served by the hosted chat endpoint
pub const DEFAULT_MODEL_ID: &str = "ibm/granite-3-8b-instruct";

/// Default credential exchange endpoint
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// Oracle credentials loaded from environment variables
#[derive(Clone)]
pub struct OracleCredentials {
    /// Base URL of the hosted chat API (ORACLE_URL)
    pub base_url: String,
    /// API key exchanged for a bearer token (ORACLE_API_KEY)
    pub api_key: String,
    /// Project the model runs under (ORACLE_PROJECT_ID)
    pub project_id: String,
    /// Model identifier (ORACLE_MODEL_ID)
    pub model_id: String,
    /// Credential exchange endpoint (ORACLE_IAM_URL)
    pub iam_url: String,
}

impl std::fmt::Debug for OracleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleCredentials")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("model_id", &self.model_id)
            .field("iam_url", &self.iam_url)
            .finish()
    }
}

impl OracleCredentials {
    /// Load credentials from the process environment (after `.env`, if any).
    ///
    /// Missing credentials are a configuration error: fatal at construction,
    /// never retried.
    pub fn from_env() -> Result<Self> {
        if dotenvy::dotenv().is_ok() {
            debug!("Loaded .env file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_url = read("ORACLE_URL");
        let api_key = read("ORACLE_API_KEY");
        let project_id = read("ORACLE_PROJECT_ID");

        let (Some(base_url), Some(api_key), Some(project_id)) = (base_url, api_key, project_id)
        else {
            let missing: Vec<&str> = ["ORACLE_URL", "ORACLE_API_KEY", "ORACLE_PROJECT_ID"]
                .into_iter()
                .filter(|name| read(*name).is_none())
                .collect();
            return Err(IntakeError::Config(format!(
                "oracle credentials not fully configured; set {}",
                missing.join(", ")
            )));
        };

        let creds = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            project_id,
            model_id: read("ORACLE_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            iam_url: read("ORACLE_IAM_URL").unwrap_or_else(|| DEFAULT_IAM_URL.to_string()),
        };
        info!(base_url = %creds.base_url, model = %creds.model_id, "Oracle credentials loaded");
        Ok(creds)
    }
}

/// Location of the SQLite conversation database (INTAKE_DB_PATH), if configured
pub fn db_path_from_env() -> Option<PathBuf> {
    std::env::var("INTAKE_DB_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_complete_credentials() {
        let creds = OracleCredentials::from_lookup(lookup_from(&[
            ("ORACLE_URL", "https://us-south.ml.example.com/"),
            ("ORACLE_API_KEY", "secret"),
            ("ORACLE_PROJECT_ID", "proj-1"),
        ]))
        .unwrap();
        assert_eq!(creds.base_url, "https://us-south.ml.example.com");
        assert_eq!(creds.model_id, DEFAULT_MODEL_ID);
        assert_eq!(creds.iam_url, DEFAULT_IAM_URL);
    }

    #[test]
    fn test_missing_credentials_named() {
        let err = OracleCredentials::from_lookup(lookup_from(&[
            ("ORACLE_URL", "https://example.com"),
            ("ORACLE_API_KEY", "  "),
        ]))
        .unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, IntakeError::Config(_)));
        assert!(msg.contains("ORACLE_API_KEY"));
        assert!(msg.contains("ORACLE_PROJECT_ID"));
        assert!(!msg.contains("ORACLE_URL,"));
    }

    #[test]
    fn test_model_override() {
        let creds = OracleCredentials::from_lookup(lookup_from(&[
            ("ORACLE_URL", "https://example.com"),
            ("ORACLE_API_KEY", "k"),
            ("ORACLE_PROJECT_ID", "p"),
            ("ORACLE_MODEL_ID", "meta-llama/llama-3-70b-instruct"),
        ]))
        .unwrap();
        assert_eq!(creds.model_id, "meta-llama/llama-3-70b-instruct");
    }

    #[test]
    fn test_debug_redacts_key() {
        let creds = OracleCredentials::from_lookup(lookup_from(&[
            ("ORACLE_URL", "https://example.com"),
            ("ORACLE_API_KEY", "super-secret"),
            ("ORACLE_PROJECT_ID", "p"),
        ]))
        .unwrap();
        assert!(!format!("{:?}", creds).contains("super-secret"));
    }
}
