// src/oracle/types.rs
// Oracle message and request types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Role-tagged chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling parameters sent with every oracle request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
}

impl SamplingParams {
    pub fn new(max_tokens: u32, temperature: f32, top_p: f32) -> Self {
        Self {
            max_tokens,
            temperature,
            top_p,
            stop: Vec::new(),
            frequency_penalty: None,
        }
    }

    pub fn with_stop(mut self, stop: &[&str]) -> Self {
        self.stop = stop.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }
}

/// One completion request: messages, sampling, and a bounded timeout
#[derive(Debug, Clone)]
pub struct OracleRequest {
    /// Short label used in logs ("reply", "classify", ...)
    pub stage: &'static str,
    pub messages: Vec<Message>,
    pub params: SamplingParams,
    pub timeout: Duration,
}

impl OracleRequest {
    pub fn new(
        stage: &'static str,
        messages: Vec<Message>,
        params: SamplingParams,
        timeout: Duration,
    ) -> Self {
        Self {
            stage,
            messages,
            params,
            timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::system("s").role, Role::System);
        assert_eq!(Message::user("u").role, Role::User);
        assert_eq!(Message::assistant("a").content, "a");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_sampling_params_skip_empty() {
        let params = SamplingParams::new(10, 0.1, 0.9);
        let json = serde_json::to_value(&params).unwrap();
        assert!(json.get("stop").is_none());
        assert!(json.get("frequency_penalty").is_none());

        let params = params.with_stop(&["?"]).with_frequency_penalty(0.3);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["stop"][0], "?");
        assert!(json["frequency_penalty"].as_f64().is_some());
    }
}
