// src/oracle/wire.rs
// Hosted chat API request body and response parsing

use crate::oracle::{Message, SamplingParams};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Chat request body for the hosted text-chat endpoint
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub project_id: &'a str,
    pub model_id: &'a str,
    pub messages: &'a [Message],
    pub parameters: &'a SamplingParams,
}

/// Non-streaming chat response
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ResponseChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage reported by the endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Parsed completion
#[derive(Debug)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

/// Parse a chat response, taking the trimmed text of the first choice
pub fn parse_chat_response(response_body: &str) -> Result<Completion> {
    let data: ChatResponse = serde_json::from_str(response_body)
        .map_err(|e| anyhow!("Failed to parse chat response: {}", e))?;

    let content = data
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .ok_or_else(|| anyhow!("Chat response contained no message content"))?;

    Ok(Completion {
        content,
        usage: data.usage,
    })
}
