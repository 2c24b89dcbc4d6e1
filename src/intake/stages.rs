// src/intake/stages.rs
// Oracle-backed turn stages: reply, question classifier, extractor, summarizer

use crate::error::{IntakeError, Result};
use crate::intake::extraction::{SummaryDraft, parse_extraction, parse_summary};
use crate::intake::fields::CollectedFields;
use crate::intake::prompts;
use crate::intake::reply::{
    DEFAULT_SINGLE_QUESTION_MIN_PREFIX, clean_response, enforce_single_question,
};
use crate::oracle::{Message, Oracle, OracleRequest, Role, SamplingParams};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Per-stage call settings, configurable under `[stages]`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StageSettings {
    pub reply_timeout_secs: u64,
    pub classifier_timeout_secs: u64,
    pub extraction_timeout_secs: u64,
    pub summary_timeout_secs: u64,
    /// Non-system messages sent to the reply and extraction stages
    pub history_window: usize,
    /// Non-system messages sent to the summary stage
    pub summary_window: usize,
    /// Shortest first question the one-question rule will cut down to
    pub single_question_min_prefix: usize,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            reply_timeout_secs: 60,
            classifier_timeout_secs: 30,
            extraction_timeout_secs: 60,
            summary_timeout_secs: 60,
            history_window: 10,
            summary_window: 15,
            single_question_min_prefix: DEFAULT_SINGLE_QUESTION_MIN_PREFIX,
        }
    }
}

/// The last `window` non-system messages, oldest first
pub fn recent_dialogue(history: &[Message], window: usize) -> Vec<Message> {
    let dialogue: Vec<&Message> = history.iter().filter(|m| m.role != Role::System).collect();
    let skip = dialogue.len().saturating_sub(window);
    dialogue.into_iter().skip(skip).cloned().collect()
}

/// Produces the next assistant utterance
#[async_trait]
pub trait ReplyStage: Send + Sync {
    async fn reply(&self, history: &[Message]) -> Result<String>;
}

/// Decides whether an assistant utterance asked the applicant a question
#[async_trait]
pub trait QuestionClassifier: Send + Sync {
    async fn asks_question(&self, assistant_text: &str) -> Result<bool>;
}

/// Pulls a typed field delta out of the recent dialogue
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, history: &[Message]) -> Result<CollectedFields>;
}

/// Drafts the narrative part of a case submission
#[async_trait]
pub trait CaseSummarizer: Send + Sync {
    async fn summarize(
        &self,
        history: &[Message],
        fields: &CollectedFields,
    ) -> Result<SummaryDraft>;
}

// ============================================================================
// Oracle-backed implementations
// ============================================================================

pub struct OracleReplyStage {
    oracle: Arc<dyn Oracle>,
    settings: StageSettings,
}

#[async_trait]
impl ReplyStage for OracleReplyStage {
    async fn reply(&self, history: &[Message]) -> Result<String> {
        let mut messages: Vec<Message> = history
            .iter()
            .filter(|m| m.role == Role::System)
            .cloned()
            .collect();
        messages.extend(recent_dialogue(history, self.settings.history_window));

        let params = SamplingParams::new(300, 0.7, 0.95)
            .with_stop(prompts::REPLY_STOP_SEQUENCES)
            .with_frequency_penalty(0.3);
        let request = OracleRequest::new(
            "reply",
            messages,
            params,
            Duration::from_secs(self.settings.reply_timeout_secs),
        );

        let raw = self.oracle.complete(request).await?;
        let text = enforce_single_question(
            &clean_response(&raw),
            self.settings.single_question_min_prefix,
        );
        if text.trim().is_empty() {
            return Err(IntakeError::Oracle("reply was empty after cleanup".into()));
        }
        Ok(text)
    }
}

pub struct OracleQuestionClassifier {
    oracle: Arc<dyn Oracle>,
    settings: StageSettings,
}

#[async_trait]
impl QuestionClassifier for OracleQuestionClassifier {
    async fn asks_question(&self, assistant_text: &str) -> Result<bool> {
        let messages = vec![
            Message::system(prompts::CLASSIFIER_SYSTEM),
            Message::user(prompts::classifier_prompt(assistant_text)),
        ];
        let request = OracleRequest::new(
            "classify",
            messages,
            SamplingParams::new(10, 0.1, 0.9),
            Duration::from_secs(self.settings.classifier_timeout_secs),
        );

        let answer = self.oracle.complete(request).await?;
        Ok(answer.to_uppercase().contains("YES"))
    }
}

pub struct OracleFieldExtractor {
    oracle: Arc<dyn Oracle>,
    settings: StageSettings,
}

#[async_trait]
impl FieldExtractor for OracleFieldExtractor {
    async fn extract(&self, history: &[Message]) -> Result<CollectedFields> {
        let mut messages = vec![Message::system(prompts::EXTRACTION_SYSTEM)];
        messages.extend(recent_dialogue(history, self.settings.history_window));
        messages.push(Message::user(prompts::EXTRACTION_PROMPT));

        let request = OracleRequest::new(
            "extract",
            messages,
            SamplingParams::new(1500, 0.1, 0.9),
            Duration::from_secs(self.settings.extraction_timeout_secs),
        );

        let text = self.oracle.complete(request).await?;
        parse_extraction(&text)
    }
}

pub struct OracleCaseSummarizer {
    oracle: Arc<dyn Oracle>,
    settings: StageSettings,
}

#[async_trait]
impl CaseSummarizer for OracleCaseSummarizer {
    async fn summarize(
        &self,
        history: &[Message],
        fields: &CollectedFields,
    ) -> Result<SummaryDraft> {
        let mut messages = vec![Message::system(prompts::SUMMARY_SYSTEM)];
        messages.extend(recent_dialogue(history, self.settings.summary_window));
        messages.push(Message::user(format!(
            "Collected fields:\n{}\n\n{}",
            serde_json::to_string_pretty(fields)?,
            prompts::SUMMARY_PROMPT
        )));

        let request = OracleRequest::new(
            "summarize",
            messages,
            SamplingParams::new(1000, 0.5, 0.9),
            Duration::from_secs(self.settings.summary_timeout_secs),
        );

        let text = self.oracle.complete(request).await?;
        parse_summary(&text)
    }
}

/// The four stages a turn runs through. Each can be swapped independently.
#[derive(Clone)]
pub struct IntakeStages {
    pub reply: Arc<dyn ReplyStage>,
    pub classifier: Arc<dyn QuestionClassifier>,
    pub extractor: Arc<dyn FieldExtractor>,
    pub summarizer: Arc<dyn CaseSummarizer>,
}

impl IntakeStages {
    /// All four stages backed by one oracle
    pub fn from_oracle(oracle: Arc<dyn Oracle>, settings: &StageSettings) -> Self {
        Self {
            reply: Arc::new(OracleReplyStage {
                oracle: oracle.clone(),
                settings: settings.clone(),
            }),
            classifier: Arc::new(OracleQuestionClassifier {
                oracle: oracle.clone(),
                settings: settings.clone(),
            }),
            extractor: Arc::new(OracleFieldExtractor {
                oracle: oracle.clone(),
                settings: settings.clone(),
            }),
            summarizer: Arc::new(OracleCaseSummarizer {
                oracle,
                settings: settings.clone(),
            }),
        }
    }
}
