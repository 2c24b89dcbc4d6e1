// src/intake/conversation.rs
// Per-conversation intake state

use crate::error::{IntakeError, Result};
use crate::intake::case::CaseSubmission;
use crate::intake::fields::CollectedFields;
use crate::intake::gate::IntakeState;
use crate::intake::prompts::{INTAKE_PERSONA, WELCOME_MESSAGE};
use crate::oracle::{Message, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One applicant's intake session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub history: Vec<Message>,
    pub fields: CollectedFields,
    pub questions_asked: u32,
    pub state: IntakeState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    submission: Option<CaseSubmission>,
}

impl Conversation {
    /// Fresh conversation seeded with the persona and the welcome message
    pub fn start(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            history: vec![
                Message::system(INTAKE_PERSONA),
                Message::assistant(WELCOME_MESSAGE),
            ],
            fields: CollectedFields::default(),
            questions_asked: 0,
            state: IntakeState::Collecting,
            created_at: now,
            updated_at: now,
            submission: None,
        }
    }

    /// First assistant message
    pub fn welcome(&self) -> &str {
        self.history
            .iter()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
            .unwrap_or(WELCOME_MESSAGE)
    }

    pub fn push(&mut self, message: Message) {
        self.history.push(message);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn is_complete(&self) -> bool {
        self.state == IntakeState::Complete
    }

    /// History without the system persona
    pub fn transcript(&self) -> Vec<Message> {
        self.history
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect()
    }

    pub fn submission(&self) -> Option<&CaseSubmission> {
        self.submission.as_ref()
    }

    /// Attach the case submission. A conversation holds at most one.
    pub fn attach_submission(&mut self, submission: CaseSubmission) -> Result<&CaseSubmission> {
        if self.submission.is_some() {
            return Err(IntakeError::InvalidInput(format!(
                "conversation {} already has a submission",
                self.id
            )));
        }
        self.touch();
        Ok(self.submission.insert(submission))
    }
}
