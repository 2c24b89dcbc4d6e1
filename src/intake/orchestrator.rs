// src/intake/orchestrator.rs
// Turn orchestration: reply, classify, extract, gate, and case assembly

use crate::config::IntakeConfig;
use crate::error::{IntakeError, Result};
use crate::intake::case::CaseSubmission;
use crate::intake::conversation::Conversation;
use crate::intake::extraction::SummaryDraft;
use crate::intake::fields::CollectedFields;
use crate::intake::gate::{GatePolicy, IntakeState, missing_categories};
use crate::intake::prompts::FALLBACK_REPLY;
use crate::intake::stages::IntakeStages;
use crate::intake::topics::count_topics;
use crate::intake::urgency::assess;
use crate::oracle::{Message, Oracle};
use crate::store::ConversationStore;
use crate::utils::truncate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of one applicant message
#[derive(Debug, Clone, Serialize)]
pub struct TurnResult {
    pub conversation_id: String,
    pub assistant_text: String,
    pub collected_fields: CollectedFields,
    pub is_complete: bool,
    pub questions_asked: u32,
    /// Set only on the turn that created the submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<CaseSubmission>,
}

/// Drives intake conversations against a store and a set of oracle stages
pub struct IntakeOrchestrator {
    store: Arc<dyn ConversationStore>,
    stages: IntakeStages,
    policy: GatePolicy,
}

impl IntakeOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        stages: IntakeStages,
        policy: GatePolicy,
    ) -> Self {
        Self {
            store,
            stages,
            policy,
        }
    }

    /// Wire every stage to one oracle using the file configuration
    pub fn from_config(
        store: Arc<dyn ConversationStore>,
        oracle: Arc<dyn Oracle>,
        config: &IntakeConfig,
    ) -> Self {
        let stages = IntakeStages::from_oracle(oracle, &config.stages);
        Self::new(store, stages, config.gate.clone())
    }

    /// Create the conversation if needed and return its welcome message
    #[instrument(skip_all, fields(conversation_id = %id))]
    pub async fn start_conversation(&self, id: &str) -> Result<String> {
        if let Some(existing) = self.store.load(id).await? {
            return Ok(existing.welcome().to_string());
        }
        let conversation = Conversation::start(id);
        self.store.save(&conversation).await?;
        info!("Conversation started");
        Ok(conversation.welcome().to_string())
    }

    /// Process one applicant message
    #[instrument(skip_all, fields(conversation_id = %id))]
    pub async fn send_message(&self, id: &str, text: &str) -> Result<TurnResult> {
        let text = text.trim();
        if text.is_empty() {
            return Err(IntakeError::InvalidInput("message is empty".into()));
        }

        let mut conv = match self.store.load(id).await? {
            Some(conv) => conv,
            None => {
                info!("Conversation started on first message");
                Conversation::start(id)
            }
        };
        conv.push(Message::user(text));

        let topics = count_topics(text);
        debug!(topics, preview = %truncate(text, 60), "Applicant message received");

        let reply = match self.stages.reply.reply(&conv.history).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    error = %e,
                    transient = e.is_transient(),
                    "Reply stage failed, sending fallback"
                );
                conv.push(Message::assistant(FALLBACK_REPLY));
                self.store.save(&conv).await?;
                return Ok(Self::turn_result(&conv, FALLBACK_REPLY.to_string(), None));
            }
        };

        let credited = self.policy.credit_topics(conv.questions_asked, topics);
        if credited != conv.questions_asked {
            info!(
                topics,
                from = conv.questions_asked,
                to = credited,
                "Multi-topic answer credited"
            );
            conv.questions_asked = credited;
        }

        conv.push(Message::assistant(reply.as_str()));

        let asked = match self.stages.classifier.asks_question(&reply).await {
            Ok(asked) => asked,
            Err(e) => {
                warn!(
                    error = %e,
                    transient = e.is_transient(),
                    "Question classifier failed, counting as a question"
                );
                true
            }
        };
        if asked {
            conv.questions_asked += 1;
        }

        match self.stages.extractor.extract(&conv.history).await {
            Ok(delta) => conv.fields.merge(delta),
            Err(e) => warn!(
                error = %e,
                transient = e.is_transient(),
                "Extraction failed, keeping previous fields"
            ),
        }

        let submission = self.advance_gate(&mut conv).await?;
        self.store.save(&conv).await?;

        info!(
            questions_asked = conv.questions_asked,
            fields_filled = conv.fields.filled_count(),
            state = ?conv.state,
            "Turn complete"
        );
        Ok(Self::turn_result(&conv, reply, submission))
    }

    /// Submission for a completed intake, created on first call
    #[instrument(skip_all, fields(conversation_id = %id))]
    pub async fn finalize(&self, id: &str) -> Result<CaseSubmission> {
        let mut conv = self.load_existing(id).await?;
        if let Some(existing) = conv.submission() {
            return Ok(existing.clone());
        }

        match self.advance_gate(&mut conv).await? {
            Some(submission) => {
                self.store.save(&conv).await?;
                Ok(submission)
            }
            None => Err(IntakeError::NotComplete(id.to_string())),
        }
    }

    /// Dialogue without the system persona
    pub async fn transcript(&self, id: &str) -> Result<Vec<Message>> {
        Ok(self.load_existing(id).await?.transcript())
    }

    /// Discard a conversation. Returns whether it existed.
    #[instrument(skip_all, fields(conversation_id = %id))]
    pub async fn end_conversation(&self, id: &str) -> Result<bool> {
        let removed = self.store.remove(id).await?;
        info!(removed, "Conversation ended");
        Ok(removed)
    }

    async fn load_existing(&self, id: &str) -> Result<Conversation> {
        self.store
            .load(id)
            .await?
            .ok_or_else(|| IntakeError::ConversationNotFound(id.to_string()))
    }

    /// Evaluate the gate and, on the first transition to complete, attach a submission
    async fn advance_gate(&self, conv: &mut Conversation) -> Result<Option<CaseSubmission>> {
        conv.state = self
            .policy
            .evaluate(conv.state, conv.questions_asked, &conv.fields);

        if conv.state != IntakeState::Complete {
            debug!(missing = ?missing_categories(&conv.fields), "Intake still collecting");
            return Ok(None);
        }
        if conv.submission().is_some() {
            return Ok(None);
        }

        let submission = self.build_submission(conv).await;
        info!(
            submission_id = %submission.submission_id,
            urgency_score = submission.urgency_score,
            "Intake complete, case submission created"
        );
        Ok(Some(conv.attach_submission(submission)?.clone()))
    }

    async fn build_submission(&self, conv: &Conversation) -> CaseSubmission {
        let draft = match self.stages.summarizer.summarize(&conv.history, &conv.fields).await {
            Ok(draft) => draft,
            Err(e) => {
                warn!(error = %e, "Summary stage failed, using fallback summary");
                SummaryDraft::fallback()
            }
        };

        CaseSubmission::assemble(
            &conv.id,
            conv.created_at,
            conv.fields.clone(),
            &assess(&conv.fields),
            draft,
            conv.questions_asked,
            conv.transcript(),
        )
    }

    fn turn_result(
        conv: &Conversation,
        assistant_text: String,
        submission: Option<CaseSubmission>,
    ) -> TurnResult {
        TurnResult {
            conversation_id: conv.id.clone(),
            assistant_text,
            collected_fields: conv.fields.clone(),
            is_complete: conv.is_complete(),
            questions_asked: conv.questions_asked,
            submission,
        }
    }
}
