// src/intake/mod.rs
// Benefits intake engine: field model, heuristics, gate, stages, orchestration

pub mod case;
pub mod conversation;
pub mod extraction;
pub mod fields;
pub mod gate;
pub mod normalize;
pub mod orchestrator;
pub mod prompts;
pub mod reply;
pub mod stages;
pub mod topics;
pub mod urgency;

pub use case::CaseSubmission;
pub use conversation::Conversation;
pub use extraction::SummaryDraft;
pub use fields::CollectedFields;
pub use gate::{CategoryGroup, GatePolicy, IntakeState};
pub use orchestrator::{IntakeOrchestrator, TurnResult};
pub use stages::{
    CaseSummarizer, FieldExtractor, IntakeStages, QuestionClassifier, ReplyStage, StageSettings,
};
pub use urgency::UrgencyAssessment;
