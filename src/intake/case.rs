// src/intake/case.rs
// Case submission handed to a caseworker once the intake completes

use crate::intake::extraction::SummaryDraft;
use crate::intake::fields::CollectedFields;
use crate::intake::urgency::UrgencyAssessment;
use crate::oracle::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Finished intake record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSubmission {
    pub submission_id: String,
    pub conversation_id: String,
    pub submitted_at: DateTime<Utc>,
    pub fields: CollectedFields,
    /// 5..=10 under the current weights
    pub urgency_score: u8,
    pub urgency_reasoning: String,
    pub summary: String,
    pub recommended_programs: Vec<String>,
    pub recommended_actions: String,
    pub duration_minutes: i64,
    pub questions_asked: u32,
    /// Dialogue without the system persona
    pub transcript: Vec<Message>,
}

impl CaseSubmission {
    pub fn assemble(
        conversation_id: &str,
        started_at: DateTime<Utc>,
        fields: CollectedFields,
        urgency: &UrgencyAssessment,
        draft: SummaryDraft,
        questions_asked: u32,
        transcript: Vec<Message>,
    ) -> Self {
        let submitted_at = Utc::now();
        Self {
            submission_id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            submitted_at,
            fields,
            urgency_score: urgency.score,
            urgency_reasoning: urgency.reasoning(),
            summary: draft.summary,
            recommended_programs: draft.programs,
            recommended_actions: draft.actions,
            duration_minutes: (submitted_at - started_at).num_minutes().max(0),
            questions_asked,
            transcript,
        }
    }

    /// Human-readable duration, e.g. "12 minutes"
    pub fn duration_label(&self) -> String {
        format!("{} minutes", self.duration_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_assemble() {
        let started = Utc::now() - Duration::minutes(12);
        let urgency = UrgencyAssessment {
            score: 8,
            reasons: vec!["Zero income".into(), "Has disability".into()],
        };
        let case = CaseSubmission::assemble(
            "conv-1",
            started,
            CollectedFields::default(),
            &urgency,
            SummaryDraft::fallback(),
            23,
            vec![Message::assistant("Hello")],
        );

        assert_eq!(case.conversation_id, "conv-1");
        assert_eq!(case.urgency_score, 8);
        assert_eq!(case.urgency_reasoning, "Zero income; Has disability");
        assert_eq!(case.duration_label(), "12 minutes");
        assert_eq!(case.questions_asked, 23);
        assert!(Uuid::parse_str(&case.submission_id).is_ok());
    }

    #[test]
    fn test_duration_never_negative() {
        let future = Utc::now() + Duration::minutes(5);
        let urgency = UrgencyAssessment { score: 5, reasons: vec![] };
        let case = CaseSubmission::assemble(
            "c",
            future,
            CollectedFields::default(),
            &urgency,
            SummaryDraft::fallback(),
            0,
            vec![],
        );
        assert_eq!(case.duration_minutes, 0);
        assert_eq!(case.urgency_reasoning, "Standard priority case");
    }
}
