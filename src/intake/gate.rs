// src/intake/gate.rs
// Completion gate: question counter crediting and per-category sufficiency

use crate::intake::fields::{CollectedFields, is_filled};
use serde::{Deserialize, Serialize};

/// Gate thresholds, configurable under `[gate]`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GatePolicy {
    /// Questions that must be asked before the intake may complete
    pub question_threshold: u32,
    /// Topics a single message must touch to be credited as several answers
    pub mega_answer_min_topics: usize,
    /// Topics a single message must touch to lift the counter to the floor below
    pub fast_path_min_topics: usize,
    pub fast_path_floor: u32,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            question_threshold: 22,
            mega_answer_min_topics: 5,
            fast_path_min_topics: 12,
            fast_path_floor: 25,
        }
    }
}

/// Conversation gate state. `Complete` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntakeState {
    #[default]
    Collecting,
    Complete,
}

/// The seven groups that must each hold enough data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    Personal,
    Household,
    Employment,
    Financial,
    Housing,
    Health,
    Legal,
}

impl CategoryGroup {
    pub const ALL: [CategoryGroup; 7] = [
        CategoryGroup::Personal,
        CategoryGroup::Household,
        CategoryGroup::Employment,
        CategoryGroup::Financial,
        CategoryGroup::Housing,
        CategoryGroup::Health,
        CategoryGroup::Legal,
    ];

    pub fn has_enough(self, fields: &CollectedFields) -> bool {
        match self {
            CategoryGroup::Personal => {
                let p = &fields.personal;
                (is_filled(&p.full_name) || is_filled(&p.first_name))
                    && (p.age.is_some() || p.date_of_birth.is_some())
                    && (is_filled(&p.phone) || is_filled(&p.email))
            }
            CategoryGroup::Household => fields.household.size.is_some(),
            CategoryGroup::Employment => is_filled(&fields.employment.status),
            CategoryGroup::Financial => fields.financial.monthly_income.is_some(),
            CategoryGroup::Housing => is_filled(&fields.housing.status),
            CategoryGroup::Health => fields.health.has_disability.is_some(),
            CategoryGroup::Legal => is_filled(&fields.legal.citizenship_status),
        }
    }
}

/// Groups that still lack data
pub fn missing_categories(fields: &CollectedFields) -> Vec<CategoryGroup> {
    CategoryGroup::ALL
        .into_iter()
        .filter(|group| !group.has_enough(fields))
        .collect()
}

impl GatePolicy {
    /// Counter after crediting one user message that touched `topics` categories.
    /// Never lowers the counter.
    pub fn credit_topics(&self, questions_asked: u32, topics: usize) -> u32 {
        let mut count = questions_asked;
        if topics >= self.mega_answer_min_topics {
            count = count.saturating_add(u32::try_from(topics).unwrap_or(u32::MAX));
        }
        if topics >= self.fast_path_min_topics {
            count = count.max(self.fast_path_floor);
        }
        count
    }

    /// Next gate state. Once complete, stays complete.
    pub fn evaluate(
        &self,
        current: IntakeState,
        questions_asked: u32,
        fields: &CollectedFields,
    ) -> IntakeState {
        if current == IntakeState::Complete {
            return IntakeState::Complete;
        }
        if questions_asked >= self.question_threshold && missing_categories(fields).is_empty() {
            IntakeState::Complete
        } else {
            IntakeState::Collecting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_fields() -> CollectedFields {
        let mut f = CollectedFields::default();
        f.personal.first_name = Some("Maria".into());
        f.personal.age = Some(34);
        f.personal.email = Some("maria@example.com".into());
        f.household.size = Some(3);
        f.employment.status = Some("unemployed".into());
        f.financial.monthly_income = Some(0.0);
        f.housing.status = Some("renting".into());
        f.health.has_disability = Some(false);
        f.legal.citizenship_status = Some("citizen".into());
        f
    }

    // ========================================================================
    // Counter crediting
    // ========================================================================

    #[test]
    fn test_small_messages_earn_no_topic_credit() {
        let policy = GatePolicy::default();
        assert_eq!(policy.credit_topics(3, 0), 3);
        assert_eq!(policy.credit_topics(3, 4), 3);
    }

    #[test]
    fn test_mega_answer_adds_topic_count() {
        let policy = GatePolicy::default();
        assert_eq!(policy.credit_topics(3, 5), 8);
        assert_eq!(policy.credit_topics(0, 10), 10);
    }

    #[test]
    fn test_fast_path_lifts_to_floor() {
        let policy = GatePolicy::default();
        assert_eq!(policy.credit_topics(0, 12), 25);
        // Never lowers an already higher counter
        assert_eq!(policy.credit_topics(20, 12), 32);
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    #[test]
    fn test_below_threshold_stays_collecting() {
        let policy = GatePolicy::default();
        let fields = complete_fields();
        assert_eq!(policy.evaluate(IntakeState::Collecting, 21, &fields), IntakeState::Collecting);
        assert_eq!(policy.evaluate(IntakeState::Collecting, 22, &fields), IntakeState::Complete);
    }

    #[test]
    fn test_missing_income_never_completes() {
        let policy = GatePolicy::default();
        let mut fields = complete_fields();
        fields.financial.monthly_income = None;
        assert_eq!(policy.evaluate(IntakeState::Collecting, 500, &fields), IntakeState::Collecting);
        assert_eq!(missing_categories(&fields), vec![CategoryGroup::Financial]);
    }

    #[test]
    fn test_complete_is_terminal() {
        let policy = GatePolicy::default();
        let empty = CollectedFields::default();
        assert_eq!(policy.evaluate(IntakeState::Complete, 0, &empty), IntakeState::Complete);
    }

    #[test]
    fn test_personal_requires_name_age_and_contact() {
        let mut fields = complete_fields();
        assert!(CategoryGroup::Personal.has_enough(&fields));

        fields.personal.email = Some("  ".into());
        assert!(!CategoryGroup::Personal.has_enough(&fields));
        fields.personal.phone = Some("555-0142".into());
        assert!(CategoryGroup::Personal.has_enough(&fields));

        fields.personal.age = None;
        assert!(!CategoryGroup::Personal.has_enough(&fields));
        fields.personal.date_of_birth = chrono::NaiveDate::from_ymd_opt(1990, 1, 1);
        assert!(CategoryGroup::Personal.has_enough(&fields));
    }

    #[test]
    fn test_false_and_zero_count_as_collected() {
        let fields = complete_fields();
        assert!(CategoryGroup::Health.has_enough(&fields));
        assert!(CategoryGroup::Financial.has_enough(&fields));
    }

    #[test]
    fn test_empty_fields_miss_everything() {
        assert_eq!(missing_categories(&CollectedFields::default()).len(), 7);
    }
}
