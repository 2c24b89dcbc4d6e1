// src/intake/urgency.rs
// Urgency scorer: additive weights over collected fields, capped at 10

use crate::intake::fields::CollectedFields;
use serde::{Deserialize, Serialize};

const BASE_SCORE: u8 = 5;
const MAX_SCORE: u8 = 10;
const LOW_INCOME_CEILING: f64 = 1000.0;
const NO_REASONS: &str = "Standard priority case";

/// Score and the reasons behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgencyAssessment {
    pub score: u8,
    pub reasons: Vec<String>,
}

impl UrgencyAssessment {
    /// Reasons joined for display
    pub fn reasoning(&self) -> String {
        if self.reasons.is_empty() {
            NO_REASONS.to_string()
        } else {
            self.reasons.join("; ")
        }
    }
}

/// Score a field set. Pure; the result is always within 5..=10.
pub fn assess(fields: &CollectedFields) -> UrgencyAssessment {
    let housing_status = fields
        .housing
        .status
        .as_deref()
        .map(|s| s.trim().to_lowercase());
    let income = fields.financial.monthly_income;

    let rules: [(bool, u8, &str); 9] = [
        (
            matches!(housing_status.as_deref(), Some("homeless" | "shelter")),
            3,
            "Currently homeless or in shelter",
        ),
        (
            fields.housing.at_risk_of_homelessness == Some(true),
            3,
            "At risk of homelessness",
        ),
        (
            fields.emergency.has_urgent_needs == Some(true),
            3,
            "Has immediate emergency needs",
        ),
        (
            fields.household.has_children == Some(true),
            2,
            "Has children in household",
        ),
        (income == Some(0.0), 2, "Zero income"),
        (fields.health.has_disability == Some(true), 2, "Has disability"),
        (
            income.is_some_and(|v| v < LOW_INCOME_CEILING),
            1,
            "Very low income (under $1000/month)",
        ),
        (fields.health.has_insurance == Some(false), 1, "No health insurance"),
        (
            fields.health.has_medical_expenses == Some(true),
            1,
            "Has medical expenses",
        ),
    ];

    let mut score = BASE_SCORE;
    let mut reasons = Vec::new();
    for (applies, weight, reason) in rules {
        if applies {
            score = score.saturating_add(weight);
            reasons.push(reason.to_string());
        }
    }

    UrgencyAssessment {
        score: score.min(MAX_SCORE),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_are_standard_priority() {
        let result = assess(&CollectedFields::default());
        assert_eq!(result.score, 5);
        assert!(result.reasons.is_empty());
        assert_eq!(result.reasoning(), "Standard priority case");
    }

    #[test]
    fn test_zero_income_triggers_both_income_rules() {
        let mut fields = CollectedFields::default();
        fields.financial.monthly_income = Some(0.0);
        let result = assess(&fields);
        assert_eq!(result.score, 8);
        assert_eq!(
            result.reasoning(),
            "Zero income; Very low income (under $1000/month)"
        );
    }

    #[test]
    fn test_housing_match_is_case_insensitive() {
        let mut fields = CollectedFields::default();
        fields.housing.status = Some("  Shelter ".into());
        assert_eq!(assess(&fields).score, 8);

        fields.housing.status = Some("staying_with_family".into());
        assert_eq!(assess(&fields).score, 5);
    }

    #[test]
    fn test_insurance_must_be_explicitly_false() {
        let mut fields = CollectedFields::default();
        fields.health.has_insurance = None;
        assert_eq!(assess(&fields).score, 5);
        fields.health.has_insurance = Some(false);
        assert_eq!(assess(&fields).score, 6);
    }

    #[test]
    fn test_score_is_capped() {
        let mut fields = CollectedFields::default();
        fields.housing.status = Some("homeless".into());
        fields.housing.at_risk_of_homelessness = Some(true);
        fields.emergency.has_urgent_needs = Some(true);
        fields.household.has_children = Some(true);
        fields.financial.monthly_income = Some(0.0);
        fields.health.has_disability = Some(true);
        fields.health.has_insurance = Some(false);
        fields.health.has_medical_expenses = Some(true);

        let result = assess(&fields);
        assert_eq!(result.score, 10);
        assert_eq!(result.reasons.len(), 9);
        assert_eq!(result.reasons[0], "Currently homeless or in shelter");
        assert_eq!(result.reasons[8], "Has medical expenses");
    }

    #[test]
    fn test_monotonic_in_conditions() {
        let mut fields = CollectedFields::default();
        let mut last = assess(&fields).score;

        let steps: Vec<Box<dyn Fn(&mut CollectedFields)>> = vec![
            Box::new(|f| f.health.has_medical_expenses = Some(true)),
            Box::new(|f| f.health.has_insurance = Some(false)),
            Box::new(|f| f.financial.monthly_income = Some(450.0)),
            Box::new(|f| f.health.has_disability = Some(true)),
            Box::new(|f| f.household.has_children = Some(true)),
            Box::new(|f| f.emergency.has_urgent_needs = Some(true)),
        ];
        for step in steps {
            step(&mut fields);
            let score = assess(&fields).score;
            assert!(score >= last);
            assert!((5..=10).contains(&score));
            last = score;
        }
    }
}
