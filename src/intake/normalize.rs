// src/intake/normalize.rs
// Field normalizer: coerces raw extracted values into typed fields per the schema

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Storage type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Real,
    Boolean,
    Text,
    Date,
}

/// A normalized field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn into_integer(self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_real(self) -> Option<f64> {
        match self {
            FieldValue::Real(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            FieldValue::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_date(self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(v) => Some(v),
            _ => None,
        }
    }
}

use FieldKind::*;

/// Every field the extraction stage may return, keyed by dotted path.
/// List-valued fields are keyed by their element path.
const FIELD_SCHEMA: &[(&str, FieldKind)] = &[
    ("personal.full_name", Text),
    ("personal.first_name", Text),
    ("personal.last_name", Text),
    ("personal.date_of_birth", Date),
    ("personal.age", Integer),
    ("personal.phone", Text),
    ("personal.email", Text),
    ("household.size", Integer),
    ("household.has_children", Boolean),
    ("household.members.name", Text),
    ("household.members.age", Integer),
    ("household.members.relationship", Text),
    ("employment.status", Text),
    ("employment.employer", Text),
    ("employment.job_title", Text),
    ("employment.duration", Text),
    ("employment.looking_for_work", Boolean),
    ("financial.monthly_income", Real),
    ("financial.income_sources", Text),
    ("financial.total_assets", Real),
    ("financial.monthly_rent", Real),
    ("financial.monthly_utilities", Real),
    ("financial.monthly_medical", Real),
    ("financial.monthly_childcare", Real),
    ("housing.status", Text),
    ("housing.address", Text),
    ("housing.at_risk_of_homelessness", Boolean),
    ("health.has_disability", Boolean),
    ("health.disability_details", Text),
    ("health.has_insurance", Boolean),
    ("health.has_medical_expenses", Boolean),
    ("health.monthly_medical_costs", Real),
    ("legal.citizenship_status", Text),
    ("legal.immigration_status", Text),
    ("current_benefits.receiving_benefits", Boolean),
    ("current_benefits.programs", Text),
    ("emergency.has_urgent_needs", Boolean),
    ("emergency.details", Text),
];

/// Free-text answers that mean a household of one
const LIVES_ALONE_MARKERS: &[&str] = &["alone", "by myself", "just me", "only me", "on my own"];

/// Free-text answers that mean no monthly income
const NO_INCOME_MARKERS: &[&str] = &[
    "no income",
    "nothing",
    "zero",
    "unemployed",
    "no money",
    "not working",
];

const TRUE_TOKENS: &[&str] = &["yes", "y", "true", "t"];
const FALSE_TOKENS: &[&str] = &["no", "n", "false", "f"];

/// Placeholder strings the extraction oracle uses for "absent"
const NULL_TOKENS: &[&str] = &["null", "none", "n/a"];

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: static literal pattern; compilation cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"(-?\d+(?:\.\d+)?)\s*(k\b)?").expect("amount regex")
});

/// Look up the kind of a schema field
pub fn kind_of(field: &str) -> Option<FieldKind> {
    FIELD_SCHEMA
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, kind)| *kind)
}

fn is_null_token(text: &str) -> bool {
    NULL_TOKENS.contains(&text.trim().to_lowercase().as_str())
}

/// Normalize a raw value for a named field. Unknown fields and malformed
/// values yield `None`; this never fails.
pub fn normalize(field: &str, raw: &Value) -> Option<FieldValue> {
    let kind = kind_of(field)?;
    if raw.as_str().is_some_and(is_null_token) {
        return None;
    }
    match kind {
        Integer => normalize_integer(field, raw).map(FieldValue::Integer),
        Real => normalize_real(field, raw).map(FieldValue::Real),
        Boolean => normalize_bool(raw).map(FieldValue::Boolean),
        Text => normalize_text(raw).map(FieldValue::Text),
        Date => normalize_date(raw).map(FieldValue::Date),
    }
}

/// Parse the first numeric token of free text: currency symbols and thousands
/// separators are stripped and a trailing `k` multiplies by 1000.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '€' | '£'))
        .collect();

    let caps = AMOUNT_RE.captures(&cleaned)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let value = if caps.get(2).is_some() { value * 1000.0 } else { value };
    value.is_finite().then_some(value)
}

fn raw_number(field: &str, raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_amount(s).or_else(|| text_convention(field, s)),
        _ => None,
    }
}

/// Field-specific readings of answers with no digits in them
fn text_convention(field: &str, text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    let markers = match field {
        "household.size" => LIVES_ALONE_MARKERS,
        "financial.monthly_income" => NO_INCOME_MARKERS,
        _ => return None,
    };
    if !markers.iter().any(|m| lower.contains(m)) {
        return None;
    }
    match field {
        "household.size" => Some(1.0),
        _ => Some(0.0),
    }
}

fn normalize_integer(field: &str, raw: &Value) -> Option<i64> {
    raw_number(field, raw).map(|v| v.round() as i64)
}

fn normalize_real(field: &str, raw: &Value) -> Option<f64> {
    raw_number(field, raw)
}

fn normalize_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => {
            let token = s.trim().to_lowercase();
            if TRUE_TOKENS.contains(&token.as_str()) {
                Some(true)
            } else if FALSE_TOKENS.contains(&token.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn normalize_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn normalize_date(raw: &Value) -> Option<NaiveDate> {
    let s = raw.as_str()?;
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
