// src/intake/fields.rs
// Collected field set: fixed schema grouped by category, merged turn by turn

use crate::intake::normalize::{FieldValue, normalize};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Everything the intake has learned about the applicant so far.
///
/// Every field is independently nullable. A field counts as collected when it
/// is non-null and, for strings, non-empty after trimming.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectedFields {
    pub personal: PersonalInfo,
    pub household: HouseholdInfo,
    pub employment: EmploymentInfo,
    pub financial: FinancialInfo,
    pub housing: HousingInfo,
    pub health: HealthInfo,
    pub legal: LegalInfo,
    pub current_benefits: CurrentBenefits,
    pub emergency: EmergencyInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i64>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdMember {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdInfo {
    pub size: Option<i64>,
    pub has_children: Option<bool>,
    pub members: Vec<HouseholdMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmploymentInfo {
    pub status: Option<String>,
    pub employer: Option<String>,
    pub job_title: Option<String>,
    pub duration: Option<String>,
    pub looking_for_work: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialInfo {
    pub monthly_income: Option<f64>,
    pub income_sources: Vec<String>,
    pub total_assets: Option<f64>,
    pub monthly_rent: Option<f64>,
    pub monthly_utilities: Option<f64>,
    pub monthly_medical: Option<f64>,
    pub monthly_childcare: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HousingInfo {
    pub status: Option<String>,
    pub address: Option<String>,
    pub at_risk_of_homelessness: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthInfo {
    pub has_disability: Option<bool>,
    pub disability_details: Option<String>,
    pub has_insurance: Option<bool>,
    pub has_medical_expenses: Option<bool>,
    pub monthly_medical_costs: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalInfo {
    pub citizenship_status: Option<String>,
    pub immigration_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentBenefits {
    pub receiving_benefits: Option<bool>,
    pub programs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyInfo {
    pub has_urgent_needs: Option<bool>,
    pub details: Option<String>,
}

/// Non-null and non-blank
pub fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Overwrite `dst` only when the delta carries a value
fn overlay<T>(dst: &mut Option<T>, src: Option<T>) {
    if src.is_some() {
        *dst = src;
    }
}

fn overlay_list<T>(dst: &mut Vec<T>, src: Vec<T>) {
    if !src.is_empty() {
        *dst = src;
    }
}

impl CollectedFields {
    /// Merge an extraction delta. Non-null values overwrite; nulls and empty
    /// lists never erase earlier data.
    pub fn merge(&mut self, delta: CollectedFields) {
        let p = delta.personal;
        overlay(&mut self.personal.full_name, p.full_name);
        overlay(&mut self.personal.first_name, p.first_name);
        overlay(&mut self.personal.last_name, p.last_name);
        overlay(&mut self.personal.date_of_birth, p.date_of_birth);
        overlay(&mut self.personal.age, p.age);
        overlay(&mut self.personal.phone, p.phone);
        overlay(&mut self.personal.email, p.email);

        let h = delta.household;
        overlay(&mut self.household.size, h.size);
        overlay(&mut self.household.has_children, h.has_children);
        overlay_list(&mut self.household.members, h.members);

        let e = delta.employment;
        overlay(&mut self.employment.status, e.status);
        overlay(&mut self.employment.employer, e.employer);
        overlay(&mut self.employment.job_title, e.job_title);
        overlay(&mut self.employment.duration, e.duration);
        overlay(&mut self.employment.looking_for_work, e.looking_for_work);

        let f = delta.financial;
        overlay(&mut self.financial.monthly_income, f.monthly_income);
        overlay_list(&mut self.financial.income_sources, f.income_sources);
        overlay(&mut self.financial.total_assets, f.total_assets);
        overlay(&mut self.financial.monthly_rent, f.monthly_rent);
        overlay(&mut self.financial.monthly_utilities, f.monthly_utilities);
        overlay(&mut self.financial.monthly_medical, f.monthly_medical);
        overlay(&mut self.financial.monthly_childcare, f.monthly_childcare);

        let ho = delta.housing;
        overlay(&mut self.housing.status, ho.status);
        overlay(&mut self.housing.address, ho.address);
        overlay(&mut self.housing.at_risk_of_homelessness, ho.at_risk_of_homelessness);

        let he = delta.health;
        overlay(&mut self.health.has_disability, he.has_disability);
        overlay(&mut self.health.disability_details, he.disability_details);
        overlay(&mut self.health.has_insurance, he.has_insurance);
        overlay(&mut self.health.has_medical_expenses, he.has_medical_expenses);
        overlay(&mut self.health.monthly_medical_costs, he.monthly_medical_costs);

        let l = delta.legal;
        overlay(&mut self.legal.citizenship_status, l.citizenship_status);
        overlay(&mut self.legal.immigration_status, l.immigration_status);

        let b = delta.current_benefits;
        overlay(&mut self.current_benefits.receiving_benefits, b.receiving_benefits);
        overlay_list(&mut self.current_benefits.programs, b.programs);

        let em = delta.emergency;
        overlay(&mut self.emergency.has_urgent_needs, em.has_urgent_needs);
        overlay(&mut self.emergency.details, em.details);
    }

    /// Build a typed delta from a raw extraction object. Every value passes
    /// through the field normalizer; unknown keys are ignored.
    pub fn from_extraction(raw: &Value) -> Self {
        let section = |name: &str| Section {
            prefix: name.to_string(),
            map: raw.get(name).and_then(Value::as_object),
        };

        let personal = section("personal");
        let household = section("household");
        let employment = section("employment");
        let financial = section("financial");
        let housing = section("housing");
        let health = section("health");
        let legal = section("legal");
        let benefits = section("current_benefits");
        let emergency = section("emergency");

        Self {
            personal: PersonalInfo {
                full_name: personal.text("full_name"),
                first_name: personal.text("first_name"),
                last_name: personal.text("last_name"),
                date_of_birth: personal.date("date_of_birth"),
                age: personal.integer("age"),
                phone: personal.text("phone"),
                email: personal.text("email"),
            },
            household: HouseholdInfo {
                size: household.integer("size"),
                has_children: household.boolean("has_children"),
                members: household.members(),
            },
            employment: EmploymentInfo {
                status: employment.text("status"),
                employer: employment.text("employer"),
                job_title: employment.text("job_title"),
                duration: employment.text("duration"),
                looking_for_work: employment.boolean("looking_for_work"),
            },
            financial: FinancialInfo {
                monthly_income: financial.real("monthly_income"),
                income_sources: financial.text_list("income_sources"),
                total_assets: financial.real("total_assets"),
                monthly_rent: financial.real("monthly_rent"),
                monthly_utilities: financial.real("monthly_utilities"),
                monthly_medical: financial.real("monthly_medical"),
                monthly_childcare: financial.real("monthly_childcare"),
            },
            housing: HousingInfo {
                status: housing.text("status"),
                address: housing.text("address"),
                at_risk_of_homelessness: housing.boolean("at_risk_of_homelessness"),
            },
            health: HealthInfo {
                has_disability: health.boolean("has_disability"),
                disability_details: health.text("disability_details"),
                has_insurance: health.boolean("has_insurance"),
                has_medical_expenses: health.boolean("has_medical_expenses"),
                monthly_medical_costs: health.real("monthly_medical_costs"),
            },
            legal: LegalInfo {
                citizenship_status: legal.text("citizenship_status"),
                immigration_status: legal.text("immigration_status"),
            },
            current_benefits: CurrentBenefits {
                receiving_benefits: benefits.boolean("receiving_benefits"),
                programs: benefits.text_list("programs"),
            },
            emergency: EmergencyInfo {
                has_urgent_needs: emergency.boolean("has_urgent_needs"),
                details: emergency.text("details"),
            },
        }
    }

    /// Number of scalar fields that hold a value, for progress logging
    pub fn filled_count(&self) -> usize {
        let Ok(Value::Object(map)) = serde_json::to_value(self) else {
            return 0;
        };
        map.values()
            .filter_map(Value::as_object)
            .flat_map(|section| section.values())
            .filter(|v| match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                Value::Array(items) => !items.is_empty(),
                _ => true,
            })
            .count()
    }
}

/// One category object of a raw extraction payload
struct Section<'a> {
    prefix: String,
    map: Option<&'a Map<String, Value>>,
}

impl Section<'_> {
    fn value(&self, key: &str) -> Option<FieldValue> {
        let raw = self.map?.get(key)?;
        normalize(&format!("{}.{}", self.prefix, key), raw)
    }

    fn text(&self, key: &str) -> Option<String> {
        self.value(key).and_then(FieldValue::into_text)
    }

    fn integer(&self, key: &str) -> Option<i64> {
        self.value(key).and_then(FieldValue::into_integer)
    }

    fn real(&self, key: &str) -> Option<f64> {
        self.value(key).and_then(FieldValue::into_real)
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        self.value(key).and_then(FieldValue::into_bool)
    }

    fn date(&self, key: &str) -> Option<NaiveDate> {
        self.value(key).and_then(FieldValue::into_date)
    }

    /// A list of strings; a lone string is accepted as a one-element list
    fn text_list(&self, key: &str) -> Vec<String> {
        let field = format!("{}.{}", self.prefix, key);
        let Some(raw) = self.map.and_then(|m| m.get(key)) else {
            return Vec::new();
        };
        match raw {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| normalize(&field, item).and_then(FieldValue::into_text))
                .collect(),
            other => normalize(&field, other)
                .and_then(FieldValue::into_text)
                .into_iter()
                .collect(),
        }
    }

    fn members(&self) -> Vec<HouseholdMember> {
        let Some(items) = self.map.and_then(|m| m.get("members")).and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let member = Section {
                    prefix: format!("{}.members", self.prefix),
                    map: item.as_object(),
                };
                let parsed = HouseholdMember {
                    name: member.text("name"),
                    age: member.integer("age"),
                    relationship: member.text("relationship"),
                };
                (parsed != HouseholdMember::default()).then_some(parsed)
            })
            .collect()
    }
}
