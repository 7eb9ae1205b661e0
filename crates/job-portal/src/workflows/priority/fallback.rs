use serde::{Deserialize, Serialize};

use super::MAX_PRIORITY_SCORE;
use crate::workflows::candidates::domain::{CandidateRecord, EdLevel, JobRole, MentalHealth};

/// Factors contributing to the rule-based score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackFactor {
    Education,
    ProfessionalExperience,
    ComputerSkills,
    AgeBracket,
    JobRole,
    MentalHealth,
}

/// Points awarded for a single factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackComponent {
    pub factor: FallbackFactor,
    pub points: f64,
    pub notes: String,
}

pub fn education_weight(level: &EdLevel) -> f64 {
    match level {
        EdLevel::PhD => 30.0,
        EdLevel::Master => 20.0,
        EdLevel::Bachelor => 15.0,
        EdLevel::HighSchool => 5.0,
        EdLevel::Unlisted(_) => 0.0,
    }
}

pub fn job_role_weight(role: &JobRole) -> f64 {
    match role {
        JobRole::WebDeveloper | JobRole::DataScientist | JobRole::DevOpsEngineer => 30.0,
        JobRole::ProjectManager | JobRole::BusinessAnalyst => 25.0,
        JobRole::UxDesigner | JobRole::FinancialAnalyst => 20.0,
        JobRole::MarketingManager | JobRole::SalesExecutive => 15.0,
        JobRole::HrSpecialist => 10.0,
        JobRole::Unlisted(_) => 0.0,
    }
}

pub fn age_bonus(age: u8) -> f64 {
    match age {
        25..=35 => 20.0,
        36..=45 => 15.0,
        18..=24 => 10.0,
        46..=55 => 5.0,
        _ => 0.0,
    }
}

/// Per-factor breakdown of the rule-based score.
pub fn fallback_components(record: &CandidateRecord) -> Vec<FallbackComponent> {
    let experience = (record.years_code_pro * 4.0).min(40.0);
    let skills = (f64::from(record.computer_skills) * 2.0).min(20.0);
    let wellbeing = if record.mental_health == MentalHealth::Good {
        10.0
    } else {
        0.0
    };

    vec![
        FallbackComponent {
            factor: FallbackFactor::Education,
            points: education_weight(&record.ed_level),
            notes: format!("education level {}", record.ed_level),
        },
        FallbackComponent {
            factor: FallbackFactor::ProfessionalExperience,
            points: experience,
            notes: format!("{} professional year(s), capped at 40", record.years_code_pro),
        },
        FallbackComponent {
            factor: FallbackFactor::ComputerSkills,
            points: skills,
            notes: format!("computer skills {}/10, capped at 20", record.computer_skills),
        },
        FallbackComponent {
            factor: FallbackFactor::AgeBracket,
            points: age_bonus(record.age),
            notes: format!("age {}", record.age),
        },
        FallbackComponent {
            factor: FallbackFactor::JobRole,
            points: job_role_weight(&record.job_role),
            notes: format!("role {}", record.job_role),
        },
        FallbackComponent {
            factor: FallbackFactor::MentalHealth,
            points: wellbeing,
            notes: format!("mental health {}", record.mental_health),
        },
    ]
}

/// Deterministic score used whenever no trained model is available.
pub fn fallback_score(record: &CandidateRecord) -> f64 {
    let total: f64 = fallback_components(record)
        .iter()
        .map(|component| component.points)
        .sum();
    total.clamp(0.0, MAX_PRIORITY_SCORE)
}
