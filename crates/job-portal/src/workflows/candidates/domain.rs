use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Declares a categorical field whose known labels map onto variants while
/// any other label read from storage is kept verbatim.
macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident, $fallback:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            $fallback(String),
        }

        impl $name {
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &str {
                match self {
                    $($name::$variant => $label,)+
                    $name::$fallback(raw) => raw.as_str(),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $name::$fallback(_))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value.trim() {
                    $($label => $name::$variant,)+
                    other => $name::$fallback(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name::from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.label().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.label())
            }
        }
    };
}

categorical! {
    /// Self-reported gender.
    Gender, Unlisted {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
}

categorical! {
    /// Highest completed education level.
    EdLevel, Unlisted {
        HighSchool => "High School",
        Bachelor => "Bachelor",
        Master => "Master",
        PhD => "PhD",
    }
}

categorical! {
    /// Self-reported mental health.
    MentalHealth, Unlisted {
        Good => "Good",
        Fair => "Fair",
        Poor => "Poor",
    }
}

categorical! {
    /// Role the candidate is applying for.
    JobRole, Unlisted {
        WebDeveloper => "Web Developer",
        DataScientist => "Data Scientist",
        DevOpsEngineer => "DevOps Engineer",
        ProjectManager => "Project Manager",
        BusinessAnalyst => "Business Analyst",
        UxDesigner => "UX Designer",
        FinancialAnalyst => "Financial Analyst",
        MarketingManager => "Marketing Manager",
        SalesExecutive => "Sales Executive",
        HrSpecialist => "HR Specialist",
    }
}

/// Review status tracked for each application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

/// Admin decision applied to a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    Approved,
    Rejected,
}

impl From<ReviewOutcome> for ApplicationStatus {
    fn from(value: ReviewOutcome) -> Self {
        match value {
            ReviewOutcome::Approved => ApplicationStatus::Approved,
            ReviewOutcome::Rejected => ApplicationStatus::Rejected,
        }
    }
}

/// One row of the candidate dataset.
///
/// Columns absent from a dataset file read as blank text, zero, not employed,
/// `Fair` mental health, and an application date of today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CandidateRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub age: u8,
    #[serde(default = "blank_label")]
    pub gender: Gender,
    #[serde(default = "blank_label")]
    pub ed_level: EdLevel,
    #[serde(default)]
    pub years_code: f64,
    #[serde(default)]
    pub years_code_pro: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub previous_salary: f64,
    #[serde(default)]
    pub have_worked_with: String,
    #[serde(default)]
    pub computer_skills: u8,
    #[serde(default = "fair_mental_health")]
    pub mental_health: MentalHealth,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub employed: bool,
    #[serde(default = "blank_label")]
    pub job_role: JobRole,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub feedback: String,
    #[serde(default = "today")]
    pub application_date: NaiveDate,
    #[serde(default)]
    pub priority_score: Option<f64>,
}

impl CandidateRecord {
    /// Builds a pending record from validated intake fields.
    pub fn from_submission(submission: CandidateSubmission, application_date: NaiveDate) -> Self {
        Self {
            name: submission.name.trim().to_string(),
            username: submission.username.trim().to_ascii_lowercase(),
            age: submission.age,
            gender: submission.gender,
            ed_level: submission.ed_level,
            years_code: submission.years_code,
            years_code_pro: submission.years_code_pro,
            country: submission.country.trim().to_string(),
            previous_salary: submission.previous_salary,
            have_worked_with: submission.have_worked_with.trim().to_string(),
            computer_skills: submission.computer_skills,
            mental_health: submission.mental_health,
            employed: submission.employed,
            job_role: submission.job_role,
            status: ApplicationStatus::Pending,
            feedback: String::new(),
            application_date,
            priority_score: None,
        }
    }

    pub fn score_or_zero(&self) -> f64 {
        self.priority_score.unwrap_or(0.0)
    }

    pub fn status_view(&self) -> CandidateStatusView {
        CandidateStatusView {
            username: self.username.clone(),
            name: self.name.clone(),
            job_role: self.job_role.label().to_string(),
            status: self.status.label(),
            feedback: if self.feedback.is_empty() {
                None
            } else {
                Some(self.feedback.clone())
            },
            priority_score: self.priority_score,
            application_date: self.application_date,
        }
    }
}

fn blank_label<T: From<&'static str>>() -> T {
    T::from("")
}

fn fair_mental_health() -> MentalHealth {
    MentalHealth::Fair
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrText {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Accepts JSON booleans plus `True`/`False`, `1`/`0` text as written by spreadsheet tools.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match BoolOrText::deserialize(deserializer)? {
        BoolOrText::Bool(value) => Ok(value),
        BoolOrText::Number(value) => Ok(value != 0.0),
        BoolOrText::Text(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean, found '{other}'"
            ))),
        },
    }
}

/// Raw registration fields supplied by the candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSubmission {
    pub name: String,
    pub username: String,
    pub age: u8,
    pub gender: Gender,
    pub ed_level: EdLevel,
    pub years_code: f64,
    pub years_code_pro: f64,
    pub country: String,
    pub previous_salary: f64,
    pub have_worked_with: String,
    pub computer_skills: u8,
    pub mental_health: MentalHealth,
    pub employed: bool,
    pub job_role: JobRole,
}

/// Candidate-facing projection of an application.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateStatusView {
    pub username: String,
    pub name: String,
    pub job_role: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub priority_score: Option<f64>,
    pub application_date: NaiveDate,
}
