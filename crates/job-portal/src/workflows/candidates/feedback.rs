use super::domain::{CandidateRecord, EdLevel, JobRole, MentalHealth};

const NO_SPECIFIC_FEEDBACK: &str = "No specific feedback available. Your profile looks good overall, but the competition was particularly strong for this role.";

fn role_requirements(role: &JobRole) -> &'static [&'static str] {
    match role {
        JobRole::DataScientist => &["Python", "SQL", "Machine Learning", "Statistics", "Data Analysis"],
        JobRole::WebDeveloper => &["JavaScript", "HTML/CSS", "React", "Node.js", "Frontend"],
        JobRole::DevOpsEngineer => &["Docker", "Kubernetes", "AWS", "CI/CD", "Infrastructure"],
        JobRole::ProjectManager => &["Leadership", "Agile", "Scrum", "Communication", "Planning"],
        JobRole::BusinessAnalyst => &["SQL", "Excel", "Requirements", "Documentation", "Analysis"],
        JobRole::UxDesigner => &["Figma", "User Research", "Wireframing", "Prototyping", "UI/UX"],
        JobRole::MarketingManager => &["SEO", "Content", "Social Media", "Advertising", "Branding"],
        JobRole::FinancialAnalyst => &[
            "Excel",
            "Financial Modeling",
            "Accounting",
            "Forecasting",
            "Analysis",
        ],
        JobRole::SalesExecutive => &["CRM", "Negotiation", "Communication", "Relationship", "Sales"],
        JobRole::HrSpecialist => &[
            "Recruitment",
            "Employee Relations",
            "HR Policies",
            "Interviewing",
            "Compliance",
        ],
        JobRole::Unlisted(_) => &[],
    }
}

fn average_salary(role: &JobRole) -> Option<f64> {
    let salary = match role {
        JobRole::DataScientist => 120_000.0,
        JobRole::WebDeveloper => 85_000.0,
        JobRole::DevOpsEngineer => 110_000.0,
        JobRole::ProjectManager => 95_000.0,
        JobRole::BusinessAnalyst => 80_000.0,
        JobRole::UxDesigner => 75_000.0,
        JobRole::FinancialAnalyst => 90_000.0,
        JobRole::MarketingManager => 80_000.0,
        JobRole::SalesExecutive => 70_000.0,
        JobRole::HrSpecialist => 65_000.0,
        JobRole::Unlisted(_) => return None,
    };
    Some(salary)
}

/// Dollar amount with thousands separators and no cents.
fn dollars(amount: f64) -> String {
    let whole = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if amount < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Improvement suggestions attached to a rejected application.
pub fn generate_feedback(record: &CandidateRecord) -> String {
    let mut notes = Vec::new();

    let skills = record.have_worked_with.to_lowercase();
    let missing: Vec<&str> = role_requirements(&record.job_role)
        .iter()
        .copied()
        .filter(|skill| !skills.contains(&skill.to_lowercase()))
        .collect();
    if !missing.is_empty() {
        notes.push(format!(
            "For {} roles, we recommend gaining experience with: {}",
            record.job_role,
            missing.join(", ")
        ));
    }

    let years = record.years_code_pro;
    if years < 3.0 {
        notes.push(format!(
            "More professional experience would strengthen your application (currently {years} years). Consider internships or freelance work."
        ));
    } else if years < 5.0 {
        notes.push(format!(
            "While you have {years} years of experience, additional professional experience would make you more competitive."
        ));
    }

    match (&record.ed_level, &record.job_role) {
        (EdLevel::HighSchool, _) => notes.push(
            "Consider pursuing higher education or professional certifications to be more competitive."
                .to_string(),
        ),
        (EdLevel::Bachelor, JobRole::DataScientist | JobRole::DevOpsEngineer) => notes.push(
            "For this technical role, a Master's degree or specialized certifications could be beneficial."
                .to_string(),
        ),
        _ => {}
    }

    let rating = record.computer_skills;
    if rating < 5 {
        notes.push(format!(
            "Your computer skills rating ({rating}/10) could be improved through courses or certifications."
        ));
    } else if rating < 8 {
        notes.push(format!(
            "Your computer skills are decent ({rating}/10), but reaching 8+ would make you more competitive."
        ));
    }

    if record.mental_health == MentalHealth::Poor {
        notes.push(
            "We noticed you reported poor mental health. Many companies offer wellness programs that could help."
                .to_string(),
        );
    }

    if record.previous_salary > 0.0 {
        if let Some(average) = average_salary(&record.job_role) {
            let ratio = record.previous_salary / average;
            if ratio > 1.2 {
                notes.push(format!(
                    "Your previous salary ({}) is significantly higher than average for this role ({}).",
                    dollars(record.previous_salary),
                    dollars(average)
                ));
            } else if ratio < 0.8 {
                notes.push(format!(
                    "Your previous salary ({}) is below average for this role ({}), which could work in your favor.",
                    dollars(record.previous_salary),
                    dollars(average)
                ));
            }
        }
    }

    if notes.is_empty() {
        NO_SPECIFIC_FEEDBACK.to_string()
    } else {
        format!("AI Feedback:\n- {}", notes.join("\n- "))
    }
}
