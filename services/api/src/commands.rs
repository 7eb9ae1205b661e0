use clap::Args;
use job_portal::config::AppConfig;
use job_portal::error::AppError;
use job_portal::telemetry;
use job_portal::workflows::candidates::{
    ApplicationStatus, CandidateFilter, CandidateRepository, JobRole, PortalError,
};
use job_portal::workflows::priority::{load_or_train, ModelOrigin, ScoreSource, TrainingReport};

use crate::infra::{dataset_store, model_store, portal_service};

#[derive(Args, Debug, Default)]
pub(crate) struct TrainArgs {
    /// Retrain even when a persisted model can be loaded
    #[arg(long)]
    pub(crate) force: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Number of candidates to print
    #[arg(long, default_value_t = 10)]
    pub(crate) limit: usize,
    /// Only list candidates with this status (Pending, Approved, Rejected)
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<ApplicationStatus>,
    /// Only list candidates applying for this role
    #[arg(long)]
    pub(crate) job_role: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Username of the candidate to score
    #[arg(long)]
    pub(crate) username: String,
}

pub(crate) fn parse_status(raw: &str) -> Result<ApplicationStatus, String> {
    ApplicationStatus::parse(raw)
        .ok_or_else(|| format!("'{raw}' is not one of Pending, Approved, Rejected"))
}

fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn run_train(args: TrainArgs) -> Result<(), AppError> {
    let config = load_config()?;

    if args.force {
        let service = portal_service(&config)?;
        let report = service.retrain()?;
        println!("Trained a fresh priority model and rescored every candidate");
        render_report(&report);
        return Ok(());
    }

    let records = dataset_store(&config)
        .load_all()
        .map_err(PortalError::from)?;
    let (model, origin) = load_or_train(&model_store(&config), &records, &config.model.forest)?;
    match origin {
        ModelOrigin::Loaded => println!(
            "Loaded persisted priority model from {} (trained {})",
            config.model.path.display(),
            model.trained_at().format("%Y-%m-%d %H:%M UTC")
        ),
        ModelOrigin::Trained => println!(
            "Trained priority model and saved it to {}",
            config.model.path.display()
        ),
    }
    render_report(model.report());
    Ok(())
}

fn render_report(report: &TrainingReport) {
    println!(
        "- {} trees over {} features",
        report.n_trees, report.n_features
    );
    println!(
        "- {} training rows | {} held out",
        report.train_rows, report.test_rows
    );
    match (report.mean_absolute_error, report.r_squared) {
        (Some(mae), Some(r2)) => println!("- hold-out MAE {mae:.2} | R² {r2:.3}"),
        (Some(mae), None) => println!("- hold-out MAE {mae:.2}"),
        _ => println!("- no hold-out rows, metrics unavailable"),
    }
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let service = portal_service(&config)?;

    let mut filter = CandidateFilter::default();
    if let Some(status) = args.status {
        filter = filter.with_status(status);
    }
    if let Some(role) = args.job_role {
        filter = filter.with_job_role(JobRole::from(role));
    }

    let ranked = service.rank(&filter);
    if ranked.is_empty() {
        println!("No candidates match the requested filters");
        return Ok(());
    }

    println!("Candidates by priority ({} matching)", ranked.len());
    for (position, record) in ranked.iter().take(args.limit).enumerate() {
        println!(
            "{:>3}. {:<24} @{:<16} {:<18} {:<8} {:>6.1}",
            position + 1,
            record.name,
            record.username,
            record.job_role,
            record.status.label(),
            record.score_or_zero()
        );
    }
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let service = portal_service(&config)?;

    let record = service.get(&args.username)?;
    let prediction = service.explain(&args.username)?;

    println!(
        "{} (@{}) applying for {}",
        record.name, record.username, record.job_role
    );
    let source = match prediction.source {
        ScoreSource::Model => "trained model",
        ScoreSource::Fallback => "rule-based fallback",
    };
    println!("- priority score {:.1} from the {source}", prediction.score);
    if !prediction.filled_columns.is_empty() {
        println!(
            "- zero-filled columns: {}",
            prediction.filled_columns.join(", ")
        );
    }
    if !prediction.dropped_columns.is_empty() {
        println!(
            "- ignored columns: {}",
            prediction.dropped_columns.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parser_ignores_case() {
        assert_eq!(parse_status("approved"), Ok(ApplicationStatus::Approved));
        assert!(parse_status("Shortlisted").is_err());
    }
}
