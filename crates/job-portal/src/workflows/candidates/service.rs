use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use super::domain::{
    ApplicationStatus, CandidateRecord, CandidateStatusView, CandidateSubmission, ReviewOutcome,
};
use super::feedback::generate_feedback;
use super::filter::CandidateFilter;
use super::repository::{CandidateRepository, RepositoryError};
use crate::workflows::priority::{
    compare_priority, recompute_scores, ModelRegistry, Prediction, QueueError, RankingQueue,
    TrainingError, TrainingReport,
};

/// Service composing the candidate repository, the model registry, and the review queue.
pub struct PortalService<R> {
    repository: Arc<R>,
    models: Arc<ModelRegistry>,
    dataset: RwLock<Vec<CandidateRecord>>,
    review_queue: Mutex<RankingQueue>,
}

impl<R> PortalService<R>
where
    R: CandidateRepository + 'static,
{
    /// Loads the dataset, initializes the model, and queues pending candidates.
    ///
    /// Without any scored history the model stays empty and the fallback rules score
    /// every record. With a model installed every stored score is refreshed against it,
    /// and changed scores are saved.
    pub fn new(repository: Arc<R>, models: Arc<ModelRegistry>) -> Result<Self, PortalError> {
        let mut records = repository.load_all()?;

        match models.load_or_train(&records) {
            Ok(model) => info!(
                features = model.schema().len(),
                trained_at = %model.trained_at(),
                "priority model ready"
            ),
            Err(TrainingError::InsufficientData) => {
                warn!("no scored candidates to train on, using rule-based priority scores")
            }
        }

        let model = models.current();
        if model.is_some() || records.iter().any(|record| record.priority_score.is_none()) {
            let stored: Vec<Option<f64>> = records.iter().map(|r| r.priority_score).collect();
            recompute_scores(&mut records, model.as_deref());
            if records.iter().map(|r| r.priority_score).ne(stored) {
                repository.save_all(&records)?;
            }
        }

        let review_queue = pending_queue(&records);
        info!(
            candidates = records.len(),
            pending = review_queue.size(),
            "candidate portal initialized"
        );

        Ok(Self {
            repository,
            models,
            dataset: RwLock::new(records),
            review_queue: Mutex::new(review_queue),
        })
    }

    fn read_dataset(&self) -> RwLockReadGuard<'_, Vec<CandidateRecord>> {
        self.dataset.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_dataset(&self) -> RwLockWriteGuard<'_, Vec<CandidateRecord>> {
        self.dataset.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn queue(&self) -> MutexGuard<'_, RankingQueue> {
        self.review_queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new candidate dated today.
    pub fn submit(
        &self,
        submission: CandidateSubmission,
    ) -> Result<CandidateRecord, PortalError> {
        self.submit_on(submission, Local::now().date_naive())
    }

    /// Registers a new candidate, rescoring the whole dataset so every score shares one
    /// encoding of the categories. The review queue is rebuilt from the fresh scores.
    pub fn submit_on(
        &self,
        submission: CandidateSubmission,
        application_date: NaiveDate,
    ) -> Result<CandidateRecord, PortalError> {
        validate_submission(&submission)?;

        let mut dataset = self.write_dataset();
        let username = submission.username.trim().to_ascii_lowercase();
        if dataset.iter().any(|record| record.username == username) {
            return Err(PortalError::DuplicateUsername(username));
        }

        let mut updated = dataset.clone();
        updated.push(CandidateRecord::from_submission(submission, application_date));
        recompute_scores(&mut updated, self.models.current().as_deref());
        self.repository.save_all(&updated)?;

        *dataset = updated;
        let record = dataset
            .last()
            .cloned()
            .ok_or_else(|| PortalError::NotFound(username.clone()))?;
        *self.queue() = pending_queue(&dataset);
        drop(dataset);

        info!(username = %record.username, score = record.score_or_zero(), "candidate registered");
        Ok(record)
    }

    /// Score `record` would receive against the current dataset and model.
    pub fn compute_score(&self, record: &CandidateRecord) -> f64 {
        let dataset = self.read_dataset();
        self.models.context(&dataset).score(record)
    }

    pub fn explain(&self, username: &str) -> Result<Prediction, PortalError> {
        let dataset = self.read_dataset();
        let record = find(&dataset, username)?;
        Ok(self.models.context(&dataset).explain(record))
    }

    /// Filtered candidates, highest priority first.
    pub fn rank(&self, filter: &CandidateFilter) -> Vec<CandidateRecord> {
        let dataset = self.read_dataset();
        let mut ranked: Vec<CandidateRecord> = dataset
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        ranked.sort_by(|a, b| compare_priority(a.score_or_zero(), a, b.score_or_zero(), b));
        ranked
    }

    pub fn get(&self, username: &str) -> Result<CandidateRecord, PortalError> {
        let dataset = self.read_dataset();
        find(&dataset, username).cloned()
    }

    pub fn status(&self, username: &str) -> Result<CandidateStatusView, PortalError> {
        self.get(username).map(|record| record.status_view())
    }

    /// Applies an admin decision; rejections carry generated feedback.
    pub fn record_decision(
        &self,
        username: &str,
        outcome: ReviewOutcome,
    ) -> Result<CandidateRecord, PortalError> {
        let mut dataset = self.write_dataset();
        let key = username.trim().to_ascii_lowercase();
        let index = dataset
            .iter()
            .position(|record| record.username == key)
            .ok_or_else(|| PortalError::NotFound(key.clone()))?;

        let mut updated = dataset.clone();
        let record = &mut updated[index];
        record.status = ApplicationStatus::from(outcome);
        if outcome == ReviewOutcome::Rejected {
            record.feedback = generate_feedback(record);
        }
        let record = record.clone();

        self.repository.save_all(&updated)?;
        *dataset = updated;

        info!(username = %record.username, status = record.status.label(), "decision recorded");
        Ok(record)
    }

    /// Removes and returns the highest-priority candidate still pending review.
    ///
    /// Entries decided since they were queued are discarded on the way.
    pub fn next_for_review(&self) -> Result<CandidateRecord, PortalError> {
        let dataset = self.read_dataset();
        let mut queue = self.queue();
        loop {
            let queued = queue.pop_highest()?;
            if let Some(current) = dataset
                .iter()
                .find(|record| record.username == queued.username)
                .filter(|record| record.status == ApplicationStatus::Pending)
            {
                return Ok(current.clone());
            }
        }
    }

    pub fn review_queue_len(&self) -> usize {
        self.queue().size()
    }

    /// Trains a fresh model, rescores every candidate, and rebuilds the review queue.
    pub fn retrain(&self) -> Result<TrainingReport, PortalError> {
        let mut dataset = self.write_dataset();
        let model = self.models.retrain(&dataset)?;

        let mut updated = dataset.clone();
        recompute_scores(&mut updated, Some(model.as_ref()));
        self.repository.save_all(&updated)?;
        *dataset = updated;

        *self.queue() = pending_queue(&dataset);
        Ok(model.report().clone())
    }

    pub fn candidates(&self) -> Vec<CandidateRecord> {
        self.read_dataset().clone()
    }
}

fn pending_queue(records: &[CandidateRecord]) -> RankingQueue {
    RankingQueue::from_scored(
        records
            .iter()
            .filter(|record| record.status == ApplicationStatus::Pending)
            .cloned(),
    )
}

fn find<'a>(dataset: &'a [CandidateRecord], username: &str) -> Result<&'a CandidateRecord, PortalError> {
    let key = username.trim().to_ascii_lowercase();
    dataset
        .iter()
        .find(|record| record.username == key)
        .ok_or(PortalError::NotFound(key))
}

/// Field checks performed before a submission reaches the scoring core.
pub fn validate_submission(submission: &CandidateSubmission) -> Result<(), ValidationError> {
    let required = [
        ("Full Name", &submission.name),
        ("Username", &submission.username),
        ("Country", &submission.country),
        ("Technologies Worked With", &submission.have_worked_with),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }

    if !(18..=70).contains(&submission.age) {
        return Err(ValidationError::AgeOutOfRange(submission.age));
    }
    if !(1..=10).contains(&submission.computer_skills) {
        return Err(ValidationError::ComputerSkillsOutOfRange(
            submission.computer_skills,
        ));
    }

    let amounts = [
        ("Total Coding Experience", submission.years_code),
        ("Professional Coding Experience", submission.years_code_pro),
        ("Previous Salary", submission.previous_salary),
    ];
    for (field, value) in amounts {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidAmount(field));
        }
    }

    if submission.years_code_pro > submission.years_code {
        return Err(ValidationError::ProfessionalExceedsTotal {
            professional: submission.years_code_pro,
            total: submission.years_code,
        });
    }

    Ok(())
}

/// Submission rejected before registration.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("please fill in the {0} field")]
    MissingField(&'static str),
    #[error("age must be between 18 and 70 (got {0})")]
    AgeOutOfRange(u8),
    #[error("computer skills must be between 1 and 10 (got {0})")]
    ComputerSkillsOutOfRange(u8),
    #[error("{0} must be a non-negative number")]
    InvalidAmount(&'static str),
    #[error("professional experience ({professional}) cannot exceed total coding experience ({total})")]
    ProfessionalExceedsTotal { professional: f64, total: f64 },
}

/// Error raised by the portal service.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("username '{0}' already exists")]
    DuplicateUsername(String),
    #[error("candidate '{0}' not found")]
    NotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Training(#[from] TrainingError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}
