use std::sync::{Arc, Mutex, PoisonError};

use super::domain::CandidateRecord;

/// Storage abstraction over the whole candidate dataset.
///
/// The dataset is read and written as a unit, mirroring the flat file it lives in.
pub trait CandidateRepository: Send + Sync {
    fn load_all(&self) -> Result<Vec<CandidateRecord>, RepositoryError>;
    fn save_all(&self, records: &[CandidateRecord]) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("dataset io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid dataset row: {0}")]
    Csv(#[from] csv::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Volatile repository used by tests and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCandidateRepository {
    records: Arc<Mutex<Vec<CandidateRecord>>>,
}

impl InMemoryCandidateRepository {
    pub fn with_records(records: Vec<CandidateRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn snapshot(&self) -> Vec<CandidateRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CandidateRepository for InMemoryCandidateRepository {
    fn load_all(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Ok(self.snapshot())
    }

    fn save_all(&self, records: &[CandidateRecord]) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = records.to_vec();
        Ok(())
    }
}
