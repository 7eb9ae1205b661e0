use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;
use tempfile::TempDir;

use crate::workflows::candidates::domain::{
    CandidateRecord, CandidateSubmission, EdLevel, Gender, JobRole, MentalHealth,
};
use crate::workflows::candidates::repository::{
    CandidateRepository, InMemoryCandidateRepository, RepositoryError,
};
use crate::workflows::candidates::{candidate_router, PortalService};
use crate::workflows::priority::{ForestConfig, ModelRegistry, ModelStore};

pub(super) fn submission(username: &str) -> CandidateSubmission {
    CandidateSubmission {
        name: format!("{username} Example"),
        username: username.to_string(),
        age: 31,
        gender: Gender::Female,
        ed_level: EdLevel::Master,
        years_code: 9.0,
        years_code_pro: 6.0,
        country: "Ireland".to_string(),
        previous_salary: 98_000.0,
        have_worked_with: "Python, SQL, Statistics".to_string(),
        computer_skills: 8,
        mental_health: MentalHealth::Good,
        employed: true,
        job_role: JobRole::DataScientist,
    }
}

pub(super) fn junior_submission(username: &str) -> CandidateSubmission {
    CandidateSubmission {
        age: 19,
        ed_level: EdLevel::HighSchool,
        years_code: 1.0,
        years_code_pro: 0.0,
        computer_skills: 3,
        employed: false,
        job_role: JobRole::SalesExecutive,
        have_worked_with: "Excel".to_string(),
        ..submission(username)
    }
}

pub(super) fn registry(dir: &TempDir) -> Arc<ModelRegistry> {
    Arc::new(ModelRegistry::new(
        ModelStore::new(dir.path().join("priority_model.json")),
        ForestConfig {
            n_trees: 8,
            ..ForestConfig::default()
        },
    ))
}

pub(super) struct Harness {
    pub(super) service: Arc<PortalService<InMemoryCandidateRepository>>,
    pub(super) repository: InMemoryCandidateRepository,
    pub(super) models: Arc<ModelRegistry>,
    _dir: TempDir,
}

pub(super) fn build_service(records: Vec<CandidateRecord>) -> Harness {
    let dir = tempfile::tempdir().expect("temp dir");
    let repository = InMemoryCandidateRepository::with_records(records);
    let models = registry(&dir);
    let service = PortalService::new(Arc::new(repository.clone()), models.clone())
        .expect("service initializes");
    Harness {
        service: Arc::new(service),
        repository,
        models,
        _dir: dir,
    }
}

/// Loads an empty dataset and refuses every write.
pub(super) struct UnavailableRepository;

impl CandidateRepository for UnavailableRepository {
    fn load_all(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    fn save_all(&self, _records: &[CandidateRecord]) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }
}

pub(super) fn router_for(harness: &Harness) -> axum::Router {
    candidate_router(harness.service.clone())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
