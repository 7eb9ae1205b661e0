use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use job_portal::config::AppConfig;
use job_portal::error::AppError;
use job_portal::workflows::candidates::{CsvCandidateStore, PortalService};
use job_portal::workflows::priority::{ModelRegistry, ModelStore};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type CsvPortalService = PortalService<CsvCandidateStore>;

pub(crate) fn dataset_store(config: &AppConfig) -> CsvCandidateStore {
    CsvCandidateStore::new(config.storage.dataset_path.clone())
}

pub(crate) fn model_store(config: &AppConfig) -> ModelStore {
    ModelStore::new(config.model.path.clone())
}

pub(crate) fn model_registry(config: &AppConfig) -> Arc<ModelRegistry> {
    Arc::new(ModelRegistry::new(model_store(config), config.model.forest))
}

/// Portal service backed by the configured CSV dataset and model artifact.
pub(crate) fn portal_service(config: &AppConfig) -> Result<Arc<CsvPortalService>, AppError> {
    let service = PortalService::new(Arc::new(dataset_store(config)), model_registry(config))?;
    Ok(Arc::new(service))
}
