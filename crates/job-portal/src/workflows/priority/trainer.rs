use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::encoder::{FeatureEncoder, FeatureSchema};
use super::forest::{train_test_split, ForestConfig, RandomForest};
use super::ScoringContext;
use crate::workflows::candidates::domain::CandidateRecord;

/// Regression forest bundled with the exact feature schema it was fit on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    schema: FeatureSchema,
    forest: RandomForest,
    report: TrainingReport,
    trained_at: DateTime<Utc>,
}

impl TrainedModel {
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    fn check(&self) -> Result<(), String> {
        if self.forest.n_features() != self.schema.len() {
            return Err(format!(
                "forest expects {} features but the schema lists {}",
                self.forest.n_features(),
                self.schema.len()
            ));
        }
        self.forest.check()
    }

    /// Unclamped inference over a vector already aligned to [`TrainedModel::schema`].
    pub fn predict_raw(&self, values: &[f64]) -> f64 {
        self.forest.predict(values)
    }
}

/// Hold-out statistics captured at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub n_trees: usize,
    pub n_features: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_absolute_error: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_squared: Option<f64>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TrainingError {
    #[error("training requires at least one historical record with a priority score")]
    InsufficientData,
}

/// Persisted model artifact could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadFailure {
    #[error("no persisted model at {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read model artifact {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("model artifact {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ModelPersistError {
    #[error("failed to write model artifact: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode model artifact: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Whether a model came from disk or from a fresh training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOrigin {
    Loaded,
    Trained,
}

/// JSON file holding a [`TrainedModel`].
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<TrainedModel, ModelLoadFailure> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ModelLoadFailure::Missing(self.path.clone()))
            }
            Err(source) => {
                return Err(ModelLoadFailure::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let corrupt = |source| ModelLoadFailure::Corrupt {
            path: self.path.clone(),
            source,
        };
        let model: TrainedModel = serde_json::from_slice(&bytes).map_err(corrupt)?;
        model
            .check()
            .map_err(|reason| corrupt(serde_json::Error::custom(reason)))?;
        Ok(model)
    }

    /// Writes to a sibling temp file and renames it over the artifact.
    pub fn save(&self, model: &TrainedModel) -> Result<(), ModelPersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec(model)?)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// Fits a fresh model against the records that already carry a priority score.
pub fn train_model(
    records: &[CandidateRecord],
    config: &ForestConfig,
) -> Result<TrainedModel, TrainingError> {
    let scored: Vec<(&CandidateRecord, f64)> = records
        .iter()
        .filter_map(|record| {
            record
                .priority_score
                .filter(|score| score.is_finite())
                .map(|score| (record, score))
        })
        .collect();

    if scored.is_empty() {
        return Err(TrainingError::InsufficientData);
    }

    let encoder = FeatureEncoder::fit(records);
    let schema = encoder.schema();
    let rows = encoder.encode_all(scored.iter().map(|(record, _)| *record));
    let targets: Vec<f64> = scored.iter().map(|(_, score)| *score).collect();

    let (train, test) = train_test_split(rows.len(), config.test_fraction, config.seed);
    let train_rows: Vec<Vec<f64>> = train.iter().map(|&i| rows[i].clone()).collect();
    let train_targets: Vec<f64> = train.iter().map(|&i| targets[i]).collect();

    debug!(
        train_rows = train_rows.len(),
        test_rows = test.len(),
        features = schema.len(),
        "fitting priority forest"
    );
    let forest = RandomForest::fit(&train_rows, &train_targets, config);

    let (mean_absolute_error, r_squared) = holdout_metrics(&forest, &rows, &targets, &test);
    let report = TrainingReport {
        train_rows: train_rows.len(),
        test_rows: test.len(),
        n_trees: forest.n_trees(),
        n_features: schema.len(),
        mean_absolute_error,
        r_squared,
    };

    Ok(TrainedModel {
        schema,
        forest,
        report,
        trained_at: Utc::now(),
    })
}

fn holdout_metrics(
    forest: &RandomForest,
    rows: &[Vec<f64>],
    targets: &[f64],
    test: &[usize],
) -> (Option<f64>, Option<f64>) {
    if test.is_empty() {
        return (None, None);
    }

    let n = test.len() as f64;
    let mean = test.iter().map(|&i| targets[i]).sum::<f64>() / n;
    let mut abs_error = 0.0;
    let mut residual = 0.0;
    let mut variance = 0.0;
    for &i in test {
        let predicted = forest.predict(&rows[i]);
        abs_error += (predicted - targets[i]).abs();
        residual += (predicted - targets[i]).powi(2);
        variance += (targets[i] - mean).powi(2);
    }

    let r_squared = if variance > 0.0 {
        Some(1.0 - residual / variance)
    } else {
        None
    };
    (Some(abs_error / n), r_squared)
}

/// Returns the persisted model when one can be read, otherwise trains and persists a new one.
///
/// A readable artifact is returned as-is, however old. Missing or corrupt artifacts are
/// recovered by retraining; failing to persist the new model only logs a warning.
pub fn load_or_train(
    store: &ModelStore,
    records: &[CandidateRecord],
    config: &ForestConfig,
) -> Result<(TrainedModel, ModelOrigin), TrainingError> {
    match store.load() {
        Ok(model) => {
            info!(
                path = %store.path().display(),
                features = model.schema().len(),
                "loaded persisted priority model"
            );
            return Ok((model, ModelOrigin::Loaded));
        }
        Err(ModelLoadFailure::Missing(_)) => {
            debug!(path = %store.path().display(), "no persisted priority model");
        }
        Err(err) => {
            warn!(error = %err, "persisted priority model unusable, retraining");
        }
    }

    let model = train_and_persist(store, records, config)?;
    Ok((model, ModelOrigin::Trained))
}

fn train_and_persist(
    store: &ModelStore,
    records: &[CandidateRecord],
    config: &ForestConfig,
) -> Result<TrainedModel, TrainingError> {
    let model = train_model(records, config)?;
    info!(
        train_rows = model.report().train_rows,
        test_rows = model.report().test_rows,
        mae = ?model.report().mean_absolute_error,
        r2 = ?model.report().r_squared,
        "trained priority model"
    );
    if let Err(err) = store.save(&model) {
        warn!(error = %err, path = %store.path().display(), "failed to persist priority model");
    }
    Ok(model)
}

/// Process-wide model handle.
///
/// Readers clone an `Arc` out of the lock, so a swap never exposes a partially
/// built model. Training runs are serialized by a separate mutex.
#[derive(Debug)]
pub struct ModelRegistry {
    store: ModelStore,
    config: ForestConfig,
    current: RwLock<Option<Arc<TrainedModel>>>,
    training: Mutex<()>,
}

impl ModelRegistry {
    pub fn new(store: ModelStore, config: ForestConfig) -> Self {
        Self {
            store,
            config,
            current: RwLock::new(None),
            training: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn current(&self) -> Option<Arc<TrainedModel>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Initializes the model on first use and returns the shared instance afterwards.
    pub fn load_or_train(
        &self,
        records: &[CandidateRecord],
    ) -> Result<Arc<TrainedModel>, TrainingError> {
        let _training = self.training.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = self.current() {
            return Ok(model);
        }

        let (model, _) = load_or_train(&self.store, records, &self.config)?;
        Ok(self.install(model))
    }

    /// Trains from `records` regardless of any existing model and swaps it in.
    pub fn retrain(&self, records: &[CandidateRecord]) -> Result<Arc<TrainedModel>, TrainingError> {
        let _training = self.training.lock().unwrap_or_else(PoisonError::into_inner);
        let model = train_and_persist(&self.store, records, &self.config)?;
        Ok(self.install(model))
    }

    fn install(&self, model: TrainedModel) -> Arc<TrainedModel> {
        let model = Arc::new(model);
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(model.clone());
        model
    }

    pub fn context<'a>(&self, dataset: &'a [CandidateRecord]) -> ScoringContext<'a> {
        ScoringContext::new(dataset, self.current())
    }
}
