//! Priority scoring: feature encoding, the regression forest and its lifecycle,
//! the rule-based fallback, and the review ranking queue.

pub mod encoder;
pub mod fallback;
pub mod forest;
pub mod predictor;
pub mod queue;
pub mod trainer;

use std::sync::Arc;

use crate::workflows::candidates::domain::CandidateRecord;

pub use encoder::{FeatureEncoder, FeatureSchema, FeatureVector, Reconciliation};
pub use fallback::{fallback_components, fallback_score, FallbackComponent, FallbackFactor};
pub use forest::ForestConfig;
pub use predictor::{predict, predict_detailed, recompute_scores, Prediction, ScoreSource};
pub use queue::{compare_priority, rank_candidates, QueueError, RankingQueue};
pub use trainer::{
    load_or_train, train_model, ModelLoadFailure, ModelOrigin, ModelRegistry, ModelStore,
    TrainedModel, TrainingError, TrainingReport,
};

/// Upper bound of every priority score.
pub const MAX_PRIORITY_SCORE: f64 = 150.0;

/// Dataset and model handle that every scoring call runs against.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    dataset: &'a [CandidateRecord],
    model: Option<Arc<TrainedModel>>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(dataset: &'a [CandidateRecord], model: Option<Arc<TrainedModel>>) -> Self {
        Self { dataset, model }
    }

    pub fn dataset(&self) -> &'a [CandidateRecord] {
        self.dataset
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_deref()
    }

    pub fn score(&self, candidate: &CandidateRecord) -> f64 {
        predict(candidate, self.model(), self.dataset)
    }

    pub fn explain(&self, candidate: &CandidateRecord) -> Prediction {
        predict_detailed(candidate, self.model(), self.dataset)
    }

    /// Scores for every record of the dataset, in dataset order.
    pub fn score_all(&self) -> Vec<f64> {
        predictor::score_dataset(self.dataset, self.model())
    }
}
