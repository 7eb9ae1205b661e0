use serde::Serialize;

use super::encoder::{encode_for_schema, reconcile, FeatureEncoder};
use super::fallback::fallback_score;
use super::trainer::TrainedModel;
use super::MAX_PRIORITY_SCORE;
use crate::workflows::candidates::domain::CandidateRecord;

/// Which scorer produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Model,
    Fallback,
}

/// Score plus the schema adjustments made to reach it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub score: f64,
    pub source: ScoreSource,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filled_columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped_columns: Vec<String>,
}

impl Prediction {
    fn fallback(candidate: &CandidateRecord) -> Self {
        Self {
            score: fallback_score(candidate),
            source: ScoreSource::Fallback,
            filled_columns: Vec::new(),
            dropped_columns: Vec::new(),
        }
    }
}

pub fn clamp_score(raw: f64) -> f64 {
    raw.clamp(0.0, MAX_PRIORITY_SCORE)
}

/// Priority score for `candidate` in `[0, 150]`.
pub fn predict(
    candidate: &CandidateRecord,
    model: Option<&TrainedModel>,
    historical: &[CandidateRecord],
) -> f64 {
    predict_detailed(candidate, model, historical).score
}

pub fn predict_detailed(
    candidate: &CandidateRecord,
    model: Option<&TrainedModel>,
    historical: &[CandidateRecord],
) -> Prediction {
    let Some(model) = model else {
        return Prediction::fallback(candidate);
    };

    let aligned = encode_for_schema(candidate, historical, model.schema());
    infer(candidate, model, aligned.vector.values, aligned.filled, aligned.dropped)
}

fn infer(
    candidate: &CandidateRecord,
    model: &TrainedModel,
    values: Vec<f64>,
    filled_columns: Vec<String>,
    dropped_columns: Vec<String>,
) -> Prediction {
    let raw = model.predict_raw(&values);
    if !raw.is_finite() {
        return Prediction::fallback(candidate);
    }

    Prediction {
        score: clamp_score(raw),
        source: ScoreSource::Model,
        filled_columns,
        dropped_columns,
    }
}

/// Scores every record of `dataset` against the dataset itself.
///
/// The encoder is fit once; since every record belongs to the dataset the result
/// equals calling [`predict`] per record.
pub fn score_dataset(dataset: &[CandidateRecord], model: Option<&TrainedModel>) -> Vec<f64> {
    let Some(model) = model else {
        return dataset.iter().map(fallback_score).collect();
    };

    let encoder = FeatureEncoder::fit(dataset);
    dataset
        .iter()
        .map(|record| {
            let aligned = reconcile(&encoder.encode_vector(record), model.schema());
            infer(record, model, aligned.vector.values, aligned.filled, aligned.dropped).score
        })
        .collect()
}

/// Recomputes and stores the score of every record.
pub fn recompute_scores(dataset: &mut [CandidateRecord], model: Option<&TrainedModel>) {
    let scores = score_dataset(dataset, model);
    for (record, score) in dataset.iter_mut().zip(scores) {
        record.priority_score = Some(score);
    }
}
