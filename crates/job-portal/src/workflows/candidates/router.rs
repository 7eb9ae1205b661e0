use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationStatus, CandidateSubmission, JobRole, ReviewOutcome};
use super::filter::CandidateFilter;
use super::repository::CandidateRepository;
use super::service::{PortalError, PortalService};
use crate::workflows::priority::{QueueError, TrainingError};

/// Router builder exposing intake, review, and model endpoints.
pub fn candidate_router<R>(service: Arc<PortalService<R>>) -> Router
where
    R: CandidateRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/candidates",
            post(submit_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/candidates/:username", get(status_handler::<R>))
        .route(
            "/api/v1/candidates/:username/decision",
            post(decision_handler::<R>),
        )
        .route("/api/v1/review/next", post(next_handler::<R>))
        .route("/api/v1/model/retrain", post(retrain_handler::<R>))
        .with_state(service)
}

/// List query; a missing value or `All` disables that filter.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub job_role: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<CandidateFilter, String> {
        let mut filter = CandidateFilter::default();
        if let Some(status) = selected(self.status) {
            let status = ApplicationStatus::parse(&status)
                .ok_or_else(|| format!("unknown status '{status}'"))?;
            filter = filter.with_status(status);
        }
        if let Some(role) = selected(self.job_role) {
            filter = filter.with_job_role(JobRole::from(role));
        }
        if let Some(search) = self.search.filter(|text| !text.trim().is_empty()) {
            filter = filter.with_search(search);
        }
        Ok(filter)
    }
}

fn selected(value: Option<String>) -> Option<String> {
    value.filter(|text| {
        let text = text.trim();
        !text.is_empty() && !text.eq_ignore_ascii_case("all")
    })
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub outcome: ReviewOutcome,
}

fn error_response(error: PortalError) -> Response {
    let status = match &error {
        PortalError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PortalError::DuplicateUsername(_) => StatusCode::CONFLICT,
        PortalError::NotFound(_) | PortalError::Queue(QueueError::Empty) => StatusCode::NOT_FOUND,
        PortalError::Training(TrainingError::InsufficientData) => StatusCode::CONFLICT,
        PortalError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<PortalService<R>>>,
    axum::Json(submission): axum::Json<CandidateSubmission>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<PortalService<R>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    match query.into_filter() {
        Ok(filter) => {
            let ranked = service.rank(&filter);
            (StatusCode::OK, axum::Json(ranked)).into_response()
        }
        Err(message) => {
            let payload = json!({
                "error": message,
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<PortalService<R>>>,
    Path(username): Path<String>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.status(&username) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decision_handler<R>(
    State(service): State<Arc<PortalService<R>>>,
    Path(username): Path<String>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.record_decision(&username, request.outcome) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn next_handler<R>(State(service): State<Arc<PortalService<R>>>) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.next_for_review() {
        Ok(record) => {
            let payload = json!({
                "candidate": record,
                "remaining": service.review_queue_len(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn retrain_handler<R>(State(service): State<Arc<PortalService<R>>>) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.retrain() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}
