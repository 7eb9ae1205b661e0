use super::common::*;
use crate::workflows::candidates::domain::{ApplicationStatus, JobRole, ReviewOutcome};
use crate::workflows::candidates::{CandidateFilter, PortalError, ValidationError};
use crate::workflows::priority::test_support::{candidate, scored_dataset};
use crate::workflows::priority::{fallback_score, QueueError, TrainingError};

#[test]
fn startup_without_history_scores_with_fallback_rules() {
    let harness = build_service(vec![candidate("Ada", 30), candidate("Bo", 50)]);

    assert!(harness.models.current().is_none());
    let stored = harness.repository.snapshot();
    for record in &stored {
        assert_eq!(record.priority_score, Some(fallback_score(record)));
    }
    assert_eq!(harness.service.review_queue_len(), 2);
}

#[test]
fn startup_trains_on_history_and_scores_new_rows() {
    let mut records = scored_dataset(12);
    records.push(candidate("Newcomer", 29));

    let harness = build_service(records);

    assert!(harness.models.current().is_some());
    assert!(harness
        .repository
        .snapshot()
        .iter()
        .all(|record| record.priority_score.is_some()));
}

#[test]
fn submit_registers_scores_and_queues_candidates() {
    let harness = build_service(Vec::new());

    let record = harness
        .service
        .submit(submission("Grace"))
        .expect("submission succeeds");

    assert_eq!(record.username, "grace");
    assert_eq!(record.status, ApplicationStatus::Pending);
    assert_eq!(record.priority_score, Some(120.0));
    assert_eq!(harness.repository.snapshot(), vec![record]);
    assert_eq!(harness.service.review_queue_len(), 1);
}

#[test]
fn submit_rejects_invalid_fields() {
    let harness = build_service(Vec::new());

    let mut too_young = submission("kid");
    too_young.age = 17;
    match harness.service.submit(too_young) {
        Err(PortalError::Validation(ValidationError::AgeOutOfRange(17))) => {}
        other => panic!("expected age validation error, got {other:?}"),
    }

    let mut inflated = submission("inflated");
    inflated.years_code_pro = 12.0;
    assert!(matches!(
        harness.service.submit(inflated),
        Err(PortalError::Validation(
            ValidationError::ProfessionalExceedsTotal { .. }
        ))
    ));

    let mut blank = submission("blank");
    blank.country = "  ".to_string();
    assert!(matches!(
        harness.service.submit(blank),
        Err(PortalError::Validation(ValidationError::MissingField(
            "Country"
        )))
    ));

    assert!(harness.repository.snapshot().is_empty());
}

#[test]
fn submit_rejects_duplicate_usernames_ignoring_case() {
    let harness = build_service(Vec::new());
    harness
        .service
        .submit(submission("grace"))
        .expect("first submission");

    match harness.service.submit(submission("GRACE")) {
        Err(PortalError::DuplicateUsername(username)) => assert_eq!(username, "grace"),
        other => panic!("expected duplicate error, got {other:?}"),
    }
    assert_eq!(harness.repository.snapshot().len(), 1);
}

#[test]
fn rejection_stores_feedback_and_approval_does_not() {
    let harness = build_service(Vec::new());
    harness.service.submit(submission("grace")).expect("submits");
    harness
        .service
        .submit(junior_submission("jun"))
        .expect("submits");

    let rejected = harness
        .service
        .record_decision("jun", ReviewOutcome::Rejected)
        .expect("decision recorded");
    assert_eq!(rejected.status, ApplicationStatus::Rejected);
    assert!(rejected.feedback.starts_with("AI Feedback:"));
    assert!(rejected.feedback.contains("Sales Executive"));

    let approved = harness
        .service
        .record_decision("Grace", ReviewOutcome::Approved)
        .expect("decision recorded");
    assert_eq!(approved.status, ApplicationStatus::Approved);
    assert!(approved.feedback.is_empty());

    let status = harness.service.status("jun").expect("status view");
    assert_eq!(status.status, "Rejected");
    assert!(status.feedback.is_some());
    assert_eq!(harness.repository.snapshot()[1].status, ApplicationStatus::Rejected);
}

#[test]
fn decisions_on_unknown_candidates_are_not_found() {
    let harness = build_service(Vec::new());

    assert!(matches!(
        harness.service.record_decision("ghost", ReviewOutcome::Approved),
        Err(PortalError::NotFound(_))
    ));
    assert!(matches!(
        harness.service.status("ghost"),
        Err(PortalError::NotFound(_))
    ));
}

#[test]
fn next_for_review_follows_priority_and_skips_decided_entries() {
    let harness = build_service(Vec::new());
    harness
        .service
        .submit(junior_submission("jun"))
        .expect("submits");
    harness.service.submit(submission("grace")).expect("submits");
    let mut mid = submission("mid");
    mid.ed_level = crate::workflows::candidates::domain::EdLevel::Bachelor;
    harness.service.submit(mid).expect("submits");

    harness
        .service
        .record_decision("grace", ReviewOutcome::Approved)
        .expect("decision recorded");

    let pending = harness
        .service
        .rank(&CandidateFilter::default().with_status(ApplicationStatus::Pending));
    let order: Vec<&str> = pending.iter().map(|r| r.username.as_str()).collect();
    assert_eq!(order, ["mid", "jun"]);

    assert_eq!(harness.service.next_for_review().expect("next").username, "mid");
    assert_eq!(harness.service.next_for_review().expect("next").username, "jun");
    assert!(matches!(
        harness.service.next_for_review(),
        Err(PortalError::Queue(QueueError::Empty))
    ));
}

#[test]
fn rank_applies_filters_and_orders_by_score() {
    let harness = build_service(scored_dataset(10));

    let all = harness.service.rank(&CandidateFilter::default());
    assert_eq!(all.len(), 10);
    assert!(all
        .windows(2)
        .all(|pair| pair[0].score_or_zero() >= pair[1].score_or_zero()));

    let scientists = harness
        .service
        .rank(&CandidateFilter::default().with_job_role(JobRole::DataScientist));
    assert!(!scientists.is_empty());
    assert!(scientists
        .iter()
        .all(|record| record.job_role == JobRole::DataScientist));
}

#[test]
fn retrain_requires_scored_history() {
    let harness = build_service(Vec::new());

    assert!(matches!(
        harness.service.retrain(),
        Err(PortalError::Training(TrainingError::InsufficientData))
    ));
}

#[test]
fn retrain_rescores_and_rebuilds_the_queue() {
    let harness = build_service(scored_dataset(10));
    harness
        .service
        .next_for_review()
        .expect("queue starts populated");
    assert_eq!(harness.service.review_queue_len(), 9);

    let report = harness.service.retrain().expect("retrains");

    assert_eq!(report.n_trees, 8);
    assert_eq!(report.train_rows + report.test_rows, 10);
    assert_eq!(harness.service.review_queue_len(), 10);
    assert!(harness
        .repository
        .snapshot()
        .iter()
        .all(|record| record
            .priority_score
            .is_some_and(|score| (0.0..=150.0).contains(&score))));
}

#[test]
fn review_queue_matches_pending_ranking_after_submit() {
    let mut records = scored_dataset(20);
    for (i, record) in records.iter_mut().enumerate() {
        record.priority_score = Some(((i * 37) % 150) as f64);
    }
    let harness = build_service(records);
    assert!(harness.models.current().is_some());

    harness.service.submit(submission("zed")).expect("submits");

    let ranked: Vec<String> = harness
        .service
        .rank(&CandidateFilter::default().with_status(ApplicationStatus::Pending))
        .into_iter()
        .map(|record| record.username)
        .collect();
    let popped: Vec<String> = std::iter::from_fn(|| harness.service.next_for_review().ok())
        .map(|record| record.username)
        .collect();

    assert_eq!(ranked.len(), 21);
    assert_eq!(popped, ranked);
    assert_eq!(harness.repository.snapshot(), harness.service.candidates());
}

#[test]
fn startup_refreshes_stored_scores_against_the_model() {
    let mut records = scored_dataset(12);
    for record in &mut records {
        record.priority_score = Some(1.0);
    }
    records[0].priority_score = Some(149.0);

    let harness = build_service(records);

    assert!(harness.models.current().is_some());
    let dataset = harness.service.candidates();
    let expected = harness.models.context(&dataset).score_all();
    let stored: Vec<f64> = dataset.iter().map(|record| record.score_or_zero()).collect();
    assert_eq!(stored, expected);
}
