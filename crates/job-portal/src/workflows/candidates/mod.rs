//! Candidate intake, storage, admin review, and rejection feedback.

pub mod domain;
pub mod feedback;
pub mod filter;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationStatus, CandidateRecord, CandidateStatusView, CandidateSubmission, EdLevel, Gender,
    JobRole, MentalHealth, ReviewOutcome,
};
pub use feedback::generate_feedback;
pub use filter::CandidateFilter;
pub use repository::{CandidateRepository, InMemoryCandidateRepository, RepositoryError};
pub use router::candidate_router;
pub use service::{validate_submission, PortalError, PortalService, ValidationError};
pub use store::{read_candidates, write_candidates, CsvCandidateStore, DATASET_COLUMNS};
