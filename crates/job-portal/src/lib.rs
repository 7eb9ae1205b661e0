//! Job portal candidate intake with priority scoring for admin review.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
