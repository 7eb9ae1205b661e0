pub mod candidates;
pub mod priority;
