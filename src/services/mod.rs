//! Business logic services

pub mod judging_service;

pub use judging_service::{JudgingService, SubmissionOutcome};
