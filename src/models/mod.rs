//! Domain models
//!
//! This module contains all domain models used throughout the judge.

pub mod language;
pub mod problem;
pub mod request;
pub mod submission;
pub mod test_case;

pub use language::*;
pub use problem::*;
pub use request::*;
pub use submission::*;
pub use test_case::*;
