//! Scoring and verdicts
//!
//! [`ResultComparator`] scores one execution against one test case and
//! [`aggregate`] folds the scored results into a submission verdict.

pub mod comparator;
pub mod verdict;

pub use comparator::{outputs_match, ResultComparator};
pub use verdict::{aggregate, VerdictSummary};
