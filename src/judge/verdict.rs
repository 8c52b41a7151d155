//! Submission-level verdict aggregation

use serde::{Deserialize, Serialize};

use crate::models::{ErrorType, TestCaseResult, Verdict};

/// Submission verdict for a set of test case results.
///
/// Priority: compilation error, runtime error, time limit, any other error,
/// then accepted if everything passed, else wrong answer. Position of a
/// result does not matter, and an empty set is accepted.
pub fn aggregate(results: &[TestCaseResult]) -> Verdict {
    let any = |error_type: ErrorType| results.iter().any(|r| r.has_error_type(&error_type));

    if any(ErrorType::CompilationError) {
        Verdict::CompilationError
    } else if any(ErrorType::RuntimeError) {
        Verdict::RuntimeError
    } else if any(ErrorType::TimeLimitExceeded) {
        Verdict::TimeLimitExceeded
    } else if results.iter().any(|r| r.error) {
        Verdict::Error
    } else if results.iter().all(|r| r.passed) {
        Verdict::Accepted
    } else {
        Verdict::WrongAnswer
    }
}

/// Aggregated outcome of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictSummary {
    pub verdict: Verdict,
    pub passed: usize,
    pub total: usize,
    /// Index of the first test case that did not pass
    pub first_failure: Option<usize>,
}

impl VerdictSummary {
    /// Summarize test case results
    pub fn from_results(results: &[TestCaseResult]) -> Self {
        Self {
            verdict: aggregate(results),
            passed: results.iter().filter(|r| r.passed).count(),
            total: results.len(),
            first_failure: results.iter().position(|r| !r.passed),
        }
    }
}
