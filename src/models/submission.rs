//! Submission model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{Language, ProblemId};
use crate::constants::error_labels;

/// Submission record handed to the submission store.
///
/// Created once per judging run and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub problem_id: ProblemId,
    pub problem_title: String,
    pub problem_difficulty: String,
    pub user_id: String,
    pub code: String,
    /// SHA-256 of `code`, hex encoded
    pub code_hash: String,
    pub language: Language,
    pub verdict: Verdict,
    pub test_case_results: Vec<TestCaseResult>,
    pub passed_tests: usize,
    pub total_tests: usize,
    pub timestamp: DateTime<Utc>,
}

/// Submission-level verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Accepted")]
    Accepted,
    #[serde(rename = "Wrong Answer")]
    WrongAnswer,
    #[serde(rename = "Compilation Error")]
    CompilationError,
    #[serde(rename = "Runtime Error")]
    RuntimeError,
    #[serde(rename = "Time Limit Exceeded")]
    TimeLimitExceeded,
    #[serde(rename = "Error")]
    Error,
}

impl Verdict {
    /// Get verdict as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::WrongAnswer => "Wrong Answer",
            Self::CompilationError => error_labels::COMPILATION_ERROR,
            Self::RuntimeError => error_labels::RUNTIME_ERROR,
            Self::TimeLimitExceeded => error_labels::TIME_LIMIT_EXCEEDED,
            Self::Error => "Error",
        }
    }

    /// Parse verdict from string
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Accepted" => Some(Self::Accepted),
            "Wrong Answer" => Some(Self::WrongAnswer),
            error_labels::COMPILATION_ERROR => Some(Self::CompilationError),
            error_labels::RUNTIME_ERROR => Some(Self::RuntimeError),
            error_labels::TIME_LIMIT_EXCEEDED => Some(Self::TimeLimitExceeded),
            "Error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a test case could not be scored normally
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorType {
    CompilationError,
    RuntimeError,
    TimeLimitExceeded,
    /// Transport, timeout or authentication failure talking to the sandbox
    SystemError,
    /// Any other non-success sandbox status, label kept verbatim
    Sandbox(String),
}

impl ErrorType {
    pub fn label(&self) -> &str {
        match self {
            Self::CompilationError => error_labels::COMPILATION_ERROR,
            Self::RuntimeError => error_labels::RUNTIME_ERROR,
            Self::TimeLimitExceeded => error_labels::TIME_LIMIT_EXCEEDED,
            Self::SystemError => error_labels::SYSTEM_ERROR,
            Self::Sandbox(label) => label,
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<String> for ErrorType {
    fn from(label: String) -> Self {
        match label.as_str() {
            error_labels::COMPILATION_ERROR => Self::CompilationError,
            error_labels::RUNTIME_ERROR => Self::RuntimeError,
            error_labels::TIME_LIMIT_EXCEEDED => Self::TimeLimitExceeded,
            error_labels::SYSTEM_ERROR => Self::SystemError,
            _ => Self::Sandbox(label),
        }
    }
}

impl From<ErrorType> for String {
    fn from(error_type: ErrorType) -> Self {
        match error_type {
            ErrorType::Sandbox(label) => label,
            other => other.label().to_string(),
        }
    }
}

/// Outcome of a single test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    pub input: Value,
    pub expected_output: Value,
    pub user_output: String,
    pub passed: bool,
    #[serde(default)]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl TestCaseResult {
    /// Check if this result carries a given error type
    pub fn has_error_type(&self, error_type: &ErrorType) -> bool {
        self.error_type.as_ref() == Some(error_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verdict_labels_round_trip() {
        for verdict in [
            Verdict::Accepted,
            Verdict::WrongAnswer,
            Verdict::CompilationError,
            Verdict::RuntimeError,
            Verdict::TimeLimitExceeded,
            Verdict::Error,
        ] {
            assert_eq!(Verdict::from_label(verdict.as_str()), Some(verdict));
            let json = serde_json::to_value(verdict).unwrap();
            assert_eq!(json, json!(verdict.as_str()));
        }
    }

    #[test]
    fn test_error_type_serializes_as_label() {
        let result = TestCaseResult {
            input: json!({"n": 1}),
            expected_output: json!(1),
            user_output: "Internal Error".to_string(),
            passed: false,
            error: true,
            error_type: Some(ErrorType::Sandbox("Internal Error".to_string())),
            explanation: None,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["errorType"], json!("Internal Error"));
        assert_eq!(value["userOutput"], json!("Internal Error"));
        assert!(value.get("explanation").is_none());

        let system: ErrorType = serde_json::from_value(json!("SystemError")).unwrap();
        assert_eq!(system, ErrorType::SystemError);
    }
}
