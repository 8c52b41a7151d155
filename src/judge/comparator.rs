//! Test case scoring
//!
//! Turns one sandbox execution into a [`TestCaseResult`]. Failure checks run
//! in a fixed order and the first one that applies decides the result:
//! transport failure, compiler output, stderr, non-success status. Only a
//! clean run is compared against the expected output.

use serde_json::Value;

use crate::codegen::{GenericType, LevelOrder, ScalarType, StructureKind};
use crate::constants::FLOAT_RELATIVE_TOLERANCE;
use crate::models::{truncate_chars, ErrorType, TestCase, TestCaseResult};
use crate::sandbox::{ExecutionResult, ExecutionStatus, SandboxStatusKind};

/// Scores executions against expected outputs
#[derive(Debug, Clone, Copy)]
pub struct ResultComparator {
    max_diagnostic_length: usize,
}

impl ResultComparator {
    pub fn new(max_diagnostic_length: usize) -> Self {
        Self {
            max_diagnostic_length,
        }
    }

    /// Score one execution.
    ///
    /// `return_type` drives tolerant comparison; without it outputs must
    /// match exactly after trimming.
    pub fn compare(
        &self,
        execution: &ExecutionResult,
        test_case: &TestCase,
        return_type: Option<&GenericType>,
    ) -> TestCaseResult {
        let stdout = execution.stdout.trim();

        if let ExecutionStatus::SystemError(message) = &execution.status {
            return self.failure(test_case, ErrorType::SystemError, message);
        }
        if !execution.compile_output.trim().is_empty() {
            return self.failure(test_case, ErrorType::CompilationError, &execution.compile_output);
        }
        if !execution.stderr.trim().is_empty() {
            return self.failure(test_case, ErrorType::RuntimeError, &execution.stderr);
        }
        if !execution.status.is_success() {
            let error_type = match execution.status.kind() {
                Some(SandboxStatusKind::CompilationError) => ErrorType::CompilationError,
                Some(SandboxStatusKind::RuntimeError) => ErrorType::RuntimeError,
                Some(SandboxStatusKind::TimeLimitExceeded) => ErrorType::TimeLimitExceeded,
                _ => ErrorType::Sandbox(execution.status.label().to_string()),
            };
            return self.status_failure(test_case, error_type, execution, stdout);
        }

        let expected = match return_type {
            Some(GenericType::Scalar(ScalarType::String)) => test_case.output.clone(),
            _ => test_case.expected(),
        };

        TestCaseResult {
            input: Value::Object(test_case.input.clone()),
            expected_output: test_case.output.clone(),
            user_output: truncate_chars(stdout, self.max_diagnostic_length),
            passed: outputs_match(stdout, &expected, return_type),
            error: false,
            error_type: None,
            explanation: test_case.explanation.clone(),
        }
    }

    fn failure(&self, test_case: &TestCase, error_type: ErrorType, detail: &str) -> TestCaseResult {
        let detail = detail.trim();
        let text = if detail.is_empty() {
            error_type.label().to_string()
        } else {
            format!("{}: {}", error_type.label(), detail)
        };
        self.error_result(test_case, error_type, text)
    }

    /// Status failures keep the sandbox's own label, then its message and
    /// whatever the program printed
    fn status_failure(
        &self,
        test_case: &TestCase,
        error_type: ErrorType,
        execution: &ExecutionResult,
        stdout: &str,
    ) -> TestCaseResult {
        let mut text = execution.status.label().to_string();
        for detail in [execution.message.trim(), stdout] {
            if !detail.is_empty() {
                text.push_str(": ");
                text.push_str(detail);
            }
        }
        self.error_result(test_case, error_type, text)
    }

    fn error_result(&self, test_case: &TestCase, error_type: ErrorType, text: String) -> TestCaseResult {
        TestCaseResult {
            input: Value::Object(test_case.input.clone()),
            expected_output: test_case.output.clone(),
            user_output: truncate_chars(&text, self.max_diagnostic_length),
            passed: false,
            error: true,
            error_type: Some(error_type),
            explanation: test_case.explanation.clone(),
        }
    }
}

/// Compare trimmed program output with an expected value
pub fn outputs_match(actual: &str, expected: &Value, return_type: Option<&GenericType>) -> bool {
    let actual = actual.trim();
    if actual == expected_text(expected).trim() {
        return true;
    }

    match return_type {
        Some(GenericType::Structure(kind)) => structures_match(actual, expected, *kind),
        Some(GenericType::Array(_) | GenericType::Matrix(_)) => sequences_match(actual, expected),
        Some(GenericType::Scalar(ScalarType::Int | ScalarType::Long)) => integers_match(actual, expected),
        Some(GenericType::Scalar(ScalarType::Double)) => parse_number(actual)
            .zip(value_number(expected))
            .is_some_and(|(a, b)| floats_close(a, b)),
        Some(GenericType::Scalar(ScalarType::Boolean)) => parse_bool(actual)
            .zip(value_bool(expected))
            .is_some_and(|(a, b)| a == b),
        Some(GenericType::Scalar(ScalarType::String)) | None => false,
    }
}

fn expected_text(expected: &Value) -> String {
    match expected {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse output as a delimited literal, accepting single-quoted strings
fn parse_literal(text: &str) -> Option<Value> {
    serde_json::from_str(text)
        .or_else(|_| serde_json::from_str(&text.replace('\'', "\"")))
        .ok()
}

fn sequences_match(actual: &str, expected: &Value) -> bool {
    parse_literal(actual).is_some_and(|parsed| values_equivalent(&parsed, expected))
}

fn values_equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equivalent(x, y))
        }
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x
                .as_f64()
                .zip(y.as_f64())
                .is_some_and(|(x, y)| floats_close(x, y)),
        },
        _ => a == b,
    }
}

fn structures_match(actual: &str, expected: &Value, kind: StructureKind) -> bool {
    let Some(parsed) = parse_literal(actual) else {
        return false;
    };
    match (
        LevelOrder::from_value(&parsed, kind),
        LevelOrder::from_value(expected, kind),
    ) {
        (Ok(a), Ok(b)) => a.canonical(kind) == b.canonical(kind),
        _ => false,
    }
}

fn integers_match(actual: &str, expected: &Value) -> bool {
    let expected = match expected {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    actual.parse::<i64>().ok().zip(expected).is_some_and(|(a, b)| a == b)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn floats_close(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= FLOAT_RELATIVE_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// `true`/`false` in any case, or `1`/`0`
fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn value_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => parse_bool(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn comparator() -> ResultComparator {
        ResultComparator::new(64)
    }

    fn case(output: Value) -> TestCase {
        let mut input = Map::new();
        input.insert("nums".to_string(), json!([2, 7, 11, 15]));
        input.insert("target".to_string(), json!(9));
        TestCase::new(input, output)
    }

    fn ty(name: &str) -> GenericType {
        GenericType::parse(name).unwrap()
    }

    fn status(id: u32, description: &str) -> ExecutionResult {
        ExecutionResult {
            status: ExecutionStatus::Sandbox {
                id,
                description: description.to_string(),
            },
            ..ExecutionResult::accepted("")
        }
    }

    #[test]
    fn test_two_sum_array_output() {
        let result = comparator().compare(
            &ExecutionResult::accepted("[0,1]\n"),
            &case(json!([0, 1])),
            Some(&ty("array<int>")),
        );
        assert!(result.passed);
        assert!(!result.error);
        assert_eq!(result.user_output, "[0,1]");
        assert_eq!(result.input["target"], json!(9));
    }

    #[test]
    fn test_array_output_with_spaces_and_quotes() {
        assert!(outputs_match("[0, 1]", &json!([0, 1]), Some(&ty("array<int>"))));
        assert!(outputs_match("['a', 'b']", &json!(["a", "b"]), Some(&ty("array<string>"))));
        assert!(outputs_match("[[1, 2], []]", &json!([[1, 2], []]), Some(&ty("matrix<int>"))));
        assert!(!outputs_match("[1, 0]", &json!([0, 1]), Some(&ty("array<int>"))));
        assert!(!outputs_match("[0, 1, 2]", &json!([0, 1]), Some(&ty("array<int>"))));
        assert!(!outputs_match("[0, 1]", &json!([0, 1]), None));
    }

    #[test]
    fn test_json_encoded_expected_output() {
        let result = comparator().compare(
            &ExecutionResult::accepted("[0,1]"),
            &case(json!("[0,1]")),
            Some(&ty("array<int>")),
        );
        assert!(result.passed);
        assert_eq!(result.expected_output, json!("[0,1]"));
    }

    #[test]
    fn test_boolean_spellings_need_type_metadata() {
        let expected = json!(true);
        assert!(outputs_match("True", &expected, Some(&ty("boolean"))));
        assert!(outputs_match("1", &expected, Some(&ty("boolean"))));
        assert!(!outputs_match("True", &expected, None));
        assert!(!outputs_match("yes", &expected, Some(&ty("boolean"))));
        assert!(outputs_match("false", &json!("0"), Some(&ty("boolean"))));
    }

    #[test]
    fn test_numeric_comparison() {
        assert!(outputs_match("0.30000000000000004", &json!(0.3), Some(&ty("double"))));
        assert!(outputs_match("2.0", &json!(2), Some(&ty("double"))));
        assert!(!outputs_match("2.1", &json!(2), Some(&ty("double"))));
        assert!(outputs_match("007", &json!(7), Some(&ty("int"))));
        assert!(!outputs_match("1000000000001", &json!(1000000000000i64), Some(&ty("long"))));
        assert!(!outputs_match("7.0", &json!(7), None));
    }

    #[test]
    fn test_string_outputs_are_exact() {
        let result = comparator().compare(
            &ExecutionResult::accepted("[1, 2]\n"),
            &case(json!("[1, 2]")),
            Some(&ty("string")),
        );
        assert!(result.passed);
        assert!(!outputs_match("Hello", &json!("hello"), Some(&ty("string"))));
    }

    #[test]
    fn test_structure_outputs_are_canonicalized() {
        let tree = ty("TreeNode");
        assert!(outputs_match("[1,null,2]", &json!([1, null, 2, null, null]), Some(&tree)));
        assert!(outputs_match("[]", &json!(null), Some(&tree)));
        assert!(!outputs_match("[1,2]", &json!([1, null, 2]), Some(&tree)));
        assert!(outputs_match("[1,2,3]", &json!([1, 2, 3]), Some(&ty("ListNode"))));
    }

    #[test]
    fn test_compile_output_wins() {
        let execution = ExecutionResult {
            compile_output: "main.cpp:3: error: expected ';'".to_string(),
            stderr: "ignored".to_string(),
            ..status(6, "Compilation Error")
        };
        let result = comparator().compare(&execution, &case(json!([0, 1])), Some(&ty("array<int>")));
        assert!(result.error);
        assert!(!result.passed);
        assert_eq!(result.error_type, Some(ErrorType::CompilationError));
        assert_eq!(result.user_output, "Compilation Error: main.cpp:3: error: expected ';'");
    }

    #[test]
    fn test_stderr_is_runtime_error() {
        let execution = ExecutionResult {
            stderr: "Traceback: IndexError".to_string(),
            ..ExecutionResult::accepted("[0,1]")
        };
        let result = comparator().compare(&execution, &case(json!([0, 1])), None);
        assert_eq!(result.error_type, Some(ErrorType::RuntimeError));
        assert!(!result.passed);
    }

    #[test]
    fn test_status_failures_keep_label() {
        let result = comparator().compare(&status(5, "Time Limit Exceeded"), &case(json!(1)), None);
        assert_eq!(result.error_type, Some(ErrorType::TimeLimitExceeded));
        assert_eq!(result.user_output, "Time Limit Exceeded");

        let result = comparator().compare(
            &ExecutionResult {
                stdout: "partial".to_string(),
                ..status(11, "Runtime Error (NZEC)")
            },
            &case(json!(1)),
            None,
        );
        assert_eq!(result.error_type, Some(ErrorType::RuntimeError));
        assert_eq!(result.user_output, "Runtime Error (NZEC): partial");

        let result = comparator().compare(&status(13, "Internal Error"), &case(json!(1)), None);
        assert_eq!(result.error_type, Some(ErrorType::Sandbox("Internal Error".to_string())));
    }

    #[test]
    fn test_status_failure_includes_sandbox_message() {
        let execution = ExecutionResult {
            stdout: "partial\n".to_string(),
            message: "Exited with error status 1\n".to_string(),
            ..status(11, "Runtime Error (NZEC)")
        };
        let result = comparator().compare(&execution, &case(json!(1)), None);
        assert_eq!(result.error_type, Some(ErrorType::RuntimeError));
        assert_eq!(
            result.user_output,
            "Runtime Error (NZEC): Exited with error status 1: partial"
        );

        let execution = ExecutionResult {
            message: "No such file or directory".to_string(),
            ..status(13, "Internal Error")
        };
        let result = comparator().compare(&execution, &case(json!(1)), None);
        assert_eq!(result.user_output, "Internal Error: No such file or directory");
    }

    #[test]
    fn test_system_error_is_distinct_from_time_limit() {
        let result = comparator().compare(
            &ExecutionResult::system_error("sandbox request timed out"),
            &case(json!([0, 1])),
            Some(&ty("array<int>")),
        );
        assert_eq!(result.error_type, Some(ErrorType::SystemError));
        assert_eq!(result.user_output, "SystemError: sandbox request timed out");
        assert!(result.error);
    }

    #[test]
    fn test_diagnostics_are_truncated() {
        let execution = ExecutionResult {
            compile_output: "e".repeat(500),
            ..status(6, "Compilation Error")
        };
        let result = comparator().compare(&execution, &case(json!(1)), None);
        assert_eq!(result.user_output.chars().count(), 64 + 3);
        assert!(result.user_output.ends_with("..."));
    }

    #[test]
    fn test_harness_error_line_is_wrong_answer() {
        let result = comparator().compare(
            &ExecutionResult::accepted("Error: list index out of range"),
            &case(json!([0, 1])),
            Some(&ty("array<int>")),
        );
        assert!(!result.passed);
        assert!(!result.error);
    }
}
