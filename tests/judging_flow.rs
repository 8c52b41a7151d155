//! End-to-end judging flow against in-memory stores and fake sandboxes

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::routing::post;
use axum::{Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use polyjudge::codegen::{HarnessGenerator, TypeRegistry};
use polyjudge::config::{JudgeConfig, SandboxConfig};
use polyjudge::db::{MemoryProblemStore, MemorySubmissionStore};
use polyjudge::models::{
    ErrorType, Language, Parameter, ProblemDefinition, SubmitRequest, TestCase, Verdict,
};
use polyjudge::sandbox::{CodeExecutor, ExecutionResult, ExecutionStatus, Judge0Client};
use polyjudge::{JudgeError, JudgingService};

const PYTHON_TWO_SUM: &str = r#"class Solution:
    def twoSum(self, nums, target):
        seen = {}
        for i, n in enumerate(nums):
            if target - n in seen:
                return [seen[target - n], i]
            seen[n] = i
"#;

const PYTHON_PALINDROME: &str = r#"class Solution:
    def isPalindrome(self, s):
        return s == s[::-1]
"#;

fn case(pairs: &[(&str, Value)], output: Value) -> TestCase {
    let input: Map<String, Value> = pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    TestCase::new(input, output)
}

fn two_sum() -> ProblemDefinition {
    let mut problem = ProblemDefinition::new("two-sum", "Two Sum", "twoSum", "array<int>");
    problem.parameters = vec![
        Parameter::new("nums", "array<int>"),
        Parameter::new("target", "int"),
    ];
    problem.test_cases = vec![
        case(&[("nums", json!([2, 7, 11, 15])), ("target", json!(9))], json!([0, 1])),
        case(&[("nums", json!([3, 2, 4])), ("target", json!(6))], json!([1, 2])),
        case(&[("nums", json!([3, 3])), ("target", json!(6))], json!([0, 1])),
    ];
    problem
}

fn palindrome() -> ProblemDefinition {
    let mut problem = ProblemDefinition::new("palindrome", "Palindrome", "isPalindrome", "boolean");
    problem.parameters = vec![Parameter::new("s", "string")];
    problem.test_cases = vec![case(&[("s", json!("racecar"))], json!(true))];
    problem
}

struct Harness {
    service: JudgingService,
    submissions: Arc<MemorySubmissionStore>,
}

fn harness(executor: Arc<dyn CodeExecutor>, max_concurrent_sandbox_calls: usize) -> Harness {
    let problems = Arc::new(MemoryProblemStore::from_problems([two_sum(), palindrome()]));
    let submissions = Arc::new(MemorySubmissionStore::new());
    let config = JudgeConfig {
        max_concurrent_sandbox_calls,
        ..JudgeConfig::default()
    };
    let service = JudgingService::new(
        HarnessGenerator::new(Arc::new(TypeRegistry::builtin())),
        executor,
        problems,
        submissions.clone(),
        &config,
    );
    Harness {
        service,
        submissions,
    }
}

/// Answers each harness by looking up the expected stdout for a marker in its source
struct ScriptedExecutor {
    answers: Vec<(&'static str, ExecutionResult)>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedExecutor {
    fn new(answers: Vec<(&'static str, ExecutionResult)>) -> Self {
        Self {
            answers,
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl CodeExecutor for ScriptedExecutor {
    async fn execute(&self, source: &str, _language: Language, _stdin: &str) -> ExecutionResult {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.answers
            .iter()
            .find(|(marker, _)| source.contains(marker))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| ExecutionResult::accepted(""))
    }
}

#[tokio::test]
async fn two_sum_is_accepted_and_recorded() {
    let executor = Arc::new(ScriptedExecutor::new(vec![
        ("nums = [2, 7, 11, 15]", ExecutionResult::accepted("[0,1]\n")),
        ("nums = [3, 2, 4]", ExecutionResult::accepted("[1,2]\n")),
        ("nums = [3, 3]", ExecutionResult::accepted("[0, 1]\n")),
    ]));
    let h = harness(executor, 4);

    let outcome = h
        .service
        .submit(&SubmitRequest::new("two-sum", "alice", PYTHON_TWO_SUM, "python"))
        .await
        .unwrap();

    assert_eq!(outcome.verdict(), Verdict::Accepted);
    assert_eq!(outcome.summary.passed, 3);

    let recorded = h.submissions.submissions().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(Some(recorded[0].id), outcome.submission_id);
    assert_eq!(recorded[0].user_id, "alice");
    assert_eq!(recorded[0].language, Language::Python);
    assert_eq!(recorded[0].test_case_results, outcome.test_case_results);
}

#[tokio::test]
async fn python_boolean_spelling_is_accepted() {
    let executor = Arc::new(ScriptedExecutor::new(vec![(
        "s = \"racecar\"",
        ExecutionResult::accepted("True\n"),
    )]));
    let h = harness(executor, 4);

    let outcome = h
        .service
        .submit(&SubmitRequest::new("palindrome", "bob", PYTHON_PALINDROME, "python"))
        .await
        .unwrap();

    assert_eq!(outcome.verdict(), Verdict::Accepted);
    assert_eq!(outcome.test_case_results[0].user_output, "True");
}

#[tokio::test]
async fn compilation_error_dominates_wrong_answers() {
    let compile_error = ExecutionResult {
        compile_output: "error: expected ';'".to_string(),
        status: ExecutionStatus::Sandbox {
            id: 6,
            description: "Compilation Error".to_string(),
        },
        ..ExecutionResult::accepted("")
    };
    let executor = Arc::new(ScriptedExecutor::new(vec![
        ("nums = [2, 7, 11, 15]", ExecutionResult::accepted("[1,0]")),
        ("nums = [3, 2, 4]", ExecutionResult::accepted("[1,2]")),
        ("nums = [3, 3]", compile_error),
    ]));
    let h = harness(executor, 4);

    let outcome = h
        .service
        .submit(&SubmitRequest::new("two-sum", "carol", PYTHON_TWO_SUM, "python"))
        .await
        .unwrap();

    assert_eq!(outcome.verdict(), Verdict::CompilationError);
    assert_eq!(outcome.summary.first_failure, Some(0));
    assert_eq!(
        outcome.test_case_results[2].error_type,
        Some(ErrorType::CompilationError)
    );
    assert!(outcome.test_case_results[1].passed);
}

#[tokio::test]
async fn results_keep_test_case_order_under_a_concurrency_cap() {
    let executor = Arc::new(
        ScriptedExecutor::new(vec![
            ("nums = [2, 7, 11, 15]", ExecutionResult::accepted("first")),
            ("nums = [3, 2, 4]", ExecutionResult::accepted("second")),
            ("nums = [3, 3]", ExecutionResult::accepted("third")),
        ])
        .with_delay(Duration::from_millis(20)),
    );
    let h = harness(executor.clone(), 2);

    let outcome = h
        .service
        .submit(&SubmitRequest::new("two-sum", "dave", PYTHON_TWO_SUM, "python"))
        .await
        .unwrap();

    let outputs: Vec<_> = outcome
        .test_case_results
        .iter()
        .map(|r| r.user_output.as_str())
        .collect();
    assert_eq!(outputs, vec!["first", "second", "third"]);
    assert!(executor.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(outcome.verdict(), Verdict::WrongAnswer);
}

#[tokio::test]
async fn cancellation_discards_the_run() {
    let executor = Arc::new(
        ScriptedExecutor::new(vec![]).with_delay(Duration::from_secs(30)),
    );
    let h = harness(executor, 4);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let request = SubmitRequest::new("two-sum", "erin", PYTHON_TWO_SUM, "python");
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        h.service.submit_with_cancel(&request, &cancel),
    )
    .await
    .expect("cancellation should end the run promptly");

    assert!(matches!(result, Err(JudgeError::Cancelled)));
    assert!(h.submissions.submissions().await.is_empty());
}

/// Fake sandbox speaking the submission protocol
async fn start_sandbox(hang: bool) -> SocketAddr {
    async fn answer(Json(body): Json<Value>) -> Json<Value> {
        let source = body["source_code"]
            .as_str()
            .and_then(|encoded| STANDARD.decode(encoded).ok())
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();
        let stdout = if source.contains("target = 9") {
            "[0,1]\n"
        } else if source.contains("nums = [3, 2, 4]") {
            "[1,2]\n"
        } else {
            "[0,1]\n"
        };
        Json(json!({
            "stdout": STANDARD.encode(stdout),
            "stderr": null,
            "compile_output": null,
            "status": {"id": 3, "description": "Accepted"},
            "time": "0.010",
            "memory": 3100
        }))
    }

    async fn stall() -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(json!({}))
    }

    let app = if hang {
        Router::new().route("/submissions", post(stall))
    } else {
        Router::new().route("/submissions", post(answer))
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

fn sandbox_config(addr: SocketAddr) -> SandboxConfig {
    SandboxConfig {
        base_url: format!("http://{}", addr),
        timeout: Duration::from_millis(300),
        max_retries: 0,
        retry_base_delay: Duration::from_millis(1),
        ..SandboxConfig::default()
    }
}

#[tokio::test]
async fn judges_through_the_http_sandbox() {
    let addr = start_sandbox(false).await;
    let client = Judge0Client::new(&sandbox_config(addr)).unwrap();
    let h = harness(Arc::new(client), 2);

    let outcome = h
        .service
        .submit(&SubmitRequest::new("two-sum", "frank", PYTHON_TWO_SUM, "python"))
        .await
        .unwrap();

    assert_eq!(outcome.verdict(), Verdict::Accepted);
}

#[tokio::test]
async fn sandbox_timeout_is_a_system_error() {
    let addr = start_sandbox(true).await;
    let client = Judge0Client::new(&sandbox_config(addr)).unwrap();
    let h = harness(Arc::new(client), 4);

    let outcome = h
        .service
        .submit(&SubmitRequest::new("two-sum", "grace", PYTHON_TWO_SUM, "python"))
        .await
        .unwrap();

    assert_eq!(outcome.verdict(), Verdict::Error);
    for result in &outcome.test_case_results {
        assert!(result.error);
        assert_eq!(result.error_type, Some(ErrorType::SystemError));
        assert!(result.user_output.starts_with("SystemError"));
    }
    assert_eq!(h.submissions.submissions().await.len(), 1);
}
