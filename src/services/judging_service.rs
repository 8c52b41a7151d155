//! Judging service
//!
//! Entry point of the judge: loads the problem, generates one harness per
//! test case, runs them in the sandbox with bounded parallelism, scores the
//! outputs and records the submission.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::codegen::{GenericType, HarnessArtifact, HarnessGenerator};
use crate::config::JudgeConfig;
use crate::db::{ProblemStore, SubmissionStore};
use crate::error::{JudgeError, JudgeResult};
use crate::judge::{ResultComparator, VerdictSummary};
use crate::models::{
    CustomInput, Language, ProblemDefinition, RunRequest, Submission, SubmitRequest, TestCase,
    TestCaseResult, Verdict,
};
use crate::sandbox::{CodeExecutor, ExecutionResult};
use crate::utils::hash_string;

/// Result of judging one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    /// Id assigned by the submission store; absent when recording failed
    pub submission_id: Option<Uuid>,
    #[serde(flatten)]
    pub summary: VerdictSummary,
    pub test_case_results: Vec<TestCaseResult>,
}

impl SubmissionOutcome {
    pub fn verdict(&self) -> Verdict {
        self.summary.verdict
    }
}

/// Orchestrates harness generation, execution, scoring and recording
pub struct JudgingService {
    generator: HarnessGenerator,
    executor: Arc<dyn CodeExecutor>,
    problems: Arc<dyn ProblemStore>,
    submissions: Arc<dyn SubmissionStore>,
    /// Outbound sandbox budget shared by every submission judged here
    sandbox_slots: Arc<Semaphore>,
    concurrency: usize,
    comparator: ResultComparator,
}

impl JudgingService {
    pub fn new(
        generator: HarnessGenerator,
        executor: Arc<dyn CodeExecutor>,
        problems: Arc<dyn ProblemStore>,
        submissions: Arc<dyn SubmissionStore>,
        config: &JudgeConfig,
    ) -> Self {
        let concurrency = config.max_concurrent_sandbox_calls.max(1);
        Self {
            generator,
            executor,
            problems,
            submissions,
            sandbox_slots: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            comparator: ResultComparator::new(config.max_diagnostic_length),
        }
    }

    /// Judge a submission against every test case and record it
    pub async fn submit(&self, request: &SubmitRequest) -> JudgeResult<SubmissionOutcome> {
        self.submit_with_cancel(request, &CancellationToken::new()).await
    }

    /// Like [`submit`](Self::submit), abandoning the run when `cancel` fires.
    ///
    /// A cancelled run records nothing and returns [`JudgeError::Cancelled`].
    pub async fn submit_with_cancel(
        &self,
        request: &SubmitRequest,
        cancel: &CancellationToken,
    ) -> JudgeResult<SubmissionOutcome> {
        let language = request.checked_language()?;
        let problem = self.problems.get_problem(&request.problem_id).await?;
        if problem.test_cases.is_empty() {
            return Err(JudgeError::Configuration(format!(
                "Problem '{}' has no test cases",
                problem.id
            )));
        }

        // Every harness is generated before the first sandbox call so that a
        // bad problem template fails without partial results.
        let artifacts = self.generator.generate_all(&request.code, language, &problem)?;
        let return_type = GenericType::parse(&problem.return_type).ok();

        info!(
            problem_id = %problem.id,
            user_id = %request.user_id,
            language = %language,
            test_cases = artifacts.len(),
            "Judging submission"
        );

        let executions = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(problem_id = %problem.id, user_id = %request.user_id, "Judging cancelled");
                return Err(JudgeError::Cancelled);
            }
            executions = self.execute_all(&artifacts) => executions,
        };

        let test_case_results: Vec<TestCaseResult> = executions
            .iter()
            .zip(&problem.test_cases)
            .enumerate()
            .map(|(index, (execution, test_case))| {
                let result = self.comparator.compare(execution, test_case, return_type.as_ref());
                debug!(
                    index,
                    passed = result.passed,
                    error_type = ?result.error_type,
                    time = ?execution.time,
                    "Test case scored"
                );
                result
            })
            .collect();

        let summary = VerdictSummary::from_results(&test_case_results);
        let submission = build_submission(request, language, &problem, summary, &test_case_results);

        let submission_id = match self.submissions.record_submission(&submission).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!(submission_id = %submission.id, error = %e, "Failed to record submission");
                None
            }
        };

        info!(
            problem_id = %problem.id,
            user_id = %request.user_id,
            verdict = %summary.verdict,
            passed = summary.passed,
            total = summary.total,
            "Submission judged"
        );

        Ok(SubmissionOutcome {
            submission_id,
            summary,
            test_case_results,
        })
    }

    /// Run code once without scoring or recording.
    ///
    /// With no custom input the problem's first test case is used. Custom
    /// arguments are wrapped in a harness; raw stdin runs the code as is.
    pub async fn run_single(&self, request: &RunRequest) -> JudgeResult<ExecutionResult> {
        let language = request.checked_language()?;
        let problem = self.problems.get_problem(&request.problem_id).await?;

        let (source, stdin) = match &request.custom_input {
            CustomInput::Stdin(stdin) => (request.code.clone(), stdin.as_str()),
            CustomInput::Arguments(arguments) => {
                let test_case = TestCase::new(arguments.clone(), Value::Null);
                let artifact = self.generator.generate(&request.code, language, &problem, &test_case)?;
                (artifact.source, "")
            }
            CustomInput::None => {
                let test_case = problem.test_cases.first().ok_or_else(|| {
                    JudgeError::Configuration(format!("Problem '{}' has no test cases", problem.id))
                })?;
                let artifact = self.generator.generate(&request.code, language, &problem, test_case)?;
                (artifact.source, "")
            }
        };

        info!(problem_id = %problem.id, language = %language, "Running code");
        Ok(self.execute(&source, language, stdin).await)
    }

    /// Run every harness, results in input order
    async fn execute_all(&self, artifacts: &[HarnessArtifact]) -> Vec<ExecutionResult> {
        stream::iter(artifacts)
            .map(|artifact| self.execute(&artifact.source, artifact.language, ""))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn execute(&self, source: &str, language: Language, stdin: &str) -> ExecutionResult {
        let Ok(_permit) = self.sandbox_slots.acquire().await else {
            warn!("Sandbox slots closed");
            return ExecutionResult::system_error("sandbox unavailable");
        };
        self.executor.execute(source, language, stdin).await
    }
}

fn build_submission(
    request: &SubmitRequest,
    language: Language,
    problem: &ProblemDefinition,
    summary: VerdictSummary,
    results: &[TestCaseResult],
) -> Submission {
    Submission {
        id: Uuid::new_v4(),
        problem_id: problem.id.clone(),
        problem_title: problem.title.clone(),
        problem_difficulty: problem.difficulty.as_str().to_string(),
        user_id: request.user_id.trim().to_string(),
        code: request.code.clone(),
        code_hash: hash_string(&request.code),
        language,
        verdict: summary.verdict,
        test_case_results: results.to_vec(),
        passed_tests: summary.passed,
        total_tests: summary.total,
        timestamp: Utc::now(),
    }
}
