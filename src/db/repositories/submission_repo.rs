//! Submission repository

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{JudgeError, JudgeResult};
use crate::models::{Submission, TestCaseResult, Verdict};

/// Row shape of the `submissions` table
#[derive(Debug, FromRow)]
struct SubmissionRow {
    id: Uuid,
    problem_id: String,
    problem_title: String,
    problem_difficulty: String,
    user_id: String,
    code: String,
    code_hash: String,
    language: String,
    verdict: String,
    test_case_results: Json<Vec<TestCaseResult>>,
    passed_tests: i64,
    total_tests: i64,
    submitted_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = JudgeError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let verdict = Verdict::from_label(&row.verdict)
            .ok_or_else(|| JudgeError::Serialization(format!("Unknown verdict '{}'", row.verdict)))?;
        let language = row
            .language
            .parse()
            .map_err(|_| JudgeError::Serialization(format!("Unknown language '{}'", row.language)))?;

        Ok(Self {
            id: row.id,
            problem_id: row.problem_id,
            problem_title: row.problem_title,
            problem_difficulty: row.problem_difficulty,
            user_id: row.user_id,
            code: row.code,
            code_hash: row.code_hash,
            language,
            verdict,
            test_case_results: row.test_case_results.0,
            passed_tests: row.passed_tests.max(0) as usize,
            total_tests: row.total_tests.max(0) as usize,
            timestamp: row.submitted_at,
        })
    }
}

/// Repository for submission database operations
pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Append a submission
    pub async fn create(pool: &PgPool, submission: &Submission) -> JudgeResult<Uuid> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO submissions (
                id, problem_id, problem_title, problem_difficulty, user_id, code,
                code_hash, language, verdict, test_case_results, passed_tests,
                total_tests, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(submission.id)
        .bind(&submission.problem_id)
        .bind(&submission.problem_title)
        .bind(&submission.problem_difficulty)
        .bind(&submission.user_id)
        .bind(&submission.code)
        .bind(&submission.code_hash)
        .bind(submission.language.as_str())
        .bind(submission.verdict.as_str())
        .bind(Json(&submission.test_case_results))
        .bind(submission.passed_tests as i64)
        .bind(submission.total_tests as i64)
        .bind(submission.timestamp)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    /// Find submission by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> JudgeResult<Option<Submission>> {
        let row = sqlx::query_as::<_, SubmissionRow>(r#"SELECT * FROM submissions WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        row.map(Submission::try_from).transpose()
    }
}
