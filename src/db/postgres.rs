//! PostgreSQL-backed stores

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repositories::{ProblemRepository, SubmissionRepository};
use super::{ProblemStore, SubmissionStore};
use crate::error::{JudgeError, JudgeResult};
use crate::models::{ProblemDefinition, Submission};

/// Problem and submission store over a connection pool
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProblemStore for PostgresStore {
    async fn get_problem(&self, problem_id: &str) -> JudgeResult<ProblemDefinition> {
        ProblemRepository::find_by_id(&self.pool, problem_id)
            .await?
            .ok_or_else(|| JudgeError::NotFound(format!("Problem '{}'", problem_id)))
    }
}

#[async_trait]
impl SubmissionStore for PostgresStore {
    async fn record_submission(&self, submission: &Submission) -> JudgeResult<Uuid> {
        SubmissionRepository::create(&self.pool, submission).await
    }
}
