//! Problem and submission storage
//!
//! The judge reads problems and appends submissions through the
//! [`ProblemStore`] and [`SubmissionStore`] traits. Backends: in-memory
//! (optionally seeded from a directory of problem documents) and PostgreSQL.

pub mod catalog;
pub mod connection;
pub mod memory;
pub mod postgres;
pub mod repositories;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::JudgeResult;
use crate::models::{ProblemDefinition, Submission};

pub use catalog::load_problem_directory;
pub use connection::*;
pub use memory::{MemoryProblemStore, MemorySubmissionStore};
pub use postgres::PostgresStore;

/// Read access to problem definitions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProblemStore: Send + Sync {
    /// Fetch a problem; an unknown id is [`JudgeError::NotFound`](crate::error::JudgeError::NotFound)
    async fn get_problem(&self, problem_id: &str) -> JudgeResult<ProblemDefinition>;
}

/// Append-only submission log
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Record a submission and return its id
    async fn record_submission(&self, submission: &Submission) -> JudgeResult<Uuid>;
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
