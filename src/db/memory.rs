//! In-memory stores

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ProblemStore, SubmissionStore};
use crate::error::{JudgeError, JudgeResult};
use crate::models::{ProblemDefinition, ProblemId, Submission};

/// Problems held in memory, keyed by id
#[derive(Debug, Default)]
pub struct MemoryProblemStore {
    problems: RwLock<HashMap<ProblemId, ProblemDefinition>>,
}

impl MemoryProblemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_problems(problems: impl IntoIterator<Item = ProblemDefinition>) -> Self {
        Self {
            problems: RwLock::new(problems.into_iter().map(|p| (p.id.clone(), p)).collect()),
        }
    }

    /// Insert or replace a problem
    pub async fn insert(&self, problem: ProblemDefinition) {
        self.problems.write().await.insert(problem.id.clone(), problem);
    }

    /// All problems, sorted by id
    pub async fn list(&self) -> Vec<ProblemDefinition> {
        let mut problems: Vec<_> = self.problems.read().await.values().cloned().collect();
        problems.sort_by(|a, b| a.id.cmp(&b.id));
        problems
    }

    pub async fn contains(&self, problem_id: &str) -> bool {
        self.problems.read().await.contains_key(problem_id)
    }

    pub async fn len(&self) -> usize {
        self.problems.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.problems.read().await.is_empty()
    }
}

#[async_trait]
impl ProblemStore for MemoryProblemStore {
    async fn get_problem(&self, problem_id: &str) -> JudgeResult<ProblemDefinition> {
        self.problems
            .read()
            .await
            .get(problem_id)
            .cloned()
            .ok_or_else(|| JudgeError::NotFound(format!("Problem '{}'", problem_id)))
    }
}

/// Submissions appended to an in-memory log
#[derive(Debug, Default)]
pub struct MemorySubmissionStore {
    submissions: RwLock<Vec<Submission>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded submission, oldest first
    pub async fn submissions(&self) -> Vec<Submission> {
        self.submissions.read().await.clone()
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn record_submission(&self, submission: &Submission) -> JudgeResult<Uuid> {
        self.submissions.write().await.push(submission.clone());
        Ok(submission.id)
    }
}
