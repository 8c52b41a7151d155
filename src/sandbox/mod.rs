//! Remote code execution sandbox
//!
//! The judge never runs user code itself. Harness programs are sent to a
//! remote sandbox service that compiles and runs them with resource limits.

pub mod judge0;
pub mod protocol;

use async_trait::async_trait;

use crate::constants::sandbox_status;
use crate::models::Language;

pub use judge0::{Judge0Client, SandboxError};

/// Classification of a sandbox status id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxStatusKind {
    InQueue,
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    RuntimeError,
    InternalError,
    ExecFormatError,
    Unknown,
}

impl SandboxStatusKind {
    pub fn from_id(id: u32) -> Self {
        match id {
            sandbox_status::IN_QUEUE => Self::InQueue,
            sandbox_status::PROCESSING => Self::Processing,
            sandbox_status::ACCEPTED => Self::Accepted,
            sandbox_status::WRONG_ANSWER => Self::WrongAnswer,
            sandbox_status::TIME_LIMIT_EXCEEDED => Self::TimeLimitExceeded,
            sandbox_status::COMPILATION_ERROR => Self::CompilationError,
            sandbox_status::RUNTIME_ERROR_SIGSEGV..=sandbox_status::RUNTIME_ERROR_OTHER => {
                Self::RuntimeError
            }
            sandbox_status::INTERNAL_ERROR => Self::InternalError,
            sandbox_status::EXEC_FORMAT_ERROR => Self::ExecFormatError,
            _ => Self::Unknown,
        }
    }
}

/// Outcome status of one execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Status reported by the sandbox, description kept verbatim
    Sandbox { id: u32, description: String },
    /// The sandbox could not be reached or its answer could not be used
    SystemError(String),
}

impl ExecutionStatus {
    pub fn accepted() -> Self {
        Self::Sandbox {
            id: sandbox_status::ACCEPTED,
            description: "Accepted".to_string(),
        }
    }

    /// Only the sandbox's "Accepted" status is a success
    pub fn is_success(&self) -> bool {
        self.kind() == Some(SandboxStatusKind::Accepted)
    }

    pub fn kind(&self) -> Option<SandboxStatusKind> {
        match self {
            Self::Sandbox { id, .. } => Some(SandboxStatusKind::from_id(*id)),
            Self::SystemError(_) => None,
        }
    }

    /// Human readable label
    pub fn label(&self) -> &str {
        match self {
            Self::Sandbox { description, .. } => description,
            Self::SystemError(message) => message,
        }
    }
}

/// Result of running one program in the sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub compile_output: String,
    /// Extra sandbox diagnostic, such as an exit status or internal error text
    pub message: String,
    pub status: ExecutionStatus,
    /// Wall time in seconds as reported by the sandbox
    pub time: Option<String>,
    /// Peak memory in kilobytes
    pub memory: Option<u64>,
}

impl ExecutionResult {
    /// A successful run that printed `stdout`
    pub fn accepted(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            compile_output: String::new(),
            message: String::new(),
            status: ExecutionStatus::accepted(),
            time: None,
            memory: None,
        }
    }

    /// Transport-level failure
    pub fn system_error(message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            compile_output: String::new(),
            message: String::new(),
            status: ExecutionStatus::SystemError(message.into()),
            time: None,
            memory: None,
        }
    }

    pub fn is_system_error(&self) -> bool {
        matches!(self.status, ExecutionStatus::SystemError(_))
    }
}

/// Runs programs in an isolated environment.
///
/// Implementations never fail: transport problems are reported as an
/// [`ExecutionStatus::SystemError`] result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn execute(&self, source: &str, language: Language, stdin: &str) -> ExecutionResult;
}
