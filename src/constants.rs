//! Application-wide constants
//!
//! This module contains all constant values used throughout the judge.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SANDBOX DEFAULTS
// =============================================================================

/// Default base URL of the remote execution sandbox
pub const DEFAULT_SANDBOX_URL: &str = "https://judge0-ce.p.rapidapi.com";

/// Default timeout for a single synchronous sandbox round trip in seconds
pub const DEFAULT_SANDBOX_TIMEOUT_SECS: u64 = 10;

/// Default number of retries for transient transport failures
pub const DEFAULT_SANDBOX_MAX_RETRIES: u32 = 2;

/// Default base delay for exponential retry backoff in milliseconds
pub const DEFAULT_SANDBOX_RETRY_BASE_MS: u64 = 250;

/// Upper bound on a single backoff delay in milliseconds
pub const MAX_SANDBOX_RETRY_DELAY_MS: u64 = 5_000;

// =============================================================================
// JUDGING DEFAULTS
// =============================================================================

/// Default cap on concurrent outbound sandbox requests
pub const DEFAULT_MAX_CONCURRENT_SANDBOX_CALLS: usize = 4;

/// Default maximum length of diagnostic text kept per test case
pub const DEFAULT_MAX_DIAGNOSTIC_LENGTH: usize = 4096;

/// Relative tolerance used when comparing floating point outputs
pub const FLOAT_RELATIVE_TOLERANCE: f64 = 1e-9;

// =============================================================================
// STORAGE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default directory holding JSON problem documents
pub const DEFAULT_PROBLEMS_PATH: &str = "./problems";

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const CPP: &str = "cpp";
    pub const PYTHON: &str = "python";
    pub const JAVASCRIPT: &str = "javascript";
    pub const JAVA: &str = "java";

    /// All supported language identifiers
    pub const ALL: &[&str] = &[CPP, PYTHON, JAVASCRIPT, JAVA];
}

/// Default sandbox language ids (Judge0 CE numbering)
pub mod sandbox_language_ids {
    pub const CPP: u32 = 54;
    pub const PYTHON: u32 = 71;
    pub const JAVASCRIPT: u32 = 63;
    pub const JAVA: u32 = 62;
}

// =============================================================================
// SANDBOX STATUSES
// =============================================================================

/// Sandbox status ids (Judge0 numbering)
pub mod sandbox_status {
    pub const IN_QUEUE: u32 = 1;
    pub const PROCESSING: u32 = 2;
    pub const ACCEPTED: u32 = 3;
    pub const WRONG_ANSWER: u32 = 4;
    pub const TIME_LIMIT_EXCEEDED: u32 = 5;
    pub const COMPILATION_ERROR: u32 = 6;
    pub const RUNTIME_ERROR_SIGSEGV: u32 = 7;
    pub const RUNTIME_ERROR_OTHER: u32 = 12;
    pub const INTERNAL_ERROR: u32 = 13;
    pub const EXEC_FORMAT_ERROR: u32 = 14;
}

// =============================================================================
// TEST CASE ERROR LABELS
// =============================================================================

/// Error type labels attached to failed test cases
pub mod error_labels {
    pub const COMPILATION_ERROR: &str = "Compilation Error";
    pub const RUNTIME_ERROR: &str = "Runtime Error";
    pub const TIME_LIMIT_EXCEEDED: &str = "Time Limit Exceeded";
    pub const SYSTEM_ERROR: &str = "SystemError";
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum source code size in bytes (1 MB)
pub const MAX_SOURCE_CODE_SIZE: usize = 1024 * 1024;

/// Maximum length of a user identifier
pub const MAX_USER_ID_LENGTH: usize = 128;
