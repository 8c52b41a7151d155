//! PolyJudge - Function-level code judge
//!
//! This library judges a user's implementation of a single function against
//! a problem's test cases, in any of several target languages.
//!
//! # Features
//!
//! - Multi-language harness generation (C++, Python, JavaScript, Java)
//! - Generic type model with per-language literals for scalars, arrays,
//!   matrices, binary trees and linked lists
//! - Remote sandbox execution with bounded parallelism and retries
//! - Type-aware output comparison and verdict aggregation
//!
//! # Architecture
//!
//! The judge follows a layered architecture:
//! - **Codegen**: type registry, structure builders and harness assembly
//! - **Sandbox**: remote execution client
//! - **Judge**: result comparison and verdicts
//! - **Services**: judging orchestration
//! - **Db**: problem and submission stores

pub mod codegen;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod judge;
pub mod models;
pub mod sandbox;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{JudgeError, JudgeResult};
pub use services::{JudgingService, SubmissionOutcome};
