//! Harness code generation
//!
//! Turns a problem signature, one test case and the user's source into a
//! complete program for a target language:
//!
//! - **types**: generic type vocabulary and the (type, language) registry
//!   that yields native type names and source literals
//! - **structures**: level-order trees and linked lists
//! - **template**: ordered fragment assembly shared by every backend
//! - **languages**: one backend per target language
//! - **harness**: the generator tying the pieces together

pub mod harness;
pub mod languages;
pub mod structures;
pub mod template;
pub mod types;

pub use harness::{HarnessArtifact, HarnessGenerator, HarnessPlan};
pub use structures::{LevelOrder, StructureBuilder};
pub use template::ProgramFragments;
pub use types::{GenericType, ScalarType, StructureKind, TypeRegistry};

/// Code generation failures.
///
/// All of these are deterministic configuration or data errors: they are
/// raised before any sandbox call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error("no mapping registered for type '{type_name}' in {language}")]
    MissingTypeMapping { type_name: String, language: String },

    #[error("value {value} is not a valid {type_name}: {reason}")]
    ValueMismatch {
        type_name: String,
        value: String,
        reason: String,
    },

    #[error("test case has no value for parameter '{0}'")]
    MissingArgument(String),

    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

impl CodegenError {
    pub(crate) fn mismatch(
        type_name: impl ToString,
        value: &serde_json::Value,
        reason: impl Into<String>,
    ) -> Self {
        let mut rendered = value.to_string();
        if rendered.len() > 64 {
            rendered = crate::models::truncate_chars(&rendered, 64);
        }
        Self::ValueMismatch {
            type_name: type_name.to_string(),
            value: rendered,
            reason: reason.into(),
        }
    }
}
