//! Judging request DTOs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use super::{Language, ProblemId};
use crate::error::{JudgeError, JudgeResult};
use crate::utils;

/// Judge a submission against every test case of a problem
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[validate(length(min = 1))]
    pub problem_id: ProblemId,

    #[validate(length(min = 1, max = 128), custom(function = "validate_user_id"))]
    pub user_id: String,

    /// Source code
    #[validate(length(min = 1, max = 1048576))] // 1MB max
    pub code: String,

    /// Programming language
    #[validate(length(min = 1, max = 20))]
    pub language: String,
}

/// Run code once without recording a submission
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    #[validate(length(min = 1))]
    pub problem_id: ProblemId,

    /// Source code
    #[validate(length(min = 1, max = 1048576))] // 1MB max
    pub code: String,

    /// Programming language
    #[validate(length(min = 1, max = 20))]
    pub language: String,

    #[serde(default)]
    pub custom_input: CustomInput,
}

/// Input for a single run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomInput {
    /// Use the problem's first test case
    #[default]
    None,
    /// Arguments by parameter name, run through a generated harness
    Arguments(Map<String, Value>),
    /// Raw stdin for the user's code, run without a harness
    Stdin(String),
}

impl SubmitRequest {
    pub fn new(
        problem_id: impl Into<ProblemId>,
        user_id: impl Into<String>,
        code: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            problem_id: problem_id.into(),
            user_id: user_id.into(),
            code: code.into(),
            language: language.into(),
        }
    }

    /// Validate fields and resolve the language
    pub fn checked_language(&self) -> JudgeResult<Language> {
        self.validate()?;
        check_code_and_language(&self.code, &self.language)
    }
}

impl RunRequest {
    pub fn new(
        problem_id: impl Into<ProblemId>,
        code: impl Into<String>,
        language: impl Into<String>,
        custom_input: CustomInput,
    ) -> Self {
        Self {
            problem_id: problem_id.into(),
            code: code.into(),
            language: language.into(),
            custom_input,
        }
    }

    /// Validate fields and resolve the language
    pub fn checked_language(&self) -> JudgeResult<Language> {
        self.validate()?;
        check_code_and_language(&self.code, &self.language)
    }
}

fn check_code_and_language(code: &str, language: &str) -> JudgeResult<Language> {
    utils::validate_source_code(code).map_err(|e| JudgeError::Validation(e.to_string()))?;
    language
        .parse()
        .map_err(|_| JudgeError::UnsupportedLanguage(language.to_string()))
}

fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    utils::validate_user_id(user_id).map_err(|message| {
        let mut error = ValidationError::new("invalid_user_id");
        error.message = Some(message.into());
        error
    })
}
