//! Input validation utilities

use std::sync::LazyLock;

use regex::Regex;

use crate::constants;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Names the generated entry points declare themselves
const RESERVED_BINDINGS: [&str; 2] = ["result", "sol"];

/// Validate a function or parameter name used in generated code
pub fn validate_identifier(name: &str) -> Result<(), &'static str> {
    if !IDENTIFIER.is_match(name) {
        return Err("Identifier must start with a letter or underscore and contain only letters, digits and underscores");
    }
    Ok(())
}

/// Validate a parameter name, which becomes a local variable in the harness
pub fn validate_parameter_name(name: &str) -> Result<(), &'static str> {
    validate_identifier(name)?;
    if RESERVED_BINDINGS.contains(&name) {
        return Err("Parameter name collides with a harness variable");
    }
    Ok(())
}

/// Validate source code size
pub fn validate_source_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err("Source code cannot be empty");
    }
    if code.len() > constants::MAX_SOURCE_CODE_SIZE {
        return Err("Source code exceeds maximum size of 1MB");
    }
    Ok(())
}

/// Validate user identifier
pub fn validate_user_id(user_id: &str) -> Result<(), &'static str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err("User id cannot be empty");
    }
    if trimmed.len() > constants::MAX_USER_ID_LENGTH {
        return Err("User id is too long");
    }
    Ok(())
}
