//! Utility functions

pub mod crypto;
pub mod validation;

pub use crypto::hash_string;
pub use validation::{
    validate_identifier, validate_parameter_name, validate_source_code,
    validate_user_id,
};
