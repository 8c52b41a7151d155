//! Judge0 wire types
//!
//! Every text field travels base64 encoded so that arbitrary bytes survive
//! the JSON round trip.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ExecutionResult, ExecutionStatus};

/// Body of `POST /submissions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub source_code: String,
    pub stdin: String,
    pub language_id: u32,
}

impl SubmissionRequest {
    /// Build a request, encoding source and stdin
    pub fn encode(source: &str, stdin: &str, language_id: u32) -> Self {
        Self {
            source_code: STANDARD.encode(source),
            stdin: STANDARD.encode(stdin),
            language_id,
        }
    }
}

/// Status object of a submission response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub id: u32,
    pub description: String,
}

/// Body returned by a synchronous (`wait=true`) submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<StatusPayload>,
    #[serde(default)]
    pub time: Option<Value>,
    #[serde(default)]
    pub memory: Option<Value>,
}

/// Why a response could not be turned into an [`ExecutionResult`]
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid base64 in field '{field}': {source}")]
    InvalidEncoding {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("response carries no status")]
    MissingStatus,
}

impl SubmissionResponse {
    /// Decode every encoded field
    pub fn decode(self) -> Result<ExecutionResult, ProtocolError> {
        let status = self.status.ok_or(ProtocolError::MissingStatus)?;

        Ok(ExecutionResult {
            stdout: decode_field("stdout", self.stdout)?,
            stderr: decode_field("stderr", self.stderr)?,
            compile_output: decode_field("compile_output", self.compile_output)?,
            message: decode_field("message", self.message)?,
            status: ExecutionStatus::Sandbox {
                id: status.id,
                description: status.description,
            },
            time: self.time.and_then(|time| match time {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
            memory: self.memory.and_then(|memory| memory.as_u64()),
        })
    }
}

/// Decode one base64 field; absent fields are empty and invalid UTF-8 is
/// replaced rather than rejected.
fn decode_field(field: &'static str, value: Option<String>) -> Result<String, ProtocolError> {
    let Some(encoded) = value else {
        return Ok(String::new());
    };
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|source| ProtocolError::InvalidEncoding { field, source })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_is_encoded() {
        let request = SubmissionRequest::encode("print(1)", "", 71);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"source_code": "cHJpbnQoMSk=", "stdin": "", "language_id": 71})
        );
    }

    #[test]
    fn test_decode_response() {
        let response: SubmissionResponse = serde_json::from_value(json!({
            "stdout": "WzAsMV0K",
            "stderr": null,
            "compile_output": null,
            "status": {"id": 3, "description": "Accepted"},
            "time": "0.012",
            "memory": 3412
        }))
        .unwrap();

        let result = response.decode().unwrap();
        assert_eq!(result.stdout, "[0,1]\n");
        assert_eq!(result.stderr, "");
        assert!(result.status.is_success());
        assert_eq!(result.time.as_deref(), Some("0.012"));
        assert_eq!(result.memory, Some(3412));
    }

    #[test]
    fn test_decode_keeps_sandbox_message() {
        let response: SubmissionResponse = serde_json::from_value(json!({
            "stdout": null,
            "message": STANDARD.encode("Exited with error status 1"),
            "status": {"id": 11, "description": "Runtime Error (NZEC)"}
        }))
        .unwrap();

        let result = response.decode().unwrap();
        assert_eq!(result.message, "Exited with error status 1");
        assert_eq!(result.stdout, "");
    }

    #[test]
    fn test_decode_tolerates_line_wrapped_base64() {
        let response = SubmissionResponse {
            compile_output: Some("ZXJy\nb3I=\n".to_string()),
            status: Some(StatusPayload {
                id: 6,
                description: "Compilation Error".to_string(),
            }),
            ..Default::default()
        };
        assert_eq!(response.decode().unwrap().compile_output, "error");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let response = SubmissionResponse {
            stdout: Some(STANDARD.encode([0x66, 0x6f, 0xff])),
            status: Some(StatusPayload {
                id: 3,
                description: "Accepted".to_string(),
            }),
            ..Default::default()
        };
        assert_eq!(response.decode().unwrap().stdout, "fo\u{fffd}");
    }

    #[test]
    fn test_malformed_responses() {
        let bad_base64 = SubmissionResponse {
            stdout: Some("***".to_string()),
            status: Some(StatusPayload {
                id: 3,
                description: "Accepted".to_string(),
            }),
            ..Default::default()
        };
        assert!(matches!(
            bad_base64.decode(),
            Err(ProtocolError::InvalidEncoding { field: "stdout", .. })
        ));
        assert!(matches!(
            SubmissionResponse::default().decode(),
            Err(ProtocolError::MissingStatus)
        ));
    }
}
