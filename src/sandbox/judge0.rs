//! HTTP client for a Judge0 sandbox

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::protocol::{SubmissionRequest, SubmissionResponse};
use super::{CodeExecutor, ExecutionResult};
use crate::config::SandboxConfig;
use crate::constants::MAX_SANDBOX_RETRY_DELAY_MS;
use crate::models::Language;

/// Failures talking to the sandbox
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("no sandbox language id configured for {0}")]
    UnmappedLanguage(Language),

    #[error("sandbox request timed out")]
    Timeout,

    #[error("could not connect to sandbox: {0}")]
    Connect(String),

    #[error("sandbox rejected credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("sandbox returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed sandbox response: {0}")]
    Malformed(String),

    #[error("sandbox request failed: {0}")]
    Transport(String),
}

impl SandboxError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect(_) => true,
            Self::Http { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SandboxError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Credentials sent with every request
#[derive(Debug, Clone, Default)]
struct Credentials {
    api_key: Option<String>,
    api_host: Option<String>,
    auth_token: Option<String>,
}

/// Judge0 client using synchronous (`wait=true`) submissions
#[derive(Debug, Clone)]
pub struct Judge0Client {
    client: Client,
    base_url: String,
    credentials: Credentials,
    language_ids: HashMap<Language, u32>,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl Judge0Client {
    pub fn new(config: &SandboxConfig) -> Result<Self, SandboxError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SandboxError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: Credentials {
                api_key: config.api_key.clone(),
                api_host: config.api_host.clone(),
                auth_token: config.auth_token.clone(),
            },
            language_ids: config.language_ids.clone(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    fn submissions_url(&self) -> String {
        format!("{}/submissions?base64_encoded=true&wait=true", self.base_url)
    }

    /// Run a program, retrying transient failures with backoff
    pub async fn submit(
        &self,
        source: &str,
        language: Language,
        stdin: &str,
    ) -> Result<ExecutionResult, SandboxError> {
        let language_id = *self
            .language_ids
            .get(&language)
            .ok_or(SandboxError::UnmappedLanguage(language))?;
        let request = SubmissionRequest::encode(source, stdin, language_id);

        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Ok(result) => return Ok(result),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff_delay(attempt);
                    attempt += 1;
                    warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient sandbox failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once(&self, request: &SubmissionRequest) -> Result<ExecutionResult, SandboxError> {
        let mut builder = self.client.post(self.submissions_url()).json(request);
        if let Some(key) = &self.credentials.api_key {
            builder = builder.header("X-RapidAPI-Key", key);
        }
        if let Some(host) = &self.credentials.api_host {
            builder = builder.header("X-RapidAPI-Host", host);
        }
        if let Some(token) = &self.credentials.auth_token {
            builder = builder.header("X-Auth-Token", token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SandboxError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SandboxError::Http {
                status: status.as_u16(),
                body: crate::models::truncate_chars(&body, 200),
            });
        }

        let payload: SubmissionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SandboxError::Timeout
            } else {
                SandboxError::Malformed(e.to_string())
            }
        })?;
        let result = payload
            .decode()
            .map_err(|e| SandboxError::Malformed(e.to_string()))?;

        debug!(status = %result.status.label(), time = ?result.time, "Sandbox execution finished");
        Ok(result)
    }

    /// Exponential delay from the base, capped, plus up to 50% jitter
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.retry_base_delay.as_millis() as u64;
        let exp_ms = base_ms
            .saturating_mul(1u64 << attempt.min(16))
            .min(MAX_SANDBOX_RETRY_DELAY_MS);
        let jitter_ms = if exp_ms > 1 {
            rand::rng().random_range(0..=exp_ms / 2)
        } else {
            0
        };
        Duration::from_millis(exp_ms + jitter_ms)
    }
}

#[async_trait]
impl CodeExecutor for Judge0Client {
    async fn execute(&self, source: &str, language: Language, stdin: &str) -> ExecutionResult {
        match self.submit(source, language, stdin).await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, language = %language, "Sandbox call failed");
                ExecutionResult::system_error(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    /// Canned reply of the fake sandbox
    #[derive(Clone)]
    enum Reply {
        Json(Value),
        Status(u16),
        Raw(&'static str),
        Hang,
    }

    #[derive(Clone, Default)]
    struct FakeState {
        replies: Arc<Mutex<VecDeque<Reply>>>,
        requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
    }

    async fn submissions(
        State(state): State<FakeState>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> axum::response::Response {
        use axum::response::IntoResponse;

        state.requests.lock().unwrap().push((headers, body));
        let reply = state.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Json(value)) => Json(value).into_response(),
            Some(Reply::Status(code)) => AxumStatus::from_u16(code).unwrap().into_response(),
            Some(Reply::Raw(text)) => text.into_response(),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                AxumStatus::OK.into_response()
            }
            None => AxumStatus::SERVICE_UNAVAILABLE.into_response(),
        }
    }

    async fn start(replies: Vec<Reply>) -> (SocketAddr, FakeState) {
        let state = FakeState {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            requests: Arc::default(),
        };
        let app = Router::new()
            .route("/submissions", post(submissions))
            .with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        (addr, state)
    }

    fn config(addr: SocketAddr) -> SandboxConfig {
        SandboxConfig {
            base_url: format!("http://{}", addr),
            api_key: Some("key".to_string()),
            api_host: Some("judge0-ce.p.rapidapi.com".to_string()),
            timeout: Duration::from_millis(500),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(1),
            ..SandboxConfig::default()
        }
    }

    fn accepted(stdout: &str) -> Reply {
        use base64::Engine;
        Reply::Json(json!({
            "stdout": base64::engine::general_purpose::STANDARD.encode(stdout),
            "stderr": null,
            "compile_output": null,
            "status": {"id": 3, "description": "Accepted"},
            "time": "0.01",
            "memory": 1024
        }))
    }

    #[tokio::test]
    async fn test_execute_sends_encoded_request_with_headers() {
        let (addr, state) = start(vec![accepted("[0,1]\n")]).await;
        let client = Judge0Client::new(&config(addr)).unwrap();

        let result = client.execute("print(1)", Language::Python, "").await;
        assert!(result.status.is_success());
        assert_eq!(result.stdout, "[0,1]\n");
        assert_eq!(result.memory, Some(1024));

        let requests = state.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (headers, body) = &requests[0];
        assert_eq!(headers["x-rapidapi-key"], "key");
        assert_eq!(headers["x-rapidapi-host"], "judge0-ce.p.rapidapi.com");
        assert_eq!(body["language_id"], json!(71));
        assert_eq!(body["source_code"], json!("cHJpbnQoMSk="));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let (addr, state) = start(vec![Reply::Status(503), Reply::Status(429), accepted("ok")]).await;
        let client = Judge0Client::new(&config(addr)).unwrap();

        let result = client.execute("x", Language::Cpp, "").await;
        assert_eq!(result.stdout, "ok");
        assert_eq!(state.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (addr, state) = start(vec![Reply::Status(500); 5]).await;
        let client = Judge0Client::new(&config(addr)).unwrap();

        let result = client.execute("x", Language::Cpp, "").await;
        assert!(result.is_system_error());
        assert_eq!(state.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let (addr, state) = start(vec![Reply::Status(401), accepted("ok")]).await;
        let client = Judge0Client::new(&config(addr)).unwrap();

        let err = client.submit("x", Language::Java, "").await.unwrap_err();
        assert!(matches!(err, SandboxError::Unauthorized(401)));
        assert_eq!(state.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_is_system_error() {
        let (addr, state) = start(vec![Reply::Raw("not json"), accepted("ok")]).await;
        let client = Judge0Client::new(&config(addr)).unwrap();

        let result = client.execute("x", Language::JavaScript, "").await;
        assert!(result.is_system_error());
        assert!(result.status.label().contains("malformed"));
        assert_eq!(state.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_system_error() {
        let (addr, _state) = start(vec![Reply::Hang, Reply::Hang, Reply::Hang]).await;
        let mut config = config(addr);
        config.timeout = Duration::from_millis(100);
        config.max_retries = 0;
        let client = Judge0Client::new(&config).unwrap();

        let result = client.execute("x", Language::Cpp, "").await;
        assert_eq!(
            result.status,
            crate::sandbox::ExecutionStatus::SystemError("sandbox request timed out".to_string())
        );
    }

    #[tokio::test]
    async fn test_unmapped_language() {
        let (addr, state) = start(vec![]).await;
        let mut config = config(addr);
        config.language_ids.remove(&Language::Java);
        let client = Judge0Client::new(&config).unwrap();

        let err = client.submit("x", Language::Java, "").await.unwrap_err();
        assert!(matches!(err, SandboxError::UnmappedLanguage(Language::Java)));
        assert!(state.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_backoff_is_capped() {
        let client = Judge0Client::new(&SandboxConfig {
            retry_base_delay: Duration::from_millis(1000),
            ..SandboxConfig::default()
        })
        .unwrap();

        let first = client.backoff_delay(0);
        assert!(first >= Duration::from_millis(1000) && first <= Duration::from_millis(1500));
        let late = client.backoff_delay(10);
        assert!(late <= Duration::from_millis(MAX_SANDBOX_RETRY_DELAY_MS * 3 / 2));
    }
}
