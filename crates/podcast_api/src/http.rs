//! 带重试的 HTTP GET

use std::thread;
use std::time::Duration;

/// 数据源错误
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("HTTP status {status}{}", body_suffix(.body))]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request failed after {attempts} attempt(s): {last}")]
    Exhausted { attempts: usize, last: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("episode {0} not found")]
    NotFound(String),

    #[error("invalid API address {0}")]
    InvalidUrl(String),
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" ({body})")
    }
}

/// 重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub attempts: usize,
    pub retry_delay: Duration,
}

fn should_retry_http_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

pub(crate) fn get_text_with_retries(
    url: &str,
    query: &[(String, String)],
    policy: &RetryPolicy,
) -> Result<String, ApiError> {
    let attempts = policy.attempts.max(1);
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(policy.connect_timeout)
        .timeout_read(policy.read_timeout)
        .timeout_write(policy.read_timeout)
        .build();

    let mut last_error = None;
    for attempt in 1..=attempts {
        let mut request = agent.get(url).set("Accept", "application/json");
        for (key, value) in query {
            request = request.query(key, value);
        }

        let error = match request.call() {
            Ok(response) => {
                return response
                    .into_string()
                    .map_err(|e| ApiError::Decode(format!("response decode failed: {e}")));
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                let error = ApiError::Status {
                    status,
                    body: body.trim().chars().take(240).collect(),
                };
                if !should_retry_http_status(status) {
                    return Err(error);
                }
                error
            }
            Err(ureq::Error::Transport(err)) => ApiError::Transport(err.to_string()),
        };

        log::warn!("GET {} attempt {}/{} failed: {}", url, attempt, attempts, error);
        last_error = Some(error);
        if attempt < attempts {
            thread::sleep(policy.retry_delay);
        }
    }

    Err(ApiError::Exhausted {
        attempts,
        last: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no response".to_string()),
    })
}
