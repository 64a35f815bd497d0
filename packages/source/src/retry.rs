//! HTTP retry helper for transient errors.
//!
//! Fetchers call [`send_json`] instead of `reqwest::RequestBuilder::send()`
//! directly, so every outbound request gets a bounded number of retries with
//! exponential backoff. Retrying is a transport concern; the pipeline's own
//! control flow never loops on failure.

use std::time::Duration;

use crate::SourceError;

/// Maximum retry attempts for transient errors (connection failures,
/// timeouts, HTTP 429, HTTP 5xx). Backoff doubles each attempt: 2s, 4s, 8s.
const MAX_RETRIES: u32 = 3;

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`], since builders are consumed by
/// `.send()`. HTTP 4xx (other than 429) is permanent and never retried.
///
/// # Errors
///
/// Returns [`SourceError`] when the request still fails after all retries,
/// the server answers with a non-retryable status, or the body is not JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(build_request: F) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    for attempt in 0..=MAX_RETRIES {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt);
            log::warn!("  retry {attempt}/{MAX_RETRIES} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        let response = match build_request().send().await {
            Ok(response) => response,
            Err(e) => {
                if is_transient(&e) && attempt < MAX_RETRIES {
                    log::warn!("  transient error: {e}");
                    continue;
                }
                return Err(SourceError::Http(e));
            }
        };

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            if attempt < MAX_RETRIES {
                log::warn!("  HTTP {status}, retrying");
                continue;
            }
            return Err(SourceError::Api {
                message: format!("HTTP {status} after {MAX_RETRIES} retries"),
            });
        }

        if status.is_client_error() {
            return Err(SourceError::Api {
                message: format!("HTTP {status}"),
            });
        }

        let text = response.text().await?;
        return serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
            log::error!("response body was not JSON: {e} (body preview: {preview})");
            SourceError::Json(e)
        });
    }

    // The loop always returns via Ok or Err on the final attempt.
    unreachable!("send_json retry loop exited without returning")
}

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}
