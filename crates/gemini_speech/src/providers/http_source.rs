//! Chunk source over a streaming HTTP response
//!
//! Wraps the response of an already issued `streamGenerateContent` request.
//! Building and authenticating that request is up to the caller; this source
//! only checks the status, reads the body incrementally and decodes it.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use audio_domain::AudioChunk;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::ChunkSource;
use crate::providers::gemini_stream::StreamDecoder;

/// Google API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Chunk source reading a streamed response body
#[derive(Debug)]
pub struct HttpStreamSource {
    response: Option<Response>,
    decoder: StreamDecoder,
    pending: VecDeque<AudioChunk>,
    read_timeout: Duration,
    max_body_bytes: usize,
    received_bytes: usize,
}

impl HttpStreamSource {
    /// Wrap a response, failing early on a non-success status
    ///
    /// # Arguments
    ///
    /// * `response` - Response of the streaming request
    /// * `config` - Supplies the per-read timeout and body size cap
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::RateLimited` for 429 and quota errors,
    /// `SpeechError::ServiceUnavailable` for 503 and 504, and
    /// `SpeechError::RequestFailed` for every other non-success status.
    #[instrument(skip(response, config), fields(status = %response.status()))]
    pub async fn from_response(
        response: Response,
        config: &SpeechConfig,
    ) -> Result<Self, SpeechError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Streaming request failed");
            return Err(Self::status_error(status, &body));
        }

        Ok(Self {
            response: Some(response),
            decoder: StreamDecoder::new(),
            pending: VecDeque::new(),
            read_timeout: Duration::from_millis(config.read_timeout_ms),
            max_body_bytes: config.max_response_bytes,
            received_bytes: 0,
        })
    }

    /// Body bytes read so far
    #[must_use]
    pub const fn received_bytes(&self) -> usize {
        self.received_bytes
    }

    fn status_error(status: StatusCode, body: &str) -> SpeechError {
        let api_error = serde_json::from_str::<ApiError>(body).ok();
        let message = api_error
            .as_ref()
            .map_or_else(|| format!("HTTP {status}: {body}"), |e| e.error.message.clone());
        let api_status = api_error.as_ref().and_then(|e| e.error.status.as_deref());

        match (status.as_u16(), api_status) {
            (429, _) | (_, Some("RESOURCE_EXHAUSTED")) => SpeechError::RateLimited,
            (503 | 504, _) | (_, Some("UNAVAILABLE" | "DEADLINE_EXCEEDED")) => {
                SpeechError::ServiceUnavailable(message)
            },
            _ => SpeechError::RequestFailed(message),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn timeout_ms(&self) -> u64 {
        self.read_timeout.as_millis() as u64
    }
}

#[async_trait]
impl ChunkSource for HttpStreamSource {
    async fn next_chunk(&mut self) -> Result<Option<AudioChunk>, SpeechError> {
        loop {
            if let Some(chunk) = self.pending.pop_front() {
                return Ok(Some(chunk));
            }

            let timeout_ms = self.timeout_ms();
            let Some(response) = self.response.as_mut() else {
                return Ok(None);
            };

            let next = tokio::time::timeout(self.read_timeout, response.chunk())
                .await
                .map_err(|_| SpeechError::Timeout(timeout_ms))?
                .map_err(|e| SpeechError::from_transport(&e, timeout_ms))?;

            match next {
                Some(bytes) => {
                    self.received_bytes += bytes.len();
                    if self.received_bytes > self.max_body_bytes {
                        self.response = None;
                        return Err(SpeechError::InvalidResponse(format!(
                            "Response body exceeds {} bytes",
                            self.max_body_bytes
                        )));
                    }
                    self.pending.extend(self.decoder.push(&bytes)?);
                },
                None => {
                    debug!(body_bytes = self.received_bytes, "Response body complete");
                    self.response = None;
                    self.pending.extend(self.decoder.finish()?);
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_is_rate_limited() {
        let err = HttpStreamSource::status_error(StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, SpeechError::RateLimited));
    }

    #[test]
    fn resource_exhausted_is_rate_limited() {
        let body = r#"{"error":{"code":400,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = HttpStreamSource::status_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, SpeechError::RateLimited));
    }

    #[test]
    fn service_unavailable_keeps_message() {
        let body = r#"{"error":{"code":503,"message":"The model is overloaded","status":"UNAVAILABLE"}}"#;
        let err = HttpStreamSource::status_error(StatusCode::SERVICE_UNAVAILABLE, body);
        assert!(matches!(err, SpeechError::ServiceUnavailable(m) if m == "The model is overloaded"));
    }

    #[test]
    fn other_errors_use_api_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let err = HttpStreamSource::status_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, SpeechError::RequestFailed(m) if m == "API key not valid"));
    }

    #[test]
    fn non_json_error_body_is_included() {
        let err = HttpStreamSource::status_error(StatusCode::NOT_FOUND, "no such model");
        assert!(matches!(err, SpeechError::RequestFailed(m) if m.contains("no such model")));
    }
}
