//! Speech generation errors

use audio_domain::DomainError;
use thiserror::Error;

/// Errors that can occur while collecting, normalizing and storing audio
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Failed to connect to the speech service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the speech service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Inline audio data could not be decoded
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    /// Reading the response took too long
    #[error("Speech generation timeout after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Service unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Voice not found in the catalog
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// The stream ended without any inline audio
    #[error("No audio data generated")]
    NoAudioGenerated,

    /// Writing the audio file failed
    #[error("Storage failed: {0}")]
    Storage(String),
}

impl SpeechError {
    /// Whether retrying the same request may succeed
    ///
    /// `NoAudioGenerated` is final: the model answered, just without audio.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::Timeout(_)
                | Self::RateLimited
                | Self::ServiceUnavailable(_)
        )
    }

    /// Classify a transport error
    ///
    /// reqwest does not say which timeout fired, so timeouts are reported
    /// with the read timeout the caller was enforcing.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else if err.is_decode() || err.is_body() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

impl From<DomainError> for SpeechError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::EmptyChunkSet => Self::NoAudioGenerated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failed_error_message() {
        let err = SpeechError::ConnectionFailed("refused".to_string());
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn invalid_response_error_message() {
        let err = SpeechError::InvalidResponse("expected value".to_string());
        assert_eq!(err.to_string(), "Invalid response: expected value");
    }

    #[test]
    fn invalid_audio_error_message() {
        let err = SpeechError::InvalidAudio("bad base64".to_string());
        assert_eq!(err.to_string(), "Invalid audio: bad base64");
    }

    #[test]
    fn timeout_error_message() {
        let err = SpeechError::Timeout(30000);
        assert_eq!(err.to_string(), "Speech generation timeout after 30000ms");
    }

    #[test]
    fn no_audio_generated_error_message() {
        let err = SpeechError::NoAudioGenerated;
        assert_eq!(err.to_string(), "No audio data generated");
    }

    #[test]
    fn voice_not_found_error_message() {
        let err = SpeechError::VoiceNotFound("Nova".to_string());
        assert_eq!(err.to_string(), "Voice not found: Nova");
    }

    #[test]
    fn storage_error_message() {
        let err = SpeechError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "Storage failed: disk full");
    }

    /// Client whose request deadline expires against a server that never answers
    async fn timed_out_request() -> reqwest::Error {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(50))
            .build()
            .unwrap();

        let err = client.get(format!("http://{addr}/")).send().await.unwrap_err();
        drop(listener);
        err
    }

    #[tokio::test]
    async fn transport_timeout_reports_given_duration() {
        let err = timed_out_request().await;

        let mapped = SpeechError::from_transport(&err, 1234);
        assert!(matches!(mapped, SpeechError::Timeout(1234)));
        assert!(mapped.is_retryable());
    }

    #[tokio::test]
    async fn transport_connect_failure_is_connection_failed() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reqwest::get(format!("http://{addr}/")).await.unwrap_err();
        let mapped = SpeechError::from_transport(&err, 1000);
        assert!(matches!(mapped, SpeechError::ConnectionFailed(_)));
    }

    #[test]
    fn empty_chunk_set_maps_to_no_audio() {
        let err: SpeechError = DomainError::EmptyChunkSet.into();
        assert!(matches!(err, SpeechError::NoAudioGenerated));
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(SpeechError::ConnectionFailed("reset".into()).is_retryable());
        assert!(SpeechError::Timeout(100).is_retryable());
        assert!(SpeechError::RateLimited.is_retryable());
        assert!(SpeechError::ServiceUnavailable("overloaded".into()).is_retryable());
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(!SpeechError::NoAudioGenerated.is_retryable());
        assert!(!SpeechError::InvalidAudio("x".into()).is_retryable());
        assert!(!SpeechError::InvalidResponse("x".into()).is_retryable());
        assert!(!SpeechError::Configuration("x".into()).is_retryable());
        assert!(!SpeechError::Storage("x".into()).is_retryable());
        assert!(!SpeechError::RequestFailed("400".into()).is_retryable());
    }
}
