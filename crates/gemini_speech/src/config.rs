//! Configuration for speech generation sessions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::Voice;

/// Default timeout for reading a streamed response, in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;

/// Default cap on the size of a streamed response body
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;

/// Output stem for multi-speaker generations
pub const INTERVIEW_STEM: &str = "output_podcast_interview";

/// Configuration for speech generation sessions
///
/// Passed explicitly at construction; nothing is read from the process
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Directory audio files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Voice used for single-speaker output names
    #[serde(default)]
    pub default_voice: Voice,

    /// Timeout for reading a streamed response in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Maximum accepted size of a streamed response body
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,

    /// Whether existing files may be replaced
    #[serde(default = "default_overwrite_existing")]
    pub overwrite_existing: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

const fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

const fn default_overwrite_existing() -> bool {
    true
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_voice: Voice::default(),
            read_timeout_ms: default_read_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
            overwrite_existing: default_overwrite_existing(),
        }
    }
}

impl SpeechConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.output_dir.as_os_str().is_empty() {
            return Err("Output directory must not be empty".to_string());
        }

        if self.read_timeout_ms == 0 {
            return Err("Read timeout must be greater than 0".to_string());
        }

        if self.max_response_bytes == 0 {
            return Err("Max response bytes must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Output stem for a single-speaker generation, e.g. `output_single_zephyr`
    #[must_use]
    pub fn single_speaker_stem(&self, voice: Option<Voice>) -> String {
        let voice = voice.unwrap_or(self.default_voice);
        format!("output_single_{}", voice.as_str().to_lowercase())
    }
}
