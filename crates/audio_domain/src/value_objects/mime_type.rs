//! MIME type value object
//!
//! A MIME type as received alongside a streamed audio chunk, decomposed into
//! its base type and `key=value` parameters.
//!
//! # Examples
//!
//! ```
//! use audio_domain::MimeType;
//!
//! let mime = MimeType::parse("audio/L16; rate=24000");
//! assert_eq!(mime.base_type(), "audio/L16");
//! assert_eq!(mime.parameter("RATE"), Some("24000"));
//! assert_eq!(mime.known_extension(), None);
//!
//! assert_eq!(MimeType::parse("audio/mpeg").known_extension(), Some(".mp3"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value_objects::AudioParameters;

/// Extension of the container synthesized for raw PCM payloads
pub const WAV_EXTENSION: &str = ".wav";

/// Look up the file extension for a MIME type that already describes a
/// playable format
///
/// The whole string is matched (surrounding whitespace ignored) and the match
/// is case-sensitive, so `audio/L16` resolves to `.pcm` while
/// `audio/L16;rate=24000` does not resolve at all.
///
/// # Examples
///
/// ```
/// use audio_domain::known_extension;
///
/// assert_eq!(known_extension("audio/wav"), Some(".wav"));
/// assert_eq!(known_extension("audio/L16"), Some(".pcm"));
/// assert_eq!(known_extension("audio/L16;rate=24000"), None);
/// ```
#[must_use]
pub fn known_extension(mime_type: &str) -> Option<&'static str> {
    match mime_type.trim() {
        "audio/wav" => Some(".wav"),
        "audio/mp3" | "audio/mpeg" => Some(".mp3"),
        "audio/ogg" => Some(".ogg"),
        "audio/webm" => Some(".webm"),
        "audio/mp4" => Some(".mp4"),
        // Bare L16 is treated as a known raw type and skips header synthesis.
        "audio/L16" => Some(".pcm"),
        _ => None,
    }
}

/// A parsed MIME type
///
/// Parsing never fails. Tokens after the base type that do not contain `=`
/// are dropped from the parameter list but stay in the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MimeType {
    raw: String,
    base_type: String,
    parameters: Vec<(String, String)>,
}

impl MimeType {
    /// Parse a MIME type string
    #[must_use]
    pub fn parse(mime_type: &str) -> Self {
        let raw = mime_type.trim().to_string();
        let mut tokens = raw.split(';').map(str::trim);

        let base_type = tokens.next().unwrap_or_default().to_string();
        let parameters = tokens
            .filter_map(|token| token.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();

        Self {
            raw,
            base_type,
            parameters,
        }
    }

    /// The trimmed MIME type string as received
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The base type, e.g. `audio/L16`
    #[must_use]
    pub fn base_type(&self) -> &str {
        &self.base_type
    }

    /// Iterate over `key=value` parameters in the order they appeared
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Get a parameter value by case-insensitive key; the last occurrence wins
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Audio parameters described by this MIME type, with defaults applied
    #[must_use]
    pub fn audio_parameters(&self) -> AudioParameters {
        AudioParameters::parse(&self.raw)
    }

    /// Extension of the self-describing format this MIME type names, if any
    #[must_use]
    pub fn known_extension(&self) -> Option<&'static str> {
        known_extension(&self.raw)
    }

    /// Whether payloads under this MIME type need a synthesized header
    #[must_use]
    pub fn needs_header(&self) -> bool {
        self.known_extension().is_none()
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for MimeType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for MimeType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<MimeType> for String {
    fn from(value: MimeType) -> Self {
        value.raw
    }
}
