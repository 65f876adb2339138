//! Types for speech generation
//!
//! Contains the voice catalog, speaker assignments and the summary of a
//! stored generation.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpeechError;

/// Prebuilt voices offered by the TTS model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Voice {
    /// Zephyr
    #[default]
    Zephyr,
    /// Puck
    Puck,
    /// Charon
    Charon,
    /// Kore
    Kore,
    /// Uranus
    Uranus,
    /// Fenrir
    Fenrir,
}

impl Voice {
    /// Every voice in the catalog
    pub const ALL: [Self; 6] = [
        Self::Zephyr,
        Self::Puck,
        Self::Charon,
        Self::Kore,
        Self::Uranus,
        Self::Fenrir,
    ];

    /// Voice name as the service expects it
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Zephyr => "Zephyr",
            Self::Puck => "Puck",
            Self::Charon => "Charon",
            Self::Kore => "Kore",
            Self::Uranus => "Uranus",
            Self::Fenrir => "Fenrir",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = SpeechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|voice| voice.as_str() == s)
            .ok_or_else(|| SpeechError::VoiceNotFound(s.to_string()))
    }
}

/// Assignment of a voice to a named speaker in a multi-speaker script
///
/// Nothing in this crate builds requests. Callers that assemble the
/// multi-speaker voice config parse and check their line-up with this type
/// before sending, so bad speaker settings fail before any audio is streamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerVoice {
    /// Speaker label as it appears in the script, e.g. `Speaker 1`
    pub speaker: String,
    /// Voice for this speaker
    pub voice: Voice,
}

impl SpeakerVoice {
    /// Create a new speaker assignment
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the speaker label is blank.
    pub fn new(speaker: impl Into<String>, voice: Voice) -> Result<Self, SpeechError> {
        let speaker = speaker.into().trim().to_string();
        if speaker.is_empty() {
            return Err(SpeechError::Configuration(
                "Speaker name must not be empty".to_string(),
            ));
        }
        Ok(Self { speaker, voice })
    }

    /// Parse a `Speaker:Voice` pair, splitting on the first `:`
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if there is no `:` or the speaker
    /// is blank, and `SpeechError::VoiceNotFound` for an unknown voice.
    pub fn parse(spec: &str) -> Result<Self, SpeechError> {
        let (speaker, voice) = spec.split_once(':').ok_or_else(|| {
            SpeechError::Configuration(format!(
                "Invalid speaker config '{spec}'. Use format: SpeakerName:VoiceName"
            ))
        })?;

        Self::new(speaker, voice.trim().parse()?)
    }

    /// Check a caller's speaker line-up before it goes into a request
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the list is empty or a speaker
    /// label appears twice.
    pub fn validate_all(speakers: &[Self]) -> Result<(), SpeechError> {
        if speakers.is_empty() {
            return Err(SpeechError::Configuration(
                "At least one speaker is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for speaker in speakers {
            if !seen.insert(speaker.speaker.as_str()) {
                return Err(SpeechError::Configuration(format!(
                    "Duplicate speaker '{}'",
                    speaker.speaker
                )));
            }
        }

        Ok(())
    }
}

/// Summary of a normalized and stored generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAudio {
    /// Where the file was written
    pub path: PathBuf,
    /// Extension the file was stored under, including the dot
    pub extension: String,
    /// Size of the written file in bytes
    pub size_bytes: usize,
    /// Number of chunks the stream delivered
    pub chunk_count: usize,
    /// Whether a WAV header was synthesized
    pub header_synthesized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod voice {
        use super::*;

        #[test]
        fn parses_exact_names() {
            for voice in Voice::ALL {
                assert_eq!(voice.as_str().parse::<Voice>().unwrap(), voice);
            }
        }

        #[test]
        fn parsing_is_case_sensitive() {
            let err = "zephyr".parse::<Voice>().unwrap_err();
            assert!(matches!(err, SpeechError::VoiceNotFound(name) if name == "zephyr"));
        }

        #[test]
        fn default_is_zephyr() {
            assert_eq!(Voice::default(), Voice::Zephyr);
        }

        #[test]
        fn display_matches_name() {
            assert_eq!(Voice::Charon.to_string(), "Charon");
        }

        #[test]
        fn serializes_as_name() {
            let json = serde_json::to_string(&Voice::Uranus).unwrap();
            assert_eq!(json, "\"Uranus\"");
        }
    }

    mod speaker_voice {
        use super::*;

        #[test]
        fn parse_splits_on_first_colon() {
            let sv = SpeakerVoice::parse(" Speaker 1 : Puck ").unwrap();
            assert_eq!(sv.speaker, "Speaker 1");
            assert_eq!(sv.voice, Voice::Puck);
        }

        #[test]
        fn parse_requires_colon() {
            let err = SpeakerVoice::parse("Host Zephyr").unwrap_err();
            assert!(matches!(err, SpeechError::Configuration(_)));
        }

        #[test]
        fn parse_rejects_unknown_voice() {
            let err = SpeakerVoice::parse("Host:Nova").unwrap_err();
            assert!(matches!(err, SpeechError::VoiceNotFound(_)));
        }

        #[test]
        fn parse_rejects_blank_speaker() {
            let err = SpeakerVoice::parse("  :Kore").unwrap_err();
            assert!(matches!(err, SpeechError::Configuration(_)));
        }

        #[test]
        fn validate_all_accepts_distinct_speakers() {
            let speakers = vec![
                SpeakerVoice::parse("Speaker 1:Zephyr").unwrap(),
                SpeakerVoice::parse("Speaker 2:Puck").unwrap(),
            ];
            assert!(SpeakerVoice::validate_all(&speakers).is_ok());
        }

        #[test]
        fn validate_all_rejects_duplicates() {
            let speakers = vec![
                SpeakerVoice::parse("Host:Zephyr").unwrap(),
                SpeakerVoice::parse("Host:Puck").unwrap(),
            ];
            assert!(SpeakerVoice::validate_all(&speakers).is_err());
        }

        #[test]
        fn validate_all_rejects_empty_lineup() {
            assert!(SpeakerVoice::validate_all(&[]).is_err());
        }
    }
}
