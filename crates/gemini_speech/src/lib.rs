//! Gemini Speech - streamed TTS output to playable audio files
//!
//! Takes the streamed response of a Gemini text-to-speech generation,
//! decodes its inline audio chunks and stores the normalized result.
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports) a session talks to
//! - `providers` module contains concrete implementations (adapters)
//! - `session` drives a chunk source through the `audio_domain` normalizer
//!   into an audio store
//!
//! # Example
//!
//! ```ignore
//! use gemini_speech::{GenerationSession, HttpStreamSource, SpeechConfig};
//!
//! let config = SpeechConfig::default();
//! let session = GenerationSession::from_config(&config)?;
//!
//! // `response` is the reply to an already issued streamGenerateContent call
//! let mut source = HttpStreamSource::from_response(response, &config).await?;
//! let generated = session
//!     .run(&mut source, &config.single_speaker_stem(None))
//!     .await?;
//! println!("Saved {}", generated.path.display());
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod providers;
pub mod session;
pub mod types;

pub use config::{INTERVIEW_STEM, SpeechConfig};
pub use error::SpeechError;
pub use ports::{AudioStore, ChunkSource};
pub use providers::{
    FileAudioStore, HttpStreamSource, StreamDecoder, VecChunkSource, decode_stream_body,
};
pub use session::GenerationSession;
pub use types::{GeneratedAudio, SpeakerVoice, Voice};
