//! Domain layer for streamed TTS audio
//!
//! Turns an ordered sequence of streamed audio chunks into a single playable
//! file. Raw PCM payloads get a synthesized 44-byte RIFF/WAVE header, payloads
//! whose MIME type already names a container pass through untouched.
//!
//! Everything here is synchronous and free of I/O. Writing the result to disk
//! and talking to the remote model are the caller's business.
//!
//! # Example
//!
//! ```
//! use audio_domain::{AudioChunk, AudioNormalizer};
//!
//! let chunks = vec![
//!     AudioChunk::new(vec![0x01, 0x02], "audio/L16;rate=8000"),
//!     AudioChunk::new(vec![0x03, 0x04], "audio/L16;rate=8000"),
//! ];
//!
//! let normalizer = AudioNormalizer::new();
//! let file = normalizer.normalize(&chunks).unwrap();
//! assert_eq!(file.extension(), ".wav");
//! assert_eq!(file.len(), 44 + 4);
//! ```

pub mod errors;
pub mod normalizer;
pub mod value_objects;
pub mod wav;

pub use errors::DomainError;
pub use normalizer::AudioNormalizer;
pub use value_objects::*;
pub use wav::{WAV_HEADER_LEN, WavHeader, synthesize_header};
