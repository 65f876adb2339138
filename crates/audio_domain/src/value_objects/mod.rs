//! Value Objects - Immutable, identity-less audio primitives

mod audio_chunk;
mod audio_parameters;
mod container_file;
mod mime_type;

pub use audio_chunk::AudioChunk;
pub use audio_parameters::{AudioParameters, DEFAULT_BITS_PER_SAMPLE, DEFAULT_SAMPLE_RATE};
pub use container_file::ContainerFile;
pub use mime_type::{MimeType, WAV_EXTENSION, known_extension};
