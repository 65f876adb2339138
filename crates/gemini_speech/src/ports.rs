//! Port definitions for speech generation
//!
//! Defines the traits (ports) the generation session talks to: where audio
//! chunks come from and where finished files go.

use std::path::PathBuf;

use async_trait::async_trait;
use audio_domain::{AudioChunk, ContainerFile};

use crate::error::SpeechError;

/// Port for an ordered source of streamed audio chunks
///
/// # Example
///
/// ```ignore
/// use gemini_speech::{ChunkSource, SpeechError};
///
/// async fn count_bytes(source: &mut impl ChunkSource) -> Result<usize, SpeechError> {
///     let mut total = 0;
///     while let Some(chunk) = source.next_chunk().await? {
///         total += chunk.len();
///     }
///     Ok(total)
/// }
/// ```
#[async_trait]
pub trait ChunkSource: Send {
    /// Get the next chunk in arrival order
    ///
    /// # Returns
    ///
    /// Returns `None` once the upstream stream has ended.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the stream fails or cannot be decoded.
    async fn next_chunk(&mut self) -> Result<Option<AudioChunk>, SpeechError>;
}

/// Port for persisting finalized audio
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Store a finalized file under `stem`
    ///
    /// # Arguments
    ///
    /// * `file` - Finalized bytes and extension
    /// * `stem` - File name without extension
    ///
    /// # Returns
    ///
    /// Returns the path the file was written to.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Storage` if the file cannot be written.
    async fn store(&self, file: &ContainerFile, stem: &str) -> Result<PathBuf, SpeechError>;
}
