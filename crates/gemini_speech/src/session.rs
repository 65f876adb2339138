//! Generation session
//!
//! Drives one generation from streamed chunks to a stored file: drain the
//! chunk source in arrival order, normalize the payload and hand the result
//! to the audio store.

use std::fmt;
use std::sync::Arc;

use audio_domain::{AudioChunk, AudioNormalizer};
use tracing::{debug, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::{AudioStore, ChunkSource};
use crate::providers::file_store::FileAudioStore;
use crate::types::GeneratedAudio;

/// Turns one streamed generation into a stored audio file
#[derive(Clone)]
pub struct GenerationSession {
    normalizer: AudioNormalizer,
    store: Arc<dyn AudioStore>,
}

impl fmt::Debug for GenerationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationSession")
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

impl GenerationSession {
    /// Create a session writing through `store`
    #[must_use]
    pub fn new(normalizer: AudioNormalizer, store: Arc<dyn AudioStore>) -> Self {
        Self { normalizer, store }
    }

    /// Create a session writing to the configured output directory
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn from_config(config: &SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;
        Ok(Self::new(
            AudioNormalizer::new(),
            Arc::new(FileAudioStore::from_config(config)),
        ))
    }

    /// Drain `source`, normalize the audio and store it under `stem`
    ///
    /// The first chunk's MIME type governs the whole generation.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::NoAudioGenerated` if the source yields no
    /// chunks, in which case nothing is written. Source and store errors are
    /// passed through unchanged.
    #[instrument(skip(self, source))]
    pub async fn run<S>(&self, source: &mut S, stem: &str) -> Result<GeneratedAudio, SpeechError>
    where
        S: ChunkSource + ?Sized,
    {
        let chunks = Self::drain(source).await?;
        let file = self.normalizer.normalize(&chunks)?;

        let path = self.store.store(&file, stem).await?;

        debug!(
            path = %path.display(),
            chunk_count = chunks.len(),
            size_bytes = file.len(),
            "Generation stored"
        );

        Ok(GeneratedAudio {
            path,
            extension: file.extension().to_string(),
            size_bytes: file.len(),
            chunk_count: chunks.len(),
            header_synthesized: file.header_synthesized(),
        })
    }

    async fn drain<S>(source: &mut S) -> Result<Vec<AudioChunk>, SpeechError>
    where
        S: ChunkSource + ?Sized,
    {
        let mut chunks: Vec<AudioChunk> = Vec::new();
        while let Some(chunk) = source.next_chunk().await? {
            if let Some(first) = chunks
                .first()
                .filter(|first| first.mime_type() != chunk.mime_type())
            {
                warn!(
                    expected = %first.mime_type(),
                    received = %chunk.mime_type(),
                    "Chunk MIME type differs from first chunk"
                );
            }
            chunks.push(chunk);
        }
        Ok(chunks)
    }
}
