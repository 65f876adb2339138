//! Audio payload normalization
//!
//! Streamed TTS audio arrives as an ordered run of chunks that share one MIME
//! type. The normalizer stitches them together and, when that MIME type does
//! not already name a playable container, prepends a WAV header built from
//! the MIME parameters.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::errors::DomainError;
use crate::value_objects::{AudioChunk, AudioParameters, ContainerFile, WAV_EXTENSION, known_extension};
use crate::wav::{WAV_HEADER_LEN, WavHeader};

/// Stateless chunk assembler and finalizer
///
/// Every method is a pure function of its arguments, so one normalizer can
/// be shared freely across concurrent sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioNormalizer;

impl AudioNormalizer {
    /// Create a new normalizer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Whether payloads under `mime_type` need a synthesized header
    #[must_use]
    pub fn needs_header(&self, mime_type: &str) -> bool {
        known_extension(mime_type).is_none()
    }

    /// Concatenate chunk payloads in arrival order
    ///
    /// MIME types are not checked; callers hand in one homogeneous run.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyChunkSet` if `chunks` is empty.
    pub fn concatenate(&self, chunks: &[AudioChunk]) -> Result<Bytes, DomainError> {
        match chunks {
            [] => Err(DomainError::EmptyChunkSet),
            [single] => Ok(single.data().clone()),
            _ => {
                let total = chunks.iter().map(AudioChunk::len).sum();
                let mut combined = BytesMut::with_capacity(total);
                for chunk in chunks {
                    combined.put_slice(chunk.data());
                }
                Ok(combined.freeze())
            },
        }
    }

    /// Turn a concatenated payload into a playable file
    ///
    /// Payloads under a known container MIME type are returned untouched with
    /// that type's extension. Anything else is treated as raw PCM and gets a
    /// 44-byte WAV header.
    ///
    /// Finalizing is not idempotent: running it again on already finalized
    /// output with the same raw MIME type stacks a second header. Finalize
    /// exactly once per chunk set.
    #[must_use]
    pub fn finalize(&self, payload: Bytes, mime_type: &str) -> ContainerFile {
        if let Some(extension) = known_extension(mime_type) {
            return ContainerFile::passthrough(payload, extension);
        }

        let params = AudioParameters::parse(mime_type);
        let header = WavHeader::for_payload(payload.len(), params);

        debug!(
            mime_type,
            payload_bytes = payload.len(),
            sample_rate = header.sample_rate,
            bits_per_sample = header.bits_per_sample,
            "Synthesizing WAV header for raw PCM payload"
        );

        let mut file = BytesMut::with_capacity(WAV_HEADER_LEN + payload.len());
        file.put_slice(&header.to_bytes());
        file.put_slice(&payload);

        ContainerFile::synthesized(file.freeze(), WAV_EXTENSION)
    }

    /// Concatenate and finalize in one step, using the first chunk's MIME type
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyChunkSet` if `chunks` is empty.
    pub fn normalize(&self, chunks: &[AudioChunk]) -> Result<ContainerFile, DomainError> {
        let payload = self.concatenate(chunks)?;
        let mime_type = chunks
            .first()
            .map(|chunk| chunk.mime_type().as_str())
            .ok_or(DomainError::EmptyChunkSet)?;

        Ok(self.finalize(payload, mime_type))
    }
}
