//! In-memory chunk source
//!
//! Replays chunks that were already received, e.g. a saved response body.

use std::collections::VecDeque;

use async_trait::async_trait;
use audio_domain::AudioChunk;

use crate::error::SpeechError;
use crate::ports::ChunkSource;
use crate::providers::gemini_stream::decode_stream_body;

/// Chunk source backed by an in-memory queue
#[derive(Debug, Clone, Default)]
pub struct VecChunkSource {
    chunks: VecDeque<AudioChunk>,
}

impl VecChunkSource {
    /// Create a source yielding `chunks` in order
    #[must_use]
    pub fn new(chunks: impl IntoIterator<Item = AudioChunk>) -> Self {
        Self {
            chunks: chunks.into_iter().collect(),
        }
    }

    /// Create a source from a recorded streaming response body
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be decoded.
    pub fn from_stream_body(body: &[u8]) -> Result<Self, SpeechError> {
        decode_stream_body(body).map(Self::new)
    }

    /// Number of chunks not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }
}

#[async_trait]
impl ChunkSource for VecChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<AudioChunk>, SpeechError> {
        Ok(self.chunks.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn yields_chunks_in_order_then_none() {
        let mut source = VecChunkSource::new([
            AudioChunk::new(&b"a"[..], "audio/wav"),
            AudioChunk::new(&b"b"[..], "audio/wav"),
        ]);

        assert_eq!(source.remaining(), 2);
        let first = source.next_chunk().await.unwrap().unwrap();
        let second = source.next_chunk().await.unwrap().unwrap();
        assert_eq!(first.data().as_ref(), b"a");
        assert_eq!(second.data().as_ref(), b"b");
        assert!(source.next_chunk().await.unwrap().is_none());
        assert!(source.next_chunk().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn from_stream_body_decodes_recorded_response() {
        let body = br#"[{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"audio/L16;rate=8000","data":"AQI="}}]}}]}]"#;
        let mut source = VecChunkSource::from_stream_body(body).unwrap();

        let chunk = source.next_chunk().await.unwrap().unwrap();
        assert_eq!(chunk.data().as_ref(), &[1, 2]);
        assert_eq!(chunk.mime_type().as_str(), "audio/L16;rate=8000");
    }

    #[test]
    fn from_stream_body_rejects_garbage() {
        assert!(VecChunkSource::from_stream_body(b"[oops").is_err());
    }
}
