//! A single streamed unit of audio

use bytes::Bytes;

use crate::value_objects::MimeType;

/// Raw audio bytes tagged with the MIME type they arrived under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    data: Bytes,
    mime_type: MimeType,
}

impl AudioChunk {
    /// Create a new chunk
    #[must_use]
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<MimeType>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Raw payload bytes
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// MIME type the chunk was received under
    #[must_use]
    pub const fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    /// Payload size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Split the chunk into payload and MIME type
    #[must_use]
    pub fn into_parts(self) -> (Bytes, MimeType) {
        (self.data, self.mime_type)
    }
}
