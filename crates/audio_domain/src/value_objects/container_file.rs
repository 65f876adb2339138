//! Finalized, playable audio file contents

use bytes::Bytes;

/// Final bytes of one generation request plus the extension to store them
/// under
///
/// Built once by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerFile {
    data: Bytes,
    extension: &'static str,
    header_synthesized: bool,
}

impl ContainerFile {
    /// A payload that already carries its own container format
    #[must_use]
    pub(crate) const fn passthrough(data: Bytes, extension: &'static str) -> Self {
        Self {
            data,
            extension,
            header_synthesized: false,
        }
    }

    /// A raw payload that had a WAV header prepended
    #[must_use]
    pub(crate) const fn synthesized(data: Bytes, extension: &'static str) -> Self {
        Self {
            data,
            extension,
            header_synthesized: true,
        }
    }

    /// File contents
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// File extension including the leading dot, e.g. `.wav`
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        self.extension
    }

    /// Whether a WAV header was prepended to the payload
    #[must_use]
    pub const fn header_synthesized(&self) -> bool {
        self.header_synthesized
    }

    /// Total size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the file has no contents
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// File name for the given stem; the extension is only appended when the
    /// stem does not already end with it
    #[must_use]
    pub fn filename(&self, stem: &str) -> String {
        if stem.ends_with(self.extension) {
            stem.to_string()
        } else {
            format!("{stem}{}", self.extension)
        }
    }

    /// Consume into `(bytes, extension)`
    #[must_use]
    pub fn into_parts(self) -> (Bytes, &'static str) {
        (self.data, self.extension)
    }
}
