//! Domain-level errors

use thiserror::Error;

/// Errors that can occur while normalizing audio
///
/// Unparseable MIME parameters and odd bit depths are not errors: they
/// degrade to defaults or truncate. The only loud failure is an empty chunk
/// set, because empty output would look like a valid zero-length clip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// No chunks were handed to the assembler
    #[error("No audio data generated")]
    EmptyChunkSet,
}
