//! Chunk source and audio store implementations
//!
//! - `gemini_stream` - typed decoding of the streaming response body
//! - `http_source` - chunk source over a live HTTP response
//! - `memory` - chunk source over already received chunks
//! - `file_store` - audio store writing to the local filesystem

pub mod file_store;
pub mod gemini_stream;
pub mod http_source;
pub mod memory;

pub use file_store::FileAudioStore;
pub use gemini_stream::{StreamDecoder, decode_stream_body};
pub use http_source::HttpStreamSource;
pub use memory::VecChunkSource;
