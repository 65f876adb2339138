//! Typed decoding of streamed `generateContent` responses
//!
//! The streaming endpoint delivers a sequence of `GenerateContentResponse`
//! objects, each of which may carry base64 inline audio. Depending on how
//! the request was issued the body is framed as
//!
//! - a JSON array of responses,
//! - back-to-back (usually newline-delimited) JSON objects, or
//! - server-sent events with one response per `data:` payload.
//!
//! [`StreamDecoder`] detects the framing from the first non-whitespace byte
//! and turns arbitrarily split body bytes into ordered [`AudioChunk`]s.

use audio_domain::{AudioChunk, MimeType};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::SpeechError;

/// One streamed response object
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidates in this response; the TTS model sends one
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// A generated candidate
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content, absent on some terminal responses
    #[serde(default)]
    pub content: Option<Content>,
    /// Why generation stopped, on the last response
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content parts of a candidate
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Parts in order
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content part
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text the model produced instead of or alongside audio
    #[serde(default)]
    pub text: Option<String>,
    /// Inline binary payload
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

/// Base64 payload with its MIME type
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type of the decoded bytes, e.g. `audio/L16;codec=pcm;rate=24000`
    pub mime_type: String,
    /// Standard base64 encoded bytes
    #[serde(default)]
    pub data: String,
}

impl InlineData {
    /// Decode into an audio chunk
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::InvalidAudio` if `data` is not valid base64.
    pub fn decode(&self) -> Result<AudioChunk, SpeechError> {
        let bytes = STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| SpeechError::InvalidAudio(format!("Failed to decode inline data: {e}")))?;

        Ok(AudioChunk::new(
            Bytes::from(bytes),
            MimeType::parse(&self.mime_type),
        ))
    }
}

impl GenerateContentResponse {
    /// Audio chunks carried by this response, in candidate and part order
    ///
    /// Text parts and inline data with an empty payload are skipped.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::InvalidAudio` if inline data is not valid base64.
    pub fn audio_chunks(&self) -> Result<Vec<AudioChunk>, SpeechError> {
        let mut chunks = Vec::new();

        for content in self.candidates.iter().filter_map(|c| c.content.as_ref()) {
            for part in &content.parts {
                if let Some(text) = &part.text {
                    debug!(text_len = text.len(), "Skipping text part in audio stream");
                }
                if let Some(inline) = part.inline_data.as_ref().filter(|i| !i.data.is_empty()) {
                    chunks.push(inline.decode()?);
                }
            }
        }

        Ok(chunks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Framing {
    #[default]
    Undetermined,
    JsonArray,
    JsonObjects,
    ServerSentEvents,
}

/// Incremental decoder for streamed response bodies
#[derive(Debug, Default)]
pub struct StreamDecoder {
    framing: Framing,
    buffer: Vec<u8>,
    /// Leading buffer bytes already searched for a line or object end
    scanned: usize,
    event_data: String,
}

impl StreamDecoder {
    /// Create a decoder that has seen no bytes yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next slice of body bytes
    ///
    /// Returns the chunks from every response completed by these bytes.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::InvalidResponse` for malformed framing or JSON
    /// and `SpeechError::InvalidAudio` for undecodable inline data.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<AudioChunk>, SpeechError> {
        self.buffer.extend_from_slice(bytes);

        if self.framing == Framing::Undetermined {
            let Some(first) = self.buffer.iter().copied().find(|b| !b.is_ascii_whitespace()) else {
                return Ok(Vec::new());
            };
            self.framing = match first {
                b'[' => Framing::JsonArray,
                b'{' => Framing::JsonObjects,
                _ => Framing::ServerSentEvents,
            };
            debug!(framing = ?self.framing, "Detected response framing");
        }

        match self.framing {
            Framing::Undetermined | Framing::JsonArray => Ok(Vec::new()),
            Framing::JsonObjects => self.drain_objects(),
            Framing::ServerSentEvents => self.drain_lines(),
        }
    }

    /// Signal the end of the body and flush whatever is left
    ///
    /// The decoder is reset and may be reused afterwards.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::InvalidResponse` if the body ended mid-response.
    pub fn finish(&mut self) -> Result<Vec<AudioChunk>, SpeechError> {
        let framing = std::mem::take(&mut self.framing);

        let chunks = match framing {
            Framing::Undetermined => Vec::new(),
            Framing::JsonArray => {
                let responses: Vec<GenerateContentResponse> =
                    serde_json::from_slice(&self.buffer).map_err(|e| {
                        SpeechError::InvalidResponse(format!("Malformed response array: {e}"))
                    })?;
                let mut chunks = Vec::new();
                for response in &responses {
                    chunks.extend(response.audio_chunks()?);
                }
                chunks
            },
            Framing::JsonObjects => {
                let chunks = self.drain_objects()?;
                if self.buffer.iter().any(|b| !b.is_ascii_whitespace()) {
                    return Err(SpeechError::InvalidResponse(
                        "Response body ended inside a JSON object".to_string(),
                    ));
                }
                chunks
            },
            Framing::ServerSentEvents => {
                let mut chunks = self.drain_lines()?;
                if !self.buffer.is_empty() {
                    let line = std::mem::take(&mut self.buffer);
                    self.handle_sse_line(&utf8(&line)?, &mut chunks)?;
                }
                self.dispatch_event(&mut chunks)?;
                chunks
            },
        };

        self.buffer.clear();
        self.scanned = 0;
        self.event_data.clear();
        Ok(chunks)
    }

    fn drain_objects(&mut self) -> Result<Vec<AudioChunk>, SpeechError> {
        // An object can only have completed if a closing brace arrived
        if !self.buffer[self.scanned..].contains(&b'}') {
            self.scanned = self.buffer.len();
            return Ok(Vec::new());
        }

        let mut chunks = Vec::new();
        let mut consumed = 0;

        {
            let mut stream = serde_json::Deserializer::from_slice(&self.buffer)
                .into_iter::<GenerateContentResponse>();
            loop {
                match stream.next() {
                    Some(Ok(response)) => {
                        consumed = stream.byte_offset();
                        chunks.extend(response.audio_chunks()?);
                    },
                    Some(Err(e)) if e.is_eof() => break,
                    Some(Err(e)) => {
                        return Err(SpeechError::InvalidResponse(format!(
                            "Malformed response object: {e}"
                        )));
                    },
                    None => {
                        consumed = stream.byte_offset();
                        break;
                    },
                }
            }
        }

        self.buffer.drain(..consumed);
        self.scanned = self.buffer.len();
        Ok(chunks)
    }

    fn drain_lines(&mut self) -> Result<Vec<AudioChunk>, SpeechError> {
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut search_from = self.scanned;

        while let Some(offset) = self.buffer[search_from..].iter().position(|&b| b == b'\n') {
            let end = search_from + offset + 1;
            let line = utf8(&self.buffer[start..end])?;
            self.handle_sse_line(&line, &mut chunks)?;
            start = end;
            search_from = end;
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();
        Ok(chunks)
    }

    fn handle_sse_line(
        &mut self,
        line: &str,
        chunks: &mut Vec<AudioChunk>,
    ) -> Result<(), SpeechError> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.is_empty() {
            return self.dispatch_event(chunks);
        }
        if line.starts_with(':') {
            return Ok(());
        }

        let (field, value) = line
            .split_once(':')
            .map_or((line, ""), |(field, value)| {
                (field, value.strip_prefix(' ').unwrap_or(value))
            });

        // event, id and retry fields carry nothing we need
        if field == "data" {
            if !self.event_data.is_empty() {
                self.event_data.push('\n');
            }
            self.event_data.push_str(value);
        }

        Ok(())
    }

    fn dispatch_event(&mut self, chunks: &mut Vec<AudioChunk>) -> Result<(), SpeechError> {
        if self.event_data.is_empty() {
            return Ok(());
        }

        let data = std::mem::take(&mut self.event_data);
        if data.trim() == "[DONE]" {
            return Ok(());
        }
        let response: GenerateContentResponse = serde_json::from_str(&data)
            .map_err(|e| SpeechError::InvalidResponse(format!("Malformed event payload: {e}")))?;
        chunks.extend(response.audio_chunks()?);
        Ok(())
    }
}

fn utf8(bytes: &[u8]) -> Result<String, SpeechError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| SpeechError::InvalidResponse(format!("Response is not UTF-8: {e}")))
}

/// Decode a complete response body into ordered audio chunks
///
/// # Errors
///
/// Returns `SpeechError::InvalidResponse` or `SpeechError::InvalidAudio` if
/// the body cannot be decoded.
#[instrument(skip(body), fields(body_bytes = body.len()))]
pub fn decode_stream_body(body: &[u8]) -> Result<Vec<AudioChunk>, SpeechError> {
    let mut decoder = StreamDecoder::new();
    let mut chunks = decoder.push(body)?;
    chunks.extend(decoder.finish()?);
    debug!(chunk_count = chunks.len(), "Decoded response body");
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PCM_MIME: &str = "audio/L16;codec=pcm;rate=24000";

    fn response_json(payloads: &[&[u8]]) -> String {
        let parts: Vec<_> = payloads
            .iter()
            .map(|p| {
                serde_json::json!({
                    "inlineData": { "mimeType": PCM_MIME, "data": STANDARD.encode(p) }
                })
            })
            .collect();
        serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": parts } }],
            "usageMetadata": { "promptTokenCount": 5 }
        })
        .to_string()
    }

    fn payloads(chunks: &[AudioChunk]) -> Vec<Vec<u8>> {
        chunks.iter().map(|c| c.data().to_vec()).collect()
    }

    #[test]
    fn audio_chunks_decode_inline_data() {
        let response: GenerateContentResponse =
            serde_json::from_str(&response_json(&[b"\x01\x02", b"\x03"])).unwrap();
        let chunks = response.audio_chunks().unwrap();

        assert_eq!(payloads(&chunks), vec![vec![1, 2], vec![3]]);
        assert_eq!(chunks[0].mime_type().as_str(), PCM_MIME);
    }

    #[test]
    fn audio_chunks_skip_text_and_empty_parts() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "hello" },
                    { "inlineData": { "mimeType": "audio/wav", "data": "" } },
                    { "inlineData": { "mimeType": "audio/wav", "data": "UklGRg==" } }
                ] }
            }, {
                "finishReason": "STOP"
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let chunks = response.audio_chunks().unwrap();

        assert_eq!(payloads(&chunks), vec![b"RIFF".to_vec()]);
    }

    #[test]
    fn audio_chunks_reject_bad_base64() {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "audio/wav", "data": "not base64!" } }
            ] } }]
        });
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert!(matches!(
            response.audio_chunks(),
            Err(SpeechError::InvalidAudio(_))
        ));
    }

    #[test]
    fn decodes_json_array_body() {
        let body = format!("[{},{}]", response_json(&[b"ab"]), response_json(&[b"cd"]));
        let chunks = decode_stream_body(body.as_bytes()).unwrap();
        assert_eq!(payloads(&chunks), vec![b"ab".to_vec(), b"cd".to_vec()]);
    }

    #[test]
    fn decodes_newline_delimited_objects() {
        let body = format!("{}\n{}\n", response_json(&[b"ab"]), response_json(&[b"cd"]));
        let chunks = decode_stream_body(body.as_bytes()).unwrap();
        assert_eq!(payloads(&chunks), vec![b"ab".to_vec(), b"cd".to_vec()]);
    }

    #[test]
    fn decodes_server_sent_events() {
        let body = format!(
            ": keep-alive\r\ndata: {}\r\n\r\nevent: message\ndata: {}\n\n",
            response_json(&[b"ab"]),
            response_json(&[b"cd"])
        );
        let chunks = decode_stream_body(body.as_bytes()).unwrap();
        assert_eq!(payloads(&chunks), vec![b"ab".to_vec(), b"cd".to_vec()]);
    }

    #[test]
    fn sse_done_marker_is_ignored() {
        let body = format!("data: {}\n\ndata: [DONE]\n\n", response_json(&[b"ab"]));
        let chunks = decode_stream_body(body.as_bytes()).unwrap();
        assert_eq!(payloads(&chunks), vec![b"ab".to_vec()]);
    }

    #[test]
    fn sse_event_without_trailing_blank_line_is_flushed() {
        let body = format!("data: {}", response_json(&[b"zz"]));
        let chunks = decode_stream_body(body.as_bytes()).unwrap();
        assert_eq!(payloads(&chunks), vec![b"zz".to_vec()]);
    }

    #[test]
    fn push_handles_arbitrary_splits() {
        let body = format!(
            "data: {}\n\ndata: {}\n\n",
            response_json(&[b"one"]),
            response_json(&[b"two"])
        );

        for split in 1..body.len() {
            let mut decoder = StreamDecoder::new();
            let (head, tail) = body.as_bytes().split_at(split);
            let mut chunks = decoder.push(head).unwrap();
            chunks.extend(decoder.push(tail).unwrap());
            chunks.extend(decoder.finish().unwrap());
            assert_eq!(
                payloads(&chunks),
                vec![b"one".to_vec(), b"two".to_vec()],
                "split at {split}"
            );
        }
    }

    fn feed_in_small_reads(decoder: &mut StreamDecoder, body: &[u8]) -> Vec<AudioChunk> {
        let mut chunks = Vec::new();
        for piece in body.chunks(64) {
            chunks.extend(decoder.push(piece).unwrap());
            // Partial input is searched once, not again on every read
            assert_eq!(decoder.scanned, decoder.buffer.len());
        }
        chunks.extend(decoder.finish().unwrap());
        chunks
    }

    #[test]
    fn long_event_in_small_reads_is_scanned_incrementally() {
        let audio = vec![7u8; 48 * 1024];
        let body = format!("data: {}\n\n", response_json(&[audio.as_slice()]));

        let chunks = feed_in_small_reads(&mut StreamDecoder::new(), body.as_bytes());
        assert_eq!(payloads(&chunks), vec![audio]);
    }

    #[test]
    fn long_object_in_small_reads_is_parsed_after_closing_brace() {
        let audio = vec![9u8; 48 * 1024];
        let body = format!("{}\n{}", response_json(&[audio.as_slice()]), response_json(&[b"end"]));

        let chunks = feed_in_small_reads(&mut StreamDecoder::new(), body.as_bytes());
        assert_eq!(payloads(&chunks), vec![audio, b"end".to_vec()]);
    }

    #[test]
    fn objects_are_emitted_as_soon_as_complete() {
        let first = response_json(&[b"ab"]);
        let mut decoder = StreamDecoder::new();

        let chunks = decoder.push(first.as_bytes()).unwrap();
        assert_eq!(chunks.len(), 1);

        let chunks = decoder.push(b"{\"candidates\":").unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn truncated_object_is_an_error() {
        let body = format!("{}\n{{\"candidates\": [", response_json(&[b"ab"]));
        let result = decode_stream_body(body.as_bytes());
        assert!(matches!(result, Err(SpeechError::InvalidResponse(_))));
    }

    #[test]
    fn malformed_array_is_an_error() {
        let result = decode_stream_body(b"[{\"candidates\": []},");
        assert!(matches!(result, Err(SpeechError::InvalidResponse(_))));
    }

    #[test]
    fn malformed_sse_payload_is_an_error() {
        let result = decode_stream_body(b"data: {not json}\n\n");
        assert!(matches!(result, Err(SpeechError::InvalidResponse(_))));
    }

    #[test]
    fn empty_body_yields_no_chunks() {
        assert!(decode_stream_body(b"").unwrap().is_empty());
        assert!(decode_stream_body(b"  \n ").unwrap().is_empty());
        assert!(decode_stream_body(b"[]").unwrap().is_empty());
    }

    #[test]
    fn response_without_audio_yields_no_chunks() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"I cannot do that"}]}}]}"#;
        assert!(decode_stream_body(body.as_bytes()).unwrap().is_empty());
    }
}
