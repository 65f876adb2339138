//! RIFF/WAVE header for mono linear PCM
//!
//! The header is always exactly [`WAV_HEADER_LEN`] bytes: the RIFF group
//! header, a 16-byte `fmt ` sub-chunk and the `data` sub-chunk header.
//! Downstream tooling relies on `output[..44]` being the whole header.
//!
//! ```text
//! offset  size  field
//!      0     4  "RIFF"
//!      4     4  chunk_size = 36 + payload_length
//!      8     4  "WAVE"
//!     12     4  "fmt "
//!     16     4  16
//!     20     2  1 (linear PCM)
//!     22     2  num_channels
//!     24     4  sample_rate
//!     28     4  byte_rate
//!     32     2  block_align
//!     34     2  bits_per_sample
//!     36     4  "data"
//!     40     4  payload_length
//! ```

use bytes::{Buf, BufMut};

use crate::value_objects::AudioParameters;

/// Size of the synthesized header in bytes
pub const WAV_HEADER_LEN: usize = 44;

const RIFF_TAG: &[u8; 4] = b"RIFF";
const WAVE_TAG: &[u8; 4] = b"WAVE";
const FMT_TAG: &[u8; 4] = b"fmt ";
const DATA_TAG: &[u8; 4] = b"data";

const FMT_CHUNK_SIZE: u32 = 16;
const LINEAR_PCM: u16 = 1;
const MONO: u16 = 1;
// "WAVE" + fmt sub-chunk (8 + 16) + data sub-chunk header (8)
const RIFF_OVERHEAD: u32 = 36;

/// Decoded fields of a canonical 44-byte WAV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    /// Size of everything after the first 8 bytes
    pub chunk_size: u32,
    /// Format code, 1 for linear PCM
    pub audio_format: u16,
    /// Number of interleaved channels
    pub num_channels: u16,
    /// Samples per second
    pub sample_rate: u32,
    /// Bytes per second
    pub byte_rate: u32,
    /// Bytes per sample frame across all channels
    pub block_align: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
    /// Length of the PCM payload following the header
    pub data_size: u32,
}

impl WavHeader {
    /// Header describing a mono PCM payload of `payload_length` bytes
    ///
    /// Bit depths that are not a multiple of 8 truncate `block_align`.
    /// Payloads beyond `u32::MAX` bytes and oversized byte rates saturate
    /// instead of wrapping.
    #[must_use]
    pub fn for_payload(payload_length: usize, params: AudioParameters) -> Self {
        let data_size = u32::try_from(payload_length).unwrap_or(u32::MAX);
        let block_align = MONO.saturating_mul(params.bytes_per_sample());

        Self {
            chunk_size: data_size.saturating_add(RIFF_OVERHEAD),
            audio_format: LINEAR_PCM,
            num_channels: MONO,
            sample_rate: params.sample_rate(),
            byte_rate: params.sample_rate().saturating_mul(u32::from(block_align)),
            block_align,
            bits_per_sample: params.bits_per_sample(),
            data_size,
        }
    }

    /// Encode into the 44-byte little-endian layout
    #[must_use]
    pub fn to_bytes(&self) -> [u8; WAV_HEADER_LEN] {
        let mut header = [0u8; WAV_HEADER_LEN];
        let mut buf = &mut header[..];

        buf.put_slice(RIFF_TAG);
        buf.put_u32_le(self.chunk_size);
        buf.put_slice(WAVE_TAG);
        buf.put_slice(FMT_TAG);
        buf.put_u32_le(FMT_CHUNK_SIZE);
        buf.put_u16_le(self.audio_format);
        buf.put_u16_le(self.num_channels);
        buf.put_u32_le(self.sample_rate);
        buf.put_u32_le(self.byte_rate);
        buf.put_u16_le(self.block_align);
        buf.put_u16_le(self.bits_per_sample);
        buf.put_slice(DATA_TAG);
        buf.put_u32_le(self.data_size);

        header
    }

    /// Read a canonical header from the start of `bytes`
    ///
    /// Returns `None` if fewer than 44 bytes are available, a tag does not
    /// match, or the `fmt ` sub-chunk is not the 16-byte PCM form.
    #[must_use]
    pub fn read(bytes: &[u8]) -> Option<Self> {
        let mut buf = bytes.get(..WAV_HEADER_LEN)?;

        expect_tag(&mut buf, RIFF_TAG)?;
        let chunk_size = buf.get_u32_le();
        expect_tag(&mut buf, WAVE_TAG)?;
        expect_tag(&mut buf, FMT_TAG)?;
        if buf.get_u32_le() != FMT_CHUNK_SIZE {
            return None;
        }
        let audio_format = buf.get_u16_le();
        let num_channels = buf.get_u16_le();
        let sample_rate = buf.get_u32_le();
        let byte_rate = buf.get_u32_le();
        let block_align = buf.get_u16_le();
        let bits_per_sample = buf.get_u16_le();
        expect_tag(&mut buf, DATA_TAG)?;
        let data_size = buf.get_u32_le();

        Some(Self {
            chunk_size,
            audio_format,
            num_channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            data_size,
        })
    }

    /// Audio parameters declared by this header
    #[must_use]
    pub const fn parameters(&self) -> AudioParameters {
        AudioParameters::new(self.bits_per_sample, self.sample_rate)
    }
}

/// Synthesize the 44-byte header for a mono PCM payload
///
/// # Examples
///
/// ```
/// use audio_domain::{AudioParameters, synthesize_header};
///
/// let header = synthesize_header(6, AudioParameters::new(16, 8000));
/// assert_eq!(&header[..4], b"RIFF");
/// assert_eq!(u32::from_le_bytes([header[4], header[5], header[6], header[7]]), 42);
/// ```
#[must_use]
pub fn synthesize_header(payload_length: usize, params: AudioParameters) -> [u8; WAV_HEADER_LEN] {
    WavHeader::for_payload(payload_length, params).to_bytes()
}

fn expect_tag(buf: &mut &[u8], tag: &[u8; 4]) -> Option<()> {
    let (head, rest) = buf.split_first_chunk::<4>()?;
    if head != tag {
        return None;
    }
    *buf = rest;
    Some(())
}
