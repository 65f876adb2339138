//! PCM audio parameters derived from a MIME type
//!
//! # Examples
//!
//! ```
//! use audio_domain::AudioParameters;
//!
//! let params = AudioParameters::parse("audio/L16;rate=24000");
//! assert_eq!(params.bits_per_sample(), 16);
//! assert_eq!(params.sample_rate(), 24000);
//!
//! // Missing or broken parameters fall back to defaults
//! assert_eq!(AudioParameters::parse("audio/wav"), AudioParameters::default());
//! assert_eq!(AudioParameters::parse("audio/Lxx;rate=fast"), AudioParameters::default());
//! ```

use serde::{Deserialize, Serialize};

/// Bit depth assumed when the MIME type does not name one
pub const DEFAULT_BITS_PER_SAMPLE: u16 = 16;

/// Sample rate in Hz assumed when the MIME type does not name one
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

const RATE_PREFIX: &str = "rate=";
const LINEAR_PCM_PREFIX: &str = "audio/L";

/// Bit depth and sample rate of a raw PCM payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioParameters {
    bits_per_sample: u16,
    sample_rate: u32,
}

impl AudioParameters {
    /// Create parameters from explicit values
    #[must_use]
    pub const fn new(bits_per_sample: u16, sample_rate: u32) -> Self {
        Self {
            bits_per_sample,
            sample_rate,
        }
    }

    /// Parse parameters out of a MIME type string
    ///
    /// Never fails. Tokens are separated by `;` and trimmed. A token starting
    /// with `rate=` (any case) sets the sample rate, a token starting with
    /// `audio/L` (exact case) sets the bit depth. Values that do not parse
    /// leave the previous value in place, and later tokens overwrite earlier
    /// ones.
    #[must_use]
    pub fn parse(mime_type: &str) -> Self {
        let mut params = Self::default();

        for token in mime_type.split(';').map(str::trim) {
            if let Some(rate) = strip_prefix_ignore_case(token, RATE_PREFIX) {
                if let Ok(rate) = rate.trim().parse() {
                    params.sample_rate = rate;
                }
            } else if let Some(bits) = token.strip_prefix(LINEAR_PCM_PREFIX) {
                if let Ok(bits) = bits.trim().parse() {
                    params.bits_per_sample = bits;
                }
            }
        }

        params
    }

    /// Bits per sample
    #[must_use]
    pub const fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Whole bytes per sample; bit depths that are not a multiple of 8 truncate
    #[must_use]
    pub const fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }
}

impl Default for AudioParameters {
    fn default() -> Self {
        Self::new(DEFAULT_BITS_PER_SAMPLE, DEFAULT_SAMPLE_RATE)
    }
}

fn strip_prefix_ignore_case<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    let head = token.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &token[prefix.len()..])
}
