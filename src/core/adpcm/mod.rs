// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! ADPCM stream decoder
//!
//! Turns ADPCM-compressed byte streams into interleaved 16-bit PCM for an
//! audio mixer that pulls buffers on demand.
//!
//! # Supported Variants
//!
//! | Variant   | Code bits | Channels | Block header          |
//! |-----------|-----------|----------|-----------------------|
//! | `oki`     | 4         | 1        | none                  |
//! | `ima`     | 4         | 1-2      | none                  |
//! | `ms-ima`  | 4         | 1-2      | 4 bytes (mono only)   |
//! | `ms`      | 4         | 1-2      | 7 bytes per channel   |
//! | `iss`     | 4         | 1-2      | 4 bytes per channel   |
//! | `apple`   | 4         | 1-2      | 2 bytes per packet    |
//! | `tinsel4` | 4         | 1        | 1 byte                |
//! | `tinsel6` | 6         | 1        | 1 byte                |
//! | `tinsel8` | 8         | 1        | 1 byte                |
//!
//! # Control Flow
//!
//! ```text
//! read_buffer (loop control)
//!   -> BufferFiller::fill
//!        -> block framer (header due?)
//!        -> variant decoder (one code -> one sample)
//! ```
//!
//! # Example
//!
//! ```
//! use adpcmx::core::adpcm::{AdpcmDecoder, AdpcmVariant, DecoderConfig};
//! use adpcmx::core::source::ReaderSource;
//!
//! let data = vec![0x08, 0x80, 0x17, 0x71];
//! let size = data.len() as u32;
//! let config = DecoderConfig::new(AdpcmVariant::Oki, 8000).channels(1);
//! let mut decoder = AdpcmDecoder::new(ReaderSource::from_bytes(data), size, config)?;
//!
//! let mut pcm = [0i16; 16];
//! let written = decoder.read_buffer(&mut pcm);
//! assert_eq!(written, 8);
//! assert!(decoder.end_of_data());
//! # Ok::<(), adpcmx::DecoderError>(())
//! ```

mod codec;
mod framer;
mod state;
mod tables;

#[cfg(test)]
mod tests;

pub use codec::CodecState;
pub use framer::BlockCursor;
pub use state::{ImaState, MsState, TinselState, IMA_MAX_STEP, OKI_MAX_STEP};

use crate::core::error::{DecoderError, Result};
use crate::core::source::ByteSource;
use codec::BufferFiller;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ADPCM flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdpcmVariant {
    /// OKI/Dialogic VOX
    #[serde(rename = "oki")]
    Oki,
    /// Generic IMA, nibble-interleaved when stereo
    #[serde(rename = "ima")]
    Ima,
    /// Microsoft IMA (WAV format 0x11)
    #[serde(rename = "ms-ima")]
    MsIma,
    /// Microsoft ADPCM (WAV format 0x02)
    #[serde(rename = "ms")]
    Ms,
    /// Tinsel 4-bit
    #[serde(rename = "tinsel4")]
    Tinsel4,
    /// Tinsel 6-bit
    #[serde(rename = "tinsel6")]
    Tinsel6,
    /// Tinsel 8-bit
    #[serde(rename = "tinsel8")]
    Tinsel8,
    /// Apple QuickTime IMA4
    #[serde(rename = "apple")]
    Apple,
    /// ISS IMA
    #[serde(rename = "iss")]
    Iss,
}

impl AdpcmVariant {
    /// Every variant
    pub const ALL: [AdpcmVariant; 9] = [
        AdpcmVariant::Oki,
        AdpcmVariant::Ima,
        AdpcmVariant::MsIma,
        AdpcmVariant::Ms,
        AdpcmVariant::Tinsel4,
        AdpcmVariant::Tinsel6,
        AdpcmVariant::Tinsel8,
        AdpcmVariant::Apple,
        AdpcmVariant::Iss,
    ];

    /// Short lowercase name, as used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            AdpcmVariant::Oki => "oki",
            AdpcmVariant::Ima => "ima",
            AdpcmVariant::MsIma => "ms-ima",
            AdpcmVariant::Ms => "ms",
            AdpcmVariant::Tinsel4 => "tinsel4",
            AdpcmVariant::Tinsel6 => "tinsel6",
            AdpcmVariant::Tinsel8 => "tinsel8",
            AdpcmVariant::Apple => "apple",
            AdpcmVariant::Iss => "iss",
        }
    }

    /// True if the data is framed in `block_align`-sized blocks
    pub fn requires_block_align(&self) -> bool {
        !matches!(self, AdpcmVariant::Oki | AdpcmVariant::Ima)
    }

    /// True for the Tinsel family
    pub fn is_mono_only(&self) -> bool {
        matches!(
            self,
            AdpcmVariant::Tinsel4 | AdpcmVariant::Tinsel6 | AdpcmVariant::Tinsel8
        )
    }

    /// Size of the per-block (or per-packet) header in bytes
    pub fn header_len(&self, channels: u8) -> u32 {
        let channels = u32::from(channels);
        match self {
            AdpcmVariant::Oki | AdpcmVariant::Ima => 0,
            AdpcmVariant::MsIma if channels == 1 => 4,
            AdpcmVariant::MsIma => 0,
            AdpcmVariant::Ms => 7 * channels,
            AdpcmVariant::Iss => 4 * channels,
            AdpcmVariant::Apple => 2,
            AdpcmVariant::Tinsel4 | AdpcmVariant::Tinsel6 | AdpcmVariant::Tinsel8 => 1,
        }
    }
}

impl fmt::Display for AdpcmVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdpcmVariant {
    type Err = DecoderError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        AdpcmVariant::ALL
            .into_iter()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| DecoderError::UnknownVariant(s.to_string()))
    }
}

/// Decoder construction parameters
///
/// Immutable once a decoder is built. Defaults follow the common engine
/// call: two channels, no block alignment, play once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// ADPCM flavour
    pub variant: AdpcmVariant,

    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// Channel count (1 or 2)
    #[serde(default = "default_channels")]
    pub channels: u8,

    /// Block size in bytes (0 = unframed)
    #[serde(default)]
    pub block_align: u32,

    /// Times to play the stream (0 = forever)
    #[serde(default = "default_loop_count")]
    pub loop_count: u32,
}

fn default_channels() -> u8 {
    2
}

fn default_loop_count() -> u32 {
    1
}

impl DecoderConfig {
    /// Create a configuration with default channels, block size and loops
    pub fn new(variant: AdpcmVariant, sample_rate: u32) -> Self {
        Self {
            variant,
            sample_rate,
            channels: default_channels(),
            block_align: 0,
            loop_count: default_loop_count(),
        }
    }

    /// Set the channel count
    pub fn channels(mut self, channels: u8) -> Self {
        self.channels = channels;
        self
    }

    /// Set the block alignment
    pub fn block_align(mut self, block_align: u32) -> Self {
        self.block_align = block_align;
        self
    }

    /// Set the loop count (0 = forever)
    pub fn loop_count(mut self, loop_count: u32) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Check the configuration against the variant's constraints
    ///
    /// # Returns
    ///
    /// - `Ok(())` if a decoder can be built from this configuration
    /// - `Err(DecoderError::UnsupportedChannels)` for a bad channel count
    /// - `Err(DecoderError::MissingBlockAlign)` if framing data is missing
    /// - `Err(DecoderError::BlockTooSmall)` if a block cannot hold its header
    pub fn validate(&self) -> Result<()> {
        let variant = self.variant;

        if !(1..=2).contains(&self.channels) || (variant.is_mono_only() && self.channels != 1) {
            return Err(DecoderError::UnsupportedChannels {
                variant,
                channels: self.channels,
            });
        }

        if variant.requires_block_align() && self.block_align == 0 {
            return Err(DecoderError::MissingBlockAlign { variant });
        }

        let header = variant.header_len(self.channels);
        if variant.requires_block_align() && header > self.block_align {
            return Err(DecoderError::BlockTooSmall {
                variant,
                block_align: self.block_align,
                header,
            });
        }

        Ok(())
    }

    /// Block size seen by the block framer; 0 when the variant has no
    /// per-block header (Apple packets frame themselves)
    pub(crate) fn framing_block_align(&self) -> u32 {
        match self.variant {
            AdpcmVariant::Oki | AdpcmVariant::Ima | AdpcmVariant::Apple => 0,
            AdpcmVariant::MsIma if self.channels != 1 => 0,
            _ => self.block_align,
        }
    }
}

/// Position of the logical stream within the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCursor {
    /// Source offset of the first stream byte
    pub start: u64,

    /// Source offset one past the last stream byte
    pub end: u64,

    /// Completed passes over the stream
    pub current_loop: u32,
}

/// ADPCM decoder with loop control
///
/// Owns or borrows (`&mut S`) its byte source. Dropping an owning decoder
/// drops the source; [`AdpcmDecoder::into_inner`] hands it back instead.
pub struct AdpcmDecoder<S: ByteSource> {
    source: S,
    config: DecoderConfig,
    filler: BufferFiller,
    cursor: StreamCursor,

    /// Samples produced since the last (re)start of the stream
    pass_samples: u64,

    /// Terminal state: loop budget spent
    finished: bool,
}

impl<S: ByteSource> AdpcmDecoder<S> {
    /// Create a decoder over `stream_size` bytes starting at the source's
    /// current position
    ///
    /// # Arguments
    ///
    /// * `source` - Compressed data, positioned at the stream start
    /// * `stream_size` - Declared stream length in bytes
    /// * `config` - Variant and stream parameters
    ///
    /// # Returns
    ///
    /// - `Ok(AdpcmDecoder)` ready to decode
    /// - `Err(DecoderError)` if the configuration is invalid
    pub fn new(source: S, stream_size: u32, config: DecoderConfig) -> Result<Self> {
        config.validate()?;

        let start = source.pos();
        let end = start + u64::from(stream_size);

        log::debug!(
            "ADPCM decoder: variant={}, rate={}, channels={}, block_align={}, loops={}, bytes {}..{}",
            config.variant,
            config.sample_rate,
            config.channels,
            config.block_align,
            config.loop_count,
            start,
            end
        );

        Ok(Self {
            filler: BufferFiller::new(&config, end),
            source,
            config,
            cursor: StreamCursor {
                start,
                end,
                current_loop: 0,
            },
            pass_samples: 0,
            finished: false,
        })
    }

    /// Fill `buffer` with interleaved PCM samples
    ///
    /// Restarts the stream from its first byte whenever a pass ends and the
    /// loop budget allows, so one call can span a loop boundary.
    ///
    /// # Returns
    ///
    /// Number of samples written. Fewer than `buffer.len()` means the data
    /// is exhausted; 0 once the decoder has finished.
    pub fn read_buffer(&mut self, buffer: &mut [i16]) -> usize {
        let mut written = 0;

        while !self.finished {
            let produced = self.filler.fill(&mut self.source, &mut buffer[written..]);
            written += produced;
            self.pass_samples += produced as u64;

            let pass_over =
                written < buffer.len() || self.filler.is_exhausted(&self.source);
            if !pass_over {
                break;
            }

            self.cursor.current_loop = self.cursor.current_loop.saturating_add(1);

            if !self.loops_remaining() {
                log::debug!(
                    "ADPCM stream finished after {} pass(es)",
                    self.cursor.current_loop
                );
                self.finished = true;
                break;
            }

            if self.pass_samples == 0 {
                log::warn!("ADPCM stream produced no samples, not looping");
                self.finished = true;
                break;
            }

            log::debug!(
                "ADPCM loop {} done, restarting at offset {}",
                self.cursor.current_loop,
                self.cursor.start
            );
            if let Err(e) = self.restart() {
                log::error!("ADPCM loop restart failed: {}", e);
                self.finished = true;
                break;
            }

            if written == buffer.len() {
                break;
            }
        }

        written
    }

    /// True if the source is interleaved stereo
    pub fn is_stereo(&self) -> bool {
        self.config.channels == 2
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// True once no further samples will be produced
    pub fn end_of_data(&self) -> bool {
        if self.finished {
            return true;
        }
        let last_pass = self.config.loop_count != 0
            && self.cursor.current_loop.saturating_add(1) >= self.config.loop_count;
        last_pass && self.filler.is_exhausted(&self.source)
    }

    /// Channel count
    pub fn channels(&self) -> u8 {
        self.config.channels
    }

    /// ADPCM flavour being decoded
    pub fn variant(&self) -> AdpcmVariant {
        self.config.variant
    }

    /// Construction parameters
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Completed passes over the stream
    pub fn current_loop(&self) -> u32 {
        self.cursor.current_loop
    }

    /// Stream position and loop counter
    pub fn cursor(&self) -> StreamCursor {
        self.cursor
    }

    /// Block headers read since construction
    pub fn blocks_read(&self) -> u64 {
        self.filler.headers_read()
    }

    /// Current variant state
    pub fn codec_state(&self) -> &CodecState {
        self.filler.codec()
    }

    /// Start over from the first stream byte with a fresh loop budget
    pub fn rewind(&mut self) -> Result<()> {
        self.restart()?;
        self.cursor.current_loop = 0;
        self.finished = false;
        Ok(())
    }

    /// Release the byte source
    pub fn into_inner(self) -> S {
        self.source
    }

    fn loops_remaining(&self) -> bool {
        self.config.loop_count == 0 || self.cursor.current_loop < self.config.loop_count
    }

    fn restart(&mut self) -> Result<()> {
        self.filler.reset();
        self.pass_samples = 0;
        self.source.seek(self.cursor.start)
    }
}
