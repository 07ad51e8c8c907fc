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

//! Variant dispatch and buffer filling
//!
//! [`CodecState`] is a closed tagged union: each variant carries only the
//! channel state its algorithm needs. [`BufferFiller`] pulls one source
//! unit at a time (a byte, a pair of 32-bit words, or a packet group),
//! runs the block framer when a header is due and queues the decoded
//! samples. Samples that do not fit in the caller's buffer stay queued for
//! the next call, so requests of any size are honoured exactly.

use super::framer::{
    read_apple_packet_header, read_ima_header, read_ms_header, read_tinsel_header, BlockCursor,
};
use super::state::{ImaState, MsState, TinselState};
use super::tables::{TINSEL4_E_VAL, TINSEL6_E_VAL, TINSEL8_E_VAL};
use super::{AdpcmVariant, DecoderConfig};
use crate::core::source::ByteSource;
use std::collections::VecDeque;

/// Tinsel 6-bit unpacker: four codes spread over three bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tinsel6Chunk {
    /// Position within the 4-code group (0-3)
    pub(crate) phase: u8,

    /// Bit accumulator
    pub(crate) data: u16,
}

/// Per-variant decoder state
#[derive(Debug, Clone)]
pub enum CodecState {
    Oki(ImaState),
    Ima([ImaState; 2]),
    MsImaMono(ImaState),
    MsImaStereo([ImaState; 2]),
    Ms([MsState; 2]),
    Iss([ImaState; 2]),
    Apple([ImaState; 2]),
    Tinsel4(TinselState),
    Tinsel6 {
        state: TinselState,
        chunk: Tinsel6Chunk,
    },
    Tinsel8(TinselState),
}

impl CodecState {
    /// Fresh all-zero state for a variant and channel count
    pub fn new(variant: AdpcmVariant, channels: u8) -> Self {
        match variant {
            AdpcmVariant::Oki => CodecState::Oki(ImaState::default()),
            AdpcmVariant::Ima => CodecState::Ima([ImaState::default(); 2]),
            AdpcmVariant::MsIma if channels == 1 => CodecState::MsImaMono(ImaState::default()),
            AdpcmVariant::MsIma => CodecState::MsImaStereo([ImaState::default(); 2]),
            AdpcmVariant::Ms => CodecState::Ms([MsState::default(); 2]),
            AdpcmVariant::Iss => CodecState::Iss([ImaState::default(); 2]),
            AdpcmVariant::Apple => CodecState::Apple([ImaState::default(); 2]),
            AdpcmVariant::Tinsel4 => CodecState::Tinsel4(TinselState::default()),
            AdpcmVariant::Tinsel6 => CodecState::Tinsel6 {
                state: TinselState::default(),
                chunk: Tinsel6Chunk::default(),
            },
            AdpcmVariant::Tinsel8 => CodecState::Tinsel8(TinselState::default()),
        }
    }
}

/// Buffer filler: drives the framer and variant decoders
pub struct BufferFiller {
    codec: CodecState,
    variant: AdpcmVariant,
    channels: usize,
    block_align: u32,
    block: BlockCursor,

    /// Declared end of the stream (absolute source offset)
    end: u64,

    /// Decoded samples not yet handed to the caller
    pending: VecDeque<i16>,

    /// Per-channel decode area for Apple packet groups
    scratch: Vec<i16>,
}

impl BufferFiller {
    /// Create a filler for a validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Validated decoder configuration
    /// * `end` - Absolute source offset where the stream ends
    pub fn new(config: &DecoderConfig, end: u64) -> Self {
        Self {
            codec: CodecState::new(config.variant, config.channels),
            variant: config.variant,
            channels: usize::from(config.channels),
            block_align: config.block_align,
            block: BlockCursor::new(config.framing_block_align()),
            end,
            pending: VecDeque::with_capacity(16),
            scratch: Vec::new(),
        }
    }

    /// Reset all channel state and force a header read
    pub fn reset(&mut self) {
        self.codec = CodecState::new(self.variant, self.channels as u8);
        self.block.reset();
        self.pending.clear();
    }

    /// Current variant state
    pub fn codec(&self) -> &CodecState {
        &self.codec
    }

    /// Block headers read so far
    pub fn headers_read(&self) -> u64 {
        self.block.headers_read()
    }

    /// True when no more samples can come out of this pass over the stream
    pub fn is_exhausted<S: ByteSource>(&self, source: &S) -> bool {
        self.pending.is_empty() && self.needs_input() && !self.source_available(source)
    }

    /// Fill `out` with decoded samples
    ///
    /// Stops when `out` is full, or when the source reports end-of-stream
    /// or reaches the declared stream end.
    ///
    /// # Returns
    ///
    /// Number of samples written (may be less than `out.len()`)
    pub fn fill<S: ByteSource>(&mut self, source: &mut S, out: &mut [i16]) -> usize {
        let mut written = self.drain(out);

        while written < out.len() {
            if self.needs_input() && !self.source_available(source) {
                break;
            }
            self.decode_unit(source);
            written += self.drain(&mut out[written..]);
        }

        written
    }

    #[inline(always)]
    fn source_available<S: ByteSource>(&self, source: &S) -> bool {
        !source.is_eos() && source.pos() < self.end
    }

    /// False only when the next unit can be decoded without touching the
    /// source (the last code of a Tinsel6 group)
    #[inline(always)]
    fn needs_input(&self) -> bool {
        match &self.codec {
            CodecState::Tinsel6 { chunk, .. } => chunk.phase != 3 || self.block.header_due(),
            _ => true,
        }
    }

    fn drain(&mut self, out: &mut [i16]) -> usize {
        let count = out.len().min(self.pending.len());
        for (slot, sample) in out.iter_mut().zip(self.pending.drain(..count)) {
            *slot = sample;
        }
        count
    }

    /// Decode one source unit into the pending queue
    fn decode_unit<S: ByteSource>(&mut self, source: &mut S) {
        let last_channel = self.channels - 1;
        let block = &mut self.block;
        let out = &mut self.pending;

        match &mut self.codec {
            CodecState::Oki(state) => {
                let data = source.read_byte();
                out.push_back(state.decode_oki(data >> 4));
                out.push_back(state.decode_oki(data & 0xF));
            }

            CodecState::Ima(states) => {
                let data = source.read_byte();
                out.push_back(states[0].decode_ima(data >> 4));
                out.push_back(states[last_channel].decode_ima(data & 0xF));
            }

            CodecState::MsImaMono(state) => {
                if block.header_due() {
                    let len = read_ima_header(source, std::slice::from_mut(state));
                    block.begin_block(len);
                    return;
                }
                let data = source.read_byte();
                block.advance();
                out.push_back(state.decode_ima(data & 0xF));
                out.push_back(state.decode_ima(data >> 4));
            }

            CodecState::MsImaStereo(states) => {
                // One 32-bit word per channel, most significant nibble first
                let mut group = [0i16; 16];
                for (channel, state) in states.iter_mut().enumerate() {
                    let mut data = source.read_u32_le();
                    for nibble in 0..8 {
                        group[nibble * 2 + channel] = state.decode_ima((data >> 28) as u8);
                        data <<= 4;
                    }
                }
                out.extend(group);
            }

            CodecState::Ms(states) => {
                if block.header_due() {
                    let len = read_ms_header(source, &mut states[..=last_channel], out);
                    block.begin_block(len);
                    return;
                }
                let data = source.read_byte();
                block.advance();
                out.push_back(states[0].decode(data >> 4));
                out.push_back(states[last_channel].decode(data & 0xF));
            }

            CodecState::Iss(states) => {
                if block.header_due() {
                    let len = read_ima_header(source, &mut states[..=last_channel]);
                    block.begin_block(len);
                    return;
                }
                let data = source.read_byte();
                block.advance();
                out.push_back(states[0].decode_ima(data >> 4));
                out.push_back(states[last_channel].decode_ima(data & 0xF));
            }

            CodecState::Apple(states) => {
                let channels = last_channel + 1;
                let packet_bytes = self.block_align.saturating_sub(2) as usize;
                let end = self.end;
                let scratch = &mut self.scratch;
                scratch.clear();

                // Packets are cut short at the declared stream end
                let mut offsets = [0usize; 2];
                let mut frames = usize::MAX;
                let mut truncated = false;
                for (channel, state) in states[..channels].iter_mut().enumerate() {
                    offsets[channel] = scratch.len();
                    if end.saturating_sub(source.pos()) < 2 {
                        frames = 0;
                        truncated = true;
                        break;
                    }
                    read_apple_packet_header(source, state);

                    let mut read = 0;
                    while read < packet_bytes && source.pos() < end && !source.is_eos() {
                        let data = source.read_byte();
                        scratch.push(state.decode_ima(data & 0xF));
                        scratch.push(state.decode_ima(data >> 4));
                        read += 1;
                    }
                    frames = frames.min(2 * read);
                }

                // Drop a tail too short to hold a packet header
                while truncated && source.pos() < end && !source.is_eos() {
                    source.read_byte();
                }

                for frame in 0..frames {
                    for offset in &offsets[..channels] {
                        out.push_back(scratch[offset + frame]);
                    }
                }
            }

            CodecState::Tinsel4(state) => {
                if block.header_due() {
                    let len = read_tinsel_header(source, state);
                    block.begin_block(len);
                    return;
                }
                let data = u16::from(source.read_byte());
                block.advance();
                out.push_back(state.decode(((data << 8) & 0xF000) as i16, TINSEL4_E_VAL));
                out.push_back(state.decode(((data << 12) & 0xF000) as i16, TINSEL4_E_VAL));
            }

            CodecState::Tinsel6 { state, chunk } => {
                if block.header_due() {
                    let len = read_tinsel_header(source, state);
                    block.begin_block(len);
                    chunk.phase = 0;
                    return;
                }
                let code = match chunk.phase {
                    0 => {
                        chunk.data = u16::from(source.read_byte());
                        (chunk.data << 8) & 0xFC00
                    }
                    1 => {
                        chunk.data = (chunk.data << 8) | u16::from(source.read_byte());
                        block.advance();
                        (chunk.data << 6) & 0xFC00
                    }
                    2 => {
                        chunk.data = (chunk.data << 8) | u16::from(source.read_byte());
                        block.advance();
                        (chunk.data << 4) & 0xFC00
                    }
                    _ => {
                        chunk.data <<= 8;
                        block.advance();
                        (chunk.data << 2) & 0xFC00
                    }
                };
                chunk.phase = (chunk.phase + 1) % 4;
                out.push_back(state.decode(code as i16, TINSEL6_E_VAL));
            }

            CodecState::Tinsel8(state) => {
                if block.header_due() {
                    let len = read_tinsel_header(source, state);
                    block.begin_block(len);
                    return;
                }
                let data = u16::from(source.read_byte());
                block.advance();
                out.push_back(state.decode((data << 8) as i16, TINSEL8_E_VAL));
            }
        }
    }
}
