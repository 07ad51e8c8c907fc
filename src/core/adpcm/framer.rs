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

//! Block framing
//!
//! Block-framed variants re-read a small header every `block_align` bytes
//! to reseed their channel state. The header bytes count toward the block,
//! so headers always start at multiples of `block_align` from the stream
//! start.
//!
//! # Header Layouts
//!
//! ```text
//! MS ADPCM (7 bytes per channel, fields grouped across channels):
//!   u8 predictor[ch] | i16 delta[ch] | i16 sample1[ch] | i16 sample2[ch]
//! MS IMA mono / ISS IMA (4 bytes per channel):
//!   i16 last | i16 step index
//! Apple IMA4 (2 bytes, per channel packet):
//!   u16 BE: bits 7-15 last sample, bits 0-6 step index
//! Tinsel (1 byte):
//!   bits 6-7 filter | bit 5 sign | bits 0-4 exponent
//! ```

use super::state::{ImaState, MsState, TinselState};
use crate::core::source::ByteSource;
use std::collections::VecDeque;

/// Bytes consumed since the last block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCursor {
    /// Offset within the current block, header included
    pos: u32,

    /// Block size in bytes (0 for unframed variants)
    align: u32,

    /// Headers read since construction
    headers_read: u64,
}

impl BlockCursor {
    /// Create a cursor that requests a header before the first byte
    pub fn new(align: u32) -> Self {
        Self {
            pos: align,
            align,
            headers_read: 0,
        }
    }

    /// True when the next source byte starts a new block
    #[inline(always)]
    pub fn header_due(&self) -> bool {
        self.align != 0 && self.pos >= self.align
    }

    /// Start a new block after a `header_len`-byte header
    pub fn begin_block(&mut self, header_len: u32) {
        self.pos = header_len;
        self.headers_read += 1;
    }

    /// Count one data byte toward the current block
    #[inline(always)]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Force a header read on the next unit
    pub fn reset(&mut self) {
        self.pos = self.align;
    }

    /// Offset within the current block
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Number of block headers read
    pub fn headers_read(&self) -> u64 {
        self.headers_read
    }
}

/// Read an MS ADPCM block header for all channels
///
/// The two history samples stored in the header are decoded output: the
/// older one (`sample2`) for every channel first, then `sample1`.
///
/// # Returns
///
/// Header length in bytes
pub fn read_ms_header<S: ByteSource>(
    source: &mut S,
    states: &mut [MsState],
    out: &mut VecDeque<i16>,
) -> u32 {
    for state in states.iter_mut() {
        state.set_predictor(source.read_byte());
    }
    for state in states.iter_mut() {
        state.set_delta(source.read_i16_le());
    }
    for state in states.iter_mut() {
        state.sample1 = source.read_i16_le();
    }
    for state in states.iter_mut() {
        state.sample2 = source.read_i16_le();
        out.push_back(state.sample2);
    }
    for state in states.iter() {
        out.push_back(state.sample1);
    }

    log::trace!("MS ADPCM block header: {:?}", states);

    7 * states.len() as u32
}

/// Read an MS IMA / ISS IMA block header for all channels
///
/// # Returns
///
/// Header length in bytes
pub fn read_ima_header<S: ByteSource>(source: &mut S, states: &mut [ImaState]) -> u32 {
    for state in states.iter_mut() {
        let last = source.read_i16_le();
        let step_index = source.read_i16_le();
        state.reset(last, i32::from(step_index));
    }

    log::trace!("IMA block header: {:?}", states);

    4 * states.len() as u32
}

/// Read the header of one Apple IMA4 channel packet
pub fn read_apple_packet_header<S: ByteSource>(source: &mut S, state: &mut ImaState) {
    let header = source.read_u16_be();
    state.reset((header & 0xFF80) as i16, i32::from(header & 0x7F));
}

/// Read a Tinsel block header
///
/// # Returns
///
/// Header length in bytes
pub fn read_tinsel_header<S: ByteSource>(source: &mut S, state: &mut TinselState) -> u32 {
    state.read_header(source.read_byte());
    1
}
