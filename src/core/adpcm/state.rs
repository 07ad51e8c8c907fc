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

//! Per-channel prediction state and the per-code transforms
//!
//! Each state struct carries only what its algorithm needs and turns one
//! code into one clipped 16-bit sample. Codes are always masked to their
//! bit width by the caller, so there is no invalid input at this layer.

use super::tables::{
    IMA_STEP_TABLE, MS_ADAPTATION_TABLE, MS_ADAPT_COEFF1, MS_ADAPT_COEFF2, OKI_STEP_TABLE,
    STEP_ADJUST_TABLE, TINSEL_FILTER_TABLE,
};

/// Largest valid OKI step index
pub const OKI_MAX_STEP: i32 = OKI_STEP_TABLE.len() as i32 - 1;

/// Largest valid IMA step index
pub const IMA_MAX_STEP: i32 = IMA_STEP_TABLE.len() as i32 - 1;

/// IMA / OKI channel state
///
/// Shared by every IMA flavour and by OKI, which runs the same arithmetic
/// in a 12-bit domain with its own step table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImaState {
    /// Most recent decoded sample (12-bit domain for OKI)
    pub(crate) last: i32,

    /// Index into the step table, always within the table
    pub(crate) step_index: i32,
}

impl ImaState {
    /// Reseed from a block header
    ///
    /// Out-of-range step indices are clamped to the IMA table.
    pub fn reset(&mut self, last: i16, step_index: i32) {
        if !(0..=IMA_MAX_STEP).contains(&step_index) {
            log::warn!("IMA block header step index {} out of range", step_index);
        }
        self.last = i32::from(last);
        self.step_index = step_index.clamp(0, IMA_MAX_STEP);
    }

    /// Most recent decoded sample
    pub fn last(&self) -> i32 {
        self.last
    }

    /// Current step index
    pub fn step_index(&self) -> i32 {
        self.step_index
    }

    /// Decode one 4-bit IMA code
    ///
    /// # Arguments
    ///
    /// * `code` - 4-bit code; bit 3 is the sign, bits 0-2 the magnitude
    ///
    /// # Returns
    ///
    /// Decoded sample clipped to the 16-bit range
    #[inline(always)]
    pub fn decode_ima(&mut self, code: u8) -> i16 {
        let diff = Self::signed_diff(code, IMA_STEP_TABLE[self.step_index as usize]);
        let sample = (self.last + diff).clamp(i16::MIN as i32, i16::MAX as i32);

        self.last = sample;
        self.adjust_step(code, IMA_MAX_STEP);

        sample as i16
    }

    /// Decode one 4-bit OKI/Dialogic code
    ///
    /// The predictor runs on 12-bit samples; the result is scaled by 16
    /// into the 16-bit output range.
    #[inline(always)]
    pub fn decode_oki(&mut self, code: u8) -> i16 {
        let diff = Self::signed_diff(code, OKI_STEP_TABLE[self.step_index as usize]);
        let sample = (self.last + diff).clamp(-2048, 2047);

        self.last = sample;
        self.adjust_step(code, OKI_MAX_STEP);

        (sample * 16) as i16
    }

    #[inline(always)]
    fn signed_diff(code: u8, step: i32) -> i32 {
        let magnitude = (2 * i32::from(code & 0x7) + 1) * step / 8;
        if code & 0x8 != 0 {
            -magnitude
        } else {
            magnitude
        }
    }

    #[inline(always)]
    fn adjust_step(&mut self, code: u8, max_step: i32) {
        self.step_index =
            (self.step_index + STEP_ADJUST_TABLE[usize::from(code & 0x7)]).clamp(0, max_step);
    }
}

/// Microsoft ADPCM channel state
///
/// Two-sample history with a predictor coefficient pair chosen per block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsState {
    /// Coefficient pair index (0-6)
    pub(crate) predictor_index: u8,
    pub(crate) coeff1: i16,
    pub(crate) coeff2: i16,

    /// Adaptive step, never below [`MsState::MIN_DELTA`] once decoding
    pub(crate) delta: i16,

    /// History, most recent first
    pub(crate) sample1: i16,
    pub(crate) sample2: i16,
}

impl MsState {
    /// Floor for the adaptive step
    pub const MIN_DELTA: i16 = 16;

    /// Select the predictor coefficients for a new block
    ///
    /// Indices above 6 are clamped.
    pub fn set_predictor(&mut self, index: u8) {
        if index > 6 {
            log::warn!("MS ADPCM predictor index {} out of range", index);
        }
        let index = index.min(6);
        self.predictor_index = index;
        self.coeff1 = MS_ADAPT_COEFF1[usize::from(index)];
        self.coeff2 = MS_ADAPT_COEFF2[usize::from(index)];
    }

    /// Set the adaptive step from a block header
    pub fn set_delta(&mut self, delta: i16) {
        if delta < Self::MIN_DELTA {
            log::warn!("MS ADPCM block header delta {} below floor", delta);
        }
        self.delta = delta.max(Self::MIN_DELTA);
    }

    /// Current adaptive step
    pub fn delta(&self) -> i16 {
        self.delta
    }

    /// Current predictor index
    pub fn predictor_index(&self) -> u8 {
        self.predictor_index
    }

    /// Decode one 4-bit MS ADPCM code
    ///
    /// # Arguments
    ///
    /// * `code` - 4-bit two's-complement code
    ///
    /// # Returns
    ///
    /// Decoded sample clipped to the 16-bit range
    #[inline(always)]
    pub fn decode(&mut self, code: u8) -> i16 {
        let code = code & 0xF;
        let signed = ((code << 4) as i8 >> 4) as i32;

        let predicted = (i32::from(self.sample1) * i32::from(self.coeff1)
            + i32::from(self.sample2) * i32::from(self.coeff2))
            / 256;
        let sample = (predicted + signed * i32::from(self.delta))
            .clamp(i16::MIN as i32, i16::MAX as i32) as i16;

        self.sample2 = self.sample1;
        self.sample1 = sample;

        // The step is a 16-bit quantity: large products wrap before the floor applies
        let delta = ((MS_ADAPTATION_TABLE[usize::from(code)] * i32::from(self.delta)) >> 8) as i16;
        self.delta = delta.max(Self::MIN_DELTA);

        sample
    }
}

/// Tinsel channel state
///
/// Block gain and a two-tap recursive filter run in floating point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TinselState {
    /// Block-level gain from the header exponent
    pub(crate) predictor: f64,

    /// Filter coefficients for the current block
    pub(crate) k0: f64,
    pub(crate) k1: f64,

    /// Filter delay line, most recent first
    pub(crate) d0: f64,
    pub(crate) d1: f64,
}

impl TinselState {
    /// Reseed gain and filter from a block header byte
    ///
    /// # Header Format
    ///
    /// ```text
    /// Bits 6-7: Filter coefficient pair index
    /// Bit 5:    Exponent sign (set: gain = 2^e, clear: gain = 1/2^e)
    /// Bits 0-4: Exponent magnitude
    /// ```
    ///
    /// With the sign set the low six bits hold a negative two's-complement
    /// exponent; its negation is taken modulo 32, the same way a 32-bit
    /// shift treats its count.
    pub fn read_header(&mut self, header: u8) {
        let filter = usize::from(header >> 6);

        self.predictor = if header & 0x20 != 0 {
            let exponent = (!(header | 0xC0)).wrapping_add(1);
            f64::from(1i32.wrapping_shl(u32::from(exponent)))
        } else {
            1.0 / f64::from(1i32.wrapping_shl(u32::from(header & 0x1F)))
        };

        self.k0 = TINSEL_FILTER_TABLE[filter][0];
        self.k1 = TINSEL_FILTER_TABLE[filter][1];

        log::trace!(
            "Tinsel block header 0x{:02X}: gain={}, k0={}, k1={}",
            header,
            self.predictor,
            self.k0,
            self.k1
        );
    }

    /// Current block gain
    pub fn predictor(&self) -> f64 {
        self.predictor
    }

    /// Current filter coefficients `(k0, k1)`
    pub fn coefficients(&self) -> (f64, f64) {
        (self.k0, self.k1)
    }

    /// Decode one code
    ///
    /// # Arguments
    ///
    /// * `code` - Code left-justified into a signed 16-bit window
    /// * `e_val` - Depth-specific code scale
    #[inline(always)]
    pub fn decode(&mut self, code: i16, e_val: f64) -> i16 {
        let sample =
            f64::from(code) * e_val * self.predictor + self.d0 * self.k0 + self.d1 * self.k1;

        self.d1 = self.d0;
        self.d0 = sample;

        sample.clamp(i16::MIN as f64, i16::MAX as f64) as i16
    }
}
