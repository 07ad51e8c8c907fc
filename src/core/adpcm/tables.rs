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

//! Fixed lookup tables for the ADPCM variants

/// OKI/Dialogic step sizes (12-bit domain)
pub const OKI_STEP_TABLE: [i32; 49] = [
    16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66, 73, 80, 88, 97, 107, 118, 130,
    143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408, 449, 494, 544, 598, 658, 724, 796,
    876, 963, 1060, 1166, 1282, 1411, 1552,
];

/// IMA step sizes
pub const IMA_STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66,
    73, 80, 88, 97, 107, 118, 130, 143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408, 449,
    494, 544, 598, 658, 724, 796, 876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066, 2272,
    2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358, 5894, 6484, 7132, 7845, 8630, 9493,
    10442, 11487, 12635, 13899, 15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794, 32767,
];

/// Step index adjustment, indexed by the code magnitude (`code & 7`)
pub const STEP_ADJUST_TABLE: [i32; 8] = [-1, -1, -1, -1, 2, 4, 6, 8];

/// Microsoft ADPCM first predictor coefficient, per predictor index
pub const MS_ADAPT_COEFF1: [i16; 7] = [256, 512, 0, 192, 240, 460, 392];

/// Microsoft ADPCM second predictor coefficient, per predictor index
pub const MS_ADAPT_COEFF2: [i16; 7] = [0, -256, 0, 64, 0, -208, -232];

/// Microsoft ADPCM delta multipliers (x/256), indexed by the raw 4-bit code
pub const MS_ADAPTATION_TABLE: [i32; 16] = [
    230, 230, 230, 230, 307, 409, 512, 614, 768, 614, 512, 409, 307, 230, 230, 230,
];

/// Tinsel two-tap filter coefficients `(k0, k1)`, selected by header bits 6-7
pub const TINSEL_FILTER_TABLE: [[f64; 2]; 4] = [
    [0.0, 0.0],
    [0.9375, 0.0],
    [1.796875, -0.8125],
    [1.53125, -0.859375],
];

/// Tinsel code scale for 4-bit streams
pub const TINSEL4_E_VAL: f64 = 1.142822265;

/// Tinsel code scale for 6-bit streams
pub const TINSEL6_E_VAL: f64 = 1.032226562;

/// Tinsel code scale for 8-bit streams
pub const TINSEL8_E_VAL: f64 = 1.007843258;
