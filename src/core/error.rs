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

//! Error types for the ADPCM decoder
//!
//! Configuration problems are detected when a decoder is built and abort
//! construction. Running out of source data is not an error: it surfaces
//! as a short sample count from `read_buffer`.

use super::adpcm::AdpcmVariant;
use thiserror::Error;

/// Result type alias for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Decoder error types
#[derive(Debug, Error)]
pub enum DecoderError {
    /// The variant frames its data in blocks but no block size was given
    #[error("{variant} ADPCM requires a non-zero block alignment")]
    MissingBlockAlign { variant: AdpcmVariant },

    /// Block alignment too small to hold the per-block header
    #[error("{variant} ADPCM block alignment {block_align} cannot hold its {header}-byte header")]
    BlockTooSmall {
        variant: AdpcmVariant,
        block_align: u32,
        header: u32,
    },

    /// Channel count not supported by the variant
    #[error("{variant} ADPCM does not support {channels} channel(s)")]
    UnsupportedChannels { variant: AdpcmVariant, channels: u8 },

    /// Variant name did not match any known ADPCM flavour
    #[error("Unknown ADPCM variant: {0}")]
    UnknownVariant(String),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error (source seek, file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
