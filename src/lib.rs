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

//! adpcmx: A multi-format ADPCM stream decoder
//!
//! This crate decodes ADPCM-compressed audio streams into 16-bit PCM for
//! playback by a pull-based audio mixer.
//!
//! # Architecture
//!
//! The decoder is organized into the following modules:
//!
//! - [`core`]: Decoding components (variant decoders, block framing, loop
//!   control, byte source)
//! - [`config`]: Stream descriptions loaded from TOML for the command-line
//!   decoder
//!
//! # Example
//!
//! ```
//! use adpcmx::core::adpcm::{AdpcmDecoder, AdpcmVariant, DecoderConfig};
//! use adpcmx::core::source::ReaderSource;
//!
//! let data = vec![0x21, 0x43, 0x65, 0x87];
//! let config = DecoderConfig::new(AdpcmVariant::Ima, 22050).channels(1);
//! let mut decoder = AdpcmDecoder::new(ReaderSource::from_bytes(data), 4, config)?;
//!
//! let mut pcm = [0i16; 8];
//! assert_eq!(decoder.read_buffer(&mut pcm), 8);
//! # Ok::<(), adpcmx::core::error::DecoderError>(())
//! ```
//!
//! # Modules
//!
//! - [`core::adpcm`]: OKI, IMA (generic, Apple, ISS, Microsoft), Microsoft
//!   ADPCM and Tinsel decoders with sample-accurate looping
//! - [`core::source`]: Seekable byte source contract and `std::io` adapter
//!
//! # Error Handling
//!
//! All fallible operations return [`core::error::Result<T>`] which is an alias for
//! `Result<T, DecoderError>`. Running out of data is not an error.

pub mod config;
pub mod core;

// Re-export commonly used types
pub use crate::core::adpcm::{AdpcmDecoder, AdpcmVariant, DecoderConfig};
pub use crate::core::error::{DecoderError, Result};
