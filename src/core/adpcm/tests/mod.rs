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

//! Decoder tests spanning framing, variant decoding and loop control


use super::{AdpcmDecoder, AdpcmVariant, DecoderConfig};
use crate::core::source::ReaderSource;
use std::io::Cursor;

type MemoryDecoder = AdpcmDecoder<ReaderSource<Cursor<Vec<u8>>>>;

/// Build a decoder over an in-memory stream
fn decoder(data: Vec<u8>, config: DecoderConfig) -> MemoryDecoder {
    let size = data.len() as u32;
    AdpcmDecoder::new(ReaderSource::from_bytes(data), size, config).unwrap()
}

/// Deterministic pseudo-random bytes
fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut x = seed;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (x >> 24) as u8
        })
        .collect()
}

/// A valid configuration for every variant
fn sample_configs() -> Vec<DecoderConfig> {
    vec![
        DecoderConfig::new(AdpcmVariant::Oki, 8000).channels(1),
        DecoderConfig::new(AdpcmVariant::Ima, 22050).channels(1),
        DecoderConfig::new(AdpcmVariant::Ima, 22050),
        DecoderConfig::new(AdpcmVariant::MsIma, 22050)
            .channels(1)
            .block_align(36),
        DecoderConfig::new(AdpcmVariant::MsIma, 22050).block_align(72),
        DecoderConfig::new(AdpcmVariant::Ms, 22050)
            .channels(1)
            .block_align(32),
        DecoderConfig::new(AdpcmVariant::Ms, 22050).block_align(64),
        DecoderConfig::new(AdpcmVariant::Iss, 22050).block_align(40),
        DecoderConfig::new(AdpcmVariant::Apple, 22050).block_align(34),
        DecoderConfig::new(AdpcmVariant::Tinsel4, 22050)
            .channels(1)
            .block_align(24),
        DecoderConfig::new(AdpcmVariant::Tinsel6, 22050)
            .channels(1)
            .block_align(25),
        DecoderConfig::new(AdpcmVariant::Tinsel8, 22050)
            .channels(1)
            .block_align(24),
    ]
}

/// Decode everything the decoder produces, `chunk` samples per call
fn decode_all(decoder: &mut MemoryDecoder, chunk: usize) -> Vec<i16> {
    let mut pcm = Vec::new();
    let mut buf = vec![0i16; chunk];
    loop {
        let n = decoder.read_buffer(&mut buf);
        pcm.extend_from_slice(&buf[..n]);
        if n < chunk {
            break;
        }
    }
    pcm
}
