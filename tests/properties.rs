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

//! Property tests for the ADPCM decoder

use adpcmx::core::adpcm::{
    AdpcmDecoder, AdpcmVariant, DecoderConfig, ImaState, MsState, IMA_MAX_STEP, OKI_MAX_STEP,
};
use adpcmx::core::source::ReaderSource;
use proptest::prelude::*;

fn decode_all(data: &[u8], config: &DecoderConfig, chunk: usize) -> Vec<i16> {
    let source = ReaderSource::from_bytes(data.to_vec());
    let mut decoder = AdpcmDecoder::new(source, data.len() as u32, config.clone()).unwrap();

    let mut pcm = Vec::new();
    let mut buf = vec![0i16; chunk];
    loop {
        let n = decoder.read_buffer(&mut buf);
        assert!(n <= chunk);
        pcm.extend_from_slice(&buf[..n]);
        if n < chunk {
            return pcm;
        }
    }
}

fn any_config() -> impl Strategy<Value = DecoderConfig> {
    prop_oneof![
        Just(DecoderConfig::new(AdpcmVariant::Oki, 8000).channels(1)),
        (1u8..=2).prop_map(|ch| DecoderConfig::new(AdpcmVariant::Ima, 22050).channels(ch)),
        (4u32..64).prop_map(|ba| DecoderConfig::new(AdpcmVariant::MsIma, 22050)
            .channels(1)
            .block_align(ba)),
        (8u32..64).prop_map(|ba| DecoderConfig::new(AdpcmVariant::MsIma, 22050).block_align(ba)),
        (1u8..=2, 14u32..64).prop_map(|(ch, ba)| DecoderConfig::new(AdpcmVariant::Ms, 22050)
            .channels(ch)
            .block_align(ba)),
        (1u8..=2, 8u32..64).prop_map(|(ch, ba)| DecoderConfig::new(AdpcmVariant::Iss, 22050)
            .channels(ch)
            .block_align(ba)),
        (1u8..=2, 3u32..40).prop_map(|(ch, ba)| DecoderConfig::new(AdpcmVariant::Apple, 22050)
            .channels(ch)
            .block_align(ba)),
        (
            prop_oneof![
                Just(AdpcmVariant::Tinsel4),
                Just(AdpcmVariant::Tinsel6),
                Just(AdpcmVariant::Tinsel8)
            ],
            2u32..40
        )
            .prop_map(|(v, ba)| DecoderConfig::new(v, 22050).channels(1).block_align(ba)),
    ]
}

proptest! {
    #[test]
    fn prop_ima_step_index_in_bounds(
        start in -200i32..200,
        codes in prop::collection::vec(0u8..16, 0..512),
    ) {
        let mut state = ImaState::default();
        state.reset(0, start);
        prop_assert!((0..=IMA_MAX_STEP).contains(&state.step_index()));
        for code in codes {
            state.decode_ima(code);
            prop_assert!((0..=IMA_MAX_STEP).contains(&state.step_index()));
        }
    }

    #[test]
    fn prop_oki_step_index_in_bounds(codes in prop::collection::vec(0u8..16, 0..512)) {
        let mut state = ImaState::default();
        for code in codes {
            let sample = state.decode_oki(code);
            prop_assert!((0..=OKI_MAX_STEP).contains(&state.step_index()));
            prop_assert!((-2048..=2047).contains(&state.last()));
            prop_assert_eq!(i32::from(sample), state.last() * 16);
        }
    }

    #[test]
    fn prop_ms_delta_floor(
        predictor in 0u8..=255,
        delta in any::<i16>(),
        codes in prop::collection::vec(0u8..16, 0..512),
    ) {
        let mut state = MsState::default();
        state.set_predictor(predictor);
        state.set_delta(delta);
        prop_assert!(state.predictor_index() <= 6);
        for code in codes {
            state.decode(code);
            prop_assert!(state.delta() >= MsState::MIN_DELTA);
        }
    }

    #[test]
    fn prop_decoding_is_deterministic(
        config in any_config(),
        data in prop::collection::vec(any::<u8>(), 0..300),
    ) {
        let first = decode_all(&data, &config, 64);
        let second = decode_all(&data, &config, 64);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_chunk_size_does_not_change_output(
        config in any_config(),
        data in prop::collection::vec(any::<u8>(), 0..300),
        chunk in 1usize..40,
    ) {
        let whole = decode_all(&data, &config, 4096);
        let chunked = decode_all(&data, &config, chunk);
        prop_assert_eq!(whole, chunked);
    }

    #[test]
    fn prop_infinite_loop_is_periodic(
        config in any_config(),
        data in prop::collection::vec(any::<u8>(), 1..120),
    ) {
        let once = decode_all(&data, &config, 4096);
        prop_assume!(!once.is_empty());

        let source = ReaderSource::from_bytes(data.clone());
        let mut decoder =
            AdpcmDecoder::new(source, data.len() as u32, config.loop_count(0)).unwrap();

        let mut pcm = vec![0i16; once.len() * 3 + 1];
        prop_assert_eq!(decoder.read_buffer(&mut pcm), pcm.len());
        prop_assert!(!decoder.end_of_data());
        for (i, sample) in pcm.iter().enumerate() {
            prop_assert_eq!(*sample, once[i % once.len()]);
        }
    }
}
