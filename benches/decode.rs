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

use adpcmx::core::adpcm::{AdpcmDecoder, AdpcmVariant, DecoderConfig};
use adpcmx::core::source::ReaderSource;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

const STREAM_BYTES: usize = 64 * 1024;

fn stream(len: usize) -> Vec<u8> {
    let mut seed = 0x1234_5678u32;
    (0..len)
        .map(|_| {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            (seed >> 16) as u8
        })
        .collect()
}

fn configs() -> Vec<DecoderConfig> {
    vec![
        DecoderConfig::new(AdpcmVariant::Oki, 8000).channels(1),
        DecoderConfig::new(AdpcmVariant::Ima, 22050).channels(2),
        DecoderConfig::new(AdpcmVariant::MsIma, 22050).channels(2).block_align(2048),
        DecoderConfig::new(AdpcmVariant::Ms, 22050).channels(2).block_align(2048),
        DecoderConfig::new(AdpcmVariant::Apple, 44100).channels(2).block_align(34),
        DecoderConfig::new(AdpcmVariant::Tinsel4, 22050).channels(1).block_align(24),
        DecoderConfig::new(AdpcmVariant::Tinsel6, 22050).channels(1).block_align(24),
    ]
}

fn bench_decode(c: &mut Criterion) {
    let data = stream(STREAM_BYTES);
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(STREAM_BYTES as u64));

    for config in configs() {
        group.bench_with_input(
            BenchmarkId::from_parameter(config.variant),
            &config,
            |b, config| {
                let mut buffer = vec![0i16; 4096];
                b.iter(|| {
                    let source = ReaderSource::from_bytes(data.clone());
                    let mut decoder =
                        AdpcmDecoder::new(source, data.len() as u32, config.clone()).unwrap();
                    let mut total = 0usize;
                    while !decoder.end_of_data() {
                        total += decoder.read_buffer(&mut buffer);
                    }
                    black_box(total)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
