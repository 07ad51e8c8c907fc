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

//! adpcmx command-line decoder
//!
//! Decodes a raw ADPCM stream from a file into a 16-bit PCM WAV file.

use adpcmx::config::StreamDescription;
use adpcmx::core::adpcm::{AdpcmDecoder, AdpcmVariant, DecoderConfig};
use adpcmx::core::source::ReaderSource;
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::PathBuf;

/// Samples decoded per read
const CHUNK_SAMPLES: usize = 4096;

/// Decode raw ADPCM streams to WAV
#[derive(Parser, Debug)]
#[command(name = "adpcmx", version, about)]
struct Args {
    /// File holding the ADPCM stream
    input: PathBuf,

    /// WAV file to write
    output: PathBuf,

    /// ADPCM variant (oki, ima, ms-ima, ms, tinsel4, tinsel6, tinsel8, apple, iss)
    #[arg(short, long)]
    variant: Option<AdpcmVariant>,

    /// Sample rate in Hz
    #[arg(short, long)]
    rate: Option<u32>,

    /// Channel count
    #[arg(short, long)]
    channels: Option<u8>,

    /// Block alignment in bytes
    #[arg(short, long)]
    block_align: Option<u32>,

    /// Byte offset of the stream within the input file
    #[arg(long)]
    offset: Option<u64>,

    /// Stream size in bytes (default: rest of the file)
    #[arg(long)]
    size: Option<u32>,

    /// Times to play the stream
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    loops: u32,

    /// TOML stream description (also read from ADPCMX_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON summary after decoding
    #[arg(long)]
    report: bool,
}

/// Summary printed with `--report`
#[derive(Debug, Serialize)]
struct DecodeReport {
    variant: AdpcmVariant,
    sample_rate: u32,
    channels: u8,
    samples: u64,
    frames: u64,
    duration_secs: f64,
    blocks: u64,
    loops: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let description = build_description(&args)?;
    let decoder_config = &description.decoder;

    log::info!(
        "Decoding {} as {} ({} Hz, {} channel(s))",
        args.input.display(),
        decoder_config.variant,
        decoder_config.sample_rate,
        decoder_config.channels
    );

    let mut file = BufReader::new(File::open(&args.input)?);
    let file_len = file.get_ref().metadata()?.len();
    let stream_size = description.stream_size(file_len);
    file.seek(SeekFrom::Start(description.offset))?;

    let source = ReaderSource::new(file)?;
    let mut decoder = AdpcmDecoder::new(source, stream_size, decoder_config.clone())?;

    let spec = hound::WavSpec {
        channels: u16::from(decoder.channels()),
        sample_rate: decoder.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&args.output, spec)?;

    let mut buffer = vec![0i16; CHUNK_SAMPLES];
    let mut samples = 0u64;
    loop {
        let n = decoder.read_buffer(&mut buffer);
        for &sample in &buffer[..n] {
            writer.write_sample(sample)?;
        }
        samples += n as u64;
        if n < buffer.len() || decoder.end_of_data() {
            break;
        }
    }
    writer.finalize()?;

    let frames = samples / u64::from(decoder.channels());
    log::info!(
        "Wrote {} frames ({} block headers) to {}",
        frames,
        decoder.blocks_read(),
        args.output.display()
    );

    if args.report {
        let report = DecodeReport {
            variant: decoder.variant(),
            sample_rate: decoder.sample_rate(),
            channels: decoder.channels(),
            samples,
            frames,
            duration_secs: frames as f64 / f64::from(decoder.sample_rate().max(1)),
            blocks: decoder.blocks_read(),
            loops: decoder.current_loop(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Merge the optional TOML description with command-line overrides
fn build_description(args: &Args) -> Result<StreamDescription, Box<dyn std::error::Error>> {
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var_os("ADPCMX_CONFIG").map(PathBuf::from));

    let mut description = match config_path {
        Some(path) => StreamDescription::load(&path)?,
        None => {
            let variant = args
                .variant
                .ok_or("--variant is required without a stream description")?;
            StreamDescription::new(DecoderConfig::new(variant, 22050))
        }
    };

    let decoder = &mut description.decoder;
    if let Some(variant) = args.variant {
        decoder.variant = variant;
    }
    if let Some(rate) = args.rate {
        decoder.sample_rate = rate;
    }
    if let Some(channels) = args.channels {
        decoder.channels = channels;
    }
    if let Some(block_align) = args.block_align {
        decoder.block_align = block_align;
    }
    decoder.loop_count = args.loops;

    if let Some(offset) = args.offset {
        description.offset = offset;
    }
    if args.size.is_some() {
        description.size = args.size;
    }

    description.decoder.validate()?;
    Ok(description)
}
