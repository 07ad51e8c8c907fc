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

//! Stream descriptions
//!
//! A stream description tells the command-line decoder where the ADPCM
//! data sits inside a file and how to decode it. Descriptions are stored
//! as TOML:
//!
//! ```toml
//! variant = "ms"
//! sample_rate = 22050
//! channels = 2
//! block_align = 2048
//! offset = 46
//! size = 120000
//! ```

use crate::core::adpcm::DecoderConfig;
use crate::core::error::{DecoderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Location and decoding parameters of one ADPCM stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescription {
    /// Decoder parameters
    #[serde(flatten)]
    pub decoder: DecoderConfig,

    /// Byte offset of the stream within its file
    #[serde(default)]
    pub offset: u64,

    /// Stream length in bytes (rest of the file when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl StreamDescription {
    /// Describe a stream that starts at the beginning of its file
    pub fn new(decoder: DecoderConfig) -> Self {
        Self {
            decoder,
            offset: 0,
            size: None,
        }
    }

    /// Parse a description from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let description: Self =
            toml::from_str(contents).map_err(|e| DecoderError::Config(e.to_string()))?;
        description.decoder.validate()?;
        Ok(description)
    }

    /// Load a description from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        log::debug!("Loaded stream description from {}", path.display());
        Self::from_toml(&contents)
    }

    /// Save the description to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| DecoderError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Stream length given the size of the file holding it
    ///
    /// Falls back to everything after `offset`, capped to `u32::MAX`.
    pub fn stream_size(&self, file_len: u64) -> u32 {
        match self.size {
            Some(size) => size,
            None => file_len
                .saturating_sub(self.offset)
                .min(u64::from(u32::MAX)) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adpcm::AdpcmVariant;

    #[test]
    fn test_from_toml_full() {
        let desc = StreamDescription::from_toml(
            r#"
            variant = "ms"
            sample_rate = 22050
            channels = 2
            block_align = 2048
            loop_count = 0
            offset = 46
            size = 120000
            "#,
        )
        .unwrap();

        assert_eq!(desc.decoder.variant, AdpcmVariant::Ms);
        assert_eq!(desc.decoder.block_align, 2048);
        assert_eq!(desc.decoder.loop_count, 0);
        assert_eq!(desc.offset, 46);
        assert_eq!(desc.size, Some(120000));
    }

    #[test]
    fn test_from_toml_defaults() {
        let desc = StreamDescription::from_toml("variant = \"oki\"\nsample_rate = 8000").unwrap();
        assert_eq!(desc.offset, 0);
        assert_eq!(desc.size, None);
        assert_eq!(desc.decoder.channels, 2);
        assert_eq!(desc.stream_size(100), 100);
    }

    #[test]
    fn test_from_toml_rejects_invalid_decoder() {
        let err = StreamDescription::from_toml("variant = \"ms\"\nsample_rate = 22050").unwrap_err();
        assert!(matches!(err, DecoderError::MissingBlockAlign { .. }));

        let err = StreamDescription::from_toml("variant = \"adx\"\nsample_rate = 1").unwrap_err();
        assert!(matches!(err, DecoderError::Config(_)));
    }

    #[test]
    fn test_stream_size_from_offset() {
        let mut desc = StreamDescription::new(DecoderConfig::new(AdpcmVariant::Ima, 22050));
        desc.offset = 60;
        assert_eq!(desc.stream_size(100), 40);
        assert_eq!(desc.stream_size(10), 0);
        desc.size = Some(7);
        assert_eq!(desc.stream_size(100), 7);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut desc = StreamDescription::new(
            DecoderConfig::new(AdpcmVariant::Tinsel4, 22050)
                .channels(1)
                .block_align(24),
        );
        desc.offset = 12;

        let text = toml::to_string_pretty(&desc).unwrap();
        assert_eq!(StreamDescription::from_toml(&text).unwrap(), desc);
    }
}
