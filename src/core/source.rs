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

//! Byte-stream source
//!
//! The decoder pulls compressed data one byte or word at a time from a
//! seekable, position-aware reader. Reads past the end of the underlying
//! data yield zero and latch the end-of-stream flag instead of failing, so
//! decoders never have to handle short reads mid-sample.

use super::error::Result;
use std::io::{Cursor, ErrorKind, Read, Seek, SeekFrom};

/// Seekable byte reader consumed by the ADPCM decoder
///
/// Multi-byte reads are composed from [`ByteSource::read_byte`] by default;
/// implementors only need the byte read, position and seek primitives.
pub trait ByteSource {
    /// Read one byte, or 0 (and set end-of-stream) when no data is left
    fn read_byte(&mut self) -> u8;

    /// Current byte offset
    fn pos(&self) -> u64;

    /// Move to an absolute byte offset, clearing end-of-stream
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// True once a read has run past the end of the data
    fn is_eos(&self) -> bool;

    /// Read a little-endian unsigned 16-bit word
    fn read_u16_le(&mut self) -> u16 {
        let lo = self.read_byte();
        let hi = self.read_byte();
        u16::from_le_bytes([lo, hi])
    }

    /// Read a little-endian signed 16-bit word
    fn read_i16_le(&mut self) -> i16 {
        self.read_u16_le() as i16
    }

    /// Read a big-endian unsigned 16-bit word
    fn read_u16_be(&mut self) -> u16 {
        let hi = self.read_byte();
        let lo = self.read_byte();
        u16::from_be_bytes([hi, lo])
    }

    /// Read a little-endian unsigned 32-bit word
    fn read_u32_le(&mut self) -> u32 {
        let b0 = self.read_byte();
        let b1 = self.read_byte();
        let b2 = self.read_byte();
        let b3 = self.read_byte();
        u32::from_le_bytes([b0, b1, b2, b3])
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline(always)]
    fn read_byte(&mut self) -> u8 {
        (**self).read_byte()
    }

    fn pos(&self) -> u64 {
        (**self).pos()
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        (**self).seek(pos)
    }

    fn is_eos(&self) -> bool {
        (**self).is_eos()
    }
}

/// [`ByteSource`] adapter over any `std::io` reader
///
/// Tracks the position itself so that `pos()` stays cheap and infallible.
///
/// # Example
///
/// ```
/// use adpcmx::core::source::{ByteSource, ReaderSource};
///
/// let mut source = ReaderSource::from_bytes(vec![0x34, 0x12]);
/// assert_eq!(source.read_u16_le(), 0x1234);
/// assert_eq!(source.read_byte(), 0);
/// assert!(source.is_eos());
/// ```
pub struct ReaderSource<R> {
    inner: R,
    pos: u64,
    eos: bool,
}

impl ReaderSource<Cursor<Vec<u8>>> {
    /// Create a source over an in-memory buffer
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            inner: Cursor::new(data),
            pos: 0,
            eos: false,
        }
    }
}

impl<R: Read + Seek> ReaderSource<R> {
    /// Wrap a reader, starting at its current position
    ///
    /// # Returns
    ///
    /// - `Ok(ReaderSource)` positioned where the reader was
    /// - `Err(DecoderError::Io)` if the reader position cannot be queried
    pub fn new(mut inner: R) -> Result<Self> {
        let pos = inner.stream_position()?;
        Ok(Self {
            inner,
            pos,
            eos: false,
        })
    }

    /// Release the wrapped reader
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteSource for ReaderSource<R> {
    fn read_byte(&mut self) -> u8 {
        let mut byte = [0u8; 1];
        match self.inner.read_exact(&mut byte) {
            Ok(()) => {
                self.pos += 1;
                byte[0]
            }
            Err(e) => {
                if e.kind() != ErrorKind::UnexpectedEof {
                    log::warn!("Source read failed at offset {}: {}", self.pos, e);
                }
                self.eos = true;
                0
            }
        }
    }

    fn pos(&self) -> u64 {
        self.pos
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        self.pos = pos;
        self.eos = false;
        Ok(())
    }

    fn is_eos(&self) -> bool {
        self.eos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_words() {
        let mut src = ReaderSource::from_bytes(vec![
            0x01, 0x80, // i16 LE
            0x12, 0x34, // u16 BE
            0x78, 0x56, 0x34, 0x12, // u32 LE
        ]);
        assert_eq!(src.read_i16_le(), -32767);
        assert_eq!(src.read_u16_be(), 0x1234);
        assert_eq!(src.read_u32_le(), 0x1234_5678);
        assert_eq!(src.pos(), 8);
        assert!(!src.is_eos());
    }

    #[test]
    fn test_read_past_end_latches_eos() {
        let mut src = ReaderSource::from_bytes(vec![0xAB]);
        assert_eq!(src.read_byte(), 0xAB);
        assert!(!src.is_eos(), "Reaching the end is not end-of-stream yet");
        assert_eq!(src.read_byte(), 0);
        assert!(src.is_eos());
        assert_eq!(src.pos(), 1);
    }

    #[test]
    fn test_seek_clears_eos() {
        let mut src = ReaderSource::from_bytes(vec![1, 2, 3]);
        src.seek(3).unwrap();
        src.read_byte();
        assert!(src.is_eos());

        src.seek(1).unwrap();
        assert!(!src.is_eos());
        assert_eq!(src.read_byte(), 2);
    }

    #[test]
    fn test_new_starts_at_reader_position() {
        let mut cursor = Cursor::new(vec![9u8, 8, 7]);
        cursor.set_position(2);
        let mut src = ReaderSource::new(cursor).unwrap();
        assert_eq!(src.pos(), 2);
        assert_eq!(src.read_byte(), 7);
    }

    #[test]
    fn test_borrowed_source() {
        fn first_byte<S: ByteSource>(mut source: S) -> u8 {
            source.read_byte()
        }

        let mut src = ReaderSource::from_bytes(vec![5, 6]);
        assert_eq!(first_byte(&mut src), 5);
        assert_eq!(src.pos(), 1);
    }
}
