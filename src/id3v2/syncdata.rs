//! Sync-safe integers and unsynchronisation.
//!
//! ID3v2 avoids spurious MPEG sync words in two ways: sizes are written as
//! "sync-safe" integers carrying 7 bits per byte, and tag or frame data may be
//! unsynchronised, where a zero byte is inserted after every `0xFF`. Both
//! transforms have to be reversed before anything else can be parsed.

use crate::core::io::BufStream;
use crate::id3v2::{ParseError, ParseResult};
use std::io;

/// Converts a 28-bit sync-safe integer to a `u32`.
///
/// # Errors
/// If any byte has its high bit set, the integer is not sync-safe and an error
/// is returned.
pub fn to_u28(raw: [u8; 4]) -> ParseResult<u32> {
    let mut sum = 0;

    for (i, &byte) in raw.iter().enumerate() {
        if byte >= 0x80 {
            return Err(ParseError::MalformedData);
        }

        sum |= u32::from(byte) << ((3 - i) * 7);
    }

    Ok(sum)
}

/// Lossily converts a 35-bit sync-safe integer into a `u32`.
pub fn to_u35(mut raw: [u8; 5]) -> u32 {
    let mut sum: u32 = 0;

    // Remove the last 5 bits of the first byte so that we don't overflow the u32.
    // The spec says that these bits shouldn't be used, so this is okay.
    raw[0] &= 0x7;

    for (i, &byte) in raw.iter().enumerate() {
        sum |= u32::from(byte) << ((4 - i) * 7);
    }

    sum
}

/// Consumes a stream `src` and returns a `Vec<u8>` with the unsynchronisation
/// scheme reversed. Used for ID3v2.4 frame bodies, which are unsynchronised
/// individually.
pub fn decode(src: &mut BufStream) -> Vec<u8> {
    // The decoded data is always smaller than or equal to the source, so one
    // allocation up front is enough.
    let mut dest = Vec::with_capacity(src.remaining());

    // The two sync guards in ID3v2 are:
    // 0xFF 0xXX -> 0xFF 0x00 0xXX where 0xXX & 0xE0 != 0
    // 0xFF 0x00 -> 0xFF 0x00 0x00
    // Both share the initial 0xFF 0x00, so it suffices to drop every zero byte
    // that directly follows a 0xFF.
    while src.remaining() > 1 {
        let cur = src.read_u8().unwrap();
        dest.push(cur);

        if cur == 0xFF && src.peek(0..1).unwrap()[0] == 0x00 {
            src.skip(1).unwrap();
        }
    }

    // A lone trailing byte can never be an inserted zero.
    if src.remaining() == 1 {
        dest.push(src.read_u8().unwrap());
    }

    dest
}

/// A reader that reverses the unsynchronisation scheme on the fly.
///
/// The byte pair `FF 00` in the underlying stream yields a single `FF` to the
/// consumer, everything else passes through. The reader keeps counting bytes
/// consumed from the *underlying* stream, which is what the tag reader needs
/// to detect when the declared tag size has been exhausted. Applied to the
/// whole tag body of unsynchronised ID3v2.2/ID3v2.3 tags.
#[derive(Clone)]
pub struct UnsyncReader<'a> {
    inner: BufStream<'a>,
    last: u8,
}

impl<'a> UnsyncReader<'a> {
    pub fn new(inner: BufStream<'a>) -> Self {
        Self { inner, last: 0 }
    }

    /// Reads one decoded byte.
    pub fn read_u8(&mut self) -> io::Result<u8> {
        let mut byte = self.inner.read_u8()?;

        // A zero directly following 0xFF was inserted by the encoder, drop it.
        if self.last == 0xFF && byte == 0x00 {
            byte = self.inner.read_u8()?;
        }

        self.last = byte;

        Ok(byte)
    }

    /// Reads an array of `N` decoded bytes.
    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut arr = [0; N];

        for byte in arr.iter_mut() {
            *byte = self.read_u8()?;
        }

        Ok(arr)
    }

    /// Reads `n` decoded bytes into an owned buffer.
    pub fn read_vec(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(n);

        for _ in 0..n {
            buf.push(self.read_u8()?);
        }

        Ok(buf)
    }

    /// Returns the amount of bytes consumed from the underlying stream. This
    /// includes the inserted zeroes that never reach the consumer.
    pub fn consumed(&self) -> usize {
        self.inner.pos()
    }

    /// Returns the remaining length of the underlying stream.
    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }
}

/// A tag body stream that may or may not be unsynchronised.
///
/// The frame loop and the extended header reader pull from this without
/// having to care whether the tag-level unsync flag was set. All size
/// accounting goes through [`consumed`](TagStream::consumed) and
/// [`remaining`](TagStream::remaining), which always refer to the underlying
/// stream.
#[derive(Clone)]
pub(crate) enum TagStream<'a> {
    Plain(BufStream<'a>),
    Unsync(UnsyncReader<'a>),
}

impl<'a> TagStream<'a> {
    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        match self {
            Self::Plain(stream) => stream.read_array(),
            Self::Unsync(filter) => filter.read_array(),
        }
    }

    pub fn read_vec(&mut self, n: usize) -> io::Result<Vec<u8>> {
        match self {
            Self::Plain(stream) => Ok(stream.slice(n)?.to_vec()),
            Self::Unsync(filter) => filter.read_vec(n),
        }
    }

    /// Peeks relative to the current position without consuming the stream.
    /// Only supported on plain streams.
    pub fn peek(&self, range: std::ops::Range<usize>) -> io::Result<&[u8]> {
        match self {
            Self::Plain(stream) => stream.peek(range),
            Self::Unsync(_) => Err(io::Error::from(io::ErrorKind::Unsupported)),
        }
    }

    pub fn consumed(&self) -> usize {
        match self {
            Self::Plain(stream) => stream.pos(),
            Self::Unsync(filter) => filter.consumed(),
        }
    }

    pub fn remaining(&self) -> usize {
        match self {
            Self::Plain(stream) => stream.remaining(),
            Self::Unsync(filter) => filter.remaining(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Applies the unsynchronisation scheme the way an ID3v2 writer would.
    fn encode(src: &[u8]) -> Vec<u8> {
        let mut dest = Vec::with_capacity(src.len());
        let mut iter = src.iter().peekable();

        while let Some(&byte) = iter.next() {
            dest.push(byte);

            if byte == 0xFF {
                match iter.peek() {
                    Some(&&next) if next >= 0xE0 || next == 0x00 => dest.push(0x00),
                    None => dest.push(0x00),
                    _ => (),
                }
            }
        }

        dest
    }

    #[test]
    fn parse_u28() {
        assert_eq!(to_u28([0x00, 0x08, 0x49, 0x30]).unwrap(), 140464);
        assert_eq!(to_u28([0x7F, 0x7F, 0x7F, 0x7F]).unwrap(), 0xFFFFFFF);
        assert_eq!(
            to_u28([0x01, 0x02, 0x03, 0x04]).unwrap(),
            ((1 * 128 + 2) * 128 + 3) * 128 + 4
        );
    }

    #[test]
    fn reject_non_syncsafe_u28() {
        assert!(to_u28([0x80, 0x00, 0x00, 0x00]).is_err());
        assert!(to_u28([0x00, 0x00, 0x00, 0xFF]).is_err());
    }

    #[test]
    fn parse_u35() {
        assert_eq!(to_u35([0x07, 0x7F, 0x7F, 0x7F, 0x7F]), 0x7FFFFFFF);
        assert_eq!(to_u35([0x00, 0x05, 0x07, 0x5E, 0x37]), 0xA1EF37);
    }

    #[test]
    fn decode_round_trip() {
        let data: &[u8] = b"\x16\xFF\xE2\x00\x32\xFF\x16\xFF";

        assert_eq!(decode(&mut BufStream::new(&encode(data))), data);
    }

    #[test]
    fn decode_sync_guards() {
        // 0xFF 0x00 0xE0 -> 0xFF 0xE0, 0xFF 0x00 0x00 -> 0xFF 0x00
        let data: &[u8] = b"\xFF\x00\xE0\xFF\x00\x00\xFF\x00";

        assert_eq!(decode(&mut BufStream::new(data)), b"\xFF\xE0\xFF\x00\xFF");
    }

    #[test]
    fn filter_matches_decode() {
        let data: &[u8] = b"\x01\xFF\x00\xFA\xFF\x00\x00\x16";
        let decoded = decode(&mut BufStream::new(data));

        let mut filter = UnsyncReader::new(BufStream::new(data));
        let streamed = filter.read_vec(decoded.len()).unwrap();

        assert_eq!(streamed, decoded);
        assert_eq!(filter.consumed(), data.len());
    }

    #[test]
    fn filter_counts_underlying_bytes() {
        let mut filter = UnsyncReader::new(BufStream::new(b"\xFF\x00\xE0\x16"));

        assert_eq!(filter.read_u8().unwrap(), 0xFF);
        assert_eq!(filter.consumed(), 1);

        // Reading past the inserted zero consumes two underlying bytes.
        assert_eq!(filter.read_u8().unwrap(), 0xE0);
        assert_eq!(filter.consumed(), 3);

        assert_eq!(filter.read_u8().unwrap(), 0x16);
        assert_eq!(filter.consumed(), 4);
        assert_eq!(filter.remaining(), 0);
    }
}
