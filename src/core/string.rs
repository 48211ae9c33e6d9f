//! Tag string handling.

use crate::core::io::BufStream;
use log::warn;

/// A text encoding found in a tag.
///
/// ID3v2 text data can be written in one of four encodings, signalled by a
/// byte at the beginning of the frame body. ID3v1 is always
/// [`Latin1`](Encoding::Latin1).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Encoding {
    /// ISO-8859-1, also known as Latin1.
    Latin1,
    /// UTF-16 with a BOM at the start of each string.
    Utf16,
    /// UTF-16BE with no BOM. Only valid in ID3v2.4.
    Utf16Be,
    /// UTF-8. Only valid in ID3v2.4.
    Utf8,
}

impl Encoding {
    /// The size of this encoding's NUL terminator, in bytes.
    pub(crate) fn nul_size(&self) -> usize {
        match self {
            Self::Utf8 | Self::Latin1 => 1,
            _ => 2,
        }
    }
}

/// Consumes the rest of this stream and decodes it into a string according
/// to the encoding.
pub(crate) fn read(encoding: Encoding, stream: &mut BufStream) -> String {
    decode(encoding, stream.take_rest())
}

/// Searches and consumes the stream up until a NUL terminator and decodes it into a
/// string according to the encoding. The string will not include the terminator.
pub(crate) fn read_terminated(encoding: Encoding, stream: &mut BufStream) -> String {
    // The NUL terminator is 0x00 in Latin1/UTF-8 and an aligned 0x0000 in UTF-16.
    // The string data will not include the terminator, but the amount consumed in
    // the stream will.
    let string_data = match encoding.nul_size() {
        1 => stream.search(&[0]),
        2 => stream.search(&[0, 0]),
        _ => unreachable!(),
    };

    decode(encoding, string_data)
}

fn decode(encoding: Encoding, data: &[u8]) -> String {
    // Trim a trailing NUL before decoding. Terminated reads hand us the string data
    // plus its terminator, and plenty of taggers NUL-terminate unterminated fields
    // anyway, which would otherwise pollute the string.
    let data = match encoding.nul_size() {
        1 => data.strip_suffix(&[0]).unwrap_or(data),
        2 => data.strip_suffix(&[0, 0]).unwrap_or(data),
        _ => unreachable!(),
    };

    match encoding {
        Encoding::Latin1 => decode_latin1(data),
        Encoding::Utf16 => decode_utf16(data),
        Encoding::Utf16Be => decode_utf16be(data),
        Encoding::Utf8 => String::from_utf8_lossy(data).to_string(),
    }
}

fn decode_latin1(data: &[u8]) -> String {
    // UTF-8 expresses high bits as two bytes instead of one, so we cannot convert
    // directly. Instead, we simply reinterpret the bytes as chars to make sure the
    // code-points line up.
    data.iter().map(|&byte| char::from(byte)).collect()
}

fn decode_utf16(data: &[u8]) -> String {
    // There must be at least 2 bytes for a BOM.
    if data.len() < 2 {
        return String::new();
    }

    // UTF-16 requires us to figure out the endianness ourselves from the BOM.
    match (data[0], data[1]) {
        (0xFF, 0xFE) => decode_utf16le(&data[2..]),
        (0xFE, 0xFF) => decode_utf16be(&data[2..]),
        _ => {
            warn!("could not determine UTF-16 BOM, defaulting to UTF-16BE");
            decode_utf16be(data)
        }
    }
}

fn decode_utf16be(data: &[u8]) -> String {
    String::from_utf16_lossy(
        data.chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect::<Vec<u16>>()
            .as_slice(),
    )
}

fn decode_utf16le(data: &[u8]) -> String {
    String::from_utf16_lossy(
        data.chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect::<Vec<u16>>()
            .as_slice(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const STR_LATIN1: &str = "Líke â while loop wïth nø escapê";

    const DATA_LATIN1: &[u8] = b"L\xEDke \xE2 while loop w\xEFth n\xF8 escap\xEA";

    const DATA_UTF16LE: &[u8] = b"\xFF\xFE\x4c\x00\xed\x00\x6b\x00\x65\x00\x20\x00\
                                  \xe2\x00\x20\x00\x77\x00\x68\x00\x69\x00\x6c\x00\
                                  \x65\x00\x20\x00\x6c\x00\x6f\x00\x6f\x00\x70\x00\
                                  \x20\x00\x77\x00\xef\x00\x74\x00\x68\x00\x20\x00\
                                  \x6e\x00\xf8\x00\x20\x00\x65\x00\x73\x00\x63\x00\
                                  \x61\x00\x70\x00\xea\x00";

    const DATA_UTF16BE: &[u8] = b"\xFE\xFF\x00\x4c\x00\xed\x00\x6b\x00\x65\x00\x20\
                                  \x00\xe2\x00\x20\x00\x77\x00\x68\x00\x69\x00\x6c\
                                  \x00\x65\x00\x20\x00\x6c\x00\x6f\x00\x6f\x00\x70\
                                  \x00\x20\x00\x77\x00\xef\x00\x74\x00\x68\x00\x20\
                                  \x00\x6e\x00\xf8\x00\x20\x00\x65\x00\x73\x00\x63\
                                  \x00\x61\x00\x70\x00\xea";

    #[test]
    fn parse_latin1() {
        assert_eq!(decode(Encoding::Latin1, DATA_LATIN1), STR_LATIN1);
    }

    #[test]
    fn parse_utf16_bom() {
        assert_eq!(decode(Encoding::Utf16, DATA_UTF16LE), STR_LATIN1);
        assert_eq!(decode(Encoding::Utf16, DATA_UTF16BE), STR_LATIN1);
    }

    #[test]
    fn parse_utf16be() {
        assert_eq!(decode(Encoding::Utf16Be, &DATA_UTF16BE[2..]), STR_LATIN1);
    }

    #[test]
    fn parse_utf8() {
        assert_eq!(decode(Encoding::Utf8, STR_LATIN1.as_bytes()), STR_LATIN1);
    }

    #[test]
    fn parse_terminated() {
        let data = b"L\xEDke \xE2 while loo\0p w\xEFth n\xF8 escap\xEA";
        let mut stream = BufStream::new(data);

        let terminated = read_terminated(Encoding::Latin1, &mut stream);
        assert_eq!(terminated, "Líke â while loo");

        let rest = read_terminated(Encoding::Latin1, &mut stream);
        assert_eq!(rest, "p wïth nø escapê");
    }

    #[test]
    fn parse_terminated_utf16() {
        let data = b"\xFF\xFE\x61\x00\x62\x00\0\0\xFF\xFE\x63\x00\x64\x00";
        let mut stream = BufStream::new(data);

        assert_eq!(read_terminated(Encoding::Utf16, &mut stream), "ab");
        assert_eq!(read_terminated(Encoding::Utf16, &mut stream), "cd");
    }
}
