use crate::core::io::BufStream;
use crate::core::string::Encoding;
use crate::id3v2::tag::Version;
use crate::id3v2::{ParseError, ParseResult};
use log::error;

const FLAG_LATIN1: u8 = 0x00;
const FLAG_UTF16: u8 = 0x01;
const FLAG_UTF16BE: u8 = 0x02;
const FLAG_UTF8: u8 = 0x03;

/// Parses the encoding byte at the start of a frame body.
///
/// UTF-16BE and UTF-8 only exist in ID3v2.4, so on earlier versions those
/// bytes make the frame malformed.
pub fn parse(stream: &mut BufStream, version: Version) -> ParseResult<Encoding> {
    let encoding = match stream.read_u8()? {
        FLAG_LATIN1 => Encoding::Latin1,
        FLAG_UTF16 => Encoding::Utf16,
        FLAG_UTF16BE => Encoding::Utf16Be,
        FLAG_UTF8 => Encoding::Utf8,
        enc => {
            error!("unrecognized encoding {}", enc);
            return Err(ParseError::MalformedData);
        }
    };

    if version < Version::V24 && matches!(encoding, Encoding::Utf16Be | Encoding::Utf8) {
        error!("encoding {:?} is only valid in ID3v2.4", encoding);
        return Err(ParseError::MalformedData);
    }

    Ok(encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id3v2_encoding() {
        let mut stream = BufStream::new(b"\x00\x01\x02\x03\x04");

        assert_eq!(parse(&mut stream, Version::V24).unwrap(), Encoding::Latin1);
        assert_eq!(parse(&mut stream, Version::V24).unwrap(), Encoding::Utf16);
        assert_eq!(parse(&mut stream, Version::V24).unwrap(), Encoding::Utf16Be);
        assert_eq!(parse(&mut stream, Version::V24).unwrap(), Encoding::Utf8);
        assert!(parse(&mut stream, Version::V24).is_err());
    }

    #[test]
    fn reject_v4_encodings_on_v3() {
        assert!(parse(&mut BufStream::new(b"\x01"), Version::V23).is_ok());
        assert!(parse(&mut BufStream::new(b"\x02"), Version::V23).is_err());
        assert!(parse(&mut BufStream::new(b"\x03"), Version::V23).is_err());
        assert!(parse(&mut BufStream::new(b"\x03"), Version::V22).is_err());
    }
}
