//! Frames containing binary data.

use crate::core::io::BufStream;
use crate::core::string::{self, Encoding};
use crate::id3v2::ParseResult;
use std::fmt::{self, Display, Formatter};

/// A `UFID` frame, pairing an owner identifier with a database key.
///
/// The owner is usually a URL or email address naming the database the
/// identifier belongs to, such as `http://musicbrainz.org`.
#[derive(Debug, Clone)]
pub struct FileIdFrame {
    /// The owner of the identifier namespace, ISO-8859-1.
    pub owner: String,
    /// The identifier itself, up to 64 bytes of arbitrary data.
    pub identifier: Vec<u8>,
}

impl FileIdFrame {
    pub(crate) fn parse(stream: &mut BufStream) -> ParseResult<Self> {
        let owner = string::read_terminated(Encoding::Latin1, stream);
        let identifier = stream.take_rest().to_vec();

        Ok(Self { owner, identifier })
    }
}

impl Display for FileIdFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write![f, "{}", self.owner]
    }
}

/// An `MCDI` frame holding the CD table of contents this file was ripped from.
///
/// The contents are an opaque copy of the disc TOC. They are exposed raw, and
/// rendered as lower-case hex for display.
#[derive(Debug, Clone)]
pub struct MusicCdFrame {
    pub data: Vec<u8>,
}

impl MusicCdFrame {
    pub(crate) fn parse(stream: &mut BufStream) -> ParseResult<Self> {
        Ok(Self {
            data: stream.take_rest().to_vec(),
        })
    }
}

impl Display for MusicCdFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for byte in &self.data {
            write![f, "{:02x}", byte]?;
        }

        Ok(())
    }
}

/// The iTunes `PCST` frame.
///
/// In practice the body is four zero bytes and the mere presence of the frame
/// marks the file as a podcast episode, but the payload is kept in case a
/// tagger wrote something else.
#[derive(Debug, Clone)]
pub struct PodcastFrame {
    pub data: Vec<u8>,
}

impl PodcastFrame {
    pub(crate) fn parse(stream: &mut BufStream) -> ParseResult<Self> {
        Ok(Self {
            data: stream.take_rest().to_vec(),
        })
    }
}

impl Display for PodcastFrame {
    fn fmt(&self, _: &mut Formatter) -> fmt::Result {
        // Nothing to format.
        Ok(())
    }
}

/// A recognised frame whose body could not be interpreted.
///
/// Encrypted and compressed frame bodies end up here, passed through without
/// modification. The flag sub-fields that were stripped from the body are
/// recorded in the frame's flags.
#[derive(Debug, Clone)]
pub struct UnknownFrame {
    pub data: Vec<u8>,
}

impl UnknownFrame {
    pub(crate) fn from_stream(stream: &mut BufStream) -> Self {
        Self {
            data: stream.take_rest().to_vec(),
        }
    }
}

impl Display for UnknownFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        // Truncate the hex dump, pictures and the like get long.
        let data = if self.data.len() > 64 {
            &self.data[0..64]
        } else {
            &self.data
        };

        for byte in data {
            write![f, "{:02x}", byte]?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UFID_DATA: &[u8] = b"http://www.id3.org/dummy/ufid.html\0\
                               \x16\x16\x16\x16\x16\x16";

    #[test]
    fn parse_ufid() {
        let frame = FileIdFrame::parse(&mut BufStream::new(UFID_DATA)).unwrap();

        assert_eq!(frame.owner, "http://www.id3.org/dummy/ufid.html");
        assert_eq!(frame.identifier, b"\x16\x16\x16\x16\x16\x16");
    }

    #[test]
    fn parse_mcdi() {
        let frame = MusicCdFrame::parse(&mut BufStream::new(b"\x01\xAB\xCD\xEF")).unwrap();

        assert_eq!(frame.data, b"\x01\xAB\xCD\xEF");
        assert_eq!(frame.to_string(), "01abcdef");
    }

    #[test]
    fn parse_pcst() {
        let frame = PodcastFrame::parse(&mut BufStream::new(b"\0\0\0\0")).unwrap();

        assert_eq!(frame.data, b"\0\0\0\0");
    }
}
