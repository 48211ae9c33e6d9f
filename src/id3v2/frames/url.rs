//! URL link frames.
//!
//! URL frames are structured like [text frames](crate::id3v2::frames::text),
//! except that the URL itself is always ISO-8859-1 and carries no encoding
//! byte. The crate does not validate that the contents are actually a URL.

use crate::core::io::BufStream;
use crate::core::string::{self, Encoding};
use crate::id3v2::frames::encoding;
use crate::id3v2::tag::Version;
use crate::id3v2::ParseResult;
use std::fmt::{self, Display, Formatter};

/// A specific URL link frame, such as `WOAR` or `WPUB`.
#[derive(Debug, Clone)]
pub struct UrlFrame {
    pub url: String,
}

impl UrlFrame {
    pub(crate) fn parse(stream: &mut BufStream) -> ParseResult<Self> {
        let url = string::read(Encoding::Latin1, stream);

        Ok(Self { url })
    }
}

impl Display for UrlFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write![f, "{}", self.url]
    }
}

/// URL information not represented by other frames, stored under `WXXX`.
///
/// The description is written in the declared encoding, while the URL itself
/// remains ISO-8859-1. Unknown identifiers beginning with `W` also decode into
/// this shape, minus the description.
#[derive(Debug, Clone)]
pub struct UserUrlFrame {
    pub encoding: Encoding,
    pub desc: String,
    pub url: String,
}

impl UserUrlFrame {
    pub(crate) fn parse(stream: &mut BufStream, version: Version) -> ParseResult<Self> {
        let encoding = encoding::parse(stream, version)?;
        let desc = string::read_terminated(encoding, stream);
        let url = string::read(Encoding::Latin1, stream);

        Ok(Self {
            encoding,
            desc,
            url,
        })
    }
}

impl Display for UserUrlFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write![f, "{}", self.url]
    }
}
