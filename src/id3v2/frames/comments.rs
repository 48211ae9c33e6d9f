//! Comment frames.

use crate::core::io::BufStream;
use crate::core::string::{self, Encoding};
use crate::id3v2::frames::{encoding, Language};
use crate::id3v2::tag::Version;
use crate::id3v2::ParseResult;
use std::fmt::{self, Display, Formatter};

/// A `COMM` frame containing freeform user text.
///
/// Comments carry a language code and a short description alongside the text
/// itself. Taggers like iTunes use the description to smuggle program-specific
/// values (`iTunNORM` and friends) into comments, so the description is worth
/// inspecting before treating the text as human-readable.
#[derive(Debug, Clone)]
pub struct CommentsFrame {
    pub encoding: Encoding,
    /// The language `desc` and `text` are written in.
    pub lang: Language,
    /// A short description of the comment. Can be empty.
    pub desc: String,
    /// The comment text.
    pub text: String,
}

impl CommentsFrame {
    pub(crate) fn parse(stream: &mut BufStream, version: Version) -> ParseResult<Self> {
        let encoding = encoding::parse(stream, version)?;
        let lang = Language::parse(stream)?;
        let desc = string::read_terminated(encoding, stream);
        let text = string::read(encoding, stream);

        Ok(Self {
            encoding,
            lang,
            desc,
            text,
        })
    }
}

impl Display for CommentsFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write![f, "{}", self.text]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_comm() {
        let data = b"\x00engDescription\x00Text";
        let frame = CommentsFrame::parse(&mut BufStream::new(data), Version::V23).unwrap();

        assert_eq!(frame.encoding, Encoding::Latin1);
        assert_eq!(frame.lang, b"eng");
        assert_eq!(frame.desc, "Description");
        assert_eq!(frame.text, "Text");
    }

    #[test]
    fn parse_comm_utf8() {
        let data = b"\x03engDescription\x00Text";
        let frame = CommentsFrame::parse(&mut BufStream::new(data), Version::V24).unwrap();

        assert_eq!(frame.encoding, Encoding::Utf8);
        assert_eq!(frame.text, "Text");
    }
}
