//! Involved people frames.

use crate::core::io::BufStream;
use crate::core::string::Encoding;
use crate::id3v2::frames::encoding;
use crate::id3v2::frames::text::{fmt_text, parse_text};
use crate::id3v2::tag::Version;
use crate::id3v2::ParseResult;
use std::fmt::{self, Display, Formatter};

/// An involved people list.
///
/// The body is a flat sequence of NUL-separated strings, by convention
/// alternating between a role and the people performing that role. The
/// pairing convention is not enforced here, so the entries are kept in
/// source order.
///
/// ```text
/// IPLS [ID3v2.3] Involved people
/// TIPL [ID3v2.4] Involved people
/// TMCL [ID3v2.4] Musician credits, pairing instruments with players
/// ```
#[derive(Debug, Clone)]
pub struct InvolvedPeopleFrame {
    pub encoding: Encoding,
    /// The NUL-separated strings of the body, in source order.
    pub entries: Vec<String>,
}

impl InvolvedPeopleFrame {
    pub(crate) fn parse(stream: &mut BufStream, version: Version) -> ParseResult<Self> {
        let encoding = encoding::parse(stream, version)?;
        let entries = parse_text(encoding, stream);

        Ok(Self { encoding, entries })
    }

    /// Iterates over the (role, people) pairs of this frame. An unpaired
    /// trailing entry is returned with empty people.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.chunks(2).map(|pair| {
            let role = pair[0].as_str();
            let people = pair.get(1).map(|p| p.as_str()).unwrap_or_default();
            (role, people)
        })
    }
}

impl Display for InvolvedPeopleFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fmt_text(f, &self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TMCL_DATA: &[u8] = b"\x00\
                               Bassist\0\
                               John Smith\0\
                               Violinist\0\
                               Vanessa Evans";

    #[test]
    fn parse_credits() {
        let frame =
            InvolvedPeopleFrame::parse(&mut BufStream::new(TMCL_DATA), Version::V24).unwrap();

        assert_eq!(frame.encoding, Encoding::Latin1);
        assert_eq!(
            frame.entries,
            vec!["Bassist", "John Smith", "Violinist", "Vanessa Evans"]
        );

        let pairs: Vec<(&str, &str)> = frame.pairs().collect();
        assert_eq!(
            pairs,
            vec![("Bassist", "John Smith"), ("Violinist", "Vanessa Evans")]
        );
    }

    #[test]
    fn parse_unpaired_credits() {
        let data = b"\x00Producer";
        let frame = InvolvedPeopleFrame::parse(&mut BufStream::new(data), Version::V23).unwrap();

        let pairs: Vec<(&str, &str)> = frame.pairs().collect();
        assert_eq!(pairs, vec![("Producer", "")]);
    }
}
