//! Text information frames.
//!
//! Text frames store specific text information, such as a song name, and make
//! up the bulk of most tags. A single decoder implementation corresponds to
//! many frame identifiers. ID3v2.4 allows one frame to carry multiple strings
//! separated by a NUL terminator; earlier versions define exactly one string
//! per frame.

use crate::core::io::BufStream;
use crate::core::string::{self, Encoding};
use crate::id3v2::frames::encoding;
use crate::id3v2::tag::Version;
use crate::id3v2::ParseResult;
use std::fmt::{self, Display, Formatter};

/// A plain text frame, such as `TIT2` or `TALB`.
#[derive(Debug, Clone)]
pub struct TextFrame {
    /// The encoding the text was written in.
    pub encoding: Encoding,
    /// The text content. Only ID3v2.4 frames will have more than one string,
    /// but the first string is the value consumers usually want.
    pub text: Vec<String>,
}

impl TextFrame {
    pub(crate) fn parse(stream: &mut BufStream, version: Version) -> ParseResult<Self> {
        let encoding = encoding::parse(stream, version)?;

        let text = if version == Version::V24 {
            parse_text(encoding, stream)
        } else {
            // Earlier versions define exactly one string per frame. Anything
            // after the terminator is discarded with the body.
            vec![string::read_terminated(encoding, stream)]
        };

        Ok(Self { encoding, text })
    }

    /// Returns the first string of this frame, or an empty string if the
    /// frame was empty.
    pub fn main(&self) -> &str {
        self.text.first().map(|s| s.as_str()).unwrap_or_default()
    }
}

impl Display for TextFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fmt_text(f, &self.text)
    }
}

/// Text information not represented by other frames, stored under `TXXX`.
///
/// Notable examples include ReplayGain (`replaygain_track_gain`) and
/// MusicBrainz identifiers. Unknown identifiers beginning with `T` also
/// decode into this shape, minus the description.
#[derive(Debug, Clone)]
pub struct UserTextFrame {
    pub encoding: Encoding,
    /// A description of the contents of this frame.
    pub desc: String,
    /// The value of this frame.
    pub value: String,
}

impl UserTextFrame {
    pub(crate) fn parse(stream: &mut BufStream, version: Version) -> ParseResult<Self> {
        let encoding = encoding::parse(stream, version)?;
        let desc = string::read_terminated(encoding, stream);
        let value = string::read(encoding, stream);

        Ok(Self {
            encoding,
            desc,
            value,
        })
    }
}

impl Display for UserTextFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write![f, "{}", self.value]
    }
}

pub(crate) fn fmt_text<D: Display>(f: &mut Formatter, text: &[D]) -> fmt::Result {
    for (i, string) in text.iter().enumerate() {
        write![f, "{}", string]?;

        if i < text.len() - 1 {
            write![f, ", "]?;
        }
    }

    Ok(())
}

/// Splits the rest of the stream into NUL-separated strings.
pub(crate) fn parse_text(encoding: Encoding, stream: &mut BufStream) -> Vec<String> {
    let mut text = Vec::new();

    while !stream.is_empty() {
        let string = string::read_terminated(encoding, stream);

        // Some taggers pad their text frames with zeroes. Don't let those
        // become phantom empty strings.
        if !string.is_empty() {
            text.push(string);
        }
    }

    text
}
