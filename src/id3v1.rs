//! ID3v1 tag reading.
//!
//! ID3v1 is a fixed 128-byte record in the last 128 bytes of a file. Every
//! field has a fixed width, all text is ISO-8859-1, and the genre is an index
//! into a fixed table, which makes this format far simpler and far less
//! expressive than ID3v2. The v1.1 revision steals the last two comment bytes
//! to store a track number.

use crate::err::{ParseError, ParseResult};
use crate::probe::TagVersion;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

const ID: &[u8] = b"TAG";

/// The classic ID3v1 genre table. The genre byte of a tag indexes this list.
static GENRES: &[&str] = &[
    "Blues",
    "Classic Rock",
    "Country",
    "Dance",
    "Disco",
    "Funk",
    "Grunge",
    "Hip-Hop",
    "Jazz",
    "Metal",
    "New Age",
    "Oldies",
    "Other",
    "Pop",
    "R&B",
    "Rap",
    "Reggae",
    "Rock",
    "Techno",
    "Industrial",
    "Alternative",
    "Ska",
    "Death Metal",
    "Pranks",
    "Soundtrack",
    "Euro-Techno",
    "Ambient",
    "Trip-Hop",
    "Vocal",
    "Jazz+Funk",
    "Fusion",
    "Trance",
    "Classical",
    "Instrumental",
    "Acid",
    "House",
    "Game",
    "Sound Clip",
    "Gospel",
    "Noise",
    "Alternative Rock",
    "Bass",
    "Soul",
    "Punk",
    "Space",
    "Meditative",
    "Instrumental Pop",
    "Instrumental Rock",
    "Ethnic",
    "Gothic",
    "Darkwave",
    "Techno-Industrial",
    "Electronic",
    "Pop-Folk",
    "Eurodance",
    "Dream",
    "Southern Rock",
    "Comedy",
    "Cult",
    "Gangsta",
    "Top 40",
    "Christian Rap",
    "Pop/Funk",
    "Jungle",
    "Native US",
    "Cabaret",
    "New Wave",
    "Psychadelic",
    "Rave",
    "Showtunes",
    "Trailer",
    "Lo-Fi",
    "Tribal",
    "Acid Punk",
    "Acid Jazz",
    "Polka",
    "Retro",
    "Musical",
    "Rock & Roll",
    "Hard Rock",
];

/// A parsed ID3v1 tag.
#[derive(Debug, Clone)]
pub struct Tag {
    version: TagVersion,
    title: String,
    artist: String,
    album: String,
    year: String,
    comment: String,
    track: Option<u8>,
    genre_index: u8,
}

impl Tag {
    /// Attempts to read a tag from the last 128 bytes of `path`.
    ///
    /// A file without a `TAG` marker in place returns
    /// [`ParseError::NotFound`](ParseError::NotFound).
    pub fn open<P: AsRef<Path>>(path: P) -> ParseResult<Self> {
        Self::read_from(&mut File::open(path)?)
    }

    /// Like [`open`](Tag::open), but reads from any seekable byte source.
    pub fn read_from<R: Read + Seek>(src: &mut R) -> ParseResult<Self> {
        let len = src.seek(SeekFrom::End(0))?;

        if len < 128 {
            return Err(ParseError::NotFound);
        }

        src.seek(SeekFrom::Start(len - 128))?;

        let mut record = [0; 128];
        src.read_exact(&mut record)?;

        Self::parse(record)
    }

    pub(crate) fn parse(record: [u8; 128]) -> ParseResult<Self> {
        if &record[0..3] != ID {
            return Err(ParseError::NotFound);
        }

        // A zero byte at offset 125 followed by a nonzero byte marks a v1.1
        // tag: the comment shrinks to 28 bytes and the last byte becomes the
        // track number. Two zeroes could be either revision.
        let (version, comment_end, track) = match (record[125], record[126]) {
            (0, n) if n != 0 => (TagVersion::V1r1, 125, Some(n)),
            (0, 0) => (TagVersion::V1, 127, None),
            _ => (TagVersion::V1r0, 127, None),
        };

        Ok(Self {
            version,
            title: read_field(&record[3..33]),
            artist: read_field(&record[33..63]),
            album: read_field(&record[63..93]),
            year: read_field(&record[93..97]),
            comment: read_field(&record[97..comment_end]),
            track,
            genre_index: record[127],
        })
    }

    /// Returns the revision of this tag. This will be
    /// [`TagVersion::V1`](TagVersion::V1) when the record does not
    /// discriminate between v1.0 and v1.1.
    pub fn version(&self) -> TagVersion {
        self.version
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    /// Returns the year field. This should be four ASCII digits, but is kept
    /// as text since nothing stops a tagger from writing something else.
    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Returns the track number of a v1.1 tag.
    pub fn track(&self) -> Option<u8> {
        self.track
    }

    /// Returns the raw genre byte.
    pub fn genre_index(&self) -> u8 {
        self.genre_index
    }

    /// Returns the genre name, or `None` if the genre byte falls outside the
    /// classic table.
    pub fn genre(&self) -> Option<&'static str> {
        GENRES.get(usize::from(self.genre_index)).copied()
    }
}

/// Decodes a fixed-width ISO-8859-1 field, right-trimmed of NUL and space
/// padding.
fn read_field(data: &[u8]) -> String {
    let end = data
        .iter()
        .rposition(|&byte| byte != 0 && byte != b' ')
        .map(|pos| pos + 1)
        .unwrap_or(0);

    data[..end].iter().map(|&byte| char::from(byte)).collect()
}
