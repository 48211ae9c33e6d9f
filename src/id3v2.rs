//! ID3v2 tag reading.
//!
//! ID3v2 is the primary metadata format for MP3 files, with it being present
//! in other formats as well. A tag is a block of "frames" at the start of the
//! file, preceded by a header that declares the version, flags, and payload
//! size. Each revision of the format lays its frames out differently, so the
//! readers here normalise everything into one [`Tag`](Tag) model:
//!
//! ```
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! # let example_path = std::env::var("CARGO_MANIFEST_DIR").unwrap() + "/res/test/example.mp3";
//! use tagrip::id3v2::{frames::FrameKind, Tag};
//!
//! let tag = Tag::open(&example_path)?;
//!
//! for frame in &tag.frames {
//!     println!("{}: {}", frame.id(), frame);
//! }
//!
//! if let Some(title) = tag.get(FrameKind::Title) {
//!     println!("this file is called {}", title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! This module assumes that the user has a working knowledge of the ID3v2
//! standard. If not, then one should familiarize themselves with the following
//! documents:
//!
//! - [ID3v2.3](https://id3.org/id3v2.3.0)
//! - [ID3v2.4 Structure](https://id3.org/id3v2.4.0-structure)
//! - [ID3v2.4 Frames](https://id3.org/id3v2.4.0-frames)
//!
//! Frames appear in [`Tag::frames`](Tag::frames) in the order they were found
//! in the file, including duplicates. Frames whose bodies could not be
//! interpreted are either skipped or kept as raw
//! [`Unknown`](frames::FrameBody::Unknown) bodies; either way the declared
//! frame sizes keep the reader walking the tag correctly. An ID3v2.4 footer is
//! recognised by its flag but never read.

pub mod frames;
mod syncdata;
pub mod tag;

pub use crate::err::{ParseError, ParseResult};

use crate::core::io::BufStream;
use frames::{Frame, FrameKind, ParsedFrame};
use syncdata::{TagStream, UnsyncReader};
use tag::{ExtendedHeader, TagHeader, Version};

use log::{info, warn};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// A parsed ID3v2 tag.
///
/// A tag is obtained by reading it from a file, and is immutable afterwards.
#[derive(Debug, Clone)]
pub struct Tag {
    header: TagHeader,
    /// The tag's extended header, if one was present.
    pub extended_header: Option<ExtendedHeader>,
    /// Every decoded frame, in source order.
    pub frames: Vec<Frame>,
    padding: u32,
}

impl Tag {
    /// Attempts to open and parse a tag at the start of `path`.
    ///
    /// If the file cannot be opened an error is returned. A file without a
    /// recognisable tag, with an unsupported version, or with an invalid
    /// declared size returns [`ParseError::NotFound`](ParseError::NotFound).
    /// Specific information about parsing problems is logged.
    pub fn open<P: AsRef<Path>>(path: P) -> ParseResult<Self> {
        Self::read_from(&mut File::open(path)?)
    }

    /// Like [`open`](Tag::open), but reads from any byte source positioned at
    /// the start of a possible tag.
    pub fn read_from(src: &mut impl Read) -> ParseResult<Self> {
        let mut header_raw = [0; 10];

        if let Err(err) = src.read_exact(&mut header_raw) {
            // A source too short for the header cannot contain a tag.
            return match err.kind() {
                io::ErrorKind::UnexpectedEof => Err(ParseError::NotFound),
                _ => Err(err.into()),
            };
        }

        let mut header = TagHeader::parse(header_raw).map_err(|err| match err {
            // An invalid size or unsupported version means there is no tag
            // here that we can use.
            ParseError::MalformedData | ParseError::Unsupported => ParseError::NotFound,
            err => err,
        })?;

        // Read the full payload up front. If the file ends before the declared
        // size, whatever is present is parsed and the rest becomes a partial
        // tag. The ID3v2.4 footer, when flagged, sits past the payload and is
        // not read.
        let mut tag_data = vec![0; header.size() as usize];
        let read = read_fully(src, &mut tag_data)?;

        if read < tag_data.len() {
            warn!("tag is truncated, parsing the {} bytes present", read);
            tag_data.truncate(read);
        }

        // ID3v2.2/ID3v2.3 unsynchronise the whole payload, so everything past
        // this point is pulled through the reversal filter. ID3v2.4 moved
        // unsynchronisation into the individual frames.
        let mut stream = if header.version() < Version::V24 && header.flags().unsync {
            TagStream::Unsync(UnsyncReader::new(BufStream::new(&tag_data)))
        } else {
            TagStream::Plain(BufStream::new(&tag_data))
        };

        let mut extended_header = None;

        if header.flags().extended {
            let checkpoint = stream.clone();

            // Certain taggers will flip the extended header flag without
            // writing one, so if parsing fails then we correct the flag.
            match ExtendedHeader::read(&mut stream, header.version()) {
                Ok(ext) => extended_header = Some(ext),
                Err(_) => {
                    info!("resetting incorrectly-set extended header flag");
                    header.flags_mut().extended = false;
                    stream = checkpoint;
                }
            }
        }

        // Now walk the frames until the declared size is exhausted. All size
        // accounting is against the underlying stream, so an unsynchronised
        // payload terminates correctly as well.
        let mut frames = Vec::new();
        let mut skipped: u32 = 0;

        let header_size = header.version().frame_header_size();

        loop {
            if stream.remaining() < header_size {
                break;
            }

            let checkpoint = stream.clone();

            match frames::parse(&header, &mut stream) {
                Ok(ParsedFrame::Frame(frame)) => frames.push(frame),
                Ok(ParsedFrame::Skipped(total)) => skipped += total,
                Ok(ParsedFrame::Padding) => {
                    stream = checkpoint;
                    break;
                }
                Err(err) => {
                    // Frame data that cannot even be walked over, e.g. a
                    // truncated frame body. Stop with what we have.
                    warn!("tag data ended prematurely: {}", err);
                    break;
                }
            }
        }

        let padding = skipped + (tag_data.len() - stream.consumed()) as u32;

        Ok(Self {
            header,
            extended_header,
            frames,
            padding,
        })
    }

    /// Returns the version of this tag.
    pub fn version(&self) -> Version {
        self.header.version()
    }

    /// Returns the revision byte of this tag. This is zero in practice.
    pub fn revision(&self) -> u8 {
        self.header.revision()
    }

    /// Returns the declared payload size of this tag, in bytes. The size
    /// covers the extended header, the frames, and the padding, but not the
    /// 10-byte header itself.
    pub fn size(&self) -> u32 {
        self.header.size()
    }

    /// Returns whether the unsynchronisation flag was set on this tag.
    pub fn unsync(&self) -> bool {
        self.header.flags().unsync
    }

    /// Returns whether this tag was marked as experimental.
    pub fn experimental(&self) -> bool {
        self.header.flags().experimental
    }

    /// Returns whether this tag declares a trailing footer.
    pub fn footer(&self) -> bool {
        self.header.flags().footer
    }

    /// Returns the amount of payload bytes that did not decode into a frame:
    /// trailing padding, skipped unknown frames, and dropped malformed frames.
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Returns the first frame with the given kind, if one exists.
    pub fn get(&self, kind: FrameKind) -> Option<&Frame> {
        self.frames.iter().find(|frame| frame.kind() == kind)
    }

    /// Returns every frame with the given kind, in source order.
    pub fn get_all(&self, kind: FrameKind) -> Vec<&Frame> {
        self.frames
            .iter()
            .filter(|frame| frame.kind() == kind)
            .collect()
    }
}

fn read_fully(src: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;

    while total < buf.len() {
        match src.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(total)
}
