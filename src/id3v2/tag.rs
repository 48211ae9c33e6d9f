//! Tag headers and meta information.
//!
//! This module contains the items for the ID3v2 header, version, and extended header.

use crate::core::io::BufStream;
use crate::id3v2::syncdata::{self, TagStream};
use crate::id3v2::{ParseError, ParseResult};
use log::{error, warn};
use std::fmt::{self, Display, Formatter};

const ID: &[u8] = b"ID3";

/// The header at the start of every ID3v2 tag.
#[derive(Clone, Debug)]
pub struct TagHeader {
    version: Version,
    revision: u8,
    tag_size: u32,
    flags: TagFlags,
}

impl TagHeader {
    pub(crate) fn parse(raw: [u8; 10]) -> ParseResult<Self> {
        // Verify that this header has a valid ID3 identifier.
        if &raw[0..3] != ID {
            return Err(ParseError::NotFound);
        }

        let version = match raw[3] {
            2 => Version::V22,
            3 => Version::V23,
            4 => Version::V24,
            m => {
                error!("ID3v2.{} is not supported", m);
                return Err(ParseError::Unsupported);
            }
        };

        // The revision byte is freely incremented by compatible changes to the
        // spec, so it is recorded but otherwise ignored. 0xFF is forbidden.
        let revision = raw[4];

        if revision == 0xFF {
            error!("invalid tag revision");
            return Err(ParseError::MalformedData);
        }

        let flags = raw[5];

        // ID3v2.2 reserves bit 6 for a compression scheme it never defined, and
        // instructs readers to ignore the whole tag if it is set.
        if version == Version::V22 && flags & 0x40 != 0 {
            error!("ID3v2.2 tag-level compression is not supported");
            return Err(ParseError::Unsupported);
        }

        // Treat any unused flags being set as malformed data.
        if (version == Version::V22 && flags & 0x3F != 0)
            || (version == Version::V23 && flags & 0x1F != 0)
            || (version == Version::V24 && flags & 0x0F != 0)
        {
            error!("unused flags are set on the tag header");
            return Err(ParseError::MalformedData);
        }

        let flags = TagFlags {
            unsync: flags & 0x80 != 0,
            extended: flags & 0x40 != 0,
            experimental: flags & 0x20 != 0,
            footer: flags & 0x10 != 0,
        };

        // Tag sizes are always sync-safe. A set high bit rejects the tag.
        let tag_size = syncdata::to_u28([raw[6], raw[7], raw[8], raw[9]])?;

        // ID3v2 tags must be at least 1 byte and never more than 256mb.
        if tag_size == 0 || tag_size > 256_000_000 {
            error!("tag size can only be 1b..256mb");
            return Err(ParseError::MalformedData);
        }

        Ok(Self {
            version,
            revision,
            tag_size,
            flags,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_version(version: Version) -> Self {
        Self {
            version,
            revision: 0,
            tag_size: 0,
            flags: TagFlags::default(),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn revision(&self) -> u8 {
        self.revision
    }

    pub fn size(&self) -> u32 {
        self.tag_size
    }

    pub(crate) fn flags(&self) -> TagFlags {
        self.flags
    }

    pub(crate) fn flags_mut(&mut self) -> &mut TagFlags {
        &mut self.flags
    }
}

/// The overall flags for a tag. This is meant for internal use.
#[derive(Default, Clone, Copy, Debug)]
pub(crate) struct TagFlags {
    pub unsync: bool,
    pub extended: bool,
    pub experimental: bool,
    pub footer: bool,
}

/// The version of an ID3v2 tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Version {
    /// ID3v2.2.
    V22,
    /// ID3v2.3.
    V23,
    /// ID3v2.4.
    V24,
}

impl Version {
    /// Returns the size of a frame header in this version, in bytes.
    pub fn frame_header_size(&self) -> usize {
        match self {
            Self::V22 => 6,
            Self::V23 | Self::V24 => 10,
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::V22 => write![f, "ID3v2.2"],
            Self::V23 => write![f, "ID3v2.3"],
            Self::V24 => write![f, "ID3v2.4"],
        }
    }
}

/// The optional extended header of an ID3v2.3 or ID3v2.4 tag.
///
/// Everything in here describes how the tag was written and is recorded for
/// diagnostics only. In particular, the CRC-32 checksum is never verified.
#[derive(Default, Debug, Clone)]
pub struct ExtendedHeader {
    /// The declared size of the extended header.
    pub size: u32,
    /// ID3v2.3 only, the amount of padding after the frames.
    pub padding_size: Option<u32>,
    /// A CRC-32 checksum of the tag data.
    pub crc32: Option<u32>,
    /// ID3v2.4 only, whether this tag is an update to an earlier tag.
    pub is_update: bool,
    /// ID3v2.4 only, restrictions the tag was written under.
    pub restrictions: Option<Restrictions>,
}

impl ExtendedHeader {
    pub(crate) fn read(stream: &mut TagStream, version: Version) -> ParseResult<Self> {
        match version {
            Version::V22 => Err(ParseError::Unsupported),
            Version::V23 => read_ext_v3(stream),
            Version::V24 => read_ext_v4(stream),
        }
    }

    /// Returns the CRC-32 checksum as a lower-case hex string, if present.
    pub fn crc32_hex(&self) -> Option<String> {
        self.crc32.map(|crc| format!["{:08x}", crc])
    }
}

fn read_ext_v3(stream: &mut TagStream) -> ParseResult<ExtendedHeader> {
    let size = u32::from_be_bytes(stream.read_array()?);

    // The declared size excludes the size field itself and should be 6 or 10 bytes.
    if size != 6 && size != 10 {
        error!("ID3v2.3 extended headers are 6 or 10 bytes, found {}", size);
        return Err(ParseError::MalformedData);
    }

    let body = stream.read_vec(size as usize)?;
    let mut body = BufStream::new(&body);

    let flags = body.read_be_u16()?;

    let mut header = ExtendedHeader {
        size,
        padding_size: Some(body.read_be_u32()?),
        ..Default::default()
    };

    if flags & 0x8000 != 0 {
        if size != 10 {
            error!("CRC-32 flag is set without the data being present");
            return Err(ParseError::MalformedData);
        }

        header.crc32 = Some(body.read_be_u32()?);
    }

    Ok(header)
}

fn read_ext_v4(stream: &mut TagStream) -> ParseResult<ExtendedHeader> {
    let size = syncdata::to_u28(stream.read_array()?)?;

    // The declared size includes itself and can be at most between 6 and 15 bytes.
    if !(6..=15).contains(&size) {
        error!("ID3v2.4 extended headers can only be 6 to 15 bytes long");
        return Err(ParseError::MalformedData);
    }

    let body = stream.read_vec(size as usize - 4)?;
    let mut body = BufStream::new(&body);

    // The flag byte count is always 1 in this revision of the spec.
    if body.read_u8()? != 1 {
        warn!("ID3v2.4 extended headers should have a flag count of 1");
    }

    let mut header = ExtendedHeader {
        size,
        ..Default::default()
    };

    let flags = body.read_u8()?;

    // Tag is an update. This flag has no accompanying data.
    if flags & 0x40 != 0 {
        if body.read_u8()? != 0 {
            error!("invalid is_update length");
            return Err(ParseError::MalformedData);
        }

        header.is_update = true;
    }

    // CRC-32 data, a 35-bit sync-safe integer.
    if flags & 0x20 != 0 {
        if body.read_u8()? != 5 {
            error!("invalid CRC-32 length");
            return Err(ParseError::MalformedData);
        }

        header.crc32 = Some(syncdata::to_u35(body.read_array()?));
    }

    // Tag restrictions. These are flags for how the tag was *encoded*, not how
    // it should decode, so nothing acts on them.
    if flags & 0x10 != 0 {
        if body.read_u8()? != 1 {
            error!("invalid restrictions length");
            return Err(ParseError::MalformedData);
        }

        let restrictions = body.read_u8()?;

        let tag_size = match (restrictions & 0xC0) >> 6 {
            0 => TagSizeRestriction::Max128Frames1Mb,
            1 => TagSizeRestriction::Max64Frames128Kb,
            2 => TagSizeRestriction::Max32Frames40Kb,
            3 => TagSizeRestriction::Max32Frames4Kb,
            _ => unreachable!(),
        };

        let text_encoding = match (restrictions & 0x20) >> 5 {
            0 => TextEncodingRestriction::None,
            1 => TextEncodingRestriction::Latin1OrUtf8,
            _ => unreachable!(),
        };

        let text_size = match (restrictions & 0x18) >> 3 {
            0 => TextSizeRestriction::None,
            1 => TextSizeRestriction::LessThan1024Chars,
            2 => TextSizeRestriction::LessThan128Chars,
            3 => TextSizeRestriction::LessThan30Chars,
            _ => unreachable!(),
        };

        let image_encoding = match (restrictions & 0x04) >> 2 {
            0 => ImageEncodingRestriction::None,
            1 => ImageEncodingRestriction::OnlyPngOrJpeg,
            _ => unreachable!(),
        };

        let image_size = match restrictions & 0x03 {
            0 => ImageSizeRestriction::None,
            1 => ImageSizeRestriction::LessThan256x256,
            2 => ImageSizeRestriction::LessThan64x64,
            3 => ImageSizeRestriction::Exactly64x64,
            _ => unreachable!(),
        };

        header.restrictions = Some(Restrictions {
            tag_size,
            text_encoding,
            text_size,
            image_encoding,
            image_size,
        })
    }

    Ok(header)
}

/// The restrictions a ID3v2.4 tag was encoded with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Restrictions {
    pub tag_size: TagSizeRestriction,
    pub text_encoding: TextEncodingRestriction,
    pub text_size: TextSizeRestriction,
    pub image_encoding: ImageEncodingRestriction,
    pub image_size: ImageSizeRestriction,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TagSizeRestriction {
    Max128Frames1Mb = 0,
    Max64Frames128Kb = 1,
    Max32Frames40Kb = 2,
    Max32Frames4Kb = 3,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextEncodingRestriction {
    None = 0,
    Latin1OrUtf8 = 1,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextSizeRestriction {
    None = 0,
    LessThan1024Chars = 1,
    LessThan128Chars = 2,
    LessThan30Chars = 3,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImageEncodingRestriction {
    None = 0,
    OnlyPngOrJpeg = 1,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImageSizeRestriction {
    None = 0,
    LessThan256x256 = 1,
    LessThan64x64 = 2,
    Exactly64x64 = 3,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXT_DATA_V3: &[u8] = b"\x00\x00\x00\x0A\x80\x00\xAB\xCD\xEF\x16\x16\x16\x16\x16";
    const EXT_DATA_V4: &[u8] = b"\x00\x00\x00\x0F\x01\x70\x00\x05\x07\x5E\x37\x5E\x16\x01\xB4";

    fn stream(data: &[u8]) -> TagStream {
        TagStream::Plain(BufStream::new(data))
    }

    #[test]
    fn parse_v3_tag_header() {
        let data = b"\x49\x44\x33\x03\x00\xA0\x00\x08\x49\x30";
        let header = TagHeader::parse(*data).unwrap();
        let flags = header.flags();

        assert_eq!(header.size(), 140464);
        assert_eq!(header.version(), Version::V23);
        assert_eq!(header.revision(), 0);

        assert!(flags.unsync);
        assert!(!flags.extended);
        assert!(flags.experimental);
    }

    #[test]
    fn parse_v4_tag_header() {
        let data = b"\x49\x44\x33\x04\x00\x50\x00\x08\x49\x30";
        let header = TagHeader::parse(*data).unwrap();
        let flags = header.flags();

        assert_eq!(header.size(), 140464);
        assert_eq!(header.version(), Version::V24);

        assert!(!flags.unsync);
        assert!(flags.extended);
        assert!(!flags.experimental);
        assert!(flags.footer);
    }

    #[test]
    fn reject_non_syncsafe_tag_size() {
        let data = b"\x49\x44\x33\x03\x00\x00\x80\x00\x00\x00";

        assert!(matches!(
            TagHeader::parse(*data),
            Err(ParseError::MalformedData)
        ));
    }

    #[test]
    fn reject_unsupported_version() {
        let data = b"\x49\x44\x33\x05\x00\x00\x00\x00\x00\x16";

        assert!(matches!(
            TagHeader::parse(*data),
            Err(ParseError::Unsupported)
        ));
    }

    #[test]
    fn parse_v3_ext_header() {
        let header = ExtendedHeader::read(&mut stream(EXT_DATA_V3), Version::V23).unwrap();

        assert_eq!(header.size, 10);
        assert_eq!(header.padding_size, Some(0xABCDEF16));
        assert_eq!(header.crc32, Some(0x16161616));
        assert!(!header.is_update);
        assert_eq!(header.restrictions, None);
    }

    #[test]
    fn parse_v4_ext_header() {
        let header = ExtendedHeader::read(&mut stream(EXT_DATA_V4), Version::V24).unwrap();

        assert_eq!(header.size, 15);
        assert_eq!(header.padding_size, None);
        assert_eq!(header.crc32, Some(0x7BCDEF16));
        assert_eq!(header.crc32_hex().unwrap(), "7bcdef16");
        assert!(header.is_update);

        let restrictions = header.restrictions.unwrap();

        assert_eq!(restrictions.tag_size, TagSizeRestriction::Max32Frames40Kb);
        assert_eq!(
            restrictions.text_encoding,
            TextEncodingRestriction::Latin1OrUtf8
        );
        assert_eq!(restrictions.text_size, TextSizeRestriction::LessThan128Chars);
        assert_eq!(
            restrictions.image_encoding,
            ImageEncodingRestriction::OnlyPngOrJpeg
        );
        assert_eq!(restrictions.image_size, ImageSizeRestriction::None);
    }
}
