//! Frame parsing and implementations.
//!
//! An ID3v2 tag is primarily made up of chunks of data, called "Frames" by the
//! spec. Frames are highly structured and heterogenous, so they are
//! represented as a sum over the frame families: a [`Frame`](Frame) carries
//! the identity, flags, and size that every frame has, while the
//! [`FrameBody`](FrameBody) inside it holds the family-specific payload.
//!
//! Frame structure differs significantly across tag versions. The header
//! layout, the size encoding, the flag bits, and the set of valid identifiers
//! all change between ID3v2.2, ID3v2.3, and ID3v2.4, which is why there is one
//! header parser per version here.

pub mod bin;
pub mod comments;
mod encoding;
pub mod file;
mod kind;
mod lang;
pub mod people;
pub mod text;
pub mod url;

pub use bin::{FileIdFrame, MusicCdFrame, PodcastFrame, UnknownFrame};
pub use comments::CommentsFrame;
pub use file::{AttachedPictureFrame, PictureType};
pub use kind::FrameKind;
pub use lang::Language;
pub use people::InvolvedPeopleFrame;
pub use text::{TextFrame, UserTextFrame};
pub use url::{UrlFrame, UserUrlFrame};

use crate::core::io::BufStream;
use crate::id3v2::syncdata::{self, TagStream};
use crate::id3v2::tag::{TagHeader, Version};
use crate::id3v2::ParseResult;

use log::{info, warn};
use std::fmt::{self, Display, Formatter};
use std::str;

/// One decoded frame of an ID3v2 tag.
#[derive(Debug, Clone)]
pub struct Frame {
    id: FrameId,
    kind: FrameKind,
    flags: FrameFlags,
    total_size: u32,
    /// The family-specific payload.
    pub body: FrameBody,
}

impl Frame {
    /// The identifier this frame was parsed from. ID3v2.2 identifiers are
    /// normalised to their modern 4-character analogues.
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// The canonical identity of this frame.
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn flags(&self) -> &FrameFlags {
        &self.flags
    }

    /// The total space this frame occupied in the tag, header included.
    pub fn total_size(&self) -> u32 {
        self.total_size
    }

    /// Returns the primary text of this frame, if it has any.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            FrameBody::Text(frame) => Some(frame.main()),
            FrameBody::UserText(frame) => Some(&frame.value),
            FrameBody::Url(frame) => Some(&frame.url),
            FrameBody::UserUrl(frame) => Some(&frame.url),
            FrameBody::Comment(frame) => Some(&frame.text),
            _ => None,
        }
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.body {
            FrameBody::Text(frame) => Display::fmt(frame, f),
            FrameBody::UserText(frame) => Display::fmt(frame, f),
            FrameBody::Url(frame) => Display::fmt(frame, f),
            FrameBody::UserUrl(frame) => Display::fmt(frame, f),
            FrameBody::Comment(frame) => Display::fmt(frame, f),
            FrameBody::People(frame) => Display::fmt(frame, f),
            FrameBody::FileId(frame) => Display::fmt(frame, f),
            FrameBody::MusicCd(frame) => Display::fmt(frame, f),
            FrameBody::Picture(frame) => Display::fmt(frame, f),
            FrameBody::Podcast(frame) => Display::fmt(frame, f),
            FrameBody::Unknown(frame) => Display::fmt(frame, f),
        }
    }
}

/// The payload of a frame.
#[derive(Debug, Clone)]
pub enum FrameBody {
    Text(TextFrame),
    UserText(UserTextFrame),
    Url(UrlFrame),
    UserUrl(UserUrlFrame),
    Comment(CommentsFrame),
    People(InvolvedPeopleFrame),
    FileId(FileIdFrame),
    MusicCd(MusicCdFrame),
    Picture(AttachedPictureFrame),
    Podcast(PodcastFrame),
    Unknown(UnknownFrame),
}

/// A 4-character frame identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct FrameId([u8; 4]);

impl FrameId {
    pub fn inner(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // We've asserted that this frame is ASCII, so we can unwrap.
        str::from_utf8(&self.0).unwrap()
    }

    pub fn starts_with(&self, ch: u8) -> bool {
        self.0[0] == ch
    }
}

impl Display for FrameId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write![f, "{}", self.as_str()]
    }
}

impl PartialEq<[u8; 4]> for FrameId {
    fn eq(&self, other: &[u8; 4]) -> bool {
        self.0 == *other
    }
}

impl PartialEq<&[u8; 4]> for FrameId {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        self == *other
    }
}

/// Valid frame identifiers can only contain uppercase ASCII chars and numbers.
fn is_frame_id(id: &[u8]) -> bool {
    id.iter().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// The flags attached to a single frame.
///
/// The preservation bits are written by the spec as discard instructions, so
/// in here a *set* wire bit reads as `preserve_* = false`. Frames in the
/// version's discard-when-file-altered set always read as
/// `preserve_on_file_alter = false`, whatever the wire bit says.
#[derive(Clone, Copy, Debug)]
pub struct FrameFlags {
    pub preserve_on_tag_alter: bool,
    pub preserve_on_file_alter: bool,
    pub read_only: bool,
    pub compressed: bool,
    pub unsync: bool,
    /// The data length indicator, when one was present. For compressed
    /// ID3v2.3 frames this is the declared decompressed size.
    pub data_length: Option<u32>,
    pub encryption_method: Option<u8>,
    pub group_id: Option<u8>,
}

impl Default for FrameFlags {
    fn default() -> Self {
        Self {
            preserve_on_tag_alter: true,
            preserve_on_file_alter: true,
            read_only: false,
            compressed: false,
            unsync: false,
            data_length: None,
            encryption_method: None,
            group_id: None,
        }
    }
}

/// The outcome of reading one frame slot from the tag body.
#[derive(Debug)]
pub(crate) enum ParsedFrame {
    /// A frame was parsed.
    Frame(Frame),
    /// A frame slot was consumed without producing a frame, e.g. an unknown
    /// identifier or a malformed body. Carries the total amount of bytes the
    /// slot occupied.
    Skipped(u32),
    /// The padding has been reached, don't parse any further.
    Padding,
}

pub(crate) fn parse(tag_header: &TagHeader, stream: &mut TagStream) -> ParseResult<ParsedFrame> {
    match tag_header.version() {
        Version::V22 => parse_frame_v2(stream),
        Version::V23 => parse_frame_v3(stream),
        Version::V24 => parse_frame_v4(tag_header, stream),
    }
}

fn parse_frame_v2(stream: &mut TagStream) -> ParseResult<ParsedFrame> {
    let id = stream.read_array::<3>()?;

    // The moment we've hit an invalid identifier, we've reached the padding.
    // It should be all zeroes, but not every tagger got the memo.
    if !is_frame_id(&id) {
        if id != [0, 0, 0] {
            warn!("padding bytes are not zero");
        }

        return Ok(ParsedFrame::Padding);
    }

    let size_bytes = stream.read_array::<3>()?;
    let size = u32::from_be_bytes([0, size_bytes[0], size_bytes[1], size_bytes[2]]);
    let total = 6 + size;

    if size == 0 {
        warn!("dropping zero-length frame");
        return Ok(ParsedFrame::Skipped(total));
    }

    let data = stream.read_vec(size as usize)?;
    let mut body = BufStream::new(&data);

    // Map the legacy identifier onto its modern analogue. An unmappable
    // "T.."/"W.." identifier decodes as a bare text or URL body, everything
    // else is skipped.
    let (frame_id, frame_kind, frame_body) = match kind::modernize(&id) {
        Some(modern) => {
            let frame_kind = kind::lookup(Version::V22, modern).unwrap_or(FrameKind::Unknown);
            (
                FrameId(*modern),
                frame_kind,
                decode_body(frame_kind, &mut body, Version::V22),
            )
        }

        None if id[0] == b'T' => (
            FrameId(*b"TXXX"),
            FrameKind::UserText,
            TextFrame::parse(&mut body, Version::V22).map(FrameBody::Text),
        ),

        None if id[0] == b'W' => (
            FrameId(*b"WXXX"),
            FrameKind::UserUrl,
            UrlFrame::parse(&mut body).map(FrameBody::Url),
        ),

        None => {
            info!("skipping unknown frame {}", String::from_utf8_lossy(&id));
            return Ok(ParsedFrame::Skipped(total));
        }
    };

    // ID3v2.2 has no frame flags, but the discard set still applies.
    let mut flags = FrameFlags::default();

    if kind::discard_on_file_alter(Version::V22, frame_id.inner()) {
        flags.preserve_on_file_alter = false;
    }

    match frame_body {
        Ok(frame_body) => Ok(ParsedFrame::Frame(Frame {
            id: frame_id,
            kind: frame_kind,
            flags,
            total_size: total,
            body: frame_body,
        })),
        Err(err) => {
            warn!("dropping malformed frame {}: {}", frame_id, err);
            Ok(ParsedFrame::Skipped(total))
        }
    }
}

fn parse_frame_v3(stream: &mut TagStream) -> ParseResult<ParsedFrame> {
    let id = stream.read_array::<4>()?;

    if !is_frame_id(&id) {
        if id != [0, 0, 0, 0] {
            warn!("padding bytes are not zero");
        }

        return Ok(ParsedFrame::Padding);
    }

    let frame_id = FrameId(id);
    let size = u32::from_be_bytes(stream.read_array()?);
    let bits = u16::from_be_bytes(stream.read_array()?);
    let total = 10 + size;

    if size == 0 {
        warn!("dropping zero-length frame {}", frame_id);
        return Ok(ParsedFrame::Skipped(total));
    }

    let mut flags = FrameFlags {
        preserve_on_tag_alter: bits & 0x8000 == 0,
        preserve_on_file_alter: bits & 0x4000 == 0,
        read_only: bits & 0x2000 != 0,
        compressed: bits & 0x0080 != 0,
        ..Default::default()
    };

    let encrypted = bits & 0x0040 != 0;
    let grouped = bits & 0x0020 != 0;

    let data = stream.read_vec(size as usize)?;
    let mut body = BufStream::new(&data);

    // Flag sub-fields sit at the start of the body in this fixed order. The
    // compression size is a plain big-endian integer, not sync-safe.
    let extras = (|| -> ParseResult<()> {
        if flags.compressed {
            flags.data_length = Some(body.read_be_u32()?);
        }

        if encrypted {
            flags.encryption_method = Some(body.read_u8()?);
        }

        if grouped {
            flags.group_id = Some(body.read_u8()?);
        }

        Ok(())
    })();

    if extras.is_err() {
        warn!("dropping frame {} smaller than its flag data", frame_id);
        return Ok(ParsedFrame::Skipped(total));
    }

    if kind::discard_on_file_alter(Version::V23, frame_id.inner()) {
        flags.preserve_on_file_alter = false;
    }

    finish_frame(Version::V23, frame_id, flags, total, encrypted, &mut body)
}

fn parse_frame_v4(tag_header: &TagHeader, stream: &mut TagStream) -> ParseResult<ParsedFrame> {
    let id = stream.read_array::<4>()?;

    if !is_frame_id(&id) {
        if id != [0, 0, 0, 0] {
            warn!("padding bytes are not zero");
        }

        return Ok(ParsedFrame::Padding);
    }

    let frame_id = FrameId(id);

    // ID3v2.4 sizes *should* be sync-safe, but iTunes wrote ID3v2.3-style
    // sizes for a while. Fix that.
    let size_bytes = stream.read_array::<4>()?;

    let mut size = match syncdata::to_u28(size_bytes) {
        Ok(size) => size,
        Err(_) => u32::from_be_bytes(size_bytes),
    };

    if size >= 0x80 {
        size = fix_itunes_frame_size(size_bytes, size, stream).unwrap_or(size);
    }

    let bits = u16::from_be_bytes(stream.read_array()?);
    let total = 10 + size;

    if size == 0 {
        warn!("dropping zero-length frame {}", frame_id);
        return Ok(ParsedFrame::Skipped(total));
    }

    let mut flags = FrameFlags {
        preserve_on_tag_alter: bits & 0x4000 == 0,
        preserve_on_file_alter: bits & 0x2000 == 0,
        read_only: bits & 0x1000 != 0,
        compressed: bits & 0x0008 != 0,
        unsync: bits & 0x0002 != 0,
        ..Default::default()
    };

    let grouped = bits & 0x0040 != 0;
    let encrypted = bits & 0x0004 != 0;
    let has_data_length = bits & 0x0001 != 0;

    let mut data = stream.read_vec(size as usize)?;

    // Frame-level unsynchronisation. When the tag-level flag is set every
    // frame is unsynchronised whether or not its own bit is, and the filter
    // is only applied once either way.
    if flags.unsync || tag_header.flags().unsync {
        data = syncdata::decode(&mut BufStream::new(&data));
    }

    let mut body = BufStream::new(&data);

    // Flag sub-fields in this fixed order. Unlike ID3v2.3, the data length
    // indicator is sync-safe.
    let extras = (|| -> ParseResult<()> {
        if grouped {
            flags.group_id = Some(body.read_u8()?);
        }

        if encrypted {
            flags.encryption_method = Some(body.read_u8()?);
        }

        if has_data_length || flags.compressed {
            flags.data_length = Some(syncdata::to_u28(body.read_array()?)?);
        }

        Ok(())
    })();

    if extras.is_err() {
        warn!("dropping frame {} smaller than its flag data", frame_id);
        return Ok(ParsedFrame::Skipped(total));
    }

    if kind::discard_on_file_alter(Version::V24, frame_id.inner()) {
        flags.preserve_on_file_alter = false;
    }

    finish_frame(Version::V24, frame_id, flags, total, encrypted, &mut body)
}

/// Chooses and runs the body decoder shared by the ID3v2.3/ID3v2.4 paths.
fn finish_frame(
    version: Version,
    frame_id: FrameId,
    flags: FrameFlags,
    total: u32,
    encrypted: bool,
    body: &mut BufStream,
) -> ParseResult<ParsedFrame> {
    // Compressed and encrypted bodies are not interpreted, only passed
    // through. The flags keep whatever sub-fields were present.
    if flags.compressed || encrypted {
        warn!("frame {} has an uninterpretable body", frame_id);

        return Ok(ParsedFrame::Frame(Frame {
            id: frame_id,
            kind: FrameKind::Unknown,
            flags,
            total_size: total,
            body: FrameBody::Unknown(UnknownFrame::from_stream(body)),
        }));
    }

    let parsed = match kind::lookup(version, frame_id.inner()) {
        Some(frame_kind) => decode_body(frame_kind, body, version).map(|b| (frame_kind, b)),

        // Unknown identifiers: a "T..." frame decodes as user-defined text, a
        // "W..." frame as a user-defined URL, and everything else is skipped.
        None if frame_id.starts_with(b'T') => TextFrame::parse(body, version)
            .map(|frame| (FrameKind::UserText, FrameBody::Text(frame))),
        None if frame_id.starts_with(b'W') => {
            UrlFrame::parse(body).map(|frame| (FrameKind::UserUrl, FrameBody::Url(frame)))
        }
        None => {
            info!("skipping unknown frame {}", frame_id);
            return Ok(ParsedFrame::Skipped(total));
        }
    };

    match parsed {
        Ok((frame_kind, frame_body)) => Ok(ParsedFrame::Frame(Frame {
            id: frame_id,
            kind: frame_kind,
            flags,
            total_size: total,
            body: frame_body,
        })),
        Err(err) => {
            // A malformed body only drops this frame. The declared size still
            // tells us where the next frame starts.
            warn!("dropping malformed frame {}: {}", frame_id, err);
            Ok(ParsedFrame::Skipped(total))
        }
    }
}

fn decode_body(
    frame_kind: FrameKind,
    stream: &mut BufStream,
    version: Version,
) -> ParseResult<FrameBody> {
    let body = match frame_kind {
        FrameKind::UserText => FrameBody::UserText(UserTextFrame::parse(stream, version)?),
        FrameKind::UserUrl => FrameBody::UserUrl(UserUrlFrame::parse(stream, version)?),
        FrameKind::Comment => FrameBody::Comment(CommentsFrame::parse(stream, version)?),
        FrameKind::FileId => FrameBody::FileId(FileIdFrame::parse(stream)?),
        FrameKind::MusicCdId => FrameBody::MusicCd(MusicCdFrame::parse(stream)?),
        FrameKind::Picture => FrameBody::Picture(AttachedPictureFrame::parse(stream, version)?),
        FrameKind::Podcast => FrameBody::Podcast(PodcastFrame::parse(stream)?),

        FrameKind::InvolvedPeople | FrameKind::MusicianCredits => {
            FrameBody::People(InvolvedPeopleFrame::parse(stream, version)?)
        }

        FrameKind::AudioFileUrl
        | FrameKind::ArtistUrl
        | FrameKind::AudioSourceUrl
        | FrameKind::CommercialUrl
        | FrameKind::CopyrightUrl
        | FrameKind::PublisherUrl
        | FrameKind::StationUrl
        | FrameKind::PaymentUrl => FrameBody::Url(UrlFrame::parse(stream)?),

        // Everything else in the tables is a text frame, including WFED.
        _ => FrameBody::Text(TextFrame::parse(stream, version)?),
    };

    Ok(body)
}

fn fix_itunes_frame_size(
    size_bytes: [u8; 4],
    v4_size: u32,
    stream: &TagStream,
) -> ParseResult<u32> {
    let v4_size = v4_size as usize;

    let mut next_id = [0; 4];
    next_id.copy_from_slice(stream.peek(v4_size + 2..v4_size + 6)?);

    if next_id[0] != 0 && !is_frame_id(&next_id) {
        // If the raw size leads us to the next frame where the "sync-safe"
        // size wouldn't, we will use that size instead.
        let v3_size = u32::from_be_bytes(size_bytes) as usize;
        next_id.copy_from_slice(stream.peek(v3_size + 2..v3_size + 6)?);

        if is_frame_id(&next_id) {
            info!("correcting non-syncsafe ID3v2.4 frame size");
            return Ok(v3_size as u32);
        }
    }

    Ok(v4_size as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::string::Encoding;

    fn parse_one(version: Version, data: &[u8]) -> ParsedFrame {
        let header = TagHeader::with_version(version);
        let mut stream = TagStream::Plain(BufStream::new(data));
        parse(&header, &mut stream).unwrap()
    }

    fn expect_frame(parsed: ParsedFrame) -> Frame {
        match parsed {
            ParsedFrame::Frame(frame) => frame,
            other => panic!("expected a frame, got {:?}", other),
        }
    }

    #[test]
    fn parse_v3_text_frame() {
        let data = b"TIT2\x00\x00\x00\x02\x00\x00\x00X";
        let frame = expect_frame(parse_one(Version::V23, data));

        assert_eq!(frame.id(), b"TIT2");
        assert_eq!(frame.kind(), FrameKind::Title);
        assert_eq!(frame.total_size(), 12);
        assert_eq!(frame.text(), Some("X"));
    }

    #[test]
    fn parse_v3_frame_flags() {
        let data = b"TXXX\x00\x00\x00\x07\xA0\x20\x16\x00abc\0d";
        let frame = expect_frame(parse_one(Version::V23, data));

        let flags = frame.flags();
        assert!(!flags.preserve_on_tag_alter);
        assert!(flags.preserve_on_file_alter);
        assert!(flags.read_only);
        assert_eq!(flags.group_id, Some(0x16));

        match &frame.body {
            FrameBody::UserText(frame) => {
                assert_eq!(frame.desc, "abc");
                assert_eq!(frame.value, "d");
            }
            other => panic!("expected user text, got {:?}", other),
        }
    }

    #[test]
    fn parse_v4_frame_flags() {
        // Grouped + data length indicator.
        let data = b"TIT2\x00\x00\x00\x07\x00\x41\x16\x00\x00\x00\x02\x00X";
        let frame = expect_frame(parse_one(Version::V24, data));

        assert_eq!(frame.flags().group_id, Some(0x16));
        assert_eq!(frame.flags().data_length, Some(2));
        assert_eq!(frame.text(), Some("X"));
    }

    #[test]
    fn parse_v4_unsync_frame() {
        // The frame-level unsync flag reverses FF 00 -> FF within the body.
        let data = b"TIT2\x00\x00\x00\x04\x00\x02\x00\xFF\x00\x58";
        let frame = expect_frame(parse_one(Version::V24, data));

        assert!(frame.flags().unsync);

        match &frame.body {
            FrameBody::Text(text) => {
                assert_eq!(text.encoding, Encoding::Latin1);
                assert_eq!(text.text[0], "ÿX");
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn override_discard_sets() {
        // TLEN is in the discard set even with a zero flag field.
        let data = b"TLEN\x00\x00\x00\x07\x00\x00\x00216000";
        let frame = expect_frame(parse_one(Version::V23, data));

        assert_eq!(frame.kind(), FrameKind::Length);
        assert!(!frame.flags().preserve_on_file_alter);
        assert!(frame.flags().preserve_on_tag_alter);
    }

    #[test]
    fn unknown_text_frame_decodes_as_user_text() {
        let data = b"TABC\x00\x00\x00\x05\x00\x00\x00test";
        let frame = expect_frame(parse_one(Version::V23, data));

        assert_eq!(frame.id(), b"TABC");
        assert_eq!(frame.kind(), FrameKind::UserText);
        assert_eq!(frame.text(), Some("test"));
    }

    #[test]
    fn unknown_frame_is_skipped() {
        let data = b"XENC\x00\x00\x00\x04\x00\x00\x16\x16\x16\x16";

        match parse_one(Version::V23, data) {
            ParsedFrame::Skipped(total) => assert_eq!(total, 14),
            other => panic!("expected a skip, got {:?}", other),
        }
    }

    #[test]
    fn malformed_body_is_dropped() {
        // Invalid encoding byte.
        let data = b"TIT2\x00\x00\x00\x02\x00\x00\x09X";

        match parse_one(Version::V23, data) {
            ParsedFrame::Skipped(total) => assert_eq!(total, 12),
            other => panic!("expected a skip, got {:?}", other),
        }
    }

    #[test]
    fn compressed_body_is_passed_through() {
        let data = b"TIT2\x00\x00\x00\x07\x00\x80\x00\x00\x00\x40\x16\x16\x16";
        let frame = expect_frame(parse_one(Version::V23, data));

        assert_eq!(frame.kind(), FrameKind::Unknown);
        assert!(frame.flags().compressed);
        assert_eq!(frame.flags().data_length, Some(0x40));

        match &frame.body {
            FrameBody::Unknown(unknown) => assert_eq!(unknown.data, b"\x16\x16\x16"),
            other => panic!("expected a raw body, got {:?}", other),
        }
    }

    #[test]
    fn zero_id_is_padding() {
        let data = b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00";

        assert!(matches!(
            parse_one(Version::V23, data),
            ParsedFrame::Padding
        ));
    }

    #[test]
    fn parse_v2_frame() {
        let data = b"TT2\x00\x00\x02\x00X";
        let frame = expect_frame(parse_one(Version::V22, data));

        assert_eq!(frame.id(), b"TIT2");
        assert_eq!(frame.kind(), FrameKind::Title);
        assert_eq!(frame.total_size(), 8);
        assert_eq!(frame.text(), Some("X"));
    }

    #[test]
    fn parse_v2_picture() {
        let data = b"PIC\x00\x00\x0B\x00PNG\x03c\0\x89PNG";
        let frame = expect_frame(parse_one(Version::V22, data));

        assert_eq!(frame.id(), b"APIC");
        assert_eq!(frame.kind(), FrameKind::Picture);

        match &frame.body {
            FrameBody::Picture(picture) => {
                assert_eq!(picture.mime, "image/png");
                assert_eq!(picture.pic_type, PictureType::FrontCover);
                assert_eq!(picture.desc, "c");
                assert_eq!(picture.picture, b"\x89PNG");
            }
            other => panic!("expected a picture, got {:?}", other),
        }
    }
}
