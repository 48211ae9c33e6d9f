//! Canonical frame identities and per-version identifier tables.
//!
//! Frames are looked up by their 3 or 4 character identifier, but the set of
//! valid identifiers and their meanings shift between ID3v2 revisions. A
//! [`FrameKind`](FrameKind) names a frame independently of the revision it was
//! read from, which is what consumers match on.

use crate::id3v2::tag::Version;
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

/// The normalised identity of a frame, independent of the revision-specific
/// identifier it was parsed from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FrameKind {
    // Text information.
    ContentGroup,
    Title,
    Subtitle,
    LeadArtist,
    Band,
    Conductor,
    Remixer,
    Composer,
    Lyricist,
    Language,
    Genre,
    Album,
    DiscNumber,
    TrackNumber,
    Isrc,
    Year,
    Date,
    Time,
    RecordingDates,
    MediaType,
    FileType,
    Bpm,
    Copyright,
    Publisher,
    EncodedBy,
    EncoderSettings,
    OriginalFilename,
    Length,
    Size,
    PlaylistDelay,
    InitialKey,
    OriginalAlbum,
    OriginalArtist,
    OriginalLyricist,
    OriginalReleaseYear,
    FileOwner,
    StationName,
    StationOwner,
    // iTunes podcast text information.
    PodcastId,
    PodcastCategory,
    PodcastDescription,
    PodcastKeywords,
    /// iTunes `WFED`. Despite the identifier, this is a text frame.
    PodcastFeed,
    // ID3v2.4 timestamps.
    EncodingTime,
    OriginalReleaseTime,
    RecordingTime,
    ReleaseTime,
    TaggingTime,
    // Remaining ID3v2.4 text information.
    Mood,
    ProducedNotice,
    AlbumSort,
    ArtistSort,
    TitleSort,
    SetSubtitle,
    // URL links.
    AudioFileUrl,
    ArtistUrl,
    AudioSourceUrl,
    CommercialUrl,
    CopyrightUrl,
    PublisherUrl,
    StationUrl,
    PaymentUrl,
    // Everything else.
    UserText,
    UserUrl,
    InvolvedPeople,
    MusicianCredits,
    FileId,
    MusicCdId,
    Picture,
    Comment,
    Podcast,
    /// A frame that was recognised but whose body could not be interpreted,
    /// such as an encrypted or compressed frame.
    Unknown,
}

macro_rules! kind_map {
    ($($id:literal => $kind:ident,)*) => {{
        let mut map: HashMap<&'static [u8; 4], FrameKind> = HashMap::new();
        $(map.insert($id, FrameKind::$kind);)*
        map
    }}
}

lazy_static! {
    static ref KINDS_V3: HashMap<&'static [u8; 4], FrameKind> = kind_map! {
        b"UFID" => FileId,
        b"TIT1" => ContentGroup,
        b"TIT2" => Title,
        b"TIT3" => Subtitle,
        b"TPE1" => LeadArtist,
        b"TPE2" => Band,
        b"TPE3" => Conductor,
        b"TPE4" => Remixer,
        b"TCOM" => Composer,
        b"TEXT" => Lyricist,
        b"TLAN" => Language,
        b"TCON" => Genre,
        b"TDES" => PodcastDescription,
        b"TALB" => Album,
        b"TPOS" => DiscNumber,
        b"TRCK" => TrackNumber,
        b"TSRC" => Isrc,
        b"TYER" => Year,
        b"TDAT" => Date,
        b"TIME" => Time,
        b"TRDA" => RecordingDates,
        b"TMED" => MediaType,
        b"TFLT" => FileType,
        b"TBPM" => Bpm,
        b"TCOP" => Copyright,
        b"TPUB" => Publisher,
        b"TENC" => EncodedBy,
        b"TSSE" => EncoderSettings,
        b"TOFN" => OriginalFilename,
        b"TLEN" => Length,
        b"TSIZ" => Size,
        b"TDLY" => PlaylistDelay,
        b"TKEY" => InitialKey,
        b"TOAL" => OriginalAlbum,
        b"TOPE" => OriginalArtist,
        b"TOLY" => OriginalLyricist,
        b"TORY" => OriginalReleaseYear,
        b"TOWN" => FileOwner,
        b"TRSN" => StationName,
        b"TRSO" => StationOwner,
        b"TGID" => PodcastId,
        b"TCAT" => PodcastCategory,
        b"TDRL" => ReleaseTime,
        b"TKWD" => PodcastKeywords,
        b"TXXX" => UserText,
        b"WOAF" => AudioFileUrl,
        b"WOAR" => ArtistUrl,
        b"WOAS" => AudioSourceUrl,
        b"WCOM" => CommercialUrl,
        b"WCOP" => CopyrightUrl,
        b"WPUB" => PublisherUrl,
        b"WORS" => StationUrl,
        b"WPAY" => PaymentUrl,
        b"WFED" => PodcastFeed,
        b"WXXX" => UserUrl,
        b"IPLS" => InvolvedPeople,
        b"MCDI" => MusicCdId,
        b"COMM" => Comment,
        b"APIC" => Picture,
        b"PCST" => Podcast,
    };

    static ref KINDS_V4: HashMap<&'static [u8; 4], FrameKind> = {
        // ID3v2.4 drops the legacy date frames and IPLS, and adds the
        // timestamp, sort, and credits frames.
        let mut map = kind_map! {
            b"TDEN" => EncodingTime,
            b"TDOR" => OriginalReleaseTime,
            b"TDRC" => RecordingTime,
            b"TDTG" => TaggingTime,
            b"TIPL" => InvolvedPeople,
            b"TMCL" => MusicianCredits,
            b"TMOO" => Mood,
            b"TPRO" => ProducedNotice,
            b"TSOA" => AlbumSort,
            b"TSOP" => ArtistSort,
            b"TSOT" => TitleSort,
            b"TSST" => SetSubtitle,
        };

        for (&id, &kind) in KINDS_V3.iter() {
            match id {
                b"TYER" | b"TDAT" | b"TIME" | b"TRDA" | b"TSIZ" | b"TORY" | b"IPLS" => (),
                _ => {
                    map.insert(id, kind);
                }
            }
        }

        map
    };

    // ID3v2.2 identifiers are 3 characters. Each maps onto its modern analogue
    // before lookup.
    static ref LEGACY_IDS: HashMap<&'static [u8; 3], &'static [u8; 4]> = {
        let mut m: HashMap<&'static [u8; 3], &'static [u8; 4]> = HashMap::new();
        m.insert(b"UFI", b"UFID");
        m.insert(b"COM", b"COMM");
        m.insert(b"PIC", b"APIC");
        m.insert(b"IPL", b"IPLS");
        m.insert(b"MCI", b"MCDI");
        m.insert(b"PCS", b"PCST");
        m.insert(b"TT1", b"TIT1");
        m.insert(b"TT2", b"TIT2");
        m.insert(b"TT3", b"TIT3");
        m.insert(b"TP1", b"TPE1");
        m.insert(b"TP2", b"TPE2");
        m.insert(b"TP3", b"TPE3");
        m.insert(b"TP4", b"TPE4");
        m.insert(b"TCM", b"TCOM");
        m.insert(b"TXT", b"TEXT");
        m.insert(b"TLA", b"TLAN");
        m.insert(b"TCO", b"TCON");
        m.insert(b"TAL", b"TALB");
        m.insert(b"TPA", b"TPOS");
        m.insert(b"TRK", b"TRCK");
        m.insert(b"TRC", b"TSRC");
        m.insert(b"TYE", b"TYER");
        m.insert(b"TDA", b"TDAT");
        m.insert(b"TIM", b"TIME");
        m.insert(b"TRD", b"TRDA");
        m.insert(b"TMT", b"TMED");
        m.insert(b"TFT", b"TFLT");
        m.insert(b"TBP", b"TBPM");
        m.insert(b"TCR", b"TCOP");
        m.insert(b"TPB", b"TPUB");
        m.insert(b"TEN", b"TENC");
        m.insert(b"TSS", b"TSSE");
        m.insert(b"TOF", b"TOFN");
        m.insert(b"TLE", b"TLEN");
        m.insert(b"TSI", b"TSIZ");
        m.insert(b"TDY", b"TDLY");
        m.insert(b"TKE", b"TKEY");
        m.insert(b"TOT", b"TOAL");
        m.insert(b"TOA", b"TOPE");
        m.insert(b"TOL", b"TOLY");
        m.insert(b"TOR", b"TORY");
        m.insert(b"TXX", b"TXXX");
        m.insert(b"WAF", b"WOAF");
        m.insert(b"WAR", b"WOAR");
        m.insert(b"WAS", b"WOAS");
        m.insert(b"WCM", b"WCOM");
        m.insert(b"WCP", b"WCOP");
        m.insert(b"WPB", b"WPUB");
        m.insert(b"WXX", b"WXXX");
        m
    };

    // Frames that are meaningless once the file contents change, regardless of
    // what the file-alter-preservation bit claims.
    static ref DISCARD_V3: HashSet<&'static [u8; 4]> = [
        b"AENC", b"ETCO", b"EQUA", b"MLLT", b"POSS", b"SYLT", b"SYTC", b"RVAD", b"TENC",
        b"TLEN", b"TSIZ",
    ]
    .iter()
    .copied()
    .collect();

    static ref DISCARD_V4: HashSet<&'static [u8; 4]> = [
        b"ASPI", b"AENC", b"ETCO", b"EQU2", b"MLLT", b"POSS", b"SEEK", b"SYLT", b"SYTC",
        b"RVA2", b"TENC", b"TLEN",
    ]
    .iter()
    .copied()
    .collect();
}

/// Looks up the canonical kind for a modern 4-character identifier under the
/// given version's rules. ID3v2.2 identifiers go through
/// [`modernize`](modernize) first and then use the ID3v2.3 tables.
pub(crate) fn lookup(version: Version, id: &[u8; 4]) -> Option<FrameKind> {
    let kinds = match version {
        Version::V22 | Version::V23 => &*KINDS_V3,
        Version::V24 => &*KINDS_V4,
    };

    kinds.get(id).copied()
}

/// Maps a legacy ID3v2.2 identifier onto its modern analogue.
pub(crate) fn modernize(id: &[u8; 3]) -> Option<&'static [u8; 4]> {
    LEGACY_IDS.get(id).copied()
}

/// Returns whether `id` is in the version's discard-when-file-altered set.
pub(crate) fn discard_on_file_alter(version: Version, id: &[u8; 4]) -> bool {
    match version {
        Version::V24 => DISCARD_V4.contains(id),
        _ => DISCARD_V3.contains(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_version_specific_ids() {
        assert_eq!(lookup(Version::V23, b"TIT2"), Some(FrameKind::Title));
        assert_eq!(lookup(Version::V23, b"TYER"), Some(FrameKind::Year));
        assert_eq!(lookup(Version::V23, b"IPLS"), Some(FrameKind::InvolvedPeople));

        // The legacy date frames do not exist in ID3v2.4.
        assert_eq!(lookup(Version::V24, b"TYER"), None);
        assert_eq!(lookup(Version::V24, b"IPLS"), None);
        assert_eq!(lookup(Version::V24, b"TDRC"), Some(FrameKind::RecordingTime));
        assert_eq!(lookup(Version::V24, b"TIPL"), Some(FrameKind::InvolvedPeople));

        // The timestamp frames do not exist in ID3v2.3.
        assert_eq!(lookup(Version::V23, b"TDRC"), None);
    }

    #[test]
    fn modernize_legacy_ids() {
        assert_eq!(modernize(b"TT2"), Some(b"TIT2" as &[u8; 4]));
        assert_eq!(modernize(b"PIC"), Some(b"APIC" as &[u8; 4]));
        assert_eq!(modernize(b"UFI"), Some(b"UFID" as &[u8; 4]));
        assert_eq!(modernize(b"ZZZ"), None);
    }

    #[test]
    fn discard_sets_differ_by_version() {
        assert!(discard_on_file_alter(Version::V23, b"TSIZ"));
        assert!(discard_on_file_alter(Version::V23, b"RVAD"));
        assert!(!discard_on_file_alter(Version::V23, b"TIT2"));

        assert!(discard_on_file_alter(Version::V24, b"RVA2"));
        assert!(discard_on_file_alter(Version::V24, b"TENC"));
        assert!(!discard_on_file_alter(Version::V24, b"TSIZ"));
    }
}
