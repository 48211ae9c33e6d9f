//! Tag version probing.
//!
//! A file can carry an ID3v2 tag at its start and an ID3v1 tag in its last
//! 128 bytes at the same time. The probe inspects both locations without
//! parsing anything, which lets callers decide which reader to run. When both
//! tags are present, ID3v2 is the better source of metadata and is reported
//! first.

use std::io::{self, Read, Seek, SeekFrom};
use std::fmt::{self, Display, Formatter};

/// A tag revision found in a file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TagVersion {
    /// An ID3v1 tag that may be either revision. The trailing two bytes of
    /// the record are zero, which reads equally as an empty v1.0 comment or
    /// as a v1.1 tag with track zero.
    V1,
    /// ID3v1.0.
    V1r0,
    /// ID3v1.1, carrying a track number.
    V1r1,
    /// ID3v2.2.
    V22,
    /// ID3v2.3.
    V23,
    /// ID3v2.4.
    V24,
}

impl Display for TagVersion {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::V1 => write![f, "ID3v1"],
            Self::V1r0 => write![f, "ID3v1.0"],
            Self::V1r1 => write![f, "ID3v1.1"],
            Self::V22 => write![f, "ID3v2.2"],
            Self::V23 => write![f, "ID3v2.3"],
            Self::V24 => write![f, "ID3v2.4"],
        }
    }
}

/// Returns the highest-priority tag version present in `src`, or `None` when
/// no tag marker is recognised. ID3v2 outranks ID3v1.
///
/// # Errors
/// I/O failures propagate. The absence of a tag is not an error.
pub fn version<R: Read + Seek>(src: &mut R) -> io::Result<Option<TagVersion>> {
    Ok(versions(src)?.into_iter().next())
}

/// Returns every supported tag version present in `src`, ID3v2 first. The
/// vector is empty when no tag marker is recognised.
///
/// # Errors
/// I/O failures propagate. The absence of a tag is not an error.
pub fn versions<R: Read + Seek>(src: &mut R) -> io::Result<Vec<TagVersion>> {
    let mut found = Vec::new();

    if let Some(version) = probe_v2(src)? {
        found.push(version);
    }

    if let Some(version) = probe_v1(src)? {
        found.push(version);
    }

    Ok(found)
}

fn probe_v2<R: Read + Seek>(src: &mut R) -> io::Result<Option<TagVersion>> {
    src.seek(SeekFrom::Start(0))?;

    let mut prefix = [0; 4];

    if let Err(err) = src.read_exact(&mut prefix) {
        // A file this short has no room for any tag.
        return match err.kind() {
            io::ErrorKind::UnexpectedEof => Ok(None),
            _ => Err(err),
        };
    }

    if &prefix[0..3] != b"ID3" {
        return Ok(None);
    }

    // The byte after the marker is the major version.
    Ok(match prefix[3] {
        2 => Some(TagVersion::V22),
        3 => Some(TagVersion::V23),
        4 => Some(TagVersion::V24),
        _ => None,
    })
}

fn probe_v1<R: Read + Seek>(src: &mut R) -> io::Result<Option<TagVersion>> {
    let len = src.seek(SeekFrom::End(0))?;

    if len < 128 {
        return Ok(None);
    }

    src.seek(SeekFrom::Start(len - 128))?;

    let mut marker = [0; 3];
    src.read_exact(&mut marker)?;

    if &marker != b"TAG" {
        return Ok(None);
    }

    // The last two bytes of the comment field discriminate the revision: a
    // zero byte followed by a nonzero byte is a v1.1 track number, both zero
    // is ambiguous, and anything else is comment text of a v1.0 tag.
    src.seek(SeekFrom::Start(len - 3))?;

    let mut trailer = [0; 2];
    src.read_exact(&mut trailer)?;

    Ok(Some(match trailer {
        [0, n] if n != 0 => TagVersion::V1r1,
        [0, 0] => TagVersion::V1,
        _ => TagVersion::V1r0,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn v1_record(trailer: [u8; 2]) -> Vec<u8> {
        let mut record = vec![0; 128];
        record[0..3].copy_from_slice(b"TAG");
        record[125] = trailer[0];
        record[126] = trailer[1];
        record
    }

    #[test]
    fn probe_v2_versions() {
        let data = b"ID3\x04\x00\x00\x00\x00\x00\x01\x00";
        let versions = versions(&mut Cursor::new(&data[..])).unwrap();

        assert_eq!(versions, vec![TagVersion::V24]);
    }

    #[test]
    fn probe_unsupported_v2_version() {
        let data = b"ID3\x05\x00\x00\x00\x00\x00\x01\x00";

        assert_eq!(version(&mut Cursor::new(&data[..])).unwrap(), None);
    }

    #[test]
    fn probe_v1_revisions() {
        let mut data = v1_record([0x00, 0x05]);
        assert_eq!(
            version(&mut Cursor::new(&data)).unwrap(),
            Some(TagVersion::V1r1)
        );

        data = v1_record([0x00, 0x00]);
        assert_eq!(
            version(&mut Cursor::new(&data)).unwrap(),
            Some(TagVersion::V1)
        );

        data = v1_record([0x20, 0x20]);
        assert_eq!(
            version(&mut Cursor::new(&data)).unwrap(),
            Some(TagVersion::V1r0)
        );
    }

    #[test]
    fn prefer_v2_over_v1() {
        let mut data = vec![0; 256];
        data[0..4].copy_from_slice(b"ID3\x03");
        data[9] = 0x01;

        let v1_start = data.len() - 128;
        data[v1_start..v1_start + 3].copy_from_slice(b"TAG");
        let last_idx = data.len() - 2;
        data[last_idx] = 0x05;

        let mut cursor = Cursor::new(&data);

        assert_eq!(version(&mut cursor).unwrap(), Some(TagVersion::V23));
        assert_eq!(
            versions(&mut cursor).unwrap(),
            vec![TagVersion::V23, TagVersion::V1r1]
        );
    }

    #[test]
    fn probe_example_file() {
        let path = std::env::var("CARGO_MANIFEST_DIR").unwrap() + "/res/test/example.mp3";
        let mut file = std::fs::File::open(path).unwrap();

        assert_eq!(version(&mut file).unwrap(), Some(TagVersion::V23));
        assert_eq!(
            versions(&mut file).unwrap(),
            vec![TagVersion::V23, TagVersion::V1r1]
        );
    }

    #[test]
    fn probe_nothing() {
        let data = vec![0x16; 256];
        assert!(versions(&mut Cursor::new(&data)).unwrap().is_empty());

        // Too short for any marker.
        let data = b"ID";
        assert!(versions(&mut Cursor::new(&data[..])).unwrap().is_empty());
    }
}
