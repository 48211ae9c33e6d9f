//! Frames that contain files.

use crate::core::io::BufStream;
use crate::core::string::{self, Encoding};
use crate::id3v2::frames::encoding;
use crate::id3v2::tag::Version;
use crate::id3v2::ParseResult;
use log::info;
use std::fmt::{self, Display, Formatter};

/// An `APIC` frame containing an embedded picture, usually cover art.
///
/// The picture bytes are kept as-is. Rendering or even sanity-checking the
/// image against its declared MIME type is left to the caller.
#[derive(Debug, Clone)]
pub struct AttachedPictureFrame {
    pub encoding: Encoding,
    /// The MIME type of `picture`. ID3v2.2 stores a 3-character image format
    /// instead, which is mapped to the matching MIME type when read.
    pub mime: String,
    /// What the picture depicts.
    pub pic_type: PictureType,
    /// A description of the picture.
    pub desc: String,
    /// The raw image data.
    pub picture: Vec<u8>,
}

impl AttachedPictureFrame {
    pub(crate) fn parse(stream: &mut BufStream, version: Version) -> ParseResult<Self> {
        if version == Version::V22 {
            return Self::parse_v2(stream);
        }

        let encoding = encoding::parse(stream, version)?;

        let mut mime = string::read_terminated(Encoding::Latin1, stream);

        // image/ is implied when there is no mime type.
        if mime.is_empty() {
            info!("found empty mime type, assuming image/");
            mime.push_str("image/");
        }

        let pic_type = PictureType::parse(stream.read_u8()?);
        let desc = string::read_terminated(encoding, stream);

        let picture = stream.take_rest().to_vec();

        Ok(Self {
            encoding,
            mime,
            pic_type,
            desc,
            picture,
        })
    }

    fn parse_v2(stream: &mut BufStream) -> ParseResult<Self> {
        let encoding = encoding::parse(stream, Version::V22)?;

        // The main way that ID3v2.2 PIC frames differ is the presence of a
        // 3-byte image format instead of a MIME type. PNG/JPG map to image/png
        // and image/jpeg respectively, while all other formats map to image/.
        let mime = match &stream.read_array::<3>()? {
            b"PNG" => String::from("image/png"),
            b"JPG" => String::from("image/jpeg"),
            _ => String::from("image/"),
        };

        let pic_type = PictureType::parse(stream.read_u8()?);
        let desc = string::read_terminated(encoding, stream);

        let picture = stream.take_rest().to_vec();

        Ok(Self {
            encoding,
            mime,
            pic_type,
            desc,
            picture,
        })
    }
}

impl Display for AttachedPictureFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write![f, "{} ", self.mime]?;

        if !self.desc.is_empty() {
            write![f, "\"{}\" ", self.desc]?;
        }

        write![f, "[{:?}]", self.pic_type]
    }
}

byte_enum! {
    /// What an attached picture depicts.
    pub enum PictureType {
        Other = 0x00,
        FileIcon = 0x01,
        OtherFileIcon = 0x02,
        FrontCover = 0x03,
        BackCover = 0x04,
        LeafletPage = 0x05,
        Media = 0x06,
        LeadArtist = 0x07,
        Artist = 0x08,
        Conductor = 0x09,
        Band = 0x0A,
        Composer = 0x0B,
        Writer = 0x0C,
        RecordingLocation = 0x0D,
        DuringRecording = 0x0E,
        DuringPerformance = 0x0F,
        MovieScreenCapture = 0x10,
        ColoredFish = 0x11,
        Illustration = 0x12,
        BandLogo = 0x13,
        PublisherLogo = 0x14,
    };
    PictureType::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_apic() {
        let data = b"\x00image/png\0\x03Cover\0\x89PNG\x16\x16";
        let frame = AttachedPictureFrame::parse(&mut BufStream::new(data), Version::V23).unwrap();

        assert_eq!(frame.encoding, Encoding::Latin1);
        assert_eq!(frame.mime, "image/png");
        assert_eq!(frame.pic_type, PictureType::FrontCover);
        assert_eq!(frame.desc, "Cover");
        assert_eq!(frame.picture, b"\x89PNG\x16\x16");
    }

    #[test]
    fn parse_apic_empty_mime() {
        let data = b"\x00\0\x00\0\x16\x16";
        let frame = AttachedPictureFrame::parse(&mut BufStream::new(data), Version::V23).unwrap();

        assert_eq!(frame.mime, "image/");
        assert_eq!(frame.pic_type, PictureType::Other);
    }

    #[test]
    fn parse_pic_v2() {
        let data = b"\x00JPG\x04Back\0\xFF\xD8\xFF";
        let frame = AttachedPictureFrame::parse(&mut BufStream::new(data), Version::V22).unwrap();

        assert_eq!(frame.mime, "image/jpeg");
        assert_eq!(frame.pic_type, PictureType::BackCover);
        assert_eq!(frame.desc, "Back");
        assert_eq!(frame.picture, b"\xFF\xD8\xFF");
    }

    #[test]
    fn unknown_picture_type() {
        assert_eq!(PictureType::parse(0x42), PictureType::Other);
    }
}
