//! Carrier container identification.

use crate::Error;
use image::ImageFormat;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported carrier containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Png,
    Jpeg,
    Bmp,
    WebP,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Png, Format::Jpeg, Format::Bmp, Format::WebP];

    /// Case-insensitive lookup, without the leading dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Format::Png),
            "jpg" | "jpeg" | "jpe" => Some(Format::Jpeg),
            "bmp" => Some(Format::Bmp),
            "webp" => Some(Format::WebP),
            _ => None,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Identifies the container from its magic bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            ImageFormat::Png => Some(Format::Png),
            ImageFormat::Jpeg => Some(Format::Jpeg),
            ImageFormat::Bmp => Some(Format::Bmp),
            ImageFormat::WebP => Some(Format::WebP),
            _ => None,
        }
    }

    /// Canonical file extension
    pub fn extension(self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Jpeg => "jpg",
            Format::Bmp => "bmp",
            Format::WebP => "webp",
        }
    }

    /// Whether saving the container loses pixel precision
    pub fn is_lossy(self) -> bool {
        matches!(self, Format::Jpeg)
    }

    pub(crate) fn image_format(self) -> ImageFormat {
        match self {
            Format::Png => ImageFormat::Png,
            Format::Jpeg => ImageFormat::Jpeg,
            Format::Bmp => ImageFormat::Bmp,
            Format::WebP => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Png => "PNG",
            Format::Jpeg => "JPEG",
            Format::Bmp => "BMP",
            Format::WebP => "WebP",
        })
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim_start_matches('.'))
            .ok_or_else(|| Error::UnsupportedFormat(s.to_owned()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extensions() {
        assert_eq!(Format::from_extension("PNG"), Some(Format::Png));
        assert_eq!(Format::from_extension("jpe"), Some(Format::Jpeg));
        assert_eq!(Format::from_extension("JPEG"), Some(Format::Jpeg));
        assert_eq!(Format::from_extension("gif"), None);
        assert_eq!(Format::from_path("dir/photo.WebP"), Some(Format::WebP));
        assert_eq!(Format::from_path("noext"), None);
        assert_eq!(".bmp".parse::<Format>().unwrap(), Format::Bmp);
        assert!("tiff".parse::<Format>().is_err());
    }

    #[test]
    fn sniff_magic() {
        assert_eq!(Format::sniff(b"\x89PNG\r\n\x1a\n...."), Some(Format::Png));
        assert_eq!(Format::sniff(b"\xff\xd8\xff\xe0...."), Some(Format::Jpeg));
        assert_eq!(Format::sniff(b"BM......"), Some(Format::Bmp));
        assert_eq!(Format::sniff(b"RIFF\0\0\0\0WEBPVP8L"), Some(Format::WebP));
        assert_eq!(Format::sniff(b"plain text"), None);
    }

    #[test]
    fn canonical_extension_roundtrips() {
        for format in Format::ALL {
            assert_eq!(Format::from_extension(format.extension()), Some(format));
            assert_eq!(format.is_lossy(), format == Format::Jpeg);
        }
    }
}
