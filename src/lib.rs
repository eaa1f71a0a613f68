//! Hide UTF-8 text inside PNG, BMP, WebP and JPEG images.
//!
//! Lossless containers carry one bit in the least significant bit of each
//! color channel ([`spatial`]). JPEG carriers carry one bit per 8x8 block and
//! channel by snapping a DCT coefficient onto one of two interleaved lattices
//! ([`frequency`]), which survives the quality-100 re-encode on save.
//!
//! ```rust,no_run
//! # fn main() -> Result<(), stegano::Error> {
//! use stegano::Format;
//! let cover = std::fs::read("cover.png").expect("cover image");
//! let stego = stegano::hide(&cover, Format::Png, "meet at noon")?;
//! assert_eq!(stegano::reveal(&stego, Format::Png)?.text(), "meet at noon");
//! # Ok(())
//! # }
//! ```

pub mod byte;
pub mod capacity;
pub mod carrier;
pub mod charset;
pub mod codec;
pub mod dct;
pub mod format;
pub mod frequency;
pub mod spatial;

pub use byte::{Extracted, Marker};
pub use capacity::Capacity;
pub use carrier::Carrier;
pub use charset::Charset;
pub use codec::Codec;
pub use format::Format;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Payload is too large: {required_bits} bits are required, but the carrier holds {capacity_bits} bits ({max_payload_bytes} bytes of text at most).")]
    CapacityExceeded {
        required_bits: usize,
        capacity_bits: usize,
        max_payload_bytes: usize,
    },
    #[error("Unsupported carrier mode: {0}.")]
    UnsupportedCarrierMode(String),
    #[error("Malformed {format} carrier: {source}")]
    MalformedCarrier {
        format: Format,
        #[source]
        source: BoxError,
    },
    #[error("Failed to write {format} carrier: {source}")]
    WriteCarrier {
        format: Format,
        #[source]
        source: BoxError,
    },
    #[error("Payload contains a NUL byte at offset {offset}, which would end extraction early.")]
    MarkerInPayload { offset: usize },
    #[error("Unsupported image format: {0}. Use PNG, JPG, BMP, or WebP.")]
    UnsupportedFormat(String),
}

impl Error {
    pub(crate) fn malformed(format: Format, source: impl Into<BoxError>) -> Self {
        Error::MalformedCarrier {
            format,
            source: source.into(),
        }
    }

    pub(crate) fn write(format: Format, source: impl Into<BoxError>) -> Self {
        Error::WriteCarrier {
            format,
            source: source.into(),
        }
    }
}

/// Hides `text` in the `format` container `bytes`, returning the new container
pub fn hide(bytes: &[u8], format: Format, text: &str) -> Result<Vec<u8>, Error> {
    let carrier = Carrier::decode(bytes, format)?;
    let stego = codec::for_format(format).encode(&carrier, text)?;
    stego.encode(format)
}

/// Reads the hidden text back out of the `format` container `bytes`
pub fn reveal(bytes: &[u8], format: Format) -> Result<Extracted, Error> {
    let carrier = Carrier::decode(bytes, format)?;
    Ok(codec::for_format(format).decode(&carrier))
}

/// How much text the `format` container `bytes` can hold
pub fn capacity(bytes: &[u8], format: Format) -> Result<Capacity, Error> {
    let carrier = Carrier::decode(bytes, format)?;
    Ok(codec::for_format(format).capacity(&carrier))
}
