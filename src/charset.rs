//! Text decoding for extracted payload bytes.
//!
//! Bytes are tried as UTF-8, then as Windows-1251, then mapped 1:1 onto
//! U+0000..=U+00FF so that decoding never fails. The Windows-1251 step is
//! strict: a byte the Microsoft code page leaves unassigned falls through to
//! Latin-1.

use encoding_rs::WINDOWS_1251;
use std::fmt;

/// The one byte Microsoft's windows-1251 leaves unassigned; the WHATWG
/// table used by `encoding_rs` maps it to U+0098
const CP1251_UNASSIGNED: u8 = 0x98;

/// Which decoder produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    Windows1251,
    Latin1,
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Charset::Utf8 => "UTF-8",
            Charset::Windows1251 => "windows-1251",
            Charset::Latin1 => "ISO-8859-1",
        })
    }
}

/// Byte-preserving decode, one char per byte
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Strict windows-1251, `None` on an unassigned byte
pub fn windows_1251(bytes: &[u8]) -> Option<String> {
    if bytes.contains(&CP1251_UNASSIGNED) {
        return None;
    }
    WINDOWS_1251
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

pub fn decode(bytes: &[u8]) -> (String, Charset) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_owned(), Charset::Utf8);
    }
    if let Some(text) = windows_1251(bytes) {
        log::debug!("payload is not UTF-8, decoded as {}", Charset::Windows1251);
        return (text, Charset::Windows1251);
    }
    log::debug!("payload is not UTF-8, decoded as {}", Charset::Latin1);
    (latin1(bytes), Charset::Latin1)
}
