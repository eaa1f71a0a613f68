use crate::charset::{self, Charset};
use crate::Error;

/// Termination marker appended to the payload bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// A single `0x00` byte
    SingleZero,
    /// Two consecutive `0x00` bytes
    DoubleZero,
}

impl Marker {
    pub fn bytes(self) -> &'static [u8] {
        match self {
            Marker::SingleZero => &[0],
            Marker::DoubleZero => &[0, 0],
        }
    }

    pub fn len(self) -> usize {
        self.bytes().len()
    }
}

/// Extract bit `index` (0 = most significant) of `byte`
fn bit_of(byte: u8, index: usize) -> bool {
    debug_assert!(index < u8::BITS as usize);
    (byte >> (u8::BITS as usize - 1 - index)) & 1 == 1
}

/// A payload serialized to bytes with its marker, read back as bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framed {
    bytes: Vec<u8>,
}

impl Framed {
    /// The framed bytes, marker included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len_bits(&self) -> usize {
        self.bytes.len() * u8::BITS as usize
    }

    /// The bit at `index` of the stream, most significant bit of each byte first
    /// # Panics
    /// If `index` is past the end of the stream
    pub fn bit(&self, index: usize) -> bool {
        let bits = u8::BITS as usize;
        bit_of(self.bytes[index / bits], index % bits)
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.bytes
            .iter()
            .flat_map(|&byte| (0..u8::BITS as usize).map(move |i| bit_of(byte, i)))
    }
}

/// Serializes `text` into a terminated bit stream
///
/// The text may not contain U+0000, which would end extraction early.
/// # Examples
/// ```rust
/// # use stegano::{Error, byte::{frame, Marker}};
/// # fn main() -> Result<(), Error> {
/// let framed = frame("A", Marker::SingleZero)?;
/// assert_eq!(framed.len_bits(), 16);
/// let bits: Vec<bool> = framed.bits().take(8).collect();
/// assert_eq!(bits, [false, true, false, false, false, false, false, true]);
/// # Ok(())
/// # }
/// ```
pub fn frame(text: &str, marker: Marker) -> Result<Framed, Error> {
    if let Some(offset) = text.bytes().position(|b| b == 0) {
        return Err(Error::MarkerInPayload { offset });
    }
    let mut bytes = Vec::with_capacity(text.len() + marker.len());
    bytes.extend_from_slice(text.as_bytes());
    bytes.extend_from_slice(marker.bytes());
    Ok(Framed { bytes })
}

/// Outcome of reading a payload back out of a carrier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// The marker terminated a non-empty payload
    Text { text: String, charset: Charset },
    /// The marker was the first thing read
    Empty,
    /// The stream ran out before a marker was seen; holds everything collected
    NoMarkerFound { text: String, charset: Charset },
}

impl Extracted {
    pub fn text(&self) -> &str {
        match self {
            Extracted::Text { text, .. } | Extracted::NoMarkerFound { text, .. } => text,
            Extracted::Empty => "",
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Extracted::Text { text, .. } | Extracted::NoMarkerFound { text, .. } => text,
            Extracted::Empty => String::new(),
        }
    }

    pub fn charset(&self) -> Option<Charset> {
        match self {
            Extracted::Text { charset, .. } | Extracted::NoMarkerFound { charset, .. } => {
                Some(*charset)
            }
            Extracted::Empty => None,
        }
    }

    /// Whether a termination marker was found
    pub fn is_terminated(&self) -> bool {
        !matches!(self, Extracted::NoMarkerFound { .. })
    }
}

/// Incremental bit stream reader that stops at the first marker
///
/// Bits are pushed in stream order; once [`Unframer::push`] returns `true`
/// further bits are ignored.
#[derive(Debug, Clone)]
pub struct Unframer {
    marker: Marker,
    bytes: Vec<u8>,
    current: u8,
    filled: u32,
    terminated: bool,
}

impl Unframer {
    pub fn new(marker: Marker) -> Self {
        Self {
            marker,
            bytes: Vec::new(),
            current: 0,
            filled: 0,
            terminated: false,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Feeds the next bit, returns `true` once the marker has been read
    pub fn push(&mut self, bit: bool) -> bool {
        if self.terminated {
            return true;
        }
        self.current = (self.current << 1) | bit as u8;
        self.filled += 1;
        if self.filled == u8::BITS {
            self.bytes.push(self.current);
            self.current = 0;
            self.filled = 0;
            if self.bytes.ends_with(self.marker.bytes()) {
                self.bytes.truncate(self.bytes.len() - self.marker.len());
                self.terminated = true;
            }
        }
        self.terminated
    }

    /// Decodes the collected bytes, discarding any incomplete trailing byte
    pub fn finish(self) -> Extracted {
        if self.terminated && self.bytes.is_empty() {
            return Extracted::Empty;
        }
        let (text, charset) = charset::decode(&self.bytes);
        if self.terminated {
            Extracted::Text { text, charset }
        } else {
            Extracted::NoMarkerFound { text, charset }
        }
    }
}

/// Reads a terminated payload out of `bits`
///
/// Never fails: a stream with no marker yields [`Extracted::NoMarkerFound`].
/// # Examples
/// ```rust
/// # use stegano::{Error, byte::{frame, unframe, Marker}};
/// # fn main() -> Result<(), Error> {
/// let framed = frame("Hello World", Marker::DoubleZero)?;
/// let out = unframe(framed.bits(), Marker::DoubleZero);
/// assert_eq!(out.text(), "Hello World");
/// assert!(out.is_terminated());
/// # Ok(())
/// # }
/// ```
pub fn unframe<I: IntoIterator<Item = bool>>(bits: I, marker: Marker) -> Extracted {
    let mut unframer = Unframer::new(marker);
    for bit in bits {
        if unframer.push(bit) {
            break;
        }
    }
    unframer.finish()
}
