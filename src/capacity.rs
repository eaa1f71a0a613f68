use crate::byte::Marker;
use crate::Error;

/// Side of the square transform block
pub const BLOCK_SIZE: usize = 8;

/// Color channels read and written by every codec; alpha is never counted
pub const COLOR_CHANNELS: usize = 3;

/// What a single embedded bit occupies in each channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// One bit per pixel
    Pixel,
    /// One bit per `BLOCK_SIZE` x `BLOCK_SIZE` block
    Block,
}

/// Maximum number of bits a `width` x `height` carrier holds
///
/// Partial blocks on the right and bottom edges hold nothing.
pub fn capacity_bits(width: usize, height: usize, channels_used: usize, unit: Unit) -> usize {
    match unit {
        Unit::Pixel => width * height * channels_used,
        Unit::Block => (height / BLOCK_SIZE) * (width / BLOCK_SIZE) * channels_used,
    }
}

/// Bit capacity of a carrier under one codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    bits: usize,
    marker: Marker,
}

impl Capacity {
    pub fn new(bits: usize, marker: Marker) -> Self {
        Self { bits, marker }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Longest payload in bytes that fits alongside the marker
    pub fn max_payload_bytes(&self) -> usize {
        (self.bits / u8::BITS as usize).saturating_sub(self.marker.len())
    }

    pub fn check(&self, bit_count: usize) -> Result<(), Error> {
        check(bit_count, *self)
    }
}

/// Fails with [`Error::CapacityExceeded`] if `bit_count` bits do not fit
pub fn check(bit_count: usize, capacity: Capacity) -> Result<(), Error> {
    if bit_count > capacity.bits() {
        return Err(Error::CapacityExceeded {
            required_bits: bit_count,
            capacity_bits: capacity.bits(),
            max_payload_bytes: capacity.max_payload_bytes(),
        });
    }
    Ok(())
}
