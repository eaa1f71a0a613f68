//! Least-significant-bit embedding for lossless carriers.
//!
//! Pixels are visited in raster order and each pixel's three color channels
//! in turn; every visited channel carries one payload bit in its LSB. Alpha
//! is skipped.

use crate::byte::{Framed, Marker, Unframer};
use crate::capacity::{capacity_bits, Capacity, Unit, COLOR_CHANNELS};
use crate::carrier::Carrier;
use crate::codec::Codec;

/// The color channel slots of `pixels`, in embedding order
fn slots(pixels: &[u8], channels: usize) -> impl Iterator<Item = &u8> {
    pixels
        .chunks_exact(channels)
        .flat_map(|px| px[..COLOR_CHANNELS].iter())
}

fn slots_mut(pixels: &mut [u8], channels: usize) -> impl Iterator<Item = &mut u8> {
    pixels
        .chunks_exact_mut(channels)
        .flat_map(|px| px[..COLOR_CHANNELS].iter_mut())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LsbCodec;

impl Codec for LsbCodec {
    fn name(&self) -> &'static str {
        "lsb"
    }

    fn marker(&self) -> Marker {
        Marker::SingleZero
    }

    fn capacity(&self, carrier: &Carrier) -> Capacity {
        let bits = capacity_bits(
            carrier.width() as usize,
            carrier.height() as usize,
            COLOR_CHANNELS,
            Unit::Pixel,
        );
        Capacity::new(bits, self.marker())
    }

    fn embed(&self, carrier: &mut Carrier, payload: &Framed) {
        debug_assert!(payload.len_bits() <= self.capacity(carrier).bits());
        let channels = carrier.channels();
        for (slot, bit) in slots_mut(carrier.pixels_mut(), channels).zip(payload.bits()) {
            *slot = (*slot & !1) | bit as u8;
        }
    }

    fn extract(&self, carrier: &Carrier, sink: &mut Unframer) {
        for slot in slots(carrier.pixels(), carrier.channels()) {
            if sink.push(slot & 1 == 1) {
                return;
            }
        }
    }
}
