//! Quantization embedding in the 8x8 DCT domain, for JPEG carriers.
//!
//! Each (channel, block) pair carries one bit. The bit is written by snapping
//! one mid-frequency coefficient onto the lattice `k * Q` (bit 0) or
//! `k * Q + Q / 2` (bit 1) and read back by picking the nearer lattice, so
//! rounding to integer pixels and the JPEG re-encode only flip a bit when
//! they move the coefficient by more than `Q / 4`.
//!
//! A snap moves any pixel by at most [`HEADROOM`]. Blocks whose snapped
//! pixels would leave `0..=255` are first pulled that far inside the range,
//! so clamping on write-back never eats into the decision margin.
//!
//! Blocks are numbered by a single running index over channels, then block
//! rows, then block columns. The index picks both the payload bit and which
//! of the [`COEFFICIENT_CYCLE`] positions holds it.

use crate::byte::{Framed, Marker, Unframer};
use crate::capacity::{capacity_bits, Capacity, Unit, BLOCK_SIZE, COLOR_CHANNELS};
use crate::carrier::Carrier;
use crate::codec::Codec;
use crate::dct::{self, Block};
use rayon::prelude::*;
use std::ops::Range;

/// Lattice step in orthonormal DCT units
pub const QUANT_STEP: f64 = 24.0;

/// Largest pixel change a snap can cause: half a step times the 0.25 peak of
/// a mid-frequency basis function
pub const HEADROOM: f64 = QUANT_STEP / 8.0;

/// Block rows classified per parallel batch while extracting
const EXTRACT_BATCH_ROWS: usize = 8;

/// Coefficient `(vertical, horizontal)` frequencies, cycled by `index % 3`
pub const COEFFICIENT_CYCLE: [(usize, usize); 3] = [(3, 4), (4, 3), (5, 2)];

/// Offset into a [`Block`] of the coefficient holding bit `index`
pub fn coefficient_for(index: usize) -> usize {
    let (u, v) = COEFFICIENT_CYCLE[index % COEFFICIENT_CYCLE.len()];
    u * BLOCK_SIZE + v
}

/// Nearest point to `value` on the lattice selected by `bit`
pub fn embed_bit(value: f64, bit: bool) -> f64 {
    let offset = if bit { QUANT_STEP / 2.0 } else { 0.0 };
    ((value - offset) / QUANT_STEP).round() * QUANT_STEP + offset
}

/// `true` if `value` is strictly closer to the half-step lattice
pub fn classify(value: f64) -> bool {
    let whole = embed_bit(value, false);
    let half = embed_bit(value, true);
    (value - half).abs() < (value - whole).abs()
}

/// Writes `bit` into coefficient `k` of a pixel block
///
/// The returned pixels stay within `0..=255` so rounding and clamping only
/// add rounding drift.
pub fn embed_block(pixels: &Block, k: usize, bit: bool) -> Block {
    let snap = |pixels: &Block| {
        let mut coefficients = dct::forward(pixels);
        coefficients[k] = embed_bit(coefficients[k], bit);
        dct::inverse(&coefficients)
    };
    let block = snap(pixels);
    if block.iter().all(|p| (0.0..=255.0).contains(p)) {
        return block;
    }
    let mut inset = *pixels;
    for p in inset.iter_mut() {
        *p = p.clamp(HEADROOM, 255.0 - HEADROOM);
    }
    snap(&inset)
}

/// Whole 8x8 blocks of a carrier; partial edge blocks are not used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    rows: usize,
    cols: usize,
}

impl BlockGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rows: height / BLOCK_SIZE,
            cols: width / BLOCK_SIZE,
        }
    }

    pub fn of(carrier: &Carrier) -> Self {
        Self::new(carrier.width() as usize, carrier.height() as usize)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn blocks_per_channel(&self) -> usize {
        self.rows * self.cols
    }

    /// Running index of a block across all channels
    pub fn index(&self, channel: usize, row: usize, col: usize) -> usize {
        debug_assert!(channel < COLOR_CHANNELS && row < self.rows && col < self.cols);
        channel * self.blocks_per_channel() + row * self.cols + col
    }
}

/// Reads the block at `col` from `band`, a plane slice starting at its block row
fn read_block(band: &[f64], width: usize, col: usize) -> Block {
    let mut block = [0.0; BLOCK_SIZE * BLOCK_SIZE];
    for (y, line) in block.chunks_exact_mut(BLOCK_SIZE).enumerate() {
        let start = y * width + col * BLOCK_SIZE;
        line.copy_from_slice(&band[start..start + BLOCK_SIZE]);
    }
    block
}

fn write_block(band: &mut [f64], width: usize, col: usize, block: &Block) {
    for (y, line) in block.chunks_exact(BLOCK_SIZE).enumerate() {
        let start = y * width + col * BLOCK_SIZE;
        band[start..start + BLOCK_SIZE].copy_from_slice(line);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QuantizationCodec;

impl Codec for QuantizationCodec {
    fn name(&self) -> &'static str {
        "dct-quantization"
    }

    fn marker(&self) -> Marker {
        Marker::DoubleZero
    }

    fn capacity(&self, carrier: &Carrier) -> Capacity {
        let bits = capacity_bits(
            carrier.width() as usize,
            carrier.height() as usize,
            COLOR_CHANNELS,
            Unit::Block,
        );
        Capacity::new(bits, self.marker())
    }

    fn embed(&self, carrier: &mut Carrier, payload: &Framed) {
        debug_assert!(payload.len_bits() <= self.capacity(carrier).bits());
        let grid = BlockGrid::of(carrier);
        let width = carrier.width() as usize;
        let total = payload.len_bits();

        for channel in 0..COLOR_CHANNELS {
            if grid.blocks_per_channel() == 0 || grid.index(channel, 0, 0) >= total {
                break;
            }
            let mut plane = carrier.plane(channel);
            plane
                .par_chunks_mut(BLOCK_SIZE * width)
                .enumerate()
                .take(grid.rows())
                .for_each(|(row, band)| {
                    for col in 0..grid.cols() {
                        let index = grid.index(channel, row, col);
                        if index >= total {
                            break;
                        }
                        let pixels = read_block(band, width, col);
                        let k = coefficient_for(index);
                        let block = embed_block(&pixels, k, payload.bit(index));
                        write_block(band, width, col, &block);
                    }
                });
            carrier.set_plane(channel, &plane);
            log::trace!("{}: channel {channel} embedded", self.name());
        }
    }

    fn extract(&self, carrier: &Carrier, sink: &mut Unframer) {
        let grid = BlockGrid::of(carrier);
        let width = carrier.width() as usize;

        for channel in 0..COLOR_CHANNELS {
            let plane = carrier.plane(channel);
            for first in (0..grid.rows()).step_by(EXTRACT_BATCH_ROWS) {
                let last = (first + EXTRACT_BATCH_ROWS).min(grid.rows());
                let bits = classify_rows(&plane, width, grid, channel, first..last);
                for bit in bits {
                    if sink.push(bit) {
                        log::trace!("{}: marker found in channel {channel}", self.name());
                        return;
                    }
                }
            }
            log::trace!("{}: channel {channel} read without a marker", self.name());
        }
    }
}

/// Classifies the blocks of `rows` in one channel plane, in index order
fn classify_rows(
    plane: &[f64],
    width: usize,
    grid: BlockGrid,
    channel: usize,
    rows: Range<usize>,
) -> Vec<bool> {
    let band_len = BLOCK_SIZE * width;
    (rows.start * grid.cols()..rows.end * grid.cols())
        .into_par_iter()
        .map(|block| {
            let (row, col) = (block / grid.cols(), block % grid.cols());
            let index = grid.index(channel, row, col);
            let coefficients = dct::forward(&read_block(&plane[row * band_len..], width, col));
            classify(coefficients[coefficient_for(index)])
        })
        .collect()
}
