//! Orthonormal 8x8 DCT-II and its inverse.
//!
//! Blocks are row-major; coefficient `(u, v)` is vertical frequency `u`,
//! horizontal frequency `v`. With the orthonormal scaling the DC term of a
//! flat block of value `p` is `8 * p` and the transform preserves energy.

use crate::capacity::BLOCK_SIZE;
use std::f64::consts::PI;
use std::sync::OnceLock;

const N: usize = BLOCK_SIZE;

pub type Block = [f64; N * N];

/// `C[k][n] = a(k) * cos(pi * (2n + 1) * k / 2N)`
fn basis() -> &'static [[f64; N]; N] {
    static BASIS: OnceLock<[[f64; N]; N]> = OnceLock::new();
    BASIS.get_or_init(|| {
        let mut c = [[0.0; N]; N];
        for (k, row) in c.iter_mut().enumerate() {
            let scale = if k == 0 {
                (1.0 / N as f64).sqrt()
            } else {
                (2.0 / N as f64).sqrt()
            };
            for (n, value) in row.iter_mut().enumerate() {
                *value = scale * ((2 * n + 1) as f64 * k as f64 * PI / (2 * N) as f64).cos();
            }
        }
        c
    })
}

/// `C * X * C^T`
pub fn forward(block: &Block) -> Block {
    let c = basis();
    let mut tmp = [0.0; N * N];
    // columns
    for u in 0..N {
        for x in 0..N {
            tmp[u * N + x] = (0..N).map(|y| c[u][y] * block[y * N + x]).sum();
        }
    }
    // rows
    let mut out = [0.0; N * N];
    for u in 0..N {
        for v in 0..N {
            out[u * N + v] = (0..N).map(|x| tmp[u * N + x] * c[v][x]).sum();
        }
    }
    out
}

/// `C^T * F * C`
pub fn inverse(coefficients: &Block) -> Block {
    let c = basis();
    let mut tmp = [0.0; N * N];
    for y in 0..N {
        for v in 0..N {
            tmp[y * N + v] = (0..N).map(|u| c[u][y] * coefficients[u * N + v]).sum();
        }
    }
    let mut out = [0.0; N * N];
    for y in 0..N {
        for x in 0..N {
            out[y * N + x] = (0..N).map(|v| tmp[y * N + v] * c[v][x]).sum();
        }
    }
    out
}
