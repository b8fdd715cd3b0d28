// src/twiddle.rs

use alloc::vec::Vec;
use core::f64::consts::PI;
use num_complex::Complex64;
use serde::Serialize;

use crate::common::Result;
use crate::fixed::ComplexFixed;
use crate::math::{self, logceil};

/// `exp(-2*pi*i * (position mod size) / size)`.
pub fn twiddle(position: usize, size: usize) -> Complex64 {
    let angle = -2.0 * PI * ((position % size) as f64) / (size as f64);
    let (sin, cos) = math::sin_cos(angle);
    Complex64::new(cos, sin)
}

/// Twiddle width used by a network level of `size` lanes.
///
/// Each level's operands are two bits wider than the level below, and the
/// twiddles grow with them so that cascaded multiplies keep their precision.
pub fn guarded_width(base_width: u32, size: usize) -> u32 {
    base_width + 2 * logceil(size).saturating_sub(1)
}

/// One quantized rotation constant and where it came from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Twiddle {
    pub position: usize,
    pub size: usize,
    pub value: ComplexFixed,
}

impl Twiddle {
    pub fn new(position: usize, size: usize, width: u32) -> Result<Self> {
        Ok(Self {
            position,
            size,
            value: ComplexFixed::from_complex(twiddle(position, size), width)?,
        })
    }
}

/// Consecutive twiddles `twiddle(k, size)` for `k` in `start..start + count`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TwiddleSet {
    pub width: u32,
    pub twiddles: Vec<Twiddle>,
}

impl TwiddleSet {
    pub fn range(start: usize, count: usize, size: usize, width: u32) -> Result<Self> {
        let twiddles = (start..start + count)
            .map(|position| Twiddle::new(position, size, width))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { width, twiddles })
    }

    /// The `size/2` distinct twiddles a radix-2 combine of `size` points
    /// needs; the other half follow by symmetry (`w^(k+size/2) = -w^k`).
    pub fn for_level(size: usize, base_width: u32) -> Result<Self> {
        Self::range(0, size / 2, size, guarded_width(base_width, size))
    }

    /// Per-batch tables for an outer stage of `n` points processed
    /// `spcc / 2` butterflies at a time: batch `b` holds positions
    /// `b*spcc/2 .. (b+1)*spcc/2`.
    pub fn stage_batches(n: usize, spcc: usize, width: u32) -> Result<Vec<Self>> {
        let per_batch = spcc / 2;
        (0..n / spcc)
            .map(|batch| Self::range(batch * per_batch, per_batch, n, width))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.twiddles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.twiddles.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = ComplexFixed> + '_ {
        self.twiddles.iter().map(|t| t.value)
    }
}
