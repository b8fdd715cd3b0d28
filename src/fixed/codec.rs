// src/fixed/codec.rs

//! Fixed-point complex <-> bit-vector conversion.
//!
//! A sample of declared width `W` carries its real part in the upper `W/2`
//! bits and its imaginary part in the lower `W/2` bits. Each half is two's
//! complement with magnitude 1 at `2^(W/2 - 2)`. Vectors place list index 0
//! at the least significant position.

use alloc::vec::Vec;
use num_bigint::BigUint;
use num_complex::Complex64;

use super::types::ComplexFixed;
use crate::common::{HtfftError, Result};
use crate::math;

pub const MIN_WIDTH: u32 = 4;
pub const MAX_WIDTH: u32 = 128;

/// Slack allowed on `|value| <= 1` so that computed unit-magnitude twiddles
/// pass. It is far below the resolution of any supported width.
const MAGNITUDE_SLACK: f64 = 4.0 * f64::EPSILON;

pub(crate) fn check_width(width: u32) -> Result<()> {
    if width % 2 != 0 {
        return Err(HtfftError::OddWidth(width));
    }
    if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        return Err(HtfftError::WidthOutOfBounds {
            width,
            min: MIN_WIDTH,
            max: MAX_WIDTH,
        });
    }
    Ok(())
}

pub(crate) fn check_magnitude(value: Complex64) -> Result<()> {
    let magnitude = math::sqrt(value.re * value.re + value.im * value.im);
    // Written so that NaN is rejected too
    if !(magnitude <= 1.0 + MAGNITUDE_SLACK) {
        return Err(HtfftError::MagnitudeOutOfRange {
            re: value.re,
            im: value.im,
        });
    }
    Ok(())
}

/// Distance between neighbouring representable values of one field.
pub fn resolution(width: u32) -> f64 {
    1.0 / (1u128 << (width / 2 - 2)) as f64
}

pub fn encode(value: Complex64, width: u32) -> Result<u128> {
    Ok(ComplexFixed::from_complex(value, width)?.to_bits())
}

pub fn decode(bits: u128, width: u32) -> Result<Complex64> {
    Ok(ComplexFixed::from_bits(bits, width)?.to_complex())
}

/// Packs fixed-point samples that all share the same width.
pub fn pack_samples(samples: &[ComplexFixed]) -> Result<BigUint> {
    let Some(first) = samples.first() else {
        return Ok(BigUint::default());
    };
    let width = first.width();
    let mut bits = Vec::with_capacity(samples.len());
    for sample in samples {
        if sample.width() != width {
            return Err(HtfftError::WidthMismatch {
                expected: width,
                got: sample.width(),
            });
        }
        bits.push(sample.to_bits());
    }
    pack_uints(&bits, width)
}

pub fn unpack_samples(slv: &BigUint, width: u32, size: usize) -> Result<Vec<ComplexFixed>> {
    check_width(width)?;
    unpack_uints(slv, width, size)?
        .into_iter()
        .map(|bits| ComplexFixed::from_bits(bits, width))
        .collect()
}

pub fn encode_vector(values: &[Complex64], width: u32) -> Result<BigUint> {
    let samples = values
        .iter()
        .map(|&value| ComplexFixed::from_complex(value, width))
        .collect::<Result<Vec<_>>>()?;
    if samples.is_empty() {
        check_width(width)?;
    }
    pack_samples(&samples)
}

pub fn decode_vector(slv: &BigUint, width: u32, size: usize) -> Result<Vec<Complex64>> {
    Ok(unpack_samples(slv, width, size)?
        .into_iter()
        .map(ComplexFixed::to_complex)
        .collect())
}

/// Packs unsigned lane values of `width` bits each.
pub fn pack_uints(values: &[u128], width: u32) -> Result<BigUint> {
    if width == 0 || width > MAX_WIDTH {
        return Err(HtfftError::WidthOutOfBounds {
            width,
            min: 1,
            max: MAX_WIDTH,
        });
    }
    let mut slv = BigUint::default();
    for (index, &value) in values.iter().enumerate() {
        if width < 128 && value >> width != 0 {
            return Err(HtfftError::BitsOutOfRange { width });
        }
        slv |= BigUint::from(value) << (index * width as usize);
    }
    Ok(slv)
}

pub fn unpack_uints(slv: &BigUint, width: u32, size: usize) -> Result<Vec<u128>> {
    if width == 0 || width > MAX_WIDTH {
        return Err(HtfftError::WidthOutOfBounds {
            width,
            min: 1,
            max: MAX_WIDTH,
        });
    }
    let total = width as u64 * size as u64;
    if slv.bits() > total {
        return Err(HtfftError::BitsOutOfRange {
            width: total as u32,
        });
    }
    let mask = (BigUint::from(1u8) << width as usize) - 1u8;
    (0..size)
        .map(|index| {
            let lane = (slv >> (index * width as usize)) & &mask;
            u128::try_from(lane).map_err(|_| HtfftError::BitsOutOfRange { width })
        })
        .collect()
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
