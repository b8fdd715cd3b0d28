// src/math.rs

//! Float and bit helpers shared by the fixed-point and reference paths.
//!
//! Float functions go through `std` when the `std` feature is on and through
//! `libm` otherwise, so the rest of the crate never calls float methods
//! directly.

use crate::common::{HtfftError, Result};

#[inline]
pub(crate) fn sin_cos(angle: f64) -> (f64, f64) {
    #[cfg(feature = "std")]
    return (angle.sin(), angle.cos());

    #[cfg(not(feature = "std"))]
    return (libm::sin(angle), libm::cos(angle));
}

#[inline]
pub(crate) fn round(value: f64) -> f64 {
    #[cfg(feature = "std")]
    return value.round();

    #[cfg(not(feature = "std"))]
    return libm::round(value);
}

#[inline]
pub(crate) fn sqrt(value: f64) -> f64 {
    #[cfg(feature = "std")]
    return value.sqrt();

    #[cfg(not(feature = "std"))]
    return libm::sqrt(value);
}

#[inline]
pub(crate) fn powf(base: f64, exponent: f64) -> f64 {
    #[cfg(feature = "std")]
    return base.powf(exponent);

    #[cfg(not(feature = "std"))]
    return libm::pow(base, exponent);
}

/// Smallest `k` with `2^k >= value` (0 for values below 2).
pub fn logceil(value: usize) -> u32 {
    if value < 2 {
        0
    } else {
        usize::BITS - (value - 1).leading_zeros()
    }
}

/// `log2(value)` for a power of two, otherwise a configuration error naming
/// the offending parameter.
pub fn log2_exact(name: &'static str, value: usize) -> Result<u32> {
    if !value.is_power_of_two() {
        return Err(HtfftError::NotPowerOfTwo { name, value });
    }
    Ok(value.trailing_zeros())
}

/// Reverses the low `n_bits` bits of `value`.
///
/// `reverse_bits(3, 3) == 6` (011 -> 110) and `reverse_bits(5, 3) == 5`.
pub fn reverse_bits(value: usize, n_bits: u32) -> usize {
    if n_bits == 0 {
        return 0;
    }
    value.reverse_bits() >> (usize::BITS - n_bits)
}
