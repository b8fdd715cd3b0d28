// src/fixed/types/fixed.rs

use core::fmt;
use core::ops::{Mul, Neg};
use serde::Serialize;

use crate::math;

/// Signed fixed-point field, `width` bits wide, two's complement.
///
/// The unit is `2^-(width - 2)`: a field of width `w` represents `[-2, 2)`
/// with magnitude 1 at `2^(w-2)`. The two bits above the binary point are the
/// sign and one bit of headroom for the butterfly sum.
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fixed {
    bits: i64,
    width: u32,
}

impl Fixed {
    /// Creates a Fixed from the raw integer value (without shift).
    ///
    /// The caller guarantees that `bits` fits in `width` bits.
    #[inline]
    pub const fn from_bits(bits: i64, width: u32) -> Self {
        Self { bits, width }
    }

    #[inline]
    pub const fn zero(width: u32) -> Self {
        Self { bits: 0, width }
    }

    /// Rounds `value` to the nearest multiple of the unit.
    /// Magnitude checks are done by the caller (see `ComplexFixed::from_complex`).
    pub fn from_f64(value: f64, width: u32) -> Self {
        let scaling_factor = (1u64 << Self::frac_bits_for(width)) as f64;
        let bits = math::round(value * scaling_factor) as i64;
        Self::from_bits(bits, width)
    }

    /// Returns the stored raw value.
    #[inline]
    pub fn to_bits(self) -> i64 {
        self.bits
    }

    #[inline]
    pub fn width(self) -> u32 {
        self.width
    }

    #[inline]
    pub fn frac_bits(self) -> u32 {
        Self::frac_bits_for(self.width)
    }

    #[inline]
    const fn frac_bits_for(width: u32) -> u32 {
        width - 2
    }

    pub fn to_f64(self) -> f64 {
        self.bits as f64 / (1u64 << self.frac_bits()) as f64
    }

    /// True when the raw value is representable in `width` bits.
    pub fn fits(self) -> bool {
        let half = 1i128 << (self.width - 1);
        let bits = self.bits as i128;
        bits >= -half && bits < half
    }

    /// Unsigned two's complement image of the field, as it appears on a bus.
    pub fn to_field(self) -> u64 {
        (self.bits as u64) & Self::mask(self.width)
    }

    /// Sign-extends a `width`-bit bus value.
    pub fn from_field(field: u64, width: u32) -> Self {
        let field = field & Self::mask(width);
        let threshold = 1u128 << (width - 1);
        let bits = if (field as u128) >= threshold {
            (field as i128 - (1i128 << width)) as i64
        } else {
            field as i64
        };
        Self::from_bits(bits, width)
    }

    #[inline]
    fn mask(width: u32) -> u64 {
        if width >= 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        }
    }

    /// `(self + rhs) / 2`, with no shift: the raw sum is reinterpreted in a
    /// field one bit wider, whose unit is half as large.
    #[inline]
    pub fn half_sum(self, rhs: Fixed) -> Fixed {
        debug_assert_eq!(self.width, rhs.width);
        Fixed::from_bits(self.bits + rhs.bits, self.width + 1)
    }

    /// `(self - rhs) / 2`, see [`Fixed::half_sum`].
    #[inline]
    pub fn half_difference(self, rhs: Fixed) -> Fixed {
        debug_assert_eq!(self.width, rhs.width);
        Fixed::from_bits(self.bits - rhs.bits, self.width + 1)
    }
}

impl Mul<Fixed> for Fixed {
    type Output = Fixed;

    /// Product at the scale of `self`, rounding half up.
    #[inline]
    fn mul(self, rhs: Fixed) -> Self::Output {
        let a = self.bits as i128;
        let b = rhs.bits as i128;

        let product = a * b;

        let shift = rhs.frac_bits();
        let rounded = if shift > 0 {
            let offset = 1i128 << (shift - 1);
            (product + offset) >> shift
        } else {
            product
        };

        Fixed::from_bits(rounded as i64, self.width)
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    #[inline]
    fn neg(self) -> Self::Output {
        Fixed::from_bits(-self.bits, self.width)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.to_f64())
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // In Debug, show the decimal value, the raw value and the width
        write!(f, "{:.6} (raw: {}, w{})", self.to_f64(), self.bits, self.width)
    }
}
