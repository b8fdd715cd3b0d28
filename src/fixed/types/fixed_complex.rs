use super::fixed::Fixed;
use core::ops::Mul;
use num_complex::Complex64;
use serde::Serialize;

use crate::common::{HtfftError, Result};
use crate::fixed::codec::{check_magnitude, check_width};

/// A complex sample whose real and imaginary fields share one declared
/// width `W`: each field is `W/2` bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ComplexFixed {
    pub re: Fixed,
    pub im: Fixed,
}

impl ComplexFixed {
    pub fn new(re: Fixed, im: Fixed) -> Self {
        debug_assert_eq!(re.width(), im.width());
        Self { re, im }
    }

    pub fn zero(width: u32) -> Self {
        Self::new(Fixed::zero(width / 2), Fixed::zero(width / 2))
    }

    /// Total width `W` of the packed sample.
    #[inline]
    pub fn width(self) -> u32 {
        self.re.width() * 2
    }

    /// Quantizes `value` onto the `width` grid. `|value|` must not exceed 1.
    pub fn from_complex(value: Complex64, width: u32) -> Result<Self> {
        check_width(width)?;
        check_magnitude(value)?;
        Ok(Self::new(
            Fixed::from_f64(value.re, width / 2),
            Fixed::from_f64(value.im, width / 2),
        ))
    }

    pub fn to_complex(self) -> Complex64 {
        Complex64::new(self.re.to_f64(), self.im.to_f64())
    }

    /// Packs as `imag | (real << W/2)`.
    pub fn to_bits(self) -> u128 {
        let half = self.re.width();
        (self.im.to_field() as u128) | ((self.re.to_field() as u128) << half)
    }

    pub fn from_bits(bits: u128, width: u32) -> Result<Self> {
        check_width(width)?;
        if width < 128 && bits >> width != 0 {
            return Err(HtfftError::BitsOutOfRange { width });
        }
        let half = width / 2;
        let mask = if half >= 64 { u64::MAX as u128 } else { (1u128 << half) - 1 };
        let re = Fixed::from_field(((bits >> half) & mask) as u64, half);
        let im = Fixed::from_field((bits & mask) as u64, half);
        Ok(Self::new(re, im))
    }

    /// Radix-2 butterfly `(a + b*t, a - b*t)`, scaled by 1/2.
    ///
    /// The product is rounded back to the operand scale and the sum and
    /// difference are reinterpreted two bits wider, so no explicit divide is
    /// performed and nothing can overflow.
    pub fn butterfly(a: Self, b: Self, t: Self) -> Result<(Self, Self)> {
        if a.width() != b.width() {
            return Err(HtfftError::WidthMismatch {
                expected: a.width(),
                got: b.width(),
            });
        }
        let bt = b * t;
        let c = ComplexFixed::new(a.re.half_sum(bt.re), a.im.half_sum(bt.im));
        let d = ComplexFixed::new(a.re.half_difference(bt.re), a.im.half_difference(bt.im));
        Ok((c, d))
    }
}

// Multiplication: result keeps the scale and width of the left operand.
impl Mul<ComplexFixed> for ComplexFixed {
    type Output = ComplexFixed;

    #[inline]
    fn mul(self, rhs: ComplexFixed) -> Self::Output {
        // (ac - bd) and (ad + bc), each partial product rounded separately,
        // as a DSP slice per product would
        let re_re = self.re * rhs.re;
        let im_im = self.im * rhs.im;
        let re_im = self.re * rhs.im;
        let im_re = self.im * rhs.re;

        let re = Fixed::from_bits(re_re.to_bits() - im_im.to_bits(), self.re.width());
        let im = Fixed::from_bits(re_im.to_bits() + im_re.to_bits(), self.re.width());

        ComplexFixed { re, im }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64, width: u32) -> ComplexFixed {
        ComplexFixed::from_complex(Complex64::new(re, im), width).unwrap()
    }

    #[test]
    fn test_new() {
        let re = Fixed::from_f64(0.5, 8);
        let im = Fixed::from_f64(-0.25, 8);
        let v = ComplexFixed::new(re, im);

        assert_eq!(v.re, re);
        assert_eq!(v.im, im);
        assert_eq!(v.width(), 16);
    }

    #[test]
    fn test_packing_layout() {
        // width 12: 1+0j -> real field 0b010000 in the upper half
        assert_eq!(c(1.0, 0.0, 12).to_bits(), 0b010000_000000);
        // 0.5-0.5j -> real 0b001000, imag 0b111000
        assert_eq!(c(0.5, -0.5, 12).to_bits(), 0b001000_111000);
    }

    #[test]
    fn test_from_bits_rejects_wide_values() {
        assert_eq!(
            ComplexFixed::from_bits(1 << 12, 12),
            Err(HtfftError::BitsOutOfRange { width: 12 })
        );
    }

    #[test]
    fn test_multiplication_by_i() {
        // (0.5 + 0.25i) * (0 + 1i) = -0.25 + 0.5i
        let a = c(0.5, 0.25, 16);
        let i = c(0.0, 1.0, 16);
        let result = a * i;
        assert_eq!(result.to_complex(), Complex64::new(-0.25, 0.5));
        assert_eq!(result.width(), 16);
    }

    #[test]
    fn test_multiplication_mixed_width() {
        // (0.5 + 0.5i) [w12] * (0.5 - 0.5i) [w20] = 0.5 + 0i [w12]
        let a = c(0.5, 0.5, 12);
        let b = c(0.5, -0.5, 20);
        let result = a * b;
        assert_eq!(result.width(), 12);
        assert_eq!(result.to_complex(), Complex64::new(0.5, 0.0));
    }

    #[test]
    fn test_butterfly_scale_law() {
        let a = c(1.0, 0.0, 8);
        let b = c(0.0, 0.0, 8);
        let t = c(1.0, 0.0, 8);
        let (sum, diff) = ComplexFixed::butterfly(a, b, t).unwrap();
        assert_eq!(sum.width(), 10);
        assert_eq!(diff.width(), 10);
        assert_eq!(sum.to_complex(), Complex64::new(0.5, 0.0));
        assert_eq!(diff.to_complex(), Complex64::new(0.5, 0.0));
    }

    #[test]
    fn test_butterfly_extremes_do_not_overflow() {
        let a = c(-1.0, 0.0, 8);
        let b = c(-1.0, 0.0, 8);
        let t = c(1.0, 0.0, 8);
        let (sum, diff) = ComplexFixed::butterfly(a, b, t).unwrap();
        assert!(sum.re.fits() && sum.im.fits());
        assert_eq!(sum.to_complex(), Complex64::new(-1.0, 0.0));
        assert_eq!(diff.to_complex(), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_butterfly_width_mismatch() {
        let a = c(0.5, 0.0, 8);
        let b = c(0.5, 0.0, 10);
        let t = c(1.0, 0.0, 8);
        assert_eq!(
            ComplexFixed::butterfly(a, b, t),
            Err(HtfftError::WidthMismatch { expected: 8, got: 10 })
        );
    }
}
