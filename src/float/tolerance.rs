// src/float/tolerance.rs

//! Empirical error model for fixed-point realizations.
//!
//! Each butterfly level adds rounding noise of roughly three quarters of a
//! field step, and the noise compounds by about 1.6 per level. A realized
//! transform is accepted when its RMS discrepancy from the reference stays
//! within twice the modeled error.

use num_complex::Complex64;
use tracing::warn;

use crate::common::{HtfftError, Result, check_lanes};
use crate::math;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorModel {
    pub input_width: u32,
}

impl ErrorModel {
    const GROWTH_PER_LEVEL: f64 = 1.6;

    pub fn new(input_width: u32) -> Self {
        Self { input_width }
    }

    /// `Δ = 2 / 2^(width/2)`: the field step of the input encoding.
    pub fn increment(&self) -> f64 {
        2.0 / math::powf(2.0, (self.input_width / 2) as f64)
    }

    pub fn average_error(&self) -> f64 {
        0.75 * self.increment()
    }

    /// `1.6^log2(n) * average_error`.
    pub fn expected_error(&self, n: usize) -> f64 {
        let levels = n.trailing_zeros() as f64;
        math::powf(Self::GROWTH_PER_LEVEL, levels) * self.average_error()
    }

    pub fn allowed_discrepancy(&self, n: usize) -> f64 {
        2.0 * self.expected_error(n)
    }
}

/// Root mean square of `|received - expected|`.
pub fn rms_discrepancy(received: &[Complex64], expected: &[Complex64]) -> f64 {
    if expected.is_empty() {
        return 0.0;
    }
    let total: f64 = received
        .iter()
        .zip(expected)
        .map(|(r, e)| (r - e).norm_sqr())
        .sum();
    math::sqrt(total / expected.len() as f64)
}

/// Compares a realized transform with the reference.
///
/// Both sequences are in the reference's scale (a realization that divides by
/// `N` has to be multiplied back first). Returns the observed RMS discrepancy.
pub fn check_transform(
    received: &[Complex64],
    expected: &[Complex64],
    input_width: u32,
) -> Result<f64> {
    check_lanes(expected.len(), received.len())?;
    let observed = rms_discrepancy(received, expected);
    let allowed = ErrorModel::new(input_width).allowed_discrepancy(expected.len());
    if !(observed <= allowed) {
        warn!(observed, allowed, n = expected.len(), "transform outside tolerance");
        return Err(HtfftError::PrecisionExceeded { observed, allowed });
    }
    Ok(observed)
}
