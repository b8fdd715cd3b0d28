//! Helpers shared by the unit tests.

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::vec::Vec;

use crate::fixed::ComplexFixed;

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A value comfortably inside the unit circle.
pub fn random_complex(rng: &mut StdRng) -> Complex64 {
    Complex64::new(rng.random_range(-0.7..0.7), rng.random_range(-0.7..0.7))
}

/// `n` random samples quantized to `width` bits.
pub fn random_samples(rng: &mut StdRng, n: usize, width: u32) -> Vec<ComplexFixed> {
    (0..n)
        .map(|_| ComplexFixed::from_complex(random_complex(rng), width).unwrap())
        .collect()
}

pub fn to_complex(samples: &[ComplexFixed]) -> Vec<Complex64> {
    samples.iter().map(|s| s.to_complex()).collect()
}

/// Multiplies every value by `factor`.
pub fn scaled(values: &[Complex64], factor: f64) -> Vec<Complex64> {
    values.iter().map(|v| *v * factor).collect()
}
