// src/float/golden.rs

//! Unquantized reference transform.
//!
//! Radix-2 decimation-in-time: a bit-reversal permutation followed by
//! `log2(N)` stages of butterflies. Nothing is scaled, so the result is the
//! plain DFT `X[k] = sum x[n] exp(-2*pi*i*k*n/N)`.

use alloc::vec;
use alloc::vec::Vec;
use num_complex::Complex64;

use crate::common::Result;
use crate::math::log2_exact;
use crate::twiddle::twiddle;

pub use crate::math::reverse_bits;

/// Fills the bit-reversal table.
pub(crate) fn precompute_bitrev(bitrev: &mut [usize], n: usize) {
    bitrev[0] = 0;
    let mut j = 0;
    for i in 1..n {
        let mut k = n >> 1;
        while j >= k {
            j -= k;
            k >>= 1;
        }
        j += k;
        bitrev[i] = j;
    }
}

/// Moves the element at address `a` to address `reverse_bits(a)`.
pub fn bit_reverse_permutation<T: Clone>(values: &[T]) -> Result<Vec<T>> {
    let n = values.len();
    log2_exact("sequence length", n)?;
    let mut bitrev = vec![0; n];
    precompute_bitrev(&mut bitrev, n);
    Ok(bitrev.iter().map(|&j| values[j].clone()).collect())
}

/// `(a + b*t, a - b*t)`.
#[inline]
pub fn butterfly(a: Complex64, b: Complex64, t: Complex64) -> (Complex64, Complex64) {
    let bt = b * t;
    (a + bt, a - bt)
}

/// Applies DIT stage `stage_index` in place: blocks of `2^(stage_index+1)`
/// points, each combining its two halves.
pub fn apply_stage(stage_index: u32, buffer: &mut [Complex64]) {
    let n = buffer.len();
    let stride = 1usize << stage_index;
    let size = stride << 1;

    for j in (0..n).step_by(size) {
        for i in 0..stride {
            let index = j + i;
            let w = twiddle(index % size, size);
            let (v1, v2) = butterfly(buffer[index], buffer[index + stride], w);
            buffer[index] = v1;
            buffer[index + stride] = v2;
        }
    }
}

pub fn fft(values: &[Complex64]) -> Result<Vec<Complex64>> {
    let mut buffer = bit_reverse_permutation(values)?;
    let levels = buffer.len().trailing_zeros();
    for stage_index in 0..levels {
        apply_stage(stage_index, &mut buffer);
    }
    Ok(buffer)
}

#[cfg(test)]
#[path = "golden_tests.rs"]
mod tests;
