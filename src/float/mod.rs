//! Floating-point reference: the golden FFT and the tolerance a fixed-point
//! realization is judged against.

pub mod golden;
pub mod tolerance;

pub use golden::{bit_reverse_permutation, fft, reverse_bits};
pub use tolerance::{ErrorModel, check_transform, rms_discrepancy};
