//! Generator for pipelined, multi-lane streaming FFTs.
//!
//! Given a transform size `N` and a number of samples per clock cycle
//! (`spcc`), [`generate`] decomposes the transform into
//!
//! * an input memory that reorders each frame into bit-reversed order across
//!   `spcc` banks ([`memory`], [`address`], [`barrel`]),
//! * a fully unrolled `spcc`-point butterfly network ([`network`]),
//! * `log2(N/spcc)` time-multiplexed stages, each doubling the transform size
//!   ([`stage`]),
//! * an output memory that restores natural order.
//!
//! Samples are fixed-point complex numbers ([`fixed`]). Each butterfly halves
//! its result and widens it by two bits, so the output is `DFT / N` and never
//! overflows. The [`float`] module holds the reference transform and the
//! error model a realization is checked against.
//!
//! ```
//! use htfft::{HtfftParams, generate};
//! use num_complex::Complex64;
//!
//! let description = generate(&HtfftParams::new(16, 4, 16)?)?;
//! let impulse: Vec<Complex64> = (0..16)
//!     .map(|i| Complex64::new(if i == 0 { 1.0 } else { 0.0 }, 0.0))
//!     .collect();
//! let spectrum = description.transform(&impulse)?;
//! assert!(spectrum.iter().all(|&v| v == Complex64::new(1.0 / 16.0, 0.0)));
//! # Ok::<(), htfft::HtfftError>(())
//! ```

#![no_std]

extern crate alloc;

// Enables the standard library for tests and for std-backed float math.
#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod address;
pub mod barrel;
pub mod common;
pub mod config;
pub mod fixed;
pub mod float;
mod math;
pub mod memory;
pub mod network;
pub mod pipeline;
pub mod scoreboard;
pub mod stage;
pub mod twiddle;

#[cfg(test)]
mod test_util;

pub use crate::common::{Datapath, ErrorKind, HtfftError, Result};
pub use crate::config::{BarrelPattern, ButterflyPipeline, HtfftParams, PipelineConfig, StagePipeline};
pub use crate::math::{log2_exact, logceil, reverse_bits};
pub use crate::pipeline::{Beat, LatencyReport, StreamingModel, StructuralDescription, generate};
