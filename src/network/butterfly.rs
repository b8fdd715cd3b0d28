// src/network/butterfly.rs

use serde::Serialize;

use crate::common::{HtfftError, Result};
use crate::config::ButterflyPipeline;
use crate::fixed::ComplexFixed;
use crate::twiddle::Twiddle;

/// One radix-2 butterfly with a fixed twiddle.
///
/// Operands are `input_width` bits, results are two bits wider.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Butterfly {
    pub input_width: u32,
    pub twiddle: Twiddle,
    pub pipeline: ButterflyPipeline,
}

impl Butterfly {
    pub fn new(input_width: u32, twiddle: Twiddle, pipeline: ButterflyPipeline) -> Self {
        Self {
            input_width,
            twiddle,
            pipeline,
        }
    }

    /// The trivial butterfly `t = 1` used at the leaves of a network.
    pub fn leaf(input_width: u32, twiddle_width: u32, pipeline: ButterflyPipeline) -> Result<Self> {
        Ok(Self::new(
            input_width,
            Twiddle::new(0, 2, twiddle_width)?,
            pipeline,
        ))
    }

    pub fn output_width(&self) -> u32 {
        self.input_width + 2
    }

    pub fn latency(&self) -> u32 {
        self.pipeline.latency()
    }

    /// `((a + t*b) / 2, (a - t*b) / 2)`, bit-accurate.
    pub fn combine(&self, a: ComplexFixed, b: ComplexFixed) -> Result<(ComplexFixed, ComplexFixed)> {
        for operand in [a, b] {
            if operand.width() != self.input_width {
                return Err(HtfftError::WidthMismatch {
                    expected: self.input_width,
                    got: operand.width(),
                });
            }
        }
        ComplexFixed::butterfly(a, b, self.twiddle.value)
    }
}
