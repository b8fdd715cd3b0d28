// src/config.rs

//! Generation parameters and pipeline register knobs.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::common::{HtfftError, Result};
use crate::fixed::codec::{MAX_WIDTH, check_width};
use crate::math::log2_exact;
use crate::twiddle::guarded_width;

/// Which rotation stages of a barrel shifter are followed by a register.
///
/// Written as a string over `{0,1}`, index 0 being the shift-by-1 stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BarrelPattern(Vec<bool>);

impl BarrelPattern {
    /// A register after every fourth stage, starting with the first, so that
    /// at most a few mux levels sit between registers.
    pub fn every_fourth(size: usize) -> Result<Self> {
        let stages = log2_exact("barrel shifter size", size)? as usize + 1;
        Ok(Self((0..stages).map(|index| index % 4 == 0).collect()))
    }

    pub fn registers(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cycles added by the registers.
    pub fn latency(&self) -> u32 {
        self.0.iter().filter(|&&registered| registered).count() as u32
    }

    pub(crate) fn check_for(&self, size: usize) -> Result<()> {
        let expected = log2_exact("barrel shifter size", size)? as usize + 1;
        if self.0.len() != expected {
            return Err(HtfftError::PatternLength {
                expected,
                got: self.0.len(),
            });
        }
        Ok(())
    }
}

impl FromStr for BarrelPattern {
    type Err = HtfftError;

    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(HtfftError::PatternCharacter(other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

impl TryFrom<String> for BarrelPattern {
    type Error = HtfftError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<BarrelPattern> for String {
    fn from(value: BarrelPattern) -> Self {
        value
            .0
            .iter()
            .map(|&registered| if registered { '1' } else { '0' })
            .collect()
    }
}

impl fmt::Display for BarrelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &registered in &self.0 {
            f.write_str(if registered { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Registers inside one butterfly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButterflyPipeline {
    /// Pipeline depth of the complex multiplier, at least 1.
    pub multiplier_latency: u32,
    /// Register the operands before the multiplier.
    pub register_inputs: bool,
    /// Register the product.
    pub register_product: bool,
    /// Register the sum/difference.
    pub register_sum: bool,
    /// Register the butterfly outputs.
    pub register_outputs: bool,
}

impl ButterflyPipeline {
    /// Cycles from operands to results through one butterfly.
    pub fn latency(&self) -> u32 {
        let registers = [
            self.register_inputs,
            self.register_product,
            self.register_sum,
            self.register_outputs,
        ];
        self.multiplier_latency + registers.iter().filter(|&&r| r).count() as u32
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.multiplier_latency == 0 {
            return Err(HtfftError::ZeroMultiplierLatency);
        }
        Ok(())
    }
}

impl Default for ButterflyPipeline {
    fn default() -> Self {
        Self {
            multiplier_latency: 3,
            register_inputs: true,
            register_product: true,
            register_sum: true,
            register_outputs: true,
        }
    }
}

/// Registers on the memory side of an outer stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePipeline {
    /// Register data read from the stage buffer.
    pub register_read: bool,
    /// Register operands on their way to the butterflies.
    pub register_operands: bool,
}

impl StagePipeline {
    pub fn latency(&self) -> u32 {
        self.register_read as u32 + self.register_operands as u32
    }
}

impl Default for StagePipeline {
    fn default() -> Self {
        Self {
            register_read: true,
            register_operands: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub barrel_shifter: BarrelPattern,
    pub butterfly: ButterflyPipeline,
    pub stage: StagePipeline,
}

impl PipelineConfig {
    /// Default knobs for a datapath `spcc` lanes wide.
    pub fn for_parallelism(spcc: usize) -> Result<Self> {
        Ok(Self {
            barrel_shifter: BarrelPattern::every_fourth(spcc)?,
            butterfly: ButterflyPipeline::default(),
            stage: StagePipeline::default(),
        })
    }
}

/// Everything needed to generate one pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtfftParams {
    /// Transform size.
    pub n: usize,
    /// Samples per clock cycle.
    pub spcc: usize,
    /// Bits per complex input sample.
    pub input_width: u32,
    /// Bits per twiddle before guard bits are added.
    pub twiddle_width: u32,
    pub pipeline: PipelineConfig,
}

impl HtfftParams {
    /// Parameters with default pipelining and twiddles as wide as the input.
    pub fn new(n: usize, spcc: usize, input_width: u32) -> Result<Self> {
        check_shape(n, spcc)?;
        let params = Self {
            n,
            spcc,
            input_width,
            twiddle_width: input_width,
            pipeline: PipelineConfig::for_parallelism(spcc)?,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_twiddle_width(mut self, twiddle_width: u32) -> Self {
        self.twiddle_width = twiddle_width;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn log2_n(&self) -> u32 {
        self.n.trailing_zeros()
    }

    pub fn log2_spcc(&self) -> u32 {
        self.spcc.trailing_zeros()
    }

    /// Width of the transform output: two bits per level.
    pub fn output_width(&self) -> u32 {
        self.input_width + 2 * self.log2_n()
    }

    /// Checks every parameter. Generation calls this before doing any work.
    pub fn validate(&self) -> Result<()> {
        let log2_n = check_shape(self.n, self.spcc)?;
        check_width(self.input_width)?;
        check_width(self.twiddle_width)?;
        let output_width = self.input_width + 2 * log2_n;
        if output_width > MAX_WIDTH {
            return Err(HtfftError::WidthOutOfBounds {
                width: output_width,
                min: self.input_width,
                max: MAX_WIDTH,
            });
        }
        check_width(guarded_width(self.twiddle_width, self.spcc))?;

        self.pipeline.barrel_shifter.check_for(self.spcc)?;
        self.pipeline.butterfly.check()?;
        Ok(())
    }
}

/// Checks the transform size against the parallelism, returning `log2(n)`.
fn check_shape(n: usize, spcc: usize) -> Result<u32> {
    let log2_n = log2_exact("n", n)?;
    let log2_spcc = log2_exact("spcc", spcc)?;
    if spcc < 2 {
        return Err(HtfftError::TooSmall {
            name: "spcc",
            value: spcc,
            min: 2,
        });
    }
    if 2 * log2_spcc > log2_n {
        return Err(HtfftError::ParallelismTooWide { n, size: spcc });
    }
    Ok(log2_n)
}
