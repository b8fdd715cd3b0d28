// src/stage.rs

//! Time-multiplexed outer stage.
//!
//! A stage of size `n` turns two `n/2`-point transforms into one `n`-point
//! transform, `spcc/2` butterflies per cycle. Data moves between stages as
//! [`Chunk`]s: on cycle `c` a size-`m` block emits `y[c*spcc/2 ..]` on `a`
//! and `y[m/2 + c*spcc/2 ..]` on `b`, each `spcc/2` lanes wide.

use alloc::vec::Vec;
use serde::Serialize;
use tracing::trace;

use crate::common::{HtfftError, Result, check_lanes};
use crate::config::{ButterflyPipeline, StagePipeline};
use crate::fixed::ComplexFixed;
use crate::fixed::codec::check_width;
use crate::math::log2_exact;
use crate::twiddle::TwiddleSet;

/// One cycle of stage traffic: the low and high halves of a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Chunk<T> {
    pub a: Vec<T>,
    pub b: Vec<T>,
}

impl<T: Clone> Chunk<T> {
    pub fn new(a: Vec<T>, b: Vec<T>) -> Self {
        Self { a, b }
    }

    pub fn part(&self, high: bool) -> &[T] {
        if high { &self.b } else { &self.a }
    }
}

/// Splits a natural-order block into the chunks a stage of its size emits.
pub fn to_chunks<T: Clone>(block: &[T], spcc: usize) -> Result<Vec<Chunk<T>>> {
    let half_lanes = spcc / 2;
    let half = block.len() / 2;
    if half_lanes == 0 || half % half_lanes != 0 {
        return Err(HtfftError::NotADivisor {
            n: block.len(),
            size: spcc,
        });
    }
    Ok((0..half / half_lanes)
        .map(|cycle| {
            let start = cycle * half_lanes;
            Chunk::new(
                block[start..start + half_lanes].to_vec(),
                block[half + start..half + start + half_lanes].to_vec(),
            )
        })
        .collect())
}

/// Inverse of [`to_chunks`]: every `a` lane in order, then every `b` lane.
pub fn from_chunks<T: Clone>(chunks: &[Chunk<T>]) -> Vec<T> {
    let mut block: Vec<T> = chunks.iter().flat_map(|c| c.a.iter().cloned()).collect();
    block.extend(chunks.iter().flat_map(|c| c.b.iter().cloned()));
    block
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stage {
    /// Points in the block this stage produces.
    pub n: usize,
    pub spcc: usize,
    pub input_width: u32,
    pub butterfly: ButterflyPipeline,
    pub registers: StagePipeline,
    /// Twiddle table per batch, `n/spcc` of them.
    pub batches: Vec<TwiddleSet>,
}

impl Stage {
    pub fn new(
        n: usize,
        spcc: usize,
        input_width: u32,
        twiddle_width: u32,
        butterfly: ButterflyPipeline,
        registers: StagePipeline,
    ) -> Result<Self> {
        log2_exact("stage size", n)?;
        log2_exact("spcc", spcc)?;
        if spcc < 2 {
            return Err(HtfftError::TooSmall {
                name: "spcc",
                value: spcc,
                min: 2,
            });
        }
        if n < 2 * spcc {
            return Err(HtfftError::TooSmall {
                name: "stage size",
                value: n,
                min: 2 * spcc,
            });
        }
        check_width(input_width)?;
        butterfly.check()?;

        let batches = TwiddleSet::stage_batches(n, spcc, twiddle_width)?;
        trace!(n, spcc, input_width, batches = batches.len(), "built stage");
        Ok(Self {
            n,
            spcc,
            input_width,
            butterfly,
            registers,
            batches,
        })
    }

    pub fn output_width(&self) -> u32 {
        self.input_width + 2
    }

    /// Cycles spent waiting for the first beat of the second half-block.
    pub fn buffer_latency(&self) -> u32 {
        (self.n / (2 * self.spcc)) as u32
    }

    pub fn latency(&self) -> u32 {
        self.buffer_latency() + self.registers.latency() + self.butterfly.latency()
    }

    /// Beats per `n`-block, on input and on output.
    pub fn beats_per_block(&self) -> usize {
        self.n / self.spcc
    }

    /// Elementwise butterflies for batch `batch` of a block.
    ///
    /// The batch counter wraps once per block.
    pub fn apply_batch(
        &self,
        batch: usize,
        data_a: &[ComplexFixed],
        data_b: &[ComplexFixed],
    ) -> Result<Chunk<ComplexFixed>> {
        let lanes = self.spcc / 2;
        check_lanes(lanes, data_a.len())?;
        check_lanes(lanes, data_b.len())?;
        check_lanes(self.n / self.spcc, self.batches.len())?;
        let twiddles = &self.batches[batch % self.batches.len()];
        check_lanes(lanes, twiddles.len())?;

        let mut out = Chunk::new(Vec::with_capacity(lanes), Vec::with_capacity(lanes));
        for ((&a, &b), t) in data_a.iter().zip(data_b).zip(twiddles.values()) {
            if a.width() != self.input_width {
                return Err(HtfftError::WidthMismatch {
                    expected: self.input_width,
                    got: a.width(),
                });
            }
            let (c, d) = ComplexFixed::butterfly(a, b, t)?;
            out.a.push(c);
            out.b.push(d);
        }
        Ok(out)
    }

    /// Pairs up the beats of one `n`-block in the previous stage's format.
    ///
    /// Batch `b` gets `x[b*spcc/2 ..]` from the first half-block and
    /// `x[n/2 + b*spcc/2 ..]` from the second.
    pub fn operand_schedule<T: Clone>(&self, beats: &[Chunk<T>]) -> Result<Vec<Chunk<T>>> {
        check_lanes(self.beats_per_block(), beats.len())?;
        let per_half = self.beats_per_block() / 2;
        Ok((0..self.beats_per_block())
            .map(|batch| {
                let high = batch >= per_half;
                let beat = batch % per_half;
                Chunk::new(
                    beats[beat].part(high).to_vec(),
                    beats[per_half + beat].part(high).to_vec(),
                )
            })
            .collect())
    }

    /// Runs one whole block through the stage.
    pub fn process_block(&self, beats: &[Chunk<ComplexFixed>]) -> Result<Vec<Chunk<ComplexFixed>>> {
        self.operand_schedule(beats)?
            .iter()
            .enumerate()
            .map(|(batch, operands)| self.apply_batch(batch, &operands.a, &operands.b))
            .collect()
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
