// src/pipeline.rs

//! Generation of the complete streaming transform and its functional models.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use num_bigint::BigUint;
use num_complex::Complex64;
use serde::Serialize;
use tracing::{debug, warn};

use crate::common::{HtfftError, Result, check_lanes};
use crate::config::HtfftParams;
use crate::fixed::ComplexFixed;
use crate::fixed::codec::{pack_samples, unpack_samples};
use crate::memory::{FinalMemory, InitialMemory};
use crate::network::ButterflyNetwork;
use crate::stage::{Chunk, Stage, to_chunks};

/// Cycles spent in each block, input to output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LatencyReport {
    pub initial_memory: u32,
    pub network: u32,
    pub stages: Vec<u32>,
    pub final_memory: u32,
    pub total: u32,
}

/// Everything a back end needs to emit the design, in dataflow order:
/// initial memory, unrolled network, outer stages, final memory.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructuralDescription {
    params: HtfftParams,
    initial_memory: InitialMemory,
    network: ButterflyNetwork,
    stages: Vec<Stage>,
    final_memory: FinalMemory,
    latency: LatencyReport,
}

/// Validates `params` and builds the pipeline.
pub fn generate(params: &HtfftParams) -> Result<StructuralDescription> {
    params.validate()?;
    let (n, spcc) = (params.n, params.spcc);
    let pipeline = &params.pipeline;

    let initial_memory = InitialMemory::new(n, spcc, pipeline.barrel_shifter.clone())?;
    let network = ButterflyNetwork::build(
        spcc,
        params.input_width,
        params.twiddle_width,
        pipeline.butterfly,
    )?;
    let stages = (params.log2_spcc() + 1..=params.log2_n())
        .map(|level| {
            Stage::new(
                1 << level,
                spcc,
                params.input_width + 2 * (level - 1),
                params.twiddle_width,
                pipeline.butterfly,
                pipeline.stage,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    let final_memory = FinalMemory::new(n, spcc);

    let stage_latencies: Vec<u32> = stages.iter().map(Stage::latency).collect();
    let initial_latency = initial_memory.latency();
    let network_latency = network.depth()?;
    let final_latency = final_memory.latency();
    let total = initial_latency + network_latency + stage_latencies.iter().sum::<u32>() + final_latency;
    let latency = LatencyReport {
        initial_memory: initial_latency,
        network: network_latency,
        stages: stage_latencies,
        final_memory: final_latency,
        total,
    };

    debug!(
        n,
        spcc,
        stages = stages.len(),
        input_width = params.input_width,
        output_width = params.output_width(),
        latency = total,
        "generated streaming fft"
    );

    Ok(StructuralDescription {
        params: params.clone(),
        initial_memory,
        network,
        stages,
        final_memory,
        latency,
    })
}

impl StructuralDescription {
    pub fn params(&self) -> &HtfftParams {
        &self.params
    }

    pub fn initial_memory(&self) -> &InitialMemory {
        &self.initial_memory
    }

    pub fn network(&self) -> &ButterflyNetwork {
        &self.network
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn final_memory(&self) -> &FinalMemory {
        &self.final_memory
    }

    pub fn latency(&self) -> &LatencyReport {
        &self.latency
    }

    pub fn output_width(&self) -> u32 {
        self.params.output_width()
    }

    /// Beats per frame.
    pub fn beats(&self) -> usize {
        self.params.n / self.params.spcc
    }

    /// Bit-accurate transform of one natural-order frame.
    ///
    /// The result is `DFT / N` at [`output_width`](Self::output_width).
    pub fn transform_fixed(&self, frame: &[ComplexFixed]) -> Result<Vec<ComplexFixed>> {
        let (n, spcc) = (self.params.n, self.params.spcc);
        check_lanes(n, frame.len())?;
        for sample in frame {
            if sample.width() != self.params.input_width {
                return Err(HtfftError::WidthMismatch {
                    expected: self.params.input_width,
                    got: sample.width(),
                });
            }
        }

        let reversed = self.initial_memory.transfer(frame)?;
        let mut chunks: Vec<Chunk<ComplexFixed>> = Vec::with_capacity(self.beats());
        for block in reversed.chunks(spcc) {
            chunks.extend(to_chunks(&self.network.evaluate(block)?, spcc)?);
        }
        for stage in &self.stages {
            chunks = chunks
                .chunks(stage.beats_per_block())
                .map(|block| stage.process_block(block))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect();
        }
        Ok(self
            .final_memory
            .reorder(&chunks)?
            .into_iter()
            .flatten()
            .collect())
    }

    /// Encodes `values` at the input width, transforms and decodes.
    pub fn transform(&self, values: &[Complex64]) -> Result<Vec<Complex64>> {
        let frame = values
            .iter()
            .map(|&value| ComplexFixed::from_complex(value, self.params.input_width))
            .collect::<Result<Vec<_>>>()?;
        Ok(self
            .transform_fixed(&frame)?
            .into_iter()
            .map(ComplexFixed::to_complex)
            .collect())
    }

    /// The transform on packed bit vectors, sample 0 least significant.
    pub fn transform_vector(&self, input: &BigUint) -> Result<BigUint> {
        let frame = unpack_samples(input, self.params.input_width, self.params.n)?;
        pack_samples(&self.transform_fixed(&frame)?)
    }

    pub fn streaming(&self) -> StreamingModel<'_> {
        StreamingModel::new(self)
    }
}

/// One cycle of traffic on the streaming interface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Beat<T> {
    /// Set on the first beat of a frame.
    pub first: bool,
    pub lanes: Vec<T>,
}

impl<T> Beat<T> {
    pub fn new(first: bool, lanes: Vec<T>) -> Self {
        Self { first, lanes }
    }
}

/// Beat-level model of the generated pipeline.
///
/// Frames are collected from `first` onwards and, once complete, their
/// output beats are released `latency().total` cycles after the frame's
/// first beat went in.
#[derive(Debug)]
pub struct StreamingModel<'a> {
    description: &'a StructuralDescription,
    cycle: u64,
    frame: Vec<ComplexFixed>,
    frame_start: Option<u64>,
    pending: VecDeque<(u64, Beat<ComplexFixed>)>,
}

impl<'a> StreamingModel<'a> {
    pub fn new(description: &'a StructuralDescription) -> Self {
        Self {
            description,
            cycle: 0,
            frame: Vec::new(),
            frame_start: None,
            pending: VecDeque::new(),
        }
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// One clock cycle. `None` is a cycle without valid input.
    pub fn clock(&mut self, input: Option<Beat<ComplexFixed>>) -> Result<Option<Beat<ComplexFixed>>> {
        if let Some(beat) = input {
            self.accept(beat)?;
        }
        let output = match self.pending.front() {
            Some((due, _)) if *due <= self.cycle => self.pending.pop_front().map(|(_, beat)| beat),
            _ => None,
        };
        self.cycle += 1;
        Ok(output)
    }

    fn accept(&mut self, beat: Beat<ComplexFixed>) -> Result<()> {
        let description = self.description;
        let params = &description.params;
        check_lanes(params.spcc, beat.lanes.len())?;
        if let Some(lane) = beat.lanes.iter().find(|lane| lane.width() != params.input_width) {
            return Err(HtfftError::WidthMismatch {
                expected: params.input_width,
                got: lane.width(),
            });
        }

        if beat.first {
            if self.frame_start.is_some() {
                warn!(
                    cycle = self.cycle,
                    received = self.frame.len(),
                    "frame restarted, dropping partial frame"
                );
            }
            self.frame.clear();
            self.frame_start = Some(self.cycle);
        }
        let Some(start) = self.frame_start else {
            // data before the first marker is ignored
            return Ok(());
        };

        self.frame.extend(beat.lanes);
        if self.frame.len() == params.n {
            let frame = core::mem::take(&mut self.frame);
            self.frame_start = None;
            let output = description.transform_fixed(&frame)?;
            let due = start + description.latency.total as u64;
            for (index, lanes) in output.chunks(params.spcc).enumerate() {
                self.pending
                    .push_back((due + index as u64, Beat::new(index == 0, lanes.to_vec())));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
