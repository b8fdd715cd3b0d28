// src/network/mod.rs

//! Fully unrolled decimation-in-time network for one SPCC-wide vector.
//!
//! A network of `size` lanes is either a single butterfly (`size == 2`) or two
//! half-size networks followed by a layer of `size/2` butterflies. Lanes enter
//! in bit-reversed order and leave in natural order, each level halving the
//! value and widening it by two bits, so the output is `DFT / size`.

mod butterfly;

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use serde::Serialize;
use tracing::trace;

use crate::common::{Datapath, HtfftError, Result, check_lanes};
use crate::config::ButterflyPipeline;
use crate::fixed::ComplexFixed;
use crate::math::{log2_exact, reverse_bits};
use crate::twiddle::TwiddleSet;

pub use butterfly::Butterfly;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ButterflyNetwork {
    Leaf(Butterfly),
    Compose {
        size: usize,
        even: Box<ButterflyNetwork>,
        odd: Box<ButterflyNetwork>,
        layer: Vec<Butterfly>,
    },
}

impl ButterflyNetwork {
    /// Builds the network recursively, even and odd halves first.
    ///
    /// `twiddle_width` is the base width; each level adds its guard bits.
    pub fn build(
        size: usize,
        input_width: u32,
        twiddle_width: u32,
        pipeline: ButterflyPipeline,
    ) -> Result<Self> {
        let levels = log2_exact("network size", size)?;
        if size < 2 {
            return Err(HtfftError::TooSmall {
                name: "network size",
                value: size,
                min: 2,
            });
        }
        if size == 2 {
            return Ok(Self::Leaf(Butterfly::leaf(input_width, twiddle_width, pipeline)?));
        }

        let half = size / 2;
        let even = Self::build(half, input_width, twiddle_width, pipeline)?;
        let odd = Self::build(half, input_width, twiddle_width, pipeline)?;

        let layer_width = input_width + 2 * (levels - 1);
        let table = TwiddleSet::for_level(size, twiddle_width)?;
        trace!(size, layer_width, twiddle_width = table.width, "composing butterfly layer");
        let layer = table
            .twiddles
            .into_iter()
            .map(|twiddle| Butterfly::new(layer_width, twiddle, pipeline))
            .collect();

        Self::compose(even, odd, layer)
    }

    /// Combines two equal networks with a layer of butterflies, checking
    /// that sizes, widths and latencies line up.
    pub fn compose(even: Self, odd: Self, layer: Vec<Butterfly>) -> Result<Self> {
        check_lanes(even.size(), odd.size())?;
        check_lanes(even.size(), layer.len())?;
        if even.output_width() != odd.output_width() {
            return Err(HtfftError::WidthMismatch {
                expected: even.output_width(),
                got: odd.output_width(),
            });
        }
        for butterfly in &layer {
            if butterfly.input_width != even.output_width() {
                return Err(HtfftError::WidthMismatch {
                    expected: even.output_width(),
                    got: butterfly.input_width,
                });
            }
        }

        let network = Self::Compose {
            size: 2 * even.size(),
            even: Box::new(even),
            odd: Box::new(odd),
            layer,
        };
        network.output_latencies()?;
        Ok(network)
    }

    pub fn size(&self) -> usize {
        match self {
            Self::Leaf(_) => 2,
            Self::Compose { size, .. } => *size,
        }
    }

    pub fn levels(&self) -> u32 {
        self.size().trailing_zeros()
    }

    pub fn input_width(&self) -> u32 {
        match self {
            Self::Leaf(butterfly) => butterfly.input_width,
            Self::Compose { even, .. } => even.input_width(),
        }
    }

    pub fn output_width(&self) -> u32 {
        match self {
            Self::Leaf(butterfly) => butterfly.output_width(),
            Self::Compose { layer, even, .. } => layer
                .first()
                .map_or_else(|| even.output_width(), Butterfly::output_width),
        }
    }

    /// Cycles from input to each output lane.
    ///
    /// Fails when a layer combines lanes that arrive on different cycles.
    pub fn output_latencies(&self) -> Result<Vec<u32>> {
        match self {
            Self::Leaf(butterfly) => Ok(vec![butterfly.latency(); 2]),
            Self::Compose {
                size,
                even,
                odd,
                layer,
            } => {
                let half = size / 2;
                check_halves(half, even, odd, layer)?;
                let even_latencies = even.output_latencies()?;
                let odd_latencies = odd.output_latencies()?;
                let mut latencies = vec![0; *size];
                for (k, butterfly) in layer.iter().enumerate() {
                    let (e, o) = (even_latencies[k], odd_latencies[k]);
                    if e != o {
                        return Err(HtfftError::UnbalancedLatency { even: e, odd: o });
                    }
                    latencies[k] = e + butterfly.latency();
                    latencies[k + half] = e + butterfly.latency();
                }
                Ok(latencies)
            }
        }
    }

    /// Latency of a balanced network: `log2(size)` butterflies deep.
    pub fn depth(&self) -> Result<u32> {
        Ok(self.output_latencies()?.into_iter().max().unwrap_or(0))
    }

    /// Bit-accurate evaluation. `lanes` must be in bit-reversed order.
    pub fn evaluate(&self, lanes: &[ComplexFixed]) -> Result<Vec<ComplexFixed>> {
        check_lanes(self.size(), lanes.len())?;
        match self {
            Self::Leaf(butterfly) => {
                let (c, d) = butterfly.combine(lanes[0], lanes[1])?;
                Ok(vec![c, d])
            }
            Self::Compose {
                size,
                even,
                odd,
                layer,
            } => {
                let half = size / 2;
                check_halves(half, even, odd, layer)?;
                let even_out = even.evaluate(&lanes[..half])?;
                let odd_out = odd.evaluate(&lanes[half..])?;
                let mut out = vec![ComplexFixed::zero(self.output_width()); *size];
                for (k, butterfly) in layer.iter().enumerate() {
                    let (c, d) = butterfly.combine(even_out[k], odd_out[k])?;
                    out[k] = c;
                    out[k + half] = d;
                }
                Ok(out)
            }
        }
    }
}

fn check_halves(
    half: usize,
    even: &ButterflyNetwork,
    odd: &ButterflyNetwork,
    layer: &[Butterfly],
) -> Result<()> {
    check_lanes(half, even.size())?;
    check_lanes(half, odd.size())?;
    check_lanes(half, layer.len())
}

/// Combinational lane reordering: `out[reverse_bits(i)] = in[i]`.
pub fn comb_reorder<T: Clone>(lanes: &[T]) -> Result<Vec<T>> {
    let bits = log2_exact("lane count", lanes.len())?;
    let mut out = lanes.to_vec();
    for (i, lane) in lanes.iter().enumerate() {
        out[reverse_bits(i, bits)] = lane.clone();
    }
    Ok(out)
}

/// The network behind a comb reordering, so that it takes lanes in natural
/// order. Inside the pipeline the input memory already delivers bit-reversed
/// blocks and the bare network is used instead.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnrolledFft {
    pub network: ButterflyNetwork,
}

impl UnrolledFft {
    pub fn new(
        size: usize,
        input_width: u32,
        twiddle_width: u32,
        pipeline: ButterflyPipeline,
    ) -> Result<Self> {
        Ok(Self {
            network: ButterflyNetwork::build(size, input_width, twiddle_width, pipeline)?,
        })
    }

    pub fn output_width(&self) -> u32 {
        self.network.output_width()
    }

    pub fn latency(&self) -> Result<u32> {
        self.network.depth()
    }
}

impl Datapath<ComplexFixed> for UnrolledFft {
    fn lanes(&self) -> usize {
        self.network.size()
    }

    fn process(&self, lanes: &[ComplexFixed]) -> Result<Vec<ComplexFixed>> {
        check_lanes(self.lanes(), lanes.len())?;
        self.network.evaluate(&comb_reorder(lanes)?)
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
