// src/memory.rs

//! Memories at the two ends of the pipeline.
//!
//! [`InitialMemory`] takes a frame in natural order and hands it to the
//! unrolled network in bit-reversed order, `spcc` banks wide. [`FinalMemory`]
//! turns the last stage's `a`/`b` chunks back into natural-order beats.

use alloc::vec::Vec;
use serde::Serialize;

use crate::address::AddressMapper;
use crate::barrel::BarrelShifter;
use crate::common::{HtfftError, Result, check_lanes};
use crate::config::BarrelPattern;
use crate::stage::{Chunk, from_chunks};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InitialMemory {
    pub mapper: AddressMapper,
    pub write_shifter: BarrelShifter,
    pub read_shifter: BarrelShifter,
}

impl InitialMemory {
    pub fn new(n: usize, spcc: usize, pattern: BarrelPattern) -> Result<Self> {
        let mapper = AddressMapper::new(n, spcc)?;
        mapper.verify()?;
        Ok(Self {
            mapper,
            write_shifter: BarrelShifter::new(spcc, pattern.clone())?,
            read_shifter: BarrelShifter::new(spcc, pattern)?,
        })
    }

    fn spcc(&self) -> usize {
        self.mapper.size()
    }

    /// A whole frame is stored before the first bit-reversed block can be
    /// read, plus one trip through each barrel shifter.
    pub fn latency(&self) -> u32 {
        self.mapper.rows() as u32 + self.write_shifter.latency() + self.read_shifter.latency()
    }

    /// Rotates natural beat `beat` so that output lane `l` belongs to bank `l`.
    pub fn write_beat<T: Clone>(&self, beat: usize, lanes: &[T]) -> Result<Vec<T>> {
        let spcc = self.spcc();
        check_lanes(spcc, lanes.len())?;
        let rotation = self.mapper.write_rotation(beat);
        for bank in 0..spcc {
            let address = beat * spcc + (bank + spcc - rotation) % spcc;
            if self.mapper.bank(address) != bank {
                return Err(HtfftError::BankCollision {
                    order: "natural",
                    block: beat,
                    bank,
                });
            }
        }
        self.write_shifter.rotate_back(lanes, rotation)
    }

    /// Reads bit-reversed block `block` out of `banks` and undoes the bank
    /// rotation.
    pub fn read_block<T: Clone>(&self, block: usize, banks: &[Vec<T>]) -> Result<Vec<T>> {
        let spcc = self.spcc();
        check_lanes(spcc, banks.len())?;
        let rotation = self.mapper.read_rotation(block);
        let mut read = Vec::with_capacity(spcc);
        for (bank, contents) in banks.iter().enumerate() {
            let lane = (bank + spcc - rotation) % spcc;
            let row = self.mapper.row(self.mapper.reversed_address(block, lane));
            let value = contents.get(row).ok_or(HtfftError::LaneCountMismatch {
                expected: self.mapper.rows(),
                got: contents.len(),
            })?;
            read.push(value.clone());
        }
        self.read_shifter.rotate(&read, rotation)
    }

    /// Bank contents after writing `frame`, one row per natural beat.
    pub fn write_frame<T: Clone>(&self, frame: &[T]) -> Result<Vec<Vec<T>>> {
        let spcc = self.spcc();
        check_lanes(self.mapper.n(), frame.len())?;
        let mut banks: Vec<Vec<T>> = (0..spcc)
            .map(|_| Vec::with_capacity(self.mapper.rows()))
            .collect();
        for (beat, lanes) in frame.chunks(spcc).enumerate() {
            for (bank, value) in self.write_beat(beat, lanes)?.into_iter().enumerate() {
                banks[bank].push(value);
            }
        }
        Ok(banks)
    }

    /// All blocks of `banks` in bit-reversed order, concatenated.
    pub fn read_frame<T: Clone>(&self, banks: &[Vec<T>]) -> Result<Vec<T>> {
        let mut frame = Vec::with_capacity(self.mapper.n());
        for block in 0..self.mapper.rows() {
            frame.extend(self.read_block(block, banks)?);
        }
        Ok(frame)
    }

    /// Natural-order frame in, bit-reversed frame out.
    pub fn transfer<T: Clone>(&self, frame: &[T]) -> Result<Vec<T>> {
        self.read_frame(&self.write_frame(frame)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FinalMemory {
    pub n: usize,
    pub spcc: usize,
}

impl FinalMemory {
    pub fn new(n: usize, spcc: usize) -> Self {
        Self { n, spcc }
    }

    /// The first output beat needs the `a` lanes of two chunks; the `b`
    /// lanes are held for the second half of the frame.
    pub fn latency(&self) -> u32 {
        (self.n / (2 * self.spcc)) as u32
    }

    /// Every `a` lane in order, then every `b` lane, `spcc` per beat.
    pub fn reorder<T: Clone>(&self, chunks: &[Chunk<T>]) -> Result<Vec<Vec<T>>> {
        check_lanes(self.n / self.spcc, chunks.len())?;
        for chunk in chunks {
            check_lanes(self.spcc / 2, chunk.a.len())?;
            check_lanes(self.spcc / 2, chunk.b.len())?;
        }
        Ok(from_chunks(chunks)
            .chunks(self.spcc)
            .map(<[T]>::to_vec)
            .collect())
    }
}
