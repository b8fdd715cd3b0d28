// src/barrel.rs

//! Barrel shifter: rotation by a runtime amount in `log2(size) + 1` binary
//! stages, with registers placed by a [`BarrelPattern`].

use alloc::vec::Vec;
use serde::Serialize;

use crate::common::{HtfftError, Result, check_lanes};
use crate::config::BarrelPattern;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BarrelShifter {
    size: usize,
    pattern: BarrelPattern,
}

impl BarrelShifter {
    pub fn new(size: usize, pattern: BarrelPattern) -> Result<Self> {
        pattern.check_for(size)?;
        Ok(Self { size, pattern })
    }

    pub fn with_default_pattern(size: usize) -> Result<Self> {
        Self::new(size, BarrelPattern::every_fourth(size)?)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn pattern(&self) -> &BarrelPattern {
        &self.pattern
    }

    pub fn stages(&self) -> usize {
        self.pattern.len()
    }

    pub fn latency(&self) -> u32 {
        self.pattern.latency()
    }

    fn check_shift(&self, shift: usize) -> Result<()> {
        if shift >> self.stages() != 0 {
            return Err(HtfftError::BitsOutOfRange {
                width: self.stages() as u32,
            });
        }
        Ok(())
    }

    /// Stage `stage` rotates by `2^stage` when that bit of `shift` is set.
    fn apply_stage<T: Clone>(&self, stage: usize, lanes: Vec<T>, shift: usize) -> Vec<T> {
        if (shift >> stage) & 1 == 0 {
            return lanes;
        }
        let amount = (1usize << stage) % self.size;
        (0..self.size)
            .map(|i| lanes[(i + amount) % self.size].clone())
            .collect()
    }

    /// `out[i] = in[(i + shift) % size]`.
    pub fn rotate<T: Clone>(&self, lanes: &[T], shift: usize) -> Result<Vec<T>> {
        check_lanes(self.size, lanes.len())?;
        self.check_shift(shift)?;
        Ok((0..self.stages()).fold(lanes.to_vec(), |acc, stage| {
            self.apply_stage(stage, acc, shift)
        }))
    }

    /// Inverse rotation, `out[(i + shift) % size] = in[i]`.
    pub fn rotate_back<T: Clone>(&self, lanes: &[T], shift: usize) -> Result<Vec<T>> {
        self.rotate(lanes, (self.size - shift % self.size) % self.size)
    }

    pub fn clocked<T: Clone>(&self) -> ClockedBarrelShifter<T> {
        ClockedBarrelShifter::new(self.clone())
    }
}

#[derive(Clone, Debug)]
struct Token<T> {
    lanes: Vec<T>,
    shift: usize,
}

/// Register-accurate model of a [`BarrelShifter`].
///
/// Each call to [`clock`](Self::clock) is one cycle: the input moves through
/// the stages up to the first register, and every register hands its
/// contents on to the next segment.
#[derive(Clone, Debug)]
pub struct ClockedBarrelShifter<T> {
    shifter: BarrelShifter,
    /// Stage range feeding each register, plus the tail after the last one.
    segments: Vec<(usize, usize)>,
    registers: Vec<Option<Token<T>>>,
}

impl<T: Clone> ClockedBarrelShifter<T> {
    pub fn new(shifter: BarrelShifter) -> Self {
        let mut segments = Vec::new();
        let mut start = 0;
        for (stage, &registered) in shifter.pattern.registers().iter().enumerate() {
            if registered {
                segments.push((start, stage + 1));
                start = stage + 1;
            }
        }
        segments.push((start, shifter.stages()));
        let registers = (0..segments.len() - 1).map(|_| None).collect();
        Self {
            shifter,
            segments,
            registers,
        }
    }

    pub fn latency(&self) -> u32 {
        self.registers.len() as u32
    }

    fn run_segment(&self, segment: usize, token: Option<Token<T>>) -> Option<Token<T>> {
        let (start, end) = self.segments[segment];
        token.map(|Token { lanes, shift }| Token {
            lanes: (start..end).fold(lanes, |acc, stage| self.shifter.apply_stage(stage, acc, shift)),
            shift,
        })
    }

    /// Advances one cycle and returns what leaves the last stage.
    pub fn clock(&mut self, input: Option<(&[T], usize)>) -> Result<Option<Vec<T>>> {
        let mut carry = match input {
            Some((lanes, shift)) => {
                check_lanes(self.shifter.size, lanes.len())?;
                self.shifter.check_shift(shift)?;
                Some(Token {
                    lanes: lanes.to_vec(),
                    shift,
                })
            }
            None => None,
        };
        for index in 0..self.registers.len() {
            carry = self.run_segment(index, carry);
            carry = core::mem::replace(&mut self.registers[index], carry);
        }
        let last = self.segments.len() - 1;
        Ok(self.run_segment(last, carry).map(|token| token.lanes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoreboard::Scoreboard;
    use std::vec;

    fn shifter(size: usize, pattern: &str) -> BarrelShifter {
        BarrelShifter::new(size, pattern.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_rotate_convention() {
        let s = shifter(4, "000");
        assert_eq!(s.rotate(&[0, 1, 2, 3], 1).unwrap(), vec![1, 2, 3, 0]);
        assert_eq!(s.rotate(&[0, 1, 2, 3], 3).unwrap(), vec![3, 0, 1, 2]);
        // the top stage rotates by a full turn
        assert_eq!(s.rotate(&[0, 1, 2, 3], 4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(s.rotate_back(&[1, 2, 3, 0], 1).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            BarrelShifter::new(4, "10".parse().unwrap()),
            Err(HtfftError::PatternLength { expected: 3, got: 2 })
        );
        let s = shifter(4, "100");
        assert!(s.rotate(&[0, 1, 2], 1).is_err());
        assert!(s.rotate(&[0, 1, 2, 3], 8).is_err());
    }

    #[test]
    fn test_pattern_does_not_change_rotation() {
        let plain = shifter(8, "0000");
        let registered = shifter(8, "1011");
        let lanes: Vec<usize> = (0..8).collect();
        for shift in 0..16 {
            let expected: Vec<usize> = (0..8).map(|i| (i + shift) % 8).collect();
            assert_eq!(plain.rotate(&lanes, shift).unwrap(), expected);
            assert_eq!(registered.rotate(&lanes, shift).unwrap(), expected);
        }
        assert_eq!(plain.latency(), 0);
        assert_eq!(registered.latency(), 3);
    }

    #[test]
    fn test_default_pattern() {
        assert_eq!(BarrelShifter::with_default_pattern(4).unwrap().latency(), 1);
        assert_eq!(BarrelShifter::with_default_pattern(32).unwrap().latency(), 2);
    }

    /// Streams shifts through the clocked model and checks each output
    /// `latency` cycles later.
    fn drive(s: &BarrelShifter, cycles: usize) -> Vec<Option<Vec<usize>>> {
        let mut clocked = s.clocked::<usize>();
        let mut scoreboard = Scoreboard::new(s.latency() as usize);
        let lanes: Vec<usize> = (0..s.size()).collect();
        let mut outputs = Vec::new();
        for cycle in 0..cycles {
            let shift = (cycle * 3) % (2 * s.size());
            let expected = s.rotate(&lanes, shift).unwrap();
            let output = clocked.clock(Some((lanes.as_slice(), shift))).unwrap();
            scoreboard.step(Some(expected), output.as_ref()).unwrap();
            outputs.push(output);
        }
        outputs
    }

    #[test]
    fn test_clocked_latency_follows_pattern() {
        let fast = shifter(4, "000");
        let slow = shifter(4, "111");
        assert_eq!(slow.latency() - fast.latency(), 3);
        assert_eq!(slow.clocked::<usize>().latency(), 3);

        let fast_out = drive(&fast, 12);
        let slow_out = drive(&slow, 12);
        assert!(slow_out[..3].iter().all(Option::is_none));
        assert_eq!(&slow_out[3..], &fast_out[..9]);
    }

    #[test]
    fn test_clocked_bubbles() {
        let s = shifter(8, "1001");
        let mut clocked = s.clocked::<u8>();
        let lanes: Vec<u8> = (0..8).collect();
        assert_eq!(clocked.clock(Some((lanes.as_slice(), 5))).unwrap(), None);
        assert_eq!(clocked.clock(None).unwrap(), None);
        assert_eq!(
            clocked.clock(None).unwrap(),
            Some(s.rotate(&lanes, 5).unwrap())
        );
        assert_eq!(clocked.clock(None).unwrap(), None);
    }
}
