// src/common.rs

use alloc::vec::Vec;
use thiserror::Error;

/// Which side of the contract an [`HtfftError`] comes from.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// The request or a structural input was malformed. Raised before any
    /// generation or evaluation work is done.
    Configuration,
    /// A value does not fit its fixed-point encoding.
    Range,
    /// A realized transform disagrees with the reference by more than the
    /// modeled tolerance.
    Precision,
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum HtfftError {
    #[error("{name} must be a power of two, got {value}")]
    NotPowerOfTwo { name: &'static str, value: usize },

    #[error("{name} must be at least {min}, got {value}")]
    TooSmall {
        name: &'static str,
        value: usize,
        min: usize,
    },

    #[error("parallelism {size} is too wide for a {n}-point transform (need 2*log2(size) <= log2(n))")]
    ParallelismTooWide { n: usize, size: usize },

    #[error("{size} does not divide {n}")]
    NotADivisor { n: usize, size: usize },

    #[error("bit width must be even, got {0}")]
    OddWidth(u32),

    #[error("bit width {width} is outside the supported range {min}..={max}")]
    WidthOutOfBounds { width: u32, min: u32, max: u32 },

    #[error("barrel shifter pattern must have {expected} characters, got {got}")]
    PatternLength { expected: usize, got: usize },

    #[error("barrel shifter pattern may only contain '0' and '1', found {0:?}")]
    PatternCharacter(char),

    #[error("multiplier latency must be at least 1")]
    ZeroMultiplierLatency,

    #[error("expected {expected} lanes, got {got}")]
    LaneCountMismatch { expected: usize, got: usize },

    #[error("expected operands of width {expected}, got {got}")]
    WidthMismatch { expected: u32, got: u32 },

    #[error("sub-network latencies differ ({even} vs {odd} cycles)")]
    UnbalancedLatency { even: u32, odd: u32 },

    #[error("bank {bank} is addressed twice in {order} block {block}")]
    BankCollision {
        order: &'static str,
        block: usize,
        bank: usize,
    },

    #[error("complex value ({re}, {im}) has magnitude above 1")]
    MagnitudeOutOfRange { re: f64, im: f64 },

    #[error("value does not fit in {width} bits")]
    BitsOutOfRange { width: u32 },

    #[error("discrepancy {observed:.6} exceeds allowed {allowed:.6}")]
    PrecisionExceeded { observed: f64, allowed: f64 },

    #[error("scoreboard mismatch at observation {index}")]
    ScoreboardMismatch { index: usize },
}

impl HtfftError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HtfftError::MagnitudeOutOfRange { .. } | HtfftError::BitsOutOfRange { .. } => {
                ErrorKind::Range
            }
            HtfftError::PrecisionExceeded { .. } | HtfftError::ScoreboardMismatch { .. } => {
                ErrorKind::Precision
            }
            _ => ErrorKind::Configuration,
        }
    }
}

pub type Result<T, E = HtfftError> = core::result::Result<T, E>;

/// A block of combinational or pipelined logic that maps one vector of lanes
/// to another within a single beat.
pub trait Datapath<T> {
    /// Number of lanes consumed per beat.
    fn lanes(&self) -> usize;

    fn process(&self, lanes: &[T]) -> Result<Vec<T>>;
}

pub(crate) fn check_lanes(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(HtfftError::LaneCountMismatch { expected, got });
    }
    Ok(())
}
