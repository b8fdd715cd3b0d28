// src/address.rs

//! Bank assignment for the input memory.
//!
//! Samples arrive `size` per cycle in natural order and leave `size` per
//! cycle in bit-reversed order. Each bank has one write and one read port, so
//! every block of `size` consecutive addresses must hit `size` different
//! banks in both orders.
//!
//! The bank of an address adds its low `log2(size)` bits to its high
//! `log2(size)` bits taken in reverse order. Reversing the whole address
//! swaps those two fields and mirrors each, which leaves the sum unchanged,
//! so `bank(a) == bank(reverse_bits(a))`.

use alloc::vec;
use serde::Serialize;

use crate::common::{HtfftError, Result};
use crate::math::{log2_exact, reverse_bits};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AddressMapper {
    n: usize,
    size: usize,
    address_bits: u32,
    bank_bits: u32,
}

impl AddressMapper {
    pub fn new(n: usize, size: usize) -> Result<Self> {
        let address_bits = log2_exact("n", n)?;
        let bank_bits = log2_exact("bank count", size)?;
        if size < 2 {
            return Err(HtfftError::TooSmall {
                name: "bank count",
                value: size,
                min: 2,
            });
        }
        if n % size != 0 {
            return Err(HtfftError::NotADivisor { n, size });
        }
        if 2 * bank_bits > address_bits {
            return Err(HtfftError::ParallelismTooWide { n, size });
        }
        Ok(Self {
            n,
            size,
            address_bits,
            bank_bits,
        })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Cycles per frame, which is also the depth of each bank.
    pub fn rows(&self) -> usize {
        self.n / self.size
    }

    fn low(&self, address: usize) -> usize {
        address & (self.size - 1)
    }

    fn high(&self, address: usize) -> usize {
        (address >> (self.address_bits - self.bank_bits)) & (self.size - 1)
    }

    pub fn bank(&self, address: usize) -> usize {
        let mirrored = reverse_bits(self.high(address), self.bank_bits);
        (self.low(address) + mirrored) % self.size
    }

    pub fn row(&self, address: usize) -> usize {
        address / self.size
    }

    /// Natural-order block `block` puts lane `j` in bank `(j + r) % size`.
    pub fn write_rotation(&self, block: usize) -> usize {
        self.bank(block * self.size)
    }

    /// Bit-reversed block `block` finds lane `j` in bank `(j + r) % size`.
    ///
    /// Lane `j` of that block is address `reverse_bits(block*size + j)`,
    /// which shares its bank with `block*size + j`.
    pub fn read_rotation(&self, block: usize) -> usize {
        self.bank(reverse_bits(block * self.size, self.address_bits))
    }

    /// Address read on lane `lane` of bit-reversed block `block`.
    pub fn reversed_address(&self, block: usize, lane: usize) -> usize {
        reverse_bits(block * self.size + lane, self.address_bits)
    }

    /// Checks every block in both access orders.
    pub fn verify(&self) -> Result<()> {
        for block in 0..self.rows() {
            self.check_block("natural", block, |lane| block * self.size + lane)?;
            self.check_block("bit-reversed", block, |lane| self.reversed_address(block, lane))?;
        }
        Ok(())
    }

    fn check_block(
        &self,
        order: &'static str,
        block: usize,
        address: impl Fn(usize) -> usize,
    ) -> Result<()> {
        let mut used = vec![false; self.size];
        for lane in 0..self.size {
            let bank = self.bank(address(lane));
            if used[bank] {
                return Err(HtfftError::BankCollision { order, block, bank });
            }
            used[bank] = true;
        }
        Ok(())
    }
}
