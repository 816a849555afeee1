// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Read-modify-write access to a mixer's register block.
//!
//! A register map is the only piece of shared mutable state this crate touches. Accesses are
//! synchronous and never retried: a failing access is reported to the caller immediately, which
//! may leave a composition update partially applied.

pub mod memory;
#[cfg(feature = "mmio")]
pub mod mmio;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegmapError {
    #[error("register {0:#x} is outside of the mapped window")]
    OutOfRange(u32),

    #[error("register {0:#x} is not 32-bit aligned")]
    Unaligned(u32),

    #[error("bus access to register {0:#x} failed")]
    Bus(u32),
}

pub type RegmapResult<T> = std::result::Result<T, RegmapError>;

/// A block of 32-bit registers addressed by byte offset.
pub trait RegisterMap {
    fn read(&mut self, reg: u32) -> RegmapResult<u32>;

    fn write(&mut self, reg: u32, val: u32) -> RegmapResult<()>;

    /// Replaces the bits of `reg` selected by `mask` with those of `val`. The write is skipped if
    /// the register already holds the resulting value.
    fn update_bits(&mut self, reg: u32, mask: u32, val: u32) -> RegmapResult<()> {
        let orig = self.read(reg)?;
        let tmp = (orig & !mask) | (val & mask);

        if tmp != orig {
            self.write(reg, tmp)?;
        }

        Ok(())
    }

    /// Writes `vals` to consecutive registers starting at `reg`.
    fn bulk_write(&mut self, reg: u32, vals: &[u32]) -> RegmapResult<()> {
        for (i, val) in vals.iter().enumerate() {
            self.write(reg + 4 * i as u32, *val)?;
        }

        Ok(())
    }
}

impl<R: RegisterMap + ?Sized> RegisterMap for &mut R {
    fn read(&mut self, reg: u32) -> RegmapResult<u32> {
        (**self).read(reg)
    }

    fn write(&mut self, reg: u32, val: u32) -> RegmapResult<()> {
        (**self).write(reg, val)
    }

    fn update_bits(&mut self, reg: u32, mask: u32, val: u32) -> RegmapResult<()> {
        (**self).update_bits(reg, mask, val)
    }

    fn bulk_write(&mut self, reg: u32, vals: &[u32]) -> RegmapResult<()> {
        (**self).bulk_write(reg, vals)
    }
}
