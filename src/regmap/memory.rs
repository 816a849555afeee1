// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! A register map backed by plain memory, whose only purpose is to let the layer logic run
//! without hardware so it can be tested and inspected in isolation.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::regmap::RegisterMap;
use crate::regmap::RegmapError;
use crate::regmap::RegmapResult;

/// One recorded register access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Read { reg: u32, val: u32 },
    Write { reg: u32, val: u32 },
}

/// Registers read as zero until written. Every access goes into a log, and accesses to
/// registers marked with [`MemoryRegisterMap::fail_on`] report a bus error.
#[derive(Debug, Default, Clone)]
pub struct MemoryRegisterMap {
    regs: BTreeMap<u32, u32>,
    log: Vec<Access>,
    failing: BTreeSet<u32>,
}

impl MemoryRegisterMap {
    pub fn new() -> Self {
        Default::default()
    }

    /// Current value of `reg`, without going through the access log.
    pub fn peek(&self, reg: u32) -> u32 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    /// Sets `reg` without going through the access log.
    pub fn poke(&mut self, reg: u32, val: u32) {
        self.regs.insert(reg, val);
    }

    /// Makes every subsequent access to `reg` fail.
    pub fn fail_on(&mut self, reg: u32) {
        self.failing.insert(reg);
    }

    pub fn accesses(&self) -> &[Access] {
        &self.log
    }

    /// Writes in the order they happened.
    pub fn writes(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.log.iter().filter_map(|access| match access {
            Access::Write { reg, val } => Some((*reg, *val)),
            Access::Read { .. } => None,
        })
    }

    /// Values written to `reg`, oldest first.
    pub fn writes_to(&self, reg: u32) -> Vec<u32> {
        self.writes().filter(|(r, _)| *r == reg).map(|(_, val)| val).collect()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// A copy of every register that has been written or poked.
    pub fn snapshot(&self) -> BTreeMap<u32, u32> {
        self.regs.clone()
    }

    fn check(&self, reg: u32) -> RegmapResult<()> {
        if reg % 4 != 0 {
            return Err(RegmapError::Unaligned(reg));
        }

        if self.failing.contains(&reg) {
            return Err(RegmapError::Bus(reg));
        }

        Ok(())
    }
}

impl RegisterMap for MemoryRegisterMap {
    fn read(&mut self, reg: u32) -> RegmapResult<u32> {
        self.check(reg)?;
        let val = self.peek(reg);
        self.log.push(Access::Read { reg, val });
        Ok(val)
    }

    fn write(&mut self, reg: u32, val: u32) -> RegmapResult<()> {
        self.check(reg)?;
        self.regs.insert(reg, val);
        self.log.push(Access::Write { reg, val });
        Ok(())
    }
}
