// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Register map over a memory-mapped physical window, e.g. the mixer's block mapped through
//! `/dev/mem`.

// UNSAFE: accesses go through a raw pointer into a shared mapping. The mapping is created in
// `open` with the requested length, lives exactly as long as the `MmioRegisterMap`, and every
// offset is bounds- and alignment-checked before being dereferenced.

use std::fs::File;
use std::fs::OpenOptions;
use std::num::NonZeroUsize;
use std::os::fd::AsFd;
use std::path::Path;
use std::ptr::NonNull;

use nix::libc;
use nix::sys::mman::mmap;
use nix::sys::mman::munmap;
use nix::sys::mman::MapFlags;
use nix::sys::mman::ProtFlags;
use thiserror::Error;

use crate::regmap::RegisterMap;
use crate::regmap::RegmapError;
use crate::regmap::RegmapResult;

#[derive(Debug, Error)]
pub enum MmioError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: std::io::Error },

    #[error("cannot map an empty register window")]
    EmptyWindow,

    #[error("physical base {0:#x} does not fit the platform's file offset")]
    BadBase(u64),

    #[error("failed to map register window: {0}")]
    Map(nix::Error),
}

pub struct MmioRegisterMap {
    addr: NonNull<libc::c_void>,
    len: usize,
    // Keeps the device node open for as long as the mapping exists.
    _file: File,
}

impl MmioRegisterMap {
    /// Maps `len` bytes of `path` starting at `phys_base`.
    pub fn open<P: AsRef<Path>>(path: P, phys_base: u64, len: usize) -> Result<Self, MmioError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| MmioError::Open { path: path.display().to_string(), source })?;

        let length = NonZeroUsize::new(len).ok_or(MmioError::EmptyWindow)?;
        let offset = libc::off_t::try_from(phys_base).map_err(|_| MmioError::BadBase(phys_base))?;

        let addr = unsafe {
            mmap(
                None,
                length,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                file.as_fd(),
                offset,
            )
        }
        .map_err(MmioError::Map)?;

        log::debug!("Mapped {:#x} bytes of registers at {:#x}", len, phys_base);

        Ok(Self { addr, len, _file: file })
    }

    fn register_ptr(&self, reg: u32) -> RegmapResult<*mut u32> {
        if reg % 4 != 0 {
            return Err(RegmapError::Unaligned(reg));
        }

        let offset = reg as usize;
        if offset + 4 > self.len {
            return Err(RegmapError::OutOfRange(reg));
        }

        // SAFETY: `offset + 4 <= len`, so the pointer stays inside the mapping.
        Ok(unsafe { self.addr.as_ptr().cast::<u8>().add(offset).cast::<u32>() })
    }
}

impl RegisterMap for MmioRegisterMap {
    fn read(&mut self, reg: u32) -> RegmapResult<u32> {
        let ptr = self.register_ptr(reg)?;
        // SAFETY: in bounds and aligned, checked by `register_ptr`.
        Ok(unsafe { ptr.read_volatile() })
    }

    fn write(&mut self, reg: u32, val: u32) -> RegmapResult<()> {
        let ptr = self.register_ptr(reg)?;
        // SAFETY: in bounds and aligned, checked by `register_ptr`.
        unsafe { ptr.write_volatile(val) };
        Ok(())
    }
}

impl Drop for MmioRegisterMap {
    fn drop(&mut self) {
        // SAFETY: `addr` and `len` describe the mapping created in `open`, and no reference into
        // it can outlive `self`.
        if let Err(e) = unsafe { munmap(self.addr, self.len) } {
            log::error!("Unable to unmap register window: {e}");
        }
    }
}
