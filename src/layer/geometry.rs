// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Aligns source rectangles to the chroma subsampling grid.

use crate::format::FormatInfo;
use crate::rect::Rect;
use crate::regs;
use crate::FRAC_BITS;

const FRAC_MASK: i32 = (1 << FRAC_BITS) - 1;

/// Source and destination dimensions as the scaler sees them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Geometry {
    /// Source origin, aligned down to the subsampling factors.
    pub src_x: u32,
    pub src_y: u32,
    /// Source size, grown to cover the requested area from the aligned origin and rounded up to
    /// the subsampling factors.
    pub src_w: u32,
    pub src_h: u32,
    pub dst_w: u32,
    pub dst_h: u32,
    /// 16.16 offset of the requested origin from the aligned one.
    pub hphase: u32,
    pub vphase: u32,
}

impl Geometry {
    pub fn insize(&self) -> u32 {
        regs::size(self.src_w, self.src_h)
    }

    pub fn outsize(&self) -> u32 {
        regs::size(self.dst_w, self.dst_h)
    }

    /// Whether source and destination sizes differ.
    pub fn is_resized(&self) -> bool {
        self.insize() != self.outsize()
    }
}

/// Splits a 16.16 origin and integer size along one axis into aligned origin, size and phase.
fn align_axis(origin: i32, size: u32, sub: u32) -> (u32, u32, u32) {
    let pixel = (origin >> FRAC_BITS).max(0) as u32;
    let mut phase = (origin & FRAC_MASK) as u32;
    let mut size = size;

    if sub > 1 {
        let mask = sub - 1;
        let remainder = pixel & mask;
        size = (size + remainder + mask) & !mask;
        phase += remainder << FRAC_BITS;
    }

    (pixel & !(sub - 1), size, phase)
}

/// Normalizes `src` (16.16) and `dst` (pixels) for `format`.
pub fn normalize(src: &Rect, dst: &Rect, format: &FormatInfo) -> Geometry {
    let src_w = (src.width().max(0) >> FRAC_BITS) as u32;
    let src_h = (src.height().max(0) >> FRAC_BITS) as u32;

    let (src_x, src_w, hphase) = align_axis(src.x1, src_w, format.hsub);
    let (src_y, src_h, vphase) = align_axis(src.y1, src_h, format.vsub);

    Geometry {
        src_x,
        src_y,
        src_w,
        src_h,
        dst_w: dst.width().max(0) as u32,
        dst_h: dst.height().max(0) as u32,
        hphase,
        vphase,
    }
}
