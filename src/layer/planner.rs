// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Decides whether and how a VI layer is scaled.
//!
//! The scaler has a bounded line buffer and a bounded number of output lines it can produce per
//! frame. When a request exceeds either, the channel's coarse decimator first drops whole samples
//! at an integer ratio and the scaler only performs the remaining fine scaling.

use crate::format::FormatInfo;
use crate::layer::geometry::Geometry;
use crate::mixer::Mixer;
use crate::regs;
use crate::scaler::ScalerParams;
use crate::state::OutputTiming;
use crate::FRAC_BITS;

/// Line buffer capacity of the scaler for non-subsampled formats.
pub const RGB_SCANLINE: u32 = 2048;

/// Tunables of the throughput estimate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScalerTuning {
    /// Share of the module clock the scaler is assumed to sustain, in percent.
    pub efficiency_percent: u32,
}

impl Default for ScalerTuning {
    fn default() -> Self {
        Self { efficiency_percent: 80 }
    }
}

/// A coarse decimation stage: `m` input samples become `n` output samples. `0/0` means none.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Decimation {
    pub m: u32,
    pub n: u32,
}

impl Decimation {
    pub fn is_active(&self) -> bool {
        self.m != 0
    }

    pub fn register_value(&self) -> u32 {
        regs::chan_vi_ds(self.n, self.m)
    }
}

/// Hardware limits the planner works against.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Module clock rate in Hz.
    pub mod_rate: u64,
    pub efficiency_percent: u32,
    /// Line buffer capacity for the format being scaled.
    pub scanline: u32,
}

impl Limits {
    pub fn new(mixer: &Mixer, format: &FormatInfo) -> Self {
        let scanline =
            if format.is_subsampled() { mixer.config().scanline_yuv } else { RGB_SCANLINE };

        Self {
            mod_rate: mixer.clock_rate(),
            efficiency_percent: mixer.tuning().efficiency_percent,
            scanline,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScalerPlan {
    /// Scaler programming, or `None` if the scaler stays off.
    pub scaler: Option<ScalerParams>,
    pub horizontal: Decimation,
    pub vertical: Decimation,
}

impl ScalerPlan {
    pub fn is_scaling(&self) -> bool {
        self.scaler.is_some()
    }
}

/// Estimated vertical compression the scaler sustains, in percent, or `None` if the timing gives
/// no meaningful bound.
fn scaling_ability(limits: &Limits, timing: &OutputTiming, width: u32) -> Option<u64> {
    let fps = timing.refresh_rate()?;
    let divisor = u64::from(timing.vdisplay) * u64::from(fps) * u64::from(width);
    if divisor == 0 {
        return None;
    }

    Some(limits.mod_rate * u64::from(limits.efficiency_percent) / divisor)
}

/// Plans the scaling of `geometry`. `timing` is only consulted when scaling is needed.
pub fn plan(
    geometry: &Geometry,
    format: &FormatInfo,
    timing: Option<&OutputTiming>,
    limits: &Limits,
) -> ScalerPlan {
    let subsampled = format.is_subsampled();

    // Chroma of subsampled formats always needs upscaling to luma size.
    if !geometry.is_resized() && !subsampled && geometry.hphase == 0 && geometry.vphase == 0 {
        log::debug!("HW scaling is not needed");
        return Default::default();
    }

    log::debug!("HW scaling is enabled");

    let mut src_w = geometry.src_w;
    let mut src_h = geometry.src_h;
    let dst_w = geometry.dst_w.max(1);
    let dst_h = geometry.dst_h.max(1);
    let mut plan = ScalerPlan::default();

    let ability = match timing {
        Some(timing) => scaling_ability(limits, timing, src_w.max(dst_w)),
        None => None,
    };

    match ability {
        Some(ability) => {
            let required = u64::from(src_h) * 100 / u64::from(dst_h);

            if ability < required {
                log::debug!("Using vertical coarse scaling");

                let mut n = ability * u64::from(dst_h) / 100;
                if n == 0 {
                    log::warn!("Scaler throughput too low for {} lines, keeping one", src_h);
                    n = 1;
                }

                plan.vertical = Decimation { m: src_h, n: n as u32 };
                src_h = n as u32;
            }
        }
        None => log::warn!("No usable output timing, skipping scaler throughput check"),
    }

    if src_w > limits.scanline {
        log::debug!("Using horizontal coarse scaling");

        plan.horizontal = Decimation { m: src_w, n: limits.scanline };
        src_w = limits.scanline;
    }

    let hscale = (u64::from(src_w) << FRAC_BITS) / u64::from(dst_w);
    let vscale = (u64::from(src_h) << FRAC_BITS) / u64::from(dst_h);

    plan.scaler = Some(ScalerParams {
        src_w,
        src_h,
        dst_w: geometry.dst_w,
        dst_h: geometry.dst_h,
        hscale: hscale as u32,
        vscale: vscale as u32,
        hphase: geometry.hphase,
        vphase: geometry.vphase,
    });

    plan
}
