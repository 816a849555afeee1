// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Binding of VI channels to blender pipe slots.
//!
//! The route register of the blender is the only record of which channel feeds which pipe. It is
//! read back before a binding is torn down, because a layer updated earlier in the same batch may
//! already have claimed the pipe for another channel.

use crate::mixer::Mixer;
use crate::regmap::RegisterMap;
use crate::regmap::RegmapResult;
use crate::regs;

/// Enable state and pipe slot of one layer before and after an update.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RouteTransition {
    pub channel: u32,
    pub overlay: u32,
    pub was_enabled: bool,
    pub enabled: bool,
    pub old_zpos: u32,
    pub zpos: u32,
}

impl RouteTransition {
    /// The layer leaves its old pipe, either because it is hidden or because it moves.
    pub fn releases_old_pipe(&self) -> bool {
        (self.was_enabled && !self.enabled) || (self.enabled && self.zpos != self.old_zpos)
    }

    /// The layer claims its new pipe, either because it appears or because it moves.
    pub fn claims_new_pipe(&self) -> bool {
        (self.enabled && !self.was_enabled) || (self.enabled && self.zpos != self.old_zpos)
    }
}

/// The channel currently routed into `pipe`, or `None` if the pipe is disabled.
pub fn pipe_binding<R: RegisterMap + ?Sized>(
    regs: &mut R,
    mixer: &Mixer,
    pipe: u32,
) -> RegmapResult<Option<u32>> {
    let bld_base = mixer.blender_base();

    let ctl = regs.read(regs::blend_pipe_ctl(bld_base))?;
    if ctl & regs::blend_pipe_ctl_en(pipe) == 0 {
        return Ok(None);
    }

    let route = regs.read(regs::blend_route(bld_base))?;
    Ok(Some((route & regs::blend_route_pipe_msk(pipe)) >> regs::blend_route_pipe_shift(pipe)))
}

/// Applies `transition` to the layer enable bit and the blender routing.
pub fn apply<R: RegisterMap + ?Sized>(
    regs: &mut R,
    mixer: &Mixer,
    transition: &RouteTransition,
) -> RegmapResult<()> {
    let RouteTransition { channel, overlay, was_enabled, enabled, old_zpos, zpos } = *transition;
    let bld_base = mixer.blender_base();
    let attr = regs::chan_vi_layer_attr(mixer.channel_base(channel), overlay);

    log::debug!(
        "{}abling VI channel {} overlay {}",
        if enabled { "En" } else { "Dis" },
        channel,
        overlay
    );

    if was_enabled != enabled {
        let val = if enabled { regs::CHAN_VI_LAYER_ATTR_EN } else { 0 };
        regs.update_bits(attr, regs::CHAN_VI_LAYER_ATTR_EN, val)?;
    }

    if transition.releases_old_pipe() && pipe_binding(regs, mixer, old_zpos)? == Some(channel) {
        log::debug!(
            "chan={} en={}->{} zpos={}->{}",
            channel,
            was_enabled,
            enabled,
            old_zpos,
            zpos
        );
        log::debug!("  disable pipe {}", old_zpos);

        regs.update_bits(regs::blend_route(bld_base), regs::blend_route_pipe_msk(old_zpos), 0)?;
        regs.update_bits(regs::blend_pipe_ctl(bld_base), regs::blend_pipe_ctl_en(old_zpos), 0)?;
    }

    if transition.claims_new_pipe() {
        log::debug!(
            "chan={} en={}->{} zpos={}->{}",
            channel,
            was_enabled,
            enabled,
            old_zpos,
            zpos
        );

        let val = regs::blend_pipe_ctl_en(zpos);
        regs.update_bits(regs::blend_pipe_ctl(bld_base), val, val)?;

        let val = channel << regs::blend_route_pipe_shift(zpos);
        regs.update_bits(regs::blend_route(bld_base), regs::blend_route_pipe_msk(zpos), val)?;

        log::debug!("  enable pipe {} <- ch {}", zpos, channel);
    }

    Ok(())
}
