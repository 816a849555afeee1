// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! VI layers: the overlay planes backed by the mixer's video channels.
//!
//! A [`VideoLayer`] validates proposed plane states with [`VideoLayer::check`] and applies
//! committed ones with [`VideoLayer::atomic_update`]. An update runs, in order:
//!
//! 1. [`geometry`]: the source rectangle is aligned to the chroma subsampling grid.
//! 2. [`planner`]: the scaler and coarse decimators are configured within the hardware limits.
//! 3. [`buffer`]: fetch format, colour conversion and plane addresses are programmed.
//! 4. [`router`]: the channel is enabled, disabled or moved between blender pipes.
//!
//! Steps 1 to 3 only run for layers that stay or become visible. Routing always runs.

pub mod buffer;
pub mod geometry;
pub mod planner;
pub mod router;

use std::rc::Rc;

use drm_fourcc::DrmFourcc;
use thiserror::Error;

use crate::format::ColorEncoding;
use crate::format::ColorRange;
use crate::format::De2Format;
use crate::format::VI_LAYER_FORMATS;
use crate::layer::geometry::Geometry;
use crate::layer::planner::Limits;
use crate::layer::planner::ScalerPlan;
use crate::layer::router::RouteTransition;
use crate::mixer::Mixer;
use crate::rect;
use crate::rect::ScaleError;
use crate::regmap::RegisterMap;
use crate::regmap::RegmapError;
use crate::regs;
use crate::scaler;
use crate::state::Framebuffer;
use crate::state::PlaneState;
use crate::FIXED_ONE;

/// Smallest and largest 16.16 scale factor a channel with a scaler accepts.
pub const SCALE_MIN: i32 = 1;
pub const SCALE_MAX: i32 = (1 << 20) - 1;

/// Z position property of a layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ZposRange {
    pub initial: u32,
    pub min: u32,
    pub max: u32,
}

/// YCbCr encoding and range properties of a layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColorProperties {
    /// Bit mask of supported [`ColorEncoding`]s.
    pub encodings: u32,
    /// Bit mask of supported [`ColorRange`]s.
    pub ranges: u32,
    pub default_encoding: ColorEncoding,
    pub default_range: ColorRange,
}

/// What a VI layer offers to the plane framework.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerCapabilities {
    pub formats: &'static [DrmFourcc],
    pub zpos: ZposRange,
    pub color: ColorProperties,
}

/// The plane framework a layer registers itself with.
pub trait PlaneRegistrar {
    /// Creates an overlay plane scanning out `formats`.
    fn init_plane(&mut self, formats: &[DrmFourcc]) -> anyhow::Result<()>;

    fn add_zpos_property(&mut self, zpos: &ZposRange) -> anyhow::Result<()>;

    fn add_color_properties(&mut self, color: &ColorProperties) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum InitError {
    #[error("VI channel {channel} does not exist, the mixer has {vi_num}")]
    InvalidChannel { channel: u32, vi_num: u32 },
    #[error("couldn't {step}: {error:#}")]
    Registration { step: &'static str, error: anyhow::Error },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("format {0:?} is not supported by the mixer")]
    UnsupportedFormat(DrmFourcc),
    #[error("invalid scaling of plane: {0}")]
    Scale(#[from] ScaleError),
    #[error("zpos {zpos} outside of [0, {max}]")]
    Zpos { zpos: u32, max: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error("format {0:?} is not supported by the mixer")]
    UnsupportedFormat(DrmFourcc),
    #[error("visible plane without framebuffer")]
    MissingFramebuffer,
    #[error("{fourcc:?} framebuffer has {provided} of {needed} planes")]
    IncompleteFramebuffer { fourcc: DrmFourcc, needed: usize, provided: usize },
    #[error("visible plane with an empty destination")]
    EmptyDestination,
    #[error(transparent)]
    Bus(#[from] RegmapError),
}

#[derive(Debug)]
pub struct VideoLayer {
    mixer: Rc<Mixer>,
    channel: u32,
    overlay: u32,
    capabilities: LayerCapabilities,
}

impl VideoLayer {
    /// Creates the layer of VI channel `index` and registers it with `registrar`.
    pub fn new(
        mixer: Rc<Mixer>,
        index: u32,
        registrar: &mut dyn PlaneRegistrar,
    ) -> Result<Self, InitError> {
        let vi_num = mixer.config().vi_num;
        if index >= vi_num {
            return Err(InitError::InvalidChannel { channel: index, vi_num });
        }

        let capabilities = LayerCapabilities {
            formats: VI_LAYER_FORMATS,
            zpos: ZposRange { initial: index, min: 0, max: mixer.config().plane_count() - 1 },
            color: ColorProperties {
                encodings: ColorEncoding::Bt601.bit() | ColorEncoding::Bt709.bit(),
                ranges: ColorRange::Limited.bit() | ColorRange::Full.bit(),
                default_encoding: ColorEncoding::Bt709,
                default_range: ColorRange::Limited,
            },
        };

        let registration = |step: &'static str| {
            move |error: anyhow::Error| {
                log::error!("Couldn't {}: {:#}", step, error);
                InitError::Registration { step, error }
            }
        };

        registrar.init_plane(capabilities.formats).map_err(registration("initialize layer"))?;
        registrar
            .add_zpos_property(&capabilities.zpos)
            .map_err(registration("add zpos property"))?;
        registrar
            .add_color_properties(&capabilities.color)
            .map_err(registration("add encoding and range properties"))?;

        log::debug!("Created VI layer for channel {}", index);

        Ok(Self { mixer, channel: index, overlay: 0, capabilities })
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    pub fn overlay(&self) -> u32 {
        self.overlay
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn capabilities(&self) -> &LayerCapabilities {
        &self.capabilities
    }

    /// The state of a freshly reset plane: detached, stacked at its own channel index.
    pub fn reset_state(&self) -> PlaneState {
        PlaneState {
            zpos: self.channel,
            color_encoding: self.capabilities.color.default_encoding,
            color_range: self.capabilities.color.default_range,
            ..Default::default()
        }
    }

    /// Validates a proposed state and computes its visibility. Source and destination are
    /// clipped to the active area of the CRTC. Does not touch the hardware.
    pub fn check(&self, state: &mut PlaneState) -> Result<(), CheckError> {
        let max = self.capabilities.zpos.max;
        if state.zpos > max {
            return Err(CheckError::Zpos { zpos: state.zpos, max });
        }

        let crtc = match (&state.crtc, &state.fb) {
            (Some(crtc), Some(fb)) => {
                if De2Format::lookup(fb.format.fourcc).is_none() {
                    return Err(CheckError::UnsupportedFormat(fb.format.fourcc));
                }
                *crtc
            }
            _ => {
                state.visible = false;
                return Ok(());
            }
        };

        if !crtc.enabled {
            state.visible = false;
            return Ok(());
        }

        let (min_scale, max_scale) = if self.mixer.has_scaler(self.channel) {
            (SCALE_MIN, SCALE_MAX)
        } else {
            (FIXED_ONE as i32, FIXED_ONE as i32)
        };

        rect::calc_hscale(&state.src, &state.dst, min_scale, max_scale)?;
        rect::calc_vscale(&state.src, &state.dst, min_scale, max_scale)?;

        let clip = crtc.timing.active_area();
        state.visible = rect::clip_scaled_rects(&mut state.src, &mut state.dst, &clip);

        Ok(())
    }

    /// Aligns the geometry of `state` and plans its scaling.
    pub fn scaling_plan(&self, state: &PlaneState) -> Result<(Geometry, ScalerPlan), UpdateError> {
        let fb = state.fb.as_ref().ok_or(UpdateError::MissingFramebuffer)?;
        let geometry = geometry::normalize(&state.src, &state.dst, fb.format);
        let limits = Limits::new(&self.mixer, fb.format);
        let plan = planner::plan(&geometry, fb.format, state.timing(), &limits);

        Ok((geometry, plan))
    }

    fn update_coord<R: RegisterMap + ?Sized>(
        &self,
        regs: &mut R,
        state: &PlaneState,
        fb: &Framebuffer,
    ) -> Result<(), UpdateError> {
        log::debug!("Updating VI channel {} overlay {}", self.channel, self.overlay);

        let bld_base = self.mixer.blender_base();
        let ch_base = self.mixer.channel_base(self.channel);
        let (geometry, plan) = self.scaling_plan(state)?;

        log::debug!("Layer source offset X: {} Y: {}", geometry.src_x, geometry.src_y);
        log::debug!("Layer source size W: {} H: {}", geometry.src_w, geometry.src_h);
        regs.write(regs::chan_vi_layer_size(ch_base, self.overlay), geometry.insize())?;
        regs.write(regs::chan_vi_ovl_size(ch_base), geometry.insize())?;

        match &plan.scaler {
            Some(params) => {
                scaler::setup(regs, &self.mixer, self.channel, params, fb.format)?;
                scaler::enable(regs, &self.mixer, self.channel, true)?;
            }
            None => scaler::enable(regs, &self.mixer, self.channel, false)?,
        }

        let hds = plan.horizontal.register_value();
        let vds = plan.vertical.register_value();
        regs.write(regs::chan_vi_hds_y(ch_base), hds)?;
        regs.write(regs::chan_vi_hds_uv(ch_base), hds)?;
        regs.write(regs::chan_vi_vds_y(ch_base), vds)?;
        regs.write(regs::chan_vi_vds_uv(ch_base), vds)?;

        log::debug!("Layer destination coordinates X: {} Y: {}", state.dst.x1, state.dst.y1);
        log::debug!("Layer destination size W: {} H: {}", geometry.dst_w, geometry.dst_h);
        regs.write(
            regs::blend_attr_coord(bld_base, state.zpos),
            regs::coord(state.dst.x1 as u32, state.dst.y1 as u32),
        )?;
        regs.write(regs::blend_attr_insize(bld_base, state.zpos), geometry.outsize())?;

        Ok(())
    }

    /// Applies the transition from `old` to `new`. Both states must have gone through
    /// [`VideoLayer::check`].
    ///
    /// Unsupported formats are rejected before any register is written. A bus error aborts the
    /// update where it happened.
    pub fn atomic_update<R: RegisterMap + ?Sized>(
        &self,
        regs: &mut R,
        old: &PlaneState,
        new: &PlaneState,
    ) -> Result<(), UpdateError> {
        let was_enabled = old.is_enabled();
        let enabled = new.is_enabled();

        if enabled {
            let fb = new.fb.as_ref().ok_or(UpdateError::MissingFramebuffer)?;
            let fmt = De2Format::lookup(fb.format.fourcc).ok_or_else(|| {
                log::debug!("Invalid format");
                UpdateError::UnsupportedFormat(fb.format.fourcc)
            })?;

            if fb.planes.len() < fb.format.num_planes {
                return Err(UpdateError::IncompleteFramebuffer {
                    fourcc: fb.format.fourcc,
                    needed: fb.format.num_planes,
                    provided: fb.planes.len(),
                });
            }

            if !new.dst.is_visible() {
                return Err(UpdateError::EmptyDestination);
            }

            self.update_coord(regs, new, fb)?;
            buffer::program_formats(
                regs,
                &self.mixer,
                self.channel,
                self.overlay,
                fmt,
                new.color_encoding,
                new.color_range,
            )?;
            buffer::program_buffer(regs, &self.mixer, self.channel, self.overlay, fb, &new.src)?;
        }

        let transition = RouteTransition {
            channel: self.channel,
            overlay: self.overlay,
            was_enabled,
            enabled,
            old_zpos: old.zpos,
            zpos: new.zpos,
        };

        router::apply(regs, &self.mixer, &transition)?;

        Ok(())
    }
}
