// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Overlay ("VI") layer programming for the Allwinner Display Engine 2/3 mixer.
//!
//! The mixer blends several layers onto a single output timing. Each VI channel owns a scaler
//! with a bounded line buffer and bounded throughput, a colour-space converter and a set of
//! framebuffer fetch registers. A blender stage then routes channels into z-ordered pipe slots.
//!
//! This crate derives the scaler, format and buffer parameters for a requested composition and
//! performs the routing transitions between compositions. All hardware access goes through a
//! [`regmap::RegisterMap`] handle that is passed explicitly to every operation.
//!
//! # Serialization
//!
//! None of the operations here lock anything. Callers must guarantee that the register block of
//! one mixer is accessed by one composition update at a time, and that the per-layer updates of
//! one batch are applied in a fixed order: the routing step of a layer reads back routes written
//! by layers updated earlier in the same batch.

pub mod csc;
pub mod format;
pub mod layer;
pub mod mixer;
pub mod rect;
pub mod regmap;
pub mod regs;
pub mod scaler;
pub mod state;

pub use drm_fourcc::DrmFourcc;

pub use crate::layer::VideoLayer;
pub use crate::mixer::Mixer;
pub use crate::mixer::MixerConfig;
pub use crate::rect::Rect;
pub use crate::state::PlaneState;

/// Number of fractional bits of the DRM fixed-point source coordinates and scale factors.
pub const FRAC_BITS: u32 = 16;

/// 1.0 in 16.16 fixed point.
pub const FIXED_ONE: u32 = 1 << FRAC_BITS;
