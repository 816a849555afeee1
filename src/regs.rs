// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Register offsets and bit fields of the DE2/DE3 mixer, relative to the mixer's register block.

#![allow(clippy::identity_op)]

/// Packs a size as the hardware expects it: `(height - 1) << 16 | (width - 1)`.
pub const fn size(width: u32, height: u32) -> u32 {
    (height.wrapping_sub(1) << 16) | (width.wrapping_sub(1) & 0xffff)
}

/// Packs a coordinate: `y << 16 | x`.
pub const fn coord(x: u32, y: u32) -> u32 {
    (y << 16) | (x & 0xffff)
}

pub const GLOBAL_CTL: u32 = 0x0;
pub const GLOBAL_CTL_RT_EN: u32 = 1 << 0;

pub const DE2_BLD_BASE: u32 = 0x1000;
pub const DE2_CH_BASE: u32 = 0x2000;
pub const DE2_CH_SIZE: u32 = 0x1000;

pub const DE3_BLD_BASE: u32 = 0x0800;
pub const DE3_CH_BASE: u32 = 0x1000;
pub const DE3_CH_SIZE: u32 = 0x0800;

// Blender.

pub const fn blend_pipe_ctl(base: u32) -> u32 {
    base + 0x0
}

pub const fn blend_attr_fcolor(base: u32, pipe: u32) -> u32 {
    base + 0x4 + 0x10 * pipe
}

pub const fn blend_attr_insize(base: u32, pipe: u32) -> u32 {
    base + 0x8 + 0x10 * pipe
}

pub const fn blend_attr_coord(base: u32, pipe: u32) -> u32 {
    base + 0xc + 0x10 * pipe
}

pub const fn blend_route(base: u32) -> u32 {
    base + 0x80
}

pub const fn blend_bkcolor(base: u32) -> u32 {
    base + 0x88
}

pub const fn blend_mode(base: u32, pipe: u32) -> u32 {
    base + 0x90 + 0x4 * pipe
}

/// DE3 only: per-channel colour-space converters live in the blender.
pub const fn blend_csc_ctl(base: u32) -> u32 {
    base + 0x100
}

/// DE3 only: `index` walks the 3x4 matrix row by row, the last column being the offset.
pub const fn blend_csc_coeff(base: u32, layer: u32, index: u32) -> u32 {
    base + 0x110 + layer * 0x30 + 0x4 * index
}

pub const fn blend_csc_ctl_en(channel: u32) -> u32 {
    1 << channel
}

pub const BLEND_PIPE_CTL_EN_MSK: u32 = 0x1f << 8;

pub const fn blend_pipe_ctl_en(pipe: u32) -> u32 {
    1 << (8 + pipe)
}

pub const fn blend_pipe_ctl_fc_en(pipe: u32) -> u32 {
    1 << pipe
}

pub const fn blend_route_pipe_shift(pipe: u32) -> u32 {
    pipe << 2
}

pub const fn blend_route_pipe_msk(pipe: u32) -> u32 {
    0xf << blend_route_pipe_shift(pipe)
}

/// Colours are always AARRGGBB.
pub const BLEND_COLOR_BLACK: u32 = 0xff000000;
/// Default blend equation, as programmed by the vendor driver.
pub const BLEND_MODE_DEF: u32 = 0x03010301;

// VI channel.

pub const fn chan_vi_layer_attr(base: u32, layer: u32) -> u32 {
    base + 0x30 * layer + 0x0
}

pub const fn chan_vi_layer_size(base: u32, layer: u32) -> u32 {
    base + 0x30 * layer + 0x4
}

pub const fn chan_vi_layer_pitch(base: u32, layer: u32, plane: u32) -> u32 {
    base + 0x30 * layer + 0xc + 4 * plane
}

pub const fn chan_vi_layer_top_laddr(base: u32, layer: u32, plane: u32) -> u32 {
    base + 0x30 * layer + 0x18 + 4 * plane
}

pub const fn chan_vi_ovl_size(base: u32) -> u32 {
    base + 0xe8
}

pub const fn chan_vi_hds_y(base: u32) -> u32 {
    base + 0xf0
}

pub const fn chan_vi_hds_uv(base: u32) -> u32 {
    base + 0xf4
}

pub const fn chan_vi_vds_y(base: u32) -> u32 {
    base + 0xf8
}

pub const fn chan_vi_vds_uv(base: u32) -> u32 {
    base + 0xfc
}

pub const CHAN_VI_LAYER_ATTR_EN: u32 = 1 << 0;
/// Set for RGB formats, cleared for YCbCr.
pub const CHAN_VI_LAYER_ATTR_RGB_MODE: u32 = 1 << 15;
pub const CHAN_VI_LAYER_ATTR_FBFMT_OFFSET: u32 = 8;
pub const CHAN_VI_LAYER_ATTR_FBFMT_MASK: u32 = 0x1f << 8;
/// DE3 only: global alpha.
pub const CHAN_VI_LAYER_ATTR_ALPHA_MASK: u32 = 0xff << 24;

pub const fn chan_vi_layer_attr_alpha(alpha: u32) -> u32 {
    alpha << 24
}

/// Coarse decimation register value: `n` output samples for every `m` input samples. Zero in
/// both fields disables decimation.
pub const fn chan_vi_ds(n: u32, m: u32) -> u32 {
    (n << 16) | m
}

// VI scaler, relative to the scaler unit base.

pub const DE2_VI_SCALER_UNIT_BASE: u32 = 0x20000;
pub const DE2_VI_SCALER_UNIT_SIZE: u32 = 0x20000;
pub const DE3_VI_SCALER_UNIT_BASE: u32 = 0x20000;
pub const DE3_VI_SCALER_UNIT_SIZE: u32 = 0x08000;

pub const fn scaler_vsu_ctrl(base: u32) -> u32 {
    base + 0x0
}

pub const fn scaler_vsu_scale_mode(base: u32) -> u32 {
    base + 0x10
}

pub const fn scaler_vsu_outsize(base: u32) -> u32 {
    base + 0x40
}

pub const fn scaler_vsu_yinsize(base: u32) -> u32 {
    base + 0x80
}

pub const fn scaler_vsu_yhstep(base: u32) -> u32 {
    base + 0x88
}

pub const fn scaler_vsu_yvstep(base: u32) -> u32 {
    base + 0x8c
}

pub const fn scaler_vsu_yhphase(base: u32) -> u32 {
    base + 0x90
}

pub const fn scaler_vsu_yvphase(base: u32) -> u32 {
    base + 0x98
}

pub const fn scaler_vsu_cinsize(base: u32) -> u32 {
    base + 0xc0
}

pub const fn scaler_vsu_chstep(base: u32) -> u32 {
    base + 0xc8
}

pub const fn scaler_vsu_cvstep(base: u32) -> u32 {
    base + 0xcc
}

pub const fn scaler_vsu_chphase(base: u32) -> u32 {
    base + 0xd0
}

pub const fn scaler_vsu_cvphase(base: u32) -> u32 {
    base + 0xd8
}

pub const fn scaler_vsu_yhcoeff0(base: u32, i: u32) -> u32 {
    base + 0x200 + 0x4 * i
}

pub const fn scaler_vsu_yhcoeff1(base: u32, i: u32) -> u32 {
    base + 0x300 + 0x4 * i
}

pub const fn scaler_vsu_yvcoeff(base: u32, i: u32) -> u32 {
    base + 0x400 + 0x4 * i
}

pub const fn scaler_vsu_chcoeff0(base: u32, i: u32) -> u32 {
    base + 0x600 + 0x4 * i
}

pub const fn scaler_vsu_chcoeff1(base: u32, i: u32) -> u32 {
    base + 0x700 + 0x4 * i
}

pub const fn scaler_vsu_cvcoeff(base: u32, i: u32) -> u32 {
    base + 0x800 + 0x4 * i
}

pub const SCALER_VSU_CTRL_EN: u32 = 1 << 0;
pub const SCALER_VSU_CTRL_COEFF_RDY: u32 = 1 << 4;

pub const SCALER_VSU_SCALE_MODE_UI: u32 = 0;
pub const SCALER_VSU_SCALE_MODE_NORMAL: u32 = 1;

// DE2 channel colour-space converters, absolute within the mixer block.

pub const CCSC00_OFFSET: u32 = 0xaa050;
pub const CCSC01_OFFSET: u32 = 0xfa050;
pub const CCSC10_OFFSET: u32 = 0xa0000;
pub const CCSC11_OFFSET: u32 = 0xf0000;

pub const fn csc_ctrl(base: u32) -> u32 {
    base + 0x0
}

pub const fn csc_coeff(base: u32, i: u32) -> u32 {
    base + 0x10 + 4 * i
}

pub const CSC_CTRL_EN: u32 = 1 << 0;
