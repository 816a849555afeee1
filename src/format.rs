// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Pixel format descriptors and the mixer's format capability table.

use drm_fourcc::DrmFourcc;
use enumn::N;

/// Memory layout of a pixel format: how many planes, bytes per pixel of each plane and the
/// chroma subsampling factors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FormatInfo {
    pub fourcc: DrmFourcc,
    pub num_planes: usize,
    /// Bytes per pixel, per plane.
    pub cpp: [u32; 3],
    /// Horizontal chroma subsampling factor.
    pub hsub: u32,
    /// Vertical chroma subsampling factor.
    pub vsub: u32,
    pub is_yuv: bool,
}

impl FormatInfo {
    const fn rgb(fourcc: DrmFourcc, cpp: u32) -> Self {
        Self { fourcc, num_planes: 1, cpp: [cpp, 0, 0], hsub: 1, vsub: 1, is_yuv: false }
    }

    const fn packed_yuv(fourcc: DrmFourcc) -> Self {
        Self { fourcc, num_planes: 1, cpp: [2, 0, 0], hsub: 2, vsub: 1, is_yuv: true }
    }

    const fn semiplanar(fourcc: DrmFourcc, hsub: u32, vsub: u32) -> Self {
        Self { fourcc, num_planes: 2, cpp: [1, 2, 0], hsub, vsub, is_yuv: true }
    }

    const fn planar(fourcc: DrmFourcc, hsub: u32, vsub: u32) -> Self {
        Self { fourcc, num_planes: 3, cpp: [1, 1, 1], hsub, vsub, is_yuv: true }
    }

    /// Whether chroma is stored at a lower resolution than luma in either direction.
    pub fn is_subsampled(&self) -> bool {
        self.hsub > 1 || self.vsub > 1
    }

    /// Looks up the layout of `fourcc`.
    pub fn lookup(fourcc: DrmFourcc) -> Option<&'static FormatInfo> {
        FORMAT_INFOS.iter().find(|info| info.fourcc == fourcc)
    }
}

static FORMAT_INFOS: &[FormatInfo] = &[
    FormatInfo::rgb(DrmFourcc::Argb8888, 4),
    FormatInfo::rgb(DrmFourcc::Abgr8888, 4),
    FormatInfo::rgb(DrmFourcc::Rgba8888, 4),
    FormatInfo::rgb(DrmFourcc::Bgra8888, 4),
    FormatInfo::rgb(DrmFourcc::Xrgb8888, 4),
    FormatInfo::rgb(DrmFourcc::Xbgr8888, 4),
    FormatInfo::rgb(DrmFourcc::Rgbx8888, 4),
    FormatInfo::rgb(DrmFourcc::Bgrx8888, 4),
    FormatInfo::rgb(DrmFourcc::Rgb888, 3),
    FormatInfo::rgb(DrmFourcc::Bgr888, 3),
    FormatInfo::rgb(DrmFourcc::Rgb565, 2),
    FormatInfo::rgb(DrmFourcc::Bgr565, 2),
    FormatInfo::rgb(DrmFourcc::Argb4444, 2),
    FormatInfo::rgb(DrmFourcc::Abgr4444, 2),
    FormatInfo::rgb(DrmFourcc::Rgba4444, 2),
    FormatInfo::rgb(DrmFourcc::Bgra4444, 2),
    FormatInfo::rgb(DrmFourcc::Argb1555, 2),
    FormatInfo::rgb(DrmFourcc::Abgr1555, 2),
    FormatInfo::rgb(DrmFourcc::Rgba5551, 2),
    FormatInfo::rgb(DrmFourcc::Bgra5551, 2),
    FormatInfo::packed_yuv(DrmFourcc::Yuyv),
    FormatInfo::packed_yuv(DrmFourcc::Uyvy),
    FormatInfo::packed_yuv(DrmFourcc::Yvyu),
    FormatInfo::packed_yuv(DrmFourcc::Vyuy),
    FormatInfo::semiplanar(DrmFourcc::Nv12, 2, 2),
    FormatInfo::semiplanar(DrmFourcc::Nv21, 2, 2),
    FormatInfo::semiplanar(DrmFourcc::Nv16, 2, 1),
    FormatInfo::semiplanar(DrmFourcc::Nv61, 2, 1),
    FormatInfo::semiplanar(DrmFourcc::Nv24, 1, 1),
    FormatInfo::semiplanar(DrmFourcc::Nv42, 1, 1),
    FormatInfo::planar(DrmFourcc::Yuv411, 4, 1),
    FormatInfo::planar(DrmFourcc::Yvu411, 4, 1),
    FormatInfo::planar(DrmFourcc::Yuv420, 2, 2),
    FormatInfo::planar(DrmFourcc::Yvu420, 2, 2),
    FormatInfo::planar(DrmFourcc::Yuv422, 2, 1),
    FormatInfo::planar(DrmFourcc::Yvu422, 2, 1),
    FormatInfo::planar(DrmFourcc::Yuv444, 1, 1),
    FormatInfo::planar(DrmFourcc::Yvu444, 1, 1),
];

/// YCbCr to RGB conversion standard.
#[derive(N, Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ColorEncoding {
    Bt601 = 0,
    #[default]
    Bt709 = 1,
}

impl ColorEncoding {
    /// Bit of this encoding in a property's supported-values mask.
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Quantization range of YCbCr samples.
#[derive(N, Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ColorRange {
    #[default]
    Limited = 0,
    Full = 1,
}

impl ColorRange {
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Channel colour-space conversion needed before blending.
#[derive(N, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CscMode {
    Off = 0,
    YuvToRgb = 1,
    /// Like `YuvToRgb` but with U and V swapped.
    YvuToRgb = 2,
}

/// Hardware framebuffer format code (`LAYER_ATTR.FBFMT`).
pub mod fbfmt {
    pub const ARGB8888: u32 = 0;
    pub const ABGR8888: u32 = 1;
    pub const RGBA8888: u32 = 2;
    pub const BGRA8888: u32 = 3;
    pub const XRGB8888: u32 = 4;
    pub const XBGR8888: u32 = 5;
    pub const RGBX8888: u32 = 6;
    pub const BGRX8888: u32 = 7;
    pub const RGB888: u32 = 8;
    pub const BGR888: u32 = 9;
    pub const RGB565: u32 = 10;
    pub const BGR565: u32 = 11;
    pub const ARGB4444: u32 = 12;
    pub const ABGR4444: u32 = 13;
    pub const RGBA4444: u32 = 14;
    pub const BGRA4444: u32 = 15;
    pub const ARGB1555: u32 = 16;
    pub const ABGR1555: u32 = 17;
    pub const RGBA5551: u32 = 18;
    pub const BGRA5551: u32 = 19;

    pub const YUYV: u32 = 0;
    pub const UYVY: u32 = 1;
    pub const YVYU: u32 = 2;
    pub const VYUY: u32 = 3;
    pub const NV16: u32 = 4;
    pub const NV61: u32 = 5;
    pub const YUV422: u32 = 6;
    // 7 doesn't exist.
    pub const NV12: u32 = 8;
    pub const NV21: u32 = 9;
    pub const YUV420: u32 = 10;
    // 11 doesn't exist, 12 and 13 are semi-planar 4:1:1.
    pub const YUV411: u32 = 14;
}

/// How the mixer fetches and converts one pixel format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct De2Format {
    pub fourcc: DrmFourcc,
    /// Value of the layer attribute's format field.
    pub hw_format: u32,
    /// Whether the layer runs in RGB mode. Planar 4:4:4 is fetched as RGB888 and converted.
    pub rgb: bool,
    pub csc: CscMode,
}

impl De2Format {
    const fn new(fourcc: DrmFourcc, hw_format: u32, rgb: bool, csc: CscMode) -> Self {
        Self { fourcc, hw_format, rgb, csc }
    }

    /// Looks up the hardware description of `fourcc`, if the mixer can fetch it at all.
    pub fn lookup(fourcc: DrmFourcc) -> Option<&'static De2Format> {
        DE2_FORMATS.iter().find(|fmt| fmt.fourcc == fourcc)
    }
}

static DE2_FORMATS: &[De2Format] = &[
    De2Format::new(DrmFourcc::Argb8888, fbfmt::ARGB8888, true, CscMode::Off),
    De2Format::new(DrmFourcc::Abgr8888, fbfmt::ABGR8888, true, CscMode::Off),
    De2Format::new(DrmFourcc::Rgba8888, fbfmt::RGBA8888, true, CscMode::Off),
    De2Format::new(DrmFourcc::Bgra8888, fbfmt::BGRA8888, true, CscMode::Off),
    De2Format::new(DrmFourcc::Xrgb8888, fbfmt::XRGB8888, true, CscMode::Off),
    De2Format::new(DrmFourcc::Xbgr8888, fbfmt::XBGR8888, true, CscMode::Off),
    De2Format::new(DrmFourcc::Rgbx8888, fbfmt::RGBX8888, true, CscMode::Off),
    De2Format::new(DrmFourcc::Bgrx8888, fbfmt::BGRX8888, true, CscMode::Off),
    De2Format::new(DrmFourcc::Rgb888, fbfmt::RGB888, true, CscMode::Off),
    De2Format::new(DrmFourcc::Bgr888, fbfmt::BGR888, true, CscMode::Off),
    De2Format::new(DrmFourcc::Rgb565, fbfmt::RGB565, true, CscMode::Off),
    De2Format::new(DrmFourcc::Bgr565, fbfmt::BGR565, true, CscMode::Off),
    De2Format::new(DrmFourcc::Argb4444, fbfmt::ARGB4444, true, CscMode::Off),
    De2Format::new(DrmFourcc::Abgr4444, fbfmt::ABGR4444, true, CscMode::Off),
    De2Format::new(DrmFourcc::Rgba4444, fbfmt::RGBA4444, true, CscMode::Off),
    De2Format::new(DrmFourcc::Bgra4444, fbfmt::BGRA4444, true, CscMode::Off),
    De2Format::new(DrmFourcc::Argb1555, fbfmt::ARGB1555, true, CscMode::Off),
    De2Format::new(DrmFourcc::Abgr1555, fbfmt::ABGR1555, true, CscMode::Off),
    De2Format::new(DrmFourcc::Rgba5551, fbfmt::RGBA5551, true, CscMode::Off),
    De2Format::new(DrmFourcc::Bgra5551, fbfmt::BGRA5551, true, CscMode::Off),
    De2Format::new(DrmFourcc::Yuyv, fbfmt::YUYV, false, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Uyvy, fbfmt::UYVY, false, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Yvyu, fbfmt::YVYU, false, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Vyuy, fbfmt::VYUY, false, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Nv16, fbfmt::NV16, false, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Nv61, fbfmt::NV61, false, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Nv12, fbfmt::NV12, false, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Nv21, fbfmt::NV21, false, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Yuv444, fbfmt::RGB888, true, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Yuv422, fbfmt::YUV422, false, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Yuv420, fbfmt::YUV420, false, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Yuv411, fbfmt::YUV411, false, CscMode::YuvToRgb),
    De2Format::new(DrmFourcc::Yvu444, fbfmt::RGB888, true, CscMode::YvuToRgb),
    De2Format::new(DrmFourcc::Yvu422, fbfmt::YUV422, false, CscMode::YvuToRgb),
    De2Format::new(DrmFourcc::Yvu420, fbfmt::YUV420, false, CscMode::YvuToRgb),
    De2Format::new(DrmFourcc::Yvu411, fbfmt::YUV411, false, CscMode::YvuToRgb),
];

/// Formats offered by VI layers. VI layers don't blend per-pixel alpha, so alpha formats are
/// only listed where no opaque variant exists.
pub static VI_LAYER_FORMATS: &[DrmFourcc] = &[
    DrmFourcc::Abgr1555,
    DrmFourcc::Abgr4444,
    DrmFourcc::Argb1555,
    DrmFourcc::Argb4444,
    DrmFourcc::Bgr565,
    DrmFourcc::Bgr888,
    DrmFourcc::Bgra5551,
    DrmFourcc::Bgra4444,
    DrmFourcc::Bgrx8888,
    DrmFourcc::Rgb565,
    DrmFourcc::Rgb888,
    DrmFourcc::Rgba4444,
    DrmFourcc::Rgba5551,
    DrmFourcc::Rgbx8888,
    DrmFourcc::Xbgr8888,
    DrmFourcc::Xrgb8888,
    DrmFourcc::Nv16,
    DrmFourcc::Nv12,
    DrmFourcc::Nv21,
    DrmFourcc::Nv61,
    DrmFourcc::Uyvy,
    DrmFourcc::Vyuy,
    DrmFourcc::Yuyv,
    DrmFourcc::Yvyu,
    DrmFourcc::Yuv411,
    DrmFourcc::Yuv420,
    DrmFourcc::Yuv422,
    DrmFourcc::Yuv444,
    DrmFourcc::Yvu411,
    DrmFourcc::Yvu420,
    DrmFourcc::Yvu422,
    DrmFourcc::Yvu444,
];
