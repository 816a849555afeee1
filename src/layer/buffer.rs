// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Format and framebuffer fetch programming of a VI channel.

use crate::csc;
use crate::format::ColorEncoding;
use crate::format::ColorRange;
use crate::format::CscMode;
use crate::format::De2Format;
use crate::mixer::Mixer;
use crate::rect::Rect;
use crate::regmap::RegisterMap;
use crate::regmap::RegmapResult;
use crate::regs;
use crate::state::Framebuffer;
use crate::FRAC_BITS;

/// Fetch parameters of one memory plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlaneAddress {
    pub pitch: u32,
    /// Bus address of the first displayed pixel.
    pub addr: u64,
}

impl PlaneAddress {
    /// The part of the address the hardware can take. Buffers above 4 GiB are not reachable.
    pub fn low_addr(&self) -> u32 {
        self.addr as u32
    }
}

/// Computes where fetching starts in every plane of `fb` for the 16.16 source rectangle `src`.
/// The origin is aligned down to the subsampling factors like the scaler input.
pub fn plane_addresses(fb: &Framebuffer, src: &Rect) -> Vec<PlaneAddress> {
    let format = fb.format;
    let src_x = ((src.x1 >> FRAC_BITS).max(0) as u32) & !(format.hsub - 1);
    let src_y = ((src.y1 >> FRAC_BITS).max(0) as u32) & !(format.vsub - 1);

    fb.planes
        .iter()
        .take(format.num_planes)
        .enumerate()
        .map(|(i, plane)| {
            let (dx, dy) = if i > 0 {
                (src_x / format.hsub, src_y / format.vsub)
            } else {
                (src_x, src_y)
            };

            let addr = plane.dma_addr
                + u64::from(plane.offset)
                + u64::from(dx) * u64::from(format.cpp[i])
                + u64::from(dy) * u64::from(plane.pitch);

            PlaneAddress { pitch: plane.pitch, addr }
        })
        .collect()
}

/// Programs the fetch format, colour-space conversion and alpha mode of a layer.
pub fn program_formats<R: RegisterMap + ?Sized>(
    regs: &mut R,
    mixer: &Mixer,
    channel: u32,
    overlay: u32,
    fmt: &De2Format,
    encoding: ColorEncoding,
    range: ColorRange,
) -> RegmapResult<()> {
    let attr = regs::chan_vi_layer_attr(mixer.channel_base(channel), overlay);

    let val = fmt.hw_format << regs::CHAN_VI_LAYER_ATTR_FBFMT_OFFSET;
    regs.update_bits(attr, regs::CHAN_VI_LAYER_ATTR_FBFMT_MASK, val)?;

    if fmt.csc != CscMode::Off {
        csc::set_coefficients(regs, mixer, channel, fmt.csc, encoding, range)?;
        csc::enable(regs, mixer, channel, true)?;
    } else {
        csc::enable(regs, mixer, channel, false)?;
    }

    let val = if fmt.rgb { regs::CHAN_VI_LAYER_ATTR_RGB_MODE } else { 0 };
    regs.update_bits(attr, regs::CHAN_VI_LAYER_ATTR_RGB_MODE, val)?;

    // YUV formats take the global alpha.
    if mixer.config().is_de3 {
        regs.update_bits(
            attr,
            regs::CHAN_VI_LAYER_ATTR_ALPHA_MASK,
            regs::chan_vi_layer_attr_alpha(0xff),
        )?;
    }

    Ok(())
}

/// Programs pitch and start address of every plane of `fb`.
pub fn program_buffer<R: RegisterMap + ?Sized>(
    regs: &mut R,
    mixer: &Mixer,
    channel: u32,
    overlay: u32,
    fb: &Framebuffer,
    src: &Rect,
) -> RegmapResult<()> {
    let ch_base = mixer.channel_base(channel);

    for (i, plane) in (0u32..).zip(plane_addresses(fb, src)) {
        log::debug!("Layer {}. line width: {} bytes", i + 1, plane.pitch);
        regs.write(regs::chan_vi_layer_pitch(ch_base, overlay, i), plane.pitch)?;

        log::debug!("Setting {}. buffer address to {:#x}", i + 1, plane.addr);
        regs.write(regs::chan_vi_layer_top_laddr(ch_base, overlay, i), plane.low_addr())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use drm_fourcc::DrmFourcc;

    use super::*;
    use crate::format::FormatInfo;
    use crate::mixer::MixerConfig;
    use crate::regmap::memory::MemoryRegisterMap;
    use crate::state::FramebufferPlane;

    fn nv12_fb() -> Framebuffer {
        Framebuffer {
            format: FormatInfo::lookup(DrmFourcc::Nv12).unwrap(),
            planes: vec![
                FramebufferPlane { dma_addr: 0x4000_0000, offset: 0, pitch: 1920 },
                FramebufferPlane { dma_addr: 0x4000_0000, offset: 1920 * 1080, pitch: 1920 },
            ],
        }
    }

    #[test]
    fn test_nv12_addresses() {
        let addrs = plane_addresses(&nv12_fb(), &Rect::fixed(3, 1, 64, 64));

        assert_eq!(addrs.len(), 2);
        // Luma from (2, 0).
        assert_eq!(addrs[0], PlaneAddress { pitch: 1920, addr: 0x4000_0000 + 2 });
        // Chroma from (1, 0) at two bytes per sample.
        assert_eq!(addrs[1].addr, 0x4000_0000 + 1920 * 1080 + 2);

        let addrs = plane_addresses(&nv12_fb(), &Rect::fixed(100, 51, 64, 64));
        assert_eq!(addrs[0].addr, 0x4000_0000 + 100 + 50 * 1920);
        assert_eq!(addrs[1].addr, 0x4000_0000 + 1920 * 1080 + 50 * 2 + 25 * 1920);
    }

    #[test]
    fn test_high_address_is_truncated() {
        let fb = Framebuffer {
            format: FormatInfo::lookup(DrmFourcc::Xrgb8888).unwrap(),
            planes: vec![FramebufferPlane { dma_addr: 0x1_0000_1000, offset: 0x10, pitch: 4096 }],
        };
        let addrs = plane_addresses(&fb, &Rect::fixed(1, 1, 10, 10));

        assert_eq!(addrs[0].addr, 0x1_0000_1000 + 0x10 + 4 + 4096);
        assert_eq!(addrs[0].low_addr(), 0x1000 + 0x10 + 4 + 4096);
    }

    #[test]
    fn test_program_buffer() {
        let mixer = Mixer::new(MixerConfig::v3s_mixer()).unwrap();
        let mut regs = MemoryRegisterMap::new();

        program_buffer(&mut regs, &mixer, 1, 0, &nv12_fb(), &Rect::fixed(0, 0, 64, 64)).unwrap();

        let ch_base = mixer.channel_base(1);
        assert_eq!(regs.peek(regs::chan_vi_layer_pitch(ch_base, 0, 0)), 1920);
        assert_eq!(regs.peek(regs::chan_vi_layer_top_laddr(ch_base, 0, 0)), 0x4000_0000);
        assert_eq!(
            regs.peek(regs::chan_vi_layer_top_laddr(ch_base, 0, 1)),
            0x4000_0000 + 1920 * 1080
        );
        assert!(regs.writes_to(regs::chan_vi_layer_top_laddr(ch_base, 0, 2)).is_empty());
    }

    #[test]
    fn test_program_formats_yuv() {
        let mixer = Mixer::new(MixerConfig::h3_mixer0()).unwrap();
        let mut regs = MemoryRegisterMap::new();
        let attr = regs::chan_vi_layer_attr(mixer.channel_base(0), 0);
        regs.poke(attr, regs::CHAN_VI_LAYER_ATTR_EN | regs::CHAN_VI_LAYER_ATTR_RGB_MODE);

        let fmt = De2Format::lookup(DrmFourcc::Nv12).unwrap();
        program_formats(&mut regs, &mixer, 0, 0, fmt, ColorEncoding::Bt709, ColorRange::Limited)
            .unwrap();

        assert_eq!(
            regs.peek(attr),
            regs::CHAN_VI_LAYER_ATTR_EN | (crate::format::fbfmt::NV12 << 8)
        );
        assert_eq!(regs.peek(regs::csc_ctrl(regs::CCSC00_OFFSET)), regs::CSC_CTRL_EN);
        assert_ne!(regs.peek(regs::csc_coeff(regs::CCSC00_OFFSET, 0)), 0);
    }

    #[test]
    fn test_program_formats_rgb_de3() {
        let mixer = Mixer::new(MixerConfig::h6_mixer0()).unwrap();
        let mut regs = MemoryRegisterMap::new();
        let attr = regs::chan_vi_layer_attr(mixer.channel_base(0), 0);

        let fmt = De2Format::lookup(DrmFourcc::Rgb565).unwrap();
        program_formats(&mut regs, &mixer, 0, 0, fmt, ColorEncoding::Bt601, ColorRange::Full)
            .unwrap();

        assert_eq!(
            regs.peek(attr),
            (0xff << 24) | regs::CHAN_VI_LAYER_ATTR_RGB_MODE | (crate::format::fbfmt::RGB565 << 8)
        );
        assert_eq!(regs.peek(regs::blend_csc_ctl(regs::DE3_BLD_BASE)), 0);
    }
}
