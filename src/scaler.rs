// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The VI channel scaler ("VSU"): a polyphase scaler with separate luma and chroma paths.
//!
//! Steps and phases are programmed with 20 fractional bits, four more than the 16.16 values the
//! rest of the crate works with.

pub mod coefficients;

use crate::format::FormatInfo;
use crate::mixer::Mixer;
use crate::regmap::RegisterMap;
use crate::regmap::RegmapResult;
use crate::regs;
use crate::FRAC_BITS;

use self::coefficients::Kernel;
use self::coefficients::PHASES;

/// Fractional bits of the scaler's step and phase registers.
pub const SCALE_FRAC: u32 = 20;
pub const PHASE_FRAC: u32 = 20;

/// Parameters of one scaler programming pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScalerParams {
    pub src_w: u32,
    pub src_h: u32,
    pub dst_w: u32,
    pub dst_h: u32,
    /// 16.16 horizontal step.
    pub hscale: u32,
    /// 16.16 vertical step.
    pub vscale: u32,
    /// 16.16 horizontal phase.
    pub hphase: u32,
    /// 16.16 vertical phase.
    pub vphase: u32,
}

/// Register base of the scaler unit of `channel`.
pub fn scaler_base(mixer: &Mixer, channel: u32) -> u32 {
    if mixer.config().is_de3 {
        regs::DE3_VI_SCALER_UNIT_BASE + regs::DE3_VI_SCALER_UNIT_SIZE * channel
    } else {
        regs::DE2_VI_SCALER_UNIT_BASE + regs::DE2_VI_SCALER_UNIT_SIZE * channel
    }
}

/// Maps a 20-bit fractional step onto the index of the filter bank designed for it.
pub fn coef_index(step: u32) -> usize {
    let scale = step >> (SCALE_FRAC - 3);
    let int_part = scale >> 3;
    let frac_part = (scale & 0x7) as usize;

    match int_part {
        0 => 0,
        1 => frac_part,
        2 => 8 + (frac_part >> 1),
        3 => 12,
        4 => 13,
        _ => 14,
    }
}

fn set_coefficients<R: RegisterMap + ?Sized>(
    regs: &mut R,
    base: u32,
    hstep: u32,
    vstep: u32,
    format: &FormatInfo,
) -> RegmapResult<()> {
    let (chroma_h, chroma_v) = if format.is_yuv {
        (Kernel::Bicubic, Kernel::Bicubic)
    } else {
        (Kernel::Lanczos(3), Kernel::Lanczos(2))
    };

    let hindex = coef_index(hstep);
    let luma = coefficients::horizontal_bank(Kernel::Lanczos(3), hindex);
    let chroma = coefficients::horizontal_bank(chroma_h, hindex);

    for i in 0..PHASES {
        let reg = i as u32;
        regs.write(regs::scaler_vsu_yhcoeff0(base, reg), luma.left[i])?;
        regs.write(regs::scaler_vsu_yhcoeff1(base, reg), luma.right[i])?;
        regs.write(regs::scaler_vsu_chcoeff0(base, reg), chroma.left[i])?;
        regs.write(regs::scaler_vsu_chcoeff1(base, reg), chroma.right[i])?;
    }

    let vindex = coef_index(vstep);
    let luma = coefficients::vertical_bank(Kernel::Lanczos(2), vindex);
    let chroma = coefficients::vertical_bank(chroma_v, vindex);

    for i in 0..PHASES {
        let reg = i as u32;
        regs.write(regs::scaler_vsu_yvcoeff(base, reg), luma[i])?;
        regs.write(regs::scaler_vsu_cvcoeff(base, reg), chroma[i])?;
    }

    Ok(())
}

/// Turns the scaler of `channel` on or off. Turning it on also latches the coefficients.
pub fn enable<R: RegisterMap + ?Sized>(
    regs: &mut R,
    mixer: &Mixer,
    channel: u32,
    enable: bool,
) -> RegmapResult<()> {
    let base = scaler_base(mixer, channel);
    let val = if enable {
        regs::SCALER_VSU_CTRL_EN | regs::SCALER_VSU_CTRL_COEFF_RDY
    } else {
        0
    };

    regs.write(regs::scaler_vsu_ctrl(base), val)
}

/// Programs sizes, steps, phases and filters of the scaler of `channel`.
pub fn setup<R: RegisterMap + ?Sized>(
    regs: &mut R,
    mixer: &Mixer,
    channel: u32,
    params: &ScalerParams,
    format: &FormatInfo,
) -> RegmapResult<()> {
    let base = scaler_base(mixer, channel);

    let hscale = params.hscale << (SCALE_FRAC - FRAC_BITS);
    let vscale = params.vscale << (SCALE_FRAC - FRAC_BITS);
    let hphase = params.hphase << (PHASE_FRAC - FRAC_BITS);
    let vphase = params.vphase << (PHASE_FRAC - FRAC_BITS);

    // Chroma samples of 4:2:0 sit between two luma lines.
    let (chphase, cvphase) = if format.hsub == 2 && format.vsub == 2 {
        (hphase >> 1, (vphase >> 1).wrapping_sub(1 << (PHASE_FRAC - 2)))
    } else {
        (hphase, vphase)
    };

    let cw = params.src_w / format.hsub;
    let ch = params.src_h / format.vsub;

    log::debug!(
        "Scaler {}: {}x{} -> {}x{}, step {:#x}/{:#x}, phase {:#x}/{:#x}",
        channel,
        params.src_w,
        params.src_h,
        params.dst_w,
        params.dst_h,
        hscale,
        vscale,
        hphase,
        vphase
    );

    if mixer.config().is_de3 {
        let mode = if format.is_yuv {
            regs::SCALER_VSU_SCALE_MODE_NORMAL
        } else {
            regs::SCALER_VSU_SCALE_MODE_UI
        };
        regs.write(regs::scaler_vsu_scale_mode(base), mode)?;
    }

    regs.write(regs::scaler_vsu_outsize(base), regs::size(params.dst_w, params.dst_h))?;
    regs.write(regs::scaler_vsu_yinsize(base), regs::size(params.src_w, params.src_h))?;
    regs.write(regs::scaler_vsu_yhstep(base), hscale)?;
    regs.write(regs::scaler_vsu_yvstep(base), vscale)?;
    regs.write(regs::scaler_vsu_yhphase(base), hphase)?;
    regs.write(regs::scaler_vsu_yvphase(base), vphase)?;
    regs.write(regs::scaler_vsu_cinsize(base), regs::size(cw, ch))?;
    regs.write(regs::scaler_vsu_chstep(base), hscale / format.hsub)?;
    regs.write(regs::scaler_vsu_cvstep(base), vscale / format.vsub)?;
    regs.write(regs::scaler_vsu_chphase(base), chphase)?;
    regs.write(regs::scaler_vsu_cvphase(base), cvphase)?;

    set_coefficients(regs, base, hscale, vscale, format)
}

#[cfg(test)]
mod tests {
    use drm_fourcc::DrmFourcc;

    use super::*;
    use crate::mixer::MixerConfig;
    use crate::regmap::memory::MemoryRegisterMap;

    #[test]
    fn test_coef_index() {
        assert_eq!(coef_index(1 << 19), 0);
        assert_eq!(coef_index(1 << 20), 0);
        assert_eq!(coef_index((1 << 20) + (3 << 17)), 3);
        assert_eq!(coef_index(2 << 20), 8);
        assert_eq!(coef_index((2 << 20) + (5 << 17)), 10);
        assert_eq!(coef_index(3 << 20), 12);
        assert_eq!(coef_index(4 << 20), 13);
        assert_eq!(coef_index(9 << 20), 14);
    }

    #[test]
    fn test_scaler_base() {
        let de2 = Mixer::new(MixerConfig::v3s_mixer()).unwrap();
        assert_eq!(scaler_base(&de2, 1), 0x40000);

        let de3 = Mixer::new(MixerConfig::h6_mixer0()).unwrap();
        assert_eq!(scaler_base(&de3, 1), 0x28000);
    }

    #[test]
    fn test_setup_nv12() {
        let mixer = Mixer::new(MixerConfig::h3_mixer0()).unwrap();
        let format = FormatInfo::lookup(DrmFourcc::Nv12).unwrap();
        let mut regs = MemoryRegisterMap::new();
        let params = ScalerParams {
            src_w: 66,
            src_h: 66,
            dst_w: 32,
            dst_h: 32,
            hscale: (66 << 16) / 32,
            vscale: (66 << 16) / 32,
            hphase: 1 << 16,
            vphase: 1 << 16,
        };

        setup(&mut regs, &mixer, 0, &params, format).unwrap();

        let base = scaler_base(&mixer, 0);
        let step = ((66 << 16) / 32) << 4;
        assert_eq!(regs.peek(regs::scaler_vsu_outsize(base)), regs::size(32, 32));
        assert_eq!(regs.peek(regs::scaler_vsu_yinsize(base)), regs::size(66, 66));
        assert_eq!(regs.peek(regs::scaler_vsu_yhstep(base)), step);
        assert_eq!(regs.peek(regs::scaler_vsu_yvstep(base)), step);
        assert_eq!(regs.peek(regs::scaler_vsu_yhphase(base)), 1 << 20);
        assert_eq!(regs.peek(regs::scaler_vsu_cinsize(base)), regs::size(33, 33));
        assert_eq!(regs.peek(regs::scaler_vsu_chstep(base)), step / 2);
        assert_eq!(regs.peek(regs::scaler_vsu_chphase(base)), 1 << 19);
        assert_eq!(regs.peek(regs::scaler_vsu_cvphase(base)), 1 << 18);

        let bank = coefficients::horizontal_bank(Kernel::Lanczos(3), coef_index(step));
        assert_eq!(regs.peek(regs::scaler_vsu_yhcoeff0(base, 5)), bank.left[5]);
        assert_eq!(regs.peek(regs::scaler_vsu_yhcoeff1(base, 31)), bank.right[31]);

        // DE2 has no scale mode register.
        assert!(regs.writes_to(regs::scaler_vsu_scale_mode(base)).is_empty());
    }

    #[test]
    fn test_setup_de3_scale_mode() {
        let mixer = Mixer::new(MixerConfig::h6_mixer0()).unwrap();
        let base = scaler_base(&mixer, 0);
        let params = ScalerParams {
            src_w: 100,
            src_h: 100,
            dst_w: 200,
            dst_h: 200,
            hscale: 1 << 15,
            vscale: 1 << 15,
            ..Default::default()
        };

        let mut regs = MemoryRegisterMap::new();
        let rgb = FormatInfo::lookup(DrmFourcc::Xrgb8888).unwrap();
        setup(&mut regs, &mixer, 0, &params, rgb).unwrap();
        assert_eq!(
            regs.writes_to(regs::scaler_vsu_scale_mode(base)),
            vec![regs::SCALER_VSU_SCALE_MODE_UI]
        );
        // Non-subsampled formats keep chroma phase and size equal to luma.
        assert_eq!(regs.peek(regs::scaler_vsu_cinsize(base)), regs::size(100, 100));

        let mut regs = MemoryRegisterMap::new();
        let yuyv = FormatInfo::lookup(DrmFourcc::Yuyv).unwrap();
        setup(&mut regs, &mixer, 0, &params, yuyv).unwrap();
        let mode = regs.peek(regs::scaler_vsu_scale_mode(base));
        assert_eq!(mode, regs::SCALER_VSU_SCALE_MODE_NORMAL);
        assert_eq!(regs.peek(regs::scaler_vsu_cinsize(base)), regs::size(50, 100));
    }

    #[test]
    fn test_setup_planar_444_uses_yuv_filters() {
        let mixer = Mixer::new(MixerConfig::h6_mixer0()).unwrap();
        let base = scaler_base(&mixer, 0);
        let format = FormatInfo::lookup(DrmFourcc::Yuv444).unwrap();
        let params = ScalerParams {
            src_w: 100,
            src_h: 100,
            dst_w: 200,
            dst_h: 200,
            hscale: 1 << 15,
            vscale: 1 << 15,
            ..Default::default()
        };

        let mut regs = MemoryRegisterMap::new();
        setup(&mut regs, &mixer, 0, &params, format).unwrap();

        let mode = regs.peek(regs::scaler_vsu_scale_mode(base));
        assert_eq!(mode, regs::SCALER_VSU_SCALE_MODE_NORMAL);
        assert_eq!(regs.peek(regs::scaler_vsu_cinsize(base)), regs::size(100, 100));

        let index = coef_index(1 << 19);
        let chroma_h = coefficients::horizontal_bank(Kernel::Bicubic, index);
        let chroma_v = coefficients::vertical_bank(Kernel::Bicubic, index);
        let luma_v = coefficients::vertical_bank(Kernel::Lanczos(2), index);
        for phase in [1, 16, 31] {
            let reg = phase as u32;
            assert_eq!(regs.peek(regs::scaler_vsu_chcoeff0(base, reg)), chroma_h.left[phase]);
            assert_eq!(regs.peek(regs::scaler_vsu_cvcoeff(base, reg)), chroma_v[phase]);
            assert_eq!(regs.peek(regs::scaler_vsu_yvcoeff(base, reg)), luma_v[phase]);
        }
    }

    #[test]
    fn test_enable() {
        let mixer = Mixer::new(MixerConfig::h3_mixer0()).unwrap();
        let ctrl = regs::scaler_vsu_ctrl(scaler_base(&mixer, 0));
        let mut regs = MemoryRegisterMap::new();

        enable(&mut regs, &mixer, 0, true).unwrap();
        assert_eq!(regs.peek(ctrl), 0x11);

        enable(&mut regs, &mixer, 0, false).unwrap();
        assert_eq!(regs.peek(ctrl), 0);
    }
}
