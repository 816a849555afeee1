// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Per-channel colour-space conversion (YCbCr to RGB) ahead of the blender.

use crate::format::ColorEncoding;
use crate::format::ColorRange;
use crate::format::CscMode;
use crate::mixer::Mixer;
use crate::regmap::RegisterMap;
use crate::regmap::RegmapResult;
use crate::regs;

/// DE2 converter blocks, indexed by the mixer's converter set and then the channel.
const CCSC_BASE: [[u32; 2]; 2] = [
    [regs::CCSC00_OFFSET, regs::CCSC01_OFFSET],
    [regs::CCSC10_OFFSET, regs::CCSC11_OFFSET],
];

/// 3x4 matrices, rows R, G, B, columns Y, U, V and offset.
type Matrix = [u32; 12];

/// DE2 coefficients, indexed by range then encoding. 10 fractional bits.
const YUV2RGB: [[Matrix; 2]; 2] = [
    // Limited range.
    [
        // BT.601
        [
            0x000004a8, 0x00000000, 0x00000662, 0xfffc8451, 0x000004a8, 0xfffffe6f, 0xfffffcc0,
            0x00021e4d, 0x000004a8, 0x00000811, 0x00000000, 0xfffbaca9,
        ],
        // BT.709
        [
            0x000004a8, 0x00000000, 0x0000072b, 0xfffc1f99, 0x000004a8, 0xffffff26, 0xfffffddf,
            0x00013383, 0x000004a8, 0x00000873, 0x00000000, 0xfffb7bef,
        ],
    ],
    // Full range.
    [
        // BT.601
        [
            0x00000400, 0x00000000, 0x0000059b, 0xfffd322e, 0x00000400, 0xfffffea0, 0xfffffd25,
            0x00021dd5, 0x00000400, 0x00000716, 0x00000000, 0xfffc74bd,
        ],
        // BT.709
        [
            0x00000400, 0x00000000, 0x0000064c, 0xfffcd9b4, 0x00000400, 0xffffff41, 0xfffffe21,
            0x00014f96, 0x00000400, 0x0000076c, 0x00000000, 0xfffc49ef,
        ],
    ],
];

/// DE3 coefficients, indexed by range then encoding. 18 fractional bits.
const YUV2RGB_DE3: [[Matrix; 2]; 2] = [
    [
        [
            0x0002542a, 0x00000000, 0x0003312a, 0xffc00000, 0x0002542a, 0xffff376b, 0xfffe5fc3,
            0xfe000000, 0x0002542a, 0x000408d2, 0x00000000, 0xfe000000,
        ],
        [
            0x0002542a, 0x00000000, 0x000395e2, 0xffc00000, 0x0002542a, 0xffff92d2, 0xfffeef27,
            0xfe000000, 0x0002542a, 0x0004398c, 0x00000000, 0xfe000000,
        ],
    ],
    [
        [
            0x00020000, 0x00000000, 0x0002cdd2, 0x00000000, 0x00020000, 0xffff4fce, 0xfffe925d,
            0xfe000000, 0x00020000, 0x00038b43, 0x00000000, 0xfe000000,
        ],
        [
            0x00020000, 0x00000000, 0x0003264c, 0x00000000, 0x00020000, 0xffffa018, 0xffff1053,
            0xfe000000, 0x00020000, 0x0003b611, 0x00000000, 0xfe000000,
        ],
    ],
];

fn matrix(table: &[[Matrix; 2]; 2], encoding: ColorEncoding, range: ColorRange) -> &Matrix {
    let range = match range {
        ColorRange::Limited => 0,
        ColorRange::Full => 1,
    };
    let encoding = match encoding {
        ColorEncoding::Bt601 => 0,
        ColorEncoding::Bt709 => 1,
    };

    &table[range][encoding]
}

/// Coefficient slot that entry `i` of a YUV matrix goes to. For YVU input the U and V columns
/// trade places.
fn coefficient_slot(mode: CscMode, i: u32) -> u32 {
    match (mode, i & 3) {
        (CscMode::YvuToRgb, 1) => i + 1,
        (CscMode::YvuToRgb, 2) => i - 1,
        _ => i,
    }
}

fn write_matrix<R: RegisterMap + ?Sized>(
    regs: &mut R,
    mode: CscMode,
    table: &Matrix,
    slot_reg: impl Fn(u32) -> u32,
) -> RegmapResult<()> {
    match mode {
        CscMode::YuvToRgb => regs.bulk_write(slot_reg(0), table),
        CscMode::YvuToRgb => {
            for (i, val) in (0u32..).zip(table.iter()) {
                regs.write(slot_reg(coefficient_slot(mode, i)), *val)?;
            }
            Ok(())
        }
        CscMode::Off => {
            log::warn!("Wrong CSC mode specified");
            Ok(())
        }
    }
}

/// Programs the conversion matrix of `channel` for `encoding` and `range`.
pub fn set_coefficients<R: RegisterMap + ?Sized>(
    regs: &mut R,
    mixer: &Mixer,
    channel: u32,
    mode: CscMode,
    encoding: ColorEncoding,
    range: ColorRange,
) -> RegmapResult<()> {
    log::debug!("CSC channel {} mode {:?} {:?} {:?}", channel, mode, encoding, range);

    if mixer.config().is_de3 {
        let table = matrix(&YUV2RGB_DE3, encoding, range);
        let base = regs::DE3_BLD_BASE;
        return write_matrix(regs, mode, table, |i| regs::blend_csc_coeff(base, channel, i));
    }

    let base = CCSC_BASE[mixer.config().ccsc][channel as usize];
    let table = matrix(&YUV2RGB, encoding, range);
    write_matrix(regs, mode, table, |i| regs::csc_coeff(base, i))
}

pub fn enable<R: RegisterMap + ?Sized>(
    regs: &mut R,
    mixer: &Mixer,
    channel: u32,
    enable: bool,
) -> RegmapResult<()> {
    if mixer.config().is_de3 {
        let mask = regs::blend_csc_ctl_en(channel);
        let val = if enable { mask } else { 0 };
        return regs.update_bits(regs::blend_csc_ctl(regs::DE3_BLD_BASE), mask, val);
    }

    let base = CCSC_BASE[mixer.config().ccsc][channel as usize];
    let val = if enable { regs::CSC_CTRL_EN } else { 0 };
    regs.update_bits(regs::csc_ctrl(base), regs::CSC_CTRL_EN, val)
}
