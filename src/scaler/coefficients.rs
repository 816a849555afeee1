// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Polyphase filter banks for the VI scaler.
//!
//! The scaler interpolates with 32 phases per input sample. Horizontal filters have 8 taps
//! split over two registers, vertical filters 4 taps in one register. Taps are signed 8-bit
//! values packed little end first, and each phase sums to 64.
//!
//! A bank is chosen by the coefficient index of the scaling step (0 for upscaling up to 15
//! groups of increasingly strong downscaling) and the filter kernel. Lanczos is used for luma and
//! RGB, bicubic for the chroma of YUV formats.

use std::f64::consts::PI;

pub const PHASES: usize = 32;

/// Number of coefficient indices the scaler distinguishes.
pub const INDEX_COUNT: usize = 15;

const TAP_SUM: i32 = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kernel {
    /// Lanczos windowed sinc with the given number of lobes.
    Lanczos(u32),
    /// Catmull-Rom cubic.
    Bicubic,
}

impl Kernel {
    fn weight(self, x: f64) -> f64 {
        let x = x.abs();
        match self {
            Kernel::Lanczos(lobes) => {
                let a = f64::from(lobes);
                if x < f64::EPSILON {
                    1.0
                } else if x >= a {
                    0.0
                } else {
                    let px = PI * x;
                    a * px.sin() * (px / a).sin() / (px * px)
                }
            }
            Kernel::Bicubic => {
                if x < 1.0 {
                    1.5 * x * x * x - 2.5 * x * x + 1.0
                } else if x < 2.0 {
                    -0.5 * x * x * x + 2.5 * x * x - 4.0 * x + 2.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Downscale ratio that the filters of coefficient `index` are designed for.
fn index_ratio(index: usize) -> f64 {
    match index {
        0 => 1.0,
        1..=7 => 1.0 + index as f64 / 8.0,
        8..=11 => 2.0 + (index - 8) as f64 / 4.0,
        12 => 3.0,
        13 => 4.0,
        _ => 5.0,
    }
}

/// Quantized taps of one phase. Rounding errors are folded into the largest tap so the sum is
/// exactly [`TAP_SUM`].
fn phase_taps<const N: usize>(kernel: Kernel, cutoff: f64, phase: usize) -> [i8; N] {
    let center = (N / 2 - 1) as f64;
    let offset = phase as f64 / PHASES as f64;

    let mut weights = [0f64; N];
    for (tap, weight) in weights.iter_mut().enumerate() {
        let x = (tap as f64 - center - offset) * cutoff;
        *weight = kernel.weight(x);
    }

    let total: f64 = weights.iter().sum();
    let mut taps = [0i8; N];
    let mut sum = 0i32;
    let mut largest = 0;
    for (tap, weight) in weights.iter().enumerate() {
        let value = (weight * TAP_SUM as f64 / total).round().clamp(-128.0, 127.0) as i32;
        taps[tap] = value as i8;
        sum += value;
        if value > i32::from(taps[largest]) {
            largest = tap;
        }
    }

    taps[largest] = (i32::from(taps[largest]) + TAP_SUM - sum) as i8;
    taps
}

fn pack(taps: &[i8]) -> u32 {
    taps.iter().enumerate().fold(0, |word, (i, tap)| word | (u32::from(*tap as u8) << (8 * i)))
}

/// An 8-tap bank: taps 0-3 and 4-7 of every phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HorizontalBank {
    pub left: [u32; PHASES],
    pub right: [u32; PHASES],
}

/// Builds the 8-tap bank of `kernel` for coefficient `index`.
pub fn horizontal_bank(kernel: Kernel, index: usize) -> HorizontalBank {
    let cutoff = 1.0 / index_ratio(index.min(INDEX_COUNT - 1));
    let mut bank = HorizontalBank { left: [0; PHASES], right: [0; PHASES] };

    for phase in 0..PHASES {
        let taps = phase_taps::<8>(kernel, cutoff, phase);
        bank.left[phase] = pack(&taps[..4]);
        bank.right[phase] = pack(&taps[4..]);
    }

    bank
}

/// Builds the 4-tap bank of `kernel` for coefficient `index`.
pub fn vertical_bank(kernel: Kernel, index: usize) -> [u32; PHASES] {
    let cutoff = 1.0 / index_ratio(index.min(INDEX_COUNT - 1));
    let mut bank = [0; PHASES];

    for (phase, word) in bank.iter_mut().enumerate() {
        *word = pack(&phase_taps::<4>(kernel, cutoff, phase));
    }

    bank
}
