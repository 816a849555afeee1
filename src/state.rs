// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Composition state handed over by the plane framework for every update.

use crate::format::ColorEncoding;
use crate::format::ColorRange;
use crate::format::FormatInfo;
use crate::rect::Rect;

/// Output timing of the CRTC a layer is shown on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputTiming {
    /// Pixel clock in kHz.
    pub clock_khz: u32,
    pub hdisplay: u32,
    pub htotal: u32,
    pub vdisplay: u32,
    pub vtotal: u32,
}

impl OutputTiming {
    /// Frames per second, or `None` if the timing is degenerate.
    pub fn refresh_rate(&self) -> Option<u32> {
        let pixels = u64::from(self.htotal) * u64::from(self.vtotal);
        if pixels == 0 {
            return None;
        }

        match u64::from(self.clock_khz) * 1000 / pixels {
            0 => None,
            fps => u32::try_from(fps).ok(),
        }
    }

    /// The active area, as a clip rectangle for destination rectangles.
    pub fn active_area(&self) -> Rect {
        Rect::new(0, 0, self.hdisplay as i32, self.vdisplay as i32)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CrtcState {
    pub enabled: bool,
    pub timing: OutputTiming,
}

/// One memory plane of a framebuffer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FramebufferPlane {
    /// Bus address of the backing buffer.
    pub dma_addr: u64,
    /// Byte offset of the plane within the buffer.
    pub offset: u32,
    /// Bytes per line.
    pub pitch: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pub format: &'static FormatInfo,
    pub planes: Vec<FramebufferPlane>,
}

/// State of one plane as proposed or committed by the framework.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaneState {
    /// The CRTC the plane is attached to, if any.
    pub crtc: Option<CrtcState>,
    pub fb: Option<Framebuffer>,
    /// Source rectangle in 16.16 fixed point.
    pub src: Rect,
    /// Destination rectangle in CRTC pixels.
    pub dst: Rect,
    /// Normalized z position, i.e. the blender pipe slot.
    pub zpos: u32,
    pub color_encoding: ColorEncoding,
    pub color_range: ColorRange,
    /// Set by the layer's check.
    pub visible: bool,
}

impl PlaneState {
    /// Whether the plane is attached and visible.
    pub fn is_enabled(&self) -> bool {
        self.crtc.is_some() && self.visible
    }

    pub fn timing(&self) -> Option<&OutputTiming> {
        self.crtc.as_ref().map(|crtc| &crtc.timing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_rate() {
        let timing = OutputTiming {
            clock_khz: 148_500,
            hdisplay: 1920,
            htotal: 2200,
            vdisplay: 1080,
            vtotal: 1125,
        };
        assert_eq!(timing.refresh_rate(), Some(60));
        assert_eq!(timing.active_area(), Rect::new(0, 0, 1920, 1080));

        assert_eq!(OutputTiming::default().refresh_rate(), None);
        assert_eq!(OutputTiming { clock_khz: 0, ..timing }.refresh_rate(), None);
    }

    #[test]
    fn test_enabled_needs_crtc_and_visibility() {
        let mut state = PlaneState { visible: true, ..Default::default() };
        assert!(!state.is_enabled());

        state.crtc = Some(CrtcState { enabled: true, timing: Default::default() });
        assert!(state.is_enabled());

        state.visible = false;
        assert!(!state.is_enabled());
    }
}
