// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Rectangles and scale factors, following the DRM conventions: source rectangles are in 16.16
//! fixed point, destination rectangles in integer pixels, `x2`/`y2` are exclusive.

use thiserror::Error;

use crate::FRAC_BITS;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    /// Creates a rectangle from its origin and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x1: x, y1: y, x2: x + width, y2: y + height }
    }

    /// Creates a 16.16 fixed-point rectangle from integer pixel coordinates.
    pub const fn fixed(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x << FRAC_BITS, y << FRAC_BITS, width << FRAC_BITS, height << FRAC_BITS)
    }

    /// Width, saturated at the `i32` limits for degenerate rectangles.
    pub const fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1)
    }

    pub const fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Whether the rectangle covers at least one pixel.
    pub const fn is_visible(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScaleError {
    #[error("negative rectangle dimension")]
    Negative,
    #[error("scale factor {scale:#x} outside [{min:#x}, {max:#x}]")]
    OutOfRange { scale: i32, min: i32, max: i32 },
}

/// Computes `src / dst` in 16.16 fixed point. `src` is 16.16, `dst` an integer. Downscaling
/// factors are rounded up so that a marginally too large ratio is never accepted.
fn calc_scale(src: i64, dst: i64) -> Result<i64, ScaleError> {
    if src < 0 || dst < 0 {
        return Err(ScaleError::Negative);
    }

    if dst == 0 {
        return Ok(0);
    }

    if src > (dst << FRAC_BITS) {
        Ok((src + dst - 1) / dst)
    } else {
        Ok(src / dst)
    }
}

fn check_scale(src: i64, dst: i64, min: i32, max: i32) -> Result<i32, ScaleError> {
    let scale = calc_scale(src, dst)?;
    if dst == 0 {
        return Ok(0);
    }

    if scale < i64::from(min) || scale > i64::from(max) {
        let scale = i32::try_from(scale).unwrap_or(i32::MAX);
        return Err(ScaleError::OutOfRange { scale, min, max });
    }

    Ok(scale as i32)
}

/// Extent between two coordinates, without the overflow of `i32` arithmetic.
fn extent(start: i32, end: i32) -> i64 {
    i64::from(end) - i64::from(start)
}

/// Horizontal 16.16 scale factor of `src` onto `dst`, checked against `[min, max]`.
pub fn calc_hscale(src: &Rect, dst: &Rect, min: i32, max: i32) -> Result<i32, ScaleError> {
    check_scale(extent(src.x1, src.x2), extent(dst.x1, dst.x2), min, max)
}

/// Vertical 16.16 scale factor of `src` onto `dst`, checked against `[min, max]`.
pub fn calc_vscale(src: &Rect, dst: &Rect, min: i32, max: i32) -> Result<i32, ScaleError> {
    check_scale(extent(src.y1, src.y2), extent(dst.y1, dst.y2), min, max)
}

/// Shrinks a source extent by the part of the destination that is clipped away. Rounds towards
/// 1.0 so that clipping never turns an upscale into a downscale or the other way around.
fn clip_scaled(src: i32, dst: i32, clip: &mut i32) -> i32 {
    if dst == 0 {
        return 0;
    }

    *clip = (*clip).min(dst);

    let tmp = i64::from(src) * i64::from(dst - *clip);
    let dst = i64::from(dst);

    let scaled = if i64::from(src) < (dst << FRAC_BITS) {
        (tmp + dst - 1) / dst
    } else {
        tmp / dst
    };

    scaled as i32
}

/// Clips `dst` against `clip` and shrinks the 16.16 `src` rectangle proportionally. Returns
/// whether anything of `dst` remains visible.
pub fn clip_scaled_rects(src: &mut Rect, dst: &mut Rect, clip: &Rect) -> bool {
    let mut diff = clip.x1.saturating_sub(dst.x1);
    if diff > 0 {
        let new_src_w = clip_scaled(src.width(), dst.width(), &mut diff);
        src.x1 = src.x2.saturating_sub(new_src_w);
        dst.x1 = dst.x1.saturating_add(diff);
    }

    let mut diff = clip.y1.saturating_sub(dst.y1);
    if diff > 0 {
        let new_src_h = clip_scaled(src.height(), dst.height(), &mut diff);
        src.y1 = src.y2.saturating_sub(new_src_h);
        dst.y1 = dst.y1.saturating_add(diff);
    }

    let mut diff = dst.x2.saturating_sub(clip.x2);
    if diff > 0 {
        let new_src_w = clip_scaled(src.width(), dst.width(), &mut diff);
        src.x2 = src.x1.saturating_add(new_src_w);
        dst.x2 = dst.x2.saturating_sub(diff);
    }

    let mut diff = dst.y2.saturating_sub(clip.y2);
    if diff > 0 {
        let new_src_h = clip_scaled(src.height(), dst.height(), &mut diff);
        src.y2 = src.y1.saturating_add(new_src_h);
        dst.y2 = dst.y2.saturating_sub(diff);
    }

    dst.is_visible()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FIXED_ONE;

    const ONE: i32 = FIXED_ONE as i32;

    #[test]
    fn test_fixed_rect() {
        let r = Rect::fixed(3, 1, 64, 64);
        assert_eq!(r.x1, 3 << 16);
        assert_eq!(r.width(), 64 << 16);
        assert_eq!(r.height() >> 16, 64);
        assert!(r.is_visible());
        assert!(!Rect::new(0, 0, 0, 10).is_visible());
    }

    #[test]
    fn test_scale_identity_and_downscale() {
        let src = Rect::fixed(0, 0, 64, 64);
        let dst = Rect::new(0, 0, 32, 64);

        assert_eq!(calc_hscale(&src, &dst, 1, (1 << 20) - 1), Ok(2 * ONE));
        assert_eq!(calc_vscale(&src, &dst, ONE, ONE), Ok(ONE));
    }

    #[test]
    fn test_scale_rounds_downscale_up() {
        // 100 / 3 is 33.333..., must be rounded up rather than truncated.
        let src = Rect::fixed(0, 0, 100, 1);
        let dst = Rect::new(0, 0, 3, 1);
        let scale = calc_hscale(&src, &dst, 1, i32::MAX).unwrap();
        assert_eq!(scale, ((100 << 16) + 2) / 3);
    }

    #[test]
    fn test_scale_out_of_range() {
        let src = Rect::fixed(0, 0, 64, 64);
        let dst = Rect::new(0, 0, 32, 32);

        assert_eq!(
            calc_hscale(&src, &dst, ONE, ONE),
            Err(ScaleError::OutOfRange { scale: 2 * ONE, min: ONE, max: ONE })
        );
    }

    #[test]
    fn test_scale_zero_destination() {
        let src = Rect::fixed(0, 0, 64, 64);
        let dst = Rect::new(10, 10, 0, 0);
        assert_eq!(calc_hscale(&src, &dst, ONE, ONE), Ok(0));
    }

    #[test]
    fn test_huge_source_is_rejected() {
        let src = Rect { x1: 0, y1: 0, x2: i32::MAX, y2: 64 << 16 };
        let dst = Rect::new(0, 0, 2, 64);

        assert_eq!(
            calc_hscale(&src, &dst, 1, (1 << 20) - 1),
            Err(ScaleError::OutOfRange { scale: 1 << 30, min: 1, max: (1 << 20) - 1 })
        );
        assert_eq!(calc_vscale(&src, &dst, 1, (1 << 20) - 1), Ok(ONE));

        // Wider than i32 can hold, the reported factor saturates.
        let src = Rect { x1: i32::MIN, y1: 0, x2: i32::MAX, y2: 64 << 16 };
        let dst = Rect::new(0, 0, 1, 64);
        assert_eq!(
            calc_hscale(&src, &dst, 1, i32::MAX),
            Err(ScaleError::OutOfRange { scale: i32::MAX, min: 1, max: i32::MAX })
        );
        assert_eq!(src.width(), i32::MAX);
    }

    #[test]
    fn test_clip_far_outside_does_not_overflow() {
        let mut src = Rect::fixed(0, 0, 64, 64);
        let mut dst = Rect { x1: i32::MIN, y1: 0, x2: i32::MIN + 64, y2: 64 };
        let clip = Rect::new(0, 0, 1920, 1080);

        assert!(!clip_scaled_rects(&mut src, &mut dst, &clip));
    }

    #[test]
    fn test_clip_right_edge() {
        // 1:1, half of the destination hangs off the right edge.
        let mut src = Rect::fixed(0, 0, 100, 100);
        let mut dst = Rect::new(50, 0, 100, 100);
        let clip = Rect::new(0, 0, 100, 100);

        assert!(clip_scaled_rects(&mut src, &mut dst, &clip));
        assert_eq!(dst, Rect::new(50, 0, 50, 100));
        assert_eq!(src, Rect::fixed(0, 0, 50, 100));
    }

    #[test]
    fn test_clip_left_edge_downscaled() {
        // 2:1 downscale, left quarter of the destination is off screen.
        let mut src = Rect::fixed(0, 0, 200, 100);
        let mut dst = Rect::new(-25, 0, 100, 50);
        let clip = Rect::new(0, 0, 1920, 1080);

        assert!(clip_scaled_rects(&mut src, &mut dst, &clip));
        assert_eq!(dst, Rect::new(0, 0, 75, 50));
        assert_eq!(src.x1, 50 << 16);
        assert_eq!(src.x2, 200 << 16);
    }

    #[test]
    fn test_clip_fully_outside() {
        let mut src = Rect::fixed(0, 0, 64, 64);
        let mut dst = Rect::new(2000, 0, 64, 64);
        let clip = Rect::new(0, 0, 1920, 1080);

        assert!(!clip_scaled_rects(&mut src, &mut dst, &clip));
    }
}
