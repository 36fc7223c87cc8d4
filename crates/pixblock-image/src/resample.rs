/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Bilinear resampling of packed-ARGB pixels
//!
//! [`ScaleMap`] computes, for each destination pixel, the fractional source
//! coordinate to sample; [`interpolated_pixel`] reads the 2x2 neighborhood
//! around that coordinate and blends it channel by channel. Both the buffer
//! scaler and the streaming per-pixel draw path share these.
//!
//! Two quirks of the mapping are load-bearing for downstream consumers and
//! must not be "fixed":
//!
//! - only the x coordinate is clamped into the source (to `width - 1.001`);
//!   the y coordinate may step up to one row past the last one, where the
//!   read lands in the buffer's zeroed slack with an interpolation weight
//!   of zero or near zero
//! - alpha is the plain average of the four neighbors, not a bilinear
//!   blend
//!
//! Channel values are rounded with `+0.5`, truncated toward zero and
//! masked to 8 bits, so extrapolated values at the destination border
//! (where fractions go negative) wrap instead of clamping.

/// Destination-to-source coordinate mapping for one scale operation.
///
/// The half-texel term added to the destination center keeps the sampling
/// kernel centered over the source grid.
pub(crate) struct ScaleMap {
    x_scale:  f64,
    y_scale:  f64,
    src_cx:   f64,
    src_cy:   f64,
    dst_cx:   f64,
    dst_cy:   f64,
    x_limit:  f64,
    x_limit2: f64
}

impl ScaleMap {
    pub(crate) fn new(src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> ScaleMap {
        let x_scale = dst_w as f64 / src_w as f64;
        let y_scale = dst_h as f64 / src_h as f64;

        ScaleMap {
            x_scale,
            y_scale,
            src_cx: src_w as f64 / 2.0,
            src_cy: src_h as f64 / 2.0,
            dst_cx: dst_w as f64 / 2.0 + x_scale / 2.0,
            dst_cy: dst_h as f64 / 2.0 + y_scale / 2.0,
            x_limit: src_w as f64 - 1.0,
            x_limit2: src_w as f64 - 1.001
        }
    }

    /// Source x for destination column `x`, clamped into
    /// `[0, src_w - 1.001]` so the `+1` neighbor stays in the row.
    pub(crate) fn source_x(&self, x: usize) -> f64 {
        let xs = (x as f64 - self.dst_cx) / self.x_scale + self.src_cx;

        if xs < 0.0 {
            0.0
        } else if xs >= self.x_limit {
            self.x_limit2
        } else {
            xs
        }
    }

    /// Source y for destination row `y`. Deliberately unclamped.
    pub(crate) fn source_y(&self, y: usize) -> f64 {
        (y as f64 - self.dst_cy) / self.y_scale + self.src_cy
    }
}

/// Blend the 2x2 source neighborhood around fractional `(xs, ys)` into one
/// packed-ARGB pixel.
///
/// `fetch` reads a pixel by row-major index into a source of row length
/// `width`; it must tolerate indices up to one row past the source (the
/// blob view's slack-tolerant accessor does).
pub fn interpolated_pixel<F>(fetch: F, xs: f64, ys: f64, width: usize) -> u32
where
    F: Fn(usize) -> u32
{
    // truncation toward zero, matching the mapping's [-0.5, ..) range:
    // -0.5 truncates to row 0 with a negative fraction
    let x_base = xs as usize;
    let y_base = ys as usize;

    let x_fraction = xs - x_base as f64;
    let y_fraction = ys - y_base as f64;

    let at = |x: usize, y: usize| fetch(y * width + x);

    let lower_left = at(x_base, y_base);
    let lower_right = at(x_base + 1, y_base);
    let upper_left = at(x_base, y_base + 1);
    let upper_right = at(x_base + 1, y_base + 1);

    let channel = |pixel: u32, shift: u32| i64::from((pixel >> shift) & 0xff);

    let blend = |shift: u32| -> u32 {
        let ll = channel(lower_left, shift);
        let lr = channel(lower_right, shift);
        let ul = channel(upper_left, shift);
        let ur = channel(upper_right, shift);

        let lower = ll as f64 + x_fraction * (lr - ll) as f64;
        let upper = ul as f64 + x_fraction * (ur - ul) as f64;

        let value = (lower + y_fraction * (upper - lower) + 0.5) as i64;

        (value & 0xff) as u32
    };

    // unweighted average, not a bilinear blend
    let alpha = (channel(lower_left, 24)
        + channel(lower_right, 24)
        + channel(upper_left, 24)
        + channel(upper_right, 24))
        / 4;

    ((alpha & 0xff) as u32) << 24 | blend(16) << 16 | blend(8) << 8 | blend(0)
}
