/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Streaming draw operations
//!
//! Two ways to push an image's pixels at a drawing backend without ever
//! building a contiguous copy:
//!
//! - [`RawImage::draw_direct`] walks the physical block list and replays
//!   the image as rectangular pixel-array fragments. A block rarely starts
//!   or ends on a row boundary, so each block contributes at most three
//!   fragments: a partial first row, a run of whole rows, and a partial
//!   last row. Concatenated in emission order the fragments cover every
//!   pixel exactly once, in row-major order.
//! - [`RawImage::draw_scale`] resamples into an arbitrary destination
//!   rectangle, one `draw_pixel` call per destination pixel, using the
//!   same source mapping as buffer scaling.

use crate::errors::ImageErrors;
use crate::image::RawImage;
use crate::resample::{interpolated_pixel, ScaleMap};
use crate::traits::{PixelArrayDrawer, PixelDrawer};

impl RawImage {
    /// Replay the image as pixel-array draw calls with the top-left placed
    /// at `(left, top)`.
    ///
    /// Fragment geometry follows the physical blocks:
    ///
    /// ```text
    /// |         |#############|   <----- first partial row
    /// #########################   <-----+
    /// ....                              +-- whole-row body
    /// #########################   <-----+
    /// #######                     <----- trailing partial row
    /// ```
    ///
    /// Every emitted fragment has non-zero width and height.
    pub fn draw_direct<T, D>(
        &self, drawer: &D, ctx: &mut T, left: i32, top: i32
    ) -> Result<(), ImageErrors>
    where
        D: PixelArrayDrawer<T>
    {
        let width = self.width();
        let has_alpha = self.has_alpha();
        let view = self.pixels()?;

        let mut current_x = 0_usize;
        let mut current_y = 0_usize;

        // row cursor advance shared by all three fragment kinds
        let advance = |current_x: &mut usize, current_y: &mut usize, step: usize| {
            *current_x += step;
            if *current_x == width {
                *current_x = 0;
                *current_y += 1;
            }
        };

        for colors in view.blocks() {
            let mut offset = 0_usize;
            let mut rest = colors.len();

            if current_x > 0 {
                // finish the row a previous block left open
                let w = (width - current_x).min(rest);

                drawer.draw_pixel_array(
                    ctx,
                    colors,
                    offset,
                    width,
                    (left + current_x as i32) as f32,
                    (top + current_y as i32) as f32,
                    w,
                    1,
                    has_alpha
                );

                offset += w;
                rest -= w;
                advance(&mut current_x, &mut current_y, w);
            }

            if rest > 0 {
                // whole rows, or whatever single span is left
                let w = width.min(rest);
                let h = rest / w;

                drawer.draw_pixel_array(
                    ctx,
                    colors,
                    offset,
                    width,
                    (left + current_x as i32) as f32,
                    (top + current_y as i32) as f32,
                    w,
                    h,
                    has_alpha
                );

                offset += w * h;
                rest -= w * h;

                if h > 1 {
                    current_x = 0;
                    current_y += h;
                } else {
                    advance(&mut current_x, &mut current_y, w);
                }
            }

            if rest > 0 {
                // partial final row of this block
                drawer.draw_pixel_array(
                    ctx,
                    colors,
                    offset,
                    width,
                    (left + current_x as i32) as f32,
                    (top + current_y as i32) as f32,
                    rest,
                    1,
                    has_alpha
                );

                advance(&mut current_x, &mut current_y, rest);
            }
        }

        Ok(())
    }

    /// Resample into the destination rectangle
    /// `[left, right) x [top, bottom)`, one callback per destination
    /// pixel.
    ///
    /// Uses the same coordinate mapping as
    /// [`create_scale_image`](Self::create_scale_image) but allocates no
    /// destination buffer. Empty rectangles draw nothing.
    pub fn draw_scale<T, D>(
        &self, drawer: &D, ctx: &mut T, left: i32, top: i32, right: i32, bottom: i32
    ) -> Result<(), ImageErrors>
    where
        D: PixelDrawer<T>
    {
        if right <= left || bottom <= top {
            return Ok(());
        }

        let dst_w = (right - left) as usize;
        let dst_h = (bottom - top) as usize;

        let view = self.pixels()?;
        let map = ScaleMap::new(self.width(), self.height(), dst_w, dst_h);

        for y in 0..dst_h {
            let ys = map.source_y(y);

            for x in 0..dst_w {
                let xs = map.source_x(x);
                let color = interpolated_pixel(|i| view.sample(i), xs, ys, self.width());

                drawer.draw_pixel(ctx, left + x as i32, top + y as i32, color);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pixblock_core::blob::IntBlob;
    use pixblock_core::pool::BlockPool;

    use crate::image::RawImage;
    use crate::traits::{PixelArrayDrawer, PixelDrawer};

    struct Recorder;

    #[derive(Debug, PartialEq)]
    struct Fragment {
        offset: usize,
        x:      i32,
        y:      i32,
        w:      usize,
        h:      usize
    }

    impl PixelArrayDrawer<Vec<Fragment>> for Recorder {
        fn draw_pixel_array(
            &self, ctx: &mut Vec<Fragment>, _colors: &[u32], offset: usize, _stride: usize,
            x: f32, y: f32, width: usize, height: usize, _has_alpha: bool
        ) {
            ctx.push(Fragment {
                offset,
                x: x as i32,
                y: y as i32,
                w: width,
                h: height
            });
        }
    }

    struct PointRecorder;

    impl PixelDrawer<Vec<(i32, i32, u32)>> for PointRecorder {
        fn draw_pixel(&self, ctx: &mut Vec<(i32, i32, u32)>, x: i32, y: i32, color: u32) {
            ctx.push((x, y, color));
        }
    }

    fn sequential_image(pool_capacity: usize, w: usize, h: usize) -> RawImage {
        let pool = Arc::new(BlockPool::new(pool_capacity));
        let ints = IntBlob::alloc(w * h, &pool);
        for i in 0..w * h {
            ints.set(i, 0xff00_0000 | i as u32).unwrap();
        }
        let image = RawImage::new(w, h, &ints, false).unwrap();
        ints.release();
        image
    }

    #[test]
    fn four_by_four_over_capacity_five_blocks() {
        let image = sequential_image(5, 4, 4);
        let mut calls = Vec::new();

        image.draw_direct(&Recorder, &mut calls, 0, 0).unwrap();

        // blocks of 5/5/5/1 over rows of 4
        let expected = [
            Fragment { offset: 0, x: 0, y: 0, w: 4, h: 1 },
            Fragment { offset: 4, x: 0, y: 1, w: 1, h: 1 },
            Fragment { offset: 0, x: 1, y: 1, w: 3, h: 1 },
            Fragment { offset: 3, x: 0, y: 2, w: 2, h: 1 },
            Fragment { offset: 0, x: 2, y: 2, w: 2, h: 1 },
            Fragment { offset: 2, x: 0, y: 3, w: 3, h: 1 },
            Fragment { offset: 0, x: 3, y: 3, w: 1, h: 1 }
        ];

        assert_eq!(calls, expected);
        assert_eq!(calls.iter().map(|f| f.w * f.h).sum::<usize>(), 16);
        assert!(calls.iter().all(|f| f.w > 0 && f.h > 0));

        image.release();
    }

    #[test]
    fn fragments_cover_every_pixel_exactly_once() {
        // capacities that do not divide the row length
        for capacity in [3, 5, 7, 9, 11, 64] {
            let w = 6;
            let h = 5;
            let image = sequential_image(capacity, w, h);

            struct Painter;
            impl PixelArrayDrawer<Vec<u32>> for Painter {
                fn draw_pixel_array(
                    &self, grid: &mut Vec<u32>, colors: &[u32], offset: usize, stride: usize,
                    x: f32, y: f32, width: usize, height: usize, _has_alpha: bool
                ) {
                    for row in 0..height {
                        for col in 0..width {
                            let color = colors[offset + row * stride + col];
                            let dst = (y as usize + row) * 6 + x as usize + col;
                            // no pixel painted twice
                            assert_eq!(grid[dst], u32::MAX);
                            grid[dst] = color;
                        }
                    }
                }
            }

            let mut grid = vec![u32::MAX; w * h];
            image.draw_direct(&Painter, &mut grid, 0, 0).unwrap();

            for (i, color) in grid.iter().enumerate() {
                assert_eq!(*color, 0xff00_0000 | i as u32, "capacity {capacity}, pixel {i}");
            }

            image.release();
        }
    }

    #[test]
    fn destination_offset_shifts_fragments() {
        let image = sequential_image(4, 4, 2);
        let mut calls = Vec::new();

        image.draw_direct(&Recorder, &mut calls, 10, 20).unwrap();

        assert!(calls.iter().all(|f| f.x >= 10 && f.y >= 20));

        image.release();
    }

    #[test]
    fn draw_scale_streams_the_same_pixels_scaling_produces() {
        let image = sequential_image(8, 4, 4);

        let scaled = image.create_scale_image(3, 3).unwrap();
        let mut streamed = Vec::new();
        image.draw_scale(&PointRecorder, &mut streamed, 0, 0, 3, 3).unwrap();

        let view = scaled.pixels().unwrap();
        for (i, (x, y, color)) in streamed.iter().enumerate() {
            assert_eq!(*x, (i % 3) as i32);
            assert_eq!(*y, (i / 3) as i32);
            assert_eq!(*color, view.get(i).unwrap());
        }
        assert_eq!(streamed.len(), 9);

        drop(view);
        scaled.release();
        image.release();
    }

    #[test]
    fn empty_destination_rectangles_draw_nothing() {
        let image = sequential_image(8, 2, 2);
        let mut streamed = Vec::new();

        image.draw_scale(&PointRecorder, &mut streamed, 5, 5, 5, 9).unwrap();
        image.draw_scale(&PointRecorder, &mut streamed, 5, 5, 2, 9).unwrap();

        assert!(streamed.is_empty());

        image.release();
    }
}
