/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! End-to-end checks of the bilinear scaler over pooled storage.

use std::sync::Arc;

use nanorand::{Rng, WyRand};
use pixblock_image::{BlockPool, ImageMetrics, IntBlob, RawImage};

fn image_from_pixels(
    pool: &Arc<BlockPool>, w: usize, h: usize, pixels: &[u32], has_alpha: bool
) -> RawImage {
    assert_eq!(pixels.len(), w * h);

    let ints = IntBlob::alloc(w * h, pool);
    for (i, px) in pixels.iter().enumerate() {
        ints.set(i, *px).unwrap();
    }

    let image = RawImage::new(w, h, &ints, has_alpha).unwrap();
    ints.release();
    image
}

fn pixels_of(image: &RawImage) -> Vec<u32> {
    let view = image.pixels().unwrap();
    (0..image.width() * image.height())
        .map(|i| view.get(i).unwrap())
        .collect()
}

/// 2x2 with pure corner colors up to 4x4: every output pixel is fully
/// determined by the sampling formula, including the wrapped extrapolation
/// on the top border and the averaged alpha where the unclamped row
/// coordinate touches the zeroed slack past the last row.
#[test]
fn two_by_two_corners_up_to_four_by_four() {
    let pool = Arc::new(BlockPool::new(64));
    let source = image_from_pixels(
        &pool,
        2,
        2,
        &[0xffff0000, 0xff00ff00, 0xff0000ff, 0xffffffff],
        false
    );

    let scaled = source.create_scale_image(4, 4).unwrap();
    assert_eq!(scaled.dimensions(), (4, 4));

    #[rustfmt::skip]
    let expected: [u32; 16] = [
        0xff7f0081, 0xff7f0081, 0xff808081, 0xff82ff81,
        0xffff0000, 0xffff0000, 0xff808000, 0xff00ff00,
        0xff800080, 0xff800080, 0xff808080, 0xff80ff80,
        0x7f0000ff, 0x7f0000ff, 0x7f8080ff, 0x7fffffff,
    ];

    assert_eq!(pixels_of(&scaled), expected);

    scaled.release();
    source.release();
}

#[test]
fn identity_scale_reproduces_constant_fills_exactly() {
    let pool = Arc::new(BlockPool::new(48));
    let mut rng = WyRand::new_seed(0x5eed);

    for _ in 0..4 {
        let color = 0xff00_0000 | rng.generate::<u32>() & 0x00ff_ffff;
        let pixels = vec![color; 6 * 7];
        let source = image_from_pixels(&pool, 6, 7, &pixels, false);

        let copy = source.create_scale_image(6, 7).unwrap();
        assert_eq!(pixels_of(&copy), pixels);

        copy.release();
        source.release();
    }
}

#[test]
fn identity_scale_stays_within_one_per_channel_on_gradients() {
    let w = 16;
    let h = 16;
    let pool = Arc::new(BlockPool::new(100));

    let pixels: Vec<u32> = (0..w * h)
        .map(|i| {
            let (x, y) = ((i % w) as u32, (i / w) as u32);
            // adjacent deltas of at most 2 per channel
            0xff00_0000 | (x + y) << 16 | (2 * x) << 8 | (2 * y)
        })
        .collect();

    let source = image_from_pixels(&pool, w, h, &pixels, false);
    let copy = source.create_scale_image(w, h).unwrap();
    let copied = pixels_of(&copy);

    for (original, resampled) in pixels.iter().zip(&copied) {
        for shift in [0_u32, 8, 16, 24] {
            let a = (original >> shift) & 0xff;
            let b = (resampled >> shift) & 0xff;
            assert!(
                a.abs_diff(b) <= 1,
                "channel at shift {shift} drifted: {a} vs {b}"
            );
        }
    }

    copy.release();
    source.release();
}

#[test]
fn size_in_bytes_is_always_four_per_pixel() {
    let pool = Arc::new(BlockPool::new(64));

    for (w, h) in [(1, 1), (3, 5), (16, 2)] {
        let source = image_from_pixels(&pool, w, h, &vec![0; w * h], true);
        assert_eq!(source.size_in_bytes(), w * h * 4);

        let doubled = source.create_scale_image(w * 2, h * 2).unwrap();
        assert_eq!(doubled.size_in_bytes(), w * h * 16);

        doubled.release();
        source.release();
    }
}

#[test]
fn scaled_images_report_into_the_source_gauge() {
    let pool = Arc::new(BlockPool::new(64));
    let metrics = ImageMetrics::new();

    let ints = IntBlob::alloc(16, &pool);
    let source = RawImage::with_telemetry(
        4,
        4,
        &ints,
        false,
        pixblock_image::PropertyMap::new(),
        metrics.clone()
    )
    .unwrap();
    ints.release();

    assert_eq!(metrics.live_bytes(), 64);

    let scaled = source.create_scale_image(2, 2).unwrap();
    assert_eq!(metrics.live_bytes(), 64 + 16);

    scaled.release();
    assert_eq!(metrics.live_bytes(), 64);

    source.release();
    assert_eq!(metrics.live_bytes(), 0);
}

#[test]
fn alpha_flag_carries_over_to_scaled_images() {
    let pool = Arc::new(BlockPool::new(16));
    let source = image_from_pixels(&pool, 2, 2, &[0x80102030; 4], true);

    let scaled = source.create_scale_image(3, 3).unwrap();
    assert!(scaled.has_alpha());

    scaled.release();
    source.release();
}
