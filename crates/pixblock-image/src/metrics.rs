/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Live pixel-byte accounting
//!
//! [`ImageMetrics`] tracks how many pixel bytes are outstanding across all
//! live images that were constructed with a handle to it. It is an
//! explicit, cloneable gauge rather than process-global state: create one,
//! pass it to the image constructors that should report into it, and drop
//! all handles to tear it down.
//!
//! The gauge counts `width * height * 4` per image on construction and
//! subtracts only when the image's backing storage is actually reclaimed;
//! an image released while another handle still retains the blob leaves
//! the gauge untouched (the bytes are, after all, still live).

use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A shared gauge of live pixel bytes.
///
/// Cloning yields another handle to the same gauge.
#[derive(Clone, Default)]
pub struct ImageMetrics {
    live: Arc<AtomicUsize>
}

impl ImageMetrics {
    /// Create a gauge reading zero.
    pub fn new() -> ImageMetrics {
        ImageMetrics::default()
    }

    /// Pixel bytes currently outstanding.
    pub fn live_bytes(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Record `bytes` new live bytes; returns the new total.
    pub(crate) fn add(&self, bytes: usize) -> usize {
        self.live.fetch_add(bytes, Ordering::AcqRel) + bytes
    }

    /// Record `bytes` reclaimed bytes; saturates at zero and returns the
    /// new total.
    pub(crate) fn sub(&self, bytes: usize) -> usize {
        let updated = self
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                Some(live.saturating_sub(bytes))
            });

        match updated {
            Ok(previous) => previous.saturating_sub(bytes),
            Err(previous) => previous
        }
    }
}

impl Debug for ImageMetrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImageMetrics(live: {} bytes)", self.live_bytes())
    }
}
