/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! This module represents a single decoded raster image
//!
//! An image is a pooled integer blob of `width * height` packed-ARGB
//! pixels plus its descriptive metadata: dimensions, an alpha-validity
//! flag and an open property map. Images are shared across consumers
//! through the same retain/release protocol as the blob underneath them;
//! the release that drops the last image reference releases the image's
//! hold on the blob, and the blob returns its blocks to the pool once no
//! one else retains it either.
//!
//! Scaling never mutates the source: [`RawImage::create_scale_image`]
//! allocates a fresh blob from the source's pool and fills it through the
//! bilinear resampler.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{trace, warn};
use pixblock_core::blob::{BlobView, IntBlob};
use pixblock_core::refcount::RefCount;

use crate::errors::ImageErrors;
use crate::metrics::ImageMetrics;
use crate::properties::{PropertyMap, PropertyValue};
use crate::resample::{interpolated_pixel, ScaleMap};

pub(crate) struct ImageShared {
    pub(crate) width:      usize,
    pub(crate) height:     usize,
    pub(crate) has_alpha:  bool,
    pub(crate) ints:       IntBlob,
    pub(crate) properties: Mutex<PropertyMap>,
    pub(crate) refs:       RefCount,
    pub(crate) metrics:    Option<ImageMetrics>
}

/// A reference-counted raster image over pooled block storage.
///
/// Handles are duplicated with [`retain`](RawImage::retain) and dropped
/// with [`release`](RawImage::release); there is deliberately no `Clone`,
/// since aliasing without retaining breaks the ownership protocol.
pub struct RawImage {
    pub(crate) inner: Arc<ImageShared>
}

impl RawImage {
    /// Wrap a blob of `width * height` pixels into an image.
    ///
    /// The blob is retained; the caller keeps (and stays responsible for)
    /// its own handle.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use pixblock_image::{BlockPool, IntBlob, RawImage};
    ///
    /// let pool = Arc::new(BlockPool::new(256));
    /// let ints = IntBlob::alloc(16, &pool);
    /// let image = RawImage::new(4, 4, &ints, false).unwrap();
    /// ints.release();
    ///
    /// assert_eq!(image.size_in_bytes(), 64);
    /// image.release();
    /// ```
    ///
    /// # Errors
    /// - [`ImageErrors::ZeroDimension`] when either dimension is zero
    /// - [`ImageErrors::DimensionsMisMatch`] when the blob length is not
    ///   `width * height`
    pub fn new(
        width: usize, height: usize, ints: &IntBlob, has_alpha: bool
    ) -> Result<RawImage, ImageErrors> {
        Self::create(width, height, ints, has_alpha, PropertyMap::new(), None)
    }

    /// Like [`new`](Self::new), with an initial property map.
    pub fn with_properties(
        width: usize, height: usize, ints: &IntBlob, has_alpha: bool, properties: PropertyMap
    ) -> Result<RawImage, ImageErrors> {
        Self::create(width, height, ints, has_alpha, properties, None)
    }

    /// Like [`with_properties`](Self::with_properties), reporting into the
    /// given byte gauge for the image's whole lifetime.
    pub fn with_telemetry(
        width: usize, height: usize, ints: &IntBlob, has_alpha: bool, properties: PropertyMap,
        metrics: ImageMetrics
    ) -> Result<RawImage, ImageErrors> {
        Self::create(width, height, ints, has_alpha, properties, Some(metrics))
    }

    fn create(
        width: usize, height: usize, ints: &IntBlob, has_alpha: bool, properties: PropertyMap,
        metrics: Option<ImageMetrics>
    ) -> Result<RawImage, ImageErrors> {
        if width == 0 || height == 0 {
            return Err(ImageErrors::ZeroDimension(width, height));
        }

        if ints.length() != width * height {
            return Err(ImageErrors::DimensionsMisMatch(width * height, ints.length()));
        }

        let image = RawImage {
            inner: Arc::new(ImageShared {
                width,
                height,
                has_alpha,
                ints: ints.retain(),
                properties: Mutex::new(properties),
                refs: RefCount::new(),
                metrics
            })
        };

        let bytes = width * height * 4;

        match &image.inner.metrics {
            Some(gauge) => {
                let total = gauge.add(bytes);
                trace!("raw image {width}x{height} created, {bytes} bytes, {total} bytes live");
            }
            None => trace!("raw image {width}x{height} created, {bytes} bytes")
        }

        Ok(image)
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.inner.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.inner.height
    }

    /// Width and height as a tuple.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.inner.width, self.inner.height)
    }

    /// Whether the alpha byte of the stored pixels carries valid values.
    pub fn has_alpha(&self) -> bool {
        self.inner.has_alpha
    }

    /// Pixel storage size, always `width * height * 4`.
    pub fn size_in_bytes(&self) -> usize {
        self.inner.width * self.inner.height * 4
    }

    /// Lock the pixel storage for reading.
    ///
    /// Fails with a blob error once the image's storage was reclaimed.
    pub fn pixels(&self) -> Result<BlobView<'_>, ImageErrors> {
        Ok(self.inner.ints.view()?)
    }

    /// Look up a property; absent keys are not an error.
    pub fn property(&self, key: &str) -> Option<PropertyValue> {
        self.lock_properties().get(key).cloned()
    }

    /// Set a property, returning `&self` so calls chain.
    pub fn set_property<V: Into<PropertyValue>>(&self, key: &str, value: V) -> &Self {
        self.lock_properties().insert(key.to_owned(), value.into());
        self
    }

    /// Snapshot of the whole property map.
    pub fn properties(&self) -> PropertyMap {
        self.lock_properties().clone()
    }

    /// Current number of owning references to this image.
    pub fn ref_count(&self) -> usize {
        self.inner.refs.count()
    }

    /// Take an additional owning reference to this image.
    pub fn retain(&self) -> RawImage {
        self.inner.refs.retain();

        RawImage {
            inner: Arc::clone(&self.inner)
        }
    }

    /// Drop one owning reference.
    ///
    /// Returns `true` iff this call dropped the last one. In that case the
    /// image releases its hold on the backing blob; when that in turn
    /// reclaims the storage the byte gauge (if any) goes down, otherwise a
    /// diagnostic is logged: some other holder still retains the blob,
    /// which is legitimate.
    pub fn release(&self) -> bool {
        if !self.inner.refs.release() {
            return false;
        }

        let bytes = self.size_in_bytes();
        let (width, height) = self.dimensions();

        if self.inner.ints.release() {
            match &self.inner.metrics {
                Some(gauge) => {
                    let total = gauge.sub(bytes);
                    trace!(
                        "raw image {width}x{height} released, {bytes} bytes reclaimed, {total} bytes live"
                    );
                }
                None => trace!("raw image {width}x{height} released, {bytes} bytes reclaimed")
            }
        } else {
            warn!(
                "raw image {width}x{height} released but its {bytes} byte pixel buffer is still retained elsewhere"
            );
        }

        true
    }

    /// Scale this image to `new_width * new_height` pixels with bilinear
    /// interpolation, allocating the result from the same pool.
    ///
    /// The new image copies the alpha flag, the property map and the
    /// telemetry handle; the source is left untouched and not released.
    pub fn create_scale_image(
        &self, new_width: usize, new_height: usize
    ) -> Result<RawImage, ImageErrors> {
        if new_width == 0 || new_height == 0 {
            return Err(ImageErrors::ZeroDimension(new_width, new_height));
        }

        let ints = IntBlob::alloc(new_width * new_height, self.inner.ints.pool());

        {
            let src = self.inner.ints.view()?;
            let mut dst = ints.view_mut()?;
            let map = ScaleMap::new(self.inner.width, self.inner.height, new_width, new_height);

            for y in 0..new_height {
                let ys = map.source_y(y);

                for x in 0..new_width {
                    let xs = map.source_x(x);
                    let color = interpolated_pixel(|i| src.sample(i), xs, ys, self.inner.width);

                    dst.set(y * new_width + x, color)?;
                }
            }
        }

        let scaled = Self::create(
            new_width,
            new_height,
            &ints,
            self.inner.has_alpha,
            self.properties(),
            self.inner.metrics.clone()
        )?;

        // the scaled image holds its own reference now
        ints.release();

        Ok(scaled)
    }

    /// Scale by a ratio; target dimensions truncate toward zero.
    pub fn create_scale_image_by_ratio(&self, ratio: f32) -> Result<RawImage, ImageErrors> {
        let new_width = (self.inner.width as f32 * ratio) as usize;
        let new_height = (self.inner.height as f32 * ratio) as usize;

        self.create_scale_image(new_width, new_height)
    }

    fn lock_properties(&self) -> MutexGuard<'_, PropertyMap> {
        self.inner.properties.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RawImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RawImage(w: {}, h: {}, alpha: {}, refs: {}, props: {:?})",
            self.inner.width,
            self.inner.height,
            self.inner.has_alpha,
            self.inner.refs.count(),
            self.lock_properties()
        )
    }
}
