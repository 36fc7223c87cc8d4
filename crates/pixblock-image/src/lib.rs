/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Pooled, block-structured raster images
//!
//! A [`RawImage`](image::RawImage) wraps a reference-counted pixel blob
//! whose storage is a list of fixed-size blocks borrowed from a pool, and
//! offers exactly two ways of traversing its pixels:
//!
//! - bilinear scaling into a freshly pooled buffer
//!   ([`create_scale_image`](image::RawImage::create_scale_image)) or
//!   streamed per pixel ([`draw_scale`](image::RawImage::draw_scale))
//! - block-boundary-aware replay of the stored pixels as rectangular
//!   draw calls ([`draw_direct`](image::RawImage::draw_direct))
//!
//! Neither path ever materializes a contiguous pixel array.
//!
//! JPEG and PNG decoding is delegated to `zune-jpeg` and `zune-png`
//! through [`codecs`]; serialization to and from byte streams lives in
//! [`serialize`].
pub mod codecs;
pub mod draw;
pub mod errors;
pub mod image;
pub mod metrics;
pub mod properties;
pub mod resample;
pub mod serialize;
pub mod traits;

pub use pixblock_core::blob::{BlobErrors, BlobView, IntBlob};
pub use pixblock_core::pool::BlockPool;

pub use crate::errors::ImageErrors;
pub use crate::image::RawImage;
pub use crate::metrics::ImageMetrics;
pub use crate::properties::{PropertyMap, PropertyValue};
pub use crate::serialize::ImageHeader;
