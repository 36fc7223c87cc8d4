/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Entry point for the decoders feeding this library
//!
//! Decoding itself is fully delegated: `zune-jpeg` and `zune-png` parse
//! the bitstreams and hand back interleaved 8-bit samples, which are
//! packed here into a pooled ARGB blob and wrapped into a [`RawImage`].
//!
//! Inputs the decoders understand but this library does not store (PNGs
//! above 8 bits per channel, non-RGB(A) shapes) are not errors: they are
//! logged and reported as "no image" (`Ok(None)`), matching the contract
//! that a caller holding an unsupported stream simply gets nothing to
//! draw. Corrupt streams, by contrast, surface the codec's own error.

use std::sync::Arc;

use log::warn;
use pixblock_core::blob::IntBlob;
use pixblock_core::pool::BlockPool;
use zune_core::colorspace::ColorSpace;
use zune_jpeg::JpegDecoder;
use zune_png::PngDecoder;

use crate::errors::ImageErrors;
use crate::image::RawImage;
use crate::metrics::ImageMetrics;
use crate::properties::PropertyMap;

/// Stream formats this library can hand off to a decoder.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ImageFormat {
    /// Joint Photographic Experts Group
    Jpeg,
    /// Portable Network Graphics
    Png,
    /// Any unrecognized format
    Unknown
}

impl ImageFormat {
    /// Map a MIME type onto a format.
    pub fn from_mime(mime: &str) -> ImageFormat {
        match mime {
            "image/jpeg" => ImageFormat::Jpeg,
            "image/png" => ImageFormat::Png,
            _ => ImageFormat::Unknown
        }
    }

    /// Whether a decoder exists for this format.
    pub fn has_decoder(self) -> bool {
        !matches!(self, ImageFormat::Unknown)
    }
}

/// Everything a decode needs besides the bytes: the pool backing the new
/// image and, optionally, the byte gauge it should report into.
pub struct DecodeContext {
    pool:    Arc<BlockPool>,
    metrics: Option<ImageMetrics>
}

impl DecodeContext {
    /// Context allocating from `pool`, without telemetry.
    pub fn new(pool: Arc<BlockPool>) -> DecodeContext {
        DecodeContext {
            pool,
            metrics: None
        }
    }

    /// Context allocating from `pool` and reporting into `metrics`.
    pub fn with_metrics(pool: Arc<BlockPool>, metrics: ImageMetrics) -> DecodeContext {
        DecodeContext {
            pool,
            metrics: Some(metrics)
        }
    }

    /// The pool decoded images are allocated from.
    pub fn pool(&self) -> &Arc<BlockPool> {
        &self.pool
    }
}

/// Decode a byte stream of the given MIME type into a [`RawImage`].
///
/// Returns `Ok(None)` for unrecognized MIME types and for inputs the
/// library does not store (non-8-bit or non-RGB(A) PNG shapes); see the
/// module docs. The caller owns the single reference to the returned
/// image.
pub fn decode_raw_image(
    ctx: &DecodeContext, mime: &str, data: &[u8]
) -> Result<Option<RawImage>, ImageErrors> {
    match ImageFormat::from_mime(mime) {
        ImageFormat::Jpeg => decode_jpeg(ctx, data),
        ImageFormat::Png => decode_png(ctx, data),
        ImageFormat::Unknown => {
            warn!("no decoder for mime type \"{mime}\"");
            Ok(None)
        }
    }
}

fn decode_jpeg(ctx: &DecodeContext, data: &[u8]) -> Result<Option<RawImage>, ImageErrors> {
    let mut decoder = JpegDecoder::new(data);
    let samples = decoder.decode()?;

    let (width, height) = match decoder.info() {
        Some(info) => (usize::from(info.width), usize::from(info.height)),
        None => return Ok(None)
    };
    let colorspace = decoder.get_output_colorspace().unwrap_or(ColorSpace::Unknown);

    build_image(ctx, width, height, colorspace, &samples)
}

fn decode_png(ctx: &DecodeContext, data: &[u8]) -> Result<Option<RawImage>, ImageErrors> {
    let mut decoder = PngDecoder::new(data);
    let samples = decoder.decode_raw()?;

    let (width, height) = match decoder.get_dimensions() {
        Some(dimensions) => dimensions,
        None => return Ok(None)
    };

    match decoder.get_depth() {
        Some(zune_core::bit_depth::BitDepth::Eight) => {}
        depth => {
            warn!("png depth {depth:?} rejected, only 8 bit channels are stored");
            return Ok(None);
        }
    }

    let colorspace = decoder.get_colorspace().unwrap_or(ColorSpace::Unknown);

    match colorspace {
        ColorSpace::RGB | ColorSpace::RGBA => {}
        other => {
            warn!("png colorspace {other:?} rejected, only RGB and RGBA are stored");
            return Ok(None);
        }
    }

    build_image(ctx, width, height, colorspace, &samples)
}

/// Pack interleaved 8-bit samples into a pooled ARGB blob and wrap it.
fn build_image(
    ctx: &DecodeContext, width: usize, height: usize, colorspace: ColorSpace, samples: &[u8]
) -> Result<Option<RawImage>, ImageErrors> {
    let components = match colorspace {
        ColorSpace::Luma => 1,
        ColorSpace::RGB => 3,
        ColorSpace::RGBA => 4,
        other => {
            warn!("decoded colorspace {other:?} has no packed ARGB layout");
            return Ok(None);
        }
    };

    let count = width * height;

    if samples.len() != count * components {
        warn!(
            "decoder produced {} samples for a {width}x{height} {colorspace:?} image, expected {}",
            samples.len(),
            count * components
        );
        return Ok(None);
    }

    let has_alpha = components == 4;
    let ints = IntBlob::alloc(count, ctx.pool());

    {
        let mut view = ints.view_mut()?;

        match components {
            1 => {
                for (i, px) in samples.iter().enumerate() {
                    let gray = u32::from(*px);
                    view.set(i, 0xff00_0000 | gray << 16 | gray << 8 | gray)?;
                }
            }
            3 => {
                for (i, px) in samples.chunks_exact(3).enumerate() {
                    view.set(
                        i,
                        0xff00_0000
                            | u32::from(px[0]) << 16
                            | u32::from(px[1]) << 8
                            | u32::from(px[2])
                    )?;
                }
            }
            _ => {
                for (i, px) in samples.chunks_exact(4).enumerate() {
                    view.set(
                        i,
                        u32::from(px[3]) << 24
                            | u32::from(px[0]) << 16
                            | u32::from(px[1]) << 8
                            | u32::from(px[2])
                    )?;
                }
            }
        }
    }

    let image = match &ctx.metrics {
        Some(metrics) => RawImage::with_telemetry(
            width,
            height,
            &ints,
            has_alpha,
            PropertyMap::new(),
            metrics.clone()
        ),
        None => RawImage::new(width, height, &ints, has_alpha)
    };

    let image = match image {
        Ok(image) => image,
        Err(error) => {
            ints.release();
            return Err(error);
        }
    };

    ints.release();

    Ok(Some(image))
}
