/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible when constructing, decoding or serializing images
use std::fmt::{Debug, Display, Formatter};

use pixblock_core::blob::BlobErrors;

/// All possible image errors that can occur.
///
/// Decoder errors are wrapped from the codec crates; storage errors come
/// from the pooled blob underneath the image.
pub enum ImageErrors {
    /// Jpeg decoding failed
    JpegDecodeErrors(zune_jpeg::errors::DecodeErrors),
    /// Png decoding failed
    PngDecodeErrors(zune_png::error::PngDecodeErrors),
    /// Pooled storage access failed
    BlobErrors(BlobErrors),
    /// Blob length does not match `width * height`
    ///
    /// Carries the expected pixel count and the one found
    DimensionsMisMatch(usize, usize),
    /// A width or height of zero was requested
    ZeroDimension(usize, usize),
    /// The pixel payload of a serialized image ended early
    ///
    /// Carries the number of pixels read and the number expected
    TruncatedPayload(usize, usize),
    /// Reading or writing a serialized image failed
    IoErrors(std::io::Error),
    /// The serialized header could not be read or written
    HeaderErrors(serde_json::Error),
    /// Generic errors which have more context
    GenericString(String)
}

impl Debug for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JpegDecodeErrors(ref error) => {
                writeln!(f, "jpeg decoding failed: {error:?}")
            }
            Self::PngDecodeErrors(ref error) => {
                writeln!(f, "png decoding failed: {error:?}")
            }
            Self::BlobErrors(ref error) => {
                writeln!(f, "{error:?}")
            }
            Self::DimensionsMisMatch(expected, found) => {
                writeln!(
                    f,
                    "dimensions mismatch, expected a blob of {expected} pixels but found {found}"
                )
            }
            Self::ZeroDimension(width, height) => {
                writeln!(f, "image dimensions must be non-zero, got {width}x{height}")
            }
            Self::TruncatedPayload(read, expected) => {
                writeln!(f, "pixel payload ended after {read} of {expected} pixels")
            }
            Self::IoErrors(ref error) => {
                writeln!(f, "i/o error: {error}")
            }
            Self::HeaderErrors(ref error) => {
                writeln!(f, "header error: {error}")
            }
            Self::GenericString(ref error) => {
                writeln!(f, "{error}")
            }
        }
    }
}

impl Display for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <ImageErrors as Debug>::fmt(self, f)
    }
}

impl std::error::Error for ImageErrors {}

impl From<zune_jpeg::errors::DecodeErrors> for ImageErrors {
    fn from(from: zune_jpeg::errors::DecodeErrors) -> Self {
        ImageErrors::JpegDecodeErrors(from)
    }
}

impl From<zune_png::error::PngDecodeErrors> for ImageErrors {
    fn from(from: zune_png::error::PngDecodeErrors) -> Self {
        ImageErrors::PngDecodeErrors(from)
    }
}

impl From<BlobErrors> for ImageErrors {
    fn from(from: BlobErrors) -> Self {
        ImageErrors::BlobErrors(from)
    }
}

impl From<std::io::Error> for ImageErrors {
    fn from(from: std::io::Error) -> Self {
        ImageErrors::IoErrors(from)
    }
}

impl From<serde_json::Error> for ImageErrors {
    fn from(from: serde_json::Error) -> Self {
        ImageErrors::HeaderErrors(from)
    }
}

impl From<String> for ImageErrors {
    fn from(from: String) -> Self {
        ImageErrors::GenericString(from)
    }
}
