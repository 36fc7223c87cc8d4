/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Stream serialization of raw images
//!
//! The wire form is a self-describing JSON header followed by the raw
//! pixel payload, written strictly sequentially:
//!
//! ```text
//! [u32 BE header length]
//! [header bytes: {"width":., "height":., "alpha":., "properties":{..}}]
//! [width * height pixels, each one u32 BE]
//! ```
//!
//! A round-trip reproduces width, height, alpha flag, properties and
//! every pixel bit for bit. The pixel payload streams block by block on
//! encode and fills a freshly pooled blob on decode, so neither direction
//! builds a contiguous pixel array.

use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::sync::Arc;

use pixblock_core::blob::IntBlob;
use pixblock_core::pool::BlockPool;
use serde::{Deserialize, Serialize};

use crate::errors::ImageErrors;
use crate::image::RawImage;
use crate::properties::PropertyMap;

fn fill_payload<R: Read>(
    ints: &IntBlob, source: &mut R, count: usize
) -> Result<(), ImageErrors> {
    let mut view = ints.view_mut()?;
    let mut word = [0_u8; 4];

    for index in 0..count {
        if let Err(error) = source.read_exact(&mut word) {
            return Err(match error.kind() {
                ErrorKind::UnexpectedEof => ImageErrors::TruncatedPayload(index, count),
                _ => ImageErrors::IoErrors(error)
            });
        }

        view.set(index, u32::from_be_bytes(word))?;
    }

    Ok(())
}

/// The self-describing part of a serialized image.
///
/// Serializes to the JSON object at the front of the stream; also usable
/// on its own wherever only the descriptor travels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageHeader {
    pub width:      usize,
    pub height:     usize,
    #[serde(rename = "alpha")]
    pub has_alpha:  bool,
    pub properties: PropertyMap
}

impl RawImage {
    /// Snapshot this image's descriptor.
    pub fn header(&self) -> ImageHeader {
        ImageHeader {
            width: self.width(),
            height: self.height(),
            has_alpha: self.has_alpha(),
            properties: self.properties()
        }
    }

    /// Construct an image from a descriptor plus a blob of matching
    /// length, retaining the blob.
    pub fn from_header(header: &ImageHeader, ints: &IntBlob) -> Result<RawImage, ImageErrors> {
        RawImage::with_properties(
            header.width,
            header.height,
            ints,
            header.has_alpha,
            header.properties.clone()
        )
    }

    /// Write the image to `sink` in the format above.
    pub fn encode_to<W: Write>(&self, sink: W) -> Result<(), ImageErrors> {
        let mut sink = BufWriter::new(sink);

        let header = serde_json::to_vec(&self.header())?;
        let header_len = u32::try_from(header.len())
            .map_err(|_| ImageErrors::GenericString("image header too large".to_string()))?;

        sink.write_all(&header_len.to_be_bytes())?;
        sink.write_all(&header)?;

        let view = self.pixels()?;

        for block in view.blocks() {
            for pixel in block {
                sink.write_all(&pixel.to_be_bytes())?;
            }
        }

        sink.flush()?;

        Ok(())
    }

    /// Read an image in the format above from `source`, allocating its
    /// storage from `pool`.
    ///
    /// The caller owns the single reference to the returned image.
    pub fn decode_from<R: Read>(
        pool: &Arc<BlockPool>, source: R
    ) -> Result<RawImage, ImageErrors> {
        let mut source = BufReader::new(source);

        let mut word = [0_u8; 4];
        source.read_exact(&mut word)?;
        let header_len = u32::from_be_bytes(word) as usize;

        let mut header_bytes = vec![0_u8; header_len];
        source.read_exact(&mut header_bytes)?;
        let header: ImageHeader = serde_json::from_slice(&header_bytes)?;

        if header.width == 0 || header.height == 0 {
            return Err(ImageErrors::ZeroDimension(header.width, header.height));
        }

        let count = header
            .width
            .checked_mul(header.height)
            .ok_or_else(|| ImageErrors::GenericString("pixel count overflows".to_string()))?;

        let ints = IntBlob::alloc(count, pool);
        let filled = fill_payload(&ints, &mut source, count);

        if let Err(error) = filled {
            // reclaim the half-filled blob before surfacing the error
            ints.release();
            return Err(error);
        }

        let image = RawImage::from_header(&header, &ints)?;
        ints.release();

        Ok(image)
    }
}
