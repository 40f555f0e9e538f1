// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster processor: decodes the sample data of embedded PDF images and
// scales the result to the requested page raster size. Operates on in-memory
// images using the `image` crate.

use image::{DynamicImage, GenericImageView, GrayImage, RgbImage};
use pagescribe_core::error::ScribeError;
use tracing::{debug, instrument};

/// Largest raster, in pixels, that will be decoded or produced.
pub const MAX_RASTER_PIXELS: u64 = 100_000_000;

/// Reject raster dimensions above [`MAX_RASTER_PIXELS`].
pub fn check_raster_size(width: u32, height: u32) -> Result<(), ScribeError> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_RASTER_PIXELS {
        return Err(ScribeError::Image(format!(
            "raster of {}x{} pixels exceeds the {} pixel limit",
            width, height, MAX_RASTER_PIXELS
        )));
    }
    Ok(())
}

/// Colour model of raw (non-JPEG) image samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleLayout {
    Gray,
    Rgb,
    Cmyk,
}

impl SampleLayout {
    /// Number of colour components per pixel.
    pub fn components(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Cmyk => 4,
        }
    }
}

/// Raster pipeline operating on a single in-memory page image.
///
/// Each method consumes `self` and returns a new `RasterProcessor`, enabling
/// method chaining:
///
/// ```ignore
/// let page = RasterProcessor::from_encoded(&jpeg_bytes)?
///     .scale_to(1190, 1684)
///     .into_dynamic();
/// ```
pub struct RasterProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl RasterProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode a self-describing encoded image (JPEG from `DCTDecode`, PNG, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_encoded(data: &[u8]) -> Result<Self, ScribeError> {
        let img = image::load_from_memory(data).map_err(|err| {
            ScribeError::Image(format!("failed to decode embedded image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Embedded image decoded"
        );
        Ok(Self { image: img })
    }

    /// Build an image from raw, uncompressed PDF samples.
    ///
    /// Supports 8 bits per component in every layout and 1 bit per component
    /// for grayscale (rows padded to a byte boundary, 0 = black).
    pub fn from_samples(
        data: &[u8],
        width: u32,
        height: u32,
        bits_per_component: u8,
        layout: SampleLayout,
    ) -> Result<Self, ScribeError> {
        if width == 0 || height == 0 {
            return Err(ScribeError::Image(format!(
                "embedded image has empty dimensions {}x{}",
                width, height
            )));
        }
        check_raster_size(width, height)?;

        let image = match (bits_per_component, layout) {
            (8, SampleLayout::Gray) => {
                let expected = width as usize * height as usize;
                let pixels = take_exact(data, expected)?;
                GrayImage::from_raw(width, height, pixels)
                    .map(DynamicImage::ImageLuma8)
            }
            (8, SampleLayout::Rgb) => {
                let expected = width as usize * height as usize * 3;
                let pixels = take_exact(data, expected)?;
                RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
            }
            (8, SampleLayout::Cmyk) => {
                let expected = width as usize * height as usize * 4;
                let pixels = take_exact(data, expected)?;
                let rgb: Vec<u8> = pixels.chunks_exact(4).flat_map(cmyk_to_rgb).collect();
                RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
            }
            (1, SampleLayout::Gray) => {
                let row_bytes = (width as usize).div_ceil(8);
                let packed = take_exact(data, row_bytes * height as usize)?;
                let mut pixels = Vec::with_capacity(width as usize * height as usize);
                for row in packed.chunks_exact(row_bytes) {
                    for x in 0..width as usize {
                        let bit = (row[x / 8] >> (7 - (x % 8))) & 1;
                        pixels.push(if bit == 1 { 255 } else { 0 });
                    }
                }
                GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
            }
            (bits, layout) => {
                return Err(ScribeError::Image(format!(
                    "unsupported sample format: {} bits per component, {:?}",
                    bits, layout
                )));
            }
        };

        image
            .map(|image| Self { image })
            .ok_or_else(|| ScribeError::Image("sample buffer does not match dimensions".into()))
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Resize to exactly `width` x `height`. A no-op when the size already
    /// matches; a zero dimension leaves the image untouched.
    #[instrument(skip(self), fields(width, height))]
    pub fn scale_to(self, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 || (width, height) == self.image.dimensions() {
            return self;
        }
        debug!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            width,
            height,
            "Scaling page raster"
        );
        let resized =
            self.image
                .resize_exact(width, height, image::imageops::FilterType::Triangle);
        Self { image: resized }
    }
}

/// Copy exactly `expected` bytes out of `data`, rejecting short buffers.
/// Trailing padding bytes are ignored.
fn take_exact(data: &[u8], expected: usize) -> Result<Vec<u8>, ScribeError> {
    if data.len() < expected {
        return Err(ScribeError::Image(format!(
            "image data truncated: expected {} bytes, found {}",
            expected,
            data.len()
        )));
    }
    Ok(data[..expected].to_vec())
}

/// Naive CMYK → RGB conversion (no colour profile).
fn cmyk_to_rgb(px: &[u8]) -> [u8; 3] {
    let k = 255 - px[3] as u16;
    let channel = |c: u8| ((255 - c as u16) * k / 255) as u8;
    [channel(px[0]), channel(px[1]), channel(px[2])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_samples_round_into_luma_image() {
        let data = [0u8, 64, 128, 255];
        let raster = RasterProcessor::from_samples(&data, 2, 2, 8, SampleLayout::Gray).unwrap();
        let luma = raster.into_dynamic().to_luma8();
        assert_eq!(luma.get_pixel(1, 1).0[0], 255);
        assert_eq!(luma.get_pixel(1, 0).0[0], 64);
    }

    #[test]
    fn one_bit_rows_are_byte_padded() {
        // 3 pixels wide: row 0 = 1,0,1 ; row 1 = 0,1,0
        let data = [0b1010_0000u8, 0b0100_0000u8];
        let raster = RasterProcessor::from_samples(&data, 3, 2, 1, SampleLayout::Gray).unwrap();
        let luma = raster.into_dynamic().to_luma8();
        assert_eq!(luma.get_pixel(0, 0).0[0], 255);
        assert_eq!(luma.get_pixel(1, 0).0[0], 0);
        assert_eq!(luma.get_pixel(1, 1).0[0], 255);
    }

    #[test]
    fn oversized_declared_dimensions_are_rejected() {
        let result =
            RasterProcessor::from_samples(&[0u8; 16], 1_000_000, 1_000_000, 8, SampleLayout::Gray);
        assert!(matches!(result, Err(ScribeError::Image(msg)) if msg.contains("pixel limit")));
    }

    #[test]
    fn truncated_samples_are_rejected() {
        let result = RasterProcessor::from_samples(&[0u8; 5], 2, 2, 8, SampleLayout::Rgb);
        assert!(matches!(result, Err(ScribeError::Image(_))));
    }

    #[test]
    fn unsupported_depth_is_rejected() {
        let result = RasterProcessor::from_samples(&[0u8; 16], 2, 2, 16, SampleLayout::Gray);
        assert!(result.is_err());
    }

    #[test]
    fn cmyk_white_and_black() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0]), [255, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 255]), [0, 0, 0]);
    }

    #[test]
    fn scale_to_changes_dimensions() {
        let raster = RasterProcessor::from_samples(&[128u8; 4], 2, 2, 8, SampleLayout::Gray)
            .unwrap()
            .scale_to(6, 4);
        assert_eq!((raster.width(), raster.height()), (6, 4));
    }
}
