// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan enhancement: global binarization of page rasters before they are
// handed to the recognition engine.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use tracing::{debug, instrument};

/// Threshold value that selects an automatic (Otsu) threshold.
pub const AUTO_THRESHOLD: u8 = 0;

/// Prepares rasterized pages for recognition.
///
/// Consumes and returns `self` so operations chain:
///
/// ```ignore
/// let page = ScanEnhancer::from_dynamic(raster).binarize(180).into_dynamic();
/// ```
pub struct ScanEnhancer {
    /// The working image.
    image: DynamicImage,
}

impl ScanEnhancer {
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Borrow the current working image.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the enhancer and return the processed image.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Binarization ---------------------------------------------------------

    /// Convert to black and white with a fixed global threshold.
    ///
    /// Luma is computed with BT.601 weights (0.299, 0.587, 0.114). Pixels
    /// brighter than `threshold` become white, all others black. A threshold
    /// of [`AUTO_THRESHOLD`] delegates to [`binarize_otsu`](Self::binarize_otsu).
    #[instrument(skip(self), fields(width = self.image.width(), height = self.image.height()))]
    pub fn binarize(self, threshold: u8) -> Self {
        if threshold == AUTO_THRESHOLD {
            return self.binarize_otsu();
        }
        let gray = luma_bt601(&self.image);
        Self {
            image: DynamicImage::ImageLuma8(apply_threshold(&gray, threshold)),
        }
    }

    /// Binarize with a threshold derived from the image histogram (Otsu).
    #[instrument(skip(self))]
    pub fn binarize_otsu(self) -> Self {
        let gray = luma_bt601(&self.image);
        let threshold = otsu_level(&gray);
        debug!(threshold, "Otsu threshold computed");
        Self {
            image: DynamicImage::ImageLuma8(apply_threshold(&gray, threshold)),
        }
    }
}

/// Grayscale conversion with fixed BT.601 luma weights.
fn luma_bt601(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut gray = GrayImage::new(width, height);
    for (x, y, px) in rgb.enumerate_pixels() {
        let [r, g, b] = px.0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        gray.put_pixel(x, y, Luma([luma.round().clamp(0.0, 255.0) as u8]));
    }
    gray
}

fn apply_threshold(gray: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut output = GrayImage::new(width, height);
    for (x, y, px) in gray.enumerate_pixels() {
        let binary = if px.0[0] > threshold { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([binary]));
    }
    output
}

// -- Tests --------------------------------------------------------------------
