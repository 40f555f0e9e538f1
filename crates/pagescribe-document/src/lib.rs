// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagescribe-document — Document adapters for the Pagescribe pipeline.
//
// Implements the `pagescribe-core` boundary traits: PDF loading and page
// access with `lopdf`, raster decoding and binarization with `image` and
// `imageproc`, and (behind the `ocr` feature) recognition with `ocrs`.

pub mod image;
pub mod pdf;
pub mod scan;

// Re-export the primary structs so callers can use `pagescribe_document::PdfOpener` etc.
pub use self::image::processor::RasterProcessor;
pub use pdf::reader::{PdfOpener, PdfReader};
pub use scan::engine::{UnavailableEngine, default_engine};
pub use scan::enhance::ScanEnhancer;

#[cfg(feature = "ocr")]
pub use scan::ocr::OcrsEngine;
