// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boundary traits for the external collaborators of the pipeline.
//
// The pipeline never parses documents or runs recognition itself. It talks to
// a document source and a recognition engine through these traits; concrete
// adapters live in `pagescribe-document`.

use image::DynamicImage;

use crate::error::Result;
use crate::types::DocumentInfo;

/// Opens raw document bytes.
pub trait DocumentOpener {
    /// Parse `bytes` into a document. `name` is used for display only.
    fn open(&self, name: &str, bytes: &[u8]) -> Result<Box<dyn DocumentSource>>;
}

/// An opened, immutable document.
pub trait DocumentSource {
    fn info(&self) -> &DocumentInfo;

    /// Fetch a page by its 1-based number.
    fn page(&self, number: u32) -> Result<Box<dyn PageHandle + '_>>;
}

/// A single page of an opened document.
pub trait PageHandle {
    /// The embedded text layer, possibly empty.
    fn text_layer(&self) -> Result<String>;

    /// Render the page to a raster image at the given scale factor.
    fn rasterize(&self, scale: f32) -> Result<DynamicImage>;
}

/// Creates recognition sessions. Creation may be slow (model loading).
pub trait RecognitionEngine {
    fn create_session(&self, language: &str) -> Result<Box<dyn RecognitionSession>>;
}

/// A live recognition session bound to one language.
pub trait RecognitionSession {
    fn recognize(&mut self, image: &DynamicImage) -> Result<String>;

    /// Release engine resources. Called exactly once per session.
    fn terminate(&mut self);
}

/// Receives progress and phase updates. Fire-and-forget.
pub trait ProgressObserver {
    /// Overall progress in percent, non-decreasing within a job.
    fn on_progress(&self, percent: f32);

    /// Free-text description of the current phase.
    fn on_status(&self, message: &str);
}
