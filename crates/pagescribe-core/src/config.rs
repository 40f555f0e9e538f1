// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application and job configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScribeError};

/// Minimum trimmed text-layer length for a page to skip recognition.
pub const DEFAULT_TEXT_THRESHOLD: usize = 30;

/// Luma cut-off used when binarization is enabled.
pub const DEFAULT_BINARIZE_THRESHOLD: u8 = 180;

/// Options controlling paragraph reconstruction of raw page text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionOptions {
    /// Master switch; when false the raw text is passed through untouched.
    pub auto_format: bool,
    pub merge_paragraphs: bool,
    pub remove_duplicate_spaces: bool,
    pub fix_punctuation: bool,
    /// Multiplier applied to the average line length when deciding merges.
    pub line_break_threshold: f32,
}

impl Default for ReconstructionOptions {
    fn default() -> Self {
        Self {
            auto_format: true,
            merge_paragraphs: true,
            remove_duplicate_spaces: true,
            fix_punctuation: true,
            line_break_threshold: 1.5,
        }
    }
}

/// Per-job settings shared by single and batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    /// Page-range expression such as `1-3,5`; empty means all pages.
    pub page_range: String,
    /// Recognition language (e.g. `eng`, `chi_sim`).
    pub language: String,
    /// Scale factor applied when rasterizing a page for recognition.
    pub raster_scale: f32,
    /// Try the embedded text layer before falling back to recognition.
    pub prefer_text_layer: bool,
    /// See [`DEFAULT_TEXT_THRESHOLD`].
    pub text_threshold: usize,
    /// Binarize rasterized pages before recognition.
    pub binarize: bool,
    /// Luma threshold for binarization; 0 selects Otsu's method.
    pub binarize_threshold: u8,
    pub reconstruction: ReconstructionOptions,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            page_range: String::new(),
            language: "eng".into(),
            raster_scale: 2.0,
            prefer_text_layer: true,
            text_threshold: DEFAULT_TEXT_THRESHOLD,
            binarize: false,
            binarize_threshold: DEFAULT_BINARIZE_THRESHOLD,
            reconstruction: ReconstructionOptions::default(),
        }
    }
}

impl JobSettings {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(ScribeError::InvalidConfig(
                "recognition language must not be empty".into(),
            ));
        }
        if !(self.raster_scale.is_finite() && self.raster_scale > 0.0) {
            return Err(ScribeError::InvalidConfig(format!(
                "raster scale must be positive, got {}",
                self.raster_scale
            )));
        }
        let threshold = self.reconstruction.line_break_threshold;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(ScribeError::InvalidConfig(format!(
                "line break threshold must be positive, got {threshold}"
            )));
        }
        Ok(())
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScribeConfig {
    /// Defaults for every job started by the application.
    pub job: JobSettings,
    /// Directory holding the recognition models; `None` uses the engine default.
    pub model_dir: Option<PathBuf>,
}

impl ScribeConfig {
    /// Parse a JSON configuration document. Missing fields take defaults.
    pub fn from_json(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)?;
        config.job.validate()?;
        Ok(config)
    }
}
