// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR recognition engine backed by the `ocrs` crate, a pure-Rust OCR engine
// running neural network models via `rten`.
//
// # Feature Gate
//
// Only compiled with the `ocr` feature:
//
// ```toml
// pagescribe-document = { path = "crates/pagescribe-document", features = ["ocr"] }
// ```
//
// # Model Setup
//
// Two model files are required in the model directory:
//
// - `text-detection.rten`: locates text regions.
// - `text-recognition.rten`: decodes characters from those regions.
//
// Running `ocrs-cli` once downloads them to `$XDG_CACHE_HOME/ocrs`, which is
// the default directory.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use pagescribe_core::error::ScribeError;
use pagescribe_core::traits::{RecognitionEngine, RecognitionSession};
use rten::Model;
use tracing::{debug, info, instrument, warn};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Languages the bundled `ocrs` models are trained on.
const SUPPORTED_LANGUAGES: &[&str] = &["eng", "en", "latin"];

/// Default directory for cached OCR model files.
///
/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
pub fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Model locations for an [`OcrsEngine`].
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expects `dir` to contain `text-detection.rten` and `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<(), ScribeError> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(ScribeError::SessionInit(format!(
                    "OCR model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

fn load_model(path: &Path, role: &str) -> Result<Model, ScribeError> {
    info!(role, path = %path.display(), "Loading OCR model");
    Model::load_file(path).map_err(|err| {
        ScribeError::SessionInit(format!(
            "failed to load {} model from {}: {}",
            role,
            path.display(),
            err
        ))
    })
}

/// Recognition engine that creates `ocrs` sessions.
///
/// Construction is cheap; the models are only read when a session is
/// created, so a job that never needs recognition never touches them.
#[derive(Debug, Clone, Default)]
pub struct OcrsEngine {
    config: OcrConfig,
}

impl OcrsEngine {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn from_model_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(OcrConfig::from_dir(dir))
    }
}

impl RecognitionEngine for OcrsEngine {
    /// Load both models and build an engine bound to `language`.
    ///
    /// The `ocrs` models are Latin-script only; other languages still get a
    /// session, with a warning, since the models will usually recover digits
    /// and Latin fragments.
    #[instrument(
        skip_all,
        fields(language = %language, dir = %self.config.detection_model_path.display())
    )]
    fn create_session(
        &self,
        language: &str,
    ) -> pagescribe_core::Result<Box<dyn RecognitionSession>> {
        self.config.validate()?;
        if !SUPPORTED_LANGUAGES.contains(&language.to_ascii_lowercase().as_str()) {
            warn!(language, "OCR models are trained for Latin script only");
        }

        let detection_model = load_model(&self.config.detection_model_path, "detection")?;
        let recognition_model = load_model(&self.config.recognition_model_path, "recognition")?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| {
            ScribeError::SessionInit(format!("failed to initialise OCR engine: {}", err))
        })?;

        info!(language, "OCR session ready");
        Ok(Box::new(OcrsSession {
            engine: Some(engine),
            language: language.to_string(),
        }))
    }
}

/// A loaded `ocrs` engine. Terminating drops the models.
pub struct OcrsSession {
    engine: Option<OcrEngine>,
    language: String,
}

impl RecognitionSession for OcrsSession {
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&mut self, image: &DynamicImage) -> pagescribe_core::Result<String> {
        let engine = self.engine.as_ref().ok_or_else(|| {
            ScribeError::Ocr(format!("{} session already terminated", self.language))
        })?;

        // ocrs expects RGB8.
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            ScribeError::Ocr(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;

        let input = engine
            .prepare_input(source)
            .map_err(|err| ScribeError::Ocr(format!("OCR preprocessing failed: {}", err)))?;
        let text = engine
            .get_text(&input)
            .map_err(|err| ScribeError::Ocr(format!("OCR text recognition failed: {}", err)))?;

        debug!(
            line_count = text.lines().count(),
            char_count = text.chars().count(),
            "OCR recognition complete"
        );
        Ok(text)
    }

    fn terminate(&mut self) {
        if self.engine.take().is_some() {
            info!(language = %self.language, "OCR session terminated");
        }
    }
}
