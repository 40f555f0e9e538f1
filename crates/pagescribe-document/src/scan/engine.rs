// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition engine selection. Without the `ocr` feature every session
// creation fails, which the pipeline turns into per-page failures while
// text-layer pages still succeed.

use std::path::Path;

use pagescribe_core::error::ScribeError;
use pagescribe_core::traits::{RecognitionEngine, RecognitionSession};

/// Engine used when no OCR backend is compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEngine;

impl RecognitionEngine for UnavailableEngine {
    fn create_session(
        &self,
        language: &str,
    ) -> pagescribe_core::Result<Box<dyn RecognitionSession>> {
        Err(ScribeError::SessionInit(format!(
            "no OCR engine available for '{}'; rebuild with the `ocr` feature",
            language
        )))
    }
}

/// The best recognition engine this build offers.
///
/// `model_dir` overrides the default `ocrs` model cache directory.
#[cfg(feature = "ocr")]
pub fn default_engine(model_dir: Option<&Path>) -> Box<dyn RecognitionEngine> {
    use crate::scan::ocr::OcrsEngine;
    match model_dir {
        Some(dir) => Box::new(OcrsEngine::from_model_dir(dir)),
        None => Box::new(OcrsEngine::default()),
    }
}

/// The best recognition engine this build offers.
#[cfg(not(feature = "ocr"))]
pub fn default_engine(model_dir: Option<&Path>) -> Box<dyn RecognitionEngine> {
    if let Some(dir) = model_dir {
        tracing::warn!(dir = %dir.display(), "OCR model directory ignored: built without `ocr`");
    }
    Box::new(UnavailableEngine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_engine_reports_session_init() {
        let err = UnavailableEngine.create_session("eng").err().expect("always fails");
        assert!(matches!(err, ScribeError::SessionInit(msg) if msg.contains("eng")));
    }

    #[cfg(not(feature = "ocr"))]
    #[test]
    fn default_engine_without_ocr_cannot_create_sessions() {
        let engine = default_engine(None);
        assert!(engine.create_session("eng").is_err());
    }
}
