// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition session manager: one lazily created session per job (or per
// file in batch mode), released on every exit path.

use image::DynamicImage;
use pagescribe_core::error::{Result, ScribeError};
use pagescribe_core::traits::{ProgressObserver, RecognitionEngine, RecognitionSession};
use tracing::{info, instrument, warn};

/// Owns at most one recognition session.
///
/// The session is created on the first page that needs recognition and is
/// terminated exactly once, either by [`release`](Self::release) or when the
/// manager is dropped. A failed creation is remembered: later pages get the
/// same error without another attempt.
pub struct RecognitionSessionManager<'e> {
    engine: &'e dyn RecognitionEngine,
    language: String,
    session: Option<Box<dyn RecognitionSession>>,
    init_error: Option<String>,
    attempted: bool,
}

impl<'e> RecognitionSessionManager<'e> {
    pub fn new(engine: &'e dyn RecognitionEngine, language: &str) -> Self {
        Self {
            engine,
            language: language.to_string(),
            session: None,
            init_error: None,
            attempted: false,
        }
    }

    /// Return the job's session, creating it on first use.
    #[instrument(skip_all, fields(language = %self.language))]
    pub fn ensure_session(
        &mut self,
        observer: &dyn ProgressObserver,
    ) -> Result<&mut dyn RecognitionSession> {
        if let Some(reason) = &self.init_error {
            return Err(ScribeError::SessionInit(reason.clone()));
        }
        if self.session.is_none() {
            if self.attempted {
                return Err(ScribeError::SessionInit(
                    "recognition session already released for this job".into(),
                ));
            }
            self.attempted = true;
            observer.on_status(&format!(
                "loading recognition models ({})",
                self.language
            ));
            match self.engine.create_session(&self.language) {
                Ok(session) => {
                    info!("Recognition session created");
                    self.session = Some(session);
                }
                Err(err) => {
                    let reason = match err {
                        ScribeError::SessionInit(reason) => reason,
                        other => other.to_string(),
                    };
                    warn!(%reason, "Recognition session could not be created");
                    self.init_error = Some(reason.clone());
                    return Err(ScribeError::SessionInit(reason));
                }
            }
        }
        match self.session.as_deref_mut() {
            Some(session) => Ok(session),
            None => Err(ScribeError::SessionInit("no recognition session".into())),
        }
    }

    /// Recognize one raster, creating the session if needed. Output is trimmed.
    pub fn recognize(
        &mut self,
        image: &DynamicImage,
        observer: &dyn ProgressObserver,
    ) -> Result<String> {
        let session = self.ensure_session(observer)?;
        Ok(session.recognize(image)?.trim().to_string())
    }

    /// Terminate the session if one was created. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.terminate();
            info!(language = %self.language, "Recognition session released");
        }
    }
}

impl Drop for RecognitionSessionManager<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
