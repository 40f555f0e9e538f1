// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page classifier: chooses between the embedded text layer and recognition.

use pagescribe_core::ExtractionMode;

/// Decide how a page's text is obtained.
///
/// The text layer wins only when it is preferred and its trimmed content has
/// at least `threshold` characters (Unicode scalar values). No normalization
/// happens before counting.
pub fn classify(text_layer: &str, prefer_text_layer: bool, threshold: usize) -> ExtractionMode {
    if prefer_text_layer && text_layer.trim().chars().count() >= threshold {
        ExtractionMode::TextLayer
    } else {
        ExtractionMode::Recognition
    }
}
