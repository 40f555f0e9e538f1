// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command-line front end.
//
// Every technical error is mapped to a plain sentence with a suggestion. The
// severity decides the exit code and whether a retry makes sense.

use crate::error::ScribeError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Running the same command again may succeed.
    Transient,
    /// The user must change something (flags, config, model files).
    ActionRequired,
    /// Retrying will not help; the input itself is unusable.
    Permanent,
}

impl Severity {
    /// Process exit code, following the BSD `sysexits` conventions.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Transient => 75,      // EX_TEMPFAIL
            Self::ActionRequired => 78, // EX_CONFIG
            Self::Permanent => 65,      // EX_DATAERR
        }
    }
}

/// A human-readable error with a plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ScribeError` into a `HumanError`.
pub fn humanize_error(err: &ScribeError) -> HumanError {
    match err {
        ScribeError::DocumentLoad(detail) | ScribeError::Pdf(detail) => HumanError {
            message: "This PDF could not be read.".into(),
            suggestion: format!(
                "The file may be damaged or encrypted. Try opening it in a PDF viewer first. ({detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScribeError::PageProcessing { page, detail } => HumanError {
            message: format!("Page {page} could not be transcribed."),
            suggestion: format!("Try a higher --scale or enable --binarize. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        ScribeError::SessionInit(detail) => HumanError {
            message: "Text recognition could not start.".into(),
            suggestion: format!(
                "Check that the recognition models are installed (see --model-dir) and that \
                 the binary was built with the `ocr` feature. ({detail})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScribeError::JobAlreadyRunning => HumanError {
            message: "Another transcription is still running.".into(),
            suggestion: "Wait for it to finish or cancel it, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScribeError::Image(_) => HumanError {
            message: "A page image could not be processed.".into(),
            suggestion: "The embedded scan may use an unsupported encoding.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScribeError::Ocr(_) => HumanError {
            message: "Text recognition failed on a page.".into(),
            suggestion: "Try a higher --scale, or enable --binarize for faint scans.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScribeError::InvalidConfig(detail) => HumanError {
            message: "The settings are not valid.".into(),
            suggestion: format!("Fix the configuration file or command-line flags. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScribeError::UnknownFormat(format) => HumanError {
            message: format!("\"{format}\" is not a known output format."),
            suggestion: "Use one of: txt, md, csv, json.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScribeError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "Check the path and try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Permission denied while reading or writing a file.".into(),
                suggestion: "Check the file permissions or choose another output directory.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        ScribeError::Serialization(_) => HumanError {
            message: "The configuration file is not valid JSON.".into(),
            suggestion: "Fix the syntax or delete the file to fall back to defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_init_requires_action() {
        let human = humanize_error(&ScribeError::SessionInit("models missing".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
        assert!(human.suggestion.contains("models missing"));
    }

    #[test]
    fn broken_pdf_is_permanent() {
        let human = humanize_error(&ScribeError::DocumentLoad("bad xref".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = ScribeError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn exit_codes_differ_by_severity() {
        let unknown = humanize_error(&ScribeError::UnknownFormat("docx".into()));
        assert_eq!(unknown.severity.exit_code(), 78);
        let broken = humanize_error(&ScribeError::DocumentLoad("bad xref".into()));
        assert_eq!(broken.severity.exit_code(), 65);
        assert_eq!(humanize_error(&ScribeError::JobAlreadyRunning).severity.exit_code(), 75);
    }

    #[test]
    fn page_error_mentions_page_number() {
        let err = ScribeError::PageProcessing {
            page: 7,
            detail: "no image".into(),
        };
        assert_eq!(humanize_error(&err).message, "Page 7 could not be transcribed.");
    }
}
