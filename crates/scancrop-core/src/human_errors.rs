// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operator-facing error messages.
//
// Every technical error is mapped to a short plain-English message plus a
// suggestion. Severity drives how the front end presents it.

use crate::error::ScanCropError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing was changed, but the operation can simply be repeated.
    Warning,
    /// The operator must do something first (pick a folder, fix an argument).
    ActionRequired,
    /// The input itself is unusable; retrying will not help.
    Permanent,
    /// Environmental hiccup (disk, worker); trying again may succeed.
    Transient,
}

/// A human-readable error with message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// One-line summary.
    pub message: String,
    /// What the operator should try next.
    pub suggestion: String,
    /// Whether repeating the same operation might succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ScanCropError` into a `HumanError`.
pub fn humanize_error(err: &ScanCropError) -> HumanError {
    match err {
        ScanCropError::Decode { path, .. } => HumanError {
            message: format!("Could not load image: {}", path.display()),
            suggestion: "The file may be damaged or in an unsupported variant. Open it in an image viewer to check it.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanCropError::Encode { path, reason } => HumanError {
            message: format!("Could not save {}", path.display()),
            suggestion: format!("Check that the output folder is writable and has free space. ({reason})"),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanCropError::NoBrightObject(path) => HumanError {
            message: format!("No bright object found in {}.", path.display()),
            suggestion: "Lower the brightness threshold, or calibrate it from a region of the object.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanCropError::MissingFolder(which) => HumanError {
            message: "Missing folder.".into(),
            suggestion: format!("Please select both input and output folders (the {which} folder is not set)."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanCropError::NoImages(folder) => HumanError {
            message: "No images found.".into(),
            suggestion: format!(
                "No .tif, .tiff, .jpg, .jpeg or .png files were found in {}. Extensions are matched case-sensitively.",
                folder.display()
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanCropError::IndexOutOfRange { len, .. } => HumanError {
            message: "That image does not exist.".into(),
            suggestion: format!("Choose an index between 0 and {}.", len.saturating_sub(1)),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanCropError::SelectionTooSmall => HumanError {
            message: "Selected area is too small.".into(),
            suggestion: "Select a region at least one image pixel wide and tall. The threshold was not changed.".into(),
            retriable: true,
            severity: Severity::Warning,
        },

        ScanCropError::InvalidArgument(detail) => HumanError {
            message: "That value isn't valid.".into(),
            suggestion: detail.clone(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanCropError::WorkerFailed(detail) => HumanError {
            message: "Batch processing stopped unexpectedly.".into(),
            suggestion: format!("Try again. Images already written are kept. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanCropError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The folder or file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Select it again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Permission denied.".into(),
                suggestion: "Check the folder permissions, or choose a different location.".into(),
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

        ScanCropError::Serialization(_) => HumanError {
            message: "The settings file could not be written.".into(),
            suggestion: "Try again. If this keeps happening, delete the settings file to start fresh.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn small_selection_is_a_warning() {
        let human = humanize_error(&ScanCropError::SelectionTooSmall);
        assert_eq!(human.severity, Severity::Warning);
        assert!(human.retriable);
    }

    #[test]
    fn missing_folder_is_action_required() {
        let human = humanize_error(&ScanCropError::MissingFolder("input"));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("input"));
    }

    #[test]
    fn undecodable_image_is_permanent() {
        let err = ScanCropError::Decode {
            path: PathBuf::from("/scans/broken.tif"),
            reason: "unexpected EOF".into(),
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.message.contains("broken.tif"));
    }

    #[test]
    fn index_suggestion_names_last_valid_index() {
        let human = humanize_error(&ScanCropError::IndexOutOfRange { index: 9, len: 4 });
        assert!(human.suggestion.contains("between 0 and 3"));
    }
}
