// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scancrop.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Scancrop operations.
#[derive(Debug, Error)]
pub enum ScanCropError {
    // -- Image errors --
    #[error("failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("failed to write {}: {reason}", .path.display())]
    Encode { path: PathBuf, reason: String },

    #[error("no bright object found in {}", .0.display())]
    NoBrightObject(PathBuf),

    // -- Workflow errors --
    #[error("no {0} folder selected")]
    MissingFolder(&'static str),

    #[error("no supported images found in {}", .0.display())]
    NoImages(PathBuf),

    #[error("image index {index} out of range (folder has {len} images)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("selected region is smaller than one source pixel")]
    SelectionTooSmall,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("background worker failed: {0}")]
    WorkerFailed(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanCropError>;
