// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image source — the ordered list of scans in the input folder.

use std::path::{Path, PathBuf};

use scancrop_core::error::{Result, ScanCropError};
use scancrop_core::types::has_supported_extension;
use tracing::{debug, info, instrument};

use crate::raster::ImageProcessor;

/// Supported images directly inside one folder, sorted by path.
///
/// Only regular files whose extension is one of `tif`, `tiff`, `jpg`, `jpeg`
/// or `png` (exact case) are listed. Subfolders are not searched and hidden
/// files are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSource {
    folder: PathBuf,
    paths: Vec<PathBuf>,
}

impl ImageSource {
    /// Enumerate `folder`. An empty result is not an error here; callers
    /// decide whether to report `NoImages`.
    #[instrument(skip_all, fields(folder = %folder.as_ref().display()))]
    pub fn scan(folder: impl AsRef<Path>) -> Result<Self> {
        let folder = folder.as_ref();
        let mut paths = Vec::new();

        for entry in std::fs::read_dir(folder)? {
            let path = entry?.path();
            if !path.is_file() || is_hidden(&path) || !has_supported_extension(&path) {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        info!(count = paths.len(), "Input folder scanned");
        Ok(Self {
            folder: folder.to_path_buf(),
            paths,
        })
    }

    /// Like [`scan`](Self::scan) but fails with `NoImages` on an empty folder.
    pub fn scan_non_empty(folder: impl AsRef<Path>) -> Result<Self> {
        let source = Self::scan(folder)?;
        if source.is_empty() {
            return Err(ScanCropError::NoImages(source.folder));
        }
        Ok(source)
    }

    /// Build a source from an explicit list of paths (kept in the given order).
    pub fn from_paths(folder: impl Into<PathBuf>, paths: Vec<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            paths,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    /// Path at `index`, or `IndexOutOfRange`.
    pub fn path(&self, index: usize) -> Result<&Path> {
        self.get(index).ok_or(ScanCropError::IndexOutOfRange {
            index,
            len: self.paths.len(),
        })
    }

    /// Decode the image at `index`.
    pub fn load(&self, index: usize) -> Result<ImageProcessor> {
        let path = self.path(index)?;
        debug!(index, path = %path.display(), "Loading image");
        ImageProcessor::open(path)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}
