// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Browsing session — the folder being worked on, the current image and its
// preview viewport.

use std::path::Path;

use image::RgbImage;
use scancrop_core::Settings;
use scancrop_core::error::{Result, ScanCropError};
use scancrop_core::types::{CropParameters, CropRect};
use scancrop_imaging::crop::{crop_rect_for, render_preview};
use scancrop_imaging::{ImageProcessor, ImageSource, Viewport};
use tracing::{info, warn};

/// Jump size of the "skip" navigation.
pub const SKIP_STEP: usize = 10;

/// Navigation state over an [`ImageSource`].
///
/// `index` is always a valid index of a non-empty source.
#[derive(Debug)]
pub struct Session {
    source: ImageSource,
    index: usize,
    pub params: CropParameters,
    pub viewport: Viewport,
    current: Option<ImageProcessor>,
}

impl Session {
    /// Open the input folder and start at the first image.
    pub fn open(folder: &Path, params: CropParameters) -> Result<Self> {
        let source = ImageSource::scan_non_empty(folder)?;
        Ok(Self::with_source(source, params))
    }

    /// Session over an already scanned source. The source must not be empty.
    pub fn with_source(source: ImageSource, params: CropParameters) -> Self {
        Self {
            source,
            index: 0,
            params,
            viewport: Viewport::default(),
            current: None,
        }
    }

    /// Open the input folder stored in `settings` at its remembered image.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let folder = settings
            .input_folder()
            .ok_or(ScanCropError::MissingFolder("input"))?;
        let mut session = Self::open(folder, settings.crop_parameters())?;
        session.go_to(settings.current_index);
        Ok(session)
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn current_path(&self) -> Result<&Path> {
        self.source.path(self.index)
    }

    // -- Navigation -----------------------------------------------------------

    /// Move to `index`, clamped to the folder. Returns the index actually
    /// selected.
    pub fn go_to(&mut self, index: usize) -> usize {
        let clamped = index.min(self.source.len().saturating_sub(1));
        if clamped != index {
            warn!(requested = index, clamped, "Image index clamped");
        }
        if clamped != self.index {
            self.current = None;
        }
        self.index = clamped;
        clamped
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.index.saturating_add(1))
    }

    pub fn prev(&mut self) -> usize {
        self.go_to(self.index.saturating_sub(1))
    }

    pub fn skip_forward(&mut self) -> usize {
        self.go_to(self.index.saturating_add(SKIP_STEP))
    }

    pub fn skip_back(&mut self) -> usize {
        self.go_to(self.index.saturating_sub(SKIP_STEP))
    }

    // -- Current image ----------------------------------------------------------

    /// Decode the current image (once) and fit the viewport to it.
    pub fn load_current(&mut self) -> Result<&ImageProcessor> {
        let processor = match self.current.take() {
            Some(processor) => processor,
            None => {
                let processor = self.source.load(self.index)?;
                self.viewport.fit(processor.width(), processor.height());
                info!(
                    index = self.index,
                    width = processor.width(),
                    height = processor.height(),
                    "Current image loaded"
                );
                processor
            }
        };
        Ok(self.current.insert(processor))
    }

    /// Crop rectangle of the current image under the session parameters.
    pub fn crop_rect(&mut self) -> Result<Option<CropRect>> {
        let params = self.params;
        let image = self.load_current()?;
        Ok(crop_rect_for(image.as_dynamic(), &params))
    }

    /// Current image with the proposed crop outlined.
    pub fn preview(&mut self) -> Result<(RgbImage, Option<CropRect>)> {
        let rect = self.crop_rect()?;
        let image = self.load_current()?;
        Ok((render_preview(image.as_dynamic(), rect), rect))
    }
}
