// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scancrop-imaging — Image side of the scancrop auto-cropper.
//
// Provides the auto-crop engine (threshold, largest external contour, margin),
// threshold calibration (region sample, darkest image), the input folder
// source, the preview viewport and the batch exporter.

pub mod batch;
pub mod crop;
pub mod raster;
pub mod source;
pub mod viewport;

// Re-export the primary items so callers can use `scancrop_imaging::BatchJob` etc.
pub use batch::{BatchEvent, BatchHandle, BatchJob, BatchSummary, CancelToken, process_image};
pub use crop::{compute_crop_rect, crop_rect_for, find_darkest, render_preview, sample_region};
pub use raster::ImageProcessor;
pub use source::ImageSource;
pub use viewport::{Interaction, PointerEvent, SourceRegion, Viewport};
