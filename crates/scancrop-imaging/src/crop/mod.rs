// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Auto-crop: rectangle detection, threshold calibration and preview overlay.

pub mod calibrate;
pub mod engine;
pub mod overlay;

pub use calibrate::{DarkestImage, RegionSample, find_darkest, sample_region};
pub use engine::{compute_crop_rect, crop_rect_for};
pub use overlay::render_preview;
