// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `scancrop preview`

use std::path::Path;

use image::DynamicImage;
use scancrop_core::Settings;
use scancrop_core::error::{Result, ScanCropError};
use scancrop_core::types::CropRect;
use scancrop_imaging::ImageProcessor;
use scancrop_imaging::crop::find_darkest;

use super::{apply_input, apply_params, display_name, print_progress};
use crate::cli::{InputArgs, ParamArgs, SelectArgs};
use crate::state::Session;

/// Returns the crop rectangle of the selected image, if any.
pub fn run(
    settings: &mut Settings,
    input: &InputArgs,
    select: &SelectArgs,
    params: &ParamArgs,
    overlay: Option<&Path>,
) -> Result<Option<CropRect>> {
    apply_input(settings, input);
    apply_params(settings, params);
    let mut session = Session::from_settings(settings)?;

    if select.darkest {
        let darkest = find_darkest(session.source(), |done, total| {
            print_progress("Scanning", done, total)
        })
        .ok_or_else(|| ScanCropError::NoImages(session.source().folder().to_path_buf()))?;
        session.go_to(darkest.index);
        println!("Darkest image (avg brightness: {}).", darkest.mean as u32);
    } else if let Some(index) = select.index {
        session.go_to(index);
    } else if select.next {
        session.next();
    } else if select.prev {
        session.prev();
    } else if select.skip_forward {
        session.skip_forward();
    } else if select.skip_back {
        session.skip_back();
    }
    settings.current_index = session.index();

    let name = display_name(session.current_path()?);
    let (preview, rect) = session.preview()?;
    println!("[{}/{}] {name}", session.index() + 1, session.len());
    match rect {
        Some(rect) => println!(
            "  crop {rect} (threshold {}, margin {})",
            session.params.threshold, session.params.margin
        ),
        None => println!(
            "  no bright object above threshold {}",
            session.params.threshold
        ),
    }

    if let Some(path) = overlay {
        ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(preview)).save(path)?;
        println!("  preview written to {}", path.display());
    }
    Ok(rect)
}
