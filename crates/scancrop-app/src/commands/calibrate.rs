// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `scancrop sample` and `scancrop darkest` — threshold calibration.

use scancrop_core::Settings;
use scancrop_core::error::{Result, ScanCropError};
use scancrop_imaging::crop::{DarkestImage, RegionSample, find_darkest, sample_region};
use scancrop_imaging::viewport::{
    Interaction, InteractionOutcome, PointerEvent, SourceRegion, Viewport,
};
use tracing::warn;

use super::{apply_input, display_name, print_progress};
use crate::cli::InputArgs;
use crate::state::Session;

/// How the operator pointed at the region to sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionInput {
    /// `x, y, width, height` in source pixels.
    Source([f64; 4]),
    /// Pointer drag `x1, y1, x2, y2` on the preview canvas.
    Drag {
        corners: [f64; 4],
        zoom: Option<f64>,
        pan: Option<(f64, f64)>,
    },
}

/// Sample a region of image `index` (or the current image) and store the
/// resulting threshold.
pub fn run_sample(
    settings: &mut Settings,
    input: &InputArgs,
    index: Option<usize>,
    region: RegionInput,
) -> Result<RegionSample> {
    apply_input(settings, input);
    let mut session = Session::from_settings(settings)?;
    if let Some(index) = index {
        session.go_to(index);
    }
    settings.current_index = session.index();
    let sample = sample_current(&mut session, region)?;
    settings.threshold = sample.threshold;
    Ok(sample)
}

/// Find the darkest image, optionally sampling a region of it right away.
pub fn run_darkest(
    settings: &mut Settings,
    input: &InputArgs,
    sample: Option<[f64; 4]>,
) -> Result<DarkestImage> {
    apply_input(settings, input);
    let mut session = Session::from_settings(settings)?;

    let darkest = find_darkest(session.source(), |done, total| {
        print_progress("Scanning", done, total)
    })
    .ok_or_else(|| ScanCropError::NoImages(session.source().folder().to_path_buf()))?;

    session.go_to(darkest.index);
    settings.current_index = darkest.index;
    println!(
        "Darkest image: [{}] {} (avg brightness: {})",
        darkest.index,
        display_name(&darkest.path),
        darkest.mean as u32
    );

    if let Some(region) = sample {
        let result = sample_current(&mut session, RegionInput::Source(region))?;
        settings.threshold = result.threshold;
    } else {
        println!("Use `scancrop sample --index {}` to set the threshold from a region.", darkest.index);
    }
    Ok(darkest)
}

fn sample_current(session: &mut Session, input: RegionInput) -> Result<RegionSample> {
    // Loading also fits the viewport to the image.
    session.load_current()?;

    let region = match input {
        RegionInput::Source([x, y, w, h]) => SourceRegion::from_xywh(x, y, w, h),
        RegionInput::Drag { corners, zoom, pan } => {
            let mut viewport = session.viewport;
            if let Some(zoom) = zoom {
                viewport.set_zoom(zoom);
            }
            if let Some(pan) = pan {
                viewport.set_pan(pan);
            }
            replay_drag(&mut viewport, corners)?
        }
    };

    let image = session.load_current()?;
    let sample = match sample_region(image.as_dynamic(), region) {
        Ok(sample) => sample,
        Err(err) => {
            warn!(?region, "Selection too small, threshold unchanged");
            return Err(err);
        }
    };
    println!(
        "Threshold set to {} from selected region ({}, mean {:.2}).",
        sample.threshold, sample.rect, sample.mean
    );
    Ok(sample)
}

/// Feed a press/drag/release sequence through the pointer state machine.
fn replay_drag(
    viewport: &mut Viewport,
    [x1, y1, x2, y2]: [f64; 4],
) -> Result<SourceRegion> {
    let mut interaction = Interaction::new();
    interaction.arm_selection();
    interaction.handle(viewport, PointerEvent::Press { x: x1, y: y1 });
    interaction.handle(viewport, PointerEvent::Drag { x: x2, y: y2 });
    match interaction.handle(viewport, PointerEvent::Release { x: x2, y: y2 }) {
        Some(InteractionOutcome::RegionSelected(region)) => Ok(region),
        other => Err(ScanCropError::InvalidArgument(format!(
            "drag did not produce a selection ({other:?})"
        ))),
    }
}
