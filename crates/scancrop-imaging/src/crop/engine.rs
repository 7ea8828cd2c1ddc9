// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Auto-crop engine — global threshold, largest external contour, margin
// expansion. Pure functions of their inputs.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::map::map_colors;
use imageproc::point::Point;
use scancrop_core::types::{CropParameters, CropRect};
use tracing::{debug, instrument, trace};

use crate::raster::processor::to_gray;

/// Compute the crop rectangle for `image`.
///
/// ## Pipeline
///
/// 1. Convert to 8-bit grayscale (gray images are used as-is)
/// 2. Binarize: intensity > `threshold` becomes 255, everything else 0
/// 3. Find the external contours of the mask
/// 4. Keep the contour with the largest enclosed area; on ties the first one
///    found in raster order wins
/// 5. Take its axis-aligned bounding rectangle
/// 6. Grow it by `margin` and clamp to the image
///
/// Returns `None` when the mask has no foreground at all.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn compute_crop_rect(image: &DynamicImage, threshold: u8, margin: u32) -> Option<CropRect> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return None;
    }

    let gray = to_gray(image);
    let mask = binarize(&gray, threshold);

    let Some(contour) = largest_external_contour(&mask) else {
        debug!("No bright object detected");
        return None;
    };
    let bbox = bounding_rect(&contour.points)?;
    let rect = expand_with_margin(bbox, margin, width, height);

    debug!(bbox = %bbox, rect = %rect, "Crop rectangle computed");
    Some(rect)
}

/// [`compute_crop_rect`] driven by a [`CropParameters`] value.
pub fn crop_rect_for(image: &DynamicImage, params: &CropParameters) -> Option<CropRect> {
    compute_crop_rect(image, params.threshold, params.margin)
}

/// Simple global binarization: strictly brighter than `threshold` is 255.
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    map_colors(gray, |pixel: Luma<u8>| {
        if pixel.0[0] > threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Outer border with the largest shoelace area among the top-level
/// (parentless) contours of `mask`.
///
/// Everything outside the image counts as background, so objects touching an
/// edge still get an outer border. Points are in `mask` coordinates.
pub fn largest_external_contour(mask: &GrayImage) -> Option<Contour<u32>> {
    let mut best: Option<(f64, Contour<u32>)> = None;

    // find_contours only opens an outer border after a background pixel on the
    // same row, so foreground in column 0 would never be traced.
    let padded = pad_with_background(mask);

    for mut contour in find_contours::<u32>(&padded) {
        if contour.parent.is_some() || !matches!(contour.border_type, BorderType::Outer) {
            continue;
        }
        let area = contour_area(&contour.points);
        trace!(area, points = contour.points.len(), "External contour");

        let is_better = match &best {
            Some((best_area, _)) => area > *best_area,
            None => true,
        };
        if is_better {
            for point in &mut contour.points {
                point.x -= 1;
                point.y -= 1;
            }
            best = Some((area, contour));
        }
    }

    best.map(|(_, contour)| contour)
}

/// Copy of `mask` framed by a one-pixel background border.
fn pad_with_background(mask: &GrayImage) -> GrayImage {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut padded, mask, 1, 1);
    padded
}

/// Smallest axis-aligned rectangle containing every point, inclusive of the
/// boundary pixels. `None` for an empty point set.
pub fn bounding_rect(points: &[Point<u32>]) -> Option<CropRect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(CropRect::new(
        min_x,
        min_y,
        max_x - min_x + 1,
        max_y - min_y + 1,
    ))
}

/// Grow `bbox` by `margin` and clamp it to a `width` x `height` image.
///
/// The far edge is measured from the already-shifted origin
/// (`x2 = x' + w + 2 * margin`), so an unclamped box gets `margin` on every
/// side while a box pushed against the left/top edge keeps its full
/// `w + 2 * margin` extent.
pub fn expand_with_margin(bbox: CropRect, margin: u32, width: u32, height: u32) -> CropRect {
    let x = bbox.x.saturating_sub(margin).min(width);
    let y = bbox.y.saturating_sub(margin).min(height);

    let grow = 2 * margin as u64;
    let x2 = (x as u64 + bbox.width as u64 + grow).min(width as u64) as u32;
    let y2 = (y as u64 + bbox.height as u64 + grow).min(height as u64) as u32;

    CropRect::new(x, y, x2 - x, y2 - y)
}

/// Area enclosed by a contour polygon, via the shoelace formula.
fn contour_area(points: &[Point<u32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0f64;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x as f64 * points[j].y as f64;
        area -= points[j].x as f64 * points[i].y as f64;
    }
    area.abs() / 2.0
}

// -- Tests --------------------------------------------------------------------
