// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Threshold calibration — from a sampled region or from the darkest image.

use std::path::PathBuf;

use image::DynamicImage;
use scancrop_core::error::Result;
use scancrop_core::types::CropRect;
use tracing::{debug, info, instrument, warn};

use crate::raster::processor::{mean_intensity, to_gray};
use crate::source::ImageSource;
use crate::viewport::SourceRegion;

/// Result of sampling a region of the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSample {
    /// Pixels actually sampled.
    pub rect: CropRect,
    /// Mean grayscale intensity over `rect`.
    pub mean: f64,
    /// `mean` rounded to the nearest integer.
    pub threshold: u8,
}

/// Derive a threshold from the mean brightness of `region`.
///
/// The region is clamped to the image; anything smaller than one source
/// pixel fails with `SelectionTooSmall` and the caller keeps its threshold.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn sample_region(image: &DynamicImage, region: SourceRegion) -> Result<RegionSample> {
    let rect = region.to_pixel_rect(image.width(), image.height())?;
    let patch = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
    let mean = mean_intensity(&to_gray(&patch));
    let threshold = mean.round().clamp(0.0, 255.0) as u8;

    info!(rect = %rect, mean, threshold, "Threshold sampled from region");
    Ok(RegionSample {
        rect,
        mean,
        threshold,
    })
}

/// The image with the lowest mean brightness in a folder.
#[derive(Debug, Clone, PartialEq)]
pub struct DarkestImage {
    pub index: usize,
    pub path: PathBuf,
    pub mean: f64,
}

/// Scan every image in `source` for the lowest mean grayscale intensity.
///
/// Undecodable files are logged and skipped. Ties keep the earlier image.
/// `on_progress(done, total)` is called after each file. Returns `None` if
/// no image could be decoded.
#[instrument(skip_all, fields(folder = %source.folder().display(), count = source.len()))]
pub fn find_darkest(
    source: &ImageSource,
    mut on_progress: impl FnMut(usize, usize),
) -> Option<DarkestImage> {
    let total = source.len();
    let mut darkest: Option<DarkestImage> = None;

    for (index, path) in source.paths().iter().enumerate() {
        match source.load(index) {
            Ok(processor) => {
                let mean = processor.mean_intensity();
                debug!(index, mean, "Image brightness");
                let is_darker = darkest.as_ref().is_none_or(|d| mean < d.mean);
                if is_darker {
                    darkest = Some(DarkestImage {
                        index,
                        path: path.clone(),
                        mean,
                    });
                }
            }
            Err(err) => warn!(path = %path.display(), error = %err, "Skipping undecodable image"),
        }
        on_progress(index + 1, total);
    }

    if let Some(d) = &darkest {
        info!(index = d.index, mean = d.mean, "Darkest image found");
    }
    darkest
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use scancrop_core::error::ScanCropError;

    #[test]
    fn uniform_region_gives_its_value() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 30, Luma([137u8])));
        let sample = sample_region(&img, SourceRegion::from_xywh(5.0, 5.0, 10.0, 10.0)).unwrap();
        assert_eq!(sample.threshold, 137);
        assert_eq!(sample.rect, CropRect::new(5, 5, 10, 10));
    }

    #[test]
    fn mean_is_rounded_not_truncated() {
        // Three pixels at 11, one at 10: mean 10.75.
        let mut img = GrayImage::from_pixel(2, 2, Luma([11u8]));
        img.put_pixel(0, 0, Luma([10u8]));
        let sample =
            sample_region(&DynamicImage::ImageLuma8(img), SourceRegion::from_xywh(0.0, 0.0, 2.0, 2.0))
                .unwrap();
        assert!((sample.mean - 10.75).abs() < 1e-9);
        assert_eq!(sample.threshold, 11);
    }

    #[test]
    fn only_the_region_is_sampled() {
        let mut img = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));
        for y in 10..20 {
            for x in 10..20 {
                img.put_pixel(x, y, Rgb([200, 200, 200]));
            }
        }
        let sample = sample_region(
            &DynamicImage::ImageRgb8(img),
            SourceRegion::from_corners((25.0, 25.0), (10.0, 10.0)),
        )
        .unwrap();
        assert_eq!(sample.rect, CropRect::new(10, 10, 10, 10));
        assert_eq!(sample.threshold, 200);
    }

    #[test]
    fn tiny_or_outside_regions_are_rejected() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(20, 20));
        for region in [
            SourceRegion::from_xywh(3.0, 3.0, 0.5, 10.0),
            SourceRegion::from_xywh(30.0, 30.0, 5.0, 5.0),
        ] {
            assert!(matches!(
                sample_region(&img, region),
                Err(ScanCropError::SelectionTooSmall)
            ));
        }
    }

    #[test]
    fn darkest_image_ignores_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        for (name, value) in [("a.png", 180u8), ("b.png", 40), ("d.png", 90)] {
            GrayImage::from_pixel(8, 8, Luma([value]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("c.png"), b"corrupt").unwrap();

        let source = ImageSource::scan(dir.path()).unwrap();
        let mut calls = Vec::new();
        let darkest = find_darkest(&source, |done, total| calls.push((done, total))).unwrap();

        assert_eq!(darkest.index, 1);
        assert!(darkest.path.ends_with("b.png"));
        assert!((darkest.mean - 40.0).abs() < 1e-9);
        assert_eq!(calls, [(1, 4), (2, 4), (3, 4), (4, 4)]);
    }

    #[test]
    fn darkest_tie_keeps_first() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["x.png", "y.png"] {
            GrayImage::from_pixel(4, 4, Luma([50u8]))
                .save(dir.path().join(name))
                .unwrap();
        }
        let source = ImageSource::scan(dir.path()).unwrap();
        assert_eq!(find_darkest(&source, |_, _| {}).unwrap().index, 0);
    }

    #[test]
    fn no_decodable_images_gives_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.tif"), b"nope").unwrap();
        let source = ImageSource::scan(dir.path()).unwrap();
        assert_eq!(find_darkest(&source, |_, _| {}), None);
    }
}
