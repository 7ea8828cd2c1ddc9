// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, crop, grayscale analysis and format-aware saving.
// Operates on in-memory images using the `image` crate.

use std::borrow::Cow;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb};
use imageproc::map::map_colors;
use scancrop_core::error::ScanCropError;
use scancrop_core::types::CropRect;
use tracing::{debug, info, instrument};

/// A single decoded image plus the operations the cropper needs on it.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so calls
/// can be chained:
///
/// ```ignore
/// ImageProcessor::open("scan_001.tif")?
///     .crop(rect)
///     .save(&out_path)?;
/// ```
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScanCropError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|err| ScanCropError::Decode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        debug!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    // -- Analysis -------------------------------------------------------------

    /// Single-channel 8-bit view of the image. Images that are already
    /// `Luma8` are borrowed as-is.
    pub fn luma(&self) -> Cow<'_, GrayImage> {
        to_gray(&self.image)
    }

    /// Mean grayscale intensity over the whole image (0.0 for empty images).
    pub fn mean_intensity(&self) -> f64 {
        mean_intensity(&self.luma())
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Crop to `rect`. The rectangle is clamped to the image bounds.
    #[instrument(skip(self), fields(rect = %rect))]
    pub fn crop(self, rect: CropRect) -> Self {
        let img_w = self.image.width();
        let img_h = self.image.height();

        let safe_x = rect.x.min(img_w);
        let safe_y = rect.y.min(img_h);
        let safe_w = rect.width.min(img_w - safe_x);
        let safe_h = rect.height.min(img_h - safe_y);

        debug!(safe_x, safe_y, safe_w, safe_h, "Cropping image");

        let cropped = self.image.crop_imm(safe_x, safe_y, safe_w, safe_h);
        Self { image: cropped }
    }

    // -- Output ---------------------------------------------------------------

    /// Write the image to `path`. The encoding is chosen from the path's
    /// extension; JPEG output is converted to a channel layout JPEG supports.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScanCropError> {
        let path = path.as_ref();
        let encode_err = |reason: String| ScanCropError::Encode {
            path: path.to_path_buf(),
            reason,
        };

        let format = ImageFormat::from_path(path).map_err(|err| encode_err(err.to_string()))?;
        let encodable = encodable_for(&self.image, format);
        encodable
            .save_with_format(path, format)
            .map_err(|err| encode_err(err.to_string()))?;

        info!(
            width = self.image.width(),
            height = self.image.height(),
            ?format,
            "Image saved"
        );
        Ok(())
    }
}

/// Single-channel 8-bit view of `image`, borrowing when it already is one.
///
/// Colour images use BT.601 weights (0.299 R + 0.587 G + 0.114 B), not the
/// Rec.709 weights of `to_luma8`. Gray images with alpha or 16-bit samples
/// just drop to 8 bits.
pub fn to_gray(image: &DynamicImage) -> Cow<'_, GrayImage> {
    match image {
        DynamicImage::ImageLuma8(gray) => Cow::Borrowed(gray),
        DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => Cow::Owned(image.to_luma8()),
        other => Cow::Owned(map_colors(&other.to_rgb8(), |pixel: Rgb<u8>| {
            let [r, g, b] = pixel.0;
            Luma([bt601_luma(r, g, b)])
        })),
    }
}

/// Rounded integer BT.601 luma.
fn bt601_luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((weighted + 500) / 1000) as u8
}

/// Mean pixel value of a grayscale image.
pub fn mean_intensity(gray: &GrayImage) -> f64 {
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = gray.as_raw().iter().map(|&v| v as u64).sum();
    sum as f64 / count as f64
}

/// JPEG carries neither alpha nor 16-bit samples and TIFF has no gray+alpha
/// layout; everything else is written as-is.
fn encodable_for(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    match (format, image) {
        (ImageFormat::Jpeg, DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_)) => {
            Cow::Borrowed(image)
        }
        (ImageFormat::Jpeg, DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA8(_)) => {
            Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8()))
        }
        (ImageFormat::Jpeg, _) => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
        (ImageFormat::Tiff, DynamicImage::ImageLumaA8(_)) => {
            Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8()))
        }
        (ImageFormat::Tiff, DynamicImage::ImageLumaA16(_)) => {
            Cow::Owned(DynamicImage::ImageRgba16(image.to_rgba16()))
        }
        _ => Cow::Borrowed(image),
    }
}
