// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scancrop auto-cropper.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanCropError};

/// File extensions picked up by a folder scan. Matching is case-sensitive.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["tif", "tiff", "jpg", "jpeg", "png"];

/// Whether `path` carries one of the [`SUPPORTED_EXTENSIONS`] (exact case).
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// Parameters of the auto-crop decision procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropParameters {
    /// Pixels strictly brighter than this are foreground.
    pub threshold: u8,
    /// Padding in pixels added around the detected object.
    pub margin: u32,
}

impl CropParameters {
    pub fn new(threshold: u8, margin: u32) -> Self {
        Self { threshold, margin }
    }
}

impl Default for CropParameters {
    fn default() -> Self {
        Self {
            threshold: 200,
            margin: 30,
        }
    }
}

/// Axis-aligned rectangle in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the rectangle lies inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Output encoding for cropped images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Keep the source file's extension (and therefore its format).
    #[default]
    Original,
    #[serde(rename = "TIFF")]
    Tiff,
    #[serde(rename = "PNG")]
    Png,
    #[serde(rename = "JPG")]
    Jpg,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::Original, Self::Tiff, Self::Png, Self::Jpg];

    /// Extension forced by this format, without the leading dot.
    /// `None` means the source extension is kept.
    pub fn forced_extension(&self) -> Option<&'static str> {
        match self {
            Self::Original => None,
            Self::Tiff => Some("tif"),
            Self::Png => Some("png"),
            Self::Jpg => Some("jpg"),
        }
    }

    /// Name as stored in the settings file.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Tiff => "TIFF",
            Self::Png => "PNG",
            Self::Jpg => "JPG",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputFormat {
    type Err = ScanCropError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "tiff" | "tif" => Ok(Self::Tiff),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            other => Err(ScanCropError::InvalidArgument(format!(
                "unknown output format '{other}' (expected Original, TIFF, PNG or JPG)"
            ))),
        }
    }
}

/// Where and how cropped images are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub output_folder: PathBuf,
    pub filename_prefix: String,
    pub output_format: OutputFormat,
}

impl OutputSpec {
    pub fn new(
        output_folder: impl Into<PathBuf>,
        filename_prefix: impl Into<String>,
        output_format: OutputFormat,
    ) -> Self {
        Self {
            output_folder: output_folder.into(),
            filename_prefix: filename_prefix.into().trim().to_owned(),
            output_format,
        }
    }

    /// File name for the cropped version of `source`:
    /// `{prefix}_{stem}.{ext}`, or `{stem}.{ext}` when the prefix is empty.
    pub fn file_name_for(&self, source: &Path) -> Result<String> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ScanCropError::InvalidArgument(format!(
                    "source path has no usable file name: {}",
                    source.display()
                ))
            })?;

        let ext = match self.output_format.forced_extension() {
            Some(forced) => Some(forced),
            None => source.extension().and_then(|e| e.to_str()),
        };

        let name = if self.filename_prefix.is_empty() {
            stem.to_owned()
        } else {
            format!("{}_{}", self.filename_prefix, stem)
        };

        Ok(match ext {
            Some(ext) => format!("{name}.{ext}"),
            None => name,
        })
    }

    /// Full output path for the cropped version of `source`.
    pub fn output_path_for(&self, source: &Path) -> Result<PathBuf> {
        Ok(self.output_folder.join(self.file_name_for(source)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_matching_is_case_sensitive() {
        assert!(has_supported_extension(Path::new("scan_001.tif")));
        assert!(has_supported_extension(Path::new("a/b/scan.jpeg")));
        assert!(!has_supported_extension(Path::new("scan_001.TIF")));
        assert!(!has_supported_extension(Path::new("notes.txt")));
        assert!(!has_supported_extension(Path::new("no_extension")));
    }

    #[test]
    fn original_format_keeps_extension() {
        let spec = OutputSpec::new("/out", "", OutputFormat::Original);
        let name = spec.file_name_for(Path::new("/in/page_07.tiff")).unwrap();
        assert_eq!(name, "page_07.tiff");
    }

    #[test]
    fn forced_format_replaces_extension() {
        let spec = OutputSpec::new("/out", "", OutputFormat::Png);
        for source in ["/in/a.jpg", "/in/a.tif", "/in/a.png", "/in/a.jpeg"] {
            assert_eq!(spec.file_name_for(Path::new(source)).unwrap(), "a.png");
        }
        let tiff = OutputSpec::new("/out", "", OutputFormat::Tiff);
        assert_eq!(tiff.file_name_for(Path::new("x.png")).unwrap(), "x.tif");
        let jpg = OutputSpec::new("/out", "", OutputFormat::Jpg);
        assert_eq!(jpg.file_name_for(Path::new("x.png")).unwrap(), "x.jpg");
    }

    #[test]
    fn prefix_is_joined_with_underscore_and_trimmed() {
        let spec = OutputSpec::new("/out", "  cropped ", OutputFormat::Original);
        assert_eq!(spec.filename_prefix, "cropped");
        let path = spec.output_path_for(Path::new("/in/scan.v2.png")).unwrap();
        assert_eq!(path, PathBuf::from("/out/cropped_scan.v2.png"));
    }

    #[test]
    fn output_format_parses_loosely() {
        assert_eq!("tiff".parse::<OutputFormat>().unwrap(), OutputFormat::Tiff);
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
        assert_eq!("Original".parse::<OutputFormat>().unwrap(), OutputFormat::Original);
        assert!("bmp".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_serializes_as_settings_labels() {
        for format in OutputFormat::ALL {
            let json = serde_json::to_string(&format).unwrap();
            assert_eq!(json, format!("\"{}\"", format.label()));
        }
    }

    #[test]
    fn crop_rect_bounds() {
        let rect = CropRect::new(10, 20, 30, 40);
        assert_eq!(rect.right(), 40);
        assert_eq!(rect.bottom(), 60);
        assert!(rect.fits_within(40, 60));
        assert!(!rect.fits_within(39, 60));
    }
}
