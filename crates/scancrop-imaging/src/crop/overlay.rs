// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview rendering — the source image with the proposed crop outlined.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use scancrop_core::types::CropRect;

/// Outline colour of the proposed crop.
pub const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline thickness in source pixels.
pub const OUTLINE_THICKNESS: u32 = 2;

/// RGB copy of `image` with `rect` outlined, drawn inward from its edges.
pub fn render_preview(image: &DynamicImage, rect: Option<CropRect>) -> RgbImage {
    let mut canvas = image.to_rgb8();
    if let Some(rect) = rect {
        outline(&mut canvas, rect);
    }
    canvas
}

fn outline(canvas: &mut RgbImage, rect: CropRect) {
    for inset in 0..OUTLINE_THICKNESS {
        let width = rect.width.saturating_sub(2 * inset);
        let height = rect.height.saturating_sub(2 * inset);
        if width == 0 || height == 0 {
            break;
        }
        let ring = Rect::at((rect.x + inset) as i32, (rect.y + inset) as i32).of_size(width, height);
        draw_hollow_rect_mut(canvas, ring, OUTLINE_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn outline_is_two_pixels_thick() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(30, 30, Luma([0u8])));
        let preview = render_preview(&img, Some(CropRect::new(5, 5, 20, 20)));

        assert_eq!(*preview.get_pixel(5, 5), OUTLINE_COLOR);
        assert_eq!(*preview.get_pixel(6, 15), OUTLINE_COLOR);
        assert_eq!(*preview.get_pixel(24, 24), OUTLINE_COLOR);
        assert_eq!(*preview.get_pixel(7, 15), Rgb([0, 0, 0]));
        assert_eq!(*preview.get_pixel(4, 4), Rgb([0, 0, 0]));
        assert_eq!(*preview.get_pixel(15, 15), Rgb([0, 0, 0]));
    }

    #[test]
    fn no_rect_leaves_image_untouched() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 10, Luma([90u8])));
        let preview = render_preview(&img, None);
        assert!(preview.pixels().all(|p| *p == Rgb([90, 90, 90])));
    }

    #[test]
    fn degenerate_rect_does_not_panic() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(10, 10));
        let preview = render_preview(&img, Some(CropRect::new(3, 3, 1, 1)));
        assert_eq!(*preview.get_pixel(3, 3), OUTLINE_COLOR);
    }
}
