// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview viewport — pan/zoom mapping between display (canvas) coordinates
// and source-image pixels, plus the pointer state machine that drives it.

use scancrop_core::error::{Result, ScanCropError};
use scancrop_core::types::CropRect;
use tracing::debug;

/// Canvas size used when no front end supplies one.
pub const DEFAULT_CANVAS: (f64, f64) = (600.0, 400.0);

/// Zoom multiplier applied per scroll step.
pub const ZOOM_STEP: f64 = 1.1;

const MIN_ZOOM: f64 = 0.01;
const MAX_ZOOM: f64 = 64.0;

/// A rectangle in source-image coordinates with fractional corners.
/// `x1 <= x2` and `y1 <= y2` always hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRegion {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl SourceRegion {
    /// Region spanned by two opposite corners given in any order.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x1: a.0.min(b.0),
            y1: a.1.min(b.1),
            x2: a.0.max(b.0),
            y2: a.1.max(b.1),
        }
    }

    /// Region from a top-left corner and a size.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_corners((x, y), (x + width, y + height))
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Intersect with `[0, width] x [0, height]`.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self {
            x1: self.x1.clamp(0.0, w),
            y1: self.y1.clamp(0.0, h),
            x2: self.x2.clamp(0.0, w),
            y2: self.y2.clamp(0.0, h),
        }
    }

    /// Whole-pixel rectangle covered by this region inside a `width` x
    /// `height` image. Corners are clamped, then rounded half-to-even.
    ///
    /// Fails with `SelectionTooSmall` when the clamped region is less than one
    /// source pixel wide or tall.
    pub fn to_pixel_rect(&self, width: u32, height: u32) -> Result<CropRect> {
        let clamped = self.clamped(width, height);
        if clamped.width() < 1.0 || clamped.height() < 1.0 {
            return Err(ScanCropError::SelectionTooSmall);
        }
        let x1 = clamped.x1.round_ties_even() as u32;
        let y1 = clamped.y1.round_ties_even() as u32;
        let x2 = clamped.x2.round_ties_even() as u32;
        let y2 = clamped.y2.round_ties_even() as u32;
        if x2 <= x1 || y2 <= y1 {
            return Err(ScanCropError::SelectionTooSmall);
        }
        Ok(CropRect::new(x1, y1, x2 - x1, y2 - y1))
    }
}

/// Pan/zoom state of the preview canvas.
///
/// The image is drawn centred on `canvas / 2 + pan`, scaled by `zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    canvas_width: f64,
    canvas_height: f64,
    image_width: f64,
    image_height: f64,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS.0, DEFAULT_CANVAS.1)
    }
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            canvas_width,
            canvas_height,
            image_width: 0.0,
            image_height: 0.0,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

    /// Show a new image scaled to fit the canvas (never enlarged) with the
    /// pan reset.
    pub fn fit(&mut self, image_width: u32, image_height: u32) {
        self.set_image(image_width, image_height);
        let mut zoom = 1.0f64;
        if image_width > 0 {
            zoom = zoom.min(self.canvas_width / image_width as f64);
        }
        if image_height > 0 {
            zoom = zoom.min(self.canvas_height / image_height as f64);
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        debug!(zoom = self.zoom, image_width, image_height, "Viewport fitted");
    }

    /// Show a new image keeping the current zoom and pan.
    pub fn set_image(&mut self, image_width: u32, image_height: u32) {
        self.image_width = image_width as f64;
        self.image_height = image_height as f64;
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    pub fn set_pan(&mut self, pan: (f64, f64)) {
        self.pan_x = pan.0;
        self.pan_y = pan.1;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }

    fn center(&self) -> (f64, f64) {
        (
            self.canvas_width / 2.0 + self.pan_x,
            self.canvas_height / 2.0 + self.pan_y,
        )
    }

    /// Display position of the image's top-left pixel.
    pub fn image_origin(&self) -> (f64, f64) {
        let (cx, cy) = self.center();
        (
            cx - self.image_width * self.zoom / 2.0,
            cy - self.image_height * self.zoom / 2.0,
        )
    }

    pub fn display_to_source(&self, point: (f64, f64)) -> (f64, f64) {
        let (ox, oy) = self.image_origin();
        ((point.0 - ox) / self.zoom, (point.1 - oy) / self.zoom)
    }

    pub fn source_to_display(&self, point: (f64, f64)) -> (f64, f64) {
        let (ox, oy) = self.image_origin();
        (ox + point.0 * self.zoom, oy + point.1 * self.zoom)
    }

    /// Zoom by `steps` scroll notches (positive zooms in), keeping the image
    /// point under `pointer` fixed on screen.
    pub fn zoom_at(&mut self, pointer: (f64, f64), steps: i32) {
        if steps == 0 {
            return;
        }
        let old_zoom = self.zoom;
        let new_zoom = (old_zoom * ZOOM_STEP.powi(steps)).clamp(MIN_ZOOM, MAX_ZOOM);

        let (cx, cy) = self.center();
        let rel_x = (pointer.0 - cx) / old_zoom;
        let rel_y = (pointer.1 - cy) / old_zoom;

        self.zoom = new_zoom;
        self.pan_x = pointer.0 - self.canvas_width / 2.0 - rel_x * new_zoom;
        self.pan_y = pointer.1 - self.canvas_height / 2.0 - rel_y * new_zoom;
    }

    /// Map a display-space drag from `a` to `b` into a source region clamped
    /// to the image.
    pub fn selection_to_source(&self, a: (f64, f64), b: (f64, f64)) -> SourceRegion {
        SourceRegion::from_corners(self.display_to_source(a), self.display_to_source(b))
            .clamped(self.image_width as u32, self.image_height as u32)
    }
}

// -- Pointer state machine ----------------------------------------------------

/// Abstract pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press { x: f64, y: f64 },
    Drag { x: f64, y: f64 },
    Release { x: f64, y: f64 },
    /// Scroll wheel; positive `steps` zoom in.
    Scroll { x: f64, y: f64, steps: i32 },
}

/// Current pointer mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerMode {
    Idle,
    Panning {
        start: (f64, f64),
        start_pan: (f64, f64),
    },
    Selecting {
        start: (f64, f64),
        current: (f64, f64),
    },
}

/// What an event changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionOutcome {
    /// Pan or zoom changed; redraw.
    ViewChanged,
    /// The rubber band moved (display coordinates).
    SelectionChanged {
        from: (f64, f64),
        to: (f64, f64),
    },
    /// A selection finished; the region is in source coordinates.
    RegionSelected(SourceRegion),
}

/// Drives a [`Viewport`] from pointer events.
///
/// A press starts panning unless selection has been armed, in which case it
/// starts a rubber-band selection. Releasing a selection reports the region
/// and disarms selection again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    mode: PointerMode,
    selection_armed: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction {
    pub fn new() -> Self {
        Self {
            mode: PointerMode::Idle,
            selection_armed: false,
        }
    }

    pub fn mode(&self) -> PointerMode {
        self.mode
    }

    /// The next press starts a region selection instead of a pan.
    pub fn arm_selection(&mut self) {
        self.selection_armed = true;
    }

    pub fn is_selection_armed(&self) -> bool {
        self.selection_armed
    }

    pub fn handle(
        &mut self,
        viewport: &mut Viewport,
        event: PointerEvent,
    ) -> Option<InteractionOutcome> {
        match (self.mode, event) {
            (_, PointerEvent::Scroll { x, y, steps }) => {
                viewport.zoom_at((x, y), steps);
                Some(InteractionOutcome::ViewChanged)
            }

            (_, PointerEvent::Press { x, y }) => {
                if self.selection_armed {
                    self.mode = PointerMode::Selecting {
                        start: (x, y),
                        current: (x, y),
                    };
                    Some(InteractionOutcome::SelectionChanged {
                        from: (x, y),
                        to: (x, y),
                    })
                } else {
                    self.mode = PointerMode::Panning {
                        start: (x, y),
                        start_pan: viewport.pan(),
                    };
                    None
                }
            }

            (PointerMode::Panning { start, start_pan }, PointerEvent::Drag { x, y }) => {
                viewport.set_pan((start_pan.0 + x - start.0, start_pan.1 + y - start.1));
                Some(InteractionOutcome::ViewChanged)
            }

            (PointerMode::Panning { .. }, PointerEvent::Release { .. }) => {
                self.mode = PointerMode::Idle;
                None
            }

            (PointerMode::Selecting { start, .. }, PointerEvent::Drag { x, y }) => {
                self.mode = PointerMode::Selecting {
                    start,
                    current: (x, y),
                };
                Some(InteractionOutcome::SelectionChanged {
                    from: start,
                    to: (x, y),
                })
            }

            (PointerMode::Selecting { start, .. }, PointerEvent::Release { x, y }) => {
                self.mode = PointerMode::Idle;
                self.selection_armed = false;
                let region = viewport.selection_to_source(start, (x, y));
                debug!(?region, "Region selected");
                Some(InteractionOutcome::RegionSelected(region))
            }

            (PointerMode::Idle, PointerEvent::Drag { .. } | PointerEvent::Release { .. }) => None,
        }
    }
}
