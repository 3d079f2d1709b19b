// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the pixel coordinate type used by strokes and the
//! transformation from canvas (screen) coordinates to image pixels.

/// A pixel coordinate in image space. May lie outside the image while the
/// pointer is dragged past its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Clamp into `[0, width) x [0, height)`. Callers must pass a non-empty size.
    pub fn clamp_to(self, width: usize, height: usize) -> Self {
        let max_x = width.saturating_sub(1).min(i32::MAX as usize) as i32;
        let max_y = height.saturating_sub(1).min(i32::MAX as usize) as i32;
        Self {
            x: self.x.clamp(0, max_x),
            y: self.y.clamp(0, max_y),
        }
    }
}

/// Convert a position relative to the displayed image rectangle into image
/// pixel coordinates.
///
/// `rel_x`/`rel_y` are offsets from the rectangle's top-left corner in screen
/// units; `display_width`/`display_height` are the rectangle's size.
pub fn screen_to_pixel(
    rel_x: f32,
    rel_y: f32,
    display_width: f32,
    display_height: f32,
    width: u32,
    height: u32,
) -> PixelPos {
    if display_width <= 0.0 || display_height <= 0.0 {
        return PixelPos::new(0, 0);
    }
    let x = (rel_x / display_width) * width as f32;
    let y = (rel_y / display_height) * height as f32;
    PixelPos::new(x.floor() as i32, y.floor() as i32)
}

/// Largest size with the image's aspect ratio that fits in `available`.
pub fn fit_size(width: u32, height: u32, available_w: f32, available_h: f32) -> (f32, f32) {
    if width == 0 || height == 0 || available_w <= 0.0 || available_h <= 0.0 {
        return (0.0, 0.0);
    }
    let img_aspect = width as f32 / height as f32;
    let available_aspect = available_w / available_h;

    if img_aspect > available_aspect {
        // Image is wider - fit to width
        (available_w, available_w / img_aspect)
    } else {
        // Image is taller - fit to height
        (available_h * img_aspect, available_h)
    }
}
