// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Brush strokes on a mask.
//!
//! A segment is painted by stamping filled discs at every integer step
//! between its clamped endpoints.

use crate::models::mask::{Mask, ANNOTATED, UNANNOTATED};
use crate::util::geometry::PixelPos;

/// Brush radius used until the user changes it.
pub const DEFAULT_BRUSH_RADIUS: u32 = 5;

/// Largest radius offered by the toolbar.
pub const MAX_BRUSH_RADIUS: u32 = 50;

/// Whether a stroke adds to or removes from the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeMode {
    Draw,
    Erase,
}

impl StrokeMode {
    fn value(self) -> u8 {
        match self {
            Self::Draw => ANNOTATED,
            Self::Erase => UNANNOTATED,
        }
    }
}

/// Paint a segment from `from` to `to` with a brush of `radius` pixels.
///
/// Endpoints are clamped to the mask first. Equal endpoints paint a single
/// disc, so a click without movement still leaves a mark.
pub fn paint_segment(mask: &mut Mask, from: PixelPos, to: PixelPos, mode: StrokeMode, radius: u32) {
    if mask.is_empty() {
        return;
    }
    let (width, height) = (mask.width(), mask.height());
    let from = from.clamp_to(width, height);
    let to = to.clamp_to(width, height);
    let value = mode.value();
    let radius = radius.min(MAX_BRUSH_RADIUS) as i32;

    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        stamp_disc(mask, from, radius, value);
        return;
    }

    for step in 0..=steps {
        let t = step as f64 / steps as f64;
        let center = PixelPos::new(
            (from.x as f64 + dx as f64 * t).round() as i32,
            (from.y as f64 + dy as f64 * t).round() as i32,
        );
        stamp_disc(mask, center, radius, value);
    }
}

/// Set every pixel within `radius` of `center` to `value`.
fn stamp_disc(mask: &mut Mask, center: PixelPos, radius: i32, value: u8) {
    let max_x = mask.width() as i32 - 1;
    let max_y = mask.height() as i32 - 1;
    let r2 = radius * radius;

    for y in (center.y - radius).max(0)..=(center.y + radius).min(max_y) {
        for x in (center.x - radius).max(0)..=(center.x + radius).min(max_x) {
            let ox = x - center.x;
            let oy = y - center.y;
            if ox * ox + oy * oy <= r2 {
                mask.set(x as usize, y as usize, value);
            }
        }
    }
}
