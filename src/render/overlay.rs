// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Display frame composition.
//!
//! Annotated mask pixels are alpha-blended with a highlight color over the
//! base image, and the file label is burned into the top-left corner.

use crate::models::mask::Mask;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

/// Color blended over annotated pixels.
pub const HIGHLIGHT: Rgb<u8> = Rgb([255, 40, 40]);

/// Weight of [`HIGHLIGHT`] in the blend.
pub const HIGHLIGHT_ALPHA: f32 = 0.45;

const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_BACKING: Rgb<u8> = Rgb([0, 0, 0]);
const LABEL_BACKING_ALPHA: f32 = 0.6;
const LABEL_MARGIN: u32 = 4;
const GLYPH_SIZE: u32 = 8;

/// Build the frame shown for `image` with `mask` on top and `label` burned in.
///
/// The mask is expected to match the image size; pixels outside the overlap
/// are left as in the base image.
pub fn composite(image: &RgbImage, mask: &Mask, label: &str) -> RgbImage {
    let mut frame = image.clone();

    for (x, y, pixel) in frame.enumerate_pixels_mut() {
        if mask.is_annotated(x as usize, y as usize) {
            *pixel = blend(*pixel, HIGHLIGHT, HIGHLIGHT_ALPHA);
        }
    }

    draw_label(&mut frame, label);
    frame
}

fn blend(base: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let mix = |b: u8, o: u8| {
        (b as f32 * (1.0 - alpha) + o as f32 * alpha)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgb([
        mix(base[0], over[0]),
        mix(base[1], over[1]),
        mix(base[2], over[2]),
    ])
}

/// Glyph scale so the label stays readable on large images.
fn label_scale(image_width: u32) -> u32 {
    (image_width / 640).clamp(1, 4)
}

/// Screen-space box `(x, y, width, height)` covered by the label and its backing.
pub fn label_bounds(image_width: u32, label: &str) -> (u32, u32, u32, u32) {
    let scale = label_scale(image_width);
    let glyph = GLYPH_SIZE * scale;
    let chars = label.chars().count() as u32;
    (
        LABEL_MARGIN,
        LABEL_MARGIN,
        chars * glyph + 2 * scale,
        glyph + 2 * scale,
    )
}

fn draw_label(frame: &mut RgbImage, label: &str) {
    if label.is_empty() {
        return;
    }
    let scale = label_scale(frame.width());
    let (bx, by, bw, bh) = label_bounds(frame.width(), label);

    for y in by..(by + bh).min(frame.height()) {
        for x in bx..(bx + bw).min(frame.width()) {
            let px = frame.get_pixel_mut(x, y);
            *px = blend(*px, LABEL_BACKING, LABEL_BACKING_ALPHA);
        }
    }

    let mut cursor_x = bx + scale;
    let top = by + scale;
    for ch in label.chars() {
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'));
        if let Some(glyph) = glyph {
            for (row_idx, &row) in glyph.iter().enumerate() {
                for col_idx in 0..GLYPH_SIZE {
                    if (row >> col_idx) & 1 == 0 {
                        continue;
                    }
                    let px = cursor_x + col_idx * scale;
                    let py = top + row_idx as u32 * scale;
                    for sy in 0..scale {
                        for sx in 0..scale {
                            let (tx, ty) = (px + sx, py + sy);
                            if tx < frame.width() && ty < frame.height() {
                                frame.put_pixel(tx, ty, LABEL_COLOR);
                            }
                        }
                    }
                }
            }
        }
        cursor_x += GLYPH_SIZE * scale;
        if cursor_x >= frame.width() {
            break;
        }
    }
}
