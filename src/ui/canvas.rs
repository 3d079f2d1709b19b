// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and mask painting.
//!
//! This module shows the composited frame scaled to fit the panel and turns
//! primary-button pointer activity over it into session events in image
//! pixel coordinates.

use crate::models::session::Event;
use crate::util::geometry::{fit_size, screen_to_pixel, PixelPos};

/// Values shown in the status line under the canvas.
pub struct StatusLine<'a> {
    pub index: usize,
    pub count: usize,
    pub file_name: &'a str,
    pub eraser_on: bool,
    /// Last painted pixel while a stroke is in progress
    pub stroke_at: Option<PixelPos>,
    pub message: Option<&'a str>,
}

/// Display the main canvas area and collect pointer events.
pub fn show(
    ui: &mut egui::Ui,
    texture: &egui::TextureHandle,
    image_size: (u32, u32),
    status: &StatusLine,
) -> Vec<Event> {
    let mut events = Vec::new();
    // Set background color
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    // Leave room for the status line
    let available_size = ui.available_size() - egui::vec2(0.0, 28.0);

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (img_width, img_height) = image_size;
        let (display_width, display_height) =
            fit_size(img_width, img_height, available_size.x, available_size.y);

        // Center the image
        let x_offset = (available_size.x - display_width) / 2.0;
        let y_offset = (available_size.y - display_height) / 2.0;
        let image_rect = egui::Rect::from_min_size(
            ui.min_rect().min + egui::vec2(x_offset, y_offset),
            egui::vec2(display_width, display_height),
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let to_pixel = |pos: egui::Pos2| {
            screen_to_pixel(
                pos.x - image_rect.min.x,
                pos.y - image_rect.min.y,
                display_width,
                display_height,
                img_width,
                img_height,
            )
        };

        let (pressed, down, released, pos) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
            )
        });

        if let Some(pos) = pos {
            if pressed && response.hovered() {
                events.push(Event::PointerDown(to_pixel(pos)));
            } else if down {
                // Ignored by the session unless a stroke is in progress
                events.push(Event::PointerMove(to_pixel(pos)));
            }
        }
        if released {
            events.push(Event::PointerUp);
        }
    });

    // Display session info at the bottom
    ui.separator();
    ui.horizontal(|ui| {
        ui.label(format!("Image {}/{}", status.index + 1, status.count));
        ui.separator();
        ui.label(status.file_name);
        ui.separator();
        if status.eraser_on {
            ui.label(egui::RichText::new("Eraser").color(egui::Color32::LIGHT_BLUE));
        } else {
            ui.label("Draw");
        }
        if let Some(pos) = status.stroke_at {
            ui.separator();
            ui.label(format!("Painting at ({}, {})", pos.x, pos.y));
        }
        if let Some(message) = status.message {
            ui.separator();
            ui.label(egui::RichText::new(message).color(egui::Color32::LIGHT_RED));
        }
    });

    events
}
