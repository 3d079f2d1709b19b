// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with brush controls.
//!
//! This module provides the brush size slider, the current drawing mode,
//! and a reminder of the keyboard bindings.

use crate::cli::KEY_HELP;
use crate::render::stroke::MAX_BRUSH_RADIUS;

/// Display the toolbar. `brush_radius` is updated in place.
pub fn show(ui: &mut egui::Ui, brush_radius: &mut u32, eraser_on: bool) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.add(egui::Slider::new(brush_radius, 0..=MAX_BRUSH_RADIUS).text("Brush size"));

        ui.separator();

        let mode = if eraser_on { "Mode: Eraser" } else { "Mode: Draw" };
        ui.label(egui::RichText::new(mode).strong());

        ui.separator();

        let keys = KEY_HELP
            .iter()
            .map(|(key, action)| format!("{key}: {action}"))
            .collect::<Vec<_>>()
            .join("   ");
        ui.label(egui::RichText::new(keys).italics().weak());
    });
}
