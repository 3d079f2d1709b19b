// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module wires egui input to the editing session: key presses become
//! session commands, canvas pointer activity becomes stroke events, and the
//! composited frame is re-uploaded as a texture whenever the session asks
//! for a redraw.

use crate::error::AnnotateError;
use crate::models::session::{Command, Event, Session, StrokeState};
use crate::ui::{canvas, toolbar};

/// Map a key to its fixed command binding.
pub fn command_for_key(key: egui::Key) -> Option<Command> {
    match key {
        egui::Key::A => Some(Command::Previous),
        egui::Key::D => Some(Command::Next),
        egui::Key::E => Some(Command::ToggleEraser),
        egui::Key::R => Some(Command::ResetMask),
        egui::Key::Q | egui::Key::Escape => Some(Command::Quit),
        _ => None,
    }
}

/// Main application state.
pub struct AnnotatorApp {
    /// Image, mask and pointer state
    session: Session,

    /// Texture holding the last composited frame
    frame_texture: egui::TextureHandle,

    /// Frame must be recomposited before the next paint
    frame_stale: bool,

    /// Last error or warning shown in the status line
    message: Option<String>,

    /// Quit was confirmed; the viewport is closing
    closing: bool,

    /// A close request already failed to save; the next one discards
    discard_on_close: bool,
}

impl AnnotatorApp {
    pub fn new(
        ctx: &egui::Context,
        session: Session,
        startup_warning: Option<AnnotateError>,
    ) -> Self {
        let frame_texture = ctx.load_texture(
            "frame",
            frame_image(&session),
            egui::TextureOptions::NEAREST,
        );
        let mut app = Self {
            session,
            frame_texture,
            frame_stale: false,
            message: None,
            closing: false,
            discard_on_close: false,
        };
        if let Some(warning) = startup_warning {
            app.report(&warning);
        }
        app
    }

    fn report(&mut self, error: &AnnotateError) {
        match error {
            AnnotateError::CorruptMask { .. } => {
                log::warn!("{}", error);
                self.message = Some(format!("{error}; starting with a blank mask"));
            }
            _ => {
                log::error!("{}", error);
                self.message = Some(error.to_string());
            }
        }
    }

    /// Feed one event to the session and act on the outcome.
    fn dispatch(&mut self, ctx: &egui::Context, event: Event) {
        match self.session.handle_event(event) {
            Ok(outcome) => {
                if outcome.redraw {
                    self.frame_stale = true;
                }
                if let Event::Command(Command::Next | Command::Previous) = event {
                    if outcome.redraw {
                        self.message = None;
                    }
                }
                if let Some(warning) = outcome.warning {
                    self.report(&warning);
                }
                if outcome.quit {
                    self.closing = true;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
            Err(e) => self.report(&e),
        }
    }

    /// Save before the window goes away. A failed save cancels the first
    /// close request so the error can be read.
    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if self.closing || self.discard_on_close {
            return;
        }
        match self.session.save() {
            Ok(()) => self.closing = true,
            Err(e) => {
                self.report(&e);
                self.message = Some(format!("{e}; close again to discard changes"));
                self.discard_on_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            }
        }
    }

    fn upload_frame(&mut self) {
        self.frame_texture
            .set(frame_image(&self.session), egui::TextureOptions::NEAREST);
        self.frame_stale = false;
    }
}

/// Composite the session's current frame into an egui image.
fn frame_image(session: &Session) -> egui::ColorImage {
    let frame = session.frame();
    let size = [frame.width() as usize, frame.height() as usize];
    egui::ColorImage::from_rgb(size, frame.as_raw())
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.handle_close_request(ctx);
        }

        // Handle keyboard events
        if !ctx.wants_keyboard_input() {
            let commands: Vec<Command> = ctx.input(|i| {
                i.events
                    .iter()
                    .filter_map(|event| match event {
                        egui::Event::Key {
                            key,
                            pressed: true,
                            repeat: false,
                            ..
                        } => command_for_key(*key),
                        _ => None,
                    })
                    .collect()
            });
            for command in commands {
                if self.closing {
                    break;
                }
                self.dispatch(ctx, Event::Command(command));
            }
        }

        // Toolbar
        let mut brush_radius = self.session.brush_radius();
        let eraser_on = self.session.eraser_on();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            toolbar::show(ui, &mut brush_radius, eraser_on);
        });
        if brush_radius != self.session.brush_radius() {
            log::debug!("Brush radius set to {}", brush_radius);
            self.session.set_brush_radius(brush_radius);
        }

        if self.frame_stale {
            self.upload_frame();
        }

        // Main canvas (center)
        let image = self.session.image();
        let image_size = (image.width(), image.height());
        let status = canvas::StatusLine {
            index: self.session.index(),
            count: self.session.image_count(),
            file_name: &image.file_name,
            eraser_on,
            stroke_at: match self.session.stroke_state() {
                StrokeState::Drawing { last } => Some(last),
                StrokeState::Idle => None,
            },
            message: self.message.as_deref(),
        };
        let events = egui::CentralPanel::default()
            .show(ctx, |ui| canvas::show(ui, &self.frame_texture, image_size, &status))
            .inner;

        for event in events {
            self.dispatch(ctx, event);
        }
        if self.frame_stale {
            ctx.request_repaint();
        }
    }
}
