// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mask Annotator
//!
//! A desktop tool for painting freehand binary masks over every image in a
//! directory. Masks are saved as `.npy` arrays, one per image.

mod app;
mod cli;
mod error;
mod io;
mod models;
mod render;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::AnnotatorApp;
use clap::Parser;
use cli::Cli;
use io::{mask_store::MaskStore, media::ImageSet};
use models::session::Session;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    println!("{}", cli::banner());

    let images = ImageSet::open(&cli.img_dir)
        .with_context(|| format!("cannot start with image directory '{}'", cli.img_dir.display()))?;
    let store = MaskStore::new(&cli.save_dir);
    let (session, warning) = Session::start(images, store).context("cannot open the first image")?;

    let image = session.image();
    let title = format!("Mask Annotator - {}", cli.img_dir.display());
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                (image.width() as f32).clamp(640.0, 1600.0),
                (image.height() as f32 + 80.0).clamp(480.0, 1000.0),
            ])
            .with_min_inner_size([480.0, 360.0])
            .with_title(title),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "mask-annotator",
        options,
        Box::new(move |cc| {
            Ok(Box::new(AnnotatorApp::new(&cc.egui_ctx, session, warning)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    log::info!("Exited cleanly");
    Ok(())
}
