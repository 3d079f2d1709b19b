// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command line arguments.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "mask-annotator",
    version,
    about = "Draw freehand masks over a directory of images"
)]
pub struct Cli {
    /// Directory containing the images to be annotated.
    #[arg(long = "img_dir", default_value = "images")]
    pub img_dir: PathBuf,

    /// Directory to save the annotated masks.
    #[arg(long = "save_dir", default_value = "outputs")]
    pub save_dir: PathBuf,
}

/// Key bindings printed at startup and shown in the toolbar.
pub const KEY_HELP: &[(&str, &str)] = &[
    ("a", "previous image"),
    ("d", "next image"),
    ("e", "toggle eraser"),
    ("r", "reset mask"),
    ("q / Esc", "save and quit"),
];

pub fn banner() -> String {
    let mut text = String::from(
        "==============================\n    MASK ANNOTATOR\n==============================\n\n\
         Draw on the image with the left mouse button.\n\nKeys:\n",
    );
    for (key, action) in KEY_HELP {
        text.push_str(&format!("  {key:<8} {action}\n"));
    }
    text
}
