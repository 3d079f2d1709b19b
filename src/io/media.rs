// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading.
//!
//! This module enumerates the images of the working directory in a stable
//! order and decodes them into RGB pixel buffers for compositing.

use crate::error::{AnnotateError, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// File extensions accepted as images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// A decoded image together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub file_name: String,
    pub pixels: RgbImage,
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// The ordered list of images available for annotation.
#[derive(Debug, Clone)]
pub struct ImageSet {
    files: Vec<PathBuf>,
}

impl ImageSet {
    /// List the images in `dir`, sorted by file name.
    ///
    /// Fails when the directory is missing, unreadable, or holds no images.
    pub fn open(dir: &Path) -> Result<Self> {
        let files = list_images(dir)?;
        log::info!("Found {} images in {}", files.len(), dir.display());
        Ok(Self { files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Decode the image at `index`. Panics if `index` is out of range.
    pub fn load(&self, index: usize) -> Result<LoadedImage> {
        load_image(&self.files[index])
    }
}

/// Enumerate image files directly inside `dir`, sorted lexicographically.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AnnotateError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }

    let unreadable = |source| AnnotateError::UnreadableDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(AnnotateError::NoImages {
            path: dir.to_path_buf(),
        });
    }

    // Directory enumeration order is platform dependent
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Decode one image file into an RGB buffer.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let decoded = image::open(path).map_err(|source| AnnotateError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    log::debug!(
        "Decoded {} ({}x{})",
        file_name,
        decoded.width(),
        decoded.height()
    );

    Ok(LoadedImage {
        file_name,
        pixels: decoded.to_rgb8(),
    })
}
