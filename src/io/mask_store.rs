// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mask persistence.
//!
//! One `.npy` file per image lives in the save directory, named after the
//! image's file stem. Masks are stored as binary 0/1 and held in memory as
//! 0/255.

use super::npy;
use crate::error::{AnnotateError, Result};
use crate::models::mask::Mask;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const MASK_EXTENSION: &str = "npy";

#[derive(Debug, Clone)]
pub struct MaskStore {
    dir: PathBuf,
}

impl MaskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the mask file belonging to `image_name`.
    pub fn mask_path(&self, image_name: &str) -> PathBuf {
        let stem = Path::new(image_name)
            .file_stem()
            .unwrap_or_else(|| OsStr::new(image_name));
        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(MASK_EXTENSION);
        self.dir.join(file_name)
    }

    pub fn exists(&self, image_name: &str) -> bool {
        self.mask_path(image_name).is_file()
    }

    /// Load the saved mask for `image_name`, or a blank one on first visit.
    ///
    /// A saved mask whose size differs from `(height, width)` or that cannot
    /// be parsed is reported as [`AnnotateError::CorruptMask`].
    pub fn load_or_create(&self, image_name: &str, height: usize, width: usize) -> Result<Mask> {
        let path = self.mask_path(image_name);
        let corrupt = |reason: String| AnnotateError::CorruptMask {
            path: path.clone(),
            reason,
        };

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No saved mask for {}, starting blank", image_name);
                return Ok(Mask::zeros(height, width));
            }
            Err(e) => return Err(corrupt(e.to_string())),
        };

        let mut reader = BufReader::new(file);
        let header = npy::read_header(&mut reader).map_err(|e| corrupt(e.to_string()))?;
        // Checked before reading the data so a bogus shape never sizes a buffer
        if (header.rows, header.cols) != (height, width) {
            return Err(corrupt(format!(
                "mask is {}x{} but the image is {width}x{height}",
                header.cols, header.rows
            )));
        }
        let grid = npy::read_data(reader, &header).map_err(|e| corrupt(e.to_string()))?;

        log::info!("Loaded mask {}", path.display());
        Ok(Mask::from_grid(grid))
    }

    /// Write `mask` for `image_name`, creating the save directory if needed.
    ///
    /// The array is written to a temporary file in the save directory and
    /// renamed over the target, so an existing mask is replaced whole or
    /// left untouched.
    pub fn save(&self, image_name: &str, mask: &Mask) -> Result<PathBuf> {
        let path = self.mask_path(image_name);
        let io_error = |source| AnnotateError::Io {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io_error)?;
        let binary = mask.grid().mapv(|v| u8::from(v != 0));

        let mut staged = NamedTempFile::new_in(&self.dir).map_err(io_error)?;
        npy::write_u8(BufWriter::new(staged.as_file_mut()), &binary).map_err(io_error)?;
        staged.as_file().sync_all().map_err(io_error)?;
        staged.persist(&path).map_err(|e| io_error(e.error))?;

        log::info!(
            "Saved mask {} ({} annotated pixels)",
            path.display(),
            mask.annotated_count()
        );
        Ok(path)
    }
}
