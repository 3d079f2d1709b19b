// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types shared across the annotator.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnnotateError>;

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("image directory '{}' does not exist", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("cannot read image directory '{}': {source}", path.display())]
    UnreadableDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no images (jpg, jpeg, png, bmp, tif, tiff) found in '{}'", path.display())]
    NoImages { path: PathBuf },

    #[error("cannot decode image '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("mask '{}' is unusable: {reason}", path.display())]
    CorruptMask { path: PathBuf, reason: String },

    #[error("cannot write mask '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
