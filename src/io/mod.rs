// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for images and mask files.

pub mod mask_store;
pub mod media;
pub mod npy;
