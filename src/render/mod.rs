// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rasterization of strokes into masks and of masks onto images.

pub mod overlay;
pub mod stroke;
