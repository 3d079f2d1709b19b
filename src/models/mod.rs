// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Core data structures: the annotation mask and the editing session.

pub mod mask;
pub mod session;
