// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation mask data structure.
//!
//! A mask is a single-channel grid with the same height and width as the
//! image it annotates. Pixels hold either [`ANNOTATED`] or [`UNANNOTATED`].

use ndarray::Array2;

/// Value of a pixel covered by a stroke.
pub const ANNOTATED: u8 = 255;

/// Value of an untouched or erased pixel.
pub const UNANNOTATED: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    grid: Array2<u8>,
}

impl Mask {
    /// Create an all-unannotated mask of the given size.
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            grid: Array2::from_elem((height, width), UNANNOTATED),
        }
    }

    /// Wrap an existing grid, normalizing every non-zero value to [`ANNOTATED`].
    pub fn from_grid(mut grid: Array2<u8>) -> Self {
        grid.mapv_inplace(|v| if v == UNANNOTATED { UNANNOTATED } else { ANNOTATED });
        Self { grid }
    }

    pub fn height(&self) -> usize {
        self.grid.nrows()
    }

    pub fn width(&self) -> usize {
        self.grid.ncols()
    }

    /// `(height, width)`
    pub fn dims(&self) -> (usize, usize) {
        self.grid.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.grid.get((y, x)).copied()
    }

    /// Set one pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if let Some(px) = self.grid.get_mut((y, x)) {
            *px = value;
        }
    }

    pub fn is_annotated(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Some(ANNOTATED)
    }

    /// True when no pixel is annotated.
    pub fn is_blank(&self) -> bool {
        self.grid.iter().all(|&v| v == UNANNOTATED)
    }

    pub fn annotated_count(&self) -> usize {
        self.grid.iter().filter(|&&v| v == ANNOTATED).count()
    }

    /// Reset every pixel to [`UNANNOTATED`], keeping the dimensions.
    pub fn clear(&mut self) {
        self.grid.fill(UNANNOTATED);
    }

    pub fn grid(&self) -> &Array2<u8> {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_has_image_shape() {
        let mask = Mask::zeros(4, 7);
        assert_eq!(mask.dims(), (4, 7));
        assert_eq!(mask.width(), 7);
        assert_eq!(mask.height(), 4);
        assert!(mask.is_blank());
    }

    #[test]
    fn test_from_grid_normalizes_values() {
        let grid = Array2::from_shape_vec((2, 2), vec![0, 1, 7, 255]).unwrap();
        let mask = Mask::from_grid(grid);
        assert_eq!(mask.get(0, 0), Some(UNANNOTATED));
        assert_eq!(mask.get(1, 0), Some(ANNOTATED));
        assert_eq!(mask.get(0, 1), Some(ANNOTATED));
        assert_eq!(mask.annotated_count(), 3);
    }

    #[test]
    fn test_set_is_x_y_and_ignores_out_of_bounds() {
        let mut mask = Mask::zeros(3, 5);
        mask.set(4, 2, ANNOTATED);
        mask.set(5, 0, ANNOTATED);
        mask.set(0, 3, ANNOTATED);
        assert!(mask.is_annotated(4, 2));
        assert_eq!(mask.grid()[(2, 4)], ANNOTATED);
        assert_eq!(mask.annotated_count(), 1);
    }

    #[test]
    fn test_clear_keeps_dimensions() {
        let mut mask = Mask::zeros(3, 3);
        mask.set(1, 1, ANNOTATED);
        mask.clear();
        assert!(mask.is_blank());
        assert_eq!(mask.dims(), (3, 3));
    }
}
