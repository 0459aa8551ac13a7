//! Dense feature matrix.

use cwi_core::{CwiError, Result};

/// Row-major `f32` matrix, one row per record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl FeatureMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build from explicit rows; every row must have the same width.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(CwiError::LengthMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.data[index * self.cols..(index + 1) * self.cols]
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row * self.cols + col] = value;
    }

    pub fn add(&mut self, row: usize, col: usize, value: f32) {
        self.data[row * self.cols + col] += value;
    }

    /// Concatenate `blocks` column-wise.
    ///
    /// Every block must have `rows` rows; row `i` of the result is row `i`
    /// of each block, in block order.
    pub fn hstack(rows: usize, blocks: &[FeatureMatrix]) -> Result<Self> {
        if let Some(bad) = blocks.iter().find(|b| b.rows != rows) {
            return Err(CwiError::LengthMismatch {
                expected: rows,
                actual: bad.rows,
            });
        }
        let cols: usize = blocks.iter().map(|b| b.cols).sum();
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for block in blocks {
                data.extend_from_slice(block.row(r));
            }
        }
        Ok(Self { rows, cols, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hstack_preserves_row_order() {
        let a = FeatureMatrix::from_rows(&[vec![1.0], vec![2.0]]).unwrap();
        let b = FeatureMatrix::from_rows(&[vec![10.0, 11.0], vec![20.0, 21.0]]).unwrap();
        let m = FeatureMatrix::hstack(2, &[a, b]).unwrap();
        assert_eq!(m.cols(), 3);
        assert_eq!(m.row(0), &[1.0, 10.0, 11.0]);
        assert_eq!(m.row(1), &[2.0, 20.0, 21.0]);
    }

    #[test]
    fn test_hstack_rejects_ragged_blocks() {
        let a = FeatureMatrix::zeros(2, 1);
        let b = FeatureMatrix::zeros(3, 1);
        assert!(matches!(
            FeatureMatrix::hstack(2, &[a, b]),
            Err(CwiError::LengthMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        assert!(FeatureMatrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_zero_width_blocks() {
        let m = FeatureMatrix::hstack(4, &[FeatureMatrix::zeros(4, 0)]).unwrap();
        assert_eq!(m.rows(), 4);
        assert_eq!(m.cols(), 0);
    }
}
