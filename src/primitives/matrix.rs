//! Matrix type for 2D numeric data.

use serde::{Deserialize, Serialize};

/// A 2D matrix of floating-point values (row-major storage).
///
/// Topic-word parameters, their Dirichlet expectations, and per-document
/// sufficient statistics are all stored in this layout, one topic per row.
///
/// # Examples
///
/// ```
/// use online_lda::primitives::Matrix;
///
/// let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("data length matches rows * cols");
/// assert_eq!(m.shape(), (2, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy> Matrix<T> {
    /// Creates a new matrix from a vector of data.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, &'static str> {
        if data.len() != rows * cols {
            return Err("Data length must equal rows * cols");
        }
        Ok(Self { data, rows, cols })
    }

    /// Creates a matrix with every element set to `value`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Returns the shape as (rows, cols).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols
    }

    /// Gets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    /// Borrows a row as a slice.
    #[must_use]
    pub fn row(&self, row_idx: usize) -> &[T] {
        let start = row_idx * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Mutably borrows a row as a slice.
    pub fn row_mut(&mut self, row_idx: usize) -> &mut [T] {
        let start = row_idx * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Iterates over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |r| self.row(r))
    }

    /// Builds a `rows × indices.len()` matrix from the given columns.
    ///
    /// Columns may repeat; a repeated index yields a repeated column.
    ///
    /// # Panics
    ///
    /// Panics if a column index is out of bounds.
    #[must_use]
    pub fn select_columns(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(self.rows * indices.len());
        for row in self.rows() {
            data.extend(indices.iter().map(|&col| row[col]));
        }
        Self {
            data,
            rows: self.rows,
            cols: indices.len(),
        }
    }

    /// Applies `f` to every element.
    #[must_use]
    pub fn map<F: Fn(T) -> T>(&self, f: F) -> Self {
        Self {
            data: self.data.iter().map(|&x| f(x)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Returns the underlying data as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl Matrix<f64> {
    /// Creates a matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Sum of every element.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Sum of each row.
    #[must_use]
    pub fn row_sums(&self) -> Vec<f64> {
        self.rows().map(|row| row.iter().sum()).collect()
    }

    /// Scatter-adds the columns of `other` into the columns named by `indices`.
    ///
    /// Column `j` of `other` is added to column `indices[j]` of `self`;
    /// repeated indices accumulate.
    ///
    /// # Errors
    ///
    /// Returns an error if the row counts differ, if `indices` does not have
    /// one entry per column of `other`, or if an index is out of bounds.
    pub fn scatter_add_columns(
        &mut self,
        indices: &[usize],
        other: &Self,
    ) -> Result<(), &'static str> {
        if self.rows != other.rows {
            return Err("Matrix row counts must match for scatter-add");
        }
        if indices.len() != other.cols {
            return Err("Scatter indices must match source columns");
        }
        if indices.iter().any(|&col| col >= self.cols) {
            return Err("Scatter index out of bounds");
        }

        for r in 0..self.rows {
            let src = other.row(r);
            let dst = self.row_mut(r);
            for (&col, &value) in indices.iter().zip(src) {
                dst[col] += value;
            }
        }
        Ok(())
    }

    /// Element-wise convex combination `(1 - weight) * self + weight * other`.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match.
    pub fn lerp(&self, other: &Self, weight: f64) -> Result<Self, &'static str> {
        if self.shape() != other.shape() {
            return Err("Matrix dimensions must match for interpolation");
        }

        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (1.0 - weight) * a + weight * b)
            .collect();

        Ok(Self {
            data,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Normalizes every row to sum to 1. Rows summing to ~0 are left as-is.
    #[must_use]
    pub fn normalize_rows(&self) -> Self {
        let mut out = self.clone();
        for r in 0..out.rows {
            let row = out.row_mut(r);
            let total: f64 = row.iter().sum();
            if total > 1e-300 {
                for value in row.iter_mut() {
                    *value /= total;
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
