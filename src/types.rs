/**
 * RecoEval
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use fnv::FnvHashMap;

use crate::error::{RecoError, Result};

pub type DenseVector = Vec<f32>;

pub fn new_dense_vector(dimensions: usize) -> DenseVector {
    vec![0.0; dimensions]
}

/// Sparse matrix in compressed row format. Column indices are sorted within each row and
/// explicit zeros are never stored, so the number of stored entries of a row is the number of
/// its nonzero cells.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseMatrix {
    num_rows: usize,
    num_cols: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f32>,
}

/// Borrowed view of a single row of a `SparseMatrix`.
#[derive(Clone, Copy, Debug)]
pub struct SparseRow<'a> {
    indices: &'a [usize],
    values: &'a [f32],
}

impl SparseMatrix {

    pub fn empty(num_rows: usize, num_cols: usize) -> Self {
        SparseMatrix {
            num_rows,
            num_cols,
            row_offsets: vec![0; num_rows + 1],
            col_indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Builds a matrix from `(row, col, value)` triplets. If a cell is written more than once,
    /// the last write wins. Triplets outside of the shape are rejected.
    pub fn from_triplets<I>(num_rows: usize, num_cols: usize, triplets: I) -> Result<Self>
        where I: IntoIterator<Item=(usize, usize, f32)> {

        let mut rows: Vec<FnvHashMap<usize, f32>> = vec![FnvHashMap::default(); num_rows];

        for (row, col, value) in triplets {
            if row >= num_rows {
                return Err(RecoError::DimensionMismatch {
                    context: "triplet row", expected: num_rows, actual: row + 1
                });
            }
            if col >= num_cols {
                return Err(RecoError::DimensionMismatch {
                    context: "triplet column", expected: num_cols, actual: col + 1
                });
            }
            rows[row].insert(col, value);
        }

        let rows = rows.into_iter()
            .map(|row| row.into_iter().collect())
            .collect();

        Ok(Self::from_row_entries(num_cols, rows))
    }

    /// Assembles a matrix from unordered `(col, value)` entries per row. Callers guarantee that
    /// the columns are in range and unique within a row.
    pub(crate) fn from_row_entries(num_cols: usize, rows: Vec<Vec<(usize, f32)>>) -> Self {

        let num_rows = rows.len();
        let capacity = rows.iter().map(|row| row.len()).sum();

        let mut row_offsets = Vec::with_capacity(num_rows + 1);
        let mut col_indices = Vec::with_capacity(capacity);
        let mut values = Vec::with_capacity(capacity);

        row_offsets.push(0);

        for mut row in rows {
            row.sort_by_key(|&(col, _)| col);
            for (col, value) in row {
                debug_assert!(col < num_cols);
                if value != 0.0 {
                    col_indices.push(col);
                    values.push(value);
                }
            }
            row_offsets.push(col_indices.len());
        }

        SparseMatrix { num_rows, num_cols, row_offsets, col_indices, values }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    /// Number of stored (nonzero) entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row(&self, row: usize) -> SparseRow<'_> {
        let start = self.row_offsets[row];
        let end = self.row_offsets[row + 1];

        SparseRow {
            indices: &self.col_indices[start..end],
            values: &self.values[start..end],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.row(row).get(col)
    }

    /// Iterates over all stored entries as `(row, col, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item=(usize, usize, f32)> + '_ {
        (0..self.num_rows)
            .flat_map(move |row| self.row(row).iter().map(move |(col, value)| (row, col, value)))
    }

    pub fn transpose(&self) -> SparseMatrix {
        let mut rows: Vec<Vec<(usize, f32)>> = vec![Vec::new(); self.num_cols];

        for (row, col, value) in self.iter() {
            rows[col].push((row, value));
        }

        Self::from_row_entries(self.num_rows, rows)
    }
}

impl<'a> SparseRow<'a> {

    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    pub fn values(&self) -> &'a [f32] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, col: usize) -> bool {
        self.indices.binary_search(&col).is_ok()
    }

    pub fn get(&self, col: usize) -> f32 {
        match self.indices.binary_search(&col) {
            Ok(position) => self.values[position],
            Err(_) => 0.0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item=(usize, f32)> + 'a {
        self.indices.iter().cloned().zip(self.values.iter().cloned())
    }

    /// Dot product with a dense vector of the same dimensionality.
    pub fn dot_dense(&self, dense: &[f32]) -> f32 {
        self.iter().map(|(col, value)| value * dense[col]).sum()
    }

    pub fn norm(&self) -> f32 {
        self.values.iter().map(|value| value * value).sum::<f32>().sqrt()
    }
}
