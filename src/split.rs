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

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{RecoError, Result};
use crate::types::SparseMatrix;

/// Splits the interactions into a training and a test matrix of the same shape. For every user,
/// `round((1 - train_fraction) * n)` of the user's `n` interactions are moved to the test matrix, chosen
/// by a random generator seeded with `seed`.
pub fn train_test_split(
    matrix: &SparseMatrix,
    train_fraction: f64,
    seed: u64,
) -> Result<(SparseMatrix, SparseMatrix)> {

    if !(0.0..=1.0).contains(&train_fraction) {
        return Err(RecoError::InvalidConfig(
            format!("train fraction must be within [0, 1], got {}", train_fraction)));
    }

    let mut rng = StdRng::seed_from_u64(seed);

    let mut train_rows: Vec<Vec<(usize, f32)>> = Vec::with_capacity(matrix.num_rows());
    let mut test_rows: Vec<Vec<(usize, f32)>> = Vec::with_capacity(matrix.num_rows());

    for user in 0..matrix.num_rows() {
        let mut entries: Vec<(usize, f32)> = matrix.row(user).iter().collect();

        let num_test = ((1.0 - train_fraction) * entries.len() as f64).round() as usize;

        entries.shuffle(&mut rng);
        let held_out = entries.split_off(entries.len() - num_test);

        train_rows.push(entries);
        test_rows.push(held_out);
    }

    let train = SparseMatrix::from_row_entries(matrix.num_cols(), train_rows);
    let test = SparseMatrix::from_row_entries(matrix.num_cols(), test_rows);

    Ok((train, test))
}


#[cfg(test)]
mod tests {

    use super::train_test_split;
    use crate::error::RecoError;
    use crate::types::SparseMatrix;

    fn interactions() -> SparseMatrix {
        let mut triplets = Vec::new();
        for user in 0..20 {
            for item in 0..30 {
                if (user * 7 + item * 3) % 4 == 0 {
                    triplets.push((user, item, 1.0 + (item % 5) as f32));
                }
            }
        }
        SparseMatrix::from_triplets(20, 30, triplets).unwrap()
    }

    #[test]
    fn full_train_fraction_leaves_test_empty() {
        let matrix = interactions();
        let (train, test) = train_test_split(&matrix, 1.0, 42).unwrap();

        assert_eq!(train, matrix);
        assert_eq!(test.shape(), matrix.shape());
        assert_eq!(test.nnz(), 0);
    }

    #[test]
    fn split_partitions_every_user() {
        let matrix = interactions();
        let (train, test) = train_test_split(&matrix, 0.8, 42).unwrap();

        assert_eq!(train.shape(), matrix.shape());
        assert_eq!(test.shape(), matrix.shape());
        assert_eq!(train.nnz() + test.nnz(), matrix.nnz());

        for user in 0..matrix.num_rows() {
            let n = matrix.row(user).len();
            let expected_test = (0.2 * n as f64).round() as usize;
            assert_eq!(test.row(user).len(), expected_test);

            for (item, value) in test.row(user).iter() {
                assert!(!train.row(user).contains(item));
                assert_eq!(matrix.get(user, item), value);
            }
        }
    }

    #[test]
    fn same_seed_same_split() {
        let matrix = interactions();

        let (train_a, test_a) = train_test_split(&matrix, 0.5, 7).unwrap();
        let (train_b, test_b) = train_test_split(&matrix, 0.5, 7).unwrap();

        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn invalid_fraction_fails() {
        match train_test_split(&interactions(), 1.5, 42) {
            Err(RecoError::InvalidConfig(_)) => {},
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }
}
