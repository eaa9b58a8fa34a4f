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

use crate::error::{RecoError, Result};
use crate::mapping::IndexMapping;
use crate::types::SparseMatrix;

/// A single observed rating of an item by a user, using the identifiers of the dataset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rating {
    pub user_id: i64,
    pub item_id: i64,
    pub rating: f32,
}

impl From<(i64, i64, f32)> for Rating {
    fn from((user_id, item_id, rating): (i64, i64, f32)) -> Self {
        Rating { user_id, item_id, rating }
    }
}

/// The user x item rating matrix together with the mappings between dataset identifiers and
/// matrix indices.
#[derive(Clone, Debug)]
pub struct InteractionData {
    pub matrix: SparseMatrix,
    pub users: IndexMapping,
    pub items: IndexMapping,
    num_ratings: usize,
}

impl InteractionData {

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// Number of input rows, which can exceed `matrix.nnz()` if a user rated an item twice.
    pub fn num_ratings(&self) -> usize {
        self.num_ratings
    }
}

/// Builds the interaction matrix from the observed ratings. If a user rated the same item more
/// than once, the rating that comes last in the input is kept.
pub fn build(ratings: &[Rating]) -> Result<InteractionData> {

    if ratings.is_empty() {
        return Err(RecoError::EmptyInput);
    }

    let users = IndexMapping::from_ids(ratings.iter().map(|rating| rating.user_id));
    let items = IndexMapping::from_ids(ratings.iter().map(|rating| rating.item_id));

    // Every id was registered above, so the lookups cannot fail
    let triplets = ratings.iter()
        .filter_map(|rating| {
            let user_index = users.index_of(rating.user_id)?;
            let item_index = items.index_of(rating.item_id)?;
            Some((user_index, item_index, rating.rating))
        });

    let matrix = SparseMatrix::from_triplets(users.len(), items.len(), triplets)?;

    Ok(InteractionData { matrix, users, items, num_ratings: ratings.len() })
}


#[cfg(test)]
mod tests {

    use super::{build, Rating};
    use crate::error::RecoError;

    fn ratings(triples: &[(i64, i64, f32)]) -> Vec<Rating> {
        triples.iter().cloned().map(Rating::from).collect()
    }

    #[test]
    fn small_dataset() {
        let data = build(&ratings(&[(1, 10, 5.0), (1, 20, 3.0), (2, 10, 4.0)])).unwrap();

        assert_eq!(data.matrix.shape(), (2, 2));
        assert_eq!(data.users.index_of(1), Some(0));
        assert_eq!(data.users.index_of(2), Some(1));
        assert_eq!(data.items.index_of(10), Some(0));
        assert_eq!(data.items.index_of(20), Some(1));

        assert_eq!(data.matrix.get(0, 0), 5.0);
        assert_eq!(data.matrix.get(0, 1), 3.0);
        assert_eq!(data.matrix.get(1, 0), 4.0);
        assert_eq!(data.matrix.get(1, 1), 0.0);
        assert_eq!(data.num_ratings(), 3);
    }

    #[test]
    fn every_index_is_used_by_its_id() {
        let data = build(&ratings(&[
            (300, 7, 1.0), (5, 99, 2.0), (300, 12, 3.5), (17, 7, 4.0), (5, 12, 0.5),
        ])).unwrap();

        assert_eq!(data.num_users(), 3);
        assert_eq!(data.num_items(), 3);

        for user in 0..data.num_users() {
            assert!(!data.matrix.row(user).is_empty());
        }

        let transposed = data.matrix.transpose();
        for item in 0..data.num_items() {
            assert!(!transposed.row(item).is_empty());
        }
    }

    #[test]
    fn duplicate_ratings_keep_the_last_value() {
        let data = build(&ratings(&[(1, 10, 5.0), (2, 10, 1.0), (1, 10, 2.0)])).unwrap();

        assert_eq!(data.matrix.nnz(), 2);
        assert_eq!(data.num_ratings(), 3);
        assert_eq!(data.matrix.get(0, 0), 2.0);
    }

    #[test]
    fn empty_input_fails() {
        match build(&[]) {
            Err(RecoError::EmptyInput) => {},
            other => panic!("expected EmptyInput, got {:?}", other),
        }
    }
}
