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

use tracing::info;

use crate::als::{AlternatingLeastSquares, LatentFactors};
use crate::config::FactorizationParams;
use crate::error::{RecoError, Result};
use crate::recommend::{top_n, Recommender, ScoredItem};
use crate::types::SparseMatrix;

/// Collaborative filtering via matrix factorization: an item's score for a user is the dot
/// product of their latent factors.
pub struct FactorizationRecommender<'a> {
    als: AlternatingLeastSquares,
    train: Option<&'a SparseMatrix>,
    factors: Option<LatentFactors>,
}

impl<'a> FactorizationRecommender<'a> {

    pub fn new(params: FactorizationParams, num_threads: usize) -> Self {
        FactorizationRecommender {
            als: AlternatingLeastSquares::new(params, num_threads),
            train: None,
            factors: None,
        }
    }

    pub fn factors(&self) -> Option<&LatentFactors> {
        self.factors.as_ref()
    }
}

impl<'a> Recommender<'a> for FactorizationRecommender<'a> {

    fn name(&self) -> &str {
        "ALS (collaborative filtering)"
    }

    fn fit(&mut self, train: &'a SparseMatrix) -> Result<()> {
        let params = self.als.params();
        info!(
            "Fitting ALS with {} factors, regularization {}, {} iterations",
            params.factors, params.regularization, params.iterations,
        );

        let factors = self.als.fit(train)?;

        self.train = Some(train);
        self.factors = Some(factors);

        Ok(())
    }

    fn recommend(&self, user: usize, n: usize, filter_liked: bool) -> Result<Vec<ScoredItem>> {

        let (train, factors) = match (self.train, self.factors.as_ref()) {
            (Some(train), Some(factors)) => (train, factors),
            _ => return Err(RecoError::NotFitted),
        };

        if user >= train.num_rows() {
            return Err(RecoError::UnknownUser { user, num_users: train.num_rows() });
        }

        let liked = train.row(user);
        let scores = factors.scores(user);

        let candidates = scores.iter()
            .enumerate()
            .filter(|(item, _)| !filter_liked || !liked.contains(*item))
            .map(|(item, score)| ScoredItem { item, score: *score });

        Ok(top_n(candidates, n))
    }
}
