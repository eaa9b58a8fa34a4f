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

use std::sync::{Arc, Mutex};

use fnv::FnvHashMap;

use crate::error::{RecoError, Result};
use crate::recommend::{top_n, Recommender, ScoredItem};
use crate::types::{new_dense_vector, DenseVector, SparseMatrix, SparseRow};

/// Score assigned to items from the user's history when they are filtered. It lies below any
/// cosine similarity.
pub const FILTERED_SCORE: f32 = -1.0;

/// Content-based recommender. A user's profile is the mean of the feature vectors of the items
/// in the user's training history, and items are ranked by their cosine similarity to that profile.
///
/// Every call recomputes the profile and scores all items, which costs O(items x terms) per
/// user. `with_profile_cache` memoises the profiles across calls.
pub struct ContentBasedRecommender<'a> {
    features: &'a SparseMatrix,
    item_norms: Vec<f32>,
    train: Option<&'a SparseMatrix>,
    profile_cache: Option<Mutex<FnvHashMap<usize, Arc<DenseVector>>>>,
}

impl<'a> ContentBasedRecommender<'a> {

    pub fn new(features: &'a SparseMatrix) -> Self {
        let item_norms = (0..features.num_rows())
            .map(|item| features.row(item).norm())
            .collect();

        ContentBasedRecommender { features, item_norms, train: None, profile_cache: None }
    }

    pub fn with_profile_cache(mut self) -> Self {
        self.profile_cache = Some(Mutex::new(FnvHashMap::default()));
        self
    }

    fn fitted_train(&self) -> Result<&'a SparseMatrix> {
        self.train.ok_or(RecoError::NotFitted)
    }

    /// Element-wise mean of the feature vectors of the items in `history`.
    pub fn user_profile(&self, history: SparseRow<'_>) -> DenseVector {
        let mut profile = new_dense_vector(self.features.num_cols());

        if history.is_empty() {
            return profile;
        }

        for item in history.indices() {
            for (term, weight) in self.features.row(*item).iter() {
                profile[term] += weight;
            }
        }

        let num_items = history.len() as f32;
        for weight in profile.iter_mut() {
            *weight /= num_items;
        }

        profile
    }

    fn cached_profile(&self, user: usize, history: SparseRow<'_>) -> Arc<DenseVector> {
        match &self.profile_cache {
            Some(cache) => {
                if let Ok(cached) = cache.lock() {
                    if let Some(profile) = cached.get(&user) {
                        return Arc::clone(profile);
                    }
                }

                let profile = Arc::new(self.user_profile(history));
                if let Ok(mut cached) = cache.lock() {
                    cached.insert(user, Arc::clone(&profile));
                }
                profile
            },
            None => Arc::new(self.user_profile(history)),
        }
    }

    /// Cosine similarity between `profile` and every item. Zero vectors have similarity 0.
    pub fn similarities(&self, profile: &[f32]) -> Vec<f32> {
        let profile_norm = profile.iter().map(|weight| weight * weight).sum::<f32>().sqrt();

        (0..self.features.num_rows())
            .map(|item| {
                let item_norm = self.item_norms[item];
                if profile_norm == 0.0 || item_norm == 0.0 {
                    0.0
                } else {
                    self.features.row(item).dot_dense(profile) / (profile_norm * item_norm)
                }
            })
            .collect()
    }

    /// Similarity of every item to the user's profile. With `filter_liked`, the items of the
    /// user's history are set to `FILTERED_SCORE`. Returns `None` for users without history.
    pub fn scores(&self, user: usize, filter_liked: bool) -> Result<Option<Vec<f32>>> {
        let train = self.fitted_train()?;

        if user >= train.num_rows() {
            return Err(RecoError::UnknownUser { user, num_users: train.num_rows() });
        }

        let history = train.row(user);
        if history.is_empty() {
            return Ok(None);
        }

        let profile = self.cached_profile(user, history);
        let mut scores = self.similarities(&profile);

        if filter_liked {
            for item in history.indices() {
                scores[*item] = FILTERED_SCORE;
            }
        }

        Ok(Some(scores))
    }
}

impl<'a> Recommender<'a> for ContentBasedRecommender<'a> {

    fn name(&self) -> &str {
        "Content-based (TF-IDF)"
    }

    fn fit(&mut self, train: &'a SparseMatrix) -> Result<()> {
        if train.num_cols() != self.features.num_rows() {
            return Err(RecoError::DimensionMismatch {
                context: "feature matrix rows",
                expected: train.num_cols(),
                actual: self.features.num_rows(),
            });
        }

        self.train = Some(train);

        if let Some(cache) = &self.profile_cache {
            if let Ok(mut cached) = cache.lock() {
                cached.clear();
            }
        }

        Ok(())
    }

    fn recommend(&self, user: usize, n: usize, filter_liked: bool) -> Result<Vec<ScoredItem>> {

        let scores = match self.scores(user, filter_liked)? {
            Some(scores) => scores,
            None => return Ok(Vec::new()),
        };

        let history = self.fitted_train()?.row(user);

        let candidates = scores.into_iter()
            .enumerate()
            .filter(|(item, _)| !filter_liked || !history.contains(*item))
            .map(|(item, score)| ScoredItem { item, score });

        Ok(top_n(candidates, n))
    }
}
