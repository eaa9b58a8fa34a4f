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

use std::sync::Mutex;

use scoped_pool::Pool;
use serde_derive::Serialize;
use tracing::debug;

use crate::error::{RecoError, Result};
use crate::recommend::{item_indices, Recommender};
use crate::types::SparseMatrix;

/// Fraction of the top-`k` recommendations that are relevant. The denominator is always `k`, so
/// lists with fewer than `k` items are penalised.
pub fn user_precision(recommended: &[usize], relevant: &[usize], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }

    let hits = recommended.iter()
        .take(k)
        .filter(|item| relevant.contains(*item))
        .count();

    hits as f64 / k as f64
}

/// NDCG with binary relevance and a `1 / log2(rank + 2)` discount, normalised by the best
/// possible ordering of `min(|relevant|, k)` hits.
pub fn user_ndcg(recommended: &[usize], relevant: &[usize], k: usize) -> f64 {

    let dcg: f64 = recommended.iter()
        .take(k)
        .enumerate()
        .filter(|(_, item)| relevant.contains(*item))
        .map(|(rank, _)| discount(rank))
        .sum();

    let ideal_dcg: f64 = (0..relevant.len().min(k)).map(discount).sum();

    if ideal_dcg > 0.0 {
        dcg / ideal_dcg
    } else {
        0.0
    }
}

fn discount(rank: usize) -> f64 {
    1.0 / (rank as f64 + 2.0).log2()
}

/// Mean metrics over all users with at least one held-out interaction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub precision: f64,
    pub ndcg: f64,
    pub num_users: usize,
}

/// Scores a recommender against held-out interactions. Each user with a nonempty test row gets
/// `k` recommendations with the user's training items filtered. Users are processed on a pool of
/// `num_threads` workers, and the per-user results are summed in user order so the outcome does
/// not depend on the number of threads.
pub struct Evaluator {
    k: usize,
    num_threads: usize,
}

impl Evaluator {

    pub fn new(k: usize) -> Self {
        Evaluator { k, num_threads: num_cpus::get() }
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads.max(1);
        self
    }

    pub fn evaluate<'a, R>(
        &self,
        recommender: &R,
        train: &SparseMatrix,
        test: &SparseMatrix,
    ) -> Result<EvaluationReport>
        where R: Recommender<'a> + ?Sized {

        if self.k == 0 {
            return Err(RecoError::InvalidConfig("k must be positive".to_string()));
        }
        if train.num_rows() != test.num_rows() {
            return Err(RecoError::DimensionMismatch {
                context: "test matrix rows", expected: train.num_rows(), actual: test.num_rows()
            });
        }
        if train.num_cols() != test.num_cols() {
            return Err(RecoError::DimensionMismatch {
                context: "test matrix columns", expected: train.num_cols(), actual: test.num_cols()
            });
        }

        let users: Vec<usize> = (0..test.num_rows())
            .filter(|user| !test.row(*user).is_empty())
            .collect();

        if users.is_empty() {
            return Err(RecoError::NoEligibleUsers);
        }

        let chunk_size = (users.len() + self.num_threads - 1) / self.num_threads;
        let partials: Vec<Mutex<Option<Result<Vec<(f64, f64)>>>>> = users.chunks(chunk_size)
            .map(|_| Mutex::new(None))
            .collect();

        let pool = Pool::new(self.num_threads);

        pool.scoped(|scope| {
            for (chunk, slot) in users.chunks(chunk_size).zip(partials.iter()) {
                scope.execute(move || {
                    let scores = chunk.iter()
                        .map(|user| self.score_user(recommender, test, *user))
                        .collect::<Result<Vec<_>>>();

                    if let Ok(mut slot) = slot.lock() {
                        *slot = Some(scores);
                    }
                });
            }
        });

        pool.shutdown();

        let mut precision_sum = 0.0;
        let mut ndcg_sum = 0.0;

        for slot in partials {
            let scores = match slot.into_inner() {
                Ok(Some(scores)) => scores?,
                _ => return Err(RecoError::WorkerFailed),
            };

            for (precision, ndcg) in scores {
                precision_sum += precision;
                ndcg_sum += ndcg;
            }
        }

        let num_users = users.len();

        debug!("Evaluated {} on {} users", recommender.name(), num_users);

        Ok(EvaluationReport {
            precision: precision_sum / num_users as f64,
            ndcg: ndcg_sum / num_users as f64,
            num_users,
        })
    }

    fn score_user<'a, R>(&self, recommender: &R, test: &SparseMatrix, user: usize) -> Result<(f64, f64)>
        where R: Recommender<'a> + ?Sized {

        let recommendations = recommender.recommend(user, self.k, true)?;
        let recommended = item_indices(&recommendations);
        let relevant = test.row(user).indices();

        Ok((user_precision(&recommended, relevant, self.k), user_ndcg(&recommended, relevant, self.k)))
    }
}

/// Mean Precision@k over all users with held-out interactions.
pub fn precision_at_k<'a, R>(recommender: &R, train: &SparseMatrix, test: &SparseMatrix, k: usize) -> Result<f64>
    where R: Recommender<'a> + ?Sized {

    Evaluator::new(k).evaluate(recommender, train, test).map(|report| report.precision)
}

/// Mean NDCG@k over all users with held-out interactions.
pub fn ndcg_at_k<'a, R>(recommender: &R, train: &SparseMatrix, test: &SparseMatrix, k: usize) -> Result<f64>
    where R: Recommender<'a> + ?Sized {

    Evaluator::new(k).evaluate(recommender, train, test).map(|report| report.ndcg)
}
