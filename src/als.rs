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
use std::time::Instant;

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scoped_pool::Pool;
use tracing::{debug, enabled, Level};

use crate::config::FactorizationParams;
use crate::error::{RecoError, Result};
use crate::types::{SparseMatrix, SparseRow};

/// Latent factors learned from an interaction matrix, one row per user and per item.
#[derive(Clone, Debug, PartialEq)]
pub struct LatentFactors {
    pub user_factors: Array2<f32>,
    pub item_factors: Array2<f32>,
}

impl LatentFactors {

    /// Predicted preference of `user` for every item.
    pub fn scores(&self, user: usize) -> Array1<f32> {
        self.item_factors.dot(&self.user_factors.row(user))
    }
}

/// Alternating least squares for implicit feedback.
///
/// Observed cells have confidence `|alpha * rating|` and preference 1 if the rating is positive,
/// 0 otherwise. All other cells have preference 0 and confidence 1. Every half step solves, for each row `u`, the system
/// `(YᵀY + Σ (c_ui - 1) y_i y_iᵀ + λI) x_u = Σ c_ui y_i` with a Cholesky decomposition. The rows
/// are independent, so they are solved in parallel without affecting the result.
pub struct AlternatingLeastSquares {
    params: FactorizationParams,
    num_threads: usize,
}

impl AlternatingLeastSquares {

    pub fn new(params: FactorizationParams, num_threads: usize) -> Self {
        AlternatingLeastSquares { params, num_threads: num_threads.max(1) }
    }

    pub fn params(&self) -> &FactorizationParams {
        &self.params
    }

    pub fn fit(&self, interactions: &SparseMatrix) -> Result<LatentFactors> {

        let num_factors = self.params.factors;
        if num_factors == 0 {
            return Err(RecoError::InvalidConfig("factors must be positive".to_string()));
        }
        if !(self.params.regularization > 0.0) {
            return Err(RecoError::InvalidConfig("regularization must be positive".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(self.params.random_state);

        let mut user_factors = Array2::from_shape_fn(
            (interactions.num_rows(), num_factors), |_| rng.gen::<f32>() * 0.01);
        let mut item_factors = Array2::from_shape_fn(
            (interactions.num_cols(), num_factors), |_| rng.gen::<f32>() * 0.01);

        let transposed = interactions.transpose();

        let pool = Pool::new(self.num_threads);
        let training_start = Instant::now();

        let result = (0..self.params.iterations).try_for_each(|iteration| -> Result<()> {
            self.solve_half_step(&pool, &mut user_factors, item_factors.view(), interactions)?;
            self.solve_half_step(&pool, &mut item_factors, user_factors.view(), &transposed)?;

            if enabled!(Level::DEBUG) {
                let loss = observed_loss(interactions, &user_factors, &item_factors, self.params.alpha);
                debug!("ALS iteration {}: loss on observed cells = {:.4}", iteration, loss);
            }

            Ok(())
        });

        pool.shutdown();
        result?;

        debug!(
            "Factorized {}x{} matrix with {} factors in {}ms",
            interactions.num_rows(),
            interactions.num_cols(),
            num_factors,
            training_start.elapsed().as_millis(),
        );

        Ok(LatentFactors { user_factors, item_factors })
    }

    fn solve_half_step(
        &self,
        pool: &Pool,
        target: &mut Array2<f32>,
        fixed: ArrayView2<'_, f32>,
        interactions: &SparseMatrix,
    ) -> Result<()> {

        let num_rows = target.nrows();
        if num_rows == 0 {
            return Ok(());
        }

        let gram = fixed.t().dot(&fixed).mapv(f64::from);
        let chunk_size = (num_rows + self.num_threads - 1) / self.num_threads;
        let failure: Mutex<Option<RecoError>> = Mutex::new(None);

        let lambda = f64::from(self.params.regularization);
        let alpha = self.params.alpha;

        pool.scoped(|scope| {
            for (chunk_index, mut chunk) in target.axis_chunks_iter_mut(Axis(0), chunk_size).enumerate() {

                let gram = &gram;
                let fixed = &fixed;
                let failure = &failure;

                scope.execute(move || {
                    let first_row = chunk_index * chunk_size;

                    for (offset, mut row) in chunk.outer_iter_mut().enumerate() {
                        let ratings = interactions.row(first_row + offset);

                        match solve_row(ratings, fixed, gram, lambda, alpha) {
                            Ok(solution) => row.assign(&solution),
                            Err(error) => {
                                if let Ok(mut slot) = failure.lock() {
                                    slot.get_or_insert(error);
                                }
                                return;
                            }
                        }
                    }
                });
            }
        });

        match failure.into_inner() {
            Ok(Some(error)) => Err(error),
            Ok(None) => Ok(()),
            Err(_) => Err(RecoError::WorkerFailed),
        }
    }
}

fn solve_row(
    ratings: SparseRow<'_>,
    fixed: &ArrayView2<'_, f32>,
    gram: &Array2<f64>,
    lambda: f64,
    alpha: f32,
) -> Result<Array1<f32>> {

    let num_factors = gram.nrows();

    let mut a = gram.clone();
    let mut b = Array1::<f64>::zeros(num_factors);

    for (col, rating) in ratings.iter() {
        let y = fixed.row(col);
        let weighted = f64::from(alpha * rating);
        let confidence = weighted.abs();

        for i in 0..num_factors {
            let y_i = f64::from(y[i]);
            for j in 0..num_factors {
                a[[i, j]] += (confidence - 1.0) * y_i * f64::from(y[j]);
            }
            if weighted > 0.0 {
                b[i] += confidence * y_i;
            }
        }
    }

    for i in 0..num_factors {
        a[[i, i]] += lambda;
    }

    let x = cholesky_solve(&a, &b)?;

    Ok(x.mapv(|value| value as f32))
}

/// Solves `a * x = b` for a symmetric positive definite `a`.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();

    // a = l * lᵀ
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diagonal = a[[i, i]] - sum;
                if diagonal <= 0.0 || !diagonal.is_finite() {
                    return Err(RecoError::Factorization(
                        "normal equations are not positive definite".to_string()));
                }
                l[[i, j]] = diagonal.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Ok(x)
}

/// Confidence-weighted squared error on the observed cells only.
fn observed_loss(
    interactions: &SparseMatrix,
    user_factors: &Array2<f32>,
    item_factors: &Array2<f32>,
    alpha: f32,
) -> f64 {

    let mut loss = 0.0;

    for (user, item, rating) in interactions.iter() {
        let weighted = f64::from(alpha * rating);
        let preference = if weighted > 0.0 { 1.0 } else { 0.0 };
        let error = preference - f64::from(user_factors.row(user).dot(&item_factors.row(item)));
        loss += weighted.abs() * error * error;
    }

    if interactions.nnz() > 0 {
        loss / interactions.nnz() as f64
    } else {
        0.0
    }
}


#[cfg(test)]
mod tests {

    use ndarray::{arr1, arr2};

    use super::{cholesky_solve, AlternatingLeastSquares};
    use crate::config::FactorizationParams;
    use crate::error::RecoError;
    use crate::types::SparseMatrix;

    fn params(factors: usize) -> FactorizationParams {
        FactorizationParams { factors, regularization: 0.01, iterations: 10, random_state: 42, alpha: 1.0 }
    }

    /// Two blocks of users with disjoint tastes
    fn block_interactions() -> SparseMatrix {
        let mut triplets = Vec::new();
        for user in 0..6 {
            let items = if user < 3 { 0..4 } else { 4..8 };
            for item in items {
                if (user + item) % 3 != 0 {
                    triplets.push((user, item, 4.0));
                }
            }
        }
        SparseMatrix::from_triplets(6, 8, triplets).unwrap()
    }

    #[test]
    fn cholesky() {
        let a = arr2(&[[4.0, 2.0], [2.0, 3.0]]);
        let b = arr1(&[2.0, 5.0]);

        let x = cholesky_solve(&a, &b).unwrap();

        assert!((4.0 * x[0] + 2.0 * x[1] - 2.0).abs() < 1e-10);
        assert!((2.0 * x[0] + 3.0 * x[1] - 5.0).abs() < 1e-10);
    }

    #[test]
    fn cholesky_rejects_indefinite_systems() {
        let a = arr2(&[[1.0, 2.0], [2.0, 1.0]]);
        let b = arr1(&[1.0, 1.0]);

        assert!(matches!(cholesky_solve(&a, &b), Err(RecoError::Factorization(_))));
    }

    #[test]
    fn factors_have_the_expected_shape() {
        let factors = AlternatingLeastSquares::new(params(3), 2).fit(&block_interactions()).unwrap();

        assert_eq!(factors.user_factors.dim(), (6, 3));
        assert_eq!(factors.item_factors.dim(), (8, 3));
    }

    #[test]
    fn same_seed_same_factors_regardless_of_threads() {
        let interactions = block_interactions();

        let single = AlternatingLeastSquares::new(params(4), 1).fit(&interactions).unwrap();
        let multi = AlternatingLeastSquares::new(params(4), 3).fit(&interactions).unwrap();

        assert_eq!(single, multi);
    }

    #[test]
    fn observed_items_score_higher_within_the_block() {
        let interactions = block_interactions();
        let factors = AlternatingLeastSquares::new(params(4), 2).fit(&interactions).unwrap();

        let scores = factors.scores(0);
        let own_block: f32 = (0..4).map(|item| scores[item]).sum();
        let other_block: f32 = (4..8).map(|item| scores[item]).sum();

        assert!(own_block > other_block);
    }

    #[test]
    fn users_without_interactions_get_zero_factors() {
        let interactions = SparseMatrix::from_triplets(2, 2, vec![(0, 0, 1.0), (0, 1, 2.0)]).unwrap();
        let factors = AlternatingLeastSquares::new(params(2), 1).fit(&interactions).unwrap();

        assert!(factors.user_factors.row(1).iter().all(|&value| value == 0.0));
    }

    #[test]
    fn negative_ratings_are_fitted_as_negative_preferences() {
        let interactions = SparseMatrix::from_triplets(2, 3, vec![
            (0, 0, -2.0), (0, 1, 4.0), (1, 1, 3.0), (1, 2, -0.5),
        ]).unwrap();

        let factors = AlternatingLeastSquares::new(params(5), 2).fit(&interactions).unwrap();

        assert!(factors.user_factors.iter().all(|value| value.is_finite()));
        let scores = factors.scores(0);
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn more_factors_than_interactions_still_fit() {
        let interactions = SparseMatrix::from_triplets(2, 2, vec![(0, 0, 1.0), (1, 1, 2.0)]).unwrap();

        let factors = AlternatingLeastSquares::new(params(5), 1).fit(&interactions).unwrap();

        assert_eq!(factors.item_factors.dim(), (2, 5));
    }

    #[test]
    fn zero_regularization_is_rejected() {
        let interactions = SparseMatrix::from_triplets(2, 2, vec![(0, 0, 1.0), (1, 1, 2.0)]).unwrap();
        let mut unregularized = params(5);
        unregularized.regularization = 0.0;

        assert!(matches!(
            AlternatingLeastSquares::new(unregularized, 1).fit(&interactions),
            Err(RecoError::InvalidConfig(_))
        ));
    }
}
