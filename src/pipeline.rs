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

use std::time::Instant;

use serde_derive::Serialize;
use tracing::info;

use crate::config::PipelineConfig;
use crate::content::ContentBasedRecommender;
use crate::error::Result;
use crate::factorization::FactorizationRecommender;
use crate::features::{self, ItemMetadata};
use crate::interactions::{self, Rating};
use crate::io;
use crate::metrics::Evaluator;
use crate::recommend::Recommender;
use crate::split::train_test_split;
use crate::types::SparseMatrix;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelReport {
    pub name: String,
    pub precision: f64,
    pub ndcg: f64,
    pub num_users: usize,
    pub elapsed_ms: u128,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineReport {
    pub k: usize,
    pub num_users: usize,
    pub num_items: usize,
    pub num_ratings: usize,
    pub train_nnz: usize,
    pub test_nnz: usize,
    pub models: Vec<ModelReport>,
}

/// Loads the dataset from the local cache and evaluates both recommenders on it.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    let (ratings, metadata) = io::load_dataset(&config.data)?;
    evaluate(config, &ratings, &metadata)
}

/// Builds the matrices, splits the ratings and evaluates the factorization and the content-based
/// recommender on the same split.
pub fn evaluate(
    config: &PipelineConfig,
    ratings: &[Rating],
    metadata: &[ItemMetadata],
) -> Result<PipelineReport> {

    config.validate()?;

    info!("Creating interaction matrix from {} ratings", ratings.len());
    let data = interactions::build(ratings)?;

    info!(
        "Found {} interactions between {} users and {} items",
        data.matrix.nnz(),
        data.num_users(),
        data.num_items(),
    );

    info!("Building TF-IDF matrix from item genres");
    let features = features::build(metadata, &data.items)?;

    let evaluation = &config.evaluation;
    let (train, test) = train_test_split(&data.matrix, evaluation.train_fraction, evaluation.split_seed)?;

    info!("Split into {} training and {} test interactions", train.nnz(), test.nnz());

    let evaluator = Evaluator::new(evaluation.k).with_threads(evaluation.num_threads);

    let mut als = FactorizationRecommender::new(config.factorization.clone(), evaluation.num_threads);
    let als_report = fit_and_evaluate(&mut als, &evaluator, &train, &test)?;

    let mut content = ContentBasedRecommender::new(&features.matrix);
    let content_report = fit_and_evaluate(&mut content, &evaluator, &train, &test)?;

    Ok(PipelineReport {
        k: evaluation.k,
        num_users: data.num_users(),
        num_items: data.num_items(),
        num_ratings: data.num_ratings(),
        train_nnz: train.nnz(),
        test_nnz: test.nnz(),
        models: vec![als_report, content_report],
    })
}

fn fit_and_evaluate<'a, R>(
    recommender: &mut R,
    evaluator: &Evaluator,
    train: &'a SparseMatrix,
    test: &SparseMatrix,
) -> Result<ModelReport>
    where R: Recommender<'a> {

    let start = Instant::now();

    info!("Fitting {}", recommender.name());
    recommender.fit(train)?;

    info!("Computing metrics for {}", recommender.name());
    let report = evaluator.evaluate(&*recommender, train, test)?;

    let elapsed_ms = start.elapsed().as_millis();
    info!("{} evaluated in {}ms", recommender.name(), elapsed_ms);

    Ok(ModelReport {
        name: recommender.name().to_string(),
        precision: report.precision,
        ndcg: report.ndcg,
        num_users: report.num_users,
        elapsed_ms,
    })
}
