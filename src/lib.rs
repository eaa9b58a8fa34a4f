/*
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

//! Offline evaluation of recommenders on explicit rating data.
//!
//! Ratings are turned into a sparse user x item matrix, split per user into training and test
//! interactions, and two recommenders are scored on the held-out interactions with Precision@k
//! and NDCG@k: a factorization model trained with alternating least squares and a content-based
//! model which ranks items by the similarity of their TF-IDF genre vectors to a user profile.

pub mod als;
pub mod config;
pub mod content;
pub mod error;
pub mod factorization;
pub mod features;
pub mod interactions;
pub mod io;
pub mod mapping;
pub mod metrics;
pub mod pipeline;
pub mod recommend;
pub mod split;
pub mod tfidf;
pub mod types;


pub use crate::config::PipelineConfig;
pub use crate::content::ContentBasedRecommender;
pub use crate::error::{RecoError, Result};
pub use crate::factorization::FactorizationRecommender;
pub use crate::metrics::{ndcg_at_k, precision_at_k, EvaluationReport, Evaluator};
pub use crate::recommend::{Recommender, ScoredItem};
pub use crate::types::SparseMatrix;
