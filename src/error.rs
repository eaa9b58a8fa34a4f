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

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecoError>;

/// Everything that can go wrong between reading the ratings and reporting a metric.
#[derive(Debug, Error)]
pub enum RecoError {
    #[error("no ratings to build an interaction matrix from")]
    EmptyInput,

    #[error("no item has any usable feature text, the vocabulary is empty")]
    EmptyVocabulary,

    #[error("the recommender has not been fitted, call fit() first")]
    NotFitted,

    #[error("dimension mismatch for {context}: expected {expected}, found {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("user index {user} is out of range for {num_users} users")]
    UnknownUser { user: usize, num_users: usize },

    #[error("no test user has a held-out interaction, metrics are undefined")]
    NoEligibleUsers,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("factorization failed: {0}")]
    Factorization(String),

    #[error("a worker thread finished without reporting a result")]
    WorkerFailed,

    #[error("dataset file {path:?} not found, download {download_url} and extract it into the cache directory")]
    MissingDataset { path: PathBuf, download_url: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RecoError {

    /// Short, stable name of the error kind, used when reporting failures on the console.
    pub fn kind(&self) -> &'static str {
        match self {
            RecoError::EmptyInput => "EmptyInputError",
            RecoError::EmptyVocabulary => "EmptyVocabularyError",
            RecoError::NotFitted => "NotFittedError",
            RecoError::DimensionMismatch { .. } => "DimensionMismatchError",
            RecoError::UnknownUser { .. } => "UnknownUserError",
            RecoError::NoEligibleUsers => "NoEligibleUsersError",
            RecoError::InvalidConfig(_) => "InvalidConfigError",
            RecoError::Factorization(_) => "FactorizationError",
            RecoError::WorkerFailed => "WorkerError",
            RecoError::MissingDataset { .. } => "MissingDatasetError",
            RecoError::Io(_) => "IoError",
            RecoError::Csv(_) => "CsvError",
            RecoError::Json(_) => "JsonError",
        }
    }
}


#[cfg(test)]
mod tests {

    use super::RecoError;

    #[test]
    fn kinds_are_reported_by_name() {
        assert_eq!(RecoError::NotFitted.kind(), "NotFittedError");
        assert_eq!(RecoError::NoEligibleUsers.kind(), "NoEligibleUsersError");

        let mismatch = RecoError::DimensionMismatch { context: "test rows", expected: 2, actual: 3 };
        assert_eq!(mismatch.kind(), "DimensionMismatchError");
        assert_eq!(mismatch.to_string(), "dimension mismatch for test rows: expected 2, found 3");
    }
}
