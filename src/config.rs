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

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_derive::{Deserialize, Serialize};

use crate::error::{RecoError, Result};

pub const DEFAULT_DOWNLOAD_URL: &str =
    "https://files.grouplens.org/datasets/movielens/ml-latest-small.zip";

/// Hyperparameters of the alternating least squares factorization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorizationParams {
    /// Dimensionality of the latent factors
    pub factors: usize,
    pub regularization: f32,
    pub iterations: usize,
    /// Seed for the initialisation of the factors
    pub random_state: u64,
    /// Scales ratings into confidences
    pub alpha: f32,
}

impl Default for FactorizationParams {
    fn default() -> Self {
        FactorizationParams {
            factors: 50,
            regularization: 0.01,
            iterations: 20,
            random_state: 42,
            alpha: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Length of the recommendation lists that are scored
    pub k: usize,
    pub train_fraction: f64,
    pub split_seed: u64,
    pub num_threads: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            k: 10,
            train_fraction: 0.8,
            split_seed: 42,
            num_threads: num_cpus::get(),
        }
    }
}

/// Where the dataset comes from and where its extracted files live.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub download_url: String,
    pub local_cache_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
            local_cache_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub factorization: FactorizationParams,
    pub evaluation: EvaluationConfig,
    pub data: DataConfig,
}

impl PipelineConfig {

    /// Reads a JSON configuration. Missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| Err(RecoError::InvalidConfig(message.to_string()));

        if self.evaluation.k == 0 {
            return invalid("k must be positive");
        }
        if self.evaluation.num_threads == 0 {
            return invalid("num_threads must be positive");
        }
        if !(0.0..=1.0).contains(&self.evaluation.train_fraction) {
            return invalid("train_fraction must be within [0, 1]");
        }
        if self.factorization.factors == 0 {
            return invalid("factors must be positive");
        }
        if !(self.factorization.regularization > 0.0) {
            return invalid("regularization must be positive");
        }
        if !(self.factorization.alpha > 0.0) {
            return invalid("alpha must be positive");
        }

        Ok(())
    }
}
