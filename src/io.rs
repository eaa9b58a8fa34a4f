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
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_derive::Deserialize;
use tracing::info;

use crate::config::DataConfig;
use crate::error::{RecoError, Result};
use crate::features::ItemMetadata;
use crate::interactions::Rating;

/// Directory inside the cache directory that the dataset archive extracts to.
pub const DATASET_DIR: &str = "ml-latest-small";
pub const RATINGS_FILE: &str = "ratings.csv";
pub const ITEMS_FILE: &str = "movies.csv";

#[derive(Debug, Deserialize)]
struct RatingRecord {
    #[serde(rename = "userId")]
    user_id: i64,
    #[serde(rename = "movieId")]
    item_id: i64,
    rating: f32,
}

#[derive(Debug, Deserialize)]
struct ItemRecord {
    #[serde(rename = "movieId")]
    item_id: i64,
    genres: String,
}

/// Reads a comma separated input file with a header line.
pub fn csv_reader<P: AsRef<Path>>(file: P) -> Result<csv::Reader<File>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(file)?;

    Ok(reader)
}

/// Reads `userId,movieId,rating[,...]` records. Additional columns are ignored.
pub fn read_ratings<P: AsRef<Path>>(file: P) -> Result<Vec<Rating>> {
    let mut reader = csv_reader(file)?;

    reader.deserialize()
        .map(|record| {
            let record: RatingRecord = record?;
            Ok(Rating { user_id: record.user_id, item_id: record.item_id, rating: record.rating })
        })
        .collect()
}

/// Reads `movieId,title,genres` records, the genres become the feature text of the item.
pub fn read_item_metadata<P: AsRef<Path>>(file: P) -> Result<Vec<ItemMetadata>> {
    let mut reader = csv_reader(file)?;

    reader.deserialize()
        .map(|record| {
            let record: ItemRecord = record?;
            Ok(ItemMetadata { item_id: record.item_id, feature_text: record.genres })
        })
        .collect()
}

/// Paths of the extracted dataset files below the configured cache directory.
pub fn dataset_paths(config: &DataConfig) -> (PathBuf, PathBuf) {
    let base = config.local_cache_dir.join(DATASET_DIR);
    (base.join(RATINGS_FILE), base.join(ITEMS_FILE))
}

/// Loads ratings and item metadata from the local cache. Missing files are reported together
/// with the url to obtain them from.
pub fn load_dataset(config: &DataConfig) -> Result<(Vec<Rating>, Vec<ItemMetadata>)> {
    let (ratings_path, items_path) = dataset_paths(config);

    for path in &[&ratings_path, &items_path] {
        if !path.is_file() {
            return Err(RecoError::MissingDataset {
                path: path.to_path_buf(),
                download_url: config.download_url.clone(),
            });
        }
    }

    info!("Loading {} and {}", ratings_path.display(), items_path.display());

    let ratings = read_ratings(&ratings_path)?;
    let items = read_item_metadata(&items_path)?;

    info!("Found {} ratings and metadata for {} items", ratings.len(), items.len());

    Ok((ratings, items))
}

/// Writes `value` as JSON. If an `output_path` is supplied, we write to a file at the specified
/// path, otherwise, we output to stdout.
pub fn write_json<T: Serialize>(value: &T, output_path: Option<&Path>) -> Result<()> {

    let mut out: Box<dyn Write> = match output_path {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(stdout()),
    };

    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;

    Ok(())
}


#[cfg(test)]
mod tests {

    use std::fs;

    use super::{load_dataset, read_item_metadata, read_ratings, write_json, DATASET_DIR};
    use crate::config::DataConfig;
    use crate::error::RecoError;

    const RATINGS: &str = "userId,movieId,rating,timestamp\n\
                           1,1,4.0,964982703\n\
                           1,3,4.5,964981247\n\
                           6,1,2.5,845553522\n";

    const MOVIES: &str = "movieId,title,genres\n\
                          1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy\n\
                          3,\"American President, The (1995)\",Comedy|Drama|Romance\n";

    fn dataset_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join(DATASET_DIR);
        fs::create_dir_all(&dataset).unwrap();
        fs::write(dataset.join("ratings.csv"), RATINGS).unwrap();
        fs::write(dataset.join("movies.csv"), MOVIES).unwrap();
        dir
    }

    #[test]
    fn reading_ratings() {
        let dir = dataset_dir();
        let ratings = read_ratings(dir.path().join(DATASET_DIR).join("ratings.csv")).unwrap();

        assert_eq!(ratings.len(), 3);
        assert_eq!(ratings[1].user_id, 1);
        assert_eq!(ratings[1].item_id, 3);
        assert_eq!(ratings[1].rating, 4.5);
    }

    #[test]
    fn reading_metadata_with_quoted_titles() {
        let dir = dataset_dir();
        let items = read_item_metadata(dir.path().join(DATASET_DIR).join("movies.csv")).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].item_id, 3);
        assert_eq!(items[1].feature_text, "Comedy|Drama|Romance");
    }

    #[test]
    fn loading_from_cache_dir() {
        let dir = dataset_dir();
        let config = DataConfig { local_cache_dir: dir.path().to_path_buf(), ..DataConfig::default() };

        let (ratings, items) = load_dataset(&config).unwrap();

        assert_eq!(ratings.len(), 3);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn missing_dataset_names_the_download_url() {
        let dir = tempfile::tempdir().unwrap();
        let config = DataConfig {
            download_url: "https://example.org/data.zip".to_string(),
            local_cache_dir: dir.path().to_path_buf(),
        };

        match load_dataset(&config) {
            Err(RecoError::MissingDataset { download_url, .. }) => {
                assert_eq!(download_url, "https://example.org/data.zip");
            },
            other => panic!("expected MissingDataset, got {:?}", other.map(|(r, _)| r.len())),
        }
    }

    #[test]
    fn malformed_ratings_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.csv");
        fs::write(&path, "userId,movieId,rating\n1,abc,4.0\n").unwrap();

        assert!(matches!(read_ratings(&path), Err(RecoError::Csv(_))));
    }

    #[test]
    fn writing_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        write_json(&vec![1, 2, 3], Some(&path)).unwrap();

        let written: Vec<u32> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, vec![1, 2, 3]);
    }
}
