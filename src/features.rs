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

use tracing::debug;

use crate::error::Result;
use crate::mapping::IndexMapping;
use crate::tfidf::{TermWeights, TfidfVectorizer};

/// Separator between the tags of an item, e.g. `Adventure|Animation|Children`.
pub const TAG_DELIMITER: char = '|';

/// Descriptive text of an item, keyed by its dataset identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemMetadata {
    pub item_id: i64,
    pub feature_text: String,
}

impl<S: Into<String>> From<(i64, S)> for ItemMetadata {
    fn from((item_id, feature_text): (i64, S)) -> Self {
        ItemMetadata { item_id, feature_text: feature_text.into() }
    }
}

/// Builds the item x term matrix. Row `i` holds the weights of the item with index `i` in
/// `items`. Metadata for items that were never rated is ignored, and rated items without
/// metadata end up with an empty row.
pub fn build(metadata: &[ItemMetadata], items: &IndexMapping) -> Result<TermWeights> {

    let mut documents: Vec<String> = vec![String::new(); items.len()];
    let mut num_unmapped = 0;

    for entry in metadata {
        match items.index_of(entry.item_id) {
            Some(index) => documents[index] = entry.feature_text.replace(TAG_DELIMITER, " "),
            None => num_unmapped += 1,
        }
    }

    debug!("Ignoring metadata of {} items without ratings", num_unmapped);

    let weights = TfidfVectorizer::new().fit_transform(&documents)?;

    debug!(
        "Built {}x{} feature matrix with {} nonzero weights",
        weights.matrix.num_rows(),
        weights.matrix.num_cols(),
        weights.matrix.nnz(),
    );

    Ok(weights)
}
