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

use fnv::FnvHashMap;

/// Bijection between the identifiers found in the data and consecutive integer indices. Indices
/// are assigned in ascending order of the identifiers, so identical input always yields the same
/// mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexMapping {
    ids: Vec<i64>,
    indices: FnvHashMap<i64, usize>,
}

impl IndexMapping {

    pub fn from_ids<I>(ids: I) -> Self where I: IntoIterator<Item=i64> {

        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let mut indices: FnvHashMap<i64, usize> =
            FnvHashMap::with_capacity_and_hasher(ids.len(), Default::default());

        for (index, id) in ids.iter().enumerate() {
            indices.insert(*id, index);
        }

        IndexMapping { ids, indices }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: i64) -> Option<usize> {
        self.indices.get(&id).cloned()
    }

    pub fn id_of(&self, index: usize) -> Option<i64> {
        self.ids.get(index).cloned()
    }

    /// All identifiers, ordered by their index.
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}


#[cfg(test)]
mod tests {

    use super::IndexMapping;

    #[test]
    fn indices_follow_sorted_ids() {
        let mapping = IndexMapping::from_ids(vec![42, 7, 19, 7, 42]);

        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.ids(), &[7, 19, 42]);
        assert_eq!(mapping.index_of(7), Some(0));
        assert_eq!(mapping.index_of(19), Some(1));
        assert_eq!(mapping.index_of(42), Some(2));
        assert_eq!(mapping.index_of(8), None);
    }

    #[test]
    fn mapping_is_a_bijection() {
        let mapping = IndexMapping::from_ids(vec![1000, -3, 55, 1_000_000_007, 55]);

        for index in 0..mapping.len() {
            let id = mapping.id_of(index).unwrap();
            assert_eq!(mapping.index_of(id), Some(index));
        }

        for &id in &[1000, -3, 55, 1_000_000_007] {
            let index = mapping.index_of(id).unwrap();
            assert_eq!(mapping.id_of(index), Some(id));
        }

        assert_eq!(mapping.id_of(mapping.len()), None);
    }
}
