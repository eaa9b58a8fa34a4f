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

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::Result;
use crate::types::SparseMatrix;

/// Common interface of all recommenders we evaluate. A recommender borrows the training matrix
/// in `fit` and afterwards only reads its state, so `recommend` can be called concurrently.
pub trait Recommender<'a>: Sync {

    fn name(&self) -> &str;

    fn fit(&mut self, train: &'a SparseMatrix) -> Result<()>;

    /// Returns at most `n` items for `user`, best first. With `filter_liked`, items the user
    /// interacted with in the training data are never returned.
    fn recommend(&self, user: usize, n: usize, filter_liked: bool) -> Result<Vec<ScoredItem>>;
}

/// An item index with its score for a particular user
#[derive(Clone, Copy, Debug)]
pub struct ScoredItem {
    pub item: usize,
    pub score: f32,
}

/// Ranking order: higher scores come first, ties go to the lower item index. The order is
/// reversed so that the root of a max-heap is the worst item seen so far. There is no total
/// order on floats, incomparable scores fall back to the item index.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        _ => scored_item_a.item.cmp(&scored_item_b.item),
    }
}

impl PartialEq for ScoredItem {
    fn eq(&self, other: &Self) -> bool {
        cmp_reverse(self, other) == Ordering::Equal
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// Selects the `n` best candidates with a bounded heap and returns them best first.
pub fn top_n<I>(candidates: I, n: usize) -> Vec<ScoredItem>
    where I: IntoIterator<Item=ScoredItem> {

    if n == 0 {
        return Vec::new();
    }

    let mut heap = BinaryHeap::with_capacity(n);

    for scored_item in candidates {
        if heap.len() < n {
            heap.push(scored_item);
        } else if let Some(mut top) = heap.peek_mut() {
            if scored_item < *top {
                *top = scored_item;
            }
        }
    }

    heap.into_sorted_vec()
}

/// Item indices of a recommendation list, in rank order.
pub fn item_indices(recommendations: &[ScoredItem]) -> Vec<usize> {
    recommendations.iter().map(|scored_item| scored_item.item).collect()
}


#[cfg(test)]
mod tests {

    use super::{top_n, ScoredItem};

    #[test]
    fn scored_item_ordering_reversed() {
        let item_a = ScoredItem { item: 1, score: 0.5 };
        let item_b = ScoredItem { item: 2, score: 1.5 };
        let item_c = ScoredItem { item: 3, score: 0.3 };

        assert!(item_a > item_b);
        assert!(item_a < item_c);
        assert!(item_b < item_c);
    }

    #[test]
    fn ties_prefer_lower_index() {
        let item_a = ScoredItem { item: 4, score: 1.0 };
        let item_b = ScoredItem { item: 9, score: 1.0 };

        assert!(item_a < item_b);
    }

    #[test]
    fn topn() {
        let items = vec![
            ScoredItem { item: 1, score: 0.5 },
            ScoredItem { item: 2, score: 1.5 },
            ScoredItem { item: 3, score: 0.3 },
            ScoredItem { item: 4, score: 3.5 },
            ScoredItem { item: 5, score: 2.5 },
        ];

        let top = top_n(items, 3);

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].item, 4);
        assert_eq!(top[1].item, 5);
        assert_eq!(top[2].item, 2);
        assert_eq!(top[2].score, 1.5);
    }

    #[test]
    fn topn_with_ties_is_deterministic() {
        let items: Vec<ScoredItem> = (0..10)
            .rev()
            .map(|item| ScoredItem { item, score: if item % 2 == 0 { 1.0 } else { 0.0 } })
            .collect();

        let top = top_n(items, 4);
        let indices: Vec<usize> = top.iter().map(|scored_item| scored_item.item).collect();

        assert_eq!(indices, vec![0, 2, 4, 6]);
    }

    #[test]
    fn topn_with_fewer_candidates() {
        let items = vec![ScoredItem { item: 7, score: 0.1 }];

        assert_eq!(top_n(items.clone(), 5).len(), 1);
        assert!(top_n(items, 0).is_empty());
    }
}
