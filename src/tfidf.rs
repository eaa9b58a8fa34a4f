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

use fnv::{FnvHashMap, FnvHashSet};

use crate::error::{RecoError, Result};
use crate::types::SparseMatrix;

/// Common english words which carry no signal for similarity and are dropped from the
/// vocabulary.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
    "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
    "amongst", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below",
    "beside", "besides", "between", "beyond", "both", "but", "by", "can", "cannot", "could",
    "did", "do", "does", "doing", "done", "down", "due", "during", "each", "eg", "either",
    "else", "elsewhere", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "for", "former", "formerly", "from", "further", "had",
    "has", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein", "hers",
    "herself", "him", "himself", "his", "how", "however", "i", "ie", "if", "in", "indeed",
    "into", "is", "it", "its", "itself", "just", "last", "latter", "least", "less", "many",
    "may", "me", "meanwhile", "might", "mine", "more", "moreover", "most", "mostly", "much",
    "must", "my", "myself", "namely", "neither", "never", "nevertheless", "next", "no",
    "nobody", "none", "noone", "nor", "not", "nothing", "now", "nowhere", "of", "off",
    "often", "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise", "our",
    "ours", "ourselves", "out", "over", "own", "per", "perhaps", "please", "rather", "same",
    "seem", "seemed", "seeming", "seems", "several", "she", "should", "since", "so", "some",
    "somehow", "someone", "something", "sometime", "sometimes", "somewhere", "still", "such",
    "than", "that", "the", "their", "them", "themselves", "then", "thence", "there",
    "thereafter", "thereby", "therefore", "therein", "thereupon", "these", "they", "this",
    "those", "though", "through", "throughout", "thru", "thus", "to", "together", "too",
    "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we",
    "well", "were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter",
    "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while",
    "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
    "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Output of the vectorizer: one L2-normalised row per document, one column per term.
#[derive(Clone, Debug)]
pub struct TermWeights {
    pub matrix: SparseMatrix,
    /// Terms in column order (alphabetical)
    pub vocabulary: Vec<String>,
}

/// TF-IDF vectorizer with smoothed inverse document frequencies.
///
/// Documents are lowercased and split into runs of alphanumeric characters, tokens shorter than
/// two characters and stop words are dropped. A term's weight is its count in the document times
/// `ln((1 + n) / (1 + df)) + 1`, and every row is scaled to unit length.
pub struct TfidfVectorizer {
    stop_words: FnvHashSet<&'static str>,
    min_token_length: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        TfidfVectorizer {
            stop_words: ENGLISH_STOP_WORDS.iter().cloned().collect(),
            min_token_length: 2,
        }
    }
}

impl TfidfVectorizer {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokenize(&self, document: &str) -> Vec<String> {
        document
            .split(|c: char| !c.is_alphanumeric())
            .map(|token| token.to_lowercase())
            .filter(|token| token.chars().count() >= self.min_token_length)
            .filter(|token| !self.stop_words.contains(token.as_str()))
            .collect()
    }

    /// Learns the vocabulary and document frequencies from `documents` and returns their term
    /// weights. Fails if no document contains a single usable term.
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<TermWeights> {

        let tokenized: Vec<Vec<String>> = documents.iter()
            .map(|document| self.tokenize(document.as_ref()))
            .collect();

        let mut document_frequencies: FnvHashMap<&str, usize> = FnvHashMap::default();

        for tokens in tokenized.iter() {
            let unique: FnvHashSet<&str> = tokens.iter().map(|token| token.as_str()).collect();
            for token in unique {
                *document_frequencies.entry(token).or_insert(0) += 1;
            }
        }

        if document_frequencies.is_empty() {
            return Err(RecoError::EmptyVocabulary);
        }

        let mut vocabulary: Vec<String> = document_frequencies.keys()
            .map(|term| term.to_string())
            .collect();
        vocabulary.sort();

        let num_documents = documents.len() as f32;

        let mut term_index: FnvHashMap<&str, usize> =
            FnvHashMap::with_capacity_and_hasher(vocabulary.len(), Default::default());
        let mut idf: Vec<f32> = Vec::with_capacity(vocabulary.len());

        for (index, term) in vocabulary.iter().enumerate() {
            term_index.insert(term.as_str(), index);
            let df = document_frequencies[term.as_str()] as f32;
            idf.push(((1.0 + num_documents) / (1.0 + df)).ln() + 1.0);
        }

        let rows: Vec<Vec<(usize, f32)>> = tokenized.iter()
            .map(|tokens| {
                let mut counts: FnvHashMap<usize, f32> = FnvHashMap::default();
                for token in tokens {
                    let column = term_index[token.as_str()];
                    *counts.entry(column).or_insert(0.0) += 1.0;
                }

                let mut row: Vec<(usize, f32)> = counts.into_iter()
                    .map(|(column, count)| (column, count * idf[column]))
                    .collect();

                let norm = row.iter().map(|(_, weight)| weight * weight).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for entry in row.iter_mut() {
                        entry.1 /= norm;
                    }
                }

                row
            })
            .collect();

        let matrix = SparseMatrix::from_row_entries(vocabulary.len(), rows);

        Ok(TermWeights { matrix, vocabulary })
    }
}


#[cfg(test)]
mod tests {

    use super::TfidfVectorizer;
    use crate::error::RecoError;

    fn close_enough_to(value: f32, expected: f32) -> bool {
        (value - expected).abs() < 1e-5
    }

    #[test]
    fn tokenization() {
        let vectorizer = TfidfVectorizer::new();

        assert_eq!(vectorizer.tokenize("Sci-Fi IMAX"), vec!["sci", "fi", "imax"]);
        assert_eq!(vectorizer.tokenize("(no genres listed)"), vec!["genres", "listed"]);
        assert_eq!(vectorizer.tokenize("a Film-Noir"), vec!["film", "noir"]);
    }

    #[test]
    fn vocabulary_is_sorted_and_rows_are_normalised() {
        let documents = vec!["Comedy Drama", "Action Comedy", "Drama"];
        let weights = TfidfVectorizer::new().fit_transform(&documents).unwrap();

        assert_eq!(weights.vocabulary, vec!["action", "comedy", "drama"]);
        assert_eq!(weights.matrix.shape(), (3, 3));

        for row in 0..3 {
            assert!(close_enough_to(weights.matrix.row(row).norm(), 1.0));
        }

        // a term that occurs alone in its document gets the full weight
        assert!(close_enough_to(weights.matrix.get(2, 2), 1.0));
    }

    #[test]
    fn rarer_terms_weigh_more() {
        let documents = vec!["action comedy", "comedy", "comedy"];
        let weights = TfidfVectorizer::new().fit_transform(&documents).unwrap();

        let action = weights.matrix.get(0, 0);
        let comedy = weights.matrix.get(0, 1);

        assert!(action > comedy);
    }

    #[test]
    fn empty_documents_give_empty_rows() {
        let documents = vec!["", "Horror"];
        let weights = TfidfVectorizer::new().fit_transform(&documents).unwrap();

        assert!(weights.matrix.row(0).is_empty());
        assert_eq!(weights.matrix.row(1).len(), 1);
    }

    #[test]
    fn only_stop_words_fails() {
        let documents = vec!["the", "", "and of"];

        match TfidfVectorizer::new().fit_transform(&documents) {
            Err(RecoError::EmptyVocabulary) => {},
            other => panic!("expected EmptyVocabulary, got {:?}", other.map(|w| w.vocabulary)),
        }
    }
}
