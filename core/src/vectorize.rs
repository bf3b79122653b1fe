use crate::tokenizer::analyze;
use std::collections::HashMap;

pub const DEFAULT_MAX_FEATURES: usize = 5000;

pub type Column = u32;

/// Bounded set of tokens used as count-vector dimensions, in ascending
/// lexical order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, Column>,
}

impl Vocabulary {
    fn from_sorted(terms: Vec<String>) -> Self {
        let index = terms.iter().enumerate().map(|(i, t)| (t.clone(), i as Column)).collect();
        Self { terms, index }
    }

    pub fn len(&self) -> usize { self.terms.len() }
    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
    pub fn terms(&self) -> &[String] { &self.terms }
    pub fn column(&self, term: &str) -> Option<Column> { self.index.get(term).copied() }
}

/// Raw term counts over a vocabulary, stored as `(column, count)` pairs
/// sorted by column with zero counts omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountVector {
    entries: Vec<(Column, u32)>,
}

impl CountVector {
    pub fn entries(&self) -> &[(Column, u32)] { &self.entries }

    pub fn is_zero(&self) -> bool { self.entries.is_empty() }

    pub fn squared_norm(&self) -> u64 {
        self.entries.iter().map(|&(_, c)| c as u64 * c as u64).sum()
    }

    pub fn norm(&self) -> f64 { (self.squared_norm() as f64).sqrt() }

    pub fn dot(&self, other: &CountVector) -> u64 {
        let (mut i, mut j, mut acc) = (0, 0, 0u64);
        while i < self.entries.len() && j < other.entries.len() {
            let (ca, na) = self.entries[i];
            let (cb, nb) = other.entries[j];
            match ca.cmp(&cb) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    acc += na as u64 * nb as u64;
                    i += 1;
                    j += 1;
                }
            }
        }
        acc
    }

    /// Fixed-length view, one slot per vocabulary column.
    pub fn to_dense(&self, len: usize) -> Vec<u32> {
        let mut dense = vec![0; len];
        for &(col, count) in &self.entries {
            if let Some(slot) = dense.get_mut(col as usize) { *slot = count; }
        }
        dense
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CountVectorizer {
    pub max_features: usize,
}

impl Default for CountVectorizer {
    fn default() -> Self { Self { max_features: DEFAULT_MAX_FEATURES } }
}

impl CountVectorizer {
    pub fn new(max_features: usize) -> Self { Self { max_features } }

    /// Keep the `max_features` most frequent non-stopword tokens across the
    /// corpus. Equal totals are ranked by token so the choice is reproducible.
    pub fn fit(&self, docs: &[&str]) -> Vocabulary {
        let mut totals: HashMap<&str, u64> = HashMap::new();
        for doc in docs {
            for tok in analyze(doc) {
                *totals.entry(tok).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(&str, u64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        terms.sort();
        Vocabulary::from_sorted(terms)
    }

    /// Out-of-vocabulary tokens are ignored.
    pub fn transform(&self, vocabulary: &Vocabulary, doc: &str) -> CountVector {
        let mut counts: HashMap<Column, u32> = HashMap::new();
        for tok in analyze(doc) {
            if let Some(col) = vocabulary.column(tok) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }
        let mut entries: Vec<(Column, u32)> = counts.into_iter().collect();
        entries.sort_unstable_by_key(|&(col, _)| col);
        CountVector { entries }
    }

    pub fn fit_transform(&self, docs: &[&str]) -> (Vocabulary, Vec<CountVector>) {
        let vocabulary = self.fit(docs);
        let vectors = docs.iter().map(|d| self.transform(&vocabulary, d)).collect();
        (vocabulary, vectors)
    }
}
