use crate::catalog::Catalog;
use crate::vectorize::{CountVector, CountVectorizer};
use serde::{Deserialize, Serialize};

/// Dense N x N cosine similarity matrix, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// `None` unless `values` holds exactly `n * n` entries.
    pub fn from_values(n: usize, values: Vec<f32>) -> Option<Self> {
        (n.checked_mul(n)? == values.len()).then_some(Self { n, values })
    }

    pub fn len(&self) -> usize { self.n }
    pub fn is_empty(&self) -> bool { self.n == 0 }
    pub fn values(&self) -> &[f32] { &self.values }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.n..(i + 1) * self.n]
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.n + j]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

/// Vectorize every record's tags and compute the pairwise matrix.
pub fn compute_similarity(catalog: &Catalog, vectorizer: &CountVectorizer) -> SimilarityMatrix {
    let (vocabulary, vectors) = vectorizer.fit_transform(&catalog.tag_strings());
    tracing::info!(records = catalog.len(), vocabulary = vocabulary.len(), "vectorized catalog");
    cosine_similarity_matrix(&vectors, vocabulary.len())
}

/// Pairwise cosine similarity. Dot products are accumulated as exact integers
/// through per-column postings; only the upper triangle is computed and then
/// mirrored. A zero vector scores 0 against everything, itself included.
pub fn cosine_similarity_matrix(vectors: &[CountVector], columns: usize) -> SimilarityMatrix {
    let n = vectors.len();
    let mut postings: Vec<Vec<(usize, u32)>> = vec![Vec::new(); columns];
    for (doc, v) in vectors.iter().enumerate() {
        for &(col, count) in v.entries() {
            postings[col as usize].push((doc, count));
        }
    }
    let norms: Vec<f64> = vectors.iter().map(CountVector::norm).collect();

    let mut values = vec![0.0f32; n * n];
    let mut dots = vec![0u64; n];
    for i in 0..n {
        if norms[i] == 0.0 { continue; }
        values[i * n + i] = 1.0;
        dots.iter_mut().for_each(|d| *d = 0);
        for &(col, count) in vectors[i].entries() {
            let plist = &postings[col as usize];
            // postings are in doc order; skip everything at or before i
            let start = plist.partition_point(|&(doc, _)| doc <= i);
            for &(j, other) in &plist[start..] {
                dots[j] += count as u64 * other as u64;
            }
        }
        for j in i + 1..n {
            if dots[j] == 0 { continue; }
            let s = (dots[j] as f64 / (norms[i] * norms[j])) as f32;
            values[i * n + j] = s;
            values[j * n + i] = s;
        }
    }
    SimilarityMatrix { n, values }
}
