use crate::catalog::{Catalog, MovieId};
use crate::error::{Error, Result};
use crate::persist::{load_artifacts, ArtifactPaths};
use crate::similarity::SimilarityMatrix;
use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub index: usize,
    pub movie_id: MovieId,
    pub title: String,
    pub score: f32,
}

/// Read-only query context holding the catalog and its similarity matrix.
/// Construction guarantees row `i` of the matrix describes catalog record `i`.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Catalog,
    similarity: SimilarityMatrix,
}

impl Recommender {
    pub fn new(catalog: Catalog, similarity: SimilarityMatrix) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        if catalog.len() != similarity.len() {
            return Err(Error::Misaligned(format!(
                "catalog has {} records but similarity matrix has {} rows",
                catalog.len(),
                similarity.len()
            )));
        }
        Ok(Self { catalog, similarity })
    }

    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let (catalog, similarity) = load_artifacts(paths)?;
        Self::new(catalog, similarity)
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }

    pub fn similarity(&self) -> &SimilarityMatrix { &self.similarity }

    pub fn recommend(&self, title: &str) -> Result<Vec<Recommendation>> {
        self.recommend_top_k(title, DEFAULT_TOP_K)
    }

    /// The `k` most similar other movies, best first. Equal scores keep
    /// catalog order. A catalog with `k` or fewer records yields every other
    /// record.
    pub fn recommend_top_k(&self, title: &str, k: usize) -> Result<Vec<Recommendation>> {
        let index = self
            .catalog
            .position_of(title)
            .ok_or_else(|| Error::TitleNotFound(title.to_string()))?;

        let mut scored: Vec<(usize, f32)> = self
            .similarity
            .row(index)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .collect();
        // stable: ties stay in catalog order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let recs = scored
            .into_iter()
            .take(k)
            .filter_map(|(j, score)| {
                self.catalog.get(j).map(|r| Recommendation {
                    index: j,
                    movie_id: r.movie_id,
                    title: r.title.clone(),
                    score,
                })
            })
            .collect();
        Ok(recs)
    }

    pub fn recommend_titles(&self, title: &str) -> Result<Vec<String>> {
        Ok(self.recommend(title)?.into_iter().map(|r| r.title).collect())
    }
}
