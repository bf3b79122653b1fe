pub mod catalog;
pub mod error;
pub mod features;
pub mod persist;
pub mod recommend;
pub mod similarity;
pub mod tokenizer;
pub mod vectorize;

pub use catalog::{Catalog, CatalogRecord, MovieId};
pub use error::{Error, Result};
pub use features::{build_tags, BuildStats, RawMovie};
pub use recommend::{Recommendation, Recommender, DEFAULT_TOP_K};
pub use similarity::{compute_similarity, cosine_similarity_matrix, SimilarityMatrix};
pub use vectorize::{CountVector, CountVectorizer, Vocabulary, DEFAULT_MAX_FEATURES};
