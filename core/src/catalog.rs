use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

pub type MovieId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub movie_id: MovieId,
    pub title: String,
    /// Normalized, weighted and stemmed tokens joined by single spaces.
    pub tags: String,
}

impl CatalogRecord {
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tags.split(' ').filter(|t| !t.is_empty())
    }
}

/// Ordered movie records. A record's position is its row and column in the
/// similarity matrix and never changes after the catalog is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
}

impl Catalog {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.title.as_str())
    }

    pub fn tag_strings(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.tags.as_str()).collect()
    }

    /// Row of the first record whose title equals `title` exactly.
    pub fn position_of(&self, title: &str) -> Option<usize> {
        self.records.iter().position(|r| r.title == title)
    }

    /// Hex SHA-1 over ids, titles and tags in row order. Stored in both
    /// artifacts so a load can prove they came from the same record set.
    pub fn checksum(&self) -> String {
        let mut hasher = Sha1::new();
        hasher.update((self.records.len() as u64).to_le_bytes());
        for r in &self.records {
            hasher.update(r.movie_id.to_le_bytes());
            hasher.update((r.title.len() as u64).to_le_bytes());
            hasher.update(r.title.as_bytes());
            hasher.update((r.tags.len() as u64).to_le_bytes());
            hasher.update(r.tags.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: MovieId, title: &str, tags: &str) -> CatalogRecord {
        CatalogRecord { movie_id: id, title: title.into(), tags: tags.into() }
    }

    #[test]
    fn position_of_takes_first_exact_match() {
        let c = Catalog::new(vec![rec(1, "Heat", "a"), rec(2, "heat", "b"), rec(3, "Heat", "c")]);
        assert_eq!(c.position_of("Heat"), Some(0));
        assert_eq!(c.position_of("heat"), Some(1));
        assert_eq!(c.position_of("HEAT"), None);
    }

    #[test]
    fn checksum_tracks_order_and_content() {
        let a = Catalog::new(vec![rec(1, "A", "x y"), rec(2, "B", "z")]);
        let b = Catalog::new(vec![rec(2, "B", "z"), rec(1, "A", "x y")]);
        let c = Catalog::new(vec![rec(1, "A", "x"), rec(2, "B", "y z")]);
        assert_eq!(a.checksum(), a.clone().checksum());
        assert_ne!(a.checksum(), b.checksum());
        assert_ne!(a.checksum(), c.checksum());
    }
}
