use crate::catalog::{Catalog, CatalogRecord, MovieId};
use crate::error::{Error, Result};
use crate::similarity::SimilarityMatrix;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_movies: u32,
    pub vocabulary_size: u32,
    pub dropped_records: u32,
    pub checksum: String,
    pub created_at: String,
    pub version: u32,
}

/// Column-oriented catalog artifact: index `i` of every column describes one
/// movie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub movie_id: Vec<MovieId>,
    pub title: Vec<String>,
    pub tags: Vec<String>,
    pub checksum: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityFile {
    pub rows: u32,
    pub checksum: String,
    pub matrix: SimilarityMatrix,
}

#[derive(Serialize)]
struct SimilarityFileRef<'a> {
    rows: u32,
    checksum: String,
    matrix: &'a SimilarityMatrix,
}

impl From<&Catalog> for CatalogFile {
    fn from(catalog: &Catalog) -> Self {
        let records = catalog.records();
        Self {
            movie_id: records.iter().map(|r| r.movie_id).collect(),
            title: records.iter().map(|r| r.title.clone()).collect(),
            tags: records.iter().map(|r| r.tags.clone()).collect(),
            checksum: catalog.checksum(),
        }
    }
}

impl CatalogFile {
    /// Rebuild the catalog, rejecting ragged columns or a stale checksum.
    pub fn into_catalog(self) -> Result<Catalog> {
        let n = self.movie_id.len();
        if self.title.len() != n || self.tags.len() != n {
            return Err(Error::Misaligned(format!(
                "catalog columns differ in length: movie_id={} title={} tags={}",
                n,
                self.title.len(),
                self.tags.len()
            )));
        }
        let records = self
            .movie_id
            .into_iter()
            .zip(self.title)
            .zip(self.tags)
            .map(|((movie_id, title), tags)| CatalogRecord { movie_id, title, tags })
            .collect();
        let catalog = Catalog::new(records);
        let actual = catalog.checksum();
        if actual != self.checksum {
            return Err(Error::Misaligned(format!(
                "catalog checksum mismatch: stored={} computed={}",
                self.checksum, actual
            )));
        }
        Ok(catalog)
    }
}

pub struct ArtifactPaths {
    pub root: PathBuf,
}

impl ArtifactPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn catalog(&self) -> PathBuf { self.root.join("catalog.bin") }
    fn similarity(&self) -> PathBuf { self.root.join("similarity.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    let mut f = File::create(&tmp)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_bin<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

pub fn save_catalog(paths: &ArtifactPaths, catalog: &Catalog) -> Result<()> {
    create_dir_all(&paths.root)?;
    let bytes = bincode::serialize(&CatalogFile::from(catalog))?;
    write_atomic(&paths.catalog(), &bytes)
}

pub fn load_catalog(paths: &ArtifactPaths) -> Result<Catalog> {
    read_bin::<CatalogFile>(&paths.catalog())?.into_catalog()
}

pub fn save_similarity(paths: &ArtifactPaths, catalog: &Catalog, matrix: &SimilarityMatrix) -> Result<()> {
    if matrix.len() != catalog.len() {
        return Err(Error::Misaligned(format!(
            "refusing to save {}x{} matrix for {} records",
            matrix.len(),
            matrix.len(),
            catalog.len()
        )));
    }
    create_dir_all(&paths.root)?;
    let file = SimilarityFileRef { rows: matrix.len() as u32, checksum: catalog.checksum(), matrix };
    let bytes = bincode::serialize(&file)?;
    write_atomic(&paths.similarity(), &bytes)
}

pub fn load_similarity_file(paths: &ArtifactPaths) -> Result<SimilarityFile> {
    read_bin(&paths.similarity())
}

pub fn save_meta(paths: &ArtifactPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta)?;
    write_atomic(&paths.meta(), json.as_bytes())
}

pub fn load_meta(paths: &ArtifactPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Load the catalog, then the matrix, and check that both describe the same
/// record set before handing them out.
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<(Catalog, SimilarityMatrix)> {
    let catalog = load_catalog(paths)?;
    let sim = load_similarity_file(paths)?;
    let checksum = catalog.checksum();
    if sim.rows as usize != catalog.len() || sim.matrix.len() != catalog.len() {
        return Err(Error::Misaligned(format!(
            "catalog has {} records but similarity matrix has {} rows",
            catalog.len(),
            sim.rows
        )));
    }
    if sim.checksum != checksum {
        return Err(Error::Misaligned(format!(
            "similarity checksum {} does not match catalog checksum {}",
            sim.checksum, checksum
        )));
    }
    let n = sim.matrix.len();
    if sim.matrix.values().len() != n * n {
        return Err(Error::Misaligned(format!(
            "similarity matrix holds {} values, expected {}",
            sim.matrix.values().len(),
            n * n
        )));
    }
    tracing::info!(records = catalog.len(), checksum = %checksum, "loaded artifacts");
    Ok((catalog, sim.matrix))
}
