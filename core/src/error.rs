use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Title not found: {0}")]
    TitleNotFound(String),

    #[error("Malformed {field} for {title:?}: {source}")]
    MalformedField {
        title: String,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Artifacts are misaligned: {0}")]
    Misaligned(String),

    #[error("Catalog is empty")]
    EmptyCatalog,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
