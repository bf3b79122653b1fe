//! Tag construction: turns raw heterogeneous movie records into catalog
//! records whose `tags` string is the unit of vectorization.

use crate::catalog::{Catalog, CatalogRecord, MovieId};
use crate::error::{Error, Result};
use crate::tokenizer::stem_text;
use serde::Deserialize;

pub const GENRE_WEIGHT: usize = 3;
pub const KEYWORD_WEIGHT: usize = 1;
pub const CAST_WEIGHT: usize = 5;
pub const CREW_WEIGHT: usize = 5;
/// Leading cast entries kept, in billing order.
pub const TOP_CAST: usize = 3;
pub const DIRECTOR_JOB: &str = "Director";

/// One joined row of the raw movie and credits tables. Structured fields hold
/// JSON arrays of named entities; `None` marks a missing value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMovie {
    pub movie_id: Option<MovieId>,
    pub title: Option<String>,
    pub genres: Option<String>,
    pub keywords: Option<String>,
    pub overview: Option<String>,
    pub cast: Option<String>,
    pub crew: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub input: usize,
    pub kept: usize,
    pub dropped: usize,
}

impl BuildStats {
    pub fn dropped_fraction(&self) -> f64 {
        if self.input == 0 { 0.0 } else { self.dropped as f64 / self.input as f64 }
    }
}

#[derive(Debug, Deserialize)]
struct NamedEntity {
    name: String,
    #[serde(default)]
    job: Option<String>,
}

/// Records that pass the missing-field check, all fields present.
struct Complete<'a> {
    movie_id: MovieId,
    title: &'a str,
    genres: &'a str,
    keywords: &'a str,
    overview: &'a str,
    cast: &'a str,
    crew: &'a str,
}

impl RawMovie {
    fn complete(&self) -> Option<Complete<'_>> {
        Some(Complete {
            movie_id: self.movie_id?,
            title: self.title.as_deref()?,
            genres: self.genres.as_deref()?,
            keywords: self.keywords.as_deref()?,
            overview: self.overview.as_deref()?,
            cast: self.cast.as_deref()?,
            crew: self.crew.as_deref()?,
        })
    }
}

/// Build the catalog. Records missing any required field are dropped, never
/// imputed; a malformed structured field aborts the whole build.
pub fn build_tags(raw: &[RawMovie]) -> Result<(Catalog, BuildStats)> {
    let mut records = Vec::with_capacity(raw.len());
    for movie in raw {
        let Some(m) = movie.complete() else { continue };
        records.push(CatalogRecord {
            movie_id: m.movie_id,
            title: m.title.to_string(),
            tags: tag_string(&m)?,
        });
    }
    let stats = BuildStats { input: raw.len(), kept: records.len(), dropped: raw.len() - records.len() };
    tracing::info!(
        input = stats.input,
        kept = stats.kept,
        dropped = stats.dropped,
        dropped_fraction = stats.dropped_fraction(),
        "built catalog tags"
    );
    Ok((Catalog::new(records), stats))
}

fn tag_string(m: &Complete<'_>) -> Result<String> {
    let genres = names(m.title, "genres", m.genres)?;
    let keywords = names(m.title, "keywords", m.keywords)?;
    let cast: Vec<String> = names(m.title, "cast", m.cast)?.into_iter().take(TOP_CAST).collect();
    let crew: Vec<String> = parse_entities(m.title, "crew", m.crew)?
        .into_iter()
        .find(|e| e.job.as_deref() == Some(DIRECTOR_JOB))
        .map(|e| squash(&e.name))
        .into_iter()
        .collect();

    let mut tokens: Vec<&str> = m.overview.split_whitespace().collect();
    repeat_into(&mut tokens, &genres, GENRE_WEIGHT);
    repeat_into(&mut tokens, &keywords, KEYWORD_WEIGHT);
    repeat_into(&mut tokens, &cast, CAST_WEIGHT);
    repeat_into(&mut tokens, &crew, CREW_WEIGHT);

    Ok(stem_text(&tokens.join(" ").to_lowercase()))
}

// Whole-list repetition: [a, b] x2 -> a b a b
fn repeat_into<'a>(tokens: &mut Vec<&'a str>, list: &'a [String], times: usize) {
    for _ in 0..times {
        tokens.extend(list.iter().map(String::as_str));
    }
}

fn parse_entities(title: &str, field: &'static str, raw: &str) -> Result<Vec<NamedEntity>> {
    serde_json::from_str(raw).map_err(|source| Error::MalformedField { title: title.to_string(), field, source })
}

fn names(title: &str, field: &'static str, raw: &str) -> Result<Vec<String>> {
    Ok(parse_entities(title, field, raw)?.iter().map(|e| squash(&e.name)).collect())
}

/// "Science Fiction" -> "ScienceFiction"
fn squash(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}
