use anyhow::{Context, Result};
use filmo_core::{MovieId, RawMovie};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Columns of the movies table the builder needs; the rest are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieRow {
    pub title: Option<String>,
    pub genres: Option<String>,
    pub keywords: Option<String>,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditRow {
    pub movie_id: Option<MovieId>,
    pub title: Option<String>,
    pub cast: Option<String>,
    pub crew: Option<String>,
}

fn read_rows<T: for<'de> Deserialize<'de>, R: Read>(reader: R, what: &str) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize::<T>().enumerate() {
        let row: T = result.with_context(|| format!("failed to read {what} row {}", idx + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_movies_from<R: Read>(reader: R) -> Result<Vec<MovieRow>> {
    read_rows(reader, "movies")
}

pub fn read_credits_from<R: Read>(reader: R) -> Result<Vec<CreditRow>> {
    read_rows(reader, "credits")
}

pub fn read_movies(path: &Path) -> Result<Vec<MovieRow>> {
    let f = std::fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_movies_from(f)
}

pub fn read_credits(path: &Path) -> Result<Vec<CreditRow>> {
    let f = std::fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_credits_from(f)
}

/// Inner join on title. Movie order is kept; a title with several credit rows
/// yields one record per credit row, in credits order. Rows without a title
/// cannot match anything.
pub fn join_on_title(movies: Vec<MovieRow>, credits: Vec<CreditRow>) -> Vec<RawMovie> {
    let mut by_title: HashMap<String, Vec<CreditRow>> = HashMap::new();
    for c in credits {
        if let Some(t) = c.title.clone() {
            by_title.entry(t).or_default().push(c);
        }
    }
    let mut joined = Vec::with_capacity(movies.len());
    for m in movies {
        let Some(title) = m.title.as_deref() else { continue };
        let Some(matches) = by_title.get(title) else { continue };
        for c in matches {
            joined.push(RawMovie {
                movie_id: c.movie_id,
                title: m.title.clone(),
                genres: m.genres.clone(),
                keywords: m.keywords.clone(),
                overview: m.overview.clone(),
                cast: c.cast.clone(),
                crew: c.crew.clone(),
            });
        }
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVIES: &str = "budget,genres,id,keywords,overview,title,vote_count\n\
        1,\"[{\"\"id\"\": 28, \"\"name\"\": \"\"Action\"\"}]\",19995,[],Blue people,Avatar,10\n\
        2,[],206647,[],,Spectre,5\n\
        3,[],1,[],Twice,Twins,1\n\
        4,[],2,[],Orphan,Lonely,1\n";

    const CREDITS: &str = "movie_id,title,cast,crew\n\
        206647,Spectre,[],[]\n\
        19995,Avatar,[],[]\n\
        7,Twins,[],[]\n\
        8,Twins,[],[]\n";

    #[test]
    fn reads_and_treats_empty_fields_as_missing() {
        let movies = read_movies_from(MOVIES.as_bytes()).unwrap();
        assert_eq!(movies.len(), 4);
        assert_eq!(movies[0].genres.as_deref(), Some(r#"[{"id": 28, "name": "Action"}]"#));
        assert_eq!(movies[1].overview, None);
    }

    #[test]
    fn joins_in_movie_order_with_credit_ids() {
        let joined = join_on_title(
            read_movies_from(MOVIES.as_bytes()).unwrap(),
            read_credits_from(CREDITS.as_bytes()).unwrap(),
        );
        let pairs: Vec<(Option<i64>, Option<&str>)> =
            joined.iter().map(|r| (r.movie_id, r.title.as_deref())).collect();
        assert_eq!(
            pairs,
            vec![
                (Some(19995), Some("Avatar")),
                (Some(206647), Some("Spectre")),
                (Some(7), Some("Twins")),
                (Some(8), Some("Twins")),
            ]
        );
    }

    #[test]
    fn bad_movie_id_is_fatal() {
        let bad = "movie_id,title,cast,crew\nabc,Avatar,[],[]\n";
        assert!(read_credits_from(bad.as_bytes()).is_err());
    }
}
