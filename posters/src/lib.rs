//! Poster lookup against an OMDb-style HTTP service.
//!
//! Every failure (network, timeout, bad JSON, "not found", no image) collapses
//! to `None`; callers never see an error.

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://www.omdbapi.com/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);
/// Poster value the service sends when it has no image.
const NO_POSTER: &str = "N/A";

lazy_static! {
    static ref IMDB_ID: Regex = Regex::new(r"^[a-z]{2}\d{7,8}$").expect("valid regex");
}

/// True for external identifiers like `tt1234567` or `tt12345678`.
pub fn is_imdb_id(s: &str) -> bool {
    IMDB_ID.is_match(s.trim())
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

impl LookupResponse {
    fn into_poster(self) -> Option<String> {
        if self.response.as_deref() != Some("True") {
            return None;
        }
        self.poster.filter(|p| !p.trim().is_empty() && p != NO_POSTER)
    }
}

#[derive(Clone)]
pub struct PosterResolver {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PosterResolver {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_options(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key: api_key.into(), base_url: base_url.into() })
    }

    /// Look up by identifier when the input looks like one, by title otherwise.
    pub async fn resolve(&self, identifier_or_title: &str) -> Option<String> {
        let query = identifier_or_title.trim();
        if query.is_empty() {
            return None;
        }
        let param = if is_imdb_id(query) { "i" } else { "t" };
        match self.fetch(param, query).await {
            Ok(poster) => poster,
            Err(err) => {
                tracing::debug!(query, error = %err, "poster lookup failed");
                None
            }
        }
    }

    /// Resolve concurrently; output order matches input order.
    pub async fn resolve_all(&self, queries: &[String]) -> Vec<Option<String>> {
        let handles: Vec<_> = queries
            .iter()
            .map(|q| {
                let resolver = self.clone();
                let q = q.clone();
                tokio::spawn(async move { resolver.resolve(&q).await })
            })
            .collect();
        let mut out = Vec::with_capacity(handles.len());
        for h in handles {
            out.push(h.await.unwrap_or(None));
        }
        out
    }

    async fn fetch(&self, param: &str, value: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[(param, value), ("apikey", self.api_key.as_str())])
            .send()
            .await?;
        let body: LookupResponse = resp.json().await?;
        Ok(body.into_poster())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_identifiers() {
        assert!(is_imdb_id("tt1234567"));
        assert!(is_imdb_id("tt12345678"));
        assert!(is_imdb_id("  tt0499549 "));
        assert!(!is_imdb_id("tt123"));
        assert!(!is_imdb_id("tt123456789"));
        assert!(!is_imdb_id("TT1234567"));
        assert!(!is_imdb_id("Spectre"));
    }

    #[test]
    fn response_requires_success_and_real_poster() {
        let parse = |s: &str| serde_json::from_str::<LookupResponse>(s).unwrap().into_poster();
        assert_eq!(parse(r#"{"Response":"True","Poster":"https://img/x.jpg"}"#).as_deref(), Some("https://img/x.jpg"));
        assert_eq!(parse(r#"{"Response":"True","Poster":"N/A"}"#), None);
        assert_eq!(parse(r#"{"Response":"True"}"#), None);
        assert_eq!(parse(r#"{"Response":"False","Error":"Movie not found!"}"#), None);
    }

    #[tokio::test]
    async fn empty_input_is_absent_without_a_request() {
        let r = PosterResolver::with_options("k", "http://127.0.0.1:9/", Duration::from_millis(50)).unwrap();
        assert_eq!(r.resolve("   ").await, None);
    }
}
