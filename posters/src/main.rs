use anyhow::{anyhow, Result};
use clap::Parser;
use posters::{PosterResolver, DEFAULT_BASE_URL};
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "posters")]
#[command(about = "Resolve poster URLs for titles or IMDb ids, one JSON line per input")]
struct Cli {
    /// Title or IMDb id; repeat for several lookups
    #[arg(long = "title", required = true)]
    titles: Vec<String>,
    /// Lookup service base URL (falls back to OMDB_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,
    /// Per-request timeout seconds
    #[arg(long, default_value_t = 6)]
    timeout_secs: u64,
}

#[derive(Serialize)]
struct Line<'a> {
    query: &'a str,
    poster: Option<&'a str>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();
    let api_key = std::env::var("OMDB_API_KEY").map_err(|_| anyhow!("OMDB_API_KEY not set"))?;
    let base_url = args
        .base_url
        .or_else(|| std::env::var("OMDB_BASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let resolver = PosterResolver::with_options(api_key, base_url, Duration::from_secs(args.timeout_secs))?;

    let posters = resolver.resolve_all(&args.titles).await;
    for (query, poster) in args.titles.iter().zip(&posters) {
        println!("{}", serde_json::to_string(&Line { query, poster: poster.as_deref() })?);
    }
    Ok(())
}
