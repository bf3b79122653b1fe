use anyhow::Result;
use axum::{extract::{Query, State}, routing::get, Json, Router};
use filmo_core::persist::{load_meta, ArtifactPaths, MetaFile};
use filmo_core::{Recommender, DEFAULT_TOP_K};
use posters::{PosterResolver, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error;

use error::{ApiError, ApiResult};

#[derive(Deserialize)]
pub struct RecommendParams {
    pub title: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_posters")]
    pub posters: bool,
}
fn default_k() -> usize { DEFAULT_TOP_K }
fn default_posters() -> bool { true }

#[derive(Serialize)]
pub struct RecommendResponse {
    pub title: String,
    pub took_s: f64,
    pub results: Vec<RecommendHit>,
}

#[derive(Serialize)]
pub struct RecommendHit {
    pub movie_id: i64,
    pub title: String,
    pub score: f32,
    pub poster: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub posters: Option<PosterResolver>,
    pub meta: Option<Arc<MetaFile>>,
}

/// Load artifacts once and wire the query routes. Poster lookup is enabled
/// when OMDB_API_KEY is set.
pub fn build_app(artifacts_dir: String) -> Result<Router> {
    let paths = ArtifactPaths::new(&artifacts_dir);
    let recommender = Recommender::load(&paths)?;
    let meta = match load_meta(&paths) {
        Ok(m) => Some(Arc::new(m)),
        Err(err) => {
            tracing::warn!(error = %err, "meta.json unavailable");
            None
        }
    };
    let posters = poster_resolver_from_env()?;
    tracing::info!(
        artifacts = %artifacts_dir,
        movies = recommender.catalog().len(),
        posters = posters.is_some(),
        "recommender ready"
    );
    Ok(build_router(AppState { recommender: Arc::new(recommender), posters, meta }))
}

fn poster_resolver_from_env() -> Result<Option<PosterResolver>> {
    let Ok(api_key) = std::env::var("OMDB_API_KEY") else { return Ok(None) };
    let base_url = std::env::var("OMDB_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let timeout = std::env::var("POSTER_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    Ok(Some(PosterResolver::with_options(api_key, base_url, timeout)?))
}

pub fn build_router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/titles", get(titles_handler))
        .route("/recommend", get(recommend_handler))
        .route("/meta", get(meta_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn titles_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.recommender.catalog().titles().map(str::to_string).collect())
}

pub async fn recommend_handler(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> ApiResult<Json<RecommendResponse>> {
    let start = std::time::Instant::now();
    if params.title.is_empty() {
        return Err(ApiError::InvalidInput("title must not be empty".into()));
    }
    let k = params.k.clamp(1, 100);
    let recs = state.recommender.recommend_top_k(&params.title, k)?;

    // Posters are decoration: the list is complete even if every lookup fails.
    let posters = match (&state.posters, params.posters) {
        (Some(resolver), true) => {
            let titles: Vec<String> = recs.iter().map(|r| r.title.clone()).collect();
            resolver.resolve_all(&titles).await
        }
        _ => vec![None; recs.len()],
    };

    let results = recs
        .into_iter()
        .zip(posters)
        .map(|(r, poster)| RecommendHit { movie_id: r.movie_id, title: r.title, score: r.score, poster })
        .collect();
    Ok(Json(RecommendResponse { title: params.title, took_s: start.elapsed().as_secs_f64(), results }))
}

pub async fn meta_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    match &state.meta {
        Some(meta) => Json(serde_json::to_value(meta.as_ref()).unwrap_or_default()),
        None => Json(serde_json::json!({ "error": "meta unavailable" })),
    }
}
