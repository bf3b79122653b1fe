use axum::{extract::Query, routing::get, Json, Router};
use posters::PosterResolver;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

async fn fake_lookup(Query(q): Query<HashMap<String, String>>) -> Result<Json<Value>, &'static str> {
    if q.get("apikey").map(String::as_str) != Some("test-key") {
        return Ok(Json(json!({"Response": "False", "Error": "Invalid API key!"})));
    }
    if let Some(id) = q.get("i") {
        return Ok(Json(match id.as_str() {
            "tt0499549" => json!({"Response": "True", "Poster": "https://img.example/avatar.jpg"}),
            _ => json!({"Response": "False", "Error": "Incorrect IMDb ID."}),
        }));
    }
    match q.get("t").map(String::as_str) {
        Some("Spectre") => Ok(Json(json!({"Response": "True", "Poster": "https://img.example/spectre.jpg"}))),
        Some("No Image") => Ok(Json(json!({"Response": "True", "Poster": "N/A"}))),
        Some("Broken") => Err("<html>not json</html>"),
        Some("Slow") => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Json(json!({"Response": "True", "Poster": "https://img.example/slow.jpg"})))
        }
        _ => Ok(Json(json!({"Response": "False", "Error": "Movie not found!"}))),
    }
}

async fn spawn_fake() -> String {
    let app = Router::new().route("/", get(fake_lookup));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

fn resolver(base: &str, timeout: Duration) -> PosterResolver {
    PosterResolver::with_options("test-key", base, timeout).unwrap()
}

#[tokio::test]
async fn resolves_known_identifier_and_title() {
    let base = spawn_fake().await;
    let r = resolver(&base, Duration::from_secs(2));
    assert_eq!(r.resolve("tt0499549").await.as_deref(), Some("https://img.example/avatar.jpg"));
    assert_eq!(r.resolve("Spectre").await.as_deref(), Some("https://img.example/spectre.jpg"));
}

#[tokio::test]
async fn failures_collapse_to_absent() {
    let base = spawn_fake().await;
    let r = resolver(&base, Duration::from_secs(2));
    assert_eq!(r.resolve("tt0000000").await, None);
    assert_eq!(r.resolve("No Image").await, None);
    assert_eq!(r.resolve("Broken").await, None);
    assert_eq!(r.resolve("Unknown Title").await, None);

    let wrong_key = PosterResolver::with_options("bad", base.clone(), Duration::from_secs(2)).unwrap();
    assert_eq!(wrong_key.resolve("Spectre").await, None);
}

#[tokio::test]
async fn timeout_returns_absent_within_bound() {
    let base = spawn_fake().await;
    let r = resolver(&base, Duration::from_millis(300));
    let start = Instant::now();
    assert_eq!(r.resolve("Slow").await, None);
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn unreachable_service_is_absent() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let r = resolver(&format!("http://{addr}/"), Duration::from_secs(1));
    assert_eq!(r.resolve("Spectre").await, None);
}

#[tokio::test]
async fn resolve_all_keeps_order_and_isolates_failures() {
    let base = spawn_fake().await;
    let r = resolver(&base, Duration::from_millis(500));
    let queries: Vec<String> = ["Spectre", "Slow", "Broken", "tt0499549"].iter().map(|s| s.to_string()).collect();
    let out = r.resolve_all(&queries).await;
    assert_eq!(
        out,
        vec![
            Some("https://img.example/spectre.jpg".to_string()),
            None,
            None,
            Some("https://img.example/avatar.jpg".to_string()),
        ]
    );
}
