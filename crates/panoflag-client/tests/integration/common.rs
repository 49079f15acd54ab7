use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

/// What the fake metadata endpoint answers for one panorama id.
#[derive(Clone)]
pub enum Fixture {
    Json(serde_json::Value),
    Http(StatusCode),
    Garbage,
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Fake survey admin API serving `body` at `/adminapi/panos`.
pub fn survey_router(body: serde_json::Value) -> Router {
    Router::new().route("/adminapi/panos", get(move || async move { Json(body) }))
}

/// Fake metadata endpoint at `/panorama`. Unknown ids get `ZERO_RESULTS`.
pub fn provider_router(fixtures: HashMap<&str, Fixture>) -> Router {
    let fixtures: Arc<HashMap<String, Fixture>> = Arc::new(
        fixtures
            .into_iter()
            .map(|(id, f)| (id.to_string(), f))
            .collect(),
    );

    Router::new().route(
        "/panorama",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let fixtures = fixtures.clone();
            async move {
                let fixture = params.get("pano").and_then(|id| fixtures.get(id)).cloned();
                answer(fixture)
            }
        }),
    )
}

/// Fake metadata endpoint answering OK for every id after `delay`.
///
/// `peak` ends up holding the most requests the endpoint served at once.
pub fn slow_provider_router(delay: Duration, peak: Arc<AtomicUsize>) -> Router {
    let current = Arc::new(AtomicUsize::new(0));

    Router::new().route(
        "/panorama",
        get(move || {
            let current = current.clone();
            let peak = peak.clone();
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Json(ok_payload(13312, 6656, "x"))
            }
        }),
    )
}

fn answer(fixture: Option<Fixture>) -> Response {
    match fixture {
        Some(Fixture::Json(body)) => Json(body).into_response(),
        Some(Fixture::Http(status)) => status.into_response(),
        Some(Fixture::Garbage) => "<html>not json</html>".into_response(),
        None => Json(serde_json::json!({"status": "ZERO_RESULTS"})).into_response(),
    }
}

/// A `getPanorama`-shaped success body.
pub fn ok_payload(width: u32, height: u32, copyright: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "copyright": copyright,
        "tiles": {
            "worldSize": {"width": width, "height": height},
            "tileSize": {"width": 10, "height": 10},
            "centerHeading": 0,
            "originHeading": 0,
            "originPitch": 0
        }
    })
}
