use std::collections::HashMap;

use axum::http::StatusCode;
use panoflag_client::StreetViewMetadataProvider;
use panoflag_core::models::LookupFailure;
use panoflag_core::traits::MetadataProvider;

use crate::integration::common::{Fixture, closed_port_url, ok_payload, provider_router, spawn};

async fn provider(fixtures: HashMap<&str, Fixture>) -> StreetViewMetadataProvider {
    let base = spawn(provider_router(fixtures)).await;
    StreetViewMetadataProvider::new(&format!("{base}/panorama")).unwrap()
}

#[tokio::test]
async fn ok_response_yields_metadata() {
    let provider = provider(HashMap::from([(
        "A",
        Fixture::Json(ok_payload(100, 50, "x")),
    )]))
    .await;

    let metadata = provider.lookup("A").await.unwrap();

    assert_eq!(metadata.world_width, 100);
    assert_eq!(metadata.world_height, 50);
    assert_eq!(metadata.tile_width, 10);
    assert_eq!(metadata.tile_height, 10);
    assert_eq!(metadata.copyright, "x");
}

#[tokio::test]
async fn zero_results_is_not_found() {
    let provider = provider(HashMap::new()).await;
    assert_eq!(provider.lookup("B").await.unwrap_err(), LookupFailure::NotFound);
}

#[tokio::test]
async fn http_404_is_not_found() {
    let provider = provider(HashMap::from([("B", Fixture::Http(StatusCode::NOT_FOUND))])).await;
    assert_eq!(provider.lookup("B").await.unwrap_err(), LookupFailure::NotFound);
}

#[tokio::test]
async fn server_error_is_transport() {
    let provider = provider(HashMap::from([(
        "B",
        Fixture::Http(StatusCode::INTERNAL_SERVER_ERROR),
    )]))
    .await;

    let failure = provider.lookup("B").await.unwrap_err();
    assert_eq!(failure, LookupFailure::Transport("HTTP 500".into()));
}

#[tokio::test]
async fn undecodable_body_is_transport() {
    let provider = provider(HashMap::from([("B", Fixture::Garbage)])).await;
    assert!(provider.lookup("B").await.unwrap_err().is_transport());
}

#[tokio::test]
async fn unreachable_provider_is_transport() {
    let base = closed_port_url().await;
    let provider = StreetViewMetadataProvider::new(&format!("{base}/panorama")).unwrap();

    assert!(provider.lookup("A").await.unwrap_err().is_transport());
}
