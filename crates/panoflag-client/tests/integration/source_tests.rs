use panoflag_client::SidewalkSourceLister;
use panoflag_core::error::AppError;
use panoflag_core::traits::SourceLister;

use crate::integration::common::{closed_port_url, spawn, survey_router};

#[tokio::test]
async fn lists_candidates_from_survey_api() {
    let base = spawn(survey_router(serde_json::json!([
        {"pano_id": "a", "width": 16384, "height": 8192, "lat": 47.6},
        {"pano_id": "b"},
        {"pano_id": ""}
    ])))
    .await;

    let lister = SidewalkSourceLister::new(format!("{base}/adminapi/panos")).unwrap();
    let candidates = lister.list_candidates().await.unwrap();

    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0].width, Some(16384.0));
    assert!(candidates[1].needs_enrichment());
    assert!(!candidates[2].needs_enrichment());
}

#[tokio::test]
async fn missing_endpoint_is_http_error() {
    let base = spawn(survey_router(serde_json::json!([]))).await;

    let lister = SidewalkSourceLister::new(format!("{base}/adminapi/nope")).unwrap();
    let err = lister.list_candidates().await.unwrap_err();

    assert!(matches!(err, AppError::HttpError(ref msg) if msg.contains("404")));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let base = closed_port_url().await;

    let lister = SidewalkSourceLister::new(format!("{base}/adminapi/panos")).unwrap();
    let err = lister.list_candidates().await.unwrap_err();

    assert!(matches!(err, AppError::NetworkError(_)));
    assert!(err.is_retryable());
}
