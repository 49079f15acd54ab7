use panoflag_client::{JsonFileSink, convert_json_to_csv};
use panoflag_core::config::EnrichmentConfig;
use panoflag_core::error::AppError;
use panoflag_core::models::{EnrichedRecord, UnresolvedRecord};
use panoflag_core::testutil::sample_metadata;
use panoflag_core::traits::ResultSink;

fn results() -> (Vec<EnrichedRecord>, Vec<UnresolvedRecord>) {
    (
        vec![
            EnrichedRecord::new("A", &sample_metadata(100, 50)),
            EnrichedRecord::new("C", &sample_metadata(200, 100)),
        ],
        vec![UnresolvedRecord::new("B")],
    )
}

#[tokio::test]
async fn publish_writes_both_documents() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested/out");
    let sink = JsonFileSink::new(&out, &EnrichmentConfig::new("amsterdam"));
    let (enriched, unresolved) = results();

    sink.publish(&enriched, &unresolved).await.unwrap();

    let data = std::fs::read_to_string(out.join("amsterdam_pano_image_data.json")).unwrap();
    let parsed: Vec<EnrichedRecord> = serde_json::from_str(&data).unwrap();
    assert_eq!(parsed, enriched);

    let missing = std::fs::read_to_string(out.join("amsterdam_unretrievable_panos.json")).unwrap();
    assert_eq!(missing, r#"[{"pano_id":"B"}]"#);

    // No CSV unless asked for.
    assert!(!out.join("amsterdam_pano_image_data.csv").exists());
}

#[tokio::test]
async fn publish_empty_lists_writes_empty_arrays() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonFileSink::new(dir.path(), &EnrichmentConfig::new("sea"));

    sink.publish(&[], &[]).await.unwrap();

    let data = std::fs::read_to_string(sink.enriched_path()).unwrap();
    let missing = std::fs::read_to_string(sink.unresolved_path()).unwrap();
    assert_eq!(data, "[]");
    assert_eq!(missing, "[]");
}

#[tokio::test]
async fn publish_with_csv_writes_csv_twins() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonFileSink::new(dir.path(), &EnrichmentConfig::new("amsterdam")).with_csv(true);
    let (enriched, unresolved) = results();

    sink.publish(&enriched, &unresolved).await.unwrap();

    let csv = std::fs::read_to_string(dir.path().join("amsterdam_pano_image_data.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("pano_id,image_width,image_height"));
    assert!(lines[1].starts_with("A,100,50,10,10,x,"));

    let missing =
        std::fs::read_to_string(dir.path().join("amsterdam_unretrievable_panos.csv")).unwrap();
    assert_eq!(missing, "pano_id\nB\n");
}

#[tokio::test]
async fn convert_existing_json_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let config = EnrichmentConfig::new("amsterdam");
    let (enriched, unresolved) = results();
    JsonFileSink::new(dir.path(), &config)
        .publish(&enriched, &unresolved)
        .await
        .unwrap();

    let (enriched_csv, unresolved_csv) = convert_json_to_csv(dir.path(), &config).await.unwrap();

    assert!(enriched_csv.ends_with("amsterdam_pano_image_data.csv"));
    assert_eq!(std::fs::read_to_string(enriched_csv).unwrap().lines().count(), 3);
    assert_eq!(
        std::fs::read_to_string(unresolved_csv).unwrap(),
        "pano_id\nB\n"
    );
}

#[tokio::test]
async fn convert_without_json_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = convert_json_to_csv(dir.path(), &EnrichmentConfig::new("amsterdam"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::IoError(_)));
}

#[tokio::test]
async fn unwritable_target_is_sink_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("taken");
    std::fs::write(&blocker, "a file, not a directory").unwrap();
    let sink = JsonFileSink::new(&blocker, &EnrichmentConfig::new("amsterdam"));

    let err = sink.publish(&[], &[]).await.unwrap_err();
    assert!(matches!(err, AppError::SinkError(_)));
}
