use metamatch_core::contract::{FigmaFileResponse, FileOptions, MockDocumentSource};
use metamatch_core::error::{FetchError, FigmaApiError, ValidationError};
use metamatch_core::storage::StorageManager;
use metamatch_core::{fetch_file_nodes, process_styles, Node};
use serde_json::{json, Value};
use tempfile::tempdir;

fn node(value: Value) -> Node {
    serde_json::from_value(value).unwrap()
}

fn card() -> Node {
    node(json!({
        "id": "12:34", "name": "Card", "type": "FRAME",
        "cornerRadius": 8,
        "children": [
            {
                "id": "12:35", "name": "Title", "type": "TEXT",
                "style": {"fontFamily": "Inter", "fontSize": 16}
            },
            {"id": "12:36", "name": "Body", "type": "TEXT", "opacity": 0.8}
        ]
    }))
}

#[tokio::test]
async fn test_fetch_node_saves_snapshot_that_processes_into_css() {
    let data = tempdir().unwrap();
    let storage = StorageManager::new(data.path().join("data"));

    let mut source = MockDocumentSource::new();
    source
        .expect_get_node()
        .withf(|file_id, node_id| file_id == "AbC123" && node_id == "12:34")
        .times(1)
        .returning(|_, _| Ok(card()));
    source.expect_get_file().never();

    let report = fetch_file_nodes(&source, &storage, "AbC123", Some("12-34"))
        .await
        .expect("Node fetch should succeed");

    assert_eq!(report.node_id.as_deref(), Some("12:34"));
    assert_eq!(report.name, "Card");
    assert_eq!(report.node_count, 3);
    let file_name = report.snapshot_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("figma-node-styles-AbC123-12-34-"), "{file_name}");

    let snapshot = storage.load_data(&report.snapshot_path).unwrap();
    assert_eq!(snapshot["metadata"]["version"], "unknown");
    assert_eq!(snapshot["styles"]["children"][1]["opacity"], 0.8);

    let css_dir = data.path().join("css");
    let processed =
        process_styles(&report.snapshot_path, &css_dir).expect("Processing should succeed");
    assert_eq!(processed.record_count, 3);
    assert_eq!(processed.groups, vec![("12:34".to_string(), 3)]);

    let title = std::fs::read_to_string(css_dir.join("12_34").join("12_35_Title.css")).unwrap();
    assert!(title.contains("  font-family: 'Inter', sans-serif;\n  font-size: 16px;\n"));
}

#[tokio::test]
async fn test_fetch_whole_file_saves_compact_snapshot() {
    let data = tempdir().unwrap();
    let storage = StorageManager::new(data.path());

    let mut source = MockDocumentSource::new();
    source
        .expect_get_file()
        .withf(|file_id, options| file_id == "AbC123" && *options == FileOptions::default())
        .times(1)
        .returning(|_, _| {
            Ok(FigmaFileResponse {
                name: "Design System".to_string(),
                last_modified: "2024-05-01T00:00:00Z".to_string(),
                version: "42".to_string(),
                document: node(json!({
                    "id": "0:0", "name": "Document", "type": "DOCUMENT",
                    "children": [
                        {"id": "0:1", "name": "Page 1", "type": "CANVAS", "children": [card()]}
                    ]
                })),
                styles: json!({"S:1": {"name": "Primary"}}).as_object().cloned(),
                ..FigmaFileResponse::default()
            })
        });

    let report = fetch_file_nodes(&source, &storage, "AbC123", None)
        .await
        .expect("File fetch should succeed");

    assert_eq!(report.node_id, None);
    assert_eq!(report.node_count, 5);
    assert_eq!(report.node_type.as_deref(), Some("DOCUMENT"));

    let snapshot = storage.load_data(&report.snapshot_path).unwrap();
    assert_eq!(snapshot["metadata"]["fileName"], "Design System");
    assert_eq!(snapshot["metadata"]["version"], "42");
    assert_eq!(snapshot["figmaStyles"]["S:1"]["name"], "Primary");
    assert_eq!(snapshot["figmaComponents"], json!({}));
}

#[tokio::test]
async fn test_malformed_node_id_is_rejected_before_any_request() {
    let data = tempdir().unwrap();
    let storage = StorageManager::new(data.path());
    let mut source = MockDocumentSource::new();
    source.expect_get_node().never();
    source.expect_get_file().never();

    let err = fetch_file_nodes(&source, &storage, "AbC123", Some("abc"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::Validation(ValidationError::MalformedNodeId(ref id)) if id == "abc"
    ));
}

#[tokio::test]
async fn test_api_failure_is_propagated_and_nothing_is_saved() {
    let data = tempdir().unwrap();
    let storage = StorageManager::new(data.path());
    let mut source = MockDocumentSource::new();
    source
        .expect_get_node()
        .returning(|_, _| Err(FigmaApiError::with_status("File not found or deleted", 404)));

    let err = fetch_file_nodes(&source, &storage, "AbC123", Some("1:2"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Api(FigmaApiError { status: Some(404), .. })));
    assert!(storage.list_saved_files().unwrap().is_empty());
}
