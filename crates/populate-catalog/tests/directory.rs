use std::fs;

use populate_catalog::{
    CatalogClient, CatalogError, DirectoryCatalog, MemoryCache, ModelSpec, NoCache, RowCache,
};
use populate_model::RawRow;

#[test]
fn finds_file_by_exact_name_and_suffix() {
    let dir = tempfile::tempdir().expect("temp dir");
    let dataset = dir.path().join("PennEPI00001");
    fs::create_dir_all(dataset.join("sub-01")).expect("mkdir");
    fs::write(dataset.join("participants.tsv"), "participant_id\n001\n").expect("write");
    fs::write(
        dataset.join("sub-01").join("sub-01_sessions.tsv"),
        "participant_id\n001\n",
    )
    .expect("write");

    let catalog = DirectoryCatalog::new(dir.path().join("templates"));
    let dataset_str = dataset.display().to_string();

    let exact = catalog
        .find_source_file(&dataset_str, "participants.tsv")
        .expect("lookup")
        .expect("found");
    assert_eq!(exact.name, "participants.tsv");

    let suffix = catalog
        .find_source_file(&dataset_str, "_sessions.tsv")
        .expect("lookup")
        .expect("found");
    assert_eq!(suffix.name, "sub-01_sessions.tsv");

    let missing = catalog
        .find_source_file(&dataset_str, "channels.tsv")
        .expect("lookup");
    assert!(missing.is_none());
}

#[test]
fn skips_archive_and_deleted_entries() {
    let dir = tempfile::tempdir().expect("temp dir");
    let dataset = dir.path().join("ds");
    fs::create_dir_all(dataset.join("Archive")).expect("mkdir");
    fs::write(
        dataset.join("Archive").join("participants.tsv"),
        "participant_id\nold\n",
    )
    .expect("write");
    fs::write(
        dataset.join("__DELETED__participants.tsv"),
        "participant_id\ngone\n",
    )
    .expect("write");

    let catalog = DirectoryCatalog::new(dir.path().join("templates"));
    let found = catalog
        .find_source_file(&dataset.display().to_string(), "participants.tsv")
        .expect("lookup");
    assert!(found.is_none());
}

#[test]
fn reads_template_schema_from_templates_dir() {
    let dir = tempfile::tempdir().expect("temp dir");
    let templates = dir.path().join("templates");
    fs::create_dir_all(&templates).expect("mkdir");
    fs::write(
        templates.join("tpl-1.json"),
        r#"{"title": "participants", "properties": {}}"#,
    )
    .expect("write");

    let catalog = DirectoryCatalog::new(&templates);
    let schema = catalog.template_schema("org", "tpl-1").expect("schema");
    assert_eq!(schema["title"], "participants");

    let missing = catalog.template_schema("org", "tpl-2").expect_err("absent");
    assert!(matches!(missing, CatalogError::TemplateNotFound { .. }));
}

#[test]
fn create_records_writes_payload_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let dataset = dir.path().join("ds");
    fs::create_dir_all(&dataset).expect("mkdir");
    let dataset_str = dataset.display().to_string();

    let catalog = DirectoryCatalog::new(dir.path().join("templates"));
    let spec = ModelSpec {
        name: "participants".to_string(),
        display_name: "Participants".to_string(),
        description: None,
    };
    let model_id = catalog
        .create_model(&dataset_str, "tpl-1", &spec)
        .expect("create model");
    let records = vec![serde_json::json!({"participant_id": "001"})];
    catalog
        .create_records(&dataset_str, &model_id, &records)
        .expect("create records");

    let path = catalog.records_path(&dataset_str, &model_id);
    let text = fs::read_to_string(&path).expect("read payload");
    let payload: serde_json::Value = serde_json::from_str(&text).expect("parse payload");
    assert_eq!(payload["records"][0]["participant_id"], "001");
}

#[test]
fn memory_cache_round_trips_and_no_cache_stays_empty() {
    let mut row = RawRow::new();
    row.insert("id".to_string(), "1".to_string());
    let rows = vec![row];

    let memory = MemoryCache::default();
    assert!(memory.get("k").is_none());
    memory.put("k", &rows);
    assert_eq!(memory.get("k"), Some(rows.clone()));

    let none = NoCache;
    none.put("k", &rows);
    assert!(none.get("k").is_none());
}
