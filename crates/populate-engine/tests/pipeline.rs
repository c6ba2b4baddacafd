use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::json;

use populate_catalog::{CatalogClient, CatalogError, MemoryCache, ModelSpec, NoCache, SourceFile};
use populate_engine::pipeline::{PopulateError, run_population};
use populate_engine::preflight::{ConfigError, preflight};
use populate_engine::schema::resolve_schema;
use populate_model::{PopulationConfig, SkipReason, TypedValue};

/// In-memory catalog: a schema document plus pattern-matched files.
struct StubCatalog {
    schema: serde_json::Value,
    files: BTreeMap<String, SourceFile>,
    lookups: Mutex<usize>,
}

impl StubCatalog {
    fn new(schema: serde_json::Value) -> Self {
        Self {
            schema,
            files: BTreeMap::new(),
            lookups: Mutex::new(0),
        }
    }

    fn with_file(mut self, name: &str, content: &str) -> Self {
        self.files.insert(
            name.to_string(),
            SourceFile {
                name: name.to_string(),
                content: content.to_string(),
            },
        );
        self
    }

    fn lookup_count(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

impl CatalogClient for StubCatalog {
    fn template_schema(
        &self,
        _org_id: &str,
        _template_id: &str,
    ) -> Result<serde_json::Value, CatalogError> {
        Ok(self.schema.clone())
    }

    fn find_source_file(
        &self,
        _dataset: &str,
        pattern: &str,
    ) -> Result<Option<SourceFile>, CatalogError> {
        *self.lookups.lock().unwrap() += 1;
        Ok(self
            .files
            .iter()
            .find(|(name, _)| name.as_str() == pattern || name.ends_with(pattern))
            .map(|(_, file)| file.clone()))
    }

    fn create_model(
        &self,
        _dataset: &str,
        _template_id: &str,
        spec: &ModelSpec,
    ) -> Result<String, CatalogError> {
        Ok(spec.name.clone())
    }

    fn create_records(
        &self,
        _dataset: &str,
        _model_id: &str,
        _records: &[serde_json::Value],
    ) -> Result<(), CatalogError> {
        Ok(())
    }
}

fn participants_schema() -> serde_json::Value {
    json!({
        "title": "participants",
        "type": "object",
        "properties": {
            "participant_id": {"type": "string", "x-pennsieve-key": true},
            "sex": {"type": "string", "enum": ["Male", "Female"]},
            "age": {"type": "integer"},
            "species": {"type": "string"}
        },
        "required": ["participant_id", "sex"]
    })
}

fn participants_config() -> PopulationConfig {
    let text = json!({
        "org_id": "org",
        "template_id": "tpl",
        "model_name": "participants",
        "display_name": "Participants",
        "sources": {
            "participants": {"type": "pennsieve", "file_pattern": "participants.tsv"}
        },
        "join_key": "participant_id",
        "mappings": {
            "participant_id": {"source": "participants", "column": "participant_id"},
            "sex": {"source": "participants", "column": "sex"},
            "age": {"source": "participants", "column": "age"},
            "species": {"value": "homo sapiens"}
        }
    })
    .to_string();
    PopulationConfig::from_json(&text).expect("parse config")
}

#[test]
fn null_marker_under_enum_skips_as_invalid_enum() {
    let client = StubCatalog::new(participants_schema()).with_file(
        "participants.tsv",
        "participant_id\tsex\tage\n001\tMale\t34\n002\tn/a\t28\n",
    );
    let outcome =
        run_population(&participants_config(), "ds-1", &client, &NoCache).expect("populate");

    assert_eq!(outcome.kept_count(), 1);
    assert_eq!(outcome.skipped_count(), 1);
    let kept = &outcome.records[0];
    assert_eq!(kept.key, "001");
    assert_eq!(
        kept.fields.get("sex"),
        Some(&TypedValue::String("Male".to_string()))
    );
    assert_eq!(kept.fields.get("age"), Some(&TypedValue::Integer(34)));
    assert_eq!(
        kept.fields.get("species"),
        Some(&TypedValue::String("homo sapiens".to_string()))
    );
    let skipped = &outcome.skipped[0];
    assert_eq!(skipped.key, "002");
    assert_eq!(skipped.reason.to_string(), "invalid-enum-required:sex");
}

#[test]
fn enum_match_is_case_insensitive_and_canonicalizing() {
    let client = StubCatalog::new(participants_schema()).with_file(
        "participants.tsv",
        "participant_id\tsex\n001\tFEMALE\n",
    );
    let outcome =
        run_population(&participants_config(), "ds-1", &client, &NoCache).expect("populate");
    assert_eq!(outcome.kept_count(), 1);
    assert_eq!(
        outcome.records[0].fields.get("sex"),
        Some(&TypedValue::String("Female".to_string()))
    );
}

#[test]
fn missing_required_cell_skips_the_record() {
    let client = StubCatalog::new(participants_schema()).with_file(
        "participants.tsv",
        "participant_id\tsex\n001\t\n002\tMale\n",
    );
    let outcome =
        run_population(&participants_config(), "ds-1", &client, &NoCache).expect("populate");
    assert_eq!(outcome.kept_count(), 1);
    assert_eq!(outcome.records[0].key, "002");
    assert!(matches!(
        &outcome.skipped[0].reason,
        SkipReason::MissingRequired(field) if field == "sex"
    ));
}

#[test]
fn unparsable_optional_value_drops_the_field_only() {
    let client = StubCatalog::new(participants_schema()).with_file(
        "participants.tsv",
        "participant_id\tsex\tage\n001\tMale\tunknown\n",
    );
    let outcome =
        run_population(&participants_config(), "ds-1", &client, &NoCache).expect("populate");
    assert_eq!(outcome.kept_count(), 1);
    assert!(!outcome.records[0].fields.contains_key("age"));
}

#[test]
fn null_marker_without_enum_drops_the_field() {
    let client = StubCatalog::new(participants_schema()).with_file(
        "participants.tsv",
        "participant_id\tsex\tspecies\n001\tMale\tn/a\n",
    );
    let mut config = participants_config();
    config.mappings.insert(
        "species".to_string(),
        serde_json::from_value(json!({"source": "participants", "column": "species"}))
            .expect("mapping"),
    );
    let outcome = run_population(&config, "ds-1", &client, &NoCache).expect("populate");
    assert_eq!(outcome.kept_count(), 1);
    assert!(!outcome.records[0].fields.contains_key("species"));
}

#[test]
fn join_is_anchored_on_the_key_source() {
    let schema = json!({
        "title": "samples",
        "properties": {
            "sample_id": {"type": "string", "x-pennsieve-key": true},
            "site": {"type": "string"}
        },
        "required": ["sample_id"]
    });
    let config_text = json!({
        "org_id": "org",
        "template_id": "tpl",
        "model_name": "samples",
        "display_name": "Samples",
        "sources": {
            "samples": {"type": "pennsieve", "file_pattern": "samples.tsv"},
            "sites": {"type": "pennsieve", "file_pattern": "sites.tsv"}
        },
        "join_key": "sample_id",
        "mappings": {
            "sample_id": {"source": "samples", "column": "sample_id"},
            "site": {"source": "sites", "column": "site"}
        }
    })
    .to_string();
    let config = PopulationConfig::from_json(&config_text).expect("parse config");
    let client = StubCatalog::new(schema)
        .with_file("samples.tsv", "sample_id\ns1\ns2\n")
        .with_file("sites.tsv", "sample_id\tsite\ns1\tA\ns3\tB\n");

    let outcome = run_population(&config, "ds-1", &client, &NoCache).expect("populate");
    // s3 exists only in the secondary source and never forms a record;
    // s2 has no site row and keeps going without the field.
    assert_eq!(outcome.kept_count(), 2);
    assert_eq!(
        outcome.records[0].fields.get("site"),
        Some(&TypedValue::String("A".to_string()))
    );
    assert!(!outcome.records[1].fields.contains_key("site"));
    assert_eq!(outcome.source_counts.get("samples"), Some(&2));
    assert_eq!(outcome.source_counts.get("sites"), Some(&2));
}

#[test]
fn coercion_covers_all_declared_types() {
    let schema = json!({
        "properties": {
            "id": {"type": "string", "x-pennsieve-key": true},
            "count": {"type": "integer"},
            "ratio": {"type": "number"},
            "active": {"type": "boolean"},
            "tags": {"type": "array"}
        },
        "required": ["id"]
    });
    let config_text = json!({
        "org_id": "org",
        "template_id": "tpl",
        "model_name": "items",
        "display_name": "Items",
        "sources": {"items": {"type": "pennsieve", "file_pattern": "items.csv"}},
        "join_key": "id",
        "mappings": {
            "id": {"source": "items", "column": "id"},
            "count": {"source": "items", "column": "count"},
            "ratio": {"source": "items", "column": "ratio"},
            "active": {"source": "items", "column": "active"},
            "tags": {"source": "items", "column": "tags"}
        }
    })
    .to_string();
    let config = PopulationConfig::from_json(&config_text).expect("parse config");
    let client = StubCatalog::new(schema).with_file(
        "items.csv",
        "id,count,ratio,active,tags\nr1,123,0.5,yes,a; b ;c\n",
    );

    let outcome = run_population(&config, "ds-1", &client, &NoCache).expect("populate");
    let fields = &outcome.records[0].fields;
    assert_eq!(fields.get("count"), Some(&TypedValue::Integer(123)));
    assert_eq!(fields.get("ratio"), Some(&TypedValue::Number(0.5)));
    assert_eq!(fields.get("active"), Some(&TypedValue::Boolean(true)));
    assert_eq!(
        fields.get("tags"),
        Some(&TypedValue::Array(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string()
        ]))
    );
}

#[test]
fn schema_default_fills_unmapped_field() {
    let schema = json!({
        "properties": {
            "id": {"type": "string", "x-pennsieve-key": true},
            "species": {"type": "string", "default": "homo sapiens"}
        },
        "required": ["id", "species"]
    });
    let config_text = json!({
        "org_id": "org",
        "template_id": "tpl",
        "model_name": "subjects",
        "display_name": "Subjects",
        "sources": {"subjects": {"type": "pennsieve", "file_pattern": "subjects.tsv"}},
        "join_key": "id",
        "mappings": {"id": {"source": "subjects", "column": "id"}}
    })
    .to_string();
    let config = PopulationConfig::from_json(&config_text).expect("parse config");
    let client = StubCatalog::new(schema).with_file("subjects.tsv", "id\n001\n");

    let outcome = run_population(&config, "ds-1", &client, &NoCache).expect("populate");
    assert_eq!(outcome.kept_count(), 1);
    assert_eq!(
        outcome.records[0].fields.get("species"),
        Some(&TypedValue::String("homo sapiens".to_string()))
    );
}

#[test]
fn repeated_runs_yield_identical_output() {
    let client = StubCatalog::new(participants_schema()).with_file(
        "participants.tsv",
        "participant_id\tsex\tage\n003\tFemale\t51\n001\tMale\t34\n001\tMale\t99\n",
    );
    let config = participants_config();
    let first = run_population(&config, "ds-1", &client, &NoCache).expect("populate");
    let second = run_population(&config, "ds-1", &client, &NoCache).expect("populate");
    let first_json = serde_json::to_string(&first.records).expect("serialize");
    let second_json = serde_json::to_string(&second.records).expect("serialize");
    assert_eq!(first_json, second_json);
    // Duplicate key keeps the first row; order follows the key source.
    assert_eq!(first.kept_count(), 2);
    assert_eq!(first.records[0].key, "003");
    assert_eq!(first.records[1].key, "001");
    assert_eq!(first.records[1].fields.get("age"), Some(&TypedValue::Integer(34)));
}

#[test]
fn optional_source_failure_is_demoted() {
    let schema = json!({
        "properties": {
            "id": {"type": "string", "x-pennsieve-key": true},
            "note": {"type": "string"}
        },
        "required": ["id"]
    });
    let config_text = json!({
        "org_id": "org",
        "template_id": "tpl",
        "model_name": "notes",
        "display_name": "Notes",
        "sources": {
            "main": {"type": "pennsieve", "file_pattern": "main.tsv"},
            "extra": {"type": "pennsieve", "file_pattern": "missing.tsv"}
        },
        "join_key": "id",
        "mappings": {
            "id": {"source": "main", "column": "id"},
            "note": {"source": "extra", "column": "note"}
        }
    })
    .to_string();
    let config = PopulationConfig::from_json(&config_text).expect("parse config");
    let client = StubCatalog::new(schema).with_file("main.tsv", "id\n001\n");

    // `note` is optional, so the missing source only costs its fields.
    let outcome = run_population(&config, "ds-1", &client, &NoCache).expect("populate");
    assert_eq!(outcome.kept_count(), 1);
    assert!(!outcome.records[0].fields.contains_key("note"));
}

#[test]
fn missing_key_source_aborts_the_run() {
    let client = StubCatalog::new(participants_schema());
    let error = run_population(&participants_config(), "ds-1", &client, &NoCache)
        .expect_err("should fail");
    assert!(matches!(error, PopulateError::Source(_)));
}

#[test]
fn row_cache_short_circuits_repeat_lookups() {
    let client = StubCatalog::new(participants_schema()).with_file(
        "participants.tsv",
        "participant_id\tsex\n001\tMale\n",
    );
    let cache = MemoryCache::default();
    let config = participants_config();
    run_population(&config, "ds-1", &client, &cache).expect("first run");
    let after_first = client.lookup_count();
    run_population(&config, "ds-1", &client, &cache).expect("second run");
    assert_eq!(client.lookup_count(), after_first);
    // A different dataset misses the cache: remote rows are dataset-scoped.
    run_population(&config, "ds-2", &client, &cache).expect("third run");
    assert!(client.lookup_count() > after_first);
}

#[test]
fn preflight_rejects_broken_configs() {
    let schema = resolve_schema(&participants_schema()).expect("resolve schema");

    let mut config = participants_config();
    config.mappings.remove("participant_id");
    assert!(matches!(
        preflight(&schema, &config).expect_err("unmapped key"),
        ConfigError::UnmappedKeyField { .. }
    ));

    let mut config = participants_config();
    config.mappings.insert(
        "participant_id".to_string(),
        serde_json::from_value(json!({"value": "001"})).expect("mapping"),
    );
    assert!(matches!(
        preflight(&schema, &config).expect_err("constant key"),
        ConfigError::ConstantKeyMapping { .. }
    ));

    let mut config = participants_config();
    config.mappings.remove("sex");
    assert!(matches!(
        preflight(&schema, &config).expect_err("unmapped required"),
        ConfigError::UnmappedRequired { field } if field == "sex"
    ));

    let mut config = participants_config();
    config.mappings.insert(
        "age".to_string(),
        serde_json::from_value(json!({"source": "ghost", "column": "age"})).expect("mapping"),
    );
    assert!(matches!(
        preflight(&schema, &config).expect_err("unknown source"),
        ConfigError::UnknownSource { source, .. } if source == "ghost"
    ));

    let mut config = participants_config();
    config.key_source = Some("other".to_string());
    assert!(matches!(
        preflight(&schema, &config).expect_err("mismatched key source"),
        ConfigError::KeySourceMismatch { .. }
    ));
}

#[test]
fn preflight_derives_key_source_from_key_mapping() {
    let schema = resolve_schema(&participants_schema()).expect("resolve schema");
    let config = participants_config();
    assert_eq!(
        preflight(&schema, &config).expect("preflight"),
        "participants"
    );
}

#[test]
fn custom_array_delimiter_is_honored() {
    let schema = json!({
        "properties": {
            "id": {"type": "string", "x-pennsieve-key": true},
            "tags": {"type": "array"}
        },
        "required": ["id"]
    });
    let config_text = json!({
        "org_id": "org",
        "template_id": "tpl",
        "model_name": "items",
        "display_name": "Items",
        "sources": {"items": {"type": "pennsieve", "file_pattern": "items.tsv"}},
        "join_key": "id",
        "array_delimiter": "|",
        "mappings": {
            "id": {"source": "items", "column": "id"},
            "tags": {"source": "items", "column": "tags"}
        }
    })
    .to_string();
    let config = PopulationConfig::from_json(&config_text).expect("parse config");
    let client = StubCatalog::new(schema).with_file("items.tsv", "id\ttags\nr1\tx|y\n");

    let outcome = run_population(&config, "ds-1", &client, &NoCache).expect("populate");
    assert_eq!(
        outcome.records[0].fields.get("tags"),
        Some(&TypedValue::Array(vec!["x".to_string(), "y".to_string()]))
    );
}
