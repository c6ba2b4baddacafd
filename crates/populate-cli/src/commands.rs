use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, warn};

use populate_catalog::{CatalogClient, DirectoryCatalog, MemoryCache, ModelSpec, NoCache, RowCache};
use populate_engine::generate::generate_config;
use populate_engine::pipeline::run_population;
use populate_engine::schema::resolve_schema;
use populate_model::{PopulationConfig, PopulationOutcome, Schema};

use crate::cli::{FieldsArgs, GenerateConfigArgs, PopulateArgs};
use crate::summary::{apply_table_style, bool_cell, header_cell};
use crate::types::{DatasetSummary, PopulateResult};

pub fn run_populate(args: &PopulateArgs) -> Result<PopulateResult> {
    let config = load_config(&args.config)?;
    let templates_dir = args
        .templates_dir
        .clone()
        .unwrap_or_else(|| parent_dir(&args.config));
    let mut client = DirectoryCatalog::new(templates_dir);
    if let Some(dir) = &args.output_dir {
        client = client.with_output_dir(dir);
    }
    // One warm cache for the whole run; --force-reload opts out.
    let cache: Box<dyn RowCache> = if args.force_reload {
        Box::new(NoCache)
    } else {
        Box::new(MemoryCache::default())
    };

    let mut summaries = Vec::new();
    let mut errors = Vec::new();
    for dataset_dir in &args.datasets {
        let dataset = dataset_dir.display().to_string();
        match run_population(&config, &dataset, &client, cache.as_ref()) {
            Ok(outcome) => {
                let output = if args.dry_run {
                    info!(dataset = %dataset, "dry run, skipping submission");
                    None
                } else {
                    match submit(&client, &config, &dataset, &outcome) {
                        Ok(path) => Some(path),
                        Err(error) => {
                            errors.push(format!("{dataset}: {error:#}"));
                            None
                        }
                    }
                };
                summaries.push(DatasetSummary {
                    dataset,
                    outcome,
                    output,
                });
            }
            Err(error) => {
                warn!(dataset = %dataset, %error, "population failed");
                errors.push(format!("{dataset}: {error}"));
            }
        }
    }
    Ok(PopulateResult {
        model_name: config.model_name.clone(),
        summaries,
        errors,
        dry_run: args.dry_run,
    })
}

fn submit(
    client: &DirectoryCatalog,
    config: &PopulationConfig,
    dataset: &str,
    outcome: &PopulationOutcome,
) -> Result<PathBuf> {
    let spec = ModelSpec {
        name: config.model_name.clone(),
        display_name: config.display_name.clone(),
        description: config.description.clone(),
    };
    let model_id = client
        .create_model(dataset, &config.template_id, &spec)
        .context("create model")?;
    let records: Vec<serde_json::Value> = outcome
        .records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .context("serialize records")?;
    client
        .create_records(dataset, &model_id, &records)
        .context("create records")?;
    Ok(client.records_path(dataset, &model_id))
}

pub fn run_generate_config(args: &GenerateConfigArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let config = generate_config(&schema, &args.org_id, &args.template_id);
    let text = serde_json::to_string_pretty(&config).context("serialize configuration")?;
    match &args.output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("write configuration to {}", path.display()))?;
            info!(path = %path.display(), "configuration written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

pub fn run_fields(args: &FieldsArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Required"),
        header_cell("Key"),
        header_cell("Enum"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    for field in &schema.fields {
        table.add_row(vec![
            comfy_table::Cell::new(&field.name),
            comfy_table::Cell::new(field.field_type.as_str()),
            bool_cell(field.required),
            bool_cell(field.is_key),
            comfy_table::Cell::new(
                field
                    .allowed
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |values| values.join(", ")),
            ),
            comfy_table::Cell::new(field.description.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn load_config(path: &Path) -> Result<PopulationConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read configuration {}", path.display()))?;
    PopulationConfig::from_json(&text)
        .with_context(|| format!("parse configuration {}", path.display()))
}

fn load_schema(path: &Path) -> Result<Schema> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read schema {}", path.display()))?;
    let document: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parse schema {}", path.display()))?;
    Ok(resolve_schema(&document)?)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::from("."),
    }
}
