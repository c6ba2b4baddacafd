//! Record joining: left-outer join anchored on the key source.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use populate_model::{JoinedRecord, RawRow};

use crate::sources::LoadedSources;

/// Merge loaded row-sets into per-key records.
///
/// The key universe is the sequence of non-empty `join_key` values in the
/// key source, in row order; the first row wins on duplicate keys. Rows
/// from other sources attach when their `join_key` column matches, and are
/// omitted otherwise. A key present only in a secondary source never forms
/// a record.
pub fn join_records(sources: &LoadedSources, key_source: &str, join_key: &str) -> Vec<JoinedRecord> {
    let Some(anchor_rows) = sources.get(key_source) else {
        return Vec::new();
    };

    // Index secondary sources by their join-key column, first row wins.
    let mut indexes: BTreeMap<&str, BTreeMap<&str, &RawRow>> = BTreeMap::new();
    for (name, rows) in &sources.rows {
        if name == key_source {
            continue;
        }
        let mut index: BTreeMap<&str, &RawRow> = BTreeMap::new();
        for row in rows {
            if let Some(value) = row.get(join_key)
                && !value.is_empty()
            {
                index.entry(value.as_str()).or_insert(row);
            }
        }
        indexes.insert(name.as_str(), index);
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut records = Vec::new();
    for row in anchor_rows {
        let Some(key) = row.get(join_key).filter(|value| !value.is_empty()) else {
            debug!(source = key_source, "row without join key skipped");
            continue;
        };
        if !seen.insert(key.as_str()) {
            debug!(key = %key, "duplicate join key in key source, keeping first row");
            continue;
        }
        let mut rows_by_source = BTreeMap::new();
        rows_by_source.insert(key_source.to_string(), row.clone());
        for (name, index) in &indexes {
            if let Some(matched) = index.get(key.as_str()) {
                rows_by_source.insert((*name).to_string(), (*matched).clone());
            }
        }
        records.push(JoinedRecord {
            key: key.clone(),
            rows: rows_by_source,
        });
    }
    records
}
