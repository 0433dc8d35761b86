use crate::domain::model::{QueryRecord, DEFAULT_QUERY_NAME};
use serde_json::{Map, Value};
use std::path::Path;

const KNOWN_FIELDS: [&str; 3] = ["name", "query", "description"];

/// Reads one field of a query entry. Missing or null falls back to `default`;
/// non-string values are kept as their JSON text.
fn field(entry: &Map<String, Value>, key: &str, default: &str) -> String {
    match entry.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn record_from_entry(entry: &Map<String, Value>) -> QueryRecord {
    QueryRecord {
        name: field(entry, "name", DEFAULT_QUERY_NAME),
        query: field(entry, "query", ""),
        description: field(entry, "description", ""),
    }
}

fn has_known_field(entry: &Map<String, Value>) -> bool {
    KNOWN_FIELDS.iter().any(|key| entry.contains_key(*key))
}

/// An object, or a list of objects.
fn query_entries(document: Value) -> Result<Vec<Map<String, Value>>, String> {
    match document {
        Value::Object(entry) => Ok(vec![entry]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(entry) => Ok(entry),
                other => Err(format!("list entry is not an object: {}", other)),
            })
            .collect(),
        other => Err(format!("expected an object or a list of objects, found {}", other)),
    }
}

type ParseAttempt = (&'static str, fn(&str) -> Result<Vec<QueryRecord>, String>);

/// Tried in order; the first format that yields query entries wins.
const STRUCTURED_FORMATS: &[ParseAttempt] = &[("json", parse_json), ("yaml", parse_yaml)];

fn parse_json(content: &str) -> Result<Vec<QueryRecord>, String> {
    let document: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let entries = query_entries(document)?;
    Ok(entries.iter().map(record_from_entry).collect())
}

// Most Cypher text is also valid YAML (`WHERE n.name: 'x'` is a mapping), so a YAML
// document must carry at least one known key before it is taken as structured.
fn parse_yaml(content: &str) -> Result<Vec<QueryRecord>, String> {
    let document: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    let entries = query_entries(document)?;
    if !entries.is_empty() && !entries.iter().any(has_known_field) {
        return Err("no entry has a name, query or description key".to_string());
    }
    Ok(entries.iter().map(record_from_entry).collect())
}

/// Whole-file fallback: the content is one query named after the file.
pub fn plain_text_record(content: &str, path: &Path) -> QueryRecord {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_QUERY_NAME.to_string());
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    QueryRecord {
        name,
        query: content.trim().to_string(),
        description: format!("Query imported from {}", file_name),
    }
}

/// Turns file content into query records: JSON, then YAML, then plain text.
/// The file extension is never consulted, and the plain text step always succeeds.
pub fn normalize_content(content: &str, path: &Path) -> Vec<QueryRecord> {
    for (format, parse) in STRUCTURED_FORMATS {
        match parse(content) {
            Ok(records) => {
                tracing::debug!(
                    "Parsed {} as {} ({} queries)",
                    path.display(),
                    format,
                    records.len()
                );
                return records;
            }
            Err(reason) => {
                tracing::debug!("{} is not {}: {}", path.display(), format, reason);
            }
        }
    }

    tracing::debug!("Treating {} as a plain text query", path.display());
    vec![plain_text_record(content, path)]
}
