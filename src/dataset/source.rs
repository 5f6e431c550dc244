use std::path::PathBuf;

use serde::Deserialize;

use crate::error::DataPrepError;
use crate::types::RawRecord;

/// One named manifest in the configuration: where the records live and
/// which two columns carry the transcript and the audio path.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub source_type: String,
    pub path: PathBuf,
    pub text_column: String,
    pub path_column: String,
}

/// Load a manifest source into raw records: only the two designated columns
/// survive, renamed to the canonical `text` / `audio_path` fields. The
/// schema mapping is validated here, before any preprocessing starts.
pub fn load_source(spec: &SourceSpec) -> Result<Vec<RawRecord>, DataPrepError> {
    match spec.source_type.as_str() {
        "csv" => load_csv(spec),
        "jsonl" => load_jsonl(spec),
        other => Err(DataPrepError::UnknownSourceType {
            name: spec.name.clone(),
            source_type: other.to_string(),
        }),
    }
}

fn load_csv(spec: &SourceSpec) -> Result<Vec<RawRecord>, DataPrepError> {
    let mut reader = csv::Reader::from_path(&spec.path)
        .map_err(|e| DataPrepError::runtime("open csv manifest", e))?;
    let headers = reader
        .headers()
        .map_err(|e| DataPrepError::runtime("read csv header", e))?
        .clone();

    let column_index = |column: &str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DataPrepError::missing_column(spec.name.as_str(), column))
    };
    let text_idx = column_index(&spec.text_column)?;
    let path_idx = column_index(&spec.path_column)?;

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(|e| DataPrepError::runtime("read csv manifest", e))?;
        let field = |column: &str, field_idx: usize| {
            row.get(field_idx).map(str::to_string).ok_or_else(|| {
                tracing::error!(source = %spec.name, record = idx, column, "row is too short");
                DataPrepError::missing_column(spec.name.as_str(), column)
            })
        };
        records.push(RawRecord {
            text: field(&spec.text_column, text_idx)?,
            audio_path: field(&spec.path_column, path_idx)?,
        });
    }
    Ok(records)
}

fn load_jsonl(spec: &SourceSpec) -> Result<Vec<RawRecord>, DataPrepError> {
    let data = std::fs::read_to_string(&spec.path)
        .map_err(|e| DataPrepError::io("read jsonl manifest", e))?;

    let mut records = Vec::new();
    for (idx, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row: serde_json::Map<String, serde_json::Value> = serde_json::from_str(line)
            .map_err(|e| DataPrepError::json("parse jsonl manifest", e))?;
        records.push(RawRecord {
            text: field_string(&row, &spec.text_column, spec, idx)?,
            audio_path: field_string(&row, &spec.path_column, spec, idx)?,
        });
    }
    Ok(records)
}

fn field_string(
    row: &serde_json::Map<String, serde_json::Value>,
    column: &str,
    spec: &SourceSpec,
    idx: usize,
) -> Result<String, DataPrepError> {
    let value = row.get(column).ok_or_else(|| {
        tracing::error!(source = %spec.name, record = idx, column, "missing column in jsonl row");
        DataPrepError::missing_column(spec.name.as_str(), column)
    })?;
    Ok(match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
