//! File output for extracted evidence records.
//!
//! Two formats: a pretty-printed JSON array (the default), and CSV whose
//! header is the sorted union of all field names observed across the
//! record set; records differ in shape because `raw` only appears on
//! normalized temporal findings.

use dbwitness_core::{EvidenceRecord, Result};
use std::path::{Path, PathBuf};

/// Supported serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    /// Chooses a format from the output path extension; JSON when the
    /// extension is missing or unrecognized.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => OutputFormat::Csv,
            _ => OutputFormat::Json,
        }
    }
}

/// Writes the record set to a file in the format implied by its extension.
pub async fn write_records(records: &[EvidenceRecord], output_path: &PathBuf) -> Result<()> {
    match OutputFormat::from_path(output_path) {
        OutputFormat::Json => write_json(records, output_path).await,
        OutputFormat::Csv => write_csv(records, output_path).await,
    }
}

/// Writes records as a pretty-printed JSON array.
async fn write_json(records: &[EvidenceRecord], output_path: &PathBuf) -> Result<()> {
    let json_data = serde_json::to_string_pretty(records)
        .map_err(|e| dbwitness_core::DbWitnessError::serialization("JSON serialization", e))?;

    tokio::fs::write(output_path, json_data)
        .await
        .map_err(|e| dbwitness_core::DbWitnessError::Io {
            context: format!("Failed to write to {}", output_path.display()),
            source: e,
        })?;
    Ok(())
}

/// Writes records as CSV with a sorted union header.
///
/// An empty record set yields an empty file rather than a lone header.
async fn write_csv(records: &[EvidenceRecord], output_path: &PathBuf) -> Result<()> {
    let data = render_csv(records)?;

    tokio::fs::write(output_path, data)
        .await
        .map_err(|e| dbwitness_core::DbWitnessError::Io {
            context: format!("Failed to write to {}", output_path.display()),
            source: e,
        })?;
    Ok(())
}

/// Renders the record set to CSV bytes.
pub(crate) fn render_csv(records: &[EvidenceRecord]) -> Result<Vec<u8>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<serde_json::Map<String, serde_json::Value>> = records
        .iter()
        .map(|record| {
            serde_json::to_value(record)
                .map_err(|e| {
                    dbwitness_core::DbWitnessError::serialization("CSV field flattening", e)
                })
                .and_then(|value| match value {
                    serde_json::Value::Object(map) => Ok(map),
                    _ => Err(dbwitness_core::DbWitnessError::configuration(
                        "Evidence record did not serialize to an object",
                    )),
                })
        })
        .collect::<Result<_>>()?;

    // Sorted union of every field name observed across the record set
    let mut fields: Vec<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    fields.sort_unstable();
    fields.dedup();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&fields)
        .map_err(|e| csv_io_error(e, "header"))?;

    for row in &rows {
        let cells: Vec<String> = fields
            .iter()
            .map(|field| match row.get(*field) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            })
            .collect();
        writer
            .write_record(&cells)
            .map_err(|e| csv_io_error(e, "row"))?;
    }

    writer.into_inner().map_err(|e| {
        dbwitness_core::DbWitnessError::configuration(format!(
            "Failed to finalize CSV output: {}",
            e
        ))
    })
}

fn csv_io_error(error: csv::Error, what: &str) -> dbwitness_core::DbWitnessError {
    dbwitness_core::DbWitnessError::Io {
        context: format!("Failed to write CSV {}", what),
        source: std::io::Error::other(error),
    }
}
