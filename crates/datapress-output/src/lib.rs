//! JSON output writing for the datapress datasets.
//!
//! Every output file is pretty-printed UTF-8 JSON. The drug-price
//! pipeline uses the two envelope shapes here; the supplementary
//! datasets serialize [`datapress_model::meta::Dataset`] directly.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use datapress_model::drug_prices::{DrugPriceEntry, SnapshotSummary};
use serde::Serialize;
use tracing::info;

/// UTC timestamp with second precision, e.g. `2026-01-15T10:30:00Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Top-level shape of the drug-price records file.
#[derive(Debug, Clone, Serialize)]
pub struct RecordsEnvelope {
    pub generated_at: String,
    pub records: Vec<DrugPriceEntry>,
}

/// Top-level shape of the drug-price versions file.
#[derive(Debug, Clone, Serialize)]
pub struct VersionsEnvelope {
    pub generated_at: String,
    pub versions: Vec<SnapshotSummary>,
}

/// Ensure a parent directory exists for a file path.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}

/// Writes `payload` to `path` as pretty-printed JSON, creating parent
/// directories as needed.
pub fn write_json<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut body = serde_json::to_string_pretty(payload)
        .with_context(|| format!("serialize {}", path.display()))?;
    body.push('\n');
    fs::write(path, &body).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), bytes = body.len(), "wrote output file");
    Ok(())
}
