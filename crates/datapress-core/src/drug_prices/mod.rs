//! Drug-price dataset builder.
//!
//! Each `drug-prices-<version>.xlsx` export is one snapshot of the
//! ministry's price list. A snapshot is cleaned and deduplicated on its
//! own, then all snapshots fold together into one entry per logical
//! product carrying the freshest field values and the full per-version
//! price history.

pub mod aggregate;
pub mod dedup;

use crate::error::{CoreError, Result};
use datapress_ingest::{
    CellValue, SheetGrid, clean_text, hidden_columns, load_first_sheet, matching_files, to_decimal,
    to_integer, to_validity_date,
};
use datapress_model::drug_prices::{DrugPriceEntry, DrugRecord, SnapshotSummary};
use datapress_model::version::Version;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"drug-prices-(\d+(?:\.\d+)*)").expect("Invalid version regex"));

/// Sheet row carrying the column headers. The first row holds a title
/// banner in every known export.
const HEADER_ROW: usize = 1;
const FIRST_DATA_ROW: usize = 2;

/// Recognized columns, keyed by their Albanian header text.
const COLUMN_MAP: [(&str, Field); 14] = [
    ("Nr rendor", Field::SerialNumber),
    ("Emri i produktit", Field::ProductName),
    ("Substanca Aktive", Field::ActiveSubstance),
    ("ATC Kodi", Field::AtcCode),
    ("Doza", Field::Dose),
    ("Forma Farmaceutike", Field::PharmaceuticalForm),
    ("Paketimi", Field::Packaging),
    ("Mbajtësi i AM", Field::MarketingAuthorisationHolder),
    ("Prodhuesi", Field::Manufacturer),
    ("Numri i MA/RMA/PMA", Field::AuthorizationNumber),
    ("ÇMIMI ME SHUMICË", Field::PriceWholesale),
    ("ÇMIMI ME MARZHË", Field::PriceWithMargin),
    ("ÇMIMI ME PAKICË", Field::PriceRetail),
    ("Data e validitetit", Field::ValidUntil),
];

/// Reference-price columns, keyed by region header. A region header can
/// appear twice on the sheet: the first occurrence feeds
/// `reference_prices`, the second `reference_prices_secondary`.
const REGION_MAP: [(&str, &str); 7] = [
    ("Maqedoni", "macedonia"),
    ("Mali i zi", "montenegro"),
    ("Kroaci", "croatia"),
    ("Slloveni", "slovenia"),
    ("Bullgari", "bulgaria"),
    ("Estoni", "estonia"),
    ("tjeter", "other"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    SerialNumber,
    ProductName,
    ActiveSubstance,
    AtcCode,
    Dose,
    PharmaceuticalForm,
    Packaging,
    MarketingAuthorisationHolder,
    Manufacturer,
    AuthorizationNumber,
    PriceWholesale,
    PriceWithMargin,
    PriceRetail,
    ValidUntil,
}

/// Snapshot version extracted from a workbook filename.
pub fn version_from_path(path: &Path) -> Result<Version> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let captures = VERSION_RE
        .captures(stem)
        .ok_or_else(|| CoreError::VersionMissing {
            path: path.to_path_buf(),
        })?;
    Version::parse(&captures[1]).map_err(|source| CoreError::VersionInvalid {
        path: path.to_path_buf(),
        source,
    })
}

struct ColumnLayout {
    fields: Vec<(usize, Field)>,
    primary_regions: Vec<(usize, &'static str)>,
    secondary_regions: Vec<(usize, &'static str)>,
}

/// Resolves the visible columns of a snapshot sheet.
///
/// Occurrence counting runs over every named header, hidden ones
/// included, so that a hidden first region block still pushes the visible
/// duplicate into the secondary map. Hidden columns themselves never
/// contribute values.
fn map_columns(grid: &SheetGrid, hidden: &BTreeSet<usize>, path: &Path) -> Result<ColumnLayout> {
    if grid.height() <= HEADER_ROW {
        return Err(CoreError::HeaderRowMissing {
            path: path.to_path_buf(),
            rows: grid.height(),
        });
    }

    let mut layout = ColumnLayout {
        fields: Vec::new(),
        primary_regions: Vec::new(),
        secondary_regions: Vec::new(),
    };
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut any_visible = false;

    for col in 0..grid.width() {
        let Some(header) = clean_text(grid.cell(HEADER_ROW, col)) else {
            continue;
        };
        let count = occurrences.entry(header.clone()).or_insert(0);
        *count += 1;
        let occurrence = *count;
        if hidden.contains(&col) {
            continue;
        }
        any_visible = true;

        if let Some((_, field)) = COLUMN_MAP.iter().find(|(name, _)| *name == header) {
            if occurrence == 1 {
                layout.fields.push((col, *field));
            }
            continue;
        }
        if let Some((_, slug)) = REGION_MAP.iter().find(|(name, _)| *name == header) {
            match occurrence {
                1 => layout.primary_regions.push((col, *slug)),
                2 => layout.secondary_regions.push((col, *slug)),
                _ => {}
            }
        }
    }

    if !any_visible {
        return Err(CoreError::NoVisibleHeaders {
            path: path.to_path_buf(),
        });
    }
    debug!(
        path = %path.display(),
        fields = layout.fields.len(),
        regions = layout.primary_regions.len() + layout.secondary_regions.len(),
        "mapped visible columns"
    );
    Ok(layout)
}

/// Builds one normalized record per data row. Rows without a product name
/// are dropped.
pub fn build_records(
    grid: &SheetGrid,
    hidden: &BTreeSet<usize>,
    version: &Version,
    path: &Path,
) -> Result<Vec<DrugRecord>> {
    let layout = map_columns(grid, hidden, path)?;
    if layout.fields.is_empty() {
        warn!(path = %path.display(), "no recognized columns among visible headers");
    }

    let mut records = Vec::new();
    for row in FIRST_DATA_ROW..grid.height() {
        let mut record = DrugRecord::new(version.clone());
        for &(col, field) in &layout.fields {
            apply_field(&mut record, field, grid.cell(row, col));
        }
        for &(col, slug) in &layout.primary_regions {
            if let Some(value) = to_decimal(grid.cell(row, col)) {
                record.reference_prices.insert(slug.to_string(), value);
            }
        }
        for &(col, slug) in &layout.secondary_regions {
            if let Some(value) = to_decimal(grid.cell(row, col)) {
                record
                    .reference_prices_secondary
                    .insert(slug.to_string(), value);
            }
        }
        if record.product_name.is_some() {
            records.push(record);
        }
    }
    Ok(records)
}

fn apply_field(record: &mut DrugRecord, field: Field, cell: &CellValue) {
    match field {
        Field::SerialNumber => record.serial_number = to_integer(cell),
        Field::ProductName => record.product_name = clean_text(cell),
        Field::ActiveSubstance => record.active_substance = clean_text(cell),
        Field::AtcCode => record.atc_code = clean_text(cell),
        Field::Dose => record.dose = clean_text(cell),
        Field::PharmaceuticalForm => record.pharmaceutical_form = clean_text(cell),
        Field::Packaging => record.packaging = clean_text(cell),
        Field::MarketingAuthorisationHolder => {
            record.marketing_authorisation_holder = clean_text(cell);
        }
        Field::Manufacturer => record.manufacturer = clean_text(cell),
        Field::AuthorizationNumber => record.authorization_number = clean_text(cell),
        Field::PriceWholesale => record.price_wholesale = to_decimal(cell),
        Field::PriceWithMargin => record.price_with_margin = to_decimal(cell),
        Field::PriceRetail => record.price_retail = to_decimal(cell),
        Field::ValidUntil => record.valid_until = to_validity_date(cell),
    }
}

/// One workbook's records after deduplication, plus its summary row.
#[derive(Debug)]
pub struct SnapshotRecords {
    pub records: Vec<DrugRecord>,
    pub summary: SnapshotSummary,
}

/// Reads one snapshot workbook end to end: version from the filename,
/// visible columns from the sheet, then per-row cleanup and intra-snapshot
/// deduplication.
pub fn load_snapshot(path: &Path) -> Result<SnapshotRecords> {
    let version = version_from_path(path)?;
    let grid = load_first_sheet(path)?;
    let hidden = hidden_columns(path, grid.name())?;
    let rows = build_records(&grid, &hidden, &version, path)?;
    let records = dedup::deduplicate(rows);

    let valid_until_values: BTreeSet<String> = records
        .iter()
        .filter_map(|r| r.valid_until.clone())
        .collect();
    let summary = SnapshotSummary {
        version,
        source_file: path.display().to_string(),
        record_count: records.len(),
        valid_until_values: valid_until_values.into_iter().collect(),
    };
    debug!(
        source = %path.display(),
        version = %summary.version,
        records = summary.record_count,
        "loaded snapshot"
    );
    Ok(SnapshotRecords { records, summary })
}

/// Reconciled entries plus one summary row per snapshot, in version order.
#[derive(Debug)]
pub struct DrugPriceDataset {
    pub entries: Vec<DrugPriceEntry>,
    pub summaries: Vec<SnapshotSummary>,
}

/// Runs the full pipeline over every workbook under `source_dir` whose
/// name matches `pattern`. Snapshots fold in version order. An empty match
/// set produces an empty dataset rather than an error.
pub fn build_dataset(source_dir: &Path, pattern: &str) -> Result<DrugPriceDataset> {
    let files = matching_files(source_dir, pattern)?;
    let mut ordered: Vec<(Version, PathBuf)> = Vec::with_capacity(files.len());
    for path in files {
        ordered.push((version_from_path(&path)?, path));
    }
    ordered.sort_by(|a, b| a.0.cmp(&b.0));
    if ordered.is_empty() {
        warn!(dir = %source_dir.display(), pattern, "no drug-price workbooks matched");
    }

    let mut master: Vec<DrugRecord> = Vec::new();
    let mut summaries = Vec::new();
    for (_, path) in &ordered {
        let snapshot = load_snapshot(path)?;
        master.extend(snapshot.records);
        summaries.push(snapshot.summary);
    }

    let entries = reconcile(master);
    info!(
        snapshots = summaries.len(),
        entries = entries.len(),
        "reconciled drug-price dataset"
    );
    Ok(DrugPriceDataset { entries, summaries })
}

/// Orders the combined records by (version, serial number) and folds them
/// into one entry per product.
pub fn reconcile(mut records: Vec<DrugRecord>) -> Vec<DrugPriceEntry> {
    records.sort_by(|a, b| {
        a.version.cmp(&b.version).then_with(|| {
            a.serial_number
                .unwrap_or(0)
                .cmp(&b.serial_number.unwrap_or(0))
        })
    });
    aggregate::aggregate(&records)
}
