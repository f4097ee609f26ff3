//! Monthly loan interest-rate dataset.
//!
//! The central-bank workbook lays series out as one row per loan code
//! with a two-row column header: years on sheet row 4 (merged across
//! their months, so the year cell carries forward) and Albanian month
//! abbreviations on row 5. Data starts on row 7.

use crate::error::{CoreError, Result};
use datapress_ingest::{CellValue, SheetGrid, clean_text, load_sheet};
use datapress_model::loans::LoanRecord;
use datapress_model::meta::{
    Dataset, DatasetMeta, DimensionOption, FieldSpec, HierarchyNode, TimeAxis,
};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

const SHEET_NAME: &str = "IntRates_Loans";
const CODE_COL: usize = 1;
const DESCRIPTION_COL: usize = 2;
const YEAR_HEADER_ROW: usize = 3;
const MONTH_HEADER_ROW: usize = 4;
const FIRST_DATA_ROW: usize = 6;

/// Months before this are excluded; the source methodology changed here.
const START_YEAR: i64 = 2010;
const START_MONTH: u32 = 1;

/// Albanian month abbreviations as they appear in the header row.
/// November occurs in two spellings.
const MONTH_MAP: [(&str, u32); 13] = [
    ("Jan", 1),
    ("Shk", 2),
    ("Mar", 3),
    ("Pri", 4),
    ("Maj", 5),
    ("Qer", 6),
    ("Korr", 7),
    ("Gush", 8),
    ("Shta", 9),
    ("Tet", 10),
    ("Nën", 11),
    ("Nen", 11),
    ("Dhj", 12),
];

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[TNH](?:_[0-9A-Za-z]+)*$").expect("Invalid series code regex"));

/// Everything extracted from the workbook: the observations, the label of
/// each series (first row wins on duplicates), and the distinct periods.
#[derive(Debug)]
pub struct LoanSeries {
    pub records: Vec<LoanRecord>,
    pub descriptions: BTreeMap<String, String>,
    pub periods: BTreeSet<String>,
}

/// Maps sheet columns to `YYYY-MM` period keys. A year cell applies to
/// every following column until the next year cell; `0` year cells are
/// filler and keep the running year.
fn column_periods(grid: &SheetGrid) -> Vec<(usize, String)> {
    let mut columns = Vec::new();
    let mut current_year: Option<i64> = None;
    for col in 0..grid.width() {
        if let Some(text) = clean_text(grid.cell(YEAR_HEADER_ROW, col)) {
            if text != "0" {
                current_year = text.parse::<f64>().ok().map(|n| n.trunc() as i64);
            }
        }
        let month = clean_text(grid.cell(MONTH_HEADER_ROW, col)).and_then(|name| {
            MONTH_MAP
                .iter()
                .find(|(label, _)| *label == name)
                .map(|(_, number)| *number)
        });
        if let (Some(year), Some(month)) = (current_year, month) {
            if (year, month) >= (START_YEAR, START_MONTH) {
                columns.push((col, format!("{year:04}-{month:02}")));
            }
        }
    }
    columns
}

enum RateCell {
    Missing,
    /// A present observation; `None` when the cell text failed to parse,
    /// which serializes as an explicit `null`.
    Value(Option<f64>),
}

/// Source percentages scale down to fractions.
fn rate_value(cell: &CellValue) -> RateCell {
    match cell {
        CellValue::Empty => RateCell::Missing,
        CellValue::Number(n) => RateCell::Value(Some(n / 100.0)),
        CellValue::Bool(b) => RateCell::Value(Some(f64::from(u8::from(*b)) / 100.0)),
        CellValue::DateTime(_) => RateCell::Value(None),
        CellValue::Text(text) => {
            if text.is_empty() {
                RateCell::Missing
            } else {
                RateCell::Value(text.trim().parse::<f64>().ok().map(|n| n / 100.0))
            }
        }
    }
}

/// Lowercases the label and capitalizes its first letter.
fn sentence_case(cell: &CellValue) -> String {
    let Some(text) = clean_text(cell) else {
        return String::new();
    };
    let lowered = text.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reads every qualifying series row from the workbook.
pub fn read_series(path: &Path) -> Result<LoanSeries> {
    let grid = load_sheet(path, SHEET_NAME)?;
    if grid.height() <= MONTH_HEADER_ROW {
        return Err(CoreError::LoanHeadersMissing {
            path: path.to_path_buf(),
            sheet: SHEET_NAME.to_string(),
        });
    }
    let series = series_from_grid(&grid);
    info!(
        source = %path.display(),
        series = series.descriptions.len(),
        records = series.records.len(),
        "read loan interest series"
    );
    Ok(series)
}

/// A row qualifies when its code cell matches the series-code shape and at
/// least one period cell is populated. Rows whose period cells are all
/// blank are skipped entirely, including their description.
fn series_from_grid(grid: &SheetGrid) -> LoanSeries {
    let columns = column_periods(grid);

    let mut records = Vec::new();
    let mut descriptions: BTreeMap<String, String> = BTreeMap::new();
    let mut periods: BTreeSet<String> = BTreeSet::new();

    for row in FIRST_DATA_ROW..grid.height() {
        let Some(code) = clean_text(grid.cell(row, CODE_COL)) else {
            continue;
        };
        if code == "0" || !CODE_RE.is_match(&code) {
            continue;
        }
        let description = sentence_case(grid.cell(row, DESCRIPTION_COL));

        let mut row_records = Vec::new();
        for (col, period) in &columns {
            if let RateCell::Value(value) = rate_value(grid.cell(row, *col)) {
                row_records.push(LoanRecord {
                    period: period.clone(),
                    code: code.clone(),
                    value,
                });
            }
        }
        if row_records.is_empty() {
            continue;
        }
        descriptions.entry(code).or_insert(description);
        for record in &row_records {
            periods.insert(record.period.clone());
        }
        records.append(&mut row_records);
    }

    LoanSeries {
        records,
        descriptions,
        periods,
    }
}

/// Nearest existing prefix of `code`, skipping trailing underscores.
/// Codes are ASCII by construction, so byte slicing is safe.
fn find_parent(code: &str, existing: &BTreeSet<&str>) -> Option<String> {
    if !code.contains('_') {
        return None;
    }
    let mut candidate = &code[..code.len() - 1];
    while !candidate.is_empty() {
        if let Some(stripped) = candidate.strip_suffix('_') {
            candidate = stripped;
            continue;
        }
        if existing.contains(candidate) {
            return Some(candidate.to_string());
        }
        candidate = &candidate[..candidate.len() - 1];
    }
    None
}

/// Derives the code hierarchy from prefix relationships between the codes
/// actually present. Nodes come out sorted by code.
pub fn build_hierarchy(descriptions: &BTreeMap<String, String>) -> Vec<HierarchyNode> {
    let codes: BTreeSet<&str> = descriptions.keys().map(String::as_str).collect();
    let mut parents: BTreeMap<&str, Option<String>> = BTreeMap::new();
    let mut children: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for code in &codes {
        let parent = find_parent(code, &codes);
        if let Some(parent_code) = &parent {
            children
                .entry(parent_code.clone())
                .or_default()
                .push((*code).to_string());
        }
        parents.insert(code, parent);
    }

    codes
        .iter()
        .map(|code| {
            let mut level = 0;
            let mut cursor = *code;
            while let Some(Some(parent)) = parents.get(cursor) {
                level += 1;
                cursor = parent.as_str();
            }
            HierarchyNode {
                key: (*code).to_string(),
                label: descriptions
                    .get(*code)
                    .cloned()
                    .unwrap_or_else(|| (*code).to_string()),
                parent: parents.get(*code).cloned().flatten(),
                children: children.get(*code).cloned().unwrap_or_default(),
                level,
            }
        })
        .collect()
}

/// Assembles the dataset metadata block. `generated_at` is injected so
/// callers control the clock.
pub fn build_meta(series: &LoanSeries, source: &Path, generated_at: &str) -> DatasetMeta {
    let periods: Vec<String> = series.periods.iter().cloned().collect();
    let updated_at = periods.last().map(|last| format!("{last}-01"));
    let hierarchy = build_hierarchy(&series.descriptions);

    let mut dimensions = BTreeMap::new();
    dimensions.insert(
        "code".to_string(),
        series
            .descriptions
            .iter()
            .map(|(code, label)| DimensionOption {
                key: code.clone(),
                label: label.clone(),
            })
            .collect(),
    );
    let mut hierarchies = BTreeMap::new();
    hierarchies.insert("code".to_string(), hierarchy);

    DatasetMeta {
        id: "cbk_loans_interest_monthly".to_string(),
        title: "Normat e interesit për kreditë".to_string(),
        generated_at: generated_at.to_string(),
        updated_at,
        source: "Banka Qendrore e Republikës së Kosovës – Normat e interesit për kredi"
            .to_string(),
        source_urls: vec![source.display().to_string()],
        time: TimeAxis::from_periods("monthly", &periods),
        fields: vec![FieldSpec {
            key: "value".to_string(),
            label: "Normat e interesit të kredive".to_string(),
            unit: "%".to_string(),
            value_type: Some("rate".to_string()),
        }],
        metrics: vec!["value".to_string()],
        dimensions,
        dimension_hierarchies: Some(hierarchies),
        extras: None,
        notes: vec![
            "Vlerat janë norma interesi mujore; mungesat lihen bosh.".to_string(),
            "Metodologjia ndryshoi në 2010; shih matricën e konvertimit në skedën '..' të burimit."
                .to_string(),
        ],
    }
}

/// Reads the workbook and produces the finished dataset, records sorted
/// by period then code.
pub fn build_dataset(path: &Path, generated_at: &str) -> Result<Dataset<LoanRecord>> {
    let series = read_series(path)?;
    let meta = build_meta(&series, path, generated_at);
    let mut records = series.records;
    records.sort_by(|a, b| (&a.period, &a.code).cmp(&(&b.period, &b.code)));
    Ok(Dataset { meta, records })
}
