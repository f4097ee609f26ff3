//! Turnover summaries from the tax-administration Excel exports.
//!
//! Every workbook whose filename mentions "turnover" is read, stacked
//! into one row set and rolled up four ways: categories by year, cities
//! by year, top categories per city, and the latest year by month.

use crate::error::{CoreError, Result};
use datapress_ingest::{
    CellValue, SheetGrid, clean_text, load_first_sheet, to_integer, to_number,
    walk_files_with_extension,
};
use datapress_model::meta::{Dataset, DatasetMeta, DimensionOption, FieldSpec, TimeAxis};
use datapress_model::turnover::{CategoryYearRow, CityYearRow, MonthlyRow, RankingRow};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SOURCE: &str = "Ministria e Financave, Punës dhe Transfereve (MFK)";
const SOURCE_URL: &str = "https://mfpt.rks-gov.net";

/// How many categories each municipality keeps in the yearly ranking.
const RANKING_DEPTH: usize = 8;

/// Roll-up rows the exports mix in with the per-entity data.
const AGGREGATE_TOKENS: [&str; 2] = ["total", "totali"];

/// Header keywords in priority order. The first canonical column whose
/// keyword matches a header cell claims it, so a header like "Statusi i
/// qarkullimit" lands on the status column, not on turnover.
const HEADER_KEYWORDS: [(Column, &[&str]); 7] = [
    (Column::Year, &["year", "viti", "godina"]),
    (Column::Month, &["month", "muaji", "mesec"]),
    (Column::Category, &["kategori", "sektor", "description"]),
    (Column::City, &["komuna", "municipality", "opština"]),
    (Column::RegistrationStatus, &["registration", "status"]),
    (Column::Taxpayers, &["number of taxpayers", "tatimpaguesve", "poreskih obveznika"]),
    (Column::Turnover, &["turnover", "qarkullim", "promet"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Year,
    Month,
    Category,
    City,
    RegistrationStatus,
    Taxpayers,
    Turnover,
}

/// One cleaned data row pooled across all source workbooks.
#[derive(Debug, Clone)]
struct TurnoverRow {
    year: i64,
    month: i64,
    category: String,
    city: String,
    #[allow(dead_code)]
    registration_status: Option<String>,
    taxpayers: i64,
    turnover: f64,
}

/// The four turnover datasets, one per output file. Each file is named
/// after its meta id.
#[derive(Debug, Clone)]
pub struct TurnoverOutputs {
    pub categories_yearly: Dataset<CategoryYearRow>,
    pub cities_yearly: Dataset<CityYearRow>,
    pub city_category_yearly: Dataset<RankingRow>,
    pub city_category_monthly: Dataset<MonthlyRow>,
}

/// Finds turnover workbooks anywhere under `dir` by filename.
pub fn discover_workbooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let files = walk_files_with_extension(dir, "xlsx")?;
    let matched: Vec<PathBuf> = files
        .into_iter()
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().to_lowercase().contains("turnover"))
        })
        .collect();
    debug!(dir = %dir.display(), files = matched.len(), "discovered turnover workbooks");
    Ok(matched)
}

/// Reads every turnover workbook under `source_dir` and builds the four
/// summary datasets. `generated_at` is injected so callers control the
/// clock.
pub fn build_datasets(source_dir: &Path, generated_at: &str) -> Result<TurnoverOutputs> {
    let files = discover_workbooks(source_dir)?;
    if files.is_empty() {
        return Err(CoreError::NoTurnoverFiles {
            dir: source_dir.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for path in &files {
        let grid = load_first_sheet(path)?;
        let parsed = rows_from_grid(&grid, path)?;
        debug!(source = %path.display(), rows = parsed.len(), "parsed turnover workbook");
        rows.extend(parsed);
    }

    let outputs = build_outputs(&rows, generated_at)?;
    info!(
        files = files.len(),
        rows = rows.len(),
        years = outputs.categories_yearly.meta.time.count,
        "built turnover datasets"
    );
    Ok(outputs)
}

/// The exports put the header at varying depths; the first row holding a
/// year label marks it.
fn detect_header_row(grid: &SheetGrid) -> Option<usize> {
    (0..grid.height()).find(|&row| {
        (0..grid.width()).any(|col| match grid.cell(row, col) {
            CellValue::Text(text) => {
                let lowered = text.to_lowercase();
                lowered.contains("year") || lowered.contains("viti")
            }
            _ => false,
        })
    })
}

fn map_header(text: &str) -> Option<Column> {
    let lowered = text.to_lowercase();
    HEADER_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(column, _)| *column)
}

/// Claims one sheet column per canonical column, first match winning on
/// both axes. Non-text header cells never match.
fn layout_from_header(grid: &SheetGrid, header_row: usize) -> Vec<(Column, usize)> {
    let mut columns: Vec<(Column, usize)> = Vec::new();
    for col in 0..grid.width() {
        let CellValue::Text(text) = grid.cell(header_row, col) else {
            continue;
        };
        let Some(column) = map_header(text) else {
            continue;
        };
        if !columns.iter().any(|(claimed, _)| *claimed == column) {
            columns.push((column, col));
        }
    }
    columns
}

fn is_aggregate(label: &str) -> bool {
    AGGREGATE_TOKENS.contains(&label.to_lowercase().as_str())
}

/// Uppercases the first letter of every alphabetic run. The exports
/// write municipality names in mixed case from year to year.
fn title_case(text: &str) -> String {
    let mut label = String::with_capacity(text.len());
    let mut start_of_word = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if start_of_word {
                label.extend(ch.to_uppercase());
            } else {
                label.push(ch);
            }
            start_of_word = false;
        } else {
            label.push(ch);
            start_of_word = true;
        }
    }
    label
}

/// Normalizes a municipality label: whitespace collapsed, placeholder
/// spellings dropped, then title-cased.
fn city_label(cell: &CellValue) -> Option<String> {
    let text = clean_text(cell)?;
    let lowered = text.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() || collapsed == "nan" || collapsed == "none" {
        return None;
    }
    Some(title_case(&collapsed))
}

/// Extracts cleaned rows from one sheet. Rows missing the year, month,
/// category, city or turnover are dropped, as are roll-up rows; missing
/// taxpayer counts become zero.
fn rows_from_grid(grid: &SheetGrid, path: &Path) -> Result<Vec<TurnoverRow>> {
    let header_row = detect_header_row(grid).ok_or_else(|| CoreError::TurnoverHeaderMissing {
        path: path.to_path_buf(),
    })?;
    let columns = layout_from_header(grid, header_row);
    let position = |column: Column| {
        columns
            .iter()
            .find(|(claimed, _)| *claimed == column)
            .map(|(_, at)| *at)
    };

    let year_col = position(Column::Year);
    let month_col = position(Column::Month);
    let category_col = position(Column::Category);
    let city_col = position(Column::City);
    let status_col = position(Column::RegistrationStatus);
    let taxpayers_col = position(Column::Taxpayers);
    let turnover_col = position(Column::Turnover);

    let mut rows = Vec::new();
    for row in header_row + 1..grid.height() {
        let cell =
            |col: Option<usize>| col.map_or(&CellValue::Empty, |at| grid.cell(row, at));

        let Some(year) = to_integer(cell(year_col)) else {
            continue;
        };
        let Some(month) = to_integer(cell(month_col)) else {
            continue;
        };
        let Some(category) = clean_text(cell(category_col)) else {
            continue;
        };
        let Some(city) = city_label(cell(city_col)) else {
            continue;
        };
        let Some(turnover) = to_number(cell(turnover_col)) else {
            continue;
        };
        if is_aggregate(&category) || is_aggregate(&city) {
            continue;
        }
        let taxpayers = to_number(cell(taxpayers_col)).map_or(0, |count| count.round() as i64);
        let registration_status = clean_text(cell(status_col));

        rows.push(TurnoverRow {
            year,
            month,
            category,
            city,
            registration_status,
            taxpayers,
            turnover,
        });
    }
    Ok(rows)
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    turnover: f64,
    taxpayers: i64,
}

impl Totals {
    fn add(&mut self, row: &TurnoverRow) {
        self.turnover += row.turnover;
        self.taxpayers += row.taxpayers;
    }
}

fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn dimension_options(values: &BTreeSet<&str>) -> Vec<DimensionOption> {
    values
        .iter()
        .map(|value| DimensionOption {
            key: (*value).to_string(),
            label: (*value).to_string(),
        })
        .collect()
}

fn turnover_meta(
    id: &str,
    title: &str,
    time: TimeAxis,
    dimensions: BTreeMap<String, Vec<DimensionOption>>,
    generated_at: &str,
) -> DatasetMeta {
    let mut extras = BTreeMap::new();
    extras.insert("currency".to_string(), serde_json::Value::from("EUR"));
    DatasetMeta {
        id: id.to_string(),
        title: title.to_string(),
        generated_at: generated_at.to_string(),
        updated_at: None,
        source: SOURCE.to_string(),
        source_urls: vec![SOURCE_URL.to_string()],
        time,
        fields: vec![
            FieldSpec {
                key: "turnover".to_string(),
                label: "Qarkullimi".to_string(),
                unit: "EUR".to_string(),
                value_type: None,
            },
            FieldSpec {
                key: "taxpayers".to_string(),
                label: "Tatimpagues".to_string(),
                unit: "count".to_string(),
                value_type: None,
            },
        ],
        metrics: vec!["turnover".to_string(), "taxpayers".to_string()],
        dimensions,
        dimension_hierarchies: None,
        extras: Some(extras),
        notes: vec![],
    }
}

/// Rolls the pooled rows up into the four datasets.
fn build_outputs(rows: &[TurnoverRow], generated_at: &str) -> Result<TurnoverOutputs> {
    let years: BTreeSet<i64> = rows.iter().map(|row| row.year).collect();
    let Some(&last_year) = years.last() else {
        return Err(CoreError::EmptyTurnover);
    };
    let year_periods: Vec<String> = years.iter().map(i64::to_string).collect();

    let categories: BTreeSet<&str> = rows.iter().map(|row| row.category.as_str()).collect();
    let cities: BTreeSet<&str> = rows.iter().map(|row| row.city.as_str()).collect();
    let category_options = dimension_options(&categories);
    let city_options = dimension_options(&cities);

    // Categories by year.
    let mut category_totals: BTreeMap<(i64, &str), Totals> = BTreeMap::new();
    for row in rows {
        category_totals
            .entry((row.year, row.category.as_str()))
            .or_default()
            .add(row);
    }
    let category_records: Vec<CategoryYearRow> = category_totals
        .iter()
        .map(|(&(year, category), totals)| CategoryYearRow {
            period: year.to_string(),
            category: category.to_string(),
            turnover: round_currency(totals.turnover),
            taxpayers: totals.taxpayers,
        })
        .collect();
    let mut category_dimension = BTreeMap::new();
    category_dimension.insert("category".to_string(), category_options.clone());
    let categories_yearly = Dataset {
        meta: turnover_meta(
            "mfk_turnover_categories_yearly",
            "Qarkullimi sipas kategorive (vjetor)",
            TimeAxis::from_periods("yearly", &year_periods),
            category_dimension,
            generated_at,
        ),
        records: category_records,
    };

    // Cities by year.
    let mut city_totals: BTreeMap<(i64, &str), Totals> = BTreeMap::new();
    for row in rows {
        city_totals
            .entry((row.year, row.city.as_str()))
            .or_default()
            .add(row);
    }
    let city_records: Vec<CityYearRow> = city_totals
        .iter()
        .map(|(&(year, city), totals)| CityYearRow {
            period: year.to_string(),
            city: city.to_string(),
            turnover: round_currency(totals.turnover),
            taxpayers: totals.taxpayers,
        })
        .collect();
    let mut city_dimension = BTreeMap::new();
    city_dimension.insert("city".to_string(), city_options.clone());
    let cities_yearly = Dataset {
        meta: turnover_meta(
            "mfk_turnover_cities_yearly",
            "Qarkullimi sipas komunave (vjetor)",
            TimeAxis::from_periods("yearly", &year_periods),
            city_dimension,
            generated_at,
        ),
        records: city_records,
    };

    // Top categories per municipality and year. Ties on turnover break
    // on the category name so reruns rank identically.
    let mut pair_totals: BTreeMap<(i64, &str, &str), Totals> = BTreeMap::new();
    for row in rows {
        pair_totals
            .entry((row.year, row.city.as_str(), row.category.as_str()))
            .or_default()
            .add(row);
    }
    let mut per_city: BTreeMap<(i64, &str), Vec<(&str, Totals)>> = BTreeMap::new();
    for (&(year, city, category), &totals) in &pair_totals {
        per_city.entry((year, city)).or_default().push((category, totals));
    }
    let mut ranking_records = Vec::new();
    for ((year, city), mut entries) in per_city {
        entries.sort_by(|a, b| {
            b.1.turnover
                .total_cmp(&a.1.turnover)
                .then_with(|| a.0.cmp(b.0))
        });
        for (index, (category, totals)) in entries.into_iter().take(RANKING_DEPTH).enumerate() {
            ranking_records.push(RankingRow {
                period: year.to_string(),
                city: city.to_string(),
                category: category.to_string(),
                turnover: round_currency(totals.turnover),
                taxpayers: totals.taxpayers,
                rank: index + 1,
            });
        }
    }
    let mut both_dimensions = BTreeMap::new();
    both_dimensions.insert("category".to_string(), category_options);
    both_dimensions.insert("city".to_string(), city_options);
    let mut ranking_meta = turnover_meta(
        "mfk_turnover_city_category_yearly",
        "Top kategoritë sipas komunave (vjetor)",
        TimeAxis::from_periods("yearly", &year_periods),
        both_dimensions.clone(),
        generated_at,
    );
    ranking_meta.fields.push(FieldSpec {
        key: "rank".to_string(),
        label: "Renditja".to_string(),
        unit: "index".to_string(),
        value_type: None,
    });
    let city_category_yearly = Dataset {
        meta: ranking_meta,
        records: ranking_records,
    };

    // Latest year by month.
    let mut monthly_totals: BTreeMap<(i64, &str, &str), Totals> = BTreeMap::new();
    let mut months: BTreeSet<i64> = BTreeSet::new();
    for row in rows.iter().filter(|row| row.year == last_year) {
        months.insert(row.month);
        monthly_totals
            .entry((row.month, row.category.as_str(), row.city.as_str()))
            .or_default()
            .add(row);
    }
    let monthly_records: Vec<MonthlyRow> = monthly_totals
        .iter()
        .map(|(&(month, category, city), totals)| MonthlyRow {
            period: format!("{last_year}-{month:02}"),
            category: category.to_string(),
            city: city.to_string(),
            turnover: round_currency(totals.turnover),
            taxpayers: totals.taxpayers,
        })
        .collect();
    let month_periods: Vec<String> = months
        .iter()
        .map(|month| format!("{last_year}-{month:02}"))
        .collect();
    let mut monthly_meta = turnover_meta(
        "mfk_turnover_city_category_monthly",
        "Qarkullimi mujor sipas kategorive dhe komunave",
        TimeAxis::from_periods("monthly", &month_periods),
        both_dimensions,
        generated_at,
    );
    if let Some(extras) = monthly_meta.extras.as_mut() {
        extras.insert("coverage_year".to_string(), serde_json::Value::from(last_year));
    }
    let city_category_monthly = Dataset {
        meta: monthly_meta,
        records: monthly_records,
    };

    Ok(TurnoverOutputs {
        categories_yearly,
        cities_yearly,
        city_category_yearly,
        city_category_monthly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    fn number(value: f64) -> CellValue {
        CellValue::Number(value)
    }

    fn header() -> Vec<CellValue> {
        vec![
            text("Viti"),
            text("Muaji"),
            text("Kategoria"),
            text("Komuna"),
            text("Statusi"),
            text("Nr. i tatimpaguesve"),
            text("Qarkullimi"),
        ]
    }

    fn data_row(year: f64, month: f64, category: &str, city: &str, turnover: f64) -> Vec<CellValue> {
        vec![
            number(year),
            number(month),
            text(category),
            text(city),
            text("Aktiv"),
            number(3.0),
            number(turnover),
        ]
    }

    fn row(year: i64, month: i64, category: &str, city: &str, turnover: f64) -> TurnoverRow {
        TurnoverRow {
            year,
            month,
            category: category.to_string(),
            city: city.to_string(),
            registration_status: None,
            taxpayers: 3,
            turnover,
        }
    }

    #[test]
    fn parses_rows_below_a_detected_header() {
        let grid = SheetGrid::new(
            "Sheet1",
            vec![
                vec![text("Qarkullimi i tatimpaguesve 2021")],
                header(),
                data_row(2021.0, 1.0, "Tregtia", "PRISHTINË", 1200.456),
                data_row(2021.0, 1.0, "Tregtia", "fushë kosovë", 300.0),
            ],
        );
        let rows = rows_from_grid(&grid, Path::new("turnover_2021.xlsx")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].city, "Prishtinë");
        assert_eq!(rows[1].city, "Fushë Kosovë");
        assert_eq!(rows[0].taxpayers, 3);
        assert_eq!(rows[0].registration_status.as_deref(), Some("Aktiv"));
    }

    #[test]
    fn header_keywords_resolve_in_priority_order() {
        let grid = SheetGrid::new(
            "Sheet1",
            vec![vec![
                text("Viti"),
                text("Statusi i qarkullimit"),
                text("Qarkullimi"),
            ]],
        );
        let columns = layout_from_header(&grid, 0);
        assert_eq!(
            columns,
            vec![
                (Column::Year, 0),
                (Column::RegistrationStatus, 1),
                (Column::Turnover, 2),
            ]
        );
    }

    #[test]
    fn duplicate_headers_keep_the_first_column() {
        let grid = SheetGrid::new(
            "Sheet1",
            vec![vec![text("Viti"), text("Year"), number(2021.0)]],
        );
        let columns = layout_from_header(&grid, 0);
        assert_eq!(columns, vec![(Column::Year, 0)]);
    }

    #[test]
    fn aggregate_and_incomplete_rows_are_dropped() {
        let mut missing_turnover = data_row(2021.0, 2.0, "Tregtia", "Pejë", 0.0);
        missing_turnover[6] = CellValue::Empty;
        let grid = SheetGrid::new(
            "Sheet1",
            vec![
                header(),
                data_row(2021.0, 1.0, "Totali", "Prishtinë", 900.0),
                data_row(2021.0, 1.0, "Tregtia", "TOTAL", 900.0),
                data_row(2021.0, 1.0, "Tregtia", "nan", 900.0),
                missing_turnover,
                data_row(2021.0, 1.0, "Tregtia", "Pejë", 900.0),
            ],
        );
        let rows = rows_from_grid(&grid, Path::new("turnover.xlsx")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].city, "Pejë");
    }

    #[test]
    fn missing_taxpayer_counts_become_zero() {
        let mut no_taxpayers = data_row(2021.0, 1.0, "Tregtia", "Pejë", 50.0);
        no_taxpayers[5] = CellValue::Empty;
        let grid = SheetGrid::new("Sheet1", vec![header(), no_taxpayers]);
        let rows = rows_from_grid(&grid, Path::new("turnover.xlsx")).unwrap();
        assert_eq!(rows[0].taxpayers, 0);
    }

    #[test]
    fn sheets_without_a_header_row_error() {
        let grid = SheetGrid::new(
            "Sheet1",
            vec![vec![text("Raport mujor")], vec![number(1.0), number(2.0)]],
        );
        let result = rows_from_grid(&grid, Path::new("turnover.xlsx"));
        assert!(matches!(
            result,
            Err(CoreError::TurnoverHeaderMissing { .. })
        ));
    }

    #[test]
    fn yearly_totals_group_and_round() {
        let rows = vec![
            row(2022, 1, "Tregtia", "Prishtinë", 100.004),
            row(2022, 2, "Tregtia", "Pejë", 50.003),
            row(2021, 1, "Ndërtimi", "Prishtinë", 10.0),
        ];
        let outputs = build_outputs(&rows, "2026-01-01T00:00:00Z").unwrap();

        let categories = &outputs.categories_yearly.records;
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].period, "2021");
        assert_eq!(categories[0].category, "Ndërtimi");
        assert_eq!(categories[1].period, "2022");
        assert_eq!(categories[1].turnover, 150.01);
        assert_eq!(categories[1].taxpayers, 6);

        let cities = &outputs.cities_yearly.records;
        assert_eq!(cities.len(), 3);
        assert_eq!(outputs.cities_yearly.meta.time.first.as_deref(), Some("2021"));
        assert_eq!(outputs.cities_yearly.meta.time.last.as_deref(), Some("2022"));
    }

    #[test]
    fn rankings_keep_the_top_categories_per_city() {
        let mut rows = Vec::new();
        for (index, name) in ["A", "B", "C", "D", "E", "F", "G", "H", "I"]
            .iter()
            .enumerate()
        {
            rows.push(row(2022, 1, name, "Prishtinë", 100.0 - index as f64));
        }
        let outputs = build_outputs(&rows, "2026-01-01T00:00:00Z").unwrap();
        let rankings = &outputs.city_category_yearly.records;
        assert_eq!(rankings.len(), 8);
        assert_eq!(rankings[0].category, "A");
        assert_eq!(rankings[0].rank, 1);
        assert_eq!(rankings[7].category, "H");
        assert_eq!(rankings[7].rank, 8);
        assert!(rankings.iter().all(|entry| entry.category != "I"));

        let rank_field = outputs
            .city_category_yearly
            .meta
            .fields
            .iter()
            .find(|field| field.key == "rank")
            .unwrap();
        assert_eq!(rank_field.label, "Renditja");
    }

    #[test]
    fn ranking_ties_break_on_the_category_name() {
        let rows = vec![
            row(2022, 1, "Zdrukthëtaria", "Pejë", 500.0),
            row(2022, 1, "Bujqësia", "Pejë", 500.0),
        ];
        let outputs = build_outputs(&rows, "2026-01-01T00:00:00Z").unwrap();
        let rankings = &outputs.city_category_yearly.records;
        assert_eq!(rankings[0].category, "Bujqësia");
        assert_eq!(rankings[1].category, "Zdrukthëtaria");
    }

    #[test]
    fn monthly_covers_only_the_latest_year() {
        let rows = vec![
            row(2021, 12, "Tregtia", "Prishtinë", 80.0),
            row(2022, 1, "Tregtia", "Prishtinë", 100.0),
            row(2022, 3, "Tregtia", "Prishtinë", 200.0),
        ];
        let outputs = build_outputs(&rows, "2026-01-01T00:00:00Z").unwrap();
        let monthly = &outputs.city_category_monthly;
        assert_eq!(monthly.records.len(), 2);
        assert_eq!(monthly.records[0].period, "2022-01");
        assert_eq!(monthly.records[1].period, "2022-03");
        assert_eq!(monthly.meta.time.count, 2);

        let extras = monthly.meta.extras.as_ref().unwrap();
        assert_eq!(extras["coverage_year"], serde_json::Value::from(2022));
        assert_eq!(extras["currency"], serde_json::Value::from("EUR"));
    }

    #[test]
    fn no_rows_is_an_error() {
        let result = build_outputs(&[], "2026-01-01T00:00:00Z");
        assert!(matches!(result, Err(CoreError::EmptyTurnover)));
    }

    #[test]
    fn discovery_filters_on_the_filename() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Turnover_2021.xlsx"), b"x").unwrap();
        fs::write(dir.path().join("notes.xlsx"), b"x").unwrap();
        fs::write(dir.path().join("turnover.csv"), b"x").unwrap();
        let nested = dir.path().join("2022");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("turnover_q1.xlsx"), b"x").unwrap();

        let files = discover_workbooks(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // Full paths sort component-wise, so the nested file comes first.
        assert_eq!(names, vec!["turnover_q1.xlsx", "Turnover_2021.xlsx"]);
    }
}
