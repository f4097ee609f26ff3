//! End-to-end tests for the dataset commands: workbook fixtures in, JSON
//! files out.

use std::fs;
use std::path::Path;

use rust_xlsxwriter::Workbook;
use serde_json::Value;
use tempfile::TempDir;

use datapress_cli::cli::{DatasetsArgs, DrugPricesArgs, LoanInterestArgs, TurnoverArgs};
use datapress_cli::commands::{run_datasets, run_drug_prices, run_loan_interest, run_turnover};

struct SnapshotRow<'a> {
    serial: f64,
    product: &'a str,
    atc: &'a str,
    dose: &'a str,
    packaging: &'a str,
    authorization: &'a str,
    retail: f64,
    valid_until: Option<&'a str>,
    croatia: Option<f64>,
}

fn write_snapshot(path: &Path, rows: &[SnapshotRow]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Lista e çmimeve të barnave").unwrap();
    let headers = [
        "Nr rendor",
        "Emri i produktit",
        "ATC Kodi",
        "Doza",
        "Paketimi",
        "Numri i MA/RMA/PMA",
        "ÇMIMI ME PAKICË",
        "Data e validitetit",
        "Kroaci",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(1, col as u16, *header).unwrap();
    }
    for (offset, row) in rows.iter().enumerate() {
        let at = (offset + 2) as u32;
        sheet.write_number(at, 0, row.serial).unwrap();
        sheet.write_string(at, 1, row.product).unwrap();
        sheet.write_string(at, 2, row.atc).unwrap();
        sheet.write_string(at, 3, row.dose).unwrap();
        sheet.write_string(at, 4, row.packaging).unwrap();
        sheet.write_string(at, 5, row.authorization).unwrap();
        sheet.write_number(at, 6, row.retail).unwrap();
        if let Some(date) = row.valid_until {
            sheet.write_string(at, 7, date).unwrap();
        }
        if let Some(value) = row.croatia {
            sheet.write_number(at, 8, value).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

fn write_loan_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("IntRates_Loans").unwrap();
    sheet.write_string(0, 0, "Normat e interesit").unwrap();
    // The 2023 cell carries across both month columns.
    sheet.write_number(3, 3, 2023.0).unwrap();
    sheet.write_string(4, 3, "Jan").unwrap();
    sheet.write_string(4, 4, "Shk").unwrap();
    sheet.write_string(6, 1, "T").unwrap();
    sheet.write_string(6, 2, "GJITHSEJ KREDITË").unwrap();
    sheet.write_number(6, 3, 5.5).unwrap();
    sheet.write_number(6, 4, 6.0).unwrap();
    sheet.write_string(7, 1, "T_1").unwrap();
    sheet.write_string(7, 2, "KREDITË ME AFAT").unwrap();
    sheet.write_number(7, 3, 4.0).unwrap();
    sheet.write_string(8, 1, "0").unwrap();
    sheet.write_string(9, 1, "Shënim: burimi BQK").unwrap();
    workbook.save(path).unwrap();
}

fn write_turnover_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Qarkullimi i tatimpaguesve").unwrap();
    let headers = [
        "Viti",
        "Muaji",
        "Description",
        "Municipality",
        "Turnover",
        "Number of taxpayers",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(1, col as u16, *header).unwrap();
    }
    let rows: [(f64, f64, &str, &str, f64, f64); 5] = [
        (2021.0, 1.0, "Tregti", "prishtinë", 100.0, 10.0),
        (2021.0, 2.0, "Tregti", "prishtinë", 50.25, 5.0),
        (2022.0, 1.0, "Prodhim", "pejë", 200.0, 20.0),
        (2022.0, 1.0, "Tregti", "pejë", 300.0, 30.0),
        (2022.0, 1.0, "Totali", "pejë", 999.0, 99.0),
    ];
    for (offset, (year, month, category, city, turnover, taxpayers)) in rows.iter().enumerate() {
        let at = (offset + 2) as u32;
        sheet.write_number(at, 0, *year).unwrap();
        sheet.write_number(at, 1, *month).unwrap();
        sheet.write_string(at, 2, *category).unwrap();
        sheet.write_string(at, 3, *city).unwrap();
        sheet.write_number(at, 4, *turnover).unwrap();
        sheet.write_number(at, 5, *taxpayers).unwrap();
    }
    workbook.save(path).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn drug_prices_reconcile_across_snapshots() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("raw_data");
    fs::create_dir_all(&source).unwrap();
    write_snapshot(
        &source.join("drug-prices-1.0.xlsx"),
        &[
            SnapshotRow {
                serial: 1.0,
                product: "Paracetamol",
                atc: "N02BE01",
                dose: "500 mg",
                packaging: "30 tableta",
                authorization: "MA-100",
                retail: 2.5,
                valid_until: Some("31.12.2025"),
                croatia: Some(2.1),
            },
            SnapshotRow {
                serial: 2.0,
                product: "Ibuprofen",
                atc: "M01AE01",
                dose: "400 mg",
                packaging: "20 tableta",
                authorization: "MA-200",
                retail: 1.75,
                valid_until: Some("31.12.2025"),
                croatia: None,
            },
        ],
    );
    write_snapshot(
        &source.join("drug-prices-2.0.xlsx"),
        &[SnapshotRow {
            serial: 1.0,
            product: "Paracetamol",
            atc: "N02BE01",
            dose: "500 mg",
            packaging: "30 tableta",
            authorization: "MA-100",
            retail: 3.0,
            valid_until: None,
            croatia: Some(2.25),
        }],
    );

    let output_dir = dir.path().join("data/mh/drug_prices");
    let report = run_drug_prices(&DrugPricesArgs {
        source,
        pattern: "drug-prices-*.xlsx".to_string(),
        output_dir: output_dir.clone(),
    })
    .unwrap();
    assert_eq!(report.records, 2);

    let records = read_json(&output_dir.join("records.json"));
    let versions = read_json(&output_dir.join("versions.json"));
    assert_eq!(records["generated_at"], versions["generated_at"]);

    let entries = records["records"].as_array().unwrap();
    assert_eq!(entries.len(), 2);

    // Entries come out sorted by product name.
    assert_eq!(entries[0]["product_name"], "Ibuprofen");
    assert_eq!(entries[0]["latest_version"], "1.0");
    assert_eq!(entries[0]["price_retail"], 1.75);
    assert_eq!(entries[0]["valid_until"], "2025-12-31");
    assert!(entries[0].get("reference_prices").is_none());

    // The newer snapshot wins the flattened fields wholesale, so the
    // validity date from 1.0 does not leak into the 2.0 view.
    assert_eq!(entries[1]["product_name"], "Paracetamol");
    assert_eq!(entries[1]["latest_version"], "2.0");
    assert_eq!(entries[1]["price_retail"], 3.0);
    assert!(entries[1].get("valid_until").is_none());
    assert_eq!(entries[1]["reference_prices"]["croatia"], 2.25);

    let history = entries[1]["version_history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["version"], "2.0");
    assert_eq!(history[1]["version"], "1.0");
    assert_eq!(history[1]["price_retail"], 2.5);
    assert_eq!(history[1]["valid_until"], "2025-12-31");

    insta::assert_json_snapshot!(versions, {
        ".generated_at" => "[generated_at]",
        ".versions[].source_file" => "[source_file]",
    }, @r#"
    {
      "generated_at": "[generated_at]",
      "versions": [
        {
          "record_count": 2,
          "source_file": "[source_file]",
          "valid_until_values": [
            "2025-12-31"
          ],
          "version": "1.0"
        },
        {
          "record_count": 1,
          "source_file": "[source_file]",
          "valid_until_values": [],
          "version": "2.0"
        }
      ]
    }
    "#);
}

#[test]
fn loan_interest_builds_the_monthly_dataset() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("loans_interest.xlsm");
    write_loan_workbook(&source);
    let output = dir.path().join("data/cbk/loan_interests.json");

    let report = run_loan_interest(&LoanInterestArgs {
        source: source.clone(),
        output: output.clone(),
    })
    .unwrap();
    assert_eq!(report.records, 3);

    let value = read_json(&output);
    assert_eq!(value["meta"]["id"], "cbk_loans_interest_monthly");
    assert_eq!(value["meta"]["updated_at"], "2023-02-01");
    assert_eq!(value["meta"]["time"]["key"], "period");
    assert_eq!(value["meta"]["time"]["count"], 2);
    assert_eq!(value["meta"]["time"]["last"], "2023-02");
    assert_eq!(
        value["meta"]["source_urls"][0],
        source.display().to_string()
    );

    // Records sort by period then code; percentages become fractions.
    let records = value["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["period"], "2023-01");
    assert_eq!(records[0]["code"], "T");
    assert_eq!(records[0]["value"], 0.055);
    assert_eq!(records[1]["code"], "T_1");
    assert_eq!(records[1]["value"], 0.04);
    assert_eq!(records[2]["period"], "2023-02");
    assert_eq!(records[2]["value"], 0.06);

    let hierarchy = value["meta"]["dimension_hierarchies"]["code"]
        .as_array()
        .unwrap();
    assert_eq!(hierarchy.len(), 2);
    assert_eq!(hierarchy[0]["key"], "T");
    assert_eq!(hierarchy[0]["label"], "Gjithsej kreditë");
    assert!(hierarchy[0]["parent"].is_null());
    assert_eq!(hierarchy[0]["children"][0], "T_1");
    assert_eq!(hierarchy[1]["key"], "T_1");
    assert_eq!(hierarchy[1]["parent"], "T");
    assert_eq!(hierarchy[1]["level"], 1);
}

#[test]
fn turnover_writes_all_four_datasets() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("raw_data");
    fs::create_dir_all(&source).unwrap();
    write_turnover_workbook(&source.join("turnover_2022.xlsx"));
    let output_dir = dir.path().join("data/mfk/turnover");

    let report = run_turnover(&TurnoverArgs {
        source,
        output_dir: output_dir.clone(),
    })
    .unwrap();
    assert_eq!(report.outputs.len(), 4);

    let categories = read_json(&output_dir.join("mfk_turnover_categories_yearly.json"));
    let rows = categories["records"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["period"], "2021");
    assert_eq!(rows[0]["category"], "Tregti");
    assert_eq!(rows[0]["turnover"], 150.25);
    assert_eq!(rows[0]["taxpayers"], 15);
    assert_eq!(rows[1]["category"], "Prodhim");
    assert_eq!(rows[2]["turnover"], 300.0);

    let cities = read_json(&output_dir.join("mfk_turnover_cities_yearly.json"));
    let rows = cities["records"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["city"], "Prishtinë");
    assert_eq!(rows[1]["city"], "Pejë");
    assert_eq!(rows[1]["turnover"], 500.0);

    let rankings = read_json(&output_dir.join("mfk_turnover_city_category_yearly.json"));
    let rows = rankings["records"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1]["city"], "Pejë");
    assert_eq!(rows[1]["category"], "Tregti");
    assert_eq!(rows[1]["rank"], 1);
    assert_eq!(rows[2]["category"], "Prodhim");
    assert_eq!(rows[2]["rank"], 2);

    // The monthly dataset only covers the newest year.
    let monthly = read_json(&output_dir.join("mfk_turnover_city_category_monthly.json"));
    let rows = monthly["records"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["period"], "2022-01");
    assert_eq!(rows[0]["category"], "Prodhim");
    assert_eq!(monthly["meta"]["extras"]["coverage_year"], 2022);
    assert_eq!(monthly["meta"]["extras"]["currency"], "EUR");
    assert_eq!(monthly["meta"]["time"]["granularity"], "monthly");
}

#[test]
fn datasets_run_keeps_going_past_failures() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("raw_data");
    fs::create_dir_all(&source).unwrap();
    write_turnover_workbook(&source.join("turnover_2022.xlsx"));
    let output_dir = dir.path().join("data");

    // No drug-price workbooks and no loans workbook. Both builders fail,
    // neither stops the turnover build.
    let outcome = run_datasets(&DatasetsArgs {
        source,
        output_dir: output_dir.clone(),
        no_faq: true,
    });

    assert!(outcome.has_errors());
    assert_eq!(outcome.errors.len(), 2);
    assert!(outcome.errors[0].starts_with("drug-prices:"));
    assert!(outcome.errors[1].starts_with("loan-interest:"));

    let names: Vec<&str> = outcome
        .reports
        .iter()
        .map(|report| report.name.as_str())
        .collect();
    assert_eq!(names, ["turnover"]);

    // A failed builder leaves nothing behind.
    assert!(!output_dir.join("mh").exists());
    assert!(
        output_dir
            .join("mfk/turnover/mfk_turnover_cities_yearly.json")
            .exists()
    );
    assert!(!output_dir.join("atk").exists());
}
