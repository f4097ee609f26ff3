//! Dataset build commands behind the CLI subcommands.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, ensure};
use serde::Serialize;
use tracing::{info, info_span};

use datapress_core::{drug_prices, loan_interest, turnover};
use datapress_model::meta::Dataset;
use datapress_output::{RecordsEnvelope, VersionsEnvelope, timestamp, write_json};
use datapress_scrape::{BASE_URL, FaqEntry, ScrapeOptions, build_client, scrape_all};

use crate::cli::{
    DRUG_PRICE_PATTERN, DatasetsArgs, DrugPricesArgs, FaqArgs, LoanInterestArgs, TurnoverArgs,
};
use crate::types::{DatasetReport, RunOutcome};

/// Per-request timeout for the FAQ scrape.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn run_drug_prices(args: &DrugPricesArgs) -> Result<DatasetReport> {
    let span = info_span!("drug_prices", source = %args.source.display());
    let _guard = span.enter();
    let start = Instant::now();

    let dataset = drug_prices::build_dataset(&args.source, &args.pattern)
        .context("build drug-price dataset")?;
    ensure!(
        !dataset.summaries.is_empty(),
        "no workbooks matching `{}` under {}",
        args.pattern,
        args.source.display()
    );
    let record_count = dataset.entries.len();
    let snapshot_count = dataset.summaries.len();

    let generated_at = timestamp();
    let records_path = args.output_dir.join("records.json");
    let versions_path = args.output_dir.join("versions.json");
    write_json(
        &records_path,
        &RecordsEnvelope {
            generated_at: generated_at.clone(),
            records: dataset.entries,
        },
    )?;
    write_json(
        &versions_path,
        &VersionsEnvelope {
            generated_at,
            versions: dataset.summaries,
        },
    )?;

    info!(
        records = record_count,
        snapshots = snapshot_count,
        duration_ms = start.elapsed().as_millis(),
        "drug-price dataset written"
    );
    Ok(DatasetReport {
        name: "drug-prices".to_string(),
        records: record_count,
        outputs: vec![records_path, versions_path],
        notes: vec![format!("{snapshot_count} snapshots")],
    })
}

pub fn run_loan_interest(args: &LoanInterestArgs) -> Result<DatasetReport> {
    let span = info_span!("loan_interest", source = %args.source.display());
    let _guard = span.enter();
    let start = Instant::now();

    let dataset = loan_interest::build_dataset(&args.source, &timestamp())
        .context("build loan interest dataset")?;
    let record_count = dataset.records.len();
    let period_count = dataset.meta.time.count;
    write_json(&args.output, &dataset)?;

    info!(
        records = record_count,
        periods = period_count,
        duration_ms = start.elapsed().as_millis(),
        "loan interest dataset written"
    );
    Ok(DatasetReport {
        name: "loan-interest".to_string(),
        records: record_count,
        outputs: vec![args.output.clone()],
        notes: vec![format!("{period_count} periods")],
    })
}

pub fn run_turnover(args: &TurnoverArgs) -> Result<DatasetReport> {
    let span = info_span!("turnover", source = %args.source.display());
    let _guard = span.enter();
    let start = Instant::now();

    let outputs =
        turnover::build_datasets(&args.source, &timestamp()).context("build turnover datasets")?;
    let mut written = Vec::new();
    let mut record_count = 0usize;
    record_count += write_dataset(&args.output_dir, &outputs.categories_yearly, &mut written)?;
    record_count += write_dataset(&args.output_dir, &outputs.cities_yearly, &mut written)?;
    record_count += write_dataset(&args.output_dir, &outputs.city_category_yearly, &mut written)?;
    record_count += write_dataset(&args.output_dir, &outputs.city_category_monthly, &mut written)?;

    info!(
        records = record_count,
        files = written.len(),
        duration_ms = start.elapsed().as_millis(),
        "turnover datasets written"
    );
    Ok(DatasetReport {
        name: "turnover".to_string(),
        records: record_count,
        outputs: written,
        notes: vec!["4 datasets".to_string()],
    })
}

/// Writes one dataset into `dir`, named after its meta id.
fn write_dataset<T: Serialize>(
    dir: &Path,
    dataset: &Dataset<T>,
    written: &mut Vec<PathBuf>,
) -> Result<usize> {
    let path = dir.join(format!("{}.json", dataset.meta.id));
    write_json(&path, dataset)?;
    written.push(path);
    Ok(dataset.records.len())
}

pub fn run_faq(args: &FaqArgs) -> Result<DatasetReport> {
    let span = info_span!("faq", output = %args.output.display());
    let _guard = span.enter();
    let start = Instant::now();

    let client = build_client(REQUEST_TIMEOUT).context("build HTTP client")?;
    let options = ScrapeOptions {
        start_page: args.start_page,
        pages: args.pages,
        delay: Duration::from_secs_f64(args.delay.max(0.0)),
        max_empty_pages: args.max_empty_pages,
    };
    let entries = scrape_all(&client, BASE_URL, &options).context("scrape FAQ listing")?;
    let scraped = entries.len();
    let answered: Vec<FaqEntry> = entries.into_iter().filter(FaqEntry::has_answer).collect();
    let dropped = scraped - answered.len();
    write_json(&args.output, &answered)?;

    info!(
        scraped,
        kept = answered.len(),
        dropped,
        duration_ms = start.elapsed().as_millis(),
        "FAQ dataset written"
    );
    Ok(DatasetReport {
        name: "faq".to_string(),
        records: answered.len(),
        outputs: vec![args.output.clone()],
        notes: vec![format!("{dropped} unanswered dropped")],
    })
}

/// Runs every builder against the standard layout, collecting failures
/// instead of stopping at the first one.
pub fn run_datasets(args: &DatasetsArgs) -> RunOutcome {
    let mut outcome = RunOutcome::default();
    collect(
        &mut outcome,
        "drug-prices",
        run_drug_prices(&DrugPricesArgs {
            source: args.source.clone(),
            pattern: DRUG_PRICE_PATTERN.to_string(),
            output_dir: args.output_dir.join("mh/drug_prices"),
        }),
    );
    collect(
        &mut outcome,
        "loan-interest",
        run_loan_interest(&LoanInterestArgs {
            source: args.source.join("loans_interest.xlsm"),
            output: args.output_dir.join("cbk/loan_interests.json"),
        }),
    );
    collect(
        &mut outcome,
        "turnover",
        run_turnover(&TurnoverArgs {
            source: args.source.clone(),
            output_dir: args.output_dir.join("mfk/turnover"),
        }),
    );
    if args.no_faq {
        info!("skipping FAQ scrape");
    } else {
        collect(
            &mut outcome,
            "faq",
            run_faq(&FaqArgs {
                output: args.output_dir.join("atk/atk_faq.json"),
                start_page: 1,
                pages: None,
                delay: 0.1,
                max_empty_pages: 1,
            }),
        );
    }
    outcome
}

fn collect(outcome: &mut RunOutcome, name: &str, result: Result<DatasetReport>) {
    match result {
        Ok(report) => outcome.reports.push(report),
        Err(error) => outcome.errors.push(format!("{name}: {error:#}")),
    }
}
