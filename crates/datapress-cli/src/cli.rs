//! CLI argument definitions for the datapress pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

/// Default filename pattern for drug-price snapshot workbooks.
pub const DRUG_PRICE_PATTERN: &str = "drug-prices-*.xlsx";

#[derive(Parser)]
#[command(
    name = "datapress",
    version,
    about = "Build versioned JSON datasets from Kosovo open-data sources",
    long_about = "Build versioned JSON datasets from Kosovo open-data sources.\n\n\
                  Reconciles ministry drug-price registry snapshots, extracts the\n\
                  central-bank loan interest series and tax-administration turnover\n\
                  summaries from Excel exports, and scrapes the public FAQ listing."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile drug-price registry snapshots into one versioned dataset.
    DrugPrices(DrugPricesArgs),

    /// Extract the monthly loan interest-rate series from the central-bank workbook.
    LoanInterest(LoanInterestArgs),

    /// Summarize turnover workbooks by category, municipality and month.
    Turnover(TurnoverArgs),

    /// Scrape the tax administration's FAQ listing.
    Faq(FaqArgs),

    /// Run every dataset builder with the standard directory layout.
    Datasets(DatasetsArgs),
}

#[derive(Parser)]
pub struct DrugPricesArgs {
    /// Directory holding the snapshot workbooks.
    #[arg(long = "source", value_name = "DIR", default_value = "raw_data")]
    pub source: PathBuf,

    /// Filename pattern selecting snapshot workbooks.
    #[arg(
        long = "pattern",
        value_name = "GLOB",
        default_value = DRUG_PRICE_PATTERN
    )]
    pub pattern: String,

    /// Directory for records.json and versions.json.
    #[arg(
        long = "output-dir",
        value_name = "DIR",
        default_value = "data/mh/drug_prices"
    )]
    pub output_dir: PathBuf,
}

#[derive(Parser)]
pub struct LoanInterestArgs {
    /// Central-bank workbook carrying the loan interest sheet.
    #[arg(
        long = "source",
        value_name = "FILE",
        default_value = "raw_data/loans_interest.xlsm"
    )]
    pub source: PathBuf,

    /// Output JSON file.
    #[arg(
        long = "output",
        value_name = "FILE",
        default_value = "data/cbk/loan_interests.json"
    )]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct TurnoverArgs {
    /// Directory scanned recursively for turnover workbooks.
    #[arg(long = "source", value_name = "DIR", default_value = "raw_data")]
    pub source: PathBuf,

    /// Directory for the four turnover dataset files.
    #[arg(
        long = "output-dir",
        value_name = "DIR",
        default_value = "data/mfk/turnover"
    )]
    pub output_dir: PathBuf,
}

#[derive(Parser)]
pub struct FaqArgs {
    /// Output JSON file.
    #[arg(
        long = "output",
        value_name = "FILE",
        default_value = "data/atk/atk_faq.json"
    )]
    pub output: PathBuf,

    /// First listing page to request.
    #[arg(long = "start-page", value_name = "N", default_value_t = 1)]
    pub start_page: usize,

    /// Number of pages to scrape (default: every reported page).
    #[arg(long = "pages", value_name = "N")]
    pub pages: Option<usize>,

    /// Seconds to wait between page requests.
    #[arg(long = "delay", value_name = "SECONDS", default_value_t = 0.1)]
    pub delay: f64,

    /// Stop after this many consecutive pages with nothing new.
    #[arg(long = "max-empty-pages", value_name = "N", default_value_t = 1)]
    pub max_empty_pages: usize,
}

#[derive(Parser)]
pub struct DatasetsArgs {
    /// Root directory holding the raw source files.
    #[arg(long = "source", value_name = "DIR", default_value = "raw_data")]
    pub source: PathBuf,

    /// Root directory for the generated dataset files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "data")]
    pub output_dir: PathBuf,

    /// Skip the FAQ scrape (the only builder that needs the network).
    #[arg(long = "no-faq")]
    pub no_faq: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn argument_definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn drug_prices_defaults_match_the_standard_layout() {
        let cli = Cli::try_parse_from(["datapress", "drug-prices"]).unwrap();
        let Command::DrugPrices(args) = cli.command else {
            panic!("expected the drug-prices subcommand");
        };
        assert_eq!(args.source, PathBuf::from("raw_data"));
        assert_eq!(args.pattern, DRUG_PRICE_PATTERN);
        assert_eq!(args.output_dir, PathBuf::from("data/mh/drug_prices"));
    }

    #[test]
    fn faq_paging_flags_parse() {
        let cli = Cli::try_parse_from([
            "datapress",
            "faq",
            "--start-page",
            "3",
            "--pages",
            "2",
            "--delay",
            "0",
        ])
        .unwrap();
        let Command::Faq(args) = cli.command else {
            panic!("expected the faq subcommand");
        };
        assert_eq!(args.start_page, 3);
        assert_eq!(args.pages, Some(2));
        assert_eq!(args.delay, 0.0);
        assert_eq!(args.max_empty_pages, 1);
    }
}
