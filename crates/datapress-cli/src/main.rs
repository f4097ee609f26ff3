//! datapress command-line entry point.

use clap::{ColorChoice, Parser};
use datapress_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use datapress_cli::commands::{
    run_datasets, run_drug_prices, run_faq, run_loan_interest, run_turnover,
};
use datapress_cli::logging::{LogConfig, LogFormat, init_logging};
use datapress_cli::summary::print_summary;
use datapress_cli::types::RunOutcome;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match cli.command {
        Command::DrugPrices(args) => RunOutcome::from_result("drug-prices", run_drug_prices(&args)),
        Command::LoanInterest(args) => {
            RunOutcome::from_result("loan-interest", run_loan_interest(&args))
        }
        Command::Turnover(args) => RunOutcome::from_result("turnover", run_turnover(&args)),
        Command::Faq(args) => RunOutcome::from_result("faq", run_faq(&args)),
        Command::Datasets(args) => run_datasets(&args),
    };
    print_summary(&outcome);
    std::process::exit(if outcome.has_errors() { 1 } else { 0 });
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
