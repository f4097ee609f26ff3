use datapress_ingest::IngestError;
use datapress_model::version::VersionError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while building datasets from source workbooks.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("failed to extract a version from filename: {}", path.display())]
    VersionMissing { path: PathBuf },

    #[error("invalid version in filename {}: {source}", path.display())]
    VersionInvalid {
        path: PathBuf,
        #[source]
        source: VersionError,
    },

    #[error("no visible headers found in {}", path.display())]
    NoVisibleHeaders { path: PathBuf },

    #[error("header row missing in {}: sheet has {rows} rows", path.display())]
    HeaderRowMissing { path: PathBuf, rows: usize },

    #[error("header rows 4 and 5 missing in sheet {sheet} of {}", path.display())]
    LoanHeadersMissing { path: PathBuf, sheet: String },

    #[error("no header row with year and month labels in {}", path.display())]
    TurnoverHeaderMissing { path: PathBuf },

    #[error("no turnover workbooks found under {}", dir.display())]
    NoTurnoverFiles { dir: PathBuf },

    #[error("no usable turnover rows found in the source workbooks")]
    EmptyTurnover,
}

pub type Result<T> = std::result::Result<T, CoreError>;
