use std::path::PathBuf;

use anyhow::Result;

/// Outcome of one dataset build, one row in the run summary table.
#[derive(Debug)]
pub struct DatasetReport {
    pub name: String,
    pub records: usize,
    pub outputs: Vec<PathBuf>,
    pub notes: Vec<String>,
}

/// Everything a run produced. Failed builders land in `errors` without
/// stopping the rest of the run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub reports: Vec<DatasetReport>,
    pub errors: Vec<String>,
}

impl RunOutcome {
    /// Wraps a single builder result, recording a failure under `name`.
    pub fn from_result(name: &str, result: Result<DatasetReport>) -> Self {
        match result {
            Ok(report) => RunOutcome {
                reports: vec![report],
                errors: Vec::new(),
            },
            Err(error) => RunOutcome {
                reports: Vec::new(),
                errors: vec![format!("{name}: {error:#}")],
            },
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
