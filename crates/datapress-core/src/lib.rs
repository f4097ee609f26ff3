//! Dataset builders for the datapress pipeline.
//!
//! Each module turns one family of source workbooks into publishable
//! records: [`drug_prices`] reconciles versioned price snapshots,
//! [`loan_interest`] reads the central-bank rate matrix, and
//! [`turnover`] rolls the tax-administration exports into summaries.

pub mod drug_prices;
pub mod error;
pub mod loan_interest;
pub mod turnover;

pub use error::{CoreError, Result};
