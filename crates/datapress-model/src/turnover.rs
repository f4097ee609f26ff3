//! Record rows of the turnover outputs. Field order mirrors the emitted
//! JSON for each file.

use serde::Serialize;

/// Yearly turnover and taxpayer totals for one business category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryYearRow {
    pub period: String,
    pub category: String,
    pub turnover: f64,
    pub taxpayers: i64,
}

/// Yearly totals for one municipality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityYearRow {
    pub period: String,
    pub city: String,
    pub turnover: f64,
    pub taxpayers: i64,
}

/// One slot of a per-municipality category ranking, `rank` starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub period: String,
    pub city: String,
    pub category: String,
    pub turnover: f64,
    pub taxpayers: i64,
    pub rank: usize,
}

/// Monthly totals for one category within one municipality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub period: String,
    pub category: String,
    pub city: String,
    pub turnover: f64,
    pub taxpayers: i64,
}
