use serde::Serialize;

/// One monthly observation of one loan interest-rate series.
///
/// `value` stays `null` when the source cell held unparseable text, so
/// gaps remain visible to consumers instead of silently vanishing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanRecord {
    pub period: String,
    pub code: String,
    pub value: Option<f64>,
}
