use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete supplementary dataset file: the meta block plus its
/// records, serialized as `{"meta": ..., "records": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset<T> {
    pub meta: DatasetMeta,
    pub records: Vec<T>,
}

/// The `meta` block attached to supplementary dataset outputs. One shape
/// serves every dataset; optional sections stay out of the JSON when a
/// dataset does not use them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub id: String,
    pub title: String,
    pub generated_at: String,
    /// Source-data freshness marker. Always serialized; `null` when the
    /// source does not carry an update date.
    pub updated_at: Option<String>,
    pub source: String,
    pub source_urls: Vec<String>,
    pub time: TimeAxis,
    pub fields: Vec<FieldSpec>,
    pub metrics: Vec<String>,
    pub dimensions: BTreeMap<String, Vec<DimensionOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_hierarchies: Option<BTreeMap<String, Vec<HierarchyNode>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeAxis {
    pub key: String,
    pub granularity: String,
    pub first: Option<String>,
    pub last: Option<String>,
    pub count: usize,
}

impl TimeAxis {
    /// Axis over an ascending list of period keys (`YYYY` or `YYYY-MM`).
    pub fn from_periods(granularity: &str, periods: &[String]) -> Self {
        TimeAxis {
            key: "period".to_string(),
            granularity: granularity.to_string(),
            first: periods.first().cloned(),
            last: periods.last().cloned(),
            count: periods.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionOption {
    pub key: String,
    pub label: String,
}

/// One node of a dimension hierarchy. `parent` is `null` for roots and is
/// always serialized so consumers can walk upward without key checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub key: String,
    pub label: String,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub level: usize,
}
