//! Shared data model for the datapress datasets: the snapshot version
//! type, the drug-price record family, and the metadata envelope used by
//! the supplementary dataset outputs.

pub mod drug_prices;
pub mod loans;
pub mod meta;
pub mod turnover;
pub mod version;

pub use drug_prices::{
    AggregationKey, DedupKey, DescriptorSet, DrugPriceEntry, DrugRecord, PriceSnapshot,
    SnapshotSummary,
};
pub use loans::LoanRecord;
pub use meta::{Dataset, DatasetMeta, DimensionOption, FieldSpec, HierarchyNode, TimeAxis};
pub use turnover::{CategoryYearRow, CityYearRow, MonthlyRow, RankingRow};
pub use version::{Version, VersionError};
