use crate::version::Version;
use serde::Serialize;
use std::collections::BTreeMap;

/// One normalized row from one snapshot of the drug-price export.
///
/// Every source column maps to a named optional field; a field is `None`
/// whenever the cell was empty or failed normalization. The record carries
/// the version of the snapshot it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugRecord {
    pub version: Version,
    pub serial_number: Option<i64>,
    pub product_name: Option<String>,
    pub active_substance: Option<String>,
    pub atc_code: Option<String>,
    pub dose: Option<String>,
    pub pharmaceutical_form: Option<String>,
    pub packaging: Option<String>,
    pub marketing_authorisation_holder: Option<String>,
    pub manufacturer: Option<String>,
    pub authorization_number: Option<String>,
    pub price_wholesale: Option<f64>,
    pub price_with_margin: Option<f64>,
    pub price_retail: Option<f64>,
    pub valid_until: Option<String>,
    pub reference_prices: BTreeMap<String, f64>,
    pub reference_prices_secondary: BTreeMap<String, f64>,
}

impl DrugRecord {
    /// An empty record for the given snapshot version.
    pub fn new(version: Version) -> Self {
        DrugRecord {
            version,
            serial_number: None,
            product_name: None,
            active_substance: None,
            atc_code: None,
            dose: None,
            pharmaceutical_form: None,
            packaging: None,
            marketing_authorisation_holder: None,
            manufacturer: None,
            authorization_number: None,
            price_wholesale: None,
            price_with_margin: None,
            price_retail: None,
            valid_until: None,
            reference_prices: BTreeMap::new(),
            reference_prices_secondary: BTreeMap::new(),
        }
    }

    /// The narrow identity tuple used to collapse duplicates within one
    /// snapshot. `None` when any component is missing: such records are
    /// never merged with anything.
    pub fn dedup_key(&self) -> Option<DedupKey> {
        Some(DedupKey {
            atc_code: self.atc_code.clone()?,
            authorization_number: self.authorization_number.clone()?,
            product_name: self.product_name.clone()?,
            dose: self.dose.clone()?,
            packaging: self.packaging.clone()?,
        })
    }

    /// The full descriptor tuple identifying one logical product across
    /// snapshots. Missing fields participate as `None`, so two records
    /// match only when they are missing the same fields.
    pub fn aggregation_key(&self) -> AggregationKey {
        AggregationKey {
            product_name: self.product_name.clone(),
            active_substance: self.active_substance.clone(),
            atc_code: self.atc_code.clone(),
            dose: self.dose.clone(),
            pharmaceutical_form: self.pharmaceutical_form.clone(),
            packaging: self.packaging.clone(),
            marketing_authorisation_holder: self.marketing_authorisation_holder.clone(),
            manufacturer: self.manufacturer.clone(),
            authorization_number: self.authorization_number.clone(),
        }
    }

    /// Duplicate-row merge: keep every populated field of `self`, fill the
    /// gaps from `other`. This is the intra-snapshot direction; the
    /// cross-snapshot direction is [`DescriptorSet::absorb_newer`], which
    /// prefers the incoming side instead.
    pub fn fill_missing_from(&mut self, other: DrugRecord) {
        self.serial_number = self.serial_number.or(other.serial_number);
        self.product_name = self.product_name.take().or(other.product_name);
        self.active_substance = self.active_substance.take().or(other.active_substance);
        self.atc_code = self.atc_code.take().or(other.atc_code);
        self.dose = self.dose.take().or(other.dose);
        self.pharmaceutical_form = self.pharmaceutical_form.take().or(other.pharmaceutical_form);
        self.packaging = self.packaging.take().or(other.packaging);
        self.marketing_authorisation_holder = self
            .marketing_authorisation_holder
            .take()
            .or(other.marketing_authorisation_holder);
        self.manufacturer = self.manufacturer.take().or(other.manufacturer);
        self.authorization_number = self
            .authorization_number
            .take()
            .or(other.authorization_number);
        self.price_wholesale = self.price_wholesale.or(other.price_wholesale);
        self.price_with_margin = self.price_with_margin.or(other.price_with_margin);
        self.price_retail = self.price_retail.or(other.price_retail);
        self.valid_until = self.valid_until.take().or(other.valid_until);
        if self.reference_prices.is_empty() {
            self.reference_prices = other.reference_prices;
        }
        if self.reference_prices_secondary.is_empty() {
            self.reference_prices_secondary = other.reference_prices_secondary;
        }
    }
}

/// Identity tuple for intra-snapshot deduplication. All components are
/// guaranteed present; see [`DrugRecord::dedup_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub atc_code: String,
    pub authorization_number: String,
    pub product_name: String,
    pub dose: String,
    pub packaging: String,
}

/// Identity tuple for cross-snapshot aggregation: all descriptor fields,
/// missing values included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregationKey {
    pub product_name: Option<String>,
    pub active_substance: Option<String>,
    pub atc_code: Option<String>,
    pub dose: Option<String>,
    pub pharmaceutical_form: Option<String>,
    pub packaging: Option<String>,
    pub marketing_authorisation_holder: Option<String>,
    pub manufacturer: Option<String>,
    pub authorization_number: Option<String>,
}

/// Running identity fields for one logical product while snapshots fold in.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    pub serial_number: Option<i64>,
    pub product_name: Option<String>,
    pub active_substance: Option<String>,
    pub atc_code: Option<String>,
    pub dose: Option<String>,
    pub pharmaceutical_form: Option<String>,
    pub packaging: Option<String>,
    pub marketing_authorisation_holder: Option<String>,
    pub manufacturer: Option<String>,
    pub authorization_number: Option<String>,
}

impl DescriptorSet {
    pub fn from_record(record: &DrugRecord) -> Self {
        DescriptorSet {
            serial_number: record.serial_number,
            product_name: record.product_name.clone(),
            active_substance: record.active_substance.clone(),
            atc_code: record.atc_code.clone(),
            dose: record.dose.clone(),
            pharmaceutical_form: record.pharmaceutical_form.clone(),
            packaging: record.packaging.clone(),
            marketing_authorisation_holder: record.marketing_authorisation_holder.clone(),
            manufacturer: record.manufacturer.clone(),
            authorization_number: record.authorization_number.clone(),
        }
    }

    /// Version-advance merge: every populated field of `record` overwrites
    /// the running value; gaps keep what an earlier version supplied. The
    /// deliberate mirror image of [`DrugRecord::fill_missing_from`].
    pub fn absorb_newer(&mut self, record: &DrugRecord) {
        if record.serial_number.is_some() {
            self.serial_number = record.serial_number;
        }
        if record.product_name.is_some() {
            self.product_name = record.product_name.clone();
        }
        if record.active_substance.is_some() {
            self.active_substance = record.active_substance.clone();
        }
        if record.atc_code.is_some() {
            self.atc_code = record.atc_code.clone();
        }
        if record.dose.is_some() {
            self.dose = record.dose.clone();
        }
        if record.pharmaceutical_form.is_some() {
            self.pharmaceutical_form = record.pharmaceutical_form.clone();
        }
        if record.packaging.is_some() {
            self.packaging = record.packaging.clone();
        }
        if record.marketing_authorisation_holder.is_some() {
            self.marketing_authorisation_holder = record.marketing_authorisation_holder.clone();
        }
        if record.manufacturer.is_some() {
            self.manufacturer = record.manufacturer.clone();
        }
        if record.authorization_number.is_some() {
            self.authorization_number = record.authorization_number.clone();
        }
    }
}

/// Sparse price snapshot: the version plus whichever price and validity
/// fields the source row populated. Empty fields are absent from the
/// serialized form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_wholesale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_with_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_retail: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub reference_prices: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub reference_prices_secondary: BTreeMap<String, f64>,
}

impl PriceSnapshot {
    pub fn from_record(record: &DrugRecord) -> Self {
        PriceSnapshot {
            version: record.version.clone(),
            price_wholesale: record.price_wholesale,
            price_with_margin: record.price_with_margin,
            price_retail: record.price_retail,
            valid_until: record.valid_until.clone(),
            reference_prices: record.reference_prices.clone(),
            reference_prices_secondary: record.reference_prices_secondary.clone(),
        }
    }
}

/// The reconciled view of one logical product: current descriptor and price
/// fields, the version they came from, and the full per-version history.
#[derive(Debug, Clone, Serialize)]
pub struct DrugPriceEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_substance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atc_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmaceutical_form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_authorisation_holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_wholesale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_with_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_retail: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub reference_prices: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub reference_prices_secondary: BTreeMap<String, f64>,
    pub latest_version: Version,
    pub version_history: Vec<PriceSnapshot>,
}

/// Per-snapshot entry of the versions output: which file produced the
/// snapshot, how many records survived deduplication, and the distinct
/// validity dates seen.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub version: Version,
    pub source_file: String,
    pub record_count: usize,
    pub valid_until_values: Vec<String>,
}
