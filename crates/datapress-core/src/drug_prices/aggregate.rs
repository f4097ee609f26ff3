//! Cross-snapshot aggregation.

use datapress_model::drug_prices::{
    AggregationKey, DescriptorSet, DrugPriceEntry, DrugRecord, PriceSnapshot,
};
use datapress_model::version::Version;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Running state for one logical product while records fold in.
struct Bucket {
    descriptors: DescriptorSet,
    latest_version: Version,
    latest_snapshot: PriceSnapshot,
    history: Vec<PriceSnapshot>,
}

impl Bucket {
    fn open(record: &DrugRecord) -> Self {
        let snapshot = PriceSnapshot::from_record(record);
        Bucket {
            descriptors: DescriptorSet::from_record(record),
            latest_version: record.version.clone(),
            latest_snapshot: snapshot.clone(),
            history: vec![snapshot],
        }
    }

    /// Folds one more record in. Every record extends the history; only
    /// records at or past the current latest version may update the
    /// descriptor fields and the flattened price snapshot. On a version
    /// tie the later arrival wins.
    fn fold(&mut self, record: &DrugRecord) {
        let snapshot = PriceSnapshot::from_record(record);
        self.history.push(snapshot.clone());
        if record.version >= self.latest_version {
            self.latest_version = record.version.clone();
            self.descriptors.absorb_newer(record);
            self.latest_snapshot = snapshot;
        }
    }

    fn into_entry(mut self) -> DrugPriceEntry {
        self.history.sort_by(|a, b| b.version.cmp(&a.version));
        let Bucket {
            descriptors,
            latest_version,
            latest_snapshot,
            history,
        } = self;
        DrugPriceEntry {
            serial_number: descriptors.serial_number,
            product_name: descriptors.product_name,
            active_substance: descriptors.active_substance,
            atc_code: descriptors.atc_code,
            dose: descriptors.dose,
            pharmaceutical_form: descriptors.pharmaceutical_form,
            packaging: descriptors.packaging,
            marketing_authorisation_holder: descriptors.marketing_authorisation_holder,
            manufacturer: descriptors.manufacturer,
            authorization_number: descriptors.authorization_number,
            price_wholesale: latest_snapshot.price_wholesale,
            price_with_margin: latest_snapshot.price_with_margin,
            price_retail: latest_snapshot.price_retail,
            valid_until: latest_snapshot.valid_until,
            reference_prices: latest_snapshot.reference_prices,
            reference_prices_secondary: latest_snapshot.reference_prices_secondary,
            latest_version,
            version_history: history,
        }
    }
}

/// Folds records from all snapshots into one entry per logical product.
///
/// Records group by the full descriptor tuple, missing fields included, so
/// two records match only when they are missing the same fields. Price
/// fields flatten from the latest snapshot alone: a price present in an
/// older version but absent from the latest stays out of the flattened
/// view and survives only in the history. Entries come out sorted by
/// product name then packaging, with missing values ordering as empty
/// strings; history is sorted newest first, ties keeping arrival order.
pub fn aggregate(records: &[DrugRecord]) -> Vec<DrugPriceEntry> {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<AggregationKey, usize> = HashMap::new();

    for record in records {
        match index.entry(record.aggregation_key()) {
            Entry::Occupied(slot) => buckets[*slot.get()].fold(record),
            Entry::Vacant(slot) => {
                slot.insert(buckets.len());
                buckets.push(Bucket::open(record));
            }
        }
    }

    let mut entries: Vec<DrugPriceEntry> = buckets.into_iter().map(Bucket::into_entry).collect();
    entries.sort_by(|a, b| {
        let a_key = (
            a.product_name.as_deref().unwrap_or(""),
            a.packaging.as_deref().unwrap_or(""),
        );
        let b_key = (
            b.product_name.as_deref().unwrap_or(""),
            b.packaging.as_deref().unwrap_or(""),
        );
        a_key.cmp(&b_key)
    });
    entries
}
