//! Intra-snapshot deduplication.

use datapress_model::drug_prices::{DedupKey, DrugRecord};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Collapses duplicate rows within one snapshot.
///
/// Rows sharing a complete identity tuple (ATC code, authorization number,
/// product name, dose, packaging) merge into the first occurrence, which
/// keeps its own populated fields and fills gaps from later duplicates.
/// Rows missing any tuple component pass through untouched, so partial
/// rows can never swallow each other. Output order is input order of each
/// surviving row.
pub fn deduplicate(records: Vec<DrugRecord>) -> Vec<DrugRecord> {
    let mut merged: Vec<DrugRecord> = Vec::with_capacity(records.len());
    let mut index: HashMap<DedupKey, usize> = HashMap::new();

    for record in records {
        let Some(key) = record.dedup_key() else {
            merged.push(record);
            continue;
        };
        match index.entry(key) {
            Entry::Occupied(slot) => merged[*slot.get()].fill_missing_from(record),
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(record);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use datapress_model::version::Version;

    fn keyed_record(name: &str) -> DrugRecord {
        let mut r = DrugRecord::new(Version::parse("1").unwrap());
        r.atc_code = Some("N02BE01".into());
        r.authorization_number = Some("MA-100".into());
        r.product_name = Some(name.into());
        r.dose = Some("500 mg".into());
        r.packaging = Some("20 tableta".into());
        r
    }

    #[test]
    fn duplicates_merge_into_first_occurrence() {
        let mut first = keyed_record("Paracetamol");
        first.price_retail = Some(3.5);

        let mut second = keyed_record("Paracetamol");
        second.price_retail = Some(9.9);
        second.manufacturer = Some("Alkaloid".into());

        let merged = deduplicate(vec![first, second]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].price_retail, Some(3.5), "existing value wins");
        assert_eq!(merged[0].manufacturer.as_deref(), Some("Alkaloid"));
    }

    #[test]
    fn incomplete_keys_pass_through_unmerged() {
        let mut a = keyed_record("Ibuprofen");
        a.dose = None;
        let mut b = keyed_record("Ibuprofen");
        b.dose = None;

        let merged = deduplicate(vec![a, b]);
        assert_eq!(merged.len(), 2, "rows with partial identity never merge");
    }

    #[test]
    fn missing_authorization_numbers_disable_deduplication() {
        let mut a = keyed_record("Ibuprofen");
        a.authorization_number = None;
        let mut b = keyed_record("Ibuprofen");
        b.authorization_number = None;

        let merged = deduplicate(vec![a, b]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn surviving_rows_keep_their_positions() {
        let first = keyed_record("Alpha");
        let second = keyed_record("Beta");
        let third = keyed_record("Alpha");

        let merged = deduplicate(vec![first, second, third]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].product_name.as_deref(), Some("Alpha"));
        assert_eq!(merged[1].product_name.as_deref(), Some("Beta"));
    }

    #[test]
    fn distinct_keys_never_merge() {
        let mut a = keyed_record("Paracetamol");
        a.packaging = Some("10 tableta".into());
        let b = keyed_record("Paracetamol");

        let merged = deduplicate(vec![a, b]);
        assert_eq!(merged.len(), 2);
    }
}
