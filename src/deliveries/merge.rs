use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::types::{DeliveryRecord, Service};

/// Merge records that share a tracking number.
///
/// The first record seen for a tracking number is the base. Later DHL
/// records replace its delivery date; later Amazon records append their
/// items, totals and (distinct) order numbers. Records without a tracking
/// number are never merged. Output keeps first-seen order.
pub fn merge_duplicates(records: Vec<DeliveryRecord>) -> Vec<DeliveryRecord> {
    let mut merged: Vec<DeliveryRecord> = Vec::with_capacity(records.len());
    let mut by_tracking: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(tracking) = record.tracking_number.clone() else {
            merged.push(record);
            continue;
        };

        match by_tracking.entry(tracking) {
            Entry::Occupied(slot) => absorb(&mut merged[*slot.get()], record),
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

fn absorb(existing: &mut DeliveryRecord, update: DeliveryRecord) {
    match update.service {
        // DHL tracking updates carry the fresher ETA
        Service::Dhl => existing.delivery_date = update.delivery_date,
        Service::Amazon => {
            existing.items = join(existing.items.take(), update.items, "; ");
            existing.total_amount = join(existing.total_amount.take(), update.total_amount, " + ");
            existing.order_number = match (existing.order_number.take(), update.order_number) {
                (Some(a), Some(b)) if a != b => Some(format!("{a}; {b}")),
                (current, None) => current,
                (_, new) => new,
            };
        }
        Service::Dpd => {}
    }
}

fn join(existing: Option<String>, new: Option<String>, separator: &str) -> Option<String> {
    match (existing, new) {
        (Some(a), Some(b)) => Some(format!("{a}{separator}{b}")),
        (current, None) => current,
        (None, new) => new,
    }
}
