//! Shipment notification pipeline: dispatch emails to carrier extractors,
//! merge records describing the same parcel and order them by date.

pub mod carriers;
pub mod dates;
pub mod dispatch;
pub mod locate;
pub mod merge;
pub mod output;
pub mod types;

use std::cmp::Reverse;

use tracing::info;

pub use carriers::Carrier;
pub use dates::{normalize_date, resolve_sort_date, Calendar};
pub use dispatch::{dispatch, Batch, SkippedEmail};
pub use locate::extract_between;
pub use merge::merge_duplicates;
pub use output::{read_deliveries, write_deliveries};
pub use types::{DeliveryRecord, Service};

use crate::mail::RawEmail;

/// Outcome of one run over a batch of emails
#[derive(Debug, Default)]
pub struct Report {
    /// Merged records, most recent delivery first
    pub deliveries: Vec<DeliveryRecord>,
    pub skipped: Vec<SkippedEmail>,
}

/// Run the whole pipeline over one fetched batch
pub fn check_deliveries(emails: &[RawEmail], calendar: &Calendar) -> Report {
    let Batch { records, skipped } = dispatch(emails, calendar);
    let extracted = records.len();

    let mut deliveries = merge_duplicates(records);
    sort_deliveries(&mut deliveries, calendar);

    info!(
        emails = emails.len(),
        extracted,
        merged = deliveries.len(),
        skipped = skipped.len(),
        "deliveries checked"
    );

    Report {
        deliveries,
        skipped,
    }
}

/// Order by resolved date, newest first. Ties fall back to the receipt time
/// (newest first); records without any resolvable date go last. The sort is
/// stable, so remaining ties keep their input order.
pub fn sort_deliveries(records: &mut [DeliveryRecord], calendar: &Calendar) {
    records.sort_by_cached_key(|record| {
        (
            Reverse(resolve_sort_date(record, calendar)),
            Reverse(record.email_date.clone()),
        )
    });
}
