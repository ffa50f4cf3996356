use tracing::{info, warn};

use super::carriers::Carrier;
use super::dates::Calendar;
use super::types::DeliveryRecord;
use crate::mail::RawEmail;

/// Email that matched no carrier rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEmail {
    pub sender: String,
    pub subject: String,
}

/// Result of routing one fetched batch through the carrier extractors
#[derive(Debug, Default)]
pub struct Batch {
    /// One record per matched email, in fetch order
    pub records: Vec<DeliveryRecord>,
    pub skipped: Vec<SkippedEmail>,
}

/// Route every email to the extractor of the first matching carrier.
/// Unmatched emails are logged and reported in `Batch::skipped`.
pub fn dispatch(emails: &[RawEmail], calendar: &Calendar) -> Batch {
    let mut batch = Batch::default();

    for email in emails {
        let email_date = calendar.email_date(email.received, &email.date_header);

        let Some(carrier) = Carrier::classify(&email.sender, &email.subject) else {
            warn!(
                from = %email.sender,
                subject = %email.subject,
                "no matching delivery service"
            );
            batch.skipped.push(SkippedEmail {
                sender: email.sender.clone(),
                subject: email.subject.clone(),
            });
            continue;
        };

        info!(
            from = %email.sender,
            subject = %email.subject,
            date = %email_date,
            service = %carrier.service(),
            "processing delivery"
        );

        let record = carrier.extract(&email.subject, &email.body, &email_date, calendar);
        batch.records.push(record);
    }

    batch
}
