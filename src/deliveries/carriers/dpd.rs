use chrono::Days;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::deliveries::dates::{padded_date_label, parse_email_date};
use crate::deliveries::types::{DeliveryRecord, Service};

/// Sender name sits in the element after the "Versender & Paketnummer"
/// label, followed by the parcel number.
static SENDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Versender\s&\sPaketnummer.*?>([\w\s/.,-]+)<.*?(\d{10,20})").expect("valid regex")
});

static TRACKING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{10,20}").expect("valid regex"));

/// "in 1-2 Werktagen" or "in 3 Werktagen"
static DELIVERY_WINDOW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"in\s(\d+)(?:-(\d+))?\sWerktagen").expect("valid regex"));

/// DPD mails are HTML only; entities are decoded before matching.
pub(super) fn extract(body: &str, email_date: &str) -> DeliveryRecord {
    let decoded = html_escape::decode_html_entities(body);

    let sender = SENDER
        .captures(&decoded)
        .map(|caps| caps[1].trim().to_string())
        .filter(|s| !s.is_empty());

    let tracking_number = TRACKING.find(&decoded).map(|m| m.as_str().to_string());
    let delivery_date = estimated_delivery(&decoded, email_date);

    debug!(
        sender = ?sender,
        tracking = ?tracking_number,
        delivery = ?delivery_date,
        "dpd fields"
    );

    DeliveryRecord {
        tracking_number,
        delivery_date,
        items: sender,
        ..DeliveryRecord::empty(Service::Dpd, email_date)
    }
}

/// Receipt date plus the lower bound of the announced business-day window
fn estimated_delivery(body: &str, email_date: &str) -> Option<String> {
    let caps = DELIVERY_WINDOW.captures(body)?;
    let days: u64 = caps[1].parse().ok()?;
    let received = parse_email_date(email_date)?;
    received
        .date()
        .checked_add_days(Days::new(days))
        .map(padded_date_label)
}
