use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::deliveries::dates::{normalize_date, Calendar};
use crate::deliveries::locate::field_between;
use crate::deliveries::types::{DeliveryRecord, Service};

const DEFAULT_DESCRIPTION: &str = "DHL Shipment";

/// DHL tracking numbers are 10 to 20 digits
static BOUNDED_TRACKING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{10,20}\b").expect("valid regex"));

static LOOSE_TRACKING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{10,}").expect("valid regex"));

/// "am Mittwoch, den 04.09."
static DELIVERY_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"am\s\w+, den (\d{2})\.(\d{2})\.").expect("valid regex"));

pub(super) fn extract(
    subject: &str,
    body: &str,
    email_date: &str,
    calendar: &Calendar,
) -> DeliveryRecord {
    let tracking_number = BOUNDED_TRACKING
        .find(body)
        .or_else(|| LOOSE_TRACKING.find(body))
        .map(|m| m.as_str().to_string());

    let delivery_date = DELIVERY_DATE
        .captures(body)
        .and_then(|caps| normalize_date(&format!("{}-{}", &caps[1], &caps[2]), calendar));

    // "Ihre <sender> Sendung ist unterwegs"
    let description = field_between(subject, "Ihre ", " Sendung ist unterwegs")
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    debug!(
        tracking = ?tracking_number,
        delivery = ?delivery_date,
        sender = %description,
        "dhl fields"
    );

    DeliveryRecord {
        tracking_number,
        delivery_date,
        items: Some(description),
        ..DeliveryRecord::empty(Service::Dhl, email_date)
    }
}
