use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::deliveries::dates::{normalize_date, Calendar};
use crate::deliveries::locate::{extract_between, field_between};
use crate::deliveries::types::{DeliveryRecord, Service};

const ORDER_NUMBER_MARKER: &str = "Bestellnummer:";
const TRACKING_MARKER: &str = "Paketverfolgungsnummern:";
const TOTAL_MARKER: &str = "Gesamtbetrag der Bestellung:";
const ITEMS_START: &str = "Bestellübersicht";
const ITEMS_END: &str = "Verkauft von";

/// Longer item names are cut to this many characters, "..." included
const MAX_ITEM_LENGTH: usize = 45;

static DELIVERY_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Zustellung[:\s]+(?:am\s)?(\w+,\s\d+\s\w+|\d+\s\w+|\w+)").expect("valid regex")
});

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\r]+").expect("valid regex"));

pub(super) fn extract(body: &str, email_date: &str, calendar: &Calendar) -> DeliveryRecord {
    let tracking_number = field_between(body, TRACKING_MARKER, "\n")
        .map(|t| t.trim_end_matches('.').to_string())
        .filter(|t| !t.is_empty());

    let delivery_date = DELIVERY_DATE
        .captures(body)
        .and_then(|caps| normalize_date(caps[1].trim(), calendar));

    let record = DeliveryRecord {
        service: Service::Amazon,
        order_number: field_between(body, ORDER_NUMBER_MARKER, "\n"),
        tracking_number,
        total_amount: field_between(body, TOTAL_MARKER, "\n"),
        delivery_date,
        items: item_list(body),
        email_date: email_date.to_string(),
    };

    debug!(
        order = ?record.order_number,
        tracking = ?record.tracking_number,
        total = ?record.total_amount,
        delivery = ?record.delivery_date,
        items = ?record.items,
        "amazon fields"
    );

    record
}

/// Items listed between the order overview and the seller line, one per line
fn item_list(body: &str) -> Option<String> {
    let section = extract_between(body, ITEMS_START, ITEMS_END);
    let items: Vec<String> = LINE_BREAKS
        .split(section.trim())
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(truncate_item)
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items.join("; "))
    }
}

fn truncate_item(item: &str) -> String {
    if item.chars().count() > MAX_ITEM_LENGTH {
        let mut truncated: String = item.chars().take(MAX_ITEM_LENGTH - 3).collect();
        truncated.push_str("...");
        truncated
    } else {
        item.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const BODY: &str = "Hallo Max,\r\n\
        \r\n\
        Ihr Paket ist unterwegs.\r\n\
        \r\n\
        Zustellung: Morgen\r\n\
        \r\n\
        Bestellnummer: 302-1234567-7654321\r\n\
        Paketverfolgungsnummern: JJD000390012345678.\r\n\
        \r\n\
        Bestellübersicht\r\n\
        Anker PowerCore 10000 Powerbank mit extra langem Kabel und Tasche\r\n\
        \r\n\
        Kugelschreiber, blau, 10er Pack\r\n\
        Verkauft von Amazon EU S.a r.l.\r\n\
        \r\n\
        Gesamtbetrag der Bestellung: EUR 42,99\r\n";

    fn calendar() -> Calendar {
        Calendar::new(
            chrono_tz::Europe::Berlin,
            NaiveDate::from_ymd_opt(2024, 9, 10).unwrap(),
        )
    }

    #[test]
    fn test_extract_full_confirmation() {
        let record = extract(BODY, "2024-09-10 08:15", &calendar());
        assert_eq!(record.service, Service::Amazon);
        assert_eq!(record.order_number.as_deref(), Some("302-1234567-7654321"));
        assert_eq!(record.tracking_number.as_deref(), Some("JJD000390012345678"));
        assert_eq!(record.total_amount.as_deref(), Some("EUR 42,99"));
        assert_eq!(
            record.delivery_date.as_deref(),
            Some("Mittwoch, 11. September")
        );
        assert_eq!(
            record.items.as_deref(),
            Some("Anker PowerCore 10000 Powerbank mit extra ...; Kugelschreiber, blau, 10er Pack")
        );
        assert_eq!(record.email_date, "2024-09-10 08:15");
    }

    #[test]
    fn test_delivery_date_with_weekday_and_month() {
        let body = "Zustellung: Mittwoch, 4 September\nBestellnummer: 1\n";
        let record = extract(body, "2024-09-02 10:00", &calendar());
        assert_eq!(
            record.delivery_date.as_deref(),
            Some("Mittwoch, 4. September")
        );
    }

    #[test]
    fn test_delivery_date_with_am() {
        let body = "Voraussichtliche Zustellung am 6 September\n";
        let record = extract(body, "2024-09-02 10:00", &calendar());
        assert_eq!(
            record.delivery_date.as_deref(),
            Some("Freitag, 6. September")
        );
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let record = extract("Vielen Dank für Ihre Bestellung.", "2024-09-02 10:00", &calendar());
        assert_eq!(record.service, Service::Amazon);
        assert_eq!(record.order_number, None);
        assert_eq!(record.tracking_number, None);
        assert_eq!(record.total_amount, None);
        assert_eq!(record.delivery_date, None);
        assert_eq!(record.items, None);
    }

    #[test]
    fn test_tracking_number_of_only_dots_is_absent() {
        let record = extract("Paketverfolgungsnummern: ..\n", "", &calendar());
        assert_eq!(record.tracking_number, None);
    }

    #[test]
    fn test_truncate_item_counts_characters() {
        assert_eq!(truncate_item("short"), "short");
        let exact = "a".repeat(MAX_ITEM_LENGTH);
        assert_eq!(truncate_item(&exact), exact);
        let umlauts = "ä".repeat(50);
        let truncated = truncate_item(&umlauts);
        assert_eq!(truncated.chars().count(), MAX_ITEM_LENGTH);
        assert!(truncated.ends_with("..."));
    }
}
