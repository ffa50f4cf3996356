use serde::{Deserialize, Serialize};
use std::fmt;

/// Carrier a delivery record was extracted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    Amazon,
    #[serde(rename = "DHL")]
    Dhl,
    #[serde(rename = "DPD")]
    Dpd,
}

impl Service {
    pub fn as_str(self) -> &'static str {
        match self {
            Service::Amazon => "Amazon",
            Service::Dhl => "DHL",
            Service::Dpd => "DPD",
        }
    }

    /// Output strings used for fields that could not be extracted
    fn sentinels(self) -> Sentinels {
        match self {
            Service::Amazon => Sentinels {
                order_number: "Unknown",
                tracking_number: "N/A",
                items: "No items found",
            },
            Service::Dhl => Sentinels {
                order_number: "N/A",
                tracking_number: "Unknown",
                // DHL always fills items, defaulting to "DHL Shipment"
                items: "",
            },
            Service::Dpd => Sentinels {
                order_number: "N/A",
                tracking_number: "Unknown",
                items: "Unknown Sender",
            },
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Sentinels {
    order_number: &'static str,
    tracking_number: &'static str,
    items: &'static str,
}

const TOTAL_AMOUNT_SENTINEL: &str = "N/A";
const DELIVERY_DATE_SENTINEL: &str = "Unknown";

/// One shipment notification, or several merged ones.
///
/// Fields that could not be extracted are `None`. They are rendered as the
/// carrier's sentinel strings ("Unknown", "N/A", ...) only when serialized, and
/// mapped back to `None` when an artifact is read again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "DeliveryRow", from = "DeliveryRow")]
pub struct DeliveryRecord {
    pub service: Service,
    pub order_number: Option<String>,
    /// Merge key
    pub tracking_number: Option<String>,
    /// Currency text as printed in the mail, never parsed
    pub total_amount: Option<String>,
    /// Normalized label, e.g. "Mittwoch, 4. September"
    pub delivery_date: Option<String>,
    pub items: Option<String>,
    /// Receipt time as `YYYY-MM-DD HH:MM` in the target timezone
    pub email_date: String,
}

impl DeliveryRecord {
    /// Record with every extractable field absent
    pub fn empty(service: Service, email_date: &str) -> Self {
        Self {
            service,
            order_number: None,
            tracking_number: None,
            total_amount: None,
            delivery_date: None,
            items: None,
            email_date: email_date.to_string(),
        }
    }
}

/// Flat on-disk shape of a record: every field is a string
#[derive(Debug, Serialize, Deserialize)]
struct DeliveryRow {
    service: Service,
    order_number: String,
    tracking_number: String,
    total_amount: String,
    delivery_date: String,
    items: String,
    email_date: String,
}

fn render(value: Option<String>, sentinel: &str) -> String {
    value.unwrap_or_else(|| sentinel.to_string())
}

fn present(value: String, sentinel: &str) -> Option<String> {
    if value.is_empty() || value == sentinel {
        None
    } else {
        Some(value)
    }
}

impl From<DeliveryRecord> for DeliveryRow {
    fn from(record: DeliveryRecord) -> Self {
        let sentinels = record.service.sentinels();
        Self {
            service: record.service,
            order_number: render(record.order_number, sentinels.order_number),
            tracking_number: render(record.tracking_number, sentinels.tracking_number),
            total_amount: render(record.total_amount, TOTAL_AMOUNT_SENTINEL),
            delivery_date: render(record.delivery_date, DELIVERY_DATE_SENTINEL),
            items: render(record.items, sentinels.items),
            email_date: record.email_date,
        }
    }
}

impl From<DeliveryRow> for DeliveryRecord {
    fn from(row: DeliveryRow) -> Self {
        let sentinels = row.service.sentinels();
        Self {
            service: row.service,
            order_number: present(row.order_number, sentinels.order_number),
            tracking_number: present(row.tracking_number, sentinels.tracking_number),
            total_amount: present(row.total_amount, TOTAL_AMOUNT_SENTINEL),
            delivery_date: present(row.delivery_date, DELIVERY_DATE_SENTINEL),
            items: present(row.items, sentinels.items),
            email_date: row.email_date,
        }
    }
}
