//! Per-carrier extraction of delivery records from notification emails.
//!
//! Each carrier sends a fixed German template. `Carrier::classify` decides
//! which template an email follows and `Carrier::extract` turns it into a
//! `DeliveryRecord`. Extraction never fails: fields that cannot be found are
//! left as `None`.

mod amazon;
mod dhl;
mod dpd;

use super::dates::Calendar;
use super::types::{DeliveryRecord, Service};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    Amazon,
    Dhl,
    Dpd,
}

/// Sender domain + subject keyword identifying a carrier's notifications
struct Rule {
    carrier: Carrier,
    domain: &'static str,
    subject_keyword: &'static str,
}

/// Checked in order, first match wins
const RULES: [Rule; 3] = [
    Rule {
        carrier: Carrier::Amazon,
        domain: "amazon.de",
        subject_keyword: "versandt!",
    },
    Rule {
        carrier: Carrier::Dhl,
        domain: "dhl.de",
        subject_keyword: "Sendung ist unterwegs",
    },
    Rule {
        carrier: Carrier::Dpd,
        domain: "dpd.de",
        subject_keyword: "Bald ist Ihr DPD Paket da",
    },
];

impl Carrier {
    /// Match the sender (case-insensitive domain substring) and the decoded
    /// subject (keyword substring) against the carrier rules.
    pub fn classify(sender: &str, subject: &str) -> Option<Carrier> {
        let sender = sender.to_lowercase();
        RULES
            .iter()
            .find(|rule| sender.contains(rule.domain) && subject.contains(rule.subject_keyword))
            .map(|rule| rule.carrier)
    }

    pub fn service(self) -> Service {
        match self {
            Carrier::Amazon => Service::Amazon,
            Carrier::Dhl => Service::Dhl,
            Carrier::Dpd => Service::Dpd,
        }
    }

    /// Extract a record from one notification. `email_date` is the
    /// normalized receipt time (`YYYY-MM-DD HH:MM`).
    pub fn extract(
        self,
        subject: &str,
        body: &str,
        email_date: &str,
        calendar: &Calendar,
    ) -> DeliveryRecord {
        match self {
            Carrier::Amazon => amazon::extract(body, email_date, calendar),
            Carrier::Dhl => dhl::extract(subject, body, email_date, calendar),
            Carrier::Dpd => dpd::extract(body, email_date),
        }
    }
}
