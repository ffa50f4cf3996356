use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// A fetched message reduced to what the delivery pipeline reads
#[derive(Debug, Clone)]
pub struct RawEmail {
    /// Sender address, e.g. "versandbestaetigung@amazon.de"
    pub sender: String,
    /// Subject with RFC 2047 encoded words decoded
    pub subject: String,
    /// Parsed Date header
    pub received: Option<DateTime<Utc>>,
    /// Date header as sent, kept for messages whose date cannot be parsed
    pub date_header: String,
    /// Plain-text body, or the raw HTML body if there is no text part
    pub body: String,
}

/// Which slice of a mailbox to fetch
#[derive(Debug, Clone)]
pub struct FetchWindow {
    /// Oldest day to include, as a calendar day in `tz`
    pub since: NaiveDate,
    /// Zone the receipt times are compared in
    pub tz: Tz,
    /// Maximum number of messages, oldest first
    pub max_emails: usize,
    pub folder: String,
}
