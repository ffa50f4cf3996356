use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::DeliveryRecord;

pub const WEEKDAYS: [&str; 7] = [
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
    "Sonntag",
];

pub const MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// Format of `DeliveryRecord::email_date`
pub const EMAIL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Relative keywords and their day offsets. Longest first: "übermorgen"
/// contains "morgen".
const RELATIVE_DAYS: [(&[&str], u64); 3] = [
    (&["übermorgen", "day after tomorrow", "day-after-tomorrow"], 2),
    (&["morgen", "tomorrow"], 1),
    (&["heute", "today"], 0),
];

static DAY_MONTH_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s(\w+)").expect("valid regex"));

static LABEL_DAY_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\.\s(\w+)").expect("valid regex"));

/// Reference dates for one run: the target timezone and "today" in it.
///
/// Computed once per run and passed down so every date in a batch is
/// anchored to the same day.
#[derive(Debug, Clone, Copy)]
pub struct Calendar {
    tz: Tz,
    today: NaiveDate,
}

impl Calendar {
    pub fn new(tz: Tz, today: NaiveDate) -> Self {
        Self { tz, today }
    }

    /// Calendar anchored to the current date in `tz`
    pub fn now(tz: Tz) -> Self {
        Self {
            tz,
            today: Utc::now().with_timezone(&tz).date_naive(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Normalize a receipt timestamp to `YYYY-MM-DD HH:MM` in the target zone.
    /// Without a parsed timestamp the raw Date header is kept as-is.
    pub fn email_date(&self, received: Option<DateTime<Utc>>, raw: &str) -> String {
        match received {
            Some(dt) => dt
                .with_timezone(&self.tz)
                .format(EMAIL_DATE_FORMAT)
                .to_string(),
            None => raw.trim().to_string(),
        }
    }
}

/// Month number (1-12) for a German month name
pub fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|idx| idx as u32 + 1)
}

/// Canonical label: "Mittwoch, 4. September"
pub fn date_label(date: NaiveDate) -> String {
    format!(
        "{}, {}. {}",
        WEEKDAYS[date.weekday().num_days_from_monday() as usize],
        date.day(),
        MONTHS[date.month0() as usize]
    )
}

/// Label with a zero-padded day: "Samstag, 07. September"
pub fn padded_date_label(date: NaiveDate) -> String {
    format!(
        "{}, {:02}. {}",
        WEEKDAYS[date.weekday().num_days_from_monday() as usize],
        date.day(),
        MONTHS[date.month0() as usize]
    )
}

/// Normalize a carrier's partial date expression into a canonical label.
///
/// Accepts relative keywords ("Heute", "Morgen", "Übermorgen" and their
/// English forms), "day month-name" ("3 September") and "DD-MM". The year is
/// always today's year, even when the date has already passed. Returns `None`
/// for anything unrecognized.
pub fn normalize_date(expr: &str, calendar: &Calendar) -> Option<String> {
    resolve_partial_date(expr, calendar.today).map(date_label)
}

fn resolve_partial_date(expr: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lowered = expr.to_lowercase();
    for (keywords, offset) in RELATIVE_DAYS {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return today.checked_add_days(Days::new(offset));
        }
    }

    if let Some(caps) = DAY_MONTH_NAME.captures(expr) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        return NaiveDate::from_ymd_opt(today.year(), month, day);
    }

    let (day, month) = expr.trim().split_once('-')?;
    NaiveDate::from_ymd_opt(
        today.year(),
        month.trim().parse().ok()?,
        day.trim().parse().ok()?,
    )
}

pub fn parse_email_date(email_date: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(email_date.trim(), EMAIL_DATE_FORMAT).ok()
}

/// Date used to order merged records: the delivery date when its label can
/// be read back, otherwise the day the mail arrived.
pub fn resolve_sort_date(record: &DeliveryRecord, calendar: &Calendar) -> Option<NaiveDate> {
    record
        .delivery_date
        .as_deref()
        .and_then(|label| parse_label(label, calendar.today.year()))
        .or_else(|| parse_email_date(&record.email_date).map(|dt| dt.date()))
}

fn parse_label(label: &str, year: i32) -> Option<NaiveDate> {
    let caps = LABEL_DAY_MONTH.captures(label)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deliveries::types::Service;
    use chrono::TimeZone;

    fn calendar(y: i32, m: u32, d: u32) -> Calendar {
        Calendar::new(
            chrono_tz::Europe::Berlin,
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        )
    }

    #[test]
    fn test_relative_keywords() {
        let cal = calendar(2024, 9, 10);
        assert_eq!(
            normalize_date("Today", &cal).as_deref(),
            Some("Dienstag, 10. September")
        );
        assert_eq!(
            normalize_date("Heute", &cal).as_deref(),
            Some("Dienstag, 10. September")
        );
        assert_eq!(
            normalize_date("Morgen", &cal).as_deref(),
            Some("Mittwoch, 11. September")
        );
        assert_eq!(
            normalize_date("Übermorgen", &cal).as_deref(),
            Some("Donnerstag, 12. September")
        );
    }

    #[test]
    fn test_day_and_month_name() {
        let cal = calendar(2024, 9, 10);
        assert_eq!(
            normalize_date("Dienstag, 3 September", &cal).as_deref(),
            Some("Dienstag, 3. September")
        );
        assert_eq!(
            normalize_date("14 März", &cal).as_deref(),
            Some("Donnerstag, 14. März")
        );
        assert_eq!(normalize_date("3 Sept", &cal), None);
    }

    #[test]
    fn test_day_dash_month() {
        let cal = calendar(2024, 9, 10);
        assert_eq!(
            normalize_date("04-10", &cal).as_deref(),
            Some("Freitag, 4. Oktober")
        );
        assert_eq!(normalize_date("31-02", &cal), None);
        assert_eq!(normalize_date("1-2-3", &cal), None);
    }

    #[test]
    fn test_unrecognized_is_none() {
        let cal = calendar(2024, 9, 10);
        assert_eq!(normalize_date("bald", &cal), None);
        assert_eq!(normalize_date("", &cal), None);
    }

    #[test]
    fn test_no_year_rollover() {
        // A January date seen in late December stays in the current year.
        let cal = calendar(2024, 12, 30);
        assert_eq!(
            normalize_date("2 Januar", &cal).as_deref(),
            Some("Dienstag, 2. Januar")
        );
    }

    #[test]
    fn test_padded_label() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 7).unwrap();
        assert_eq!(padded_date_label(date), "Samstag, 07. September");
        assert_eq!(date_label(date), "Samstag, 7. September");
    }

    #[test]
    fn test_email_date_in_target_zone() {
        let cal = calendar(2024, 9, 10);
        let summer = Utc.with_ymd_and_hms(2024, 9, 12, 15, 27, 52).unwrap();
        assert_eq!(cal.email_date(Some(summer), ""), "2024-09-12 17:27");
        let winter = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        assert_eq!(cal.email_date(Some(winter), ""), "2024-01-15 10:00");
        assert_eq!(cal.email_date(None, " garbage date "), "garbage date");
    }

    #[test]
    fn test_sort_date_prefers_delivery_label() {
        let cal = calendar(2024, 9, 10);
        let mut record = DeliveryRecord::empty(Service::Amazon, "2024-09-01 08:00");
        record.delivery_date = Some("Mittwoch, 4. September".to_string());
        assert_eq!(
            resolve_sort_date(&record, &cal),
            NaiveDate::from_ymd_opt(2024, 9, 4)
        );
    }

    #[test]
    fn test_sort_date_falls_back_to_email_date() {
        let cal = calendar(2024, 9, 10);
        let mut record = DeliveryRecord::empty(Service::Dhl, "2024-09-01 08:00");
        assert_eq!(
            resolve_sort_date(&record, &cal),
            NaiveDate::from_ymd_opt(2024, 9, 1)
        );

        record.delivery_date = Some("Wednesday, 04. October".to_string());
        assert_eq!(
            resolve_sort_date(&record, &cal),
            NaiveDate::from_ymd_opt(2024, 9, 1)
        );

        record.email_date = "Thu, 12 Sep 2024".to_string();
        assert_eq!(resolve_sort_date(&record, &cal), None);
    }
}
