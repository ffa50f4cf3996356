use anyhow::{bail, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::parse::parse_raw_email;
use super::types::{FetchWindow, RawEmail};
use super::MailSource;

/// Reads messages from a local Maildir tree (`<root>/<folder>/{cur,new}`).
#[derive(Debug, Clone)]
pub struct MaildirSource {
    root: PathBuf,
}

impl MaildirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// "INBOX" is the Maildir root unless an explicit INBOX folder exists
    fn folder_path(&self, folder: &str) -> PathBuf {
        let candidate = self.root.join(folder);
        if folder.eq_ignore_ascii_case("INBOX") && !candidate.is_dir() {
            self.root.clone()
        } else {
            candidate
        }
    }
}

impl MailSource for MaildirSource {
    /// Parse every message in the folder (in parallel), keep those received
    /// on or after `window.since` in `window.tz`, oldest first, at most
    /// `window.max_emails`.
    fn fetch(&mut self, window: &FetchWindow) -> Result<Vec<RawEmail>> {
        let folder = self.folder_path(&window.folder);
        if !folder.is_dir() {
            bail!("maildir folder not found: {}", folder.display());
        }

        let file_paths = message_files(&folder);
        debug!(folder = %folder.display(), files = file_paths.len(), "scanning maildir");

        let mut emails: Vec<RawEmail> = file_paths
            .par_iter()
            .filter_map(|path| read_mail_file(path))
            .filter(|email| {
                email
                    .received
                    .is_none_or(|dt| dt.with_timezone(&window.tz).date_naive() >= window.since)
            })
            .collect();

        // Undated messages after dated ones
        emails.sort_by_key(|email| (email.received.is_none(), email.received));
        emails.truncate(window.max_emails);

        Ok(emails)
    }
}

/// Message files under `cur/` and `new/`, sorted by file name
fn message_files(folder: &Path) -> Vec<PathBuf> {
    let mut file_paths = Vec::new();

    for subdir in ["cur", "new"] {
        let entries = WalkDir::new(folder.join(subdir))
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok());
        for entry in entries {
            if entry.file_type().is_file() {
                file_paths.push(entry.into_path());
            }
        }
    }

    file_paths
}

fn read_mail_file(path: &Path) -> Option<RawEmail> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read message");
            return None;
        }
    };

    let email = parse_raw_email(&raw);
    if email.is_none() {
        warn!(path = %path.display(), "cannot parse message");
    }
    email
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    fn write_message(dir: &Path, name: &str, date: &str, subject: &str) {
        let raw = format!(
            "From: noreply@dhl.de\r\nSubject: {subject}\r\nDate: {date}\r\n\r\nbody\r\n"
        );
        fs::write(dir.join(name), raw).unwrap();
    }

    fn window(since: (i32, u32, u32), max_emails: usize, folder: &str) -> FetchWindow {
        FetchWindow {
            since: NaiveDate::from_ymd_opt(since.0, since.1, since.2).unwrap(),
            tz: chrono_tz::Europe::Berlin,
            max_emails,
            folder: folder.to_string(),
        }
    }

    fn maildir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["cur", "new", "tmp"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        dir
    }

    #[test]
    fn test_fetch_orders_oldest_first_and_filters_window() {
        let dir = maildir();
        let cur = dir.path().join("cur");
        write_message(&cur, "1", "Thu, 12 Sep 2024 10:00:00 +0000", "third");
        write_message(&cur, "2", "Tue, 10 Sep 2024 10:00:00 +0000", "first");
        write_message(&dir.path().join("new"), "3", "Wed, 11 Sep 2024 10:00:00 +0000", "second");
        write_message(&cur, "4", "Sun, 01 Sep 2024 10:00:00 +0000", "too old");
        // Not a maildir message location
        write_message(&dir.path().join("tmp"), "5", "Wed, 11 Sep 2024 10:00:00 +0000", "tmp");

        let mut source = MaildirSource::new(dir.path());
        let emails = source.fetch(&window((2024, 9, 5), 10, "INBOX")).unwrap();
        let subjects: Vec<&str> = emails.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_fetch_respects_max_emails() {
        let dir = maildir();
        let cur = dir.path().join("cur");
        write_message(&cur, "1", "Tue, 10 Sep 2024 10:00:00 +0000", "a");
        write_message(&cur, "2", "Wed, 11 Sep 2024 10:00:00 +0000", "b");
        write_message(&cur, "3", "Thu, 12 Sep 2024 10:00:00 +0000", "c");

        let mut source = MaildirSource::new(dir.path());
        let emails = source.fetch(&window((2024, 9, 1), 2, "INBOX")).unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].subject, "a");
    }

    #[test]
    fn test_window_start_is_a_local_day() {
        let dir = maildir();
        let cur = dir.path().join("cur");
        // 2024-09-04 22:30 UTC, already the 5th in Berlin
        write_message(&cur, "1", "Thu, 05 Sep 2024 00:30:00 +0200", "after midnight");
        // 2024-09-04 21:30 UTC, still the 4th in Berlin
        write_message(&cur, "2", "Wed, 04 Sep 2024 23:30:00 +0200", "before midnight");

        let mut source = MaildirSource::new(dir.path());
        let emails = source.fetch(&window((2024, 9, 5), 10, "INBOX")).unwrap();
        let subjects: Vec<&str> = emails.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, vec!["after midnight"]);
    }

    #[test]
    fn test_named_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("Pakete");
        fs::create_dir_all(folder.join("cur")).unwrap();
        write_message(&folder.join("cur"), "1", "Tue, 10 Sep 2024 10:00:00 +0000", "a");

        let mut source = MaildirSource::new(dir.path());
        let emails = source.fetch(&window((2024, 9, 1), 10, "Pakete")).unwrap();
        assert_eq!(emails.len(), 1);
        assert!(source.fetch(&window((2024, 9, 1), 10, "Missing")).is_err());
    }
}
