//! Mail retrieval: turn mailbox contents into `RawEmail` values.

#[cfg(feature = "imap")]
mod imap;
mod maildir;
mod parse;
mod types;

#[cfg(feature = "imap")]
pub use self::imap::ImapSource;
pub use maildir::MaildirSource;
pub use parse::parse_raw_email;
pub use types::{FetchWindow, RawEmail};

use anyhow::Result;

/// Something that can hand over one batch of messages
pub trait MailSource {
    fn fetch(&mut self, window: &FetchWindow) -> Result<Vec<RawEmail>>;
}
