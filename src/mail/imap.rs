use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use super::parse::parse_raw_email;
use super::types::{FetchWindow, RawEmail};
use super::MailSource;

/// Fetches messages over IMAPS
pub struct ImapSource {
    server: String,
    port: u16,
    user: String,
    password: String,
}

impl ImapSource {
    pub fn new(server: &str, port: u16, user: &str, password: &str) -> Self {
        Self {
            server: server.to_string(),
            port,
            user: user.to_string(),
            password: password.to_string(),
        }
    }
}

impl std::fmt::Debug for ImapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImapSource")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("user", &self.user)
            .finish()
    }
}

impl MailSource for ImapSource {
    /// `SEARCH SINCE` the window start, then fetch the lowest sequence
    /// numbers up to `window.max_emails`.
    fn fetch(&mut self, window: &FetchWindow) -> Result<Vec<RawEmail>> {
        let tls = native_tls::TlsConnector::builder()
            .build()
            .map_err(|e| anyhow!("TLS connector build failed: {e}"))?;

        let client = ::imap::connect((self.server.as_str(), self.port), &self.server, &tls)
            .map_err(|e| anyhow!("IMAP connection to {} failed: {e}", self.server))?;
        let mut session = client
            .login(&self.user, &self.password)
            .map_err(|e| anyhow!("IMAP login failed: {}", e.0))?;

        session
            .select(&window.folder)
            .map_err(|e| anyhow!("IMAP SELECT {} failed: {e}", window.folder))?;

        let query = format!("SINCE {}", window.since.format("%d-%b-%Y"));
        let mut ids: Vec<u32> = session
            .search(&query)
            .map_err(|e| anyhow!("IMAP SEARCH failed: {e}"))?
            .into_iter()
            .collect();
        ids.sort_unstable();
        ids.truncate(window.max_emails);
        debug!(folder = %window.folder, count = ids.len(), "fetching messages");

        let mut emails = Vec::with_capacity(ids.len());
        for id in ids {
            let fetches = session
                .fetch(id.to_string(), "RFC822")
                .map_err(|e| anyhow!("IMAP FETCH {id} failed: {e}"))?;
            for fetch in fetches.iter() {
                let Some(body) = fetch.body() else {
                    continue;
                };
                match parse_raw_email(body) {
                    Some(email) => emails.push(email),
                    None => warn!(id, "cannot parse message"),
                }
            }
        }

        if let Err(e) = session.logout() {
            debug!(error = %e, "IMAP logout failed");
        }
        Ok(emails)
    }
}
