use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    pub maildir: MaildirConfig,
    pub imap: ImapConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Number of days to look back
    pub last_days: u32,
    /// Maximum number of emails to process
    pub last_emails: usize,
    /// Mailbox folder to search
    pub folder: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the deliveries JSON is written
    pub file: String,
    /// IANA zone used for "today" and for receipt timestamps
    pub timezone: String,
}

/// Local Maildir to read instead of an IMAP server
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MaildirConfig {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImapConfig {
    pub server: String,
    pub port: u16,
    /// Login address. The password is only taken from the command line or
    /// the PARCELWATCH_PASSWORD environment variable.
    pub email: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            last_days: 10,
            last_emails: 50,
            folder: "INBOX".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: "deliveries.json".to_string(),
            timezone: "Europe/Berlin".to_string(),
        }
    }
}

impl Default for ImapConfig {
    fn default() -> Self {
        Self {
            server: "imap.gmail.com".to_string(),
            port: 993,
            email: None,
        }
    }
}

impl Config {
    /// `~/.config/parcelwatch/config.toml` (platform equivalent)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("parcelwatch/config.toml"))
    }

    /// Load from an explicit path (which must exist) or from the default
    /// location (falling back to defaults when absent or unreadable).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            return Self::from_toml(&content)
                .with_context(|| format!("parsing config {}", path.display()));
        }

        let Some(config_path) = Self::default_path() else {
            return Ok(Self::default());
        };
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match Self::from_toml(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => warn!(path = %config_path.display(), "config parse error: {e:#}"),
                },
                Err(e) => warn!(path = %config_path.display(), "config read error: {e}"),
            }
        }

        Ok(Self::default())
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.output
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid timezone {:?}: {e}", self.output.timezone))
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output.file).into_owned())
    }

    pub fn maildir_path(&self) -> Option<PathBuf> {
        self.maildir
            .path
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()))
    }
}
