use anyhow::Result;
use chrono::Days;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use parcelwatch::config::Config;
use parcelwatch::deliveries::{check_deliveries, write_deliveries, Calendar};
use parcelwatch::mail::{FetchWindow, MailSource, MaildirSource};

#[derive(Parser, Debug)]
#[command(name = "parcelwatch")]
#[command(about = "Summarize parcel deliveries announced by Amazon, DHL and DPD emails")]
struct Cli {
    /// Config file (default: ~/.config/parcelwatch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read a local Maildir instead of connecting to an IMAP server
    #[arg(long)]
    maildir: Option<String>,

    /// Email address to log in with
    #[arg(long)]
    email: Option<String>,

    /// App password for the IMAP account
    #[arg(long, env = "PARCELWATCH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// IMAP server
    #[arg(long)]
    imap_server: Option<String>,

    /// Number of days to look back
    #[arg(long)]
    last_days: Option<u32>,

    /// Maximum number of emails to process
    #[arg(long)]
    last_emails: Option<usize>,

    /// Folder to search
    #[arg(long)]
    imap_folder: Option<String>,

    /// Path to save the deliveries JSON
    #[arg(long)]
    output_file: Option<String>,

    /// IANA timezone for dates
    #[arg(long)]
    timezone: Option<String>,
}

impl Cli {
    /// Command-line values take precedence over the config file
    fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.maildir {
            config.maildir.path = Some(path.clone());
        }
        if let Some(email) = &self.email {
            config.imap.email = Some(email.clone());
        }
        if let Some(server) = &self.imap_server {
            config.imap.server = server.clone();
        }
        if let Some(days) = self.last_days {
            config.fetch.last_days = days;
        }
        if let Some(max) = self.last_emails {
            config.fetch.last_emails = max;
        }
        if let Some(folder) = &self.imap_folder {
            config.fetch.folder = folder.clone();
        }
        if let Some(file) = &self.output_file {
            config.output.file = file.clone();
        }
        if let Some(tz) = &self.timezone {
            config.output.timezone = tz.clone();
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    let calendar = Calendar::now(config.timezone()?);
    let window = FetchWindow {
        since: calendar
            .today()
            .checked_sub_days(Days::new(config.fetch.last_days.into()))
            .unwrap_or(calendar.today()),
        tz: calendar.timezone(),
        max_emails: config.fetch.last_emails,
        folder: config.fetch.folder.clone(),
    };

    let mut source = open_source(&config, cli.password.as_deref())?;
    let emails = source.fetch(&window)?;
    if emails.is_empty() {
        info!(since = %window.since, folder = %window.folder, "no emails found");
    } else {
        info!(count = emails.len(), "processing emails");
    }

    let report = check_deliveries(&emails, &calendar);
    println!("{}", serde_json::to_string_pretty(&report.deliveries)?);

    let output = config.output_path();
    write_deliveries(&output, &report.deliveries)?;
    info!(path = %output.display(), deliveries = report.deliveries.len(), "deliveries written");

    Ok(())
}

fn open_source(config: &Config, password: Option<&str>) -> Result<Box<dyn MailSource>> {
    if let Some(path) = config.maildir_path() {
        return Ok(Box::new(MaildirSource::new(path)));
    }
    imap_source(config, password)
}

#[cfg(feature = "imap")]
fn imap_source(config: &Config, password: Option<&str>) -> Result<Box<dyn MailSource>> {
    use anyhow::Context;
    use parcelwatch::mail::ImapSource;

    let email = config
        .imap
        .email
        .as_deref()
        .context("no login address: pass --email or set imap.email")?;
    let password = password.context("no password: pass --password or set PARCELWATCH_PASSWORD")?;
    Ok(Box::new(ImapSource::new(
        &config.imap.server,
        config.imap.port,
        email,
        password,
    )))
}

#[cfg(not(feature = "imap"))]
fn imap_source(_config: &Config, _password: Option<&str>) -> Result<Box<dyn MailSource>> {
    anyhow::bail!("no maildir configured and IMAP support is not compiled in (enable the `imap` feature)")
}
