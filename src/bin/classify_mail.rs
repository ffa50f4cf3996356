//! Print how each message in a Maildir folder is classified and what the
//! matching extractor pulls out of it.
//!
//! Usage: classify_mail <maildir> [folder] [days]

use chrono::Days;
use chrono_tz::Europe::Berlin;

use parcelwatch::deliveries::{Calendar, Carrier};
use parcelwatch::mail::{FetchWindow, MailSource, MaildirSource};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let mail_dir = shellexpand::tilde(&args.next().unwrap_or_else(|| "~/Mail".to_string()))
        .into_owned();
    let folder = args.next().unwrap_or_else(|| "INBOX".to_string());
    let days: u64 = args.next().and_then(|d| d.parse().ok()).unwrap_or(30);

    let calendar = Calendar::now(Berlin);
    let window = FetchWindow {
        since: calendar
            .today()
            .checked_sub_days(Days::new(days))
            .unwrap_or(calendar.today()),
        tz: calendar.timezone(),
        max_emails: usize::MAX,
        folder,
    };

    let emails = MaildirSource::new(&mail_dir).fetch(&window)?;
    println!("Scanned {} messages in {}", emails.len(), mail_dir);

    let mut matched = 0;
    for email in &emails {
        let email_date = calendar.email_date(email.received, &email.date_header);
        let subject: String = email.subject.chars().take(50).collect();

        match Carrier::classify(&email.sender, &email.subject) {
            Some(carrier) => {
                matched += 1;
                let record = carrier.extract(&email.subject, &email.body, &email_date, &calendar);
                println!("\n{} [{}] {} - {}", email_date, record.service, email.sender, subject);
                println!("  order:    {:?}", record.order_number);
                println!("  tracking: {:?}", record.tracking_number);
                println!("  total:    {:?}", record.total_amount);
                println!("  delivery: {:?}", record.delivery_date);
                println!("  items:    {:?}", record.items);
            }
            None => println!("\n{} [--] {} - {}", email_date, email.sender, subject),
        }
    }

    println!("\nMatched {} of {} messages", matched, emails.len());
    Ok(())
}
