use chrono::{DateTime, Utc};
use mail_parser::{HeaderName, Message, MessageParser, PartType};

use super::types::RawEmail;

/// Parse an RFC 5322 message. Returns `None` if the bytes are not a message
/// at all; missing headers become empty strings.
pub fn parse_raw_email(raw: &[u8]) -> Option<RawEmail> {
    let message = MessageParser::default().parse(raw)?;

    let sender = message
        .from()
        .and_then(|from| from.first())
        .and_then(|addr| addr.address.as_deref())
        .unwrap_or_default()
        .to_string();

    let received = message
        .date()
        .and_then(|date| DateTime::<Utc>::from_timestamp(date.to_timestamp(), 0));

    Some(RawEmail {
        sender,
        subject: message.subject().unwrap_or_default().to_string(),
        received,
        date_header: message.header_raw(HeaderName::Date).unwrap_or_default().trim().to_string(),
        body: body_text(&message),
    })
}

/// First text/plain body part, else the first text/html part undecoded
fn body_text(message: &Message) -> String {
    let text = message
        .text_body
        .iter()
        .filter_map(|&id| message.parts.get(id))
        .find_map(|part| match &part.body {
            PartType::Text(text) => Some(text.to_string()),
            _ => None,
        });
    if let Some(text) = text {
        return text;
    }

    message
        .html_body
        .iter()
        .filter_map(|&id| message.parts.get(id))
        .find_map(|part| match &part.body {
            PartType::Html(html) => Some(html.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}
