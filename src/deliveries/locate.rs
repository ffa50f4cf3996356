/// Return the text between the first `start` marker and the first `end`
/// marker that follows it.
///
/// An absent `start` yields `""`. If `end` never follows `start`, everything
/// after `start` is returned. Callers trim the result and treat empty as
/// "not found".
pub fn extract_between<'a>(text: &'a str, start: &str, end: &str) -> &'a str {
    let Some(pos) = text.find(start) else {
        return "";
    };
    let rest = &text[pos + start.len()..];
    match rest.find(end) {
        Some(end_pos) => &rest[..end_pos],
        None => rest,
    }
}

/// `extract_between`, trimmed, with empty mapped to `None`
pub fn field_between(text: &str, start: &str, end: &str) -> Option<String> {
    let value = extract_between(text, start, end).trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
