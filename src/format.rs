use chrono::{Local, TimeZone};
use log::warn;

/// Default cutoff for subject truncation in the message table.
pub const SUBJECT_MAX: usize = 15;

/// Timestamps below this are epoch seconds, at or above it epoch milliseconds.
const MS_THRESHOLD: i64 = 10_000_000_000;

/// Format a received timestamp as `HH:MM DD.MM.YYYY` in local time.
///
/// The feed is inconsistent about units, so both second and millisecond
/// precision are accepted.
pub fn format_received(timestamp: i64) -> String {
    let millis = if timestamp < MS_THRESHOLD {
        timestamp.checked_mul(1000)
    } else {
        Some(timestamp)
    };

    match millis.and_then(|ms| Local.timestamp_millis_opt(ms).single()) {
        Some(date) => date.format("%H:%M %d.%m.%Y").to_string(),
        None => {
            warn!("invalid received timestamp: {timestamp}");
            "Unknown date".to_string()
        }
    }
}

/// Current wall-clock time as `HH:MM:SS`, used for the last-update stat.
pub fn clock_now() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Cut a subject down to `max` characters, appending `...` on overflow.
pub fn truncate_subject(subject: &str, max: usize) -> String {
    if subject.chars().count() > max {
        let head: String = subject.chars().take(max).collect();
        format!("{head}...")
    } else {
        subject.to_string()
    }
}

/// Derive a display name from the local part of an email address.
///
/// Each dot/underscore/hyphen-separated segment is capitalized:
/// `john.doe@x.com` becomes `John Doe`.
pub fn sender_name(email: &str) -> String {
    if email.is_empty() {
        return "Unknown".to_string();
    }
    let local = email.split('@').next().unwrap_or_default();
    local
        .split(['.', '_', '-'])
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_and_millis_agree() {
        assert_eq!(format_received(1_700_000_000), format_received(1_700_000_000_000));
    }

    #[test]
    fn unrepresentable_timestamp() {
        assert_eq!(format_received(i64::MAX), "Unknown date");
    }

    #[test]
    fn subject_truncation() {
        assert_eq!(truncate_subject("A very long subject line", 15), "A very long sub...");
        assert_eq!(truncate_subject("short", 15), "short");
        // exactly at the limit is left alone
        assert_eq!(truncate_subject("123456789012345", 15), "123456789012345");
    }

    #[test]
    fn sender_name_from_local_part() {
        assert_eq!(sender_name("john.doe@x.com"), "John Doe");
        assert_eq!(sender_name("jane_a-smith@example.org"), "Jane A Smith");
        assert_eq!(sender_name("bob@example.org"), "Bob");
        assert_eq!(sender_name(""), "Unknown");
    }
}
