use chrono::{DateTime, NaiveDateTime, Utc};

/// Display format for backend timestamps
const TIMESTAMP_FORMAT: &str = "%b %d, %Y %H:%M";

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a backend timestamp (RFC 3339, shown in UTC) for display
pub fn format_timestamp(timestamp: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        dt.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string()
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S") {
        // SQL-style timestamps without an offset
        naive.format(TIMESTAMP_FORMAT).to_string()
    } else {
        timestamp.to_string()
    }
}

/// Format a duration until expiry, e.g. "2h 5m" or "expired"
pub fn format_remaining(expiry: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = expiry - now;
    let minutes = remaining.num_minutes();
    if remaining.num_seconds() <= 0 {
        "expired".to_string()
    } else if minutes < 1 {
        "less than a minute".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if minutes < 1440 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{}d {}h", minutes / 1440, (minutes % 1440) / 60)
    }
}

/// Single-line preview of multi-line content
pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Héllo wörld", 8), "Héllo...");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2024-03-05T14:30:00.000Z"), "Mar 05, 2024 14:30");
        assert_eq!(format_timestamp("2024-03-05T14:30:00+02:00"), "Mar 05, 2024 12:30");
        assert_eq!(format_timestamp("2024-03-05 14:30:00"), "Mar 05, 2024 14:30");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_format_remaining() {
        let now = Utc::now();
        assert_eq!(format_remaining(now - Duration::minutes(1), now), "expired");
        assert_eq!(format_remaining(now + Duration::seconds(30), now), "less than a minute");
        assert_eq!(format_remaining(now + Duration::minutes(42), now), "42m");
        assert_eq!(format_remaining(now + Duration::minutes(125), now), "2h 5m");
        assert_eq!(format_remaining(now + Duration::hours(50), now), "2d 2h");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("  one\ntwo"), "one");
        assert_eq!(first_line(""), "");
    }
}
