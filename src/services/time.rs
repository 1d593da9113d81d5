//! Current time and date formatting

use chrono::{Local, Utc};

/// Current time and date. "UTC" is honoured as a timezone; any other
/// label is appended to the local time verbatim.
pub fn current_time(timezone: Option<&str>) -> String {
    match timezone {
        Some(tz) if tz.eq_ignore_ascii_case("utc") => format!(
            "Current time: {} UTC",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        ),
        Some(tz) => format!(
            "Current time: {} ({})",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            tz
        ),
        None => format!(
            "Current time: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
    }
}

/// Human-readable current date.
pub fn current_date() -> String {
    format!("Today is: {}", Local::now().format("%A, %B %d, %Y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_time_without_timezone() {
        let result = current_time(None);
        assert!(result.starts_with("Current time: "));
        assert!(!result.contains('('));
    }

    #[test]
    fn test_current_time_appends_timezone_label() {
        let result = current_time(Some("Europe/Tbilisi"));
        assert!(result.ends_with("(Europe/Tbilisi)"));
    }

    #[test]
    fn test_current_time_utc() {
        let result = current_time(Some("UTC"));
        assert!(result.ends_with(" UTC"));
    }

    #[test]
    fn test_current_date_format() {
        let result = current_date();
        assert!(result.starts_with("Today is: "));
        // Weekday name, month name, day, year
        assert!(result.contains(','));
    }
}
