//! Date helper functions

use chrono::NaiveDate;

/// Format used when showing a post's date on the site
pub const DISPLAY_FORMAT: &str = "%B %d, %Y";

/// Format a date for display (like "January 05, 2024")
pub fn display_date(date: &NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Format a date in ISO 8601 form (like "2024-01-05")
pub fn date_xml(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Build a calendar date from route or filename components.
///
/// Returns `None` for impossible dates such as February 30th.
pub fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date() {
        let date = ymd(2024, 1, 15).unwrap();
        assert_eq!(display_date(&date), "January 15, 2024");
    }

    #[test]
    fn test_date_xml() {
        let date = ymd(2024, 3, 5).unwrap();
        assert_eq!(date_xml(&date), "2024-03-05");
    }

    #[test]
    fn test_impossible_date() {
        assert!(ymd(2023, 2, 30).is_none());
        assert!(ymd(2023, 13, 1).is_none());
    }
}
