//! Date parsing and formatting at the presentation boundary.
//!
//! Lists show `dd/mm/yyyy`; form inputs use ISO `yyyy-mm-dd`. Anything that
//! cannot be parsed formats as an empty string.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime};

const ISO_DATE: &str = "%Y-%m-%d";
const DISPLAY_DATE: &str = "%d/%m/%Y";

/// Parse a calendar date from `yyyy-mm-dd`, an RFC 3339 timestamp or a naive
/// `yyyy-mm-ddTHH:MM:SS` timestamp.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(input, ISO_DATE)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.naive_utc().date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

/// `dd/mm/yyyy` for list display
pub fn format_display_date(input: &str) -> String {
    parse_date(input)
        .map(|date| date.format(DISPLAY_DATE).to_string())
        .unwrap_or_default()
}

/// `yyyy-mm-dd` for form inputs
pub fn format_input_date(input: &str) -> String {
    parse_date(input)
        .map(|date| date.format(ISO_DATE).to_string())
        .unwrap_or_default()
}

pub fn to_display(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE).to_string()
}

pub fn to_input(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Default revision date for a release date: twelve calendar months later.
///
/// February 29th maps to February 28th of the following year.
pub fn default_revision_date(release: NaiveDate) -> Option<NaiveDate> {
    release.checked_add_months(Months::new(12))
}

/// Serde adapter: writes `yyyy-mm-dd`, reads anything [`parse_date`] accepts.
pub mod wire {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_input(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid date '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_display_format() {
        assert_eq!(format_display_date("2025-03-07"), "07/03/2025");
        assert_eq!(format_display_date("2025-03-07T00:00:00.000Z"), "07/03/2025");
    }

    #[test]
    fn test_input_format() {
        assert_eq!(format_input_date("2025-03-07T10:30:00Z"), "2025-03-07");
        assert_eq!(format_input_date("2025-03-07T10:30:00"), "2025-03-07");
        assert_eq!(format_input_date(" 2025-03-07 "), "2025-03-07");
    }

    #[test]
    fn test_empty_or_garbage_formats_as_empty() {
        assert_eq!(format_display_date(""), "");
        assert_eq!(format_display_date("   "), "");
        assert_eq!(format_display_date("not a date"), "");
        assert_eq!(format_input_date("2025-13-40"), "");
    }

    #[test]
    fn test_revision_is_one_year_later() {
        assert_eq!(
            default_revision_date(date(2025, 6, 15)),
            Some(date(2026, 6, 15))
        );
        assert_eq!(
            default_revision_date(date(2024, 12, 31)),
            Some(date(2025, 12, 31))
        );
    }

    #[test]
    fn test_revision_from_leap_day() {
        assert_eq!(
            default_revision_date(date(2024, 2, 29)),
            Some(date(2025, 2, 28))
        );
    }
}
