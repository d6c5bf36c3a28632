//! Pay period date recovery.
//!
//! Dates are found by whole-document scans rather than line by line, since
//! providers print them in headers, footers or side panels.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::patterns::{RE_PERIOD_END, RE_PERIOD_RANGE, RE_PERIOD_START};

const FULL_YEAR_FORMATS: [&str; 3] = ["%m/%d/%Y", "%m-%d-%Y", "%Y-%m-%d"];
const SHORT_YEAR_FORMATS: [&str; 2] = ["%m/%d/%y", "%m-%d-%y"];

/// Parses a date in one of the supported paystub formats.
///
/// Four-digit years are tried first. Two-digit years are always in the
/// 2000s.
///
/// # Examples
///
/// ```
/// use payroll_engine::extraction::parse_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(parse_date("01/15/24"), NaiveDate::from_ymd_opt(2024, 1, 15));
/// assert_eq!(parse_date("2024-01-15"), NaiveDate::from_ymd_opt(2024, 1, 15));
/// assert_eq!(parse_date("13/45/2024"), None);
/// ```
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let full_year = FULL_YEAR_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .find(|date| date.year() >= 1000);
    if full_year.is_some() {
        return full_year;
    }

    SHORT_YEAR_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .find_map(|date| date.with_year(2000 + date.year().rem_euclid(100)))
}

/// Returns the first start and end dates that parse.
pub fn period_dates(text: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let mut starts = Vec::new();
    let mut ends = Vec::new();

    if let Some(re) = RE_PERIOD_START.as_ref() {
        starts.extend(re.captures_iter(text).filter_map(|c| c.get(1)).map(|m| m.as_str()));
    }
    if let Some(re) = RE_PERIOD_END.as_ref() {
        ends.extend(re.captures_iter(text).filter_map(|c| c.get(1)).map(|m| m.as_str()));
    }
    if let Some(re) = RE_PERIOD_RANGE.as_ref() {
        for caps in re.captures_iter(text) {
            if let (Some(start), Some(end)) = (caps.get(1), caps.get(2)) {
                starts.push(start.as_str());
                ends.push(end.as_str());
            }
        }
    }

    let start = starts.into_iter().find_map(parse_date);
    let end = ends.into_iter().find_map(parse_date);
    debug!(start = ?start, end = ?end, "Resolved pay period dates");
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    /// DT-001: every supported format
    #[test]
    fn test_parse_formats() {
        assert_eq!(parse_date("01/15/2024"), date(2024, 1, 15));
        assert_eq!(parse_date("1/5/2024"), date(2024, 1, 5));
        assert_eq!(parse_date("01-15-2024"), date(2024, 1, 15));
        assert_eq!(parse_date("2024-01-15"), date(2024, 1, 15));
        assert_eq!(parse_date("01/15/24"), date(2024, 1, 15));
        assert_eq!(parse_date("01-15-99"), date(2099, 1, 15));
    }

    /// DT-002: invalid dates are rejected
    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_date("02/30/2024"), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("01/15/202"), None);
    }

    /// DT-003: start/end phrasings
    #[test]
    fn test_period_phrasings() {
        let text = "Pay Period Beginning: 01/01/2024\nPeriod Ending 01/15/2024";
        assert_eq!(period_dates(text), (date(2024, 1, 1), date(2024, 1, 15)));

        let text = "Period Start Date: 2024-02-01   Period End Date: 2024-02-15";
        assert_eq!(period_dates(text), (date(2024, 2, 1), date(2024, 2, 15)));
    }

    /// DT-004: range phrasing
    #[test]
    fn test_period_range() {
        let text = "Pay Period: 03/01/2024 - 03/15/2024";
        assert_eq!(period_dates(text), (date(2024, 3, 1), date(2024, 3, 15)));

        let text = "PAY PERIOD 03-16-24 to 03-31-24";
        assert_eq!(period_dates(text), (date(2024, 3, 16), date(2024, 3, 31)));
    }

    /// DT-005: an unparseable candidate is skipped for a later one
    #[test]
    fn test_first_parseable_candidate_wins() {
        let text = "Period Start: 13/45/2024\nPay Period: 04/01/2024 - 04/15/2024";
        assert_eq!(period_dates(text), (date(2024, 4, 1), date(2024, 4, 15)));
    }

    /// DT-006: no dates
    #[test]
    fn test_no_dates() {
        assert_eq!(period_dates("Gross Pay 100.00"), (None, None));
    }
}
