pub mod record;
pub mod sales_csv;

pub use record::SalesRecord;
pub use sales_csv::{load_sales, read_sales, CsvColumns, LoadError};

use chrono::{NaiveDate, NaiveDateTime};

/// Date-time layouts accepted after a plain `YYYY-MM-DD` fails
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a sales date, dropping any time of day.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|dt| dt.date())
}
