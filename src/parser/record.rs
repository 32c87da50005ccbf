use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// One row of the sales file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// 0-based data row in the source file (header excluded)
    pub row: usize,
    pub date: NaiveDate,
    pub store: String,
    pub sales: f64,
}

impl SalesRecord {
    #[must_use]
    pub fn new(row: usize, date: NaiveDate, store: impl Into<String>, sales: f64) -> Self {
        Self {
            row,
            date,
            store: store.into(),
            sales,
        }
    }

    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

/// English day name, Monday first
#[must_use]
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday() {
        let record = SalesRecord::new(0, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), "Paris", 10.0);
        assert_eq!(record.weekday(), Weekday::Mon);
        assert_eq!(weekday_name(record.weekday()), "Monday");
    }
}
