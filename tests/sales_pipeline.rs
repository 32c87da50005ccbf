//! Sales file to report, through the public API.

use chrono::NaiveDate;
use dataguard::core::{analyze, AnalysisSettings, SalesStore};
use dataguard::parser::{load_sales, CsvColumns, LoadError};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Thirty days for two stores; Lyon has one spike on 2024-03-18.
fn sales_csv() -> String {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let mut csv = String::from("date,magasin,ventes\n");
    for day in 0..30 {
        let date = start + chrono::Duration::days(day);
        let lyon = if day == 17 { 4800.0 } else { 1000.0 + (day % 5) as f64 * 10.0 };
        let paris = 2000.0 + (day % 3) as f64 * 5.0;
        csv.push_str(&format!("{date},Paris,{paris}\n"));
        csv.push_str(&format!("{date},Lyon,{lyon}\n"));
    }
    csv
}

#[test]
fn spike_is_found_in_the_right_store_and_day() {
    let file = write_csv(&sales_csv());
    let records = load_sales(file.path(), &CsvColumns::default()).unwrap();
    assert_eq!(records.len(), 60);

    let store = SalesStore::new(records);
    assert_eq!(store.stores().collect::<Vec<_>>(), vec!["Lyon", "Paris"]);

    let selection = store.select("Lyon", None, None);
    assert_eq!(selection.len(), 30);

    let settings = AnalysisSettings {
        contamination: 0.03,
        ..AnalysisSettings::default()
    };
    let report = analyze("Lyon", &selection, &settings).unwrap();

    // round(0.03 * 30) = 1
    assert_eq!(report.anomaly_count, 1);
    let anomaly = report.anomalies().next().unwrap();
    assert_eq!(anomaly.date, NaiveDate::from_ymd_opt(2024, 3, 18).unwrap());
    assert_eq!(anomaly.sales, 4800.0);
    assert_eq!(anomaly.store, "Lyon");
    // 18 March 2024 is a Monday
    assert_eq!(report.anomalies_by_weekday[0].count, 1);
}

#[test]
fn date_filter_narrows_the_selection() {
    let file = write_csv(&sales_csv());
    let store = SalesStore::new(load_sales(file.path(), &CsvColumns::default()).unwrap());

    let from = NaiveDate::from_ymd_opt(2024, 3, 25);
    let selection = store.select("Paris", from, None);
    assert_eq!(selection.len(), 6);

    let report = analyze("Paris", &selection, &AnalysisSettings::default()).unwrap();
    assert!(!report.model_ran, "six rows are below the model minimum");
    assert_eq!(report.anomaly_count, 0);
}

#[test]
fn same_file_same_report() {
    let file = write_csv(&sales_csv());
    let store = SalesStore::new(load_sales(file.path(), &CsvColumns::default()).unwrap());
    let selection = store.select("Paris", None, None);

    let a = analyze("Paris", &selection, &AnalysisSettings::default()).unwrap();
    let b = analyze("Paris", &selection, &AnalysisSettings::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_sales(&dir.path().join("absent.csv"), &CsvColumns::default()).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn non_finite_sales_fail_the_analysis() {
    let mut csv = String::from("date,magasin,ventes\n");
    for day in 1..=15 {
        let value = if day == 4 { "inf".to_string() } else { "10".to_string() };
        csv.push_str(&format!("2024-04-{day:02},Nice,{value}\n"));
    }
    let file = write_csv(&csv);
    let store = SalesStore::new(load_sales(file.path(), &CsvColumns::default()).unwrap());
    let selection = store.select("Nice", None, None);
    assert!(analyze("Nice", &selection, &AnalysisSettings::default()).is_err());
}
