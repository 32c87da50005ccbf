// DataGuard - GPL-3.0-or-later
// This file is part of DataGuard.
//
// Copyright (C) 2025 Daniel Freiermuth
//
// DataGuard is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// DataGuard is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with DataGuard.  If not, see <https://www.gnu.org/licenses/>.

//! In-memory sales data, segmented per store.

use crate::anomaly::Observation;
use crate::parser::SalesRecord;
use chrono::NaiveDate;
use indexmap::IndexMap;

/// All loaded records, with each store's row positions kept in file order.
#[derive(Debug, Clone, Default)]
pub struct SalesStore {
    records: Vec<SalesRecord>,
    /// Store name -> positions into `records`
    by_store: IndexMap<String, Vec<usize>>,
}

impl SalesStore {
    #[must_use]
    pub fn new(records: Vec<SalesRecord>) -> Self {
        let mut by_store: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (pos, record) in records.iter().enumerate() {
            by_store.entry(record.store.clone()).or_default().push(pos);
        }
        by_store.sort_unstable_keys();

        tracing::debug!(
            "Sales store holds {} records across {} stores",
            records.len(),
            by_store.len()
        );

        Self { records, by_store }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Distinct store names in ascending order
    pub fn stores(&self) -> impl Iterator<Item = &str> {
        self.by_store.keys().map(String::as_str)
    }

    #[must_use]
    pub fn contains_store(&self, store: &str) -> bool {
        self.by_store.contains_key(store)
    }

    /// Earliest and latest date over every store
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    /// Records of `store` dated within `[from, to]`, sorted by date.
    ///
    /// Either bound may be open. Rows sharing a date keep their file order.
    #[must_use]
    pub fn select(
        &self,
        store: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<&SalesRecord> {
        profiling::scope!("SalesStore::select");

        let Some(positions) = self.by_store.get(store) else {
            return Vec::new();
        };

        let mut selected: Vec<&SalesRecord> = positions
            .iter()
            .map(|&pos| &self.records[pos])
            .filter(|record| from.is_none_or(|from| record.date >= from))
            .filter(|record| to.is_none_or(|to| record.date <= to))
            .collect();
        selected.sort_by_key(|record| record.date);
        selected
    }
}

/// Map records onto engine observations, keeping the source row as id.
#[must_use]
pub fn observations(records: &[&SalesRecord]) -> Vec<Observation> {
    records
        .iter()
        .map(|record| Observation::new(record.sales, record.row).with_timestamp(record.date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn store() -> SalesStore {
        SalesStore::new(vec![
            SalesRecord::new(0, date(3), "Paris", 30.0),
            SalesRecord::new(1, date(1), "Lyon", 10.0),
            SalesRecord::new(2, date(1), "Paris", 11.0),
            SalesRecord::new(3, date(2), "Paris", 20.0),
            SalesRecord::new(4, date(1), "Paris", 12.0),
        ])
    }

    #[test]
    fn test_stores_sorted() {
        let store = store();
        assert_eq!(store.stores().collect::<Vec<_>>(), vec!["Lyon", "Paris"]);
        assert!(store.contains_store("Lyon"));
        assert!(!store.contains_store("Nice"));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_date_range() {
        assert_eq!(store().date_range(), Some((date(1), date(3))));
        assert_eq!(SalesStore::default().date_range(), None);
    }

    #[test]
    fn test_select_sorts_by_date_stably() {
        let store = store();
        let rows: Vec<usize> = store
            .select("Paris", None, None)
            .iter()
            .map(|r| r.row)
            .collect();
        assert_eq!(rows, vec![2, 4, 3, 0]);
    }

    #[test]
    fn test_select_date_bounds_are_inclusive() {
        let store = store();
        let rows: Vec<usize> = store
            .select("Paris", Some(date(2)), Some(date(3)))
            .iter()
            .map(|r| r.row)
            .collect();
        assert_eq!(rows, vec![3, 0]);

        assert!(store.select("Paris", Some(date(4)), None).is_empty());
        assert!(store.select("Nice", None, None).is_empty());
    }

    #[test]
    fn test_observations_keep_rows() {
        let store = store();
        let selected = store.select("Lyon", None, None);
        let obs = observations(&selected);
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].id, 1);
        assert_eq!(obs[0].value, 10.0);
        assert_eq!(obs[0].timestamp, Some(date(1)));
    }
}
