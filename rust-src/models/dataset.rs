//! An ordered, immutable collection of sales records.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::{Attribute, SaleRecord, Schema, Value};
use crate::error::DashboardError;


/// Records loaded from one sheet, together with the columns that were present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    schema: Schema,
    records: Vec<SaleRecord>,
    #[serde(skip)]
    skipped_rows: usize,
}


impl Dataset {
    pub fn new(schema: Schema, records: Vec<SaleRecord>) -> Self {
        Self {
            schema,
            records,
            skipped_rows: 0,
        }
    }

    /// Record how many source rows were dropped during load.
    pub fn with_skipped_rows(mut self, skipped_rows: usize) -> Self {
        self.skipped_rows = skipped_rows;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted distinct values observed in one column.
    pub fn distinct(&self, attribute: Attribute) -> Result<Vec<Value>, DashboardError> {
        self.schema.require(attribute)?;

        let values: BTreeSet<Value> = self
            .records
            .iter()
            .filter_map(|record| record.value(attribute))
            .collect();

        Ok(values.into_iter().collect())
    }

    /// Smallest and largest year, `None` when empty.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Smallest and largest sale amount, `None` when empty.
    pub fn sale_bounds(&self) -> Option<(f64, f64)> {
        let mut sales = self.records.iter().map(|r| r.sale);
        let first = sales.next()?;
        Some(sales.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s))))
    }

    /// Earliest and latest day, `None` when no record carries one.
    pub fn day_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().filter_map(|r| r.day).min()?;
        let max = self.records.iter().filter_map(|r| r.day).max()?;
        Some((min, max))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            Schema::required(),
            vec![
                SaleRecord::new("B", 2023, "TÊNIS", 50.0),
                SaleRecord::new("A", 2022, "CALÇA", 100.0),
                SaleRecord::new("A", 2023, "CALÇA", 75.5),
            ],
        )
    }

    #[test]
    fn test_distinct_sorted() {
        let managers = sample().distinct(Attribute::Manager).unwrap();
        assert_eq!(
            managers,
            vec![Value::Text("A".to_string()), Value::Text("B".to_string())]
        );
    }

    #[test]
    fn test_distinct_missing_column() {
        let err = sample().distinct(Attribute::Month).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_bounds() {
        let dataset = sample();
        assert_eq!(dataset.year_bounds(), Some((2022, 2023)));
        assert_eq!(dataset.sale_bounds(), Some((50.0, 100.0)));
        assert_eq!(dataset.day_bounds(), None);
    }

    #[test]
    fn test_bounds_empty() {
        let dataset = Dataset::default();
        assert!(dataset.is_empty());
        assert_eq!(dataset.year_bounds(), None);
        assert_eq!(dataset.sale_bounds(), None);
    }
}
