//! Row filtering with conjunctive inclusion predicates.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::DashboardError;
use crate::models::{Attribute, Dataset, SaleRecord, Value};


/// Year predicate: an explicit set of years or an inclusive range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearPredicate {
    In(BTreeSet<i32>),
    Between(i32, i32),
}


impl YearPredicate {
    pub fn matches(&self, year: i32) -> bool {
        match self {
            YearPredicate::In(years) => years.contains(&year),
            YearPredicate::Between(from, to) => *from <= year && year <= *to,
        }
    }
}


/// Inclusion predicates over record columns. `None` leaves a column unrestricted.
///
/// All predicates are combined with AND. Ranges are inclusive on both bounds,
/// and a range whose lower bound exceeds its upper bound matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub managers: Option<BTreeSet<String>>,
    pub years: Option<YearPredicate>,
    pub months: Option<BTreeSet<String>>,
    pub categories: Option<BTreeSet<String>>,
    pub sale_range: Option<(f64, f64)>,
    pub day_range: Option<(NaiveDate, NaiveDate)>,
}


impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_managers<I, S>(mut self, managers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.managers = Some(managers.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = Some(YearPredicate::In(years.into_iter().collect()));
        self
    }

    pub fn with_year_range(mut self, from: i32, to: i32) -> Self {
        self.years = Some(YearPredicate::Between(from, to));
        self
    }

    pub fn with_months<I, S>(mut self, months: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.months = Some(months.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_sale_range(mut self, min: f64, max: f64) -> Self {
        self.sale_range = Some((min, max));
        self
    }

    pub fn with_day_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.day_range = Some((from, to));
        self
    }

    /// True when no predicate is set and every row passes.
    pub fn is_empty(&self) -> bool {
        self.constrained_attributes().is_empty()
    }

    /// Columns referenced by at least one predicate.
    pub fn constrained_attributes(&self) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        if self.managers.is_some() {
            attributes.push(Attribute::Manager);
        }
        if self.years.is_some() {
            attributes.push(Attribute::Year);
        }
        if self.months.is_some() {
            attributes.push(Attribute::Month);
        }
        if self.day_range.is_some() {
            attributes.push(Attribute::Day);
        }
        if self.categories.is_some() {
            attributes.push(Attribute::Category);
        }
        if self.sale_range.is_some() {
            attributes.push(Attribute::Sale);
        }
        attributes
    }

    /// Check one record against every predicate.
    pub fn matches(&self, record: &SaleRecord) -> bool {
        if let Some(managers) = &self.managers {
            if !managers.contains(&record.manager) {
                return false;
            }
        }

        if let Some(years) = &self.years {
            if !years.matches(record.year) {
                return false;
            }
        }

        if let Some(months) = &self.months {
            match &record.month {
                Some(month) if months.contains(month) => {}
                _ => return false,
            }
        }

        if let Some(categories) = &self.categories {
            if !categories.contains(&record.category) {
                return false;
            }
        }

        if let Some((min, max)) = self.sale_range {
            if record.sale < min || record.sale > max {
                return false;
            }
        }

        if let Some((from, to)) = self.day_range {
            match record.day {
                Some(day) if from <= day && day <= to => {}
                _ => return false,
            }
        }

        true
    }

    /// Categorical choices that never occur in the dataset.
    pub fn unobserved_values(&self, dataset: &Dataset) -> Vec<(Attribute, String)> {
        let sets = [
            (Attribute::Manager, &self.managers),
            (Attribute::Month, &self.months),
            (Attribute::Category, &self.categories),
        ];

        let mut unobserved = Vec::new();
        for (attribute, wanted) in sets {
            let Some(wanted) = wanted else { continue };
            let Ok(observed) = dataset.distinct(attribute) else { continue };

            for value in wanted {
                if !observed.contains(&Value::Text(value.clone())) {
                    unobserved.push((attribute, value.clone()));
                }
            }
        }

        if let Some(YearPredicate::In(years)) = &self.years {
            let observed: BTreeSet<i32> = dataset.records().iter().map(|r| r.year).collect();
            for year in years.difference(&observed) {
                unobserved.push((Attribute::Year, year.to_string()));
            }
        }

        unobserved
    }
}


impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(values: &BTreeSet<String>) -> String {
            values.iter().cloned().collect::<Vec<_>>().join(", ")
        }

        if self.is_empty() {
            return f.write_str("no filters");
        }

        let mut parts = Vec::new();
        if let Some(managers) = &self.managers {
            parts.push(format!("GERENTE in [{}]", join(managers)));
        }
        match &self.years {
            Some(YearPredicate::In(years)) => {
                let years: Vec<String> = years.iter().map(|y| y.to_string()).collect();
                parts.push(format!("ANO in [{}]", years.join(", ")));
            }
            Some(YearPredicate::Between(from, to)) => {
                parts.push(format!("ANO {from}..={to}"));
            }
            None => {}
        }
        if let Some(months) = &self.months {
            parts.push(format!("MES in [{}]", join(months)));
        }
        if let Some((from, to)) = self.day_range {
            parts.push(format!("DIA {from}..={to}"));
        }
        if let Some(categories) = &self.categories {
            parts.push(format!("CATEGORIA in [{}]", join(categories)));
        }
        if let Some((min, max)) = self.sale_range {
            parts.push(format!("VENDA {min}..={max}"));
        }

        f.write_str(&parts.join(" AND "))
    }
}


/// Return the rows of `dataset` that satisfy every predicate in `spec`.
///
/// Row order and schema are preserved. A predicate over a column that was not
/// loaded fails with `SchemaMismatch`.
pub fn filter(dataset: &Dataset, spec: &FilterSpec) -> Result<Dataset, DashboardError> {
    for attribute in spec.constrained_attributes() {
        dataset.schema().require(attribute)?;
    }

    for (attribute, value) in spec.unobserved_values(dataset) {
        warn!(column = attribute.column(), value = %value, "filter value not present in dataset");
    }

    let records: Vec<SaleRecord> = dataset
        .records()
        .iter()
        .filter(|record| spec.matches(record))
        .cloned()
        .collect();

    debug!(kept = records.len(), total = dataset.len(), "applied filters: {spec}");

    Ok(Dataset::new(dataset.schema().clone(), records))
}
