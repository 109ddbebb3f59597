//! Grouped sum/mean reductions and summary statistics over sale amounts.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::DashboardError;
use crate::models::{Attribute, Dataset, SaleRecord, Value};


/// Columns to group by: one, or a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupBy {
    Single(Attribute),
    Pair(Attribute, Attribute),
}


impl GroupBy {
    pub fn attributes(&self) -> Vec<Attribute> {
        match self {
            GroupBy::Single(a) => vec![*a],
            GroupBy::Pair(a, b) => vec![*a, *b],
        }
    }

    fn key_of(&self, record: &SaleRecord) -> Option<GroupKey> {
        match self {
            GroupBy::Single(a) => Some(GroupKey::Single(record.value(*a)?)),
            GroupBy::Pair(a, b) => Some(GroupKey::Pair(record.value(*a)?, record.value(*b)?)),
        }
    }
}


impl FromStr for GroupBy {
    type Err = DashboardError;

    /// Parse `CATEGORIA` or `ANO,CATEGORIA`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        match parts.as_slice() {
            [a] => Ok(GroupBy::Single(a.parse()?)),
            [a, b] => Ok(GroupBy::Pair(a.parse()?, b.parse()?)),
            _ => Err(DashboardError::schema_mismatch(s)),
        }
    }
}


impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Single(a) => write!(f, "{}", a.label()),
            GroupBy::Pair(a, b) => write!(f, "{} and {}", b.label(), a.label()),
        }
    }
}


/// Reduction applied to the sale amounts of each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reduction {
    Sum,
    Mean,
}


/// Grouping key of one aggregate entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Single(Value),
    Pair(Value, Value),
}


impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Single(v) => write!(f, "{v}"),
            GroupKey::Pair(a, b) => write!(f, "{a} / {b}"),
        }
    }
}


/// One group and its reduced sale amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateEntry {
    pub key: GroupKey,
    pub value: f64,
    pub rows: usize,
}


/// Result of grouping a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub group_by: GroupBy,
    pub reduction: Reduction,
    pub entries: Vec<AggregateEntry>,
}


impl Aggregate {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry values.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    /// Largest entry value, 0 when empty.
    pub fn max_value(&self) -> f64 {
        self.entries.iter().map(|e| e.value).fold(0.0, f64::max)
    }

    /// Regroup a pair aggregate as one stack per first-key value.
    ///
    /// Series are the distinct second-key values in key order. Single-key
    /// entries are ignored.
    pub fn stacks(&self) -> Stacks {
        let series: Vec<Value> = self
            .entries
            .iter()
            .filter_map(|entry| match &entry.key {
                GroupKey::Pair(_, inner) => Some(inner.clone()),
                GroupKey::Single(_) => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut stacks: Vec<Stack> = Vec::new();
        for entry in &self.entries {
            let GroupKey::Pair(outer, inner) = &entry.key else { continue };
            let Ok(series_index) = series.binary_search(inner) else { continue };

            match stacks.last_mut() {
                Some(stack) if &stack.key == outer => stack.segments.push((series_index, entry.value)),
                _ => stacks.push(Stack {
                    key: outer.clone(),
                    segments: vec![(series_index, entry.value)],
                }),
            }
        }

        Stacks { series, stacks }
    }
}


/// One stacked bar: segments are `(series index, value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub key: Value,
    pub segments: Vec<(usize, f64)>,
}


impl Stack {
    pub fn total(&self) -> f64 {
        self.segments.iter().map(|(_, v)| v).sum()
    }
}


/// A pair aggregate laid out for stacked bar charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Stacks {
    pub series: Vec<Value>,
    pub stacks: Vec<Stack>,
}


impl Stacks {
    /// Largest stack total, 0 when empty.
    pub fn max_total(&self) -> f64 {
        self.stacks.iter().map(Stack::total).fold(0.0, f64::max)
    }
}


/// Headline statistics of a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: f64,
    pub mean: f64,
    pub rows: usize,
}


/// Total, mean and row count. An empty dataset reports zero for all three.
pub fn summarize(dataset: &Dataset) -> Summary {
    if dataset.is_empty() {
        return Summary::default();
    }

    let total: f64 = dataset.records().iter().map(|r| r.sale).sum();
    let rows = dataset.len();

    Summary {
        total,
        mean: total / rows as f64,
        rows,
    }
}


/// Group records and reduce their sale amounts.
///
/// Only key combinations present in the data are emitted. Single-column
/// results are ordered ascending by value (ties by key); pairs are ordered by
/// key. Records with an empty value in a grouping column are left out.
pub fn aggregate(
    dataset: &Dataset,
    group_by: GroupBy,
    reduction: Reduction,
) -> Result<Aggregate, DashboardError> {
    for attribute in group_by.attributes() {
        if attribute == Attribute::Sale {
            return Err(DashboardError::schema_mismatch(attribute.column()));
        }
        dataset.schema().require(attribute)?;
    }

    // Group records by key
    let mut groups: BTreeMap<GroupKey, (f64, usize)> = BTreeMap::new();
    for record in dataset.records() {
        let Some(key) = group_by.key_of(record) else { continue };
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += record.sale;
        entry.1 += 1;
    }

    // Reduce each group
    let mut entries: Vec<AggregateEntry> = groups
        .into_iter()
        .map(|(key, (sum, rows))| {
            let value = match reduction {
                Reduction::Sum => sum,
                Reduction::Mean => sum / rows as f64,
            };
            AggregateEntry { key, value, rows }
        })
        .collect();

    if let GroupBy::Single(_) = group_by {
        entries.sort_by(|a, b| a.value.total_cmp(&b.value));
    }

    Ok(Aggregate {
        group_by,
        reduction,
        entries,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{filter, FilterSpec};
    use crate::models::Schema;

    fn scenario() -> Dataset {
        Dataset::new(
            Schema::required(),
            vec![
                SaleRecord::new("A", 2022, "CALÇA", 100.0),
                SaleRecord::new("B", 2023, "TÊNIS", 50.0),
            ],
        )
    }

    fn larger() -> Dataset {
        Dataset::new(
            Schema::new([
                Attribute::Manager,
                Attribute::Year,
                Attribute::Month,
                Attribute::Category,
                Attribute::Sale,
            ]),
            vec![
                SaleRecord::new("A", 2022, "CALÇA", 100.0).with_month("JAN"),
                SaleRecord::new("B", 2023, "TÊNIS", 50.0).with_month("JAN"),
                SaleRecord::new("A", 2023, "CALÇA", 30.0),
                SaleRecord::new("C", 2022, "BONÉ", 75.0).with_month("MAR"),
                SaleRecord::new("B", 2022, "TÊNIS", 10.0).with_month("MAR"),
                SaleRecord::new("C", 2023, "BONÉ", 5.0).with_month("FEV"),
            ],
        )
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_scenario_summary() {
        let spec = FilterSpec::new().with_managers(["A"]);
        let selection = filter(&scenario(), &spec).unwrap();
        let summary = summarize(&selection);

        assert_eq!(summary.rows, 1);
        assert_eq!(summary.total, 100.0);
        assert_eq!(summary.mean, 100.0);
    }

    #[test]
    fn test_scenario_sum_by_category() {
        let result = aggregate(&scenario(), GroupBy::Single(Attribute::Category), Reduction::Sum).unwrap();
        let keys: Vec<GroupKey> = result.entries.iter().map(|e| e.key.clone()).collect();
        let values: Vec<f64> = result.entries.iter().map(|e| e.value).collect();

        assert_eq!(keys, vec![GroupKey::Single(text("TÊNIS")), GroupKey::Single(text("CALÇA"))]);
        assert_eq!(values, vec![50.0, 100.0]);
    }

    #[test]
    fn test_single_key_non_decreasing() {
        for attribute in [Attribute::Manager, Attribute::Year, Attribute::Category, Attribute::Month] {
            for reduction in [Reduction::Sum, Reduction::Mean] {
                let result = aggregate(&larger(), GroupBy::Single(attribute), reduction).unwrap();
                assert!(result.entries.windows(2).all(|w| w[0].value <= w[1].value));
            }
        }
    }

    #[test]
    fn test_category_sums_match_total() {
        let dataset = larger();
        let result = aggregate(&dataset, GroupBy::Single(Attribute::Category), Reduction::Sum).unwrap();
        assert_eq!(result.total(), summarize(&dataset).total);
    }

    #[test]
    fn test_mean_by_manager() {
        let result = aggregate(&larger(), GroupBy::Single(Attribute::Manager), Reduction::Mean).unwrap();
        let b = result.entries.iter().find(|e| e.key == GroupKey::Single(text("B"))).unwrap();
        assert_eq!(b.value, 30.0);
        assert_eq!(b.rows, 2);
    }

    #[test]
    fn test_pair_keeps_present_combinations_only() {
        let group_by = GroupBy::Pair(Attribute::Year, Attribute::Category);
        let result = aggregate(&larger(), group_by, Reduction::Sum).unwrap();
        let keys: Vec<GroupKey> = result.entries.iter().map(|e| e.key.clone()).collect();

        assert_eq!(
            keys,
            vec![
                GroupKey::Pair(Value::Year(2022), text("BONÉ")),
                GroupKey::Pair(Value::Year(2022), text("CALÇA")),
                GroupKey::Pair(Value::Year(2022), text("TÊNIS")),
                GroupKey::Pair(Value::Year(2023), text("BONÉ")),
                GroupKey::Pair(Value::Year(2023), text("CALÇA")),
                GroupKey::Pair(Value::Year(2023), text("TÊNIS")),
            ]
        );
        assert_eq!(result.entries[1].value, 100.0);
    }

    #[test]
    fn test_stacks() {
        let group_by = GroupBy::Pair(Attribute::Year, Attribute::Category);
        let result = aggregate(&larger(), group_by, Reduction::Sum).unwrap();
        let stacks = result.stacks();

        assert_eq!(stacks.series, vec![text("BONÉ"), text("CALÇA"), text("TÊNIS")]);
        assert_eq!(stacks.stacks.len(), 2);
        assert_eq!(stacks.stacks[0].key, Value::Year(2022));
        assert_eq!(stacks.stacks[0].segments, vec![(0, 75.0), (1, 100.0), (2, 10.0)]);
        assert_eq!(stacks.stacks[1].total(), 85.0);
        assert_eq!(stacks.max_total(), 185.0);
    }

    #[test]
    fn test_empty_optional_values_are_skipped() {
        let result = aggregate(&larger(), GroupBy::Single(Attribute::Month), Reduction::Sum).unwrap();
        assert_eq!(result.entries.len(), 3);
        assert_eq!(result.total(), 240.0);
    }

    #[test]
    fn test_empty_dataset() {
        let empty = Dataset::new(Schema::required(), Vec::new());
        let result = aggregate(&empty, GroupBy::Single(Attribute::Category), Reduction::Sum).unwrap();

        assert!(result.is_empty());
        assert_eq!(result.max_value(), 0.0);
        assert_eq!(summarize(&empty), Summary { total: 0.0, mean: 0.0, rows: 0 });
    }

    #[test]
    fn test_schema_mismatch() {
        let err = aggregate(&scenario(), GroupBy::Single(Attribute::Month), Reduction::Sum).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { .. }));

        let err = aggregate(&scenario(), GroupBy::Single(Attribute::Sale), Reduction::Sum).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { column } if column == "VENDA"));
    }

    #[test]
    fn test_group_by_from_str() {
        assert_eq!("CATEGORIA".parse::<GroupBy>().unwrap(), GroupBy::Single(Attribute::Category));
        assert_eq!(
            "ano,categoria".parse::<GroupBy>().unwrap(),
            GroupBy::Pair(Attribute::Year, Attribute::Category)
        );
        assert!("a,b,c".parse::<GroupBy>().is_err());
    }
}
