//! Column schema of the sales sheet and typed cell values.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::DashboardError;


/// One column of the sales sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Attribute {
    #[serde(rename = "GERENTE")]
    Manager,
    #[serde(rename = "ANO")]
    Year,
    #[serde(rename = "MES")]
    Month,
    #[serde(rename = "DIA")]
    Day,
    #[serde(rename = "CATEGORIA")]
    Category,
    #[serde(rename = "VENDA")]
    Sale,
}


impl Attribute {
    /// Every column in canonical sheet order.
    pub const ALL: [Attribute; 6] = [
        Attribute::Manager,
        Attribute::Year,
        Attribute::Month,
        Attribute::Day,
        Attribute::Category,
        Attribute::Sale,
    ];

    /// Columns that must be present for a sheet to load.
    pub const REQUIRED: [Attribute; 4] = [
        Attribute::Manager,
        Attribute::Year,
        Attribute::Category,
        Attribute::Sale,
    ];

    /// Header name of the column in the spreadsheet.
    pub fn column(&self) -> &'static str {
        match self {
            Attribute::Manager => "GERENTE",
            Attribute::Year => "ANO",
            Attribute::Month => "MES",
            Attribute::Day => "DIA",
            Attribute::Category => "CATEGORIA",
            Attribute::Sale => "VENDA",
        }
    }

    /// Human readable label for chart titles.
    pub fn label(&self) -> &'static str {
        match self {
            Attribute::Manager => "Manager",
            Attribute::Year => "Year",
            Attribute::Month => "Month",
            Attribute::Day => "Day",
            Attribute::Category => "Category",
            Attribute::Sale => "Sale",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    /// Columns offered as multi-select choices.
    pub fn is_categorical(&self) -> bool {
        matches!(self, Attribute::Manager | Attribute::Month | Attribute::Category)
    }
}


impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}


impl FromStr for Attribute {
    type Err = DashboardError;

    /// Accepts the sheet header or an English alias, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Attribute::ALL
            .into_iter()
            .find(|attr| attr.column() == wanted || attr.label().to_uppercase() == wanted)
            .ok_or_else(|| DashboardError::schema_mismatch(s.trim()))
    }
}


/// The set of columns actually loaded from a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    attributes: Vec<Attribute>,
}


impl Schema {
    /// Build a schema, keeping canonical column order and dropping duplicates.
    pub fn new(attributes: impl IntoIterator<Item = Attribute>) -> Self {
        let mut attributes: Vec<Attribute> = attributes.into_iter().collect();
        attributes.sort();
        attributes.dedup();
        Self { attributes }
    }

    /// Schema with every known column.
    #[cfg(test)]
    pub fn full() -> Self {
        Self::new(Attribute::ALL)
    }

    /// Schema with only the mandatory columns.
    pub fn required() -> Self {
        Self::new(Attribute::REQUIRED)
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.attributes.contains(&attribute)
    }

    /// Fail with `SchemaMismatch` when the column was not loaded.
    pub fn require(&self, attribute: Attribute) -> Result<(), DashboardError> {
        if self.contains(attribute) {
            Ok(())
        } else {
            Err(DashboardError::schema_mismatch(attribute.column()))
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}


impl Default for Schema {
    fn default() -> Self {
        Self::required()
    }
}


/// A typed cell value, used as grouping key and for distinct-value listings.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Year(i32),
    Date(NaiveDate),
    Amount(f64),
}


impl Value {
    fn rank(&self) -> u8 {
        match self {
            Value::Text(_) => 0,
            Value::Year(_) => 1,
            Value::Date(_) => 2,
            Value::Amount(_) => 3,
        }
    }
}


impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Year(a), Value::Year(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Amount(a), Value::Amount(b)) => a.total_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}


impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Year(y) => write!(f, "{y}"),
            Value::Date(d) => write!(f, "{}", d.format("%d/%m/%Y")),
            Value::Amount(a) => write!(f, "{a:.2}"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_from_str() {
        assert_eq!("GERENTE".parse::<Attribute>().unwrap(), Attribute::Manager);
        assert_eq!("categoria".parse::<Attribute>().unwrap(), Attribute::Category);
        assert_eq!(" year ".parse::<Attribute>().unwrap(), Attribute::Year);
        assert_eq!("Sale".parse::<Attribute>().unwrap(), Attribute::Sale);
    }

    #[test]
    fn test_unknown_attribute_is_schema_mismatch() {
        let err = "REGIAO".parse::<Attribute>().unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { column } if column == "REGIAO"));
    }

    #[test]
    fn test_schema_order_and_require() {
        let schema = Schema::new([Attribute::Sale, Attribute::Manager, Attribute::Sale]);
        assert_eq!(schema.attributes(), &[Attribute::Manager, Attribute::Sale]);
        assert!(schema.require(Attribute::Manager).is_ok());
        assert!(matches!(
            schema.require(Attribute::Month),
            Err(DashboardError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_value_ordering() {
        let mut values = vec![
            Value::Year(2023),
            Value::Text("TÊNIS".to_string()),
            Value::Year(2022),
            Value::Text("CALÇA".to_string()),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Text("CALÇA".to_string()),
                Value::Text("TÊNIS".to_string()),
                Value::Year(2022),
                Value::Year(2023),
            ]
        );
        assert_eq!(Value::Amount(1.5), Value::Amount(1.5));
    }

    #[test]
    fn test_value_display() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 9).unwrap();
        assert_eq!(Value::Date(date).to_string(), "09/03/2023");
        assert_eq!(Value::Year(2022).to_string(), "2022");
    }
}
