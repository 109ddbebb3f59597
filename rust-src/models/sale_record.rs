//! A single sales observation.

use chrono::NaiveDate;
use serde::Serialize;

use super::{Attribute, Value};


/// One row of the sales sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    #[serde(rename = "GERENTE")]
    pub manager: String,
    #[serde(rename = "ANO")]
    pub year: i32,
    #[serde(rename = "MES", skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(rename = "DIA", skip_serializing_if = "Option::is_none")]
    pub day: Option<NaiveDate>,
    #[serde(rename = "CATEGORIA")]
    pub category: String,
    #[serde(rename = "VENDA")]
    pub sale: f64,
}


impl SaleRecord {
    /// Create a record with only the mandatory columns filled in.
    #[cfg(test)]
    pub fn new(manager: &str, year: i32, category: &str, sale: f64) -> Self {
        Self {
            manager: manager.to_string(),
            year,
            month: None,
            day: None,
            category: category.to_string(),
            sale,
        }
    }

    #[cfg(test)]
    pub fn with_month(mut self, month: &str) -> Self {
        self.month = Some(month.to_string());
        self
    }

    #[cfg(test)]
    pub fn with_day(mut self, day: NaiveDate) -> Self {
        self.day = Some(day);
        self
    }

    /// Value of one column, `None` when an optional column is empty.
    pub fn value(&self, attribute: Attribute) -> Option<Value> {
        match attribute {
            Attribute::Manager => Some(Value::Text(self.manager.clone())),
            Attribute::Year => Some(Value::Year(self.year)),
            Attribute::Month => self.month.clone().map(Value::Text),
            Attribute::Day => self.day.map(Value::Date),
            Attribute::Category => Some(Value::Text(self.category.clone())),
            Attribute::Sale => Some(Value::Amount(self.sale)),
        }
    }
}
