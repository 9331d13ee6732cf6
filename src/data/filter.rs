//! Platform / category selection applied before aggregation.

use crate::data::OrderRecord;
use serde::{Deserialize, Serialize};

/// One dimension of the filter: everything, or a single value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "value")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Parse a query-string value. Blank and `all` (any case) select everything.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Selection::All,
            Some(v) if v.eq_ignore_ascii_case("all") => Selection::All,
            Some(v) => Selection::Only(v.to_string()),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    /// The selected value, or `None` for everything.
    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }

    pub fn label(&self) -> &str {
        self.value().unwrap_or("All")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardFilter {
    pub platform: Selection,
    pub category: Selection,
}

impl DashboardFilter {
    pub fn new(platform: Selection, category: Selection) -> Self {
        Self { platform, category }
    }

    pub fn from_query(platform: Option<&str>, category: Option<&str>) -> Self {
        Self::new(Selection::parse(platform), Selection::parse(category))
    }

    pub fn matches(&self, record: &OrderRecord) -> bool {
        self.platform.matches(&record.platform) && self.category.matches(&record.product_category)
    }

    /// Borrow the matching records, preserving dataset order.
    pub fn apply<'a>(&self, records: &'a [OrderRecord]) -> Vec<&'a OrderRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    pub fn describe(&self) -> String {
        format!(
            "platform: {}, category: {}",
            self.platform.label(),
            self.category.label()
        )
    }
}
