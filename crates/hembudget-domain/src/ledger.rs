//! The per-user ledger tree: months, categories, and line items.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    amount,
    common::{position_of, NamedEntity},
    month::Month,
    template::CategoryTemplate,
    totals::{is_income_category, CategoryTotals},
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// A single budget/actual pair under a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub name: String,
    #[serde(default, alias = "Budget", deserialize_with = "amount::lenient")]
    pub budget: f64,
    #[serde(
        default,
        alias = "Faktiskt",
        alias = "Actual",
        deserialize_with = "amount::lenient"
    )]
    pub actual: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl LineItem {
    /// Creates a zero-valued item.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            budget: 0.0,
            actual: 0.0,
            due_date: None,
        }
    }

    pub fn with_amounts(name: impl Into<String>, amounts: LineAmounts) -> Self {
        Self {
            name: name.into(),
            budget: amounts.budget,
            actual: amounts.actual,
            due_date: amounts.due_date,
        }
    }

    pub fn amounts(&self) -> LineAmounts {
        LineAmounts {
            budget: self.budget,
            actual: self.actual,
            due_date: self.due_date,
        }
    }
}

impl NamedEntity for LineItem {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Values written into a line item by an upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineAmounts {
    pub budget: f64,
    pub actual: f64,
    pub due_date: Option<NaiveDate>,
}

impl LineAmounts {
    pub fn new(budget: f64, actual: f64) -> Self {
        Self {
            budget,
            actual,
            due_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// A heading and its line items, in display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRecord {
    pub name: String,
    /// Identifier carried over from table-backed stores; never required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl CategoryRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            items: Vec::new(),
        }
    }

    pub fn is_income(&self) -> bool {
        is_income_category(&self.name)
    }

    pub fn item(&self, name: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.is_named(name))
    }

    pub fn item_mut(&mut self, name: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.is_named(name))
    }

    /// Inserts `item`, overwriting an existing item of the same name in place.
    pub fn upsert_item(&mut self, item: LineItem) {
        match position_of(&self.items, &item.name) {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
    }

    pub fn remove_item(&mut self, name: &str) -> Option<LineItem> {
        position_of(&self.items, name).map(|index| self.items.remove(index))
    }

    pub fn totals(&self) -> CategoryTotals {
        CategoryTotals::from_items(&self.items)
    }
}

impl NamedEntity for CategoryRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

/// One month's notes plus its category tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthRecord {
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
}

impl MonthRecord {
    pub fn seeded(template: &CategoryTemplate) -> Self {
        Self {
            notes: String::new(),
            categories: template.instantiate(),
        }
    }

    pub fn category(&self, name: &str) -> Option<&CategoryRecord> {
        self.categories.iter().find(|category| category.is_named(name))
    }

    pub fn category_mut(&mut self, name: &str) -> Option<&mut CategoryRecord> {
        self.categories
            .iter_mut()
            .find(|category| category.is_named(name))
    }

    pub fn category_index(&self, name: &str) -> Option<usize> {
        position_of(&self.categories, name)
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.category_index(name).is_some()
    }

    /// Returns the named category, appending an empty one when absent.
    pub fn ensure_category(&mut self, name: &str) -> &mut CategoryRecord {
        let index = match self.category_index(name) {
            Some(index) => index,
            None => {
                self.categories.push(CategoryRecord::new(name.trim()));
                self.categories.len() - 1
            }
        };
        &mut self.categories[index]
    }
}

/// Root object holding one user's budgeting data for all twelve months.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
    pub owner: String,
    #[serde(default)]
    pub template: CategoryTemplate,
    #[serde(default)]
    pub months: BTreeMap<Month, MonthRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ledger {
    pub fn new(owner: impl Into<String>, template: CategoryTemplate) -> Self {
        let now = Utc::now();
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            owner: owner.into(),
            template,
            months: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn month(&self, month: Month) -> Option<&MonthRecord> {
        self.months.get(&month)
    }

    pub fn month_mut(&mut self, month: Month) -> Option<&mut MonthRecord> {
        self.months.get_mut(&month)
    }

    /// Returns the month record, seeding it from the template on first use.
    pub fn ensure_month(&mut self, month: Month) -> &mut MonthRecord {
        let template = &self.template;
        self.months
            .entry(month)
            .or_insert_with(|| MonthRecord::seeded(template))
    }

    pub fn has_month(&self, month: Month) -> bool {
        self.months.contains_key(&month)
    }

    pub fn category(&self, month: Month, name: &str) -> Option<&CategoryRecord> {
        self.month(month).and_then(|record| record.category(name))
    }

    pub fn item(&self, month: Month, category: &str, item: &str) -> Option<&LineItem> {
        self.category(month, category)
            .and_then(|record| record.item(item))
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
