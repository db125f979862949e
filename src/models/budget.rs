use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::Category;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBudget {
    pub category: Category,
    pub amount: Decimal,
}

/// Spending limits: one for the whole month and optional per-category caps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Budgets {
    #[serde(default)]
    pub monthly: Option<Decimal>,
    #[serde(default)]
    pub categories: BTreeMap<Category, Decimal>,
}

impl Budgets {
    pub fn category_budgets(&self) -> Vec<CategoryBudget> {
        self.categories
            .iter()
            .map(|(category, amount)| CategoryBudget {
                category: *category,
                amount: *amount,
            })
            .collect()
    }
}
