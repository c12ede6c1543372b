use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::expense::{Expense, ExpenseCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub icon: &'static str,
    pub total: f64,
    /// Share of the total spent, 0..=100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    /// Negative when over budget.
    pub remaining: f64,
    pub percent_spent: f64,
    pub over_budget: bool,
    pub categories: Vec<CategoryTotal>,
}

impl BudgetSummary {
    pub fn compute(total_budget: f64, expenses: &[Expense]) -> Self {
        let total_spent: f64 = expenses.iter().map(|expense| expense.amount).sum();

        let mut by_category: BTreeMap<ExpenseCategory, f64> = BTreeMap::new();
        for expense in expenses {
            *by_category.entry(expense.category).or_default() += expense.amount;
        }

        let mut categories: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category,
                icon: category.icon(),
                total,
                percent: percent_of(total, total_spent),
            })
            .collect();
        categories.sort_by(|a, b| b.total.total_cmp(&a.total));

        let remaining = total_budget - total_spent;
        Self {
            total_budget,
            total_spent,
            remaining,
            percent_spent: percent_of(total_spent, total_budget),
            over_budget: remaining < 0.0,
            categories,
        }
    }

    pub fn category(&self, category: ExpenseCategory) -> Option<&CategoryTotal> {
        self.categories.iter().find(|entry| entry.category == category)
    }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
