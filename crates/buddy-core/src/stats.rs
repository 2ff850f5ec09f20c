//! Spending aggregation engine
//!
//! Pure functions over a user's expenses: category rollups, date-bucketed
//! totals for charts, and the headline numbers the dashboard and the insight
//! prompts are built from. No side effects; an empty expense list produces
//! empty totals rather than an error.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Expense;

/// Number of items shown in the "recent activity" list
const RECENT_ITEM_COUNT: usize = 5;

/// One category's summed spending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Parallel sequences for chart consumption
#[derive(Debug, Clone, Serialize)]
pub struct DailySeries {
    /// Sorted ascending date keys, `YYYY-MM-DD`
    pub dates: Vec<String>,
    /// Human-readable short label per key, e.g. "Jan 01"
    pub labels: Vec<String>,
    pub amounts: Vec<f64>,
}

/// Aggregated spending statistics for one user
#[derive(Debug, Clone, Serialize)]
pub struct SpendingStats {
    /// Category label -> summed cost, in first-seen category order
    pub category_totals: Vec<CategoryTotal>,
    /// Calendar date -> summed cost (BTreeMap keeps keys ascending)
    pub daily_totals: BTreeMap<NaiveDate, f64>,
    /// "YYYY-Www" (zero-padded week of year) -> summed cost
    pub weekly_totals: BTreeMap<String, f64>,
    /// "YYYY-MM" -> summed cost
    pub monthly_totals: BTreeMap<String, f64>,
    pub total_spent: f64,
    /// (label, total) with the maximum total; ("None", 0) when no expenses.
    /// Ties break toward the first-seen category.
    pub highest_category: (String, f64),
    /// Most recent items by creation timestamp, descending
    pub recent_items: Vec<Expense>,
}

impl SpendingStats {
    /// Aggregate a user's expenses
    ///
    /// Expects the chronologically ordered list the store produces;
    /// first-seen category order follows from it.
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        let mut category_totals: Vec<CategoryTotal> = Vec::new();
        let mut daily_totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut weekly_totals: BTreeMap<String, f64> = BTreeMap::new();
        let mut monthly_totals: BTreeMap<String, f64> = BTreeMap::new();
        let mut total_spent = 0.0;

        for expense in expenses {
            total_spent += expense.cost;

            match category_totals
                .iter_mut()
                .find(|c| c.category == expense.category)
            {
                Some(entry) => entry.total += expense.cost,
                None => category_totals.push(CategoryTotal {
                    category: expense.category.clone(),
                    total: expense.cost,
                }),
            }

            let date = expense.created_at.date_naive();
            *daily_totals.entry(date).or_insert(0.0) += expense.cost;
            *weekly_totals
                .entry(date.format("%Y-W%W").to_string())
                .or_insert(0.0) += expense.cost;
            *monthly_totals
                .entry(date.format("%Y-%m").to_string())
                .or_insert(0.0) += expense.cost;
        }

        // Stable max: only a strictly greater total displaces the current
        // leader, so ties resolve to the first-seen category
        let highest_category = category_totals
            .iter()
            .fold(None::<&CategoryTotal>, |best, c| match best {
                Some(b) if b.total >= c.total => Some(b),
                _ => Some(c),
            })
            .map(|c| (c.category.clone(), c.total))
            .unwrap_or_else(|| ("None".to_string(), 0.0));

        let mut recent_items = expenses.to_vec();
        recent_items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        recent_items.truncate(RECENT_ITEM_COUNT);

        Self {
            category_totals,
            daily_totals,
            weekly_totals,
            monthly_totals,
            total_spent,
            highest_category,
            recent_items,
        }
    }

    /// Render the daily totals as parallel date/label/amount sequences
    pub fn daily_series(&self) -> DailySeries {
        let mut dates = Vec::with_capacity(self.daily_totals.len());
        let mut labels = Vec::with_capacity(self.daily_totals.len());
        let mut amounts = Vec::with_capacity(self.daily_totals.len());

        for (date, amount) in &self.daily_totals {
            dates.push(date.format("%Y-%m-%d").to_string());
            labels.push(date.format("%b %d").to_string());
            amounts.push(*amount);
        }

        DailySeries {
            dates,
            labels,
            amounts,
        }
    }

    /// Summed cost for one category, if any expenses carry it
    pub fn category_total(&self, category: &str) -> Option<f64> {
        self.category_totals
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.total)
    }
}
