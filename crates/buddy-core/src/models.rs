//! Data models for users, expenses, and budgets

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default item name when the submitter leaves it blank
pub const DEFAULT_EXPENSE_NAME: &str = "Unnamed Item";

/// Default monthly budget in dollars for new users
pub const DEFAULT_MONTHLY_BUDGET: f64 = 2000.0;

/// A registered user
///
/// The password hash never leaves the database layer; this struct is safe to
/// serialize into API responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A recorded expense item
#[derive(Debug, Clone, Serialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    /// Free-text category label (e.g. "Food", "Gas")
    pub category: String,
    pub name: String,
    pub cost: f64,
    pub created_at: DateTime<Utc>,
}

/// A new expense awaiting insertion
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    pub category: String,
    pub name: Option<String>,
    pub cost: f64,
    /// Override for the creation timestamp; defaults to now
    pub created_at: Option<NaiveDateTime>,
}

impl NewExpense {
    /// Check the expense invariants before any write
    pub fn validate(&self) -> Result<()> {
        validate_category(&self.category)?;
        validate_cost(self.cost)?;
        Ok(())
    }

    /// The item name, falling back to the default label
    pub fn name_or_default(&self) -> &str {
        match self.name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => DEFAULT_EXPENSE_NAME,
        }
    }
}

/// Field edits for an existing expense
///
/// All fields are replaced on update; `created_at` is `None` when the caller
/// supplied no date (or an unparseable one), in which case the stored date
/// is retained.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseUpdate {
    pub category: String,
    pub name: Option<String>,
    pub cost: f64,
    pub created_at: Option<NaiveDateTime>,
}

impl ExpenseUpdate {
    pub fn validate(&self) -> Result<()> {
        validate_category(&self.category)?;
        validate_cost(self.cost)?;
        Ok(())
    }

    pub fn name_or_default(&self) -> &str {
        match self.name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => DEFAULT_EXPENSE_NAME,
        }
    }
}

/// A user's monthly budget (exactly one row per user)
#[derive(Debug, Clone, Serialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub monthly_amount: f64,
    pub updated_at: DateTime<Utc>,
}

fn validate_category(category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(Error::Validation("category must not be empty".to_string()));
    }
    Ok(())
}

fn validate_cost(cost: f64) -> Result<()> {
    if !cost.is_finite() {
        return Err(Error::Validation("cost must be a finite number".to_string()));
    }
    if cost < 0.0 {
        return Err(Error::Validation("cost must not be negative".to_string()));
    }
    Ok(())
}

/// Validate a monthly budget amount (must be positive and finite)
pub fn validate_budget_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::Validation(
            "monthly budget must be a positive number".to_string(),
        ));
    }
    Ok(())
}
