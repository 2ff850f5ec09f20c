//! Monthly budget operations
//!
//! Exactly one budget row per user. The UNIQUE(user_id) constraint plus the
//! UPSERT below make this a store-enforced invariant rather than a
//! "first row wins" query.

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{validate_budget_amount, Budget};

impl Database {
    /// Get a user's budget, creating the default row on first access
    pub fn get_or_create_budget(&self, user_id: i64) -> Result<Budget> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO budgets (user_id) VALUES (?) ON CONFLICT(user_id) DO NOTHING",
            params![user_id],
        )?;

        conn.query_row(
            "SELECT id, user_id, monthly_amount, updated_at FROM budgets WHERE user_id = ?",
            params![user_id],
            row_to_budget,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("budget for user {}", user_id)))
    }

    /// Replace a user's monthly budget amount
    ///
    /// Concurrent writers serialize inside SQLite; the last committed
    /// amount wins.
    pub fn set_budget(&self, user_id: i64, monthly_amount: f64) -> Result<Budget> {
        validate_budget_amount(monthly_amount)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO budgets (user_id, monthly_amount) VALUES (?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 monthly_amount = excluded.monthly_amount,
                 updated_at = CURRENT_TIMESTAMP",
            params![user_id, monthly_amount],
        )?;

        info!(user_id, monthly_amount, "Budget updated");
        self.get_or_create_budget(user_id)
    }
}

fn row_to_budget(row: &rusqlite::Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        monthly_amount: row.get(2)?,
        updated_at: parse_datetime(&row.get::<_, String>(3)?),
    })
}
