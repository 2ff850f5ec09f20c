//! Expense operations
//!
//! All queries are scoped to an owner id; a caller can never read or write
//! another user's rows.

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Expense, ExpenseUpdate, NewExpense};

impl Database {
    /// Insert an expense for a user
    ///
    /// Validates before touching the store; an invalid expense leaves the
    /// database unchanged. `created_at` defaults to the current time when no
    /// override was supplied.
    pub fn insert_expense(&self, user_id: i64, expense: &NewExpense) -> Result<Expense> {
        expense.validate()?;

        let conn = self.conn()?;
        let id = match expense.created_at {
            Some(ts) => {
                conn.execute(
                    "INSERT INTO expenses (user_id, category, name, cost, created_at)
                     VALUES (?, ?, ?, ?, ?)",
                    params![
                        user_id,
                        expense.category.trim(),
                        expense.name_or_default(),
                        expense.cost,
                        ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                    ],
                )?;
                conn.last_insert_rowid()
            }
            None => {
                conn.execute(
                    "INSERT INTO expenses (user_id, category, name, cost) VALUES (?, ?, ?, ?)",
                    params![
                        user_id,
                        expense.category.trim(),
                        expense.name_or_default(),
                        expense.cost,
                    ],
                )?;
                conn.last_insert_rowid()
            }
        };

        info!(user_id, expense_id = id, "Expense recorded");

        self.get_expense(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("expense {}", id)))
    }

    /// Look up one expense by id, scoped to its owner
    pub fn get_expense(&self, user_id: i64, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                "SELECT id, user_id, category, name, cost, created_at
                 FROM expenses WHERE id = ? AND user_id = ?",
                params![id, user_id],
                row_to_expense,
            )
            .optional()?;
        Ok(expense)
    }

    /// List a user's expenses in chronological order (oldest first)
    ///
    /// This is the ordering the aggregation engine expects: first-seen
    /// category order falls out of it.
    pub fn list_expenses(&self, user_id: i64) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, category, name, cost, created_at
             FROM expenses WHERE user_id = ? ORDER BY created_at ASC, id ASC",
        )?;
        let expenses = stmt
            .query_map(params![user_id], row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }

    /// List a user's expenses newest first (for the expense management view)
    pub fn list_expenses_desc(&self, user_id: i64) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, category, name, cost, created_at
             FROM expenses WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )?;
        let expenses = stmt
            .query_map(params![user_id], row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }

    /// Replace an expense's fields
    ///
    /// When `update.created_at` is `None` the stored date is retained
    /// (unparseable dates fall back rather than failing the whole edit).
    pub fn update_expense(&self, user_id: i64, id: i64, update: &ExpenseUpdate) -> Result<Expense> {
        update.validate()?;

        let conn = self.conn()?;
        let changed = match update.created_at {
            Some(ts) => conn.execute(
                "UPDATE expenses SET category = ?, name = ?, cost = ?, created_at = ?
                 WHERE id = ? AND user_id = ?",
                params![
                    update.category.trim(),
                    update.name_or_default(),
                    update.cost,
                    ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                    id,
                    user_id,
                ],
            )?,
            None => conn.execute(
                "UPDATE expenses SET category = ?, name = ?, cost = ?
                 WHERE id = ? AND user_id = ?",
                params![
                    update.category.trim(),
                    update.name_or_default(),
                    update.cost,
                    id,
                    user_id,
                ],
            )?,
        };

        if changed == 0 {
            return Err(Error::NotFound(format!("expense {}", id)));
        }

        self.get_expense(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("expense {}", id)))
    }

    /// Delete an expense by id, scoped to its owner
    pub fn delete_expense(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM expenses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("expense {}", id)));
        }
        info!(user_id, expense_id = id, "Expense deleted");
        Ok(())
    }
}

fn row_to_expense(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        name: row.get(3)?,
        cost: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}
