//! Expense CRUD handlers
//!
//! Every operation is scoped to the authenticated user; a foreign expense id
//! is indistinguishable from a missing one (404).

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::{AppError, AppState, SuccessResponse};
use buddy_core::models::{Expense, ExpenseUpdate, NewExpense};

/// Cost as the client sends it: a JSON number or a numeric string
///
/// Forms post strings; a non-numeric string is a 400 before anything is
/// written.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CostField {
    Number(f64),
    Text(String),
}

impl CostField {
    pub fn parse(&self) -> Result<f64, AppError> {
        match self {
            CostField::Number(n) => Ok(*n),
            CostField::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| AppError::bad_request("cost must be a number")),
        }
    }
}

/// Request body for creating or replacing an expense
#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    pub category: String,
    pub name: Option<String>,
    pub cost: CostField,
    /// Optional `YYYY-MM-DD` date override
    pub date: Option<String>,
}

/// Parse an optional date field; unparseable input falls back to `None`
/// (submission time on create, the stored date on edit)
fn parse_date(date: Option<&str>) -> Option<NaiveDateTime> {
    date.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// GET /api/expenses - List the user's expenses, newest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let expenses = state.db.list_expenses_desc(user.id)?;
    Ok(Json(expenses))
}

/// POST /api/expenses - Record a new expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ExpenseRequest>,
) -> Result<Json<Expense>, AppError> {
    let cost = req.cost.parse()?;

    let expense = state.db.insert_expense(
        user.id,
        &NewExpense {
            category: req.category,
            name: req.name,
            cost,
            created_at: parse_date(req.date.as_deref()),
        },
    )?;

    Ok(Json(expense))
}

/// PUT /api/expenses/:id - Replace an expense's fields
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<ExpenseRequest>,
) -> Result<Json<Expense>, AppError> {
    let cost = req.cost.parse()?;

    let expense = state.db.update_expense(
        user.id,
        id,
        &ExpenseUpdate {
            category: req.category,
            name: req.name,
            cost,
            created_at: parse_date(req.date.as_deref()),
        },
    )?;

    Ok(Json(expense))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_expense(user.id, id)?;
    Ok(Json(SuccessResponse { success: true }))
}
