//! Dashboard and category view handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::{AppError, AppState};
use buddy_core::models::Expense;
use buddy_core::stats::{CategoryTotal, SpendingStats};

/// Headline numbers for the dashboard view
#[derive(Serialize)]
pub struct DashboardResponse {
    pub total_spent: f64,
    pub monthly_budget: f64,
    pub category_totals: Vec<CategoryTotal>,
    pub recent_items: Vec<Expense>,
}

/// GET /api/dashboard - Spending summary for the landing view
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>, AppError> {
    let expenses = state.db.list_expenses(user.id)?;
    let stats = SpendingStats::from_expenses(&expenses);
    let budget = state.db.get_or_create_budget(user.id)?;

    Ok(Json(DashboardResponse {
        total_spent: stats.total_spent,
        monthly_budget: budget.monthly_amount,
        category_totals: stats.category_totals,
        recent_items: stats.recent_items,
    }))
}

/// Category breakdown plus the full item list
#[derive(Serialize)]
pub struct CategoriesResponse {
    pub category_totals: Vec<CategoryTotal>,
    pub items: Vec<Expense>,
}

/// GET /api/categories - Per-category totals with the expense list
pub async fn get_categories(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let expenses = state.db.list_expenses(user.id)?;
    let stats = SpendingStats::from_expenses(&expenses);
    let items = state.db.list_expenses_desc(user.id)?;

    Ok(Json(CategoriesResponse {
        category_totals: stats.category_totals,
        items,
    }))
}
