//! Monthly budget handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use super::expenses::CostField;
use crate::auth::AuthUser;
use crate::{AppError, AppState};
use buddy_core::models::Budget;

/// Request body for replacing the monthly budget
#[derive(Debug, Deserialize)]
pub struct SetBudgetRequest {
    pub monthly_amount: CostField,
}

/// GET /api/budget - The user's budget, created with the default on first read
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Budget>, AppError> {
    let budget = state.db.get_or_create_budget(user.id)?;
    Ok(Json(budget))
}

/// PUT /api/budget - Replace the monthly budget amount
pub async fn set_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SetBudgetRequest>,
) -> Result<Json<Budget>, AppError> {
    let amount = req.monthly_amount.parse()?;
    let budget = state.db.set_budget(user.id, amount)?;
    Ok(Json(budget))
}
