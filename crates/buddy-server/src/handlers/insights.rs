//! Aggregation payload and AI advisor handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::expenses::CostField;
use crate::auth::AuthUser;
use crate::{AppError, AppState};
use buddy_core::models::Expense;
use buddy_core::stats::{CategoryTotal, DailySeries, SpendingStats};
use buddy_core::{InsightClient, InsightRequest};

/// Full aggregation payload for chart consumption
#[derive(Serialize)]
pub struct InsightsResponse {
    pub total_spent: f64,
    pub monthly_budget: f64,
    pub highest_category: (String, f64),
    pub category_totals: Vec<CategoryTotal>,
    pub daily: DailySeries,
    pub daily_totals: BTreeMap<NaiveDate, f64>,
    pub weekly_totals: BTreeMap<String, f64>,
    pub monthly_totals: BTreeMap<String, f64>,
    pub recent_items: Vec<Expense>,
}

/// GET /api/insights - Everything the charts need in one payload
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<InsightsResponse>, AppError> {
    let expenses = state.db.list_expenses(user.id)?;
    let stats = SpendingStats::from_expenses(&expenses);
    let budget = state.db.get_or_create_budget(user.id)?;

    Ok(Json(InsightsResponse {
        total_spent: stats.total_spent,
        monthly_budget: budget.monthly_amount,
        highest_category: stats.highest_category.clone(),
        daily: stats.daily_series(),
        category_totals: stats.category_totals,
        daily_totals: stats.daily_totals,
        weekly_totals: stats.weekly_totals,
        monthly_totals: stats.monthly_totals,
        recent_items: stats.recent_items,
    }))
}

/// Request body for a free-text advisor question
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(rename = "userQuery")]
    pub user_query: Option<String>,
}

/// Response carrying the rendered advisor answer
#[derive(Serialize)]
pub struct SubmitResponse {
    /// HTML fragment
    pub result: String,
}

/// POST /api/submit - Free-text question against the user's budget data
pub async fn submit_query(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let question = req
        .user_query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::bad_request("Please provide a query"))?;

    let ai = gateway(&state)?;

    let expenses = state.db.list_expenses(user.id)?;
    let stats = SpendingStats::from_expenses(&expenses);
    let budget = state.db.get_or_create_budget(user.id)?;

    let prompt = InsightRequest::from_stats(&stats, budget.monthly_amount)
        .question(question)
        .build();
    let html = ai.generate_html(&prompt).await?;

    Ok(Json(SubmitResponse { result: html }))
}

/// Request body for contextual spending tips
#[derive(Debug, Deserialize)]
pub struct AiInsightsRequest {
    pub category: Option<String>,
    pub name: Option<String>,
    pub cost: Option<CostField>,
}

/// Response carrying rendered spending tips
#[derive(Serialize)]
pub struct AiInsightsResponse {
    /// HTML fragment
    pub insights: String,
}

/// POST /api/get_ai_insights - Personalized tips, optionally focused on a
/// category and a just-added expense
pub async fn get_ai_insights(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AiInsightsRequest>,
) -> Result<Json<AiInsightsResponse>, AppError> {
    let ai = gateway(&state)?;

    let expenses = state.db.list_expenses(user.id)?;
    let stats = SpendingStats::from_expenses(&expenses);
    let budget = state.db.get_or_create_budget(user.id)?;

    let mut request = InsightRequest::from_stats(&stats, budget.monthly_amount);

    if let Some(category) = req.category.as_deref() {
        if let Some(total) = stats.category_total(category) {
            let examples: Vec<(String, f64)> = expenses
                .iter()
                .filter(|e| e.category == category)
                .map(|e| (e.name.clone(), e.cost))
                .collect();
            request = request.focus_category(category, total).examples(&examples);
        }

        if let (Some(name), Some(cost)) = (req.name.as_deref(), req.cost.as_ref()) {
            request = request.new_item(name, category, cost.parse()?);
        }
    }

    let html = ai.generate_html(&request.build()).await?;

    Ok(Json(AiInsightsResponse { insights: html }))
}

fn gateway(state: &AppState) -> Result<&InsightClient, AppError> {
    state
        .ai
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("The insight service is not configured"))
}
