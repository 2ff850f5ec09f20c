//! Budget Buddy Core Library
//!
//! Shared functionality for the Budget Buddy expense tracker:
//! - Database access and migrations (users, expenses, budgets)
//! - Spending aggregation (category totals, daily/weekly/monthly buckets)
//! - Insight prompt assembly for the AI advisor
//! - Perplexity gateway with response sanitization

pub mod ai;
pub mod db;
pub mod error;
pub mod insight;
pub mod models;
pub mod stats;

/// Test utilities including the mock completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    Completion, GatewayError, GatewayResult, InsightBackend, InsightClient, MockBackend,
    MockFailure, PerplexityBackend,
};
pub use db::Database;
pub use error::{Error, Result};
pub use insight::InsightRequest;
pub use models::{Budget, Expense, ExpenseUpdate, NewExpense, User};
pub use stats::SpendingStats;
