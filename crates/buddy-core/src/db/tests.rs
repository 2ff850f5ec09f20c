use super::*;
use crate::error::Error;
use crate::models::{ExpenseUpdate, NewExpense, DEFAULT_MONTHLY_BUDGET};
use chrono::NaiveDate;

fn test_db() -> Database {
    Database::in_memory().unwrap()
}

fn new_expense(category: &str, cost: f64) -> NewExpense {
    NewExpense {
        category: category.to_string(),
        name: None,
        cost,
        created_at: None,
    }
}

fn dated_expense(category: &str, cost: f64, date: &str) -> NewExpense {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    NewExpense {
        category: category.to_string(),
        name: Some(format!("{} purchase", category)),
        cost,
        created_at: Some(day.and_hms_opt(9, 30, 0).unwrap()),
    }
}

#[test]
fn test_create_and_get_user() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "hunter22").unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");

    let fetched = db.get_user(user.id).unwrap().unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.username, "alice");

    let by_name = db.get_user_by_username("alice").unwrap().unwrap();
    assert_eq!(by_name.id, user.id);
}

#[test]
fn test_create_user_trims_and_requires_fields() {
    let db = test_db();
    let user = db.create_user("  bob  ", " bob@example.com ", "pw").unwrap();
    assert_eq!(user.username, "bob");
    assert_eq!(user.email, "bob@example.com");

    let err = db.create_user("", "x@example.com", "pw").unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = db.create_user("carol", "carol@example.com", "").unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_duplicate_username_or_email_conflicts() {
    let db = test_db();
    db.create_user("alice", "alice@example.com", "pw").unwrap();

    let err = db
        .create_user("alice", "other@example.com", "pw")
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let err = db
        .create_user("alice2", "alice@example.com", "pw")
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[test]
fn test_verify_credentials() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "s3cret").unwrap();

    let ok = db.verify_credentials("alice", "s3cret").unwrap().unwrap();
    assert_eq!(ok.id, user.id);

    assert!(db.verify_credentials("alice", "wrong").unwrap().is_none());
    assert!(db.verify_credentials("nobody", "s3cret").unwrap().is_none());
}

#[test]
fn test_password_hash_never_leaves_the_store() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "s3cret").unwrap();

    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("s3cret"));
    assert!(!json.contains("password"));
}

#[test]
fn test_insert_expense_defaults() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "pw").unwrap();

    let expense = db.insert_expense(user.id, &new_expense("Food", 12.5)).unwrap();
    assert_eq!(expense.category, "Food");
    assert_eq!(expense.name, "Unnamed Item");
    assert_eq!(expense.cost, 12.5);
    assert_eq!(expense.user_id, user.id);
}

#[test]
fn test_insert_expense_explicit_date() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "pw").unwrap();

    let expense = db
        .insert_expense(user.id, &dated_expense("Gas", 40.0, "2024-02-14"))
        .unwrap();
    assert_eq!(
        expense.created_at.date_naive(),
        NaiveDate::from_ymd_opt(2024, 2, 14).unwrap()
    );
    assert_eq!(expense.name, "Gas purchase");
}

#[test]
fn test_insert_expense_rejects_invalid() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "pw").unwrap();

    let err = db.insert_expense(user.id, &new_expense("  ", 5.0)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = db.insert_expense(user.id, &new_expense("Food", -1.0)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = db
        .insert_expense(user.id, &new_expense("Food", f64::NAN))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // Nothing should have been stored
    assert!(db.list_expenses(user.id).unwrap().is_empty());
}

#[test]
fn test_list_expenses_chronological() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "pw").unwrap();

    db.insert_expense(user.id, &dated_expense("Gas", 20.0, "2024-01-03"))
        .unwrap();
    db.insert_expense(user.id, &dated_expense("Food", 10.0, "2024-01-01"))
        .unwrap();
    db.insert_expense(user.id, &dated_expense("Food", 5.0, "2024-01-02"))
        .unwrap();

    let expenses = db.list_expenses(user.id).unwrap();
    assert_eq!(expenses.len(), 3);
    assert_eq!(expenses[0].cost, 10.0);
    assert_eq!(expenses[1].cost, 5.0);
    assert_eq!(expenses[2].cost, 20.0);

    let desc = db.list_expenses_desc(user.id).unwrap();
    assert_eq!(desc[0].cost, 20.0);
    assert_eq!(desc[2].cost, 10.0);
}

#[test]
fn test_update_expense_retains_date_when_omitted() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "pw").unwrap();

    let original = db
        .insert_expense(user.id, &dated_expense("Food", 10.0, "2024-01-01"))
        .unwrap();

    let updated = db
        .update_expense(
            user.id,
            original.id,
            &ExpenseUpdate {
                category: "Groceries".to_string(),
                name: Some("Weekly shop".to_string()),
                cost: 42.0,
                created_at: None,
            },
        )
        .unwrap();

    assert_eq!(updated.category, "Groceries");
    assert_eq!(updated.name, "Weekly shop");
    assert_eq!(updated.cost, 42.0);
    assert_eq!(updated.created_at, original.created_at);
}

#[test]
fn test_update_expense_with_new_date() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "pw").unwrap();

    let original = db
        .insert_expense(user.id, &dated_expense("Food", 10.0, "2024-01-01"))
        .unwrap();

    let new_date = NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let updated = db
        .update_expense(
            user.id,
            original.id,
            &ExpenseUpdate {
                category: "Food".to_string(),
                name: None,
                cost: 10.0,
                created_at: Some(new_date),
            },
        )
        .unwrap();

    assert_eq!(
        updated.created_at.date_naive(),
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    );
}

#[test]
fn test_delete_expense() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "pw").unwrap();
    let expense = db.insert_expense(user.id, &new_expense("Food", 10.0)).unwrap();

    db.delete_expense(user.id, expense.id).unwrap();
    assert!(db.get_expense(user.id, expense.id).unwrap().is_none());

    let err = db.delete_expense(user.id, expense.id).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_expenses_are_scoped_to_owner() {
    let db = test_db();
    let alice = db.create_user("alice", "alice@example.com", "pw").unwrap();
    let bob = db.create_user("bob", "bob@example.com", "pw").unwrap();

    let expense = db.insert_expense(alice.id, &new_expense("Food", 10.0)).unwrap();

    // Bob can't see, edit, or delete Alice's expense
    assert!(db.get_expense(bob.id, expense.id).unwrap().is_none());
    assert!(db.list_expenses(bob.id).unwrap().is_empty());

    let err = db
        .update_expense(
            bob.id,
            expense.id,
            &ExpenseUpdate {
                category: "Stolen".to_string(),
                name: None,
                cost: 0.0,
                created_at: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let err = db.delete_expense(bob.id, expense.id).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    // Alice's row is untouched
    let kept = db.get_expense(alice.id, expense.id).unwrap().unwrap();
    assert_eq!(kept.category, "Food");
}

#[test]
fn test_budget_defaults_on_registration() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "pw").unwrap();

    let budget = db.get_or_create_budget(user.id).unwrap();
    assert_eq!(budget.monthly_amount, DEFAULT_MONTHLY_BUDGET);
    assert_eq!(budget.user_id, user.id);
}

#[test]
fn test_set_budget_upserts_single_row() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "pw").unwrap();

    let first = db.get_or_create_budget(user.id).unwrap();
    let updated = db.set_budget(user.id, 3500.0).unwrap();

    assert_eq!(updated.monthly_amount, 3500.0);
    assert_eq!(updated.id, first.id);

    let again = db.set_budget(user.id, 1200.0).unwrap();
    assert_eq!(again.monthly_amount, 1200.0);
    assert_eq!(again.id, first.id);

    let conn = db.conn().unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM budgets WHERE user_id = ?",
            rusqlite::params![user.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_set_budget_rejects_invalid_amounts() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "pw").unwrap();

    assert!(matches!(
        db.set_budget(user.id, 0.0).unwrap_err(),
        Error::Validation(_)
    ));
    assert!(matches!(
        db.set_budget(user.id, -50.0).unwrap_err(),
        Error::Validation(_)
    ));
    assert!(matches!(
        db.set_budget(user.id, f64::INFINITY).unwrap_err(),
        Error::Validation(_)
    ));

    // Default survives the rejected writes
    let budget = db.get_or_create_budget(user.id).unwrap();
    assert_eq!(budget.monthly_amount, DEFAULT_MONTHLY_BUDGET);
}

#[test]
fn test_deleting_user_cascades() {
    let db = test_db();
    let user = db.create_user("alice", "alice@example.com", "pw").unwrap();
    db.insert_expense(user.id, &new_expense("Food", 10.0)).unwrap();
    db.get_or_create_budget(user.id).unwrap();

    let conn = db.conn().unwrap();
    conn.execute("DELETE FROM users WHERE id = ?", rusqlite::params![user.id])
        .unwrap();

    let expense_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM expenses WHERE user_id = ?",
            rusqlite::params![user.id],
            |row| row.get(0),
        )
        .unwrap();
    let budget_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM budgets WHERE user_id = ?",
            rusqlite::params![user.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(expense_count, 0);
    assert_eq!(budget_count, 0);
}

#[test]
fn test_reopen_existing_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("buddy.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::new(path).unwrap();
        db.create_user("alice", "alice@example.com", "pw").unwrap();
        assert_eq!(db.path(), path);
    }

    // Migrations are idempotent and the data survives a reopen
    let db = Database::new(path).unwrap();
    assert!(db.get_user_by_username("alice").unwrap().is_some());
}

#[test]
fn test_parse_datetime_fallback() {
    let parsed = parse_datetime("2024-01-15 10:30:00");
    assert_eq!(
        parsed.date_naive(),
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    );

    // Garbage falls back to "now" rather than panicking
    let fallback = parse_datetime("not a date");
    assert!(fallback <= Utc::now());
}
