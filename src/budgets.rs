use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{budget_reports, BudgetReport};
use crate::error::{AppError, Result};
use crate::models::{Budget, BudgetInput, Transaction};
use crate::storage::{read_list, write_list, KeyValueStore, Owner};
use crate::utils::{generate_id, now_iso};

/// Categories offered when creating a budget.
pub const BUDGET_CATEGORIES: [&str; 10] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Education",
    "Travel",
    "Personal Care",
    "Other",
];

pub const DEFAULT_ALERT_THRESHOLD: u8 = 80;

pub fn get_budgets(store: &dyn KeyValueStore, owner: &Owner) -> Result<Vec<Budget>> {
    read_list(store, &owner.budgets_key())
}

pub fn add_budget(store: &dyn KeyValueStore, owner: &Owner, input: BudgetInput) -> Result<Vec<Budget>> {
    validate(&input)?;
    let mut budgets = get_budgets(store, owner)?;

    // Uniqueness is only checked here; imports may still bring duplicates.
    if budgets.iter().any(|b| b.category == input.category) {
        log::warn!("Budget for '{}' already exists", input.category);
        return Err(AppError::Duplicate("A budget already exists for this category".to_string()));
    }

    let now = now_iso();
    let budget = Budget {
        id: generate_id(budgets.iter().map(|b| b.id.as_str())),
        category: input.category,
        amount: input.amount,
        period: input.period,
        alert_threshold: input.alert_threshold,
        notes: input.notes.trim().to_string(),
        created_at: now.clone(),
        updated_at: now,
    };
    log::info!("Added {} budget {} for '{}'", budget.period, budget.id, budget.category);
    budgets.push(budget);
    write_list(store, &owner.budgets_key(), &budgets)?;
    Ok(budgets)
}

/// Replace a budget's editable fields, keeping its id and creation time.
pub fn update_budget(
    store: &dyn KeyValueStore,
    owner: &Owner,
    id: &str,
    input: BudgetInput,
) -> Result<Vec<Budget>> {
    validate(&input)?;
    let mut budgets = get_budgets(store, owner)?;
    let budget = budgets
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Budget with id {}", id)))?;

    budget.category = input.category;
    budget.amount = input.amount;
    budget.period = input.period;
    budget.alert_threshold = input.alert_threshold;
    budget.notes = input.notes.trim().to_string();
    budget.updated_at = now_iso();

    write_list(store, &owner.budgets_key(), &budgets)?;
    log::info!("Updated budget {}", id);
    Ok(budgets)
}

pub fn delete_budget(store: &dyn KeyValueStore, owner: &Owner, id: &str) -> Result<Vec<Budget>> {
    let mut budgets = get_budgets(store, owner)?;
    let removed = budgets
        .iter()
        .position(|b| b.id == id)
        .map(|index| budgets.remove(index))
        .ok_or_else(|| AppError::NotFound(format!("Budget with id {}", id)))?;

    write_list(store, &owner.budgets_key(), &budgets)?;
    log::info!("Deleted budget: id={}, category={}", removed.id, removed.category);
    Ok(budgets)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverview {
    pub total_budget: f64,
    pub total_spent: f64,
    pub budgets: Vec<BudgetReport>,
}

pub fn summarize_budgets(budgets: &[Budget], transactions: &[Transaction], today: NaiveDate) -> BudgetOverview {
    let reports = budget_reports(budgets, transactions, today);
    BudgetOverview {
        total_budget: budgets.iter().map(|b| b.amount).sum(),
        total_spent: reports.iter().map(|r| r.status.spent).sum(),
        budgets: reports,
    }
}

fn validate(input: &BudgetInput) -> Result<()> {
    if input.category.trim().is_empty() {
        return Err(AppError::validation("Please fill in all required fields"));
    }
    if !BUDGET_CATEGORIES.contains(&input.category.as_str()) {
        return Err(AppError::validation(format!(
            "Unknown budget category '{}' (expected one of: {})",
            input.category,
            BUDGET_CATEGORIES.join(", ")
        )));
    }
    if !(input.amount.is_finite() && input.amount > 0.0) {
        return Err(AppError::validation("Budget amount must be greater than zero"));
    }
    if input.alert_threshold > 100 {
        return Err(AppError::validation("Alert threshold must be between 0 and 100"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::BudgetHealth;
    use crate::models::{BudgetPeriod, TransactionType};
    use crate::storage::SqliteStore;

    fn input(category: &str, amount: f64) -> BudgetInput {
        BudgetInput {
            category: category.to_string(),
            amount,
            period: BudgetPeriod::Monthly,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            notes: String::new(),
        }
    }

    #[test]
    fn add_rejects_duplicate_category() {
        let store = SqliteStore::open_in_memory().unwrap();
        let owner = Owner::Guest;
        add_budget(&store, &owner, input("Travel", 500.0)).unwrap();
        let err = add_budget(&store, &owner, input("Travel", 100.0)).unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
        assert_eq!(get_budgets(&store, &owner).unwrap().len(), 1);
    }

    #[test]
    fn add_validates_form() {
        let store = SqliteStore::open_in_memory().unwrap();
        let owner = Owner::Guest;
        assert!(add_budget(&store, &owner, input("", 10.0)).is_err());
        assert!(add_budget(&store, &owner, input("Groceries", 10.0)).is_err());
        assert!(add_budget(&store, &owner, input("Travel", 0.0)).is_err());

        let mut too_high = input("Travel", 10.0);
        too_high.alert_threshold = 101;
        assert!(add_budget(&store, &owner, too_high).is_err());
        assert!(get_budgets(&store, &owner).unwrap().is_empty());
    }

    #[test]
    fn update_keeps_identity() {
        let store = SqliteStore::open_in_memory().unwrap();
        let owner = Owner::Guest;
        let created = add_budget(&store, &owner, input("Travel", 500.0)).unwrap().remove(0);

        let mut change = input("Travel", 650.0);
        change.period = BudgetPeriod::Yearly;
        change.notes = " summer trip ".to_string();
        let updated = update_budget(&store, &owner, &created.id, change).unwrap().remove(0);

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.amount, 650.0);
        assert_eq!(updated.period, BudgetPeriod::Yearly);
        assert_eq!(updated.notes, "summer trip");
    }

    #[test]
    fn delete_missing_budget_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        let owner = Owner::Guest;
        let id = add_budget(&store, &owner, input("Travel", 500.0)).unwrap()[0].id.clone();
        assert!(delete_budget(&store, &owner, &id).unwrap().is_empty());
        assert!(matches!(delete_budget(&store, &owner, &id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn summary_totals() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let budgets = vec![
            Budget {
                id: "1".to_string(),
                category: "Travel".to_string(),
                amount: 300.0,
                period: BudgetPeriod::Monthly,
                alert_threshold: 80,
                notes: String::new(),
                created_at: String::new(),
                updated_at: String::new(),
            },
            Budget {
                id: "2".to_string(),
                category: "Shopping".to_string(),
                amount: 200.0,
                period: BudgetPeriod::Monthly,
                alert_threshold: 50,
                notes: String::new(),
                created_at: String::new(),
                updated_at: String::new(),
            },
        ];
        let transactions = vec![
            Transaction {
                id: "t1".to_string(),
                transaction_type: TransactionType::Expense,
                amount: 120.0,
                category: "Shopping".to_string(),
                description: String::new(),
                date: today,
            },
            Transaction {
                id: "t2".to_string(),
                transaction_type: TransactionType::Income,
                amount: 999.0,
                category: "Travel".to_string(),
                description: String::new(),
                date: today,
            },
        ];

        let summary = summarize_budgets(&budgets, &transactions, today);
        assert_eq!(summary.total_budget, 500.0);
        assert_eq!(summary.total_spent, 120.0);
        assert_eq!(summary.budgets[0].status.status, BudgetHealth::Good);
        assert_eq!(summary.budgets[1].status.status, BudgetHealth::Warning);
    }
}
