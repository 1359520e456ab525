use crate::error::{AppError, Result};
use crate::models::{Transaction, TransactionInput, TransactionType};
use crate::storage::{read_list, write_list, KeyValueStore, Owner};
use crate::utils::generate_id;

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
}

/// Stored order, which is insertion order.
pub fn get_transactions(store: &dyn KeyValueStore, owner: &Owner) -> Result<Vec<Transaction>> {
    let transactions = read_list(store, &owner.transactions_key())?;
    log::debug!("Loaded {} transactions for {:?}", transactions.len(), owner);
    Ok(transactions)
}

/// Newest first; same-day entries keep stored order.
pub fn list_transactions(
    store: &dyn KeyValueStore,
    owner: &Owner,
    filter: &TransactionFilter,
) -> Result<Vec<Transaction>> {
    let mut transactions: Vec<Transaction> = get_transactions(store, owner)?
        .into_iter()
        .filter(|t| filter.transaction_type.map_or(true, |kind| t.transaction_type == kind))
        .filter(|t| filter.category.as_deref().map_or(true, |c| t.category == c))
        .collect();
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(transactions)
}

pub fn create_transaction(
    store: &dyn KeyValueStore,
    owner: &Owner,
    input: TransactionInput,
) -> Result<Vec<Transaction>> {
    validate(&input)?;
    let mut transactions = get_transactions(store, owner)?;
    let transaction = Transaction {
        id: generate_id(transactions.iter().map(|t| t.id.as_str())),
        transaction_type: input.transaction_type,
        amount: input.amount,
        category: input.category.trim().to_string(),
        description: input.description.trim().to_string(),
        date: input.date,
    };
    log::info!(
        "Created {} transaction {} ({} {})",
        transaction.transaction_type,
        transaction.id,
        transaction.amount,
        transaction.category
    );
    transactions.push(transaction);
    write_list(store, &owner.transactions_key(), &transactions)?;
    Ok(transactions)
}

pub fn update_transaction(
    store: &dyn KeyValueStore,
    owner: &Owner,
    id: &str,
    input: TransactionInput,
) -> Result<Vec<Transaction>> {
    validate(&input)?;
    let mut transactions = get_transactions(store, owner)?;
    let existing = transactions
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Transaction {}", id)))?;

    existing.transaction_type = input.transaction_type;
    existing.amount = input.amount;
    existing.category = input.category.trim().to_string();
    existing.description = input.description.trim().to_string();
    existing.date = input.date;

    write_list(store, &owner.transactions_key(), &transactions)?;
    log::info!("Updated transaction {}", id);
    Ok(transactions)
}

pub fn delete_transaction(store: &dyn KeyValueStore, owner: &Owner, id: &str) -> Result<Vec<Transaction>> {
    let mut transactions = get_transactions(store, owner)?;
    let before = transactions.len();
    transactions.retain(|t| t.id != id);
    if transactions.len() == before {
        return Err(AppError::NotFound(format!("Transaction {}", id)));
    }
    write_list(store, &owner.transactions_key(), &transactions)?;
    log::info!("Deleted transaction {}", id);
    Ok(transactions)
}

fn validate(input: &TransactionInput) -> Result<()> {
    if !(input.amount.is_finite() && input.amount > 0.0) {
        return Err(AppError::validation("Amount must be greater than zero"));
    }
    if input.category.trim().is_empty() {
        return Err(AppError::validation("Please fill in all required fields"));
    }
    Ok(())
}
