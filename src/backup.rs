use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use rusqlite::{Connection, DatabaseName, OpenFlags};
use serde::Serialize;

use crate::error::Result;
use crate::models::{Budget, ExportDocument, Session, Transaction};
use crate::storage::{read_list, remove_owner_data, write_list, KeyValueStore, Owner};
use crate::utils::{now_iso, verify_schema};

#[derive(Debug, Serialize)]
pub struct BackupInfo {
    pub timestamp: String,
    pub file_size: u64,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub transactions: Option<usize>,
    pub budgets: Option<usize>,
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("budget-tracker-export-{}.json", today.format("%Y-%m-%d"))
}

pub fn export_data(store: &dyn KeyValueStore, owner: &Owner, user: Option<Session>) -> Result<ExportDocument> {
    let transactions: Vec<Transaction> = read_list(store, &owner.transactions_key())?;
    let budgets: Vec<Budget> = read_list(store, &owner.budgets_key())?;
    Ok(ExportDocument {
        transactions: Some(transactions),
        budgets: Some(budgets),
        user,
        export_date: Some(now_iso()),
    })
}

/// Write the export as pretty JSON; a directory target gets the default
/// dated file name.
pub fn write_export(document: &ExportDocument, target: &Path) -> Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(export_file_name(Local::now().date_naive()))
    } else {
        target.to_path_buf()
    };
    fs::write(&path, serde_json::to_string_pretty(document)?)?;
    log::info!("Exported data to {}", path.display());
    Ok(path)
}

/// Overwrite the owner's lists with whatever the document carries.
/// Lists absent from the document are left alone; nothing is merged.
pub fn import_data(store: &dyn KeyValueStore, owner: &Owner, document: &ExportDocument) -> Result<ImportSummary> {
    if let Some(transactions) = &document.transactions {
        write_list(store, &owner.transactions_key(), transactions)?;
    }
    if let Some(budgets) = &document.budgets {
        write_list(store, &owner.budgets_key(), budgets)?;
    }
    let summary = ImportSummary {
        transactions: document.transactions.as_ref().map(Vec::len),
        budgets: document.budgets.as_ref().map(Vec::len),
    };
    log::info!("Imported {:?} for {:?}", summary, owner);
    Ok(summary)
}

pub fn import_file(store: &dyn KeyValueStore, owner: &Owner, path: &Path) -> Result<ImportSummary> {
    let content = fs::read_to_string(path)?;
    let document: ExportDocument = serde_json::from_str(&content)?;
    import_data(store, owner, &document)
}

pub fn clear_data(store: &dyn KeyValueStore, owner: &Owner) -> Result<()> {
    remove_owner_data(store, owner)?;
    log::info!("Cleared financial data for {:?}", owner);
    Ok(())
}

/// Snapshot the whole store next to `save_path` with a timestamp suffix.
pub fn backup_database(conn: &Connection, save_path: &Path) -> Result<BackupInfo> {
    verify_schema(conn)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let save = save_path.to_string_lossy();
    let backup_path = if save.ends_with(".db") {
        PathBuf::from(format!("{}_{}.db", save.trim_end_matches(".db"), timestamp))
    } else {
        PathBuf::from(format!("{}_{}.db", save, timestamp))
    };

    conn.backup(DatabaseName::Main, &backup_path, None)?;
    let file_size = fs::metadata(&backup_path)?.len();
    log::info!("Backed up store to {} ({} bytes)", backup_path.display(), file_size);

    Ok(BackupInfo { timestamp, file_size, path: backup_path })
}

/// Replace the store file at `db_path` with `file_path`.
///
/// The source is checked before anything is touched, and the current store
/// is kept aside until the copy has been verified.
pub fn restore_database(db_path: &Path, file_path: &Path) -> Result<()> {
    {
        let source = Connection::open_with_flags(file_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        verify_schema(&source)?;
    }

    let aside = db_path.exists().then(|| {
        PathBuf::from(format!(
            "{}.backup_{}",
            db_path.to_string_lossy(),
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    });
    if let Some(aside) = &aside {
        fs::copy(db_path, aside)?;
    }

    let restored = (|| -> Result<()> {
        fs::copy(file_path, db_path)?;
        let conn = Connection::open(db_path)?;
        verify_schema(&conn)
    })();

    match (restored, aside) {
        (Ok(()), Some(aside)) => {
            fs::remove_file(aside)?;
            log::info!("Restored store from {}", file_path.display());
            Ok(())
        }
        (Ok(()), None) => Ok(()),
        (Err(e), Some(aside)) => {
            let _ = fs::copy(&aside, db_path);
            let _ = fs::remove_file(&aside);
            log::warn!("Restore from {} failed, previous store kept: {}", file_path.display(), e);
            Err(e)
        }
        (Err(e), None) => {
            let _ = fs::remove_file(db_path);
            log::warn!("Restore from {} failed: {}", file_path.display(), e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetPeriod, TransactionType};
    use crate::storage::{SqliteStore, StorageArea, LEGACY_TRANSACTIONS_KEY};

    fn sample_transactions() -> Vec<Transaction> {
        (1..=3)
            .map(|day| Transaction {
                id: format!("t{}", day),
                transaction_type: if day == 1 { TransactionType::Income } else { TransactionType::Expense },
                amount: 100.0 * day as f64,
                category: "Other".to_string(),
                description: format!("entry {}", day),
                date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            })
            .collect()
    }

    fn sample_budget() -> Budget {
        Budget {
            id: "b1".to_string(),
            category: "Other".to_string(),
            amount: 250.0,
            period: BudgetPeriod::Weekly,
            alert_threshold: 90,
            notes: "misc".to_string(),
            created_at: "2024-06-01T00:00:00.000Z".to_string(),
            updated_at: "2024-06-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn export_then_import_reproduces_lists() {
        let source = SqliteStore::open_in_memory().unwrap();
        let owner = Owner::User("a@b.co".to_string());
        write_list(&source, &owner.transactions_key(), &sample_transactions()).unwrap();
        write_list(&source, &owner.budgets_key(), &[sample_budget()]).unwrap();

        let document = export_data(&source, &owner, None).unwrap();
        let json = serde_json::to_string_pretty(&document).unwrap();

        let target = SqliteStore::open_in_memory().unwrap();
        let parsed: ExportDocument = serde_json::from_str(&json).unwrap();
        let summary = import_data(&target, &owner, &parsed).unwrap();
        assert_eq!(summary, ImportSummary { transactions: Some(3), budgets: Some(1) });

        let transactions: Vec<Transaction> = read_list(&target, &owner.transactions_key()).unwrap();
        let budgets: Vec<Budget> = read_list(&target, &owner.budgets_key()).unwrap();
        assert_eq!(transactions, sample_transactions());
        assert_eq!(budgets, vec![sample_budget()]);
    }

    #[test]
    fn import_overwrites_without_merging() {
        let store = SqliteStore::open_in_memory().unwrap();
        let owner = Owner::Guest;
        write_list(&store, &owner.transactions_key(), &sample_transactions()).unwrap();
        write_list(&store, &owner.budgets_key(), &[sample_budget()]).unwrap();

        let document: ExportDocument =
            serde_json::from_str(r#"{"transactions":[{"id":"x","type":"income","amount":5,"category":"Gift","date":"2024-01-02"}]}"#)
                .unwrap();
        let summary = import_data(&store, &owner, &document).unwrap();
        assert_eq!(summary.budgets, None);

        let transactions: Vec<Transaction> = read_list(&store, &owner.transactions_key()).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].id, "x");
        // budgets were not in the document
        assert_eq!(read_list::<Budget>(&store, &owner.budgets_key()).unwrap().len(), 1);
    }

    #[test]
    fn export_document_shape() {
        let store = SqliteStore::open_in_memory().unwrap();
        let document = export_data(&store, &Owner::Guest, None).unwrap();
        let value = serde_json::to_value(&document).unwrap();
        assert!(value["transactions"].as_array().unwrap().is_empty());
        assert!(value["budgets"].as_array().unwrap().is_empty());
        assert!(value["user"].is_null());
        assert!(value["exportDate"].is_string());
    }

    #[test]
    fn clear_data_only_touches_owner_lists() {
        let store = SqliteStore::open_in_memory().unwrap();
        let owner = Owner::Guest;
        write_list(&store, &owner.transactions_key(), &sample_transactions()).unwrap();
        write_list(&store, LEGACY_TRANSACTIONS_KEY, &sample_transactions()).unwrap();

        clear_data(&store, &owner).unwrap();
        assert!(store.get_item(StorageArea::Local, &owner.transactions_key()).unwrap().is_none());
        assert!(store.get_item(StorageArea::Local, LEGACY_TRANSACTIONS_KEY).unwrap().is_some());
    }

    #[test]
    fn export_file_name_is_dated() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(export_file_name(day), "budget-tracker-export-2024-06-05.json");
    }
}
