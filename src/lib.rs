pub mod analytics;
pub mod auth;
pub mod backup;
pub mod budgets;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod settings;
pub mod storage;
pub mod transactions;
pub mod utils;

// Re-export specific types from models
pub use models::{Budget, BudgetPeriod, ExportDocument, Session, Transaction, TransactionType, User};

pub use error::{AppError, Result};
pub use storage::{KeyValueStore, Owner, SqliteStore, StorageArea};

// Re-export utility functions
pub use utils::{get_db_path, init_db, reset_database};

// Re-export transaction functions
pub use transactions::{
    create_transaction, delete_transaction, get_transactions, list_transactions, update_transaction,
};

// Re-export budget functions
pub use budgets::{add_budget, delete_budget, get_budgets, summarize_budgets, update_budget};

// Re-export backup functions
pub use backup::{backup_database, clear_data, export_data, import_data, restore_database};

use cli::{Cli, Command};
use commands::Context;
use config::Config;

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?.with_data_dir(cli.data_dir);
    let db_path = config.db_path()?;
    log::debug!("Using store at {}", db_path.display());

    // Both replace the store file, so they run before it is opened.
    match &cli.command {
        Command::Restore { file } => {
            restore_database(&db_path, file)?;
            println!("Store restored from {}", file.display());
            return Ok(());
        }
        Command::Reset { yes } => {
            if !yes {
                return Err(AppError::validation("Refusing to reset the store without --yes"));
            }
            reset_database(&db_path)?;
            println!("Store reset at {}", db_path.display());
            return Ok(());
        }
        _ => {}
    }

    let store = SqliteStore::open(&db_path)?;
    auth::ensure_demo_user(&store)?;

    let ctx = Context { store: &store, config: &config, db_path: &db_path, json: cli.json };
    commands::execute(cli.command, &ctx)
}
