//! Command-line argument parsing.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::analytics::TimeRange;
use crate::budgets::DEFAULT_ALERT_THRESHOLD;
use crate::models::{BudgetPeriod, TransactionType};

/// Local-first personal budget tracker.
///
/// Examples:
///   budget-tracker login --email test@example.com --password password123 --remember
///   budget-tracker tx add --type expense --amount 12.50 --category "Food & Dining"
///   budget-tracker analytics --range 3months --json
///   budget-tracker export --out ~/Downloads
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the store file
    #[arg(long, global = true, value_name = "DIR", env = "BUDGET_TRACKER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for config.toml in the user config directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },

    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Keep the login across restarts
        #[arg(long)]
        remember: bool,
    },

    Logout,

    /// Show the logged-in user
    Whoami,

    /// Change name or email of the logged-in user
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Change the logged-in user's password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },

    /// Delete the logged-in user and all of their data
    DeleteAccount {
        #[arg(long)]
        yes: bool,
    },

    /// Manage transactions
    #[command(subcommand)]
    Tx(TxCommand),

    /// Manage budgets
    #[command(subcommand)]
    Budget(BudgetCommand),

    /// Statistics, trends and breakdowns over a look-back window
    Analytics {
        /// 30days, 3months, 6months or 1year (default from config)
        #[arg(long)]
        range: Option<TimeRange>,
        #[command(flatten)]
        day: DayArg,
    },

    /// Current month summary with budget status
    Overview {
        #[command(flatten)]
        day: DayArg,
    },

    /// Show or change notification and display settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Write transactions and budgets to a JSON file
    Export {
        /// Target file or directory (default: current directory)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Replace transactions and budgets with those in a JSON export
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Remove all transactions and budgets of the current user
    Clear {
        #[arg(long)]
        yes: bool,
    },

    /// Copy the whole store file with a timestamp suffix
    Snapshot {
        /// Base file name (default: next to the store)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Replace the store file with a snapshot
    Restore {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete the store file and start empty
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

/// Reference day for period and window calculations.
#[derive(Args, Debug, Clone, Copy)]
pub struct DayArg {
    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    Add {
        #[arg(long = "type", value_name = "TYPE")]
        transaction_type: TransactionType,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Defaults to today
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,
    },

    /// List transactions, newest first
    List {
        #[arg(long = "type", value_name = "TYPE")]
        transaction_type: Option<TransactionType>,
        #[arg(long)]
        category: Option<String>,
    },

    /// Change fields of a transaction; omitted fields keep their value
    Edit {
        id: String,
        #[arg(long = "type", value_name = "TYPE")]
        transaction_type: Option<TransactionType>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,
    },

    Rm {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    Add {
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "monthly")]
        period: BudgetPeriod,
        /// Percentage of the budget at which a warning is shown
        #[arg(long, default_value_t = DEFAULT_ALERT_THRESHOLD)]
        alert_threshold: u8,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List budgets with spending in their current period
    List {
        #[command(flatten)]
        day: DayArg,
    },

    /// Change fields of a budget; omitted fields keep their value
    Edit {
        id: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        period: Option<BudgetPeriod>,
        #[arg(long)]
        alert_threshold: Option<u8>,
        #[arg(long)]
        notes: Option<String>,
    },

    Rm {
        id: String,
    },

    /// Print the categories a budget can be created for
    Categories,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,

    Notifications {
        #[arg(long)]
        email_notifications: Option<bool>,
        #[arg(long)]
        budget_alerts: Option<bool>,
        #[arg(long)]
        weekly_reports: Option<bool>,
        #[arg(long)]
        monthly_reports: Option<bool>,
        #[arg(long)]
        transaction_alerts: Option<bool>,
    },

    Preferences {
        #[arg(long)]
        dark_mode: Option<bool>,
        #[arg(long)]
        compact_view: Option<bool>,
        #[arg(long)]
        show_decimals: Option<bool>,
        #[arg(long)]
        date_format: Option<String>,
        #[arg(long)]
        start_of_week: Option<String>,
    },
}
