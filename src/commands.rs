//! Dispatch of parsed commands onto the library and text rendering of
//! their results.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::analytics::{analytics_report, overview, AnalyticsReport, BudgetReport, Overview, TimeRange};
use crate::auth::{self, ProfileUpdate, Registration};
use crate::backup;
use crate::budgets::{self, BUDGET_CATEGORIES};
use crate::cli::{BudgetCommand, Command, DayArg, SettingsCommand, TxCommand};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Budget, BudgetInput, Transaction, TransactionInput};
use crate::settings;
use crate::storage::{KeyValueStore, Owner, SqliteStore};
use crate::transactions::{self, TransactionFilter};

pub struct Context<'a> {
    pub store: &'a SqliteStore,
    pub config: &'a Config,
    pub db_path: &'a Path,
    pub json: bool,
}

impl Context<'_> {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

fn today(day: DayArg) -> NaiveDate {
    day.today.unwrap_or_else(|| Local::now().date_naive())
}

fn confirm(yes: bool, what: &str) -> Result<()> {
    if yes {
        Ok(())
    } else {
        Err(AppError::validation(format!("Refusing to {} without --yes", what)))
    }
}

pub fn execute(command: Command, ctx: &Context) -> Result<()> {
    let store: &dyn KeyValueStore = ctx.store;
    match command {
        Command::Register { name, email, password, confirm_password } => {
            let session = auth::register(
                store,
                Registration { full_name: name, email, password, confirm_password },
            )?;
            ctx.emit(&session, || format!("Welcome, {}!", session.full_name))
        }
        Command::Login { email, password, remember } => {
            let session = auth::login(store, &email, &password, remember)?;
            ctx.emit(&session, || format!("Logged in as {} <{}>", session.full_name, session.email))
        }
        Command::Logout => {
            auth::logout(store)?;
            ctx.emit(&serde_json::json!({ "loggedOut": true }), || "Logged out".to_string())
        }
        Command::Whoami => {
            let session = auth::current_session(store)?;
            ctx.emit(&session, || match &session {
                Some(s) => format!("{} <{}> (since {})", s.full_name, s.email, s.login_time),
                None => "Not logged in; working on guest data".to_string(),
            })
        }
        Command::Profile { name, email } => {
            let session = auth::update_profile(store, ProfileUpdate { full_name: name, email })?;
            ctx.emit(&session, || format!("Profile updated: {} <{}>", session.full_name, session.email))
        }
        Command::Password { current, new, confirm } => {
            auth::change_password(store, &current, &new, &confirm)?;
            ctx.emit(&serde_json::json!({ "changed": true }), || "Password changed successfully!".to_string())
        }
        Command::DeleteAccount { yes } => {
            confirm(yes, "delete the account")?;
            auth::delete_account(store)?;
            ctx.emit(&serde_json::json!({ "deleted": true }), || "Account deleted".to_string())
        }
        Command::Tx(action) => execute_tx(action, ctx),
        Command::Budget(action) => execute_budget(action, ctx),
        Command::Analytics { range, day } => {
            let owner = auth::current_owner(store)?;
            let range: TimeRange = range.unwrap_or(ctx.config.analytics.default_range);
            let transactions = transactions::get_transactions(store, &owner)?;
            let report = analytics_report(&transactions, range.window(today(day)), ctx.config.analytics.daily_days);
            ctx.emit(&report, || render_report(range, &report))
        }
        Command::Overview { day } => {
            let owner = auth::current_owner(store)?;
            let transactions = transactions::get_transactions(store, &owner)?;
            let budgets = budgets::get_budgets(store, &owner)?;
            let view = overview(&transactions, &budgets, today(day));
            ctx.emit(&view, || render_overview(&view))
        }
        Command::Settings(action) => execute_settings(action, ctx),
        Command::Export { out } => {
            let session = auth::current_session(store)?;
            let owner = Owner::from_session(session.as_ref());
            let document = backup::export_data(store, &owner, session)?;
            let path = backup::write_export(&document, &out.unwrap_or_else(|| PathBuf::from(".")))?;
            ctx.emit(&serde_json::json!({ "path": &path }), || format!("Exported to {}", path.display()))
        }
        Command::Import { file } => {
            let owner = auth::current_owner(store)?;
            let summary = backup::import_file(store, &owner, &file).map_err(|e| match e {
                AppError::Json(source) => AppError::validation(format!(
                    "Error importing data. Please check the file format. ({})",
                    source
                )),
                other => other,
            })?;
            ctx.emit(&summary, || {
                format!(
                    "Data imported successfully! ({} transactions, {} budgets)",
                    count_or_kept(summary.transactions),
                    count_or_kept(summary.budgets)
                )
            })
        }
        Command::Clear { yes } => {
            confirm(yes, "clear all data")?;
            let owner = auth::current_owner(store)?;
            backup::clear_data(store, &owner)?;
            ctx.emit(&serde_json::json!({ "cleared": true }), || "All data has been cleared".to_string())
        }
        Command::Snapshot { out } => {
            let target = out.unwrap_or_else(|| ctx.db_path.to_path_buf());
            let info = backup::backup_database(ctx.store.connection(), &target)?;
            ctx.emit(&info, || format!("Snapshot written to {} ({} bytes)", info.path.display(), info.file_size))
        }
        Command::Restore { .. } | Command::Reset { .. } => Err(AppError::validation(
            "restore and reset must run before the store is opened",
        )),
    }
}

fn count_or_kept(count: Option<usize>) -> String {
    count.map_or_else(|| "unchanged".to_string(), |n| n.to_string())
}

fn execute_tx(action: TxCommand, ctx: &Context) -> Result<()> {
    let store: &dyn KeyValueStore = ctx.store;
    let owner = auth::current_owner(store)?;
    match action {
        TxCommand::Add { transaction_type, amount, category, description, date } => {
            let input = TransactionInput {
                transaction_type,
                amount,
                category,
                description,
                date: date.unwrap_or_else(|| Local::now().date_naive()),
            };
            let all = transactions::create_transaction(store, &owner, input)?;
            let created = all.last();
            ctx.emit(&created, || match created {
                Some(t) => format!("Transaction added successfully! ({})", t.id),
                None => String::new(),
            })
        }
        TxCommand::List { transaction_type, category } => {
            let filter = TransactionFilter { transaction_type, category };
            let list = transactions::list_transactions(store, &owner, &filter)?;
            ctx.emit(&list, || render_transactions(&list))
        }
        TxCommand::Edit { id, transaction_type, amount, category, description, date } => {
            let existing = transactions::get_transactions(store, &owner)?
                .into_iter()
                .find(|t| t.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Transaction {}", id)))?;
            let input = TransactionInput {
                transaction_type: transaction_type.unwrap_or(existing.transaction_type),
                amount: amount.unwrap_or(existing.amount),
                category: category.unwrap_or(existing.category),
                description: description.unwrap_or(existing.description),
                date: date.unwrap_or(existing.date),
            };
            let all = transactions::update_transaction(store, &owner, &id, input)?;
            let updated = all.iter().find(|t| t.id == id);
            ctx.emit(&updated, || "Transaction updated successfully!".to_string())
        }
        TxCommand::Rm { id } => {
            let remaining = transactions::delete_transaction(store, &owner, &id)?;
            ctx.emit(&serde_json::json!({ "deleted": id, "remaining": remaining.len() }), || {
                "Transaction deleted successfully!".to_string()
            })
        }
    }
}

fn execute_budget(action: BudgetCommand, ctx: &Context) -> Result<()> {
    let store: &dyn KeyValueStore = ctx.store;
    let owner = auth::current_owner(store)?;
    match action {
        BudgetCommand::Add { category, amount, period, alert_threshold, notes } => {
            let input = BudgetInput { category, amount, period, alert_threshold, notes };
            let all = budgets::add_budget(store, &owner, input)?;
            let created = all.last();
            ctx.emit(&created, || match created {
                Some(b) => format!("Budget created successfully! ({})", b.id),
                None => String::new(),
            })
        }
        BudgetCommand::List { day } => {
            let budgets = budgets::get_budgets(store, &owner)?;
            let transactions = transactions::get_transactions(store, &owner)?;
            let summary = budgets::summarize_budgets(&budgets, &transactions, today(day));
            ctx.emit(&summary, || {
                let mut out = render_budget_reports(&summary.budgets);
                out.push_str(&format!(
                    "\nTotal budget {:.2}, spent {:.2}",
                    summary.total_budget, summary.total_spent
                ));
                out
            })
        }
        BudgetCommand::Edit { id, category, amount, period, alert_threshold, notes } => {
            let existing: Budget = budgets::get_budgets(store, &owner)?
                .into_iter()
                .find(|b| b.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Budget with id {}", id)))?;
            let input = BudgetInput {
                category: category.unwrap_or(existing.category),
                amount: amount.unwrap_or(existing.amount),
                period: period.unwrap_or(existing.period),
                alert_threshold: alert_threshold.unwrap_or(existing.alert_threshold),
                notes: notes.unwrap_or(existing.notes),
            };
            let all = budgets::update_budget(store, &owner, &id, input)?;
            let updated = all.iter().find(|b| b.id == id);
            ctx.emit(&updated, || "Budget updated successfully!".to_string())
        }
        BudgetCommand::Rm { id } => {
            let remaining = budgets::delete_budget(store, &owner, &id)?;
            ctx.emit(&serde_json::json!({ "deleted": id, "remaining": remaining.len() }), || {
                "Budget deleted successfully!".to_string()
            })
        }
        BudgetCommand::Categories => ctx.emit(&BUDGET_CATEGORIES, || BUDGET_CATEGORIES.join("\n")),
    }
}

fn execute_settings(action: SettingsCommand, ctx: &Context) -> Result<()> {
    let store: &dyn KeyValueStore = ctx.store;
    match action {
        SettingsCommand::Show => {
            let notifications = settings::get_notifications(store)?;
            let preferences = settings::get_preferences(store)?;
            let both = serde_json::json!({ "notifications": &notifications, "preferences": &preferences });
            ctx.emit(&both, || format!("{:#?}\n{:#?}", notifications, preferences))
        }
        SettingsCommand::Notifications {
            email_notifications,
            budget_alerts,
            weekly_reports,
            monthly_reports,
            transaction_alerts,
        } => {
            let mut current = settings::get_notifications(store)?;
            apply(&mut current.email_notifications, email_notifications);
            apply(&mut current.budget_alerts, budget_alerts);
            apply(&mut current.weekly_reports, weekly_reports);
            apply(&mut current.monthly_reports, monthly_reports);
            apply(&mut current.transaction_alerts, transaction_alerts);
            settings::save_notifications(store, &current)?;
            ctx.emit(&current, || "Notification preferences saved!".to_string())
        }
        SettingsCommand::Preferences { dark_mode, compact_view, show_decimals, date_format, start_of_week } => {
            let mut current = settings::get_preferences(store)?;
            apply(&mut current.dark_mode, dark_mode);
            apply(&mut current.compact_view, compact_view);
            apply(&mut current.show_decimals, show_decimals);
            apply(&mut current.date_format, date_format);
            apply(&mut current.start_of_week, start_of_week);
            settings::save_preferences(store, &current)?;
            ctx.emit(&current, || "Preferences saved!".to_string())
        }
    }
}

fn apply<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn render_transactions(list: &[Transaction]) -> String {
    if list.is_empty() {
        return "No transactions".to_string();
    }
    list.iter()
        .map(|t| {
            let sign = if t.is_income() { '+' } else { '-' };
            format!(
                "{}  {}  {}{:>10.2}  {:<18} {}",
                t.id,
                t.date.format("%Y-%m-%d"),
                sign,
                t.amount,
                t.category,
                t.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_budget_reports(reports: &[BudgetReport]) -> String {
    if reports.is_empty() {
        return "No budgets".to_string();
    }
    reports
        .iter()
        .map(|r| {
            format!(
                "{}  {:<18} {:<8} {:>9.2} / {:>9.2}  {:>6.1}%  {}",
                r.budget.id,
                r.budget.category,
                r.budget.period.as_str(),
                r.status.spent,
                r.budget.amount,
                r.status.percentage,
                r.status.status.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_report(range: TimeRange, report: &AnalyticsReport) -> String {
    let stats = &report.statistics;
    let mut out = format!(
        "Window {} ({} to {})\n\
         Income {:.2}  Expenses {:.2}  Net {:.2}  Savings rate {:.1}%\n\
         Avg daily expense {:.2}  Avg transaction {:.2}  Transactions {}\n",
        range,
        report.range.start,
        report.range.end,
        stats.total_income,
        stats.total_expenses,
        stats.net_savings,
        stats.savings_rate,
        stats.avg_daily_expense,
        stats.avg_transaction,
        stats.transaction_count
    );

    out.push_str("\nMonthly trend\n");
    for month in &report.trend {
        out.push_str(&format!(
            "  {:<9} income {:>10.2}  expenses {:>10.2}  profit {:>10.2}\n",
            month.label, month.income, month.expenses, month.profit
        ));
    }

    out.push_str("\nTop categories\n");
    for category in &report.top_categories {
        out.push_str(&format!("  {:<18} {:>10.2}\n", category.name, category.value));
    }

    out.push_str("\nBy weekday\n");
    for day in &report.weekday_spending {
        out.push_str(&format!(
            "  {:<9} {:>10.2}  ({} transactions, avg {:.2})\n",
            day.day, day.amount, day.count, day.average
        ));
    }
    out.trim_end().to_string()
}

fn render_overview(view: &Overview) -> String {
    let s = &view.summary;
    let mut out = format!(
        "This month: income {:.2}, expenses {:.2}, balance {:.2}, savings rate {:.1}%\n",
        s.total_income, s.total_expenses, s.balance, s.savings_rate
    );
    if !view.category_breakdown.is_empty() {
        out.push_str("\nSpending by category\n");
        for category in &view.category_breakdown {
            out.push_str(&format!("  {:<18} {:>10.2}\n", category.name, category.value));
        }
    }
    if !view.budgets.is_empty() {
        out.push_str("\nBudgets\n");
        out.push_str(&render_budget_reports(&view.budgets));
    }
    out.trim_end().to_string()
}
