use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;

use crate::error::{AppError, Result};

pub const APP_DIR_NAME: &str = "BudgetTracker";
pub const DEFAULT_DB_FILE: &str = "budget-tracker.db";

/// Tables every store file must carry.
pub const REQUIRED_TABLES: [&str; 2] = ["local_storage", "session_storage"];

/// Resolve the store location, defaulting to the OS data directory.
pub fn get_db_path(data_dir: Option<&Path>, db_file: &str) -> Result<PathBuf> {
    let app_dir = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::data_dir()
            .ok_or_else(|| AppError::Config("Could not find data directory".to_string()))?
            .join(APP_DIR_NAME),
    };
    fs::create_dir_all(&app_dir)?;
    Ok(app_dir.join(db_file))
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS local_storage (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS session_storage (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(())
}

/// Check that `conn` looks like one of our store files.
pub fn verify_schema(conn: &Connection) -> Result<()> {
    for table in REQUIRED_TABLES.iter() {
        if conn.prepare(&format!("SELECT 1 FROM {} LIMIT 1", table)).is_err() {
            return Err(AppError::validation(format!("Database is missing {} table", table)));
        }
    }
    Ok(())
}

pub fn reset_database(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }
    let conn = Connection::open(path)?;
    init_db(&conn)?;
    log::info!("Reset store at {}", path.display());
    Ok(())
}

/// Current instant as an RFC 3339 string with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Millisecond-timestamp id, bumped past any id already in `existing`.
pub fn generate_id<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<&str> = existing.into_iter().collect();
    let mut candidate = Utc::now().timestamp_millis();
    while taken.contains(&candidate.to_string().as_str()) {
        candidate += 1;
    }
    candidate.to_string()
}

/// Loose `something@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && match domain.rsplit_once('.') {
                    Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
                    None => false,
                }
        }
        None => false,
    }
}
