//! Key/value store mirroring the web app's `localStorage` and
//! `sessionStorage` areas, plus the typed helpers every repository module
//! reads and writes through.
//!
//! Values are JSON strings. Reads parse into the caller's schema and fail
//! with [`AppError::Malformed`] instead of handing out half-trusted data.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Budget, Session, Transaction};
use crate::utils::init_db;

pub const USERS_KEY: &str = "users";
pub const CURRENT_USER_KEY: &str = "currentUser";
pub const REMEMBER_ME_KEY: &str = "rememberMe";
pub const NOTIFICATIONS_KEY: &str = "notifications";
pub const PREFERENCES_KEY: &str = "preferences";
pub const LEGACY_TRANSACTIONS_KEY: &str = "transactions";
pub const LEGACY_BUDGETS_KEY: &str = "budgets";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    /// Survives logout and restarts.
    Local,
    /// Holds non-remembered logins; cleared on logout.
    Session,
}

impl StorageArea {
    fn table(&self) -> &'static str {
        match self {
            StorageArea::Local => "local_storage",
            StorageArea::Session => "session_storage",
        }
    }
}

/// Storage port. Each call is atomic for its single key.
pub trait KeyValueStore {
    fn get_item(&self, area: StorageArea, key: &str) -> Result<Option<String>>;
    fn set_item(&self, area: StorageArea, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, area: StorageArea, key: &str) -> Result<()>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        init_db(&conn)?;
        log::debug!("Opened store at {}", path.display());
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteStore {
    fn get_item(&self, area: StorageArea, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                &format!("SELECT value FROM {} WHERE key = ?1", area.table()),
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, area: StorageArea, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                area.table()
            ),
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, area: StorageArea, key: &str) -> Result<()> {
        self.conn.execute(
            &format!("DELETE FROM {} WHERE key = ?1", area.table()),
            params![key],
        )?;
        Ok(())
    }
}

pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    area: StorageArea,
    key: &str,
) -> Result<Option<T>> {
    match store.get_item(area, key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| AppError::Malformed { key: key.to_string(), source }),
        None => Ok(None),
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    area: StorageArea,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set_item(area, key, &raw)
}

/// A JSON array from the local area; a missing key reads as empty.
pub fn read_list<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Vec<T>> {
    Ok(read_json(store, StorageArea::Local, key)?.unwrap_or_default())
}

pub fn write_list<T: Serialize>(store: &dyn KeyValueStore, key: &str, items: &[T]) -> Result<()> {
    write_json(store, StorageArea::Local, key, items)
}

/// Whose transactions and budgets a call works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    User(String),
    Guest,
}

impl Owner {
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(s) => Owner::User(s.email.clone()),
            None => Owner::Guest,
        }
    }

    fn suffix(&self) -> &str {
        match self {
            Owner::User(email) => email,
            Owner::Guest => "guest",
        }
    }

    pub fn transactions_key(&self) -> String {
        format!("transactions_{}", self.suffix())
    }

    pub fn budgets_key(&self) -> String {
        format!("budget_{}", self.suffix())
    }
}

/// Move the unkeyed `transactions`/`budgets` lists into `owner`'s keys.
///
/// A legacy list is only moved when the owner has no list of that kind
/// yet; otherwise it is left in place for a later, manual merge. Returns
/// how many lists were moved.
pub fn migrate_legacy_keys(store: &dyn KeyValueStore, owner: &Owner) -> Result<usize> {
    let mut moved = 0;
    if migrate_list::<Transaction>(store, LEGACY_TRANSACTIONS_KEY, &owner.transactions_key())? {
        moved += 1;
    }
    if migrate_list::<Budget>(store, LEGACY_BUDGETS_KEY, &owner.budgets_key())? {
        moved += 1;
    }
    Ok(moved)
}

fn migrate_list<T: DeserializeOwned + Serialize>(
    store: &dyn KeyValueStore,
    legacy_key: &str,
    target_key: &str,
) -> Result<bool> {
    let legacy: Vec<T> = match read_json(store, StorageArea::Local, legacy_key) {
        Ok(Some(items)) => items,
        Ok(None) => return Ok(false),
        Err(AppError::Malformed { key, source }) => {
            log::warn!("Skipping migration of malformed legacy key '{}': {}", key, source);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let existing: Vec<T> = read_list(store, target_key)?;
    if !existing.is_empty() {
        log::warn!(
            "Legacy key '{}' left in place: '{}' already holds {} entries",
            legacy_key,
            target_key,
            existing.len()
        );
        return Ok(false);
    }

    write_list(store, target_key, &legacy)?;
    store.remove_item(StorageArea::Local, legacy_key)?;
    log::info!("Migrated {} entries from '{}' to '{}'", legacy.len(), legacy_key, target_key);
    Ok(true)
}

/// Re-key an owner's lists, e.g. after an email change.
pub fn move_owner_data(store: &dyn KeyValueStore, from: &Owner, to: &Owner) -> Result<()> {
    if from == to {
        return Ok(());
    }
    for (src, dst) in [
        (from.transactions_key(), to.transactions_key()),
        (from.budgets_key(), to.budgets_key()),
    ] {
        if let Some(raw) = store.get_item(StorageArea::Local, &src)? {
            store.set_item(StorageArea::Local, &dst, &raw)?;
            store.remove_item(StorageArea::Local, &src)?;
        }
    }
    Ok(())
}

pub fn remove_owner_data(store: &dyn KeyValueStore, owner: &Owner) -> Result<()> {
    store.remove_item(StorageArea::Local, &owner.transactions_key())?;
    store.remove_item(StorageArea::Local, &owner.budgets_key())?;
    Ok(())
}
