use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::models::{Session, User};
use crate::storage::{
    migrate_legacy_keys, move_owner_data, read_json, read_list, remove_owner_data, write_json,
    write_list, KeyValueStore, Owner, StorageArea, CURRENT_USER_KEY, REMEMBER_ME_KEY, USERS_KEY,
};
use crate::utils::{generate_id, is_valid_email, now_iso};

const HASH_SCHEME: &str = "sha256";
const MIN_PASSWORD_LEN: usize = 6;

pub const DEMO_EMAIL: &str = "test@example.com";
pub const DEMO_PASSWORD: &str = "password123";

#[derive(Debug, Clone)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

pub fn get_users(store: &dyn KeyValueStore) -> Result<Vec<User>> {
    read_list(store, USERS_KEY)
}

/// Seed the demo account when no user list exists yet. Its password is
/// plaintext until the first successful login rehashes it.
pub fn ensure_demo_user(store: &dyn KeyValueStore) -> Result<bool> {
    if store.get_item(StorageArea::Local, USERS_KEY)?.is_some() {
        return Ok(false);
    }
    let demo = User {
        id: "1".to_string(),
        full_name: "Demo User".to_string(),
        email: DEMO_EMAIL.to_string(),
        password: DEMO_PASSWORD.to_string(),
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
    };
    write_list(store, USERS_KEY, &[demo])?;
    log::info!("Demo user data initialized");
    Ok(true)
}

pub fn register(store: &dyn KeyValueStore, registration: Registration) -> Result<Session> {
    validate_registration(&registration)?;

    let mut users = get_users(store)?;
    let email = registration.email.trim().to_string();
    if users.iter().any(|u| u.email == email) {
        log::warn!("Registration rejected: {} already registered", email);
        return Err(AppError::Duplicate("Email already registered".to_string()));
    }

    let user = User {
        id: generate_id(users.iter().map(|u| u.id.as_str())),
        full_name: registration.full_name.trim().to_string(),
        email: email.clone(),
        password: hash_password(&registration.password, &new_salt()),
        created_at: now_iso(),
    };
    users.push(user.clone());
    write_list(store, USERS_KEY, &users)?;
    log::info!("Registered user {}", user.id);

    // Registration logs the new user straight in. The session goes to the
    // local area but `rememberMe` is left alone.
    let session = Session::for_user(&user, now_iso());
    write_json(store, StorageArea::Local, CURRENT_USER_KEY, &session)?;
    store.remove_item(StorageArea::Session, CURRENT_USER_KEY)?;
    Ok(session)
}

pub fn login(store: &dyn KeyValueStore, email: &str, password: &str, remember: bool) -> Result<Session> {
    let mut users = get_users(store)?;
    let email = email.trim();
    let index = users
        .iter()
        .position(|u| u.email == email && verify_password(&u.password, password))
        .ok_or_else(|| {
            log::warn!("Failed login for {}", email);
            AppError::InvalidCredentials
        })?;

    if !is_hashed(&users[index].password) {
        users[index].password = hash_password(password, &new_salt());
        write_list(store, USERS_KEY, &users)?;
        log::info!("Upgraded stored password for user {}", users[index].id);
    }

    let session = Session::for_user(&users[index], now_iso());
    write_session(store, &session, remember)?;
    migrate_legacy_keys(store, &Owner::User(session.email.clone()))?;
    log::info!("User {} logged in (remember: {})", session.id, remember);
    Ok(session)
}

pub fn logout(store: &dyn KeyValueStore) -> Result<()> {
    store.remove_item(StorageArea::Local, CURRENT_USER_KEY)?;
    store.remove_item(StorageArea::Local, REMEMBER_ME_KEY)?;
    store.remove_item(StorageArea::Session, CURRENT_USER_KEY)?;
    log::info!("Logged out");
    Ok(())
}

/// The remembered session wins over a session-only one.
pub fn current_session(store: &dyn KeyValueStore) -> Result<Option<Session>> {
    if let Some(session) = read_json(store, StorageArea::Local, CURRENT_USER_KEY)? {
        return Ok(Some(session));
    }
    read_json(store, StorageArea::Session, CURRENT_USER_KEY)
}

pub fn current_owner(store: &dyn KeyValueStore) -> Result<Owner> {
    Ok(Owner::from_session(current_session(store)?.as_ref()))
}

pub fn require_session(store: &dyn KeyValueStore) -> Result<Session> {
    current_session(store)?.ok_or(AppError::NotLoggedIn)
}

pub fn update_profile(store: &dyn KeyValueStore, update: ProfileUpdate) -> Result<Session> {
    let mut session = require_session(store)?;
    let mut users = get_users(store)?;
    let index = users
        .iter()
        .position(|u| u.id == session.id)
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    if let Some(name) = update.full_name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Full name is required"));
        }
        users[index].full_name = name;
    }

    let old_owner = Owner::User(users[index].email.clone());
    if let Some(email) = update.email {
        let email = email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(AppError::validation("Email is invalid"));
        }
        if users.iter().any(|u| u.email == email && u.id != session.id) {
            return Err(AppError::Duplicate("Email already registered".to_string()));
        }
        users[index].email = email;
    }

    write_list(store, USERS_KEY, &users)?;
    move_owner_data(store, &old_owner, &Owner::User(users[index].email.clone()))?;

    session.full_name = users[index].full_name.clone();
    session.email = users[index].email.clone();
    write_json(store, session_area(store)?, CURRENT_USER_KEY, &session)?;
    log::info!("Updated profile for user {}", session.id);
    Ok(session)
}

pub fn change_password(
    store: &dyn KeyValueStore,
    current_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<()> {
    if new_password != confirm_password {
        return Err(AppError::validation("New passwords do not match!"));
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("Password must be at least 6 characters long!"));
    }

    let session = require_session(store)?;
    let mut users = get_users(store)?;
    let user = users
        .iter_mut()
        .find(|u| u.id == session.id)
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;
    if !verify_password(&user.password, current_password) {
        return Err(AppError::validation("Current password is incorrect!"));
    }
    user.password = hash_password(new_password, &new_salt());
    write_list(store, USERS_KEY, &users)?;
    log::info!("Changed password for user {}", session.id);
    Ok(())
}

/// Remove the logged-in user, their session and their data.
pub fn delete_account(store: &dyn KeyValueStore) -> Result<()> {
    let session = require_session(store)?;
    let users: Vec<User> = get_users(store)?
        .into_iter()
        .filter(|u| u.id != session.id)
        .collect();
    write_list(store, USERS_KEY, &users)?;
    remove_owner_data(store, &Owner::User(session.email.clone()))?;
    logout(store)?;
    log::info!("Deleted account {}", session.id);
    Ok(())
}

fn validate_registration(registration: &Registration) -> Result<()> {
    let mut errors = Vec::new();
    if registration.full_name.trim().is_empty() {
        errors.push("Full name is required");
    }
    if registration.email.trim().is_empty() {
        errors.push("Email is required");
    } else if !is_valid_email(registration.email.trim()) {
        errors.push("Email is invalid");
    }
    if registration.password.is_empty() {
        errors.push("Password is required");
    } else if registration.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("Password must be at least 6 characters");
    }
    if registration.confirm_password.is_empty() {
        errors.push("Please confirm your password");
    } else if registration.password != registration.confirm_password {
        errors.push("Passwords do not match");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(errors.join("; ")))
    }
}

fn write_session(store: &dyn KeyValueStore, session: &Session, remember: bool) -> Result<()> {
    if remember {
        write_json(store, StorageArea::Local, CURRENT_USER_KEY, session)?;
        store.set_item(StorageArea::Local, REMEMBER_ME_KEY, "true")?;
        store.remove_item(StorageArea::Session, CURRENT_USER_KEY)?;
    } else {
        write_json(store, StorageArea::Session, CURRENT_USER_KEY, session)?;
        store.remove_item(StorageArea::Local, REMEMBER_ME_KEY)?;
        store.remove_item(StorageArea::Local, CURRENT_USER_KEY)?;
    }
    Ok(())
}

/// Area holding the current session, local first.
fn session_area(store: &dyn KeyValueStore) -> Result<StorageArea> {
    if store.get_item(StorageArea::Local, CURRENT_USER_KEY)?.is_some() {
        Ok(StorageArea::Local)
    } else {
        Ok(StorageArea::Session)
    }
}

fn new_salt() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{}${}${}", HASH_SCHEME, salt, STANDARD.encode(hasher.finalize()))
}

fn is_hashed(stored: &str) -> bool {
    stored.starts_with(HASH_SCHEME) && stored.splitn(3, '$').count() == 3
}

/// Plaintext values are still accepted so old records can be upgraded.
fn verify_password(stored: &str, password: &str) -> bool {
    if !is_hashed(stored) {
        return stored == password;
    }
    match stored.splitn(3, '$').nth(1) {
        Some(salt) => hash_password(password, salt) == stored,
        None => false,
    }
}
