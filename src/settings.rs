use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{read_json, write_json, KeyValueStore, StorageArea, NOTIFICATIONS_KEY, PREFERENCES_KEY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub budget_alerts: bool,
    pub weekly_reports: bool,
    pub monthly_reports: bool,
    pub transaction_alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            budget_alerts: true,
            weekly_reports: false,
            monthly_reports: true,
            transaction_alerts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub dark_mode: bool,
    pub compact_view: bool,
    pub show_decimals: bool,
    pub date_format: String,
    pub start_of_week: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            compact_view: false,
            show_decimals: true,
            date_format: "MM/DD/YYYY".to_string(),
            start_of_week: "sunday".to_string(),
        }
    }
}

pub fn get_notifications(store: &dyn KeyValueStore) -> Result<NotificationSettings> {
    Ok(read_json(store, StorageArea::Local, NOTIFICATIONS_KEY)?.unwrap_or_default())
}

pub fn save_notifications(store: &dyn KeyValueStore, settings: &NotificationSettings) -> Result<()> {
    write_json(store, StorageArea::Local, NOTIFICATIONS_KEY, settings)?;
    log::info!("Notification preferences saved");
    Ok(())
}

pub fn get_preferences(store: &dyn KeyValueStore) -> Result<Preferences> {
    Ok(read_json(store, StorageArea::Local, PREFERENCES_KEY)?.unwrap_or_default())
}

pub fn save_preferences(store: &dyn KeyValueStore, preferences: &Preferences) -> Result<()> {
    write_json(store, StorageArea::Local, PREFERENCES_KEY, preferences)?;
    log::info!("Preferences saved");
    Ok(())
}
