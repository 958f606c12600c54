//! User settings kept in the host's synced store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::WebSafeResult;
use crate::host::KeyValueStore;

pub const AUTO_SCAN_KEY: &str = "autoScan";
pub const NOTIFICATIONS_KEY: &str = "notificationsEnabled";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Scan pages automatically on navigation.
    pub auto_scan: bool,
    /// Show in-page warnings for low scores.
    pub notifications_enabled: bool,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_scan: true,
            notifications_enabled: true,
            theme: Theme::Light,
        }
    }
}

impl Settings {
    fn defaults_by_key() -> [(&'static str, Value); 3] {
        let d = Self::default();
        [
            (AUTO_SCAN_KEY, Value::Bool(d.auto_scan)),
            (NOTIFICATIONS_KEY, Value::Bool(d.notifications_enabled)),
            (THEME_KEY, serde_json::json!(d.theme)),
        ]
    }

    /// Write the default for every key the store does not have yet.
    ///
    /// Returns the keys that were written.
    pub async fn initialize_defaults(store: &dyn KeyValueStore) -> WebSafeResult<Vec<&'static str>> {
        let mut written = Vec::new();
        for (key, value) in Self::defaults_by_key() {
            if store.get(key).await?.is_none() {
                store.set(key, value).await?;
                written.push(key);
            }
        }
        if !written.is_empty() {
            debug!(keys = ?written, "initialized default settings");
        }
        Ok(written)
    }

    /// Read settings; absent or mistyped keys fall back to defaults.
    pub async fn load(store: &dyn KeyValueStore) -> WebSafeResult<Self> {
        let d = Self::default();
        let auto_scan = store
            .get(AUTO_SCAN_KEY)
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(d.auto_scan);
        let notifications_enabled = store
            .get(NOTIFICATIONS_KEY)
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(d.notifications_enabled);
        let theme = store
            .get(THEME_KEY)
            .await?
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or(d.theme);

        Ok(Self {
            auto_scan,
            notifications_enabled,
            theme,
        })
    }
}
