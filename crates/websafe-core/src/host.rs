//! Host collaborators: key-value storage and extension UI hooks.
//!
//! The core never talks to a browser directly; the embedding host implements
//! these traits.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::badge::BadgeState;
use crate::error::WebSafeResult;
use crate::types::TabId;

/// Asynchronous key-value storage (settings, per-tab state).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> WebSafeResult<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> WebSafeResult<()>;
}

/// Extension host UI surface.
#[async_trait]
pub trait ExtensionHost: Send + Sync {
    async fn set_badge(&self, tab_id: TabId, badge: &BadgeState) -> WebSafeResult<()>;

    async fn open_popup(&self) -> WebSafeResult<()>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> WebSafeResult<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> WebSafeResult<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Storage key for a tab's last analysis.
pub fn tab_key(tab_id: TabId) -> String {
    format!("tab_{}", tab_id)
}
