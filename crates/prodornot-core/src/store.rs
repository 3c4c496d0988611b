use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{STORAGE_DOMAINS_KEY, STORAGE_ENVIRONMENTS_KEY, STORAGE_INDICATOR_SETTINGS_KEY};
use crate::model::{DomainMarks, Environment, IndicatorSettings};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("storage is unavailable: {message}")]
    Unavailable { message: String },
    #[error("storage read failed: {message}")]
    Read { message: String },
    #[error("storage write failed: {message}")]
    Write { message: String },
    #[error("failed to encode `{key}`: {message}")]
    Encode { key: String, message: String },
}

/// Raw values returned by a `get`; keys that were never written are absent.
pub type StoreSnapshot = Map<String, Value>;

/// The platform's synchronized key-value store.
///
/// Every write replaces the whole value of each key it names; there is no
/// field-level merge, so callers read, modify and write back complete
/// structures.
#[async_trait(?Send)]
pub trait SyncStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreSnapshot, StoreError>;
    async fn set(&self, items: StoreSnapshot) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Sync,
    Local,
    Managed,
    Session,
}

impl StorageArea {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "sync" => Some(Self::Sync),
            "local" => Some(Self::Local),
            "managed" => Some(Self::Managed),
            "session" => Some(Self::Session),
            _ => None,
        }
    }
}

/// One change notification from the store subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub area: StorageArea,
    pub changed_keys: Vec<String>,
}

impl StoreChange {
    pub fn sync<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            area: StorageArea::Sync,
            changed_keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn touches(&self, key: &str) -> bool {
        self.changed_keys.iter().any(|changed| changed == key)
    }
}

fn encode_item(key: &str, value: &impl Serialize) -> Result<StoreSnapshot, StoreError> {
    let encoded = serde_json::to_value(value).map_err(|error| StoreError::Encode {
        key: key.to_string(),
        message: error.to_string(),
    })?;
    let mut items = Map::new();
    items.insert(key.to_string(), encoded);
    Ok(items)
}

pub async fn write_environments<S: SyncStore + ?Sized>(
    store: &S,
    environments: &[Environment],
) -> Result<(), StoreError> {
    store
        .set(encode_item(STORAGE_ENVIRONMENTS_KEY, &environments)?)
        .await
}

pub async fn write_domains<S: SyncStore + ?Sized>(
    store: &S,
    domains: &DomainMarks,
) -> Result<(), StoreError> {
    store.set(encode_item(STORAGE_DOMAINS_KEY, domains)?).await
}

pub async fn write_indicator_settings<S: SyncStore + ?Sized>(
    store: &S,
    settings: IndicatorSettings,
) -> Result<(), StoreError> {
    store
        .set(encode_item(STORAGE_INDICATOR_SETTINGS_KEY, &settings)?)
        .await
}
