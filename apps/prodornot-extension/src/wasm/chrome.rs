use super::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = get)]
    async fn chrome_storage_sync_get(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = set)]
    async fn chrome_storage_sync_set(items: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "onChanged"], js_name = addListener)]
    fn chrome_storage_on_changed_add_listener(
        listener: &Closure<dyn FnMut(JsValue, JsValue)>,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn chrome_runtime_on_message_add_listener(
        listener: &Closure<dyn FnMut(JsValue)>,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = openOptionsPage)]
    async fn chrome_runtime_open_options_page() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = query)]
    async fn chrome_tabs_query(query: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = reload)]
    async fn chrome_tabs_reload(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = sendMessage)]
    async fn chrome_tabs_send_message(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

pub(super) fn js_error_message(error: &JsValue) -> String {
    if let Some(error) = error.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    error
        .as_string()
        .unwrap_or_else(|| "unknown browser error".to_string())
}

fn chrome_path_exists(path: &[&str]) -> bool {
    let mut current: JsValue = js_sys::global().into();
    for segment in std::iter::once(&"chrome").chain(path) {
        match js_sys::Reflect::get(&current, &JsValue::from_str(segment)) {
            Ok(next) if !next.is_undefined() && !next.is_null() => current = next,
            _ => return false,
        }
    }
    true
}

/// `chrome.storage.sync`, the one store every surface shares.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct ChromeSyncStore;

impl ChromeSyncStore {
    fn ensure_available() -> Result<(), StoreError> {
        if chrome_path_exists(&["storage", "sync"]) {
            Ok(())
        } else {
            Err(StoreError::Unavailable {
                message: "chrome.storage.sync is not exposed to this context".to_string(),
            })
        }
    }
}

#[async_trait(?Send)]
impl SyncStore for ChromeSyncStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreSnapshot, StoreError> {
        Self::ensure_available()?;
        let request = to_js(keys).map_err(|error| StoreError::Read {
            message: error.to_string(),
        })?;
        let response = chrome_storage_sync_get(request)
            .await
            .map_err(|error| StoreError::Read {
                message: js_error_message(&error),
            })?;

        match serde_wasm_bindgen::from_value::<Value>(response) {
            Ok(Value::Object(items)) => Ok(items),
            Ok(Value::Null) => Ok(StoreSnapshot::new()),
            Ok(other) => Err(StoreError::Read {
                message: format!("unexpected storage payload: {other}"),
            }),
            Err(error) => Err(StoreError::Read {
                message: error.to_string(),
            }),
        }
    }

    async fn set(&self, items: StoreSnapshot) -> Result<(), StoreError> {
        Self::ensure_available()?;
        let request = to_js(&items).map_err(|error| StoreError::Write {
            message: error.to_string(),
        })?;
        chrome_storage_sync_set(request)
            .await
            .map_err(|error| StoreError::Write {
                message: js_error_message(&error),
            })?;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct TabQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_window: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawTab {
    #[serde(default)]
    id: Option<TabId>,
    #[serde(default)]
    url: Option<String>,
}

/// `chrome.tabs` plus `chrome.runtime.openOptionsPage`.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct ChromeTabs;

impl ChromeTabs {
    async fn query(&self, query: &TabQuery) -> Result<Vec<TabInfo>, TabsError> {
        let request = to_js(query).map_err(|error| TabsError::Query {
            message: error.to_string(),
        })?;
        let response = chrome_tabs_query(request)
            .await
            .map_err(|error| TabsError::Query {
                message: js_error_message(&error),
            })?;
        let raw = serde_wasm_bindgen::from_value::<Vec<RawTab>>(response).map_err(|error| {
            TabsError::Query {
                message: error.to_string(),
            }
        })?;

        // Tabs without an id (devtools windows) cannot be addressed anyway.
        Ok(raw
            .into_iter()
            .filter_map(|tab| Some(TabInfo { id: tab.id?, url: tab.url }))
            .collect())
    }
}

#[async_trait(?Send)]
impl TabsApi for ChromeTabs {
    async fn query_all(&self) -> Result<Vec<TabInfo>, TabsError> {
        self.query(&TabQuery::default()).await
    }

    async fn active_tab(&self) -> Result<Option<TabInfo>, TabsError> {
        let tabs = self
            .query(&TabQuery {
                active: Some(true),
                current_window: Some(true),
            })
            .await?;
        Ok(tabs.into_iter().next())
    }

    async fn reload(&self, tab_id: TabId) -> Result<(), TabsError> {
        chrome_tabs_reload(tab_id)
            .await
            .map_err(|error| TabsError::Reload {
                tab_id,
                message: js_error_message(&error),
            })?;
        Ok(())
    }

    async fn send_message(&self, tab_id: TabId, message: RuntimeMessage) -> Result<(), TabsError> {
        let payload = to_js(&message).map_err(|error| TabsError::Message {
            tab_id,
            message: error.to_string(),
        })?;
        chrome_tabs_send_message(tab_id, payload)
            .await
            .map_err(|error| TabsError::Message {
                tab_id,
                message: js_error_message(&error),
            })?;
        Ok(())
    }

    async fn open_options_page(&self) -> Result<(), TabsError> {
        chrome_runtime_open_options_page()
            .await
            .map_err(|error| TabsError::OpenOptions {
                message: js_error_message(&error),
            })?;
        Ok(())
    }
}

pub(super) fn add_storage_changed_listener(
    listener: &Closure<dyn FnMut(JsValue, JsValue)>,
) -> Result<(), String> {
    chrome_storage_on_changed_add_listener(listener).map_err(|error| js_error_message(&error))
}

pub(super) fn add_runtime_message_listener(
    listener: &Closure<dyn FnMut(JsValue)>,
) -> Result<(), String> {
    chrome_runtime_on_message_add_listener(listener).map_err(|error| js_error_message(&error))
}

/// Decodes the `(changes, areaName)` pair `storage.onChanged` delivers.
pub(super) fn decode_store_change(changes: &JsValue, area: &JsValue) -> Option<StoreChange> {
    let area = StorageArea::parse(&area.as_string()?)?;
    let changes = changes.dyn_ref::<js_sys::Object>()?;
    let changed_keys = js_sys::Object::keys(changes)
        .iter()
        .filter_map(|key| key.as_string())
        .collect();
    Some(StoreChange { area, changed_keys })
}

pub(super) fn decode_runtime_message(message: JsValue) -> Option<RuntimeMessage> {
    serde_wasm_bindgen::from_value(message).ok()
}
