/// Bridge to the extension APIs in bridge.js

use crate::message::Request;
use crate::storage::{StorageKey, StoreError, TabStore};
use crate::tab_record::TabSnapshot;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(items: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendMessage(message: JsValue) -> Result<JsValue, JsValue>;
}

/// Convert a JS value to a Rust value by way of JSON.
///
/// Goes through `JSON.stringify` rather than serde-wasm-bindgen so objects
/// keyed by tab id come back with integer keys. `null` and `undefined`
/// give `None`.
pub fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<Option<T>, String> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }

    let text: String = js_sys::JSON::stringify(value)
        .map_err(|e| format!("Failed to stringify: {:?}", e))?
        .into();

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| format!("Failed to parse: {:?}", e))
}

/// Convert a Rust value to a plain JS object by way of JSON
pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    let text = serde_json::to_string(value).map_err(|e| format!("Failed to serialize: {:?}", e))?;
    js_sys::JSON::parse(&text).map_err(|e| format!("Failed to parse: {:?}", e))
}

/// `chrome.storage.local`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStore;

impl TabStore for ChromeStore {
    async fn get(&self, key: StorageKey) -> Result<Option<Value>, StoreError> {
        let value = getStorage(key.as_str())
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to get {}: {:?}", key.as_str(), e)))?;

        from_js(&value).map_err(StoreError::Backend)
    }

    async fn set(&self, entries: Vec<(StorageKey, Value)>) -> Result<(), StoreError> {
        let items: Map<String, Value> = entries
            .into_iter()
            .map(|(key, value)| (key.as_str().to_string(), value))
            .collect();

        let items = to_js(&items).map_err(StoreError::Backend)?;

        setStorage(items)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to set: {:?}", e)))
    }
}

/// Ask the background tracker for its current snapshot
pub async fn request_tab_data() -> Result<TabSnapshot, String> {
    let message = to_js(&Request::GetTabData)?;

    let response = sendMessage(message)
        .await
        .map_err(|e| format!("Failed to reach background: {:?}", e))?;

    Ok(from_js(&response)?.unwrap_or_default())
}
