/// Tab Tracker - Chrome Extension that records tab activity
/// Built with Rust + WASM + Yew

pub mod bridge;
pub mod config;
pub mod display;
pub mod message;
pub mod search;
pub mod state;
pub mod storage;
pub mod tab_record;
pub mod tracker;
pub mod ui;

use bridge::ChromeStore;
use config::TrackerConfig;
use js_sys::{Date, Promise};
use message::Request;
use state::Outcome;
use std::rc::Rc;
use storage::StoreError;
use tab_record::{BrowserTab, NavigationDetails, TabChange, TabId};
use tracker::TabTracker;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export search extraction for JavaScript access
#[wasm_bindgen]
pub fn extract_search_query(url: &str) -> Option<String> {
    search::extract_search_query(url)
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

/// Tracker handle held by the background service worker.
///
/// Every event method returns a promise resolving to the outcome label.
/// Storage failures are logged and resolve to `"error"`; the in-memory
/// state keeps the change and the next successful write persists it.
#[wasm_bindgen]
pub struct BackgroundTracker {
    tracker: Rc<TabTracker<ChromeStore>>,
}

#[wasm_bindgen]
impl BackgroundTracker {
    /// Hydrate from chrome.storage.local. `config` may be `undefined` or a
    /// partial `{archiveCapacity, historyLimit}` object.
    pub async fn load(config: JsValue) -> Result<BackgroundTracker, JsValue> {
        let config: TrackerConfig = if config.is_undefined() || config.is_null() {
            TrackerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        let tracker = TabTracker::hydrate(ChromeStore, config)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(BackgroundTracker {
            tracker: Rc::new(tracker),
        })
    }

    /// Track every tab returned by `chrome.tabs.query({})`
    #[wasm_bindgen(js_name = trackExisting)]
    pub fn track_existing(&self, tabs: JsValue) -> Promise {
        let tracker = Rc::clone(&self.tracker);
        future_to_promise(async move {
            let tabs: Vec<BrowserTab> = serde_wasm_bindgen::from_value(tabs)?;
            match tracker.track_existing(&tabs, Date::now()).await {
                Ok(tracked) => Ok(JsValue::from(tracked as u32)),
                Err(e) => Ok(report_failure("trackExisting", e)),
            }
        })
    }

    #[wasm_bindgen(js_name = onCreated)]
    pub fn on_created(&self, tab: JsValue) -> Promise {
        let tracker = Rc::clone(&self.tracker);
        future_to_promise(async move {
            let tab: BrowserTab = serde_wasm_bindgen::from_value(tab)?;
            Ok(report("onCreated", tracker.on_open(&tab, Date::now()).await))
        })
    }

    #[wasm_bindgen(js_name = onUpdated)]
    pub fn on_updated(&self, tab_id: TabId, change_info: JsValue, tab: JsValue) -> Promise {
        let tracker = Rc::clone(&self.tracker);
        future_to_promise(async move {
            let change: TabChange = serde_wasm_bindgen::from_value(change_info)?;
            let tab: BrowserTab = serde_wasm_bindgen::from_value(tab)?;
            Ok(report("onUpdated", tracker.on_update(tab_id, change, &tab, Date::now()).await))
        })
    }

    /// `tab` is the result of `chrome.tabs.get` for the activated tab
    #[wasm_bindgen(js_name = onActivated)]
    pub fn on_activated(&self, tab_id: TabId, tab: JsValue) -> Promise {
        let tracker = Rc::clone(&self.tracker);
        future_to_promise(async move {
            let tab: BrowserTab = serde_wasm_bindgen::from_value(tab)?;
            Ok(report("onActivated", tracker.on_activate(tab_id, &tab, Date::now()).await))
        })
    }

    #[wasm_bindgen(js_name = onRemoved)]
    pub fn on_removed(&self, tab_id: TabId) -> Promise {
        let tracker = Rc::clone(&self.tracker);
        future_to_promise(async move { Ok(report("onRemoved", tracker.on_close(tab_id, Date::now()).await)) })
    }

    /// `details` from `chrome.webNavigation.onCommitted`
    #[wasm_bindgen(js_name = onCommitted)]
    pub fn on_committed(&self, details: JsValue) -> Promise {
        let tracker = Rc::clone(&self.tracker);
        future_to_promise(async move {
            let details: NavigationDetails = serde_wasm_bindgen::from_value(details)?;
            Ok(report(
                "onCommitted",
                tracker.on_navigate_committed(&details, Date::now()).await,
            ))
        })
    }

    /// Answer a `chrome.runtime.onMessage` request. Returns `undefined` for
    /// messages this tracker does not handle.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&self, message: JsValue) -> Result<JsValue, JsValue> {
        let request = bridge::from_js::<serde_json::Value>(&message)
            .ok()
            .flatten()
            .and_then(Request::parse);

        match request {
            Some(request) => bridge::to_js(&self.tracker.respond(&request)).map_err(|e| JsValue::from_str(&e)),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

fn report(event: &str, result: Result<Outcome, StoreError>) -> JsValue {
    match result {
        Ok(outcome) => JsValue::from_str(outcome.label()),
        Err(e) => report_failure(event, e),
    }
}

fn report_failure(event: &str, err: StoreError) -> JsValue {
    log::error!("{}: failed to persist tab data: {}", event, err);
    JsValue::from_str("error")
}
