/// Tab tracker: a `TabState` bound to a store, writing through after every
/// event
use crate::config::TrackerConfig;
use crate::message::Request;
use crate::state::{Dirty, Outcome, TabState};
use crate::storage::{StorageKey, StoreError, TabStore};
use crate::tab_record::{BrowserTab, NavigationDetails, TabChange, TabId, TabSnapshot};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;

/// Owns the reducer state and its store.
///
/// Each event is applied synchronously and the state borrow is released
/// before the write is awaited, so events delivered while a write is in
/// flight are applied in order against consistent state.
pub struct TabTracker<S> {
    state: RefCell<TabState>,
    store: S,
}

impl<S: TabStore> TabTracker<S> {
    /// A tracker with empty state that has not read from the store
    pub fn new(store: S, config: TrackerConfig) -> Self {
        TabTracker {
            state: RefCell::new(TabState::new(config)),
            store,
        }
    }

    /// Load previously persisted state. Missing keys start empty; a blob
    /// that no longer parses is dropped with a warning.
    pub async fn hydrate(store: S, config: TrackerConfig) -> Result<Self, StoreError> {
        let open_tabs = load_blob(&store, StorageKey::OpenTabs).await?;
        let closed_tabs = load_blob(&store, StorageKey::ClosedTabs).await?;
        let state = TabState::from_parts(open_tabs, closed_tabs, config);

        info!(
            "Hydrated tab tracker: {} open, {} closed",
            state.open_tabs().len(),
            state.closed_tabs().len()
        );

        Ok(TabTracker {
            state: RefCell::new(state),
            store,
        })
    }

    pub async fn on_open(&self, tab: &BrowserTab, now: f64) -> Result<Outcome, StoreError> {
        let outcome = self.state.borrow_mut().on_open(tab, now);
        self.persist("open", outcome).await
    }

    pub async fn on_update(
        &self,
        tab_id: TabId,
        change: TabChange,
        tab: &BrowserTab,
        now: f64,
    ) -> Result<Outcome, StoreError> {
        let outcome = self.state.borrow_mut().on_update(tab_id, change, tab, now);
        self.persist("update", outcome).await
    }

    pub async fn on_activate(&self, tab_id: TabId, tab: &BrowserTab, now: f64) -> Result<Outcome, StoreError> {
        let outcome = self.state.borrow_mut().on_activate(tab_id, tab, now);
        self.persist("activate", outcome).await
    }

    pub async fn on_navigate_committed(&self, details: &NavigationDetails, now: f64) -> Result<Outcome, StoreError> {
        let outcome = self
            .state
            .borrow_mut()
            .on_navigate_committed(details.tab_id, &details.url, details.frame_id, now);
        self.persist("navigate", outcome).await
    }

    pub async fn on_close(&self, tab_id: TabId, now: f64) -> Result<Outcome, StoreError> {
        let outcome = self.state.borrow_mut().on_close(tab_id, now);
        self.persist("close", outcome).await
    }

    /// Track every tab the browser already has open, with a single write
    pub async fn track_existing(&self, tabs: &[BrowserTab], now: f64) -> Result<usize, StoreError> {
        let tracked = self.state.borrow_mut().track_existing(tabs, now);
        if tracked > 0 {
            self.write(Dirty::OpenTabs).await?;
        }
        info!("Tracking {} existing tabs", tracked);
        Ok(tracked)
    }

    pub fn query(&self) -> TabSnapshot {
        self.state.borrow().snapshot()
    }

    /// Answer a display surface request
    pub fn respond(&self, request: &Request) -> TabSnapshot {
        match request {
            Request::GetTabData => self.query(),
        }
    }

    async fn persist(&self, event: &str, outcome: Outcome) -> Result<Outcome, StoreError> {
        match outcome {
            Outcome::Ignored(reason) => debug!("{} event ignored: {:?}", event, reason),
            _ => debug!("{} event: {}", event, outcome.label()),
        }

        self.write(outcome.dirty()).await?;
        Ok(outcome)
    }

    async fn write(&self, dirty: Dirty) -> Result<(), StoreError> {
        let keys: &[StorageKey] = match dirty {
            Dirty::Nothing => return Ok(()),
            Dirty::OpenTabs => &[StorageKey::OpenTabs],
            Dirty::OpenAndClosedTabs => &[StorageKey::OpenTabs, StorageKey::ClosedTabs],
        };

        let entries = {
            let state = self.state.borrow();
            keys.iter()
                .map(|key| {
                    let value = match key {
                        StorageKey::OpenTabs => serde_json::to_value(state.open_tabs()),
                        StorageKey::ClosedTabs => serde_json::to_value(state.closed_tabs()),
                    };
                    value
                        .map(|value| (*key, value))
                        .map_err(|source| StoreError::Serialize {
                            key: key.as_str(),
                            source,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        self.store.set(entries).await
    }
}

async fn load_blob<T, S>(store: &S, key: StorageKey) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
    S: TabStore,
{
    match store.get(key).await? {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => match serde_json::from_value(value) {
            Ok(parsed) => Ok(parsed),
            Err(source) => {
                let err = StoreError::Deserialize {
                    key: key.as_str(),
                    source,
                };
                warn!("Discarding stored data: {}", err);
                Ok(T::default())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::IgnoreReason;
    use crate::storage::MemoryStore;
    use futures::executor::block_on;
    use serde_json::json;

    fn tab(id: TabId, url: &str) -> BrowserTab {
        BrowserTab::new(id, url, "Title")
    }

    fn tracker() -> (TabTracker<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        (TabTracker::new(store.clone(), TrackerConfig::default()), store)
    }

    #[test]
    fn test_query_before_events() {
        let (tracker, _) = tracker();

        let snapshot = tracker.query();

        assert!(snapshot.open_tabs.is_empty());
        assert!(snapshot.closed_tabs.is_empty());
        assert_eq!(serde_json::to_value(&snapshot).unwrap(), json!({"openTabs": {}, "closedTabs": []}));
    }

    #[test]
    fn test_open_writes_through() {
        let (tracker, store) = tracker();

        let outcome = block_on(tracker.on_open(&tab(3, "https://a.com"), 10.0)).unwrap();

        assert_eq!(outcome, Outcome::Tracked);
        assert_eq!(store.writes(), vec![vec![StorageKey::OpenTabs]]);
        let stored = store.value(StorageKey::OpenTabs).unwrap();
        assert_eq!(stored["3"]["url"], "https://a.com");
    }

    #[test]
    fn test_close_writes_both_keys_together() {
        let (tracker, store) = tracker();
        block_on(tracker.on_open(&tab(3, "https://a.com"), 10.0)).unwrap();

        let outcome = block_on(tracker.on_close(3, 20.0)).unwrap();

        assert_eq!(outcome, Outcome::Archived);
        assert_eq!(
            store.writes().last().cloned(),
            Some(vec![StorageKey::OpenTabs, StorageKey::ClosedTabs])
        );
        assert_eq!(store.value(StorageKey::OpenTabs), Some(json!({})));
        assert_eq!(store.value(StorageKey::ClosedTabs).unwrap()[0]["closedAt"], 20.0);
    }

    #[test]
    fn test_ignored_events_do_not_write() {
        let (tracker, store) = tracker();

        let outcome = block_on(tracker.on_close(42, 10.0)).unwrap();

        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Untracked));
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_implicit_open_is_reported() {
        let (tracker, _) = tracker();

        let outcome = block_on(tracker.on_activate(5, &tab(5, "https://a.com"), 10.0)).unwrap();

        assert_eq!(outcome, Outcome::TrackedImplicitly);
        assert!(tracker.query().open_tabs.contains_key(&5));
    }

    #[test]
    fn test_navigation_search() {
        let (tracker, _) = tracker();
        block_on(tracker.on_open(&tab(1, "https://a.com"), 0.0)).unwrap();
        let details = NavigationDetails {
            tab_id: 1,
            url: "https://www.google.com/search?q=cats".to_string(),
            frame_id: 0,
        };

        let outcome = block_on(tracker.on_navigate_committed(&details, 5.0)).unwrap();

        assert_eq!(outcome, Outcome::Searched);
        assert_eq!(tracker.query().open_tabs[&1].search_query.as_deref(), Some("cats"));
    }

    #[test]
    fn test_write_failure_is_surfaced() {
        let (tracker, store) = tracker();
        store.set_fail_writes(true);

        let result = block_on(tracker.on_open(&tab(1, "https://a.com"), 0.0));

        assert!(matches!(result, Err(StoreError::Backend(_))));
        // State is still applied and goes out with the next successful write
        assert!(tracker.query().open_tabs.contains_key(&1));

        store.set_fail_writes(false);
        block_on(tracker.on_open(&tab(2, "https://b.com"), 1.0)).unwrap();
        let stored = store.value(StorageKey::OpenTabs).unwrap();
        assert!(stored.get("1").is_some());
        assert!(stored.get("2").is_some());
    }

    #[test]
    fn test_hydrate_restores_snapshot() {
        let (tracker, store) = tracker();
        block_on(async {
            tracker.on_open(&tab(1, "https://a.com"), 0.0).await.unwrap();
            tracker.on_open(&tab(2, "https://www.bing.com/search?q=yew"), 0.0).await.unwrap();
            tracker.on_activate(1, &tab(1, "https://a.com"), 100.0).await.unwrap();
            tracker.on_close(2, 200.0).await.unwrap();
        });

        let restored = block_on(TabTracker::hydrate(store, TrackerConfig::default())).unwrap();

        assert_eq!(restored.query(), tracker.query());
    }

    #[test]
    fn test_hydrate_empty_store() {
        let restored = block_on(TabTracker::hydrate(MemoryStore::new(), TrackerConfig::default())).unwrap();

        assert_eq!(restored.query(), TabSnapshot::default());
    }

    #[test]
    fn test_hydrate_discards_corrupt_blob() {
        let store = MemoryStore::new();
        store.insert(StorageKey::OpenTabs, json!("garbage"));
        store.insert(
            StorageKey::ClosedTabs,
            json!([{
                "id": 4, "url": "https://a.com", "title": "A",
                "openedAt": 1, "lastActivated": 1, "activationCount": 1,
                "timeSpent": 0, "searchQuery": null,
                "history": [{"timestamp": 1, "event": "opened", "url": "https://a.com", "title": "A"}],
                "closedAt": 2
            }]),
        );

        let restored = block_on(TabTracker::hydrate(store, TrackerConfig::default())).unwrap();
        let snapshot = restored.query();

        assert!(snapshot.open_tabs.is_empty());
        assert_eq!(snapshot.closed_tabs.len(), 1);
        assert_eq!(snapshot.closed_tabs[0].record.id, 4);
    }

    #[test]
    fn test_track_existing_single_write() {
        let (tracker, store) = tracker();
        let tabs = vec![tab(1, "https://a.com"), tab(2, "https://b.com")];

        let tracked = block_on(tracker.track_existing(&tabs, 0.0)).unwrap();

        assert_eq!(tracked, 2);
        assert_eq!(store.writes().len(), 1);
    }

    #[test]
    fn test_respond_to_get_tab_data() {
        let (tracker, _) = tracker();
        block_on(tracker.on_open(&tab(1, "https://a.com"), 0.0)).unwrap();

        let snapshot = tracker.respond(&Request::GetTabData);

        assert_eq!(snapshot.open_tabs.len(), 1);
    }
}
