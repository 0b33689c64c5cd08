/// Data structures for Tab Tracker
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};

/// Identifier the browser assigns to a tab. Reused after the tab closes.
pub type TabId = i32;

/// Frame id of a tab's top-level document in navigation events
pub const TOP_LEVEL_FRAME: i32 = 0;

/// The subset of a browser tab object the tracker reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserTab {
    pub id: Option<TabId>,
    pub url: Option<String>,
    pub title: Option<String>,
}

impl BrowserTab {
    pub fn new(id: TabId, url: &str, title: &str) -> BrowserTab {
        BrowserTab {
            id: Some(id),
            url: Some(url.to_string()),
            title: Some(title.to_string()),
        }
    }
}

/// Raw change payload from a tab update notification.
///
/// `url` and `title` are read by the tracker; everything else the browser
/// sent (status, favIconUrl, ...) is kept verbatim in `other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl TabChange {
    pub fn url(url: &str) -> TabChange {
        TabChange {
            url: Some(url.to_string()),
            ..TabChange::default()
        }
    }

    pub fn title(title: &str) -> TabChange {
        TabChange {
            title: Some(title.to_string()),
            ..TabChange::default()
        }
    }

    pub fn touches_location_or_title(&self) -> bool {
        self.url.is_some() || self.title.is_some()
    }
}

/// Details of a committed navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationDetails {
    pub tab_id: TabId,
    pub url: String,
    pub frame_id: i32,
}

/// What happened to a tab at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum HistoryEvent {
    Opened { url: String, title: String },
    Updated { url: String, title: String, changes: TabChange },
    Activated,
    Search { query: String },
    Closed,
}

/// One entry of a tab's event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: f64,
    #[serde(flatten)]
    pub event: HistoryEvent,
}

impl HistoryEntry {
    pub fn new(timestamp: f64, event: HistoryEvent) -> HistoryEntry {
        HistoryEntry { timestamp, event }
    }
}

/// Activity record for a tab that is currently open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub opened_at: f64,
    pub last_activated: f64,
    pub activation_count: u32,
    pub time_spent: f64,
    pub search_query: Option<String>,
    pub history: VecDeque<HistoryEntry>,
}

impl TabRecord {
    pub fn opened(id: TabId, url: &str, title: &str, search_query: Option<String>, now: f64) -> TabRecord {
        let mut history = VecDeque::new();
        history.push_back(HistoryEntry::new(
            now,
            HistoryEvent::Opened {
                url: url.to_string(),
                title: title.to_string(),
            },
        ));

        TabRecord {
            id,
            url: url.to_string(),
            title: title.to_string(),
            opened_at: now,
            last_activated: now,
            activation_count: 1,
            time_spent: 0.0,
            search_query,
            history,
        }
    }

    /// Append to the event log, dropping the oldest entries beyond `limit`
    pub fn push_history(&mut self, entry: HistoryEntry, limit: Option<usize>) {
        self.history.push_back(entry);
        if let Some(limit) = limit {
            let limit = limit.max(1);
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    /// Add the time elapsed since the last activation to `time_spent`.
    /// A clock that moved backwards contributes nothing.
    pub fn accumulate_time(&mut self, now: f64) {
        self.time_spent += (now - self.last_activated).max(0.0);
    }
}

/// A tab record moved to the archive when its tab closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedTabRecord {
    #[serde(flatten)]
    pub record: TabRecord,
    pub closed_at: f64,
}

/// Read-only view of everything the tracker knows, as served to the popup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    pub open_tabs: HashMap<TabId, TabRecord>,
    pub closed_tabs: Vec<ArchivedTabRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opened_record() {
        let record = TabRecord::opened(7, "https://github.com", "GitHub", None, 1000.0);

        assert_eq!(record.id, 7);
        assert_eq!(record.activation_count, 1);
        assert_eq!(record.time_spent, 0.0);
        assert_eq!(record.opened_at, record.last_activated);
        assert_eq!(record.history.len(), 1);
        assert!(matches!(record.history[0].event, HistoryEvent::Opened { .. }));
    }

    #[test]
    fn test_push_history_limit() {
        let mut record = TabRecord::opened(1, "https://a.com", "A", None, 0.0);

        for i in 1..10 {
            record.push_history(HistoryEntry::new(i as f64, HistoryEvent::Activated), Some(3));
        }

        assert_eq!(record.history.len(), 3);
        assert_eq!(record.history[0].timestamp, 7.0);
        assert_eq!(record.history[2].timestamp, 9.0);
    }

    #[test]
    fn test_push_history_unbounded() {
        let mut record = TabRecord::opened(1, "https://a.com", "A", None, 0.0);

        for i in 1..10 {
            record.push_history(HistoryEntry::new(i as f64, HistoryEvent::Activated), None);
        }

        assert_eq!(record.history.len(), 10);
    }

    #[test]
    fn test_accumulate_time_ignores_clock_skew() {
        let mut record = TabRecord::opened(1, "https://a.com", "A", None, 5000.0);

        record.accumulate_time(4000.0);
        assert_eq!(record.time_spent, 0.0);

        record.accumulate_time(6500.0);
        assert_eq!(record.time_spent, 1500.0);
    }

    #[test]
    fn test_history_entry_wire_format() {
        let entry = HistoryEntry::new(
            42.0,
            HistoryEvent::Search {
                query: "rust wasm".to_string(),
            },
        );

        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["event"], "search");
        assert_eq!(json["query"], "rust wasm");
        assert_eq!(json["timestamp"], 42.0);
    }

    #[test]
    fn test_tab_change_keeps_unknown_fields() {
        let change: TabChange =
            serde_json::from_str(r#"{"title":"Docs","status":"complete","favIconUrl":"x.png"}"#).unwrap();

        assert_eq!(change.title.as_deref(), Some("Docs"));
        assert_eq!(change.url, None);
        assert_eq!(change.other.get("status"), Some(&Value::from("complete")));
        assert!(change.touches_location_or_title());

        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["favIconUrl"], "x.png");
        assert!(json.get("url").is_none());
    }

    #[test]
    fn test_archived_record_serialization() {
        let archived = ArchivedTabRecord {
            record: TabRecord::opened(3, "https://bing.com/?q=x", "Bing", Some("x".to_string()), 10.0),
            closed_at: 20.0,
        };

        let json = serde_json::to_value(&archived).unwrap();
        assert_eq!(json["closedAt"], 20.0);
        assert_eq!(json["searchQuery"], "x");
        assert_eq!(json["activationCount"], 1);

        let deserialized: ArchivedTabRecord = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, archived);
    }

    #[test]
    fn test_snapshot_uses_string_keys() {
        let mut snapshot = TabSnapshot::default();
        snapshot
            .open_tabs
            .insert(12, TabRecord::opened(12, "https://a.com", "A", None, 0.0));

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""openTabs":{"12":"#));
        assert!(json.contains(r#""closedTabs":[]"#));

        let back: TabSnapshot = serde_json::from_str(&json).unwrap();
        assert!(back.open_tabs.contains_key(&12));
    }

    #[test]
    fn test_browser_tab_ignores_extra_fields() {
        let tab: BrowserTab =
            serde_json::from_str(r#"{"id":5,"url":"https://a.com","pinned":true,"index":2}"#).unwrap();

        assert_eq!(tab.id, Some(5));
        assert_eq!(tab.title, None);
    }
}
