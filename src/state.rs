/// Tab state reducer: applies tab lifecycle events to the open-tab map and
/// the closed-tab archive
use crate::config::TrackerConfig;
use crate::search::extract_search_query;
use crate::tab_record::{
    ArchivedTabRecord, BrowserTab, HistoryEntry, HistoryEvent, TabChange, TabId, TabRecord, TabSnapshot,
    TOP_LEVEL_FRAME,
};
use std::collections::{HashMap, VecDeque};

/// Why an event left the state untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    InvalidTabId,
    Untracked,
    SubFrame,
    NoSearchQuery,
    NoChange,
}

/// What an event did to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A record was created by an open event
    Tracked,
    /// An update or activation arrived for a tab never seen opening,
    /// so a record was created for it instead
    TrackedImplicitly,
    Updated,
    Activated,
    Searched,
    Archived,
    Ignored(IgnoreReason),
}

/// Which persisted collections an outcome dirtied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dirty {
    Nothing,
    OpenTabs,
    OpenAndClosedTabs,
}

impl Outcome {
    pub fn dirty(&self) -> Dirty {
        match self {
            Outcome::Ignored(_) => Dirty::Nothing,
            Outcome::Archived => Dirty::OpenAndClosedTabs,
            _ => Dirty::OpenTabs,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Tracked => "tracked",
            Outcome::TrackedImplicitly => "tracked-implicitly",
            Outcome::Updated => "updated",
            Outcome::Activated => "activated",
            Outcome::Searched => "searched",
            Outcome::Archived => "archived",
            Outcome::Ignored(_) => "ignored",
        }
    }
}

/// Open tab records keyed by tab id, plus the bounded archive of closed ones
#[derive(Debug, Clone, Default)]
pub struct TabState {
    open_tabs: HashMap<TabId, TabRecord>,
    closed_tabs: VecDeque<ArchivedTabRecord>,
    config: TrackerConfig,
}

impl TabState {
    pub fn new(config: TrackerConfig) -> Self {
        TabState {
            open_tabs: HashMap::new(),
            closed_tabs: VecDeque::new(),
            config,
        }
    }

    /// Rebuild state from persisted collections. An archive stored under a
    /// larger capacity is trimmed to the current one.
    pub fn from_parts(
        open_tabs: HashMap<TabId, TabRecord>,
        closed_tabs: VecDeque<ArchivedTabRecord>,
        config: TrackerConfig,
    ) -> Self {
        let mut state = TabState {
            open_tabs,
            closed_tabs,
            config,
        };
        state.evict_archive();
        state
    }

    pub fn open_tabs(&self) -> &HashMap<TabId, TabRecord> {
        &self.open_tabs
    }

    pub fn closed_tabs(&self) -> &VecDeque<ArchivedTabRecord> {
        &self.closed_tabs
    }

    pub fn get(&self, tab_id: TabId) -> Option<&TabRecord> {
        self.open_tabs.get(&tab_id)
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> TabSnapshot {
        TabSnapshot {
            open_tabs: self.open_tabs.clone(),
            closed_tabs: self.closed_tabs.iter().cloned().collect(),
        }
    }

    /// Start tracking a tab. An existing record with the same id is replaced.
    pub fn on_open(&mut self, tab: &BrowserTab, now: f64) -> Outcome {
        let id = match tab.id {
            Some(id) if id >= 0 => id,
            _ => return Outcome::Ignored(IgnoreReason::InvalidTabId),
        };

        let url = tab.url.as_deref().unwrap_or_default();
        let title = tab.title.as_deref().unwrap_or_default();
        let record = TabRecord::opened(id, url, title, extract_search_query(url), now);
        self.open_tabs.insert(id, record);

        Outcome::Tracked
    }

    /// Apply a url/title change. `tab` is the tab's full current state, used
    /// to create the record if this tab was never seen opening.
    pub fn on_update(&mut self, tab_id: TabId, change: TabChange, tab: &BrowserTab, now: f64) -> Outcome {
        if !change.touches_location_or_title() {
            return Outcome::Ignored(IgnoreReason::NoChange);
        }

        let history_limit = self.config.history_limit;
        let Some(record) = self.open_tabs.get_mut(&tab_id) else {
            return self.open_implicitly(tab_id, tab, now);
        };

        if let Some(url) = &change.url {
            record.url = url.clone();
            record.search_query = extract_search_query(url);
        }
        if let Some(title) = &change.title {
            record.title = title.clone();
        }

        let entry = HistoryEntry::new(
            now,
            HistoryEvent::Updated {
                url: record.url.clone(),
                title: record.title.clone(),
                changes: change,
            },
        );
        record.push_history(entry, history_limit);

        Outcome::Updated
    }

    /// The tab became the active tab
    pub fn on_activate(&mut self, tab_id: TabId, tab: &BrowserTab, now: f64) -> Outcome {
        let history_limit = self.config.history_limit;
        let Some(record) = self.open_tabs.get_mut(&tab_id) else {
            return self.open_implicitly(tab_id, tab, now);
        };

        record.accumulate_time(now);
        record.last_activated = now;
        record.activation_count += 1;
        record.push_history(HistoryEntry::new(now, HistoryEvent::Activated), history_limit);

        Outcome::Activated
    }

    /// A navigation committed in one of the tab's frames
    pub fn on_navigate_committed(&mut self, tab_id: TabId, url: &str, frame_id: i32, now: f64) -> Outcome {
        if frame_id != TOP_LEVEL_FRAME {
            return Outcome::Ignored(IgnoreReason::SubFrame);
        }

        let history_limit = self.config.history_limit;
        let Some(record) = self.open_tabs.get_mut(&tab_id) else {
            return Outcome::Ignored(IgnoreReason::Untracked);
        };
        let Some(query) = extract_search_query(url) else {
            return Outcome::Ignored(IgnoreReason::NoSearchQuery);
        };

        record.search_query = Some(query.clone());
        record.push_history(HistoryEntry::new(now, HistoryEvent::Search { query }), history_limit);

        Outcome::Searched
    }

    /// Finalize the tab's record and move it into the archive
    pub fn on_close(&mut self, tab_id: TabId, now: f64) -> Outcome {
        let Some(mut record) = self.open_tabs.remove(&tab_id) else {
            return Outcome::Ignored(IgnoreReason::Untracked);
        };

        record.accumulate_time(now);
        record.push_history(HistoryEntry::new(now, HistoryEvent::Closed), self.config.history_limit);

        self.closed_tabs.push_back(ArchivedTabRecord { record, closed_at: now });
        self.evict_archive();

        Outcome::Archived
    }

    /// Open every tab the browser already has, e.g. on install or startup.
    /// Returns how many were tracked.
    pub fn track_existing(&mut self, tabs: &[BrowserTab], now: f64) -> usize {
        tabs.iter()
            .filter(|tab| self.on_open(tab, now) == Outcome::Tracked)
            .count()
    }

    fn open_implicitly(&mut self, tab_id: TabId, tab: &BrowserTab, now: f64) -> Outcome {
        let tab = BrowserTab {
            id: tab.id.or(Some(tab_id)),
            ..tab.clone()
        };

        match self.on_open(&tab, now) {
            Outcome::Tracked => Outcome::TrackedImplicitly,
            other => other,
        }
    }

    fn evict_archive(&mut self) {
        while self.closed_tabs.len() > self.config.archive_capacity {
            self.closed_tabs.pop_front();
        }
    }
}
