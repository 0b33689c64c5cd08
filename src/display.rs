/// View computations for the popup: ordering, truncation, stats

use crate::tab_record::{ArchivedTabRecord, TabRecord, TabSnapshot};

/// Most closed tabs shown in the closed view
pub const CLOSED_VIEW_LIMIT: usize = 100;

/// Aggregate numbers shown above the tab list
#[derive(Debug, Clone, PartialEq)]
pub struct TabStats {
    pub open_count: usize,
    pub closed_count: usize,
    /// Sum of `time_spent` over open tabs only
    pub total_time_spent: f64,
}

impl TabStats {
    pub fn from_snapshot(snapshot: &TabSnapshot) -> TabStats {
        TabStats {
            open_count: snapshot.open_tabs.len(),
            closed_count: snapshot.closed_tabs.len(),
            total_time_spent: snapshot.open_tabs.values().map(|tab| tab.time_spent).sum(),
        }
    }
}

/// Open tabs, most recently activated first
pub fn open_view(snapshot: &TabSnapshot) -> Vec<&TabRecord> {
    let mut tabs: Vec<&TabRecord> = snapshot.open_tabs.values().collect();
    tabs.sort_by(|a, b| b.last_activated.total_cmp(&a.last_activated).then_with(|| a.id.cmp(&b.id)));
    tabs
}

/// The most recently closed tabs, newest first
pub fn closed_view(snapshot: &TabSnapshot) -> Vec<&ArchivedTabRecord> {
    let mut tabs: Vec<&ArchivedTabRecord> = snapshot.closed_tabs.iter().collect();
    tabs.sort_by(|a, b| b.closed_at.total_cmp(&a.closed_at));
    tabs.truncate(CLOSED_VIEW_LIMIT);
    tabs
}

/// Format a duration in milliseconds as `1h 5m`, `3m 20s` or `42s`
pub fn format_time(ms: f64) -> String {
    let seconds = (ms.max(0.0) / 1000.0).floor() as u64;
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}
