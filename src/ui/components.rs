/// Reusable UI components

use crate::display::format_time;
use web_sys::MouseEvent;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct StatCardProps {
    pub value: String,
    pub label: AttrValue,
}

#[function_component(StatCard)]
pub fn stat_card(props: &StatCardProps) -> Html {
    html! {
        <div class="stat-card">
            <div class="stat-value">{&props.value}</div>
            <div class="stat-label">{props.label.clone()}</div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ViewTabProps {
    pub label: AttrValue,
    pub active: bool,
    pub onclick: Callback<MouseEvent>,
}

/// One entry of the open/closed switcher
#[function_component(ViewTab)]
pub fn view_tab(props: &ViewTabProps) -> Html {
    let class = if props.active {
        "pf-v5-c-tabs__item pf-m-current"
    } else {
        "pf-v5-c-tabs__item"
    };

    html! {
        <li class={class}>
            <button class="pf-v5-c-tabs__link" onclick={props.onclick.clone()}>
                <span class="pf-v5-c-tabs__item-text">{props.label.clone()}</span>
            </button>
        </li>
    }
}

#[derive(Properties, PartialEq)]
pub struct TabEntryProps {
    pub title: String,
    pub url: String,
    #[prop_or_default]
    pub search_query: Option<String>,
    pub time_spent: f64,
    pub activation_count: u32,
    /// "Opened: ..." or "Closed: ..."
    pub when: String,
}

#[function_component(TabEntry)]
pub fn tab_entry(props: &TabEntryProps) -> Html {
    let title = if props.title.is_empty() { "Untitled" } else { props.title.as_str() };

    html! {
        <div class="tab-item">
            <div class="tab-title">{title}</div>
            <div class="tab-url">{&props.url}</div>
            if let Some(query) = &props.search_query {
                <div class="search-query">{format!("🔍 {}", query)}</div>
            }
            <div class="tab-meta">
                <span>{format!("⏱️ {}", format_time(props.time_spent))}</span>
                <span>{format!("🔄 {} activations", props.activation_count)}</span>
                <span>{format!("📅 {}", props.when)}</span>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct EmptyStateProps {
    pub message: AttrValue,
}

#[function_component(EmptyState)]
pub fn empty_state(props: &EmptyStateProps) -> Html {
    html! {
        <div class="empty-state">{props.message.clone()}</div>
    }
}
