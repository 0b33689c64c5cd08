/// Popup UI for Tab Tracker

use crate::bridge::request_tab_data;
use crate::display::{TabStats, closed_view, format_time, open_view};
use crate::tab_record::TabSnapshot;
use crate::ui::components::{EmptyState, StatCard, TabEntry, ViewTab};
use patternfly_yew::prelude::*;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum AppState {
    Loading,
    Idle,
    Error(String),
}

#[derive(Clone, Copy, PartialEq)]
enum ActiveView {
    Open,
    Closed,
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Loading);
    let snapshot = use_state(TabSnapshot::default);
    let active_view = use_state(|| ActiveView::Open);

    // Fetch tab data from the background on mount
    {
        let state = state.clone();
        let snapshot = snapshot.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match request_tab_data().await {
                    Ok(data) => {
                        snapshot.set(data);
                        state.set(AppState::Idle);
                    }
                    Err(e) => {
                        log::error!("Failed to load tab data: {}", e);
                        state.set(AppState::Error(e));
                    }
                }
            });
            || ()
        });
    }

    let on_view_click = {
        let active_view = active_view.clone();
        move |view: ActiveView| {
            let active_view = active_view.clone();
            Callback::from(move |_: MouseEvent| {
                active_view.set(view);
            })
        }
    };

    let stats = TabStats::from_snapshot(&snapshot);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tab Tracker"}</h1>

            <div class="stats">
                <StatCard value={stats.open_count.to_string()} label="Open Tabs" />
                <StatCard value={stats.closed_count.to_string()} label="Closed Tabs" />
                <StatCard value={format_time(stats.total_time_spent)} label="Time Spent" />
            </div>

            <div class="pf-v5-c-tabs tabs-nav">
                <ul class="pf-v5-c-tabs__list">
                    <ViewTab
                        label="Open"
                        active={*active_view == ActiveView::Open}
                        onclick={on_view_click(ActiveView::Open)}
                    />
                    <ViewTab
                        label="Closed"
                        active={*active_view == ActiveView::Closed}
                        onclick={on_view_click(ActiveView::Closed)}
                    />
                </ul>
            </div>

            {match &*state {
                AppState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => render_tab_list(&snapshot, *active_view),
            }}
        </div>
    }
}

fn render_tab_list(snapshot: &TabSnapshot, view: ActiveView) -> Html {
    match view {
        ActiveView::Open => {
            let tabs = open_view(snapshot);
            if tabs.is_empty() {
                return html! { <EmptyState message="No open tabs tracked" /> };
            }

            html! {
                <div class="tab-list">
                    {for tabs.into_iter().map(|tab| html! {
                        <TabEntry
                            key={tab.id.to_string()}
                            title={tab.title.clone()}
                            url={tab.url.clone()}
                            search_query={tab.search_query.clone()}
                            time_spent={tab.time_spent}
                            activation_count={tab.activation_count}
                            when={format!("Opened: {}", format_timestamp(tab.opened_at))}
                        />
                    })}
                </div>
            }
        }
        ActiveView::Closed => {
            let tabs = closed_view(snapshot);
            if tabs.is_empty() {
                return html! { <EmptyState message="No closed tabs in history" /> };
            }

            html! {
                <div class="tab-list">
                    {for tabs.into_iter().map(|archived| html! {
                        <TabEntry
                            title={archived.record.title.clone()}
                            url={archived.record.url.clone()}
                            search_query={archived.record.search_query.clone()}
                            time_spent={archived.record.time_spent}
                            activation_count={archived.record.activation_count}
                            when={format!("Closed: {}", format_timestamp(archived.closed_at))}
                        />
                    })}
                </div>
            }
        }
    }
}

fn format_timestamp(ms: f64) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(ms));
    date.to_locale_string("default", &JsValue::UNDEFINED).into()
}
