use leptos::*;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;

use crate::models::food::Food;
use crate::search::{self, DEBOUNCE_MS};
use crate::store::appwrite::AppwriteStore;

/// Debounced incremental search box. Each keystroke restarts a 250ms timer;
/// when it fires, exactly one query goes out for the then-current text.
/// Stale timers and stale responses are both discarded by a per-keystroke
/// generation check on top of the mount-liveness flag, so a slow earlier
/// response can never overwrite a faster later one.
#[component]
pub fn SearchBar() -> impl IntoView {
    let store = expect_context::<AppwriteStore>();
    let (query, set_query) = create_signal(String::new());
    let (results, set_results) = create_signal(Vec::<Food>::new());
    let (searching, set_searching) = create_signal(false);

    let generation = store_value(0u64);
    let alive = store_value(true);
    on_cleanup(move || alive.set_value(false));

    {
        let store = store.clone();
        spawn_local(async move {
            store.ensure_anon_session().await;
        });
    }

    let on_input = move |ev| {
        let value = event_target_value(&ev);
        set_query.set(value.clone());
        generation.update_value(|g| *g += 1);
        let current = generation.get_value();
        let store = store.clone();
        spawn_local(async move {
            gloo_timers::future::sleep(Duration::from_millis(DEBOUNCE_MS)).await;
            if !alive.get_value() || generation.get_value() != current {
                return;
            }
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                set_results.set(Vec::new());
                set_searching.set(false);
                return;
            }
            set_searching.set(true);
            let found = search::resolve_query(&store, &trimmed).await;
            if !alive.get_value() || generation.get_value() != current {
                return;
            }
            set_results.set(found);
            set_searching.set(false);
        });
    };

    let show_dropdown = move || !query.get().trim().is_empty();

    view! {
        <div class="search-bar">
            <input
                type="text"
                placeholder="Search tasty foods..."
                prop:value=query
                on:input=on_input
            />
            <Show when=show_dropdown>
                <div class="search-results">
                    <Show when=move || searching.get()>
                        <div class="searching">{"Searching..."}</div>
                    </Show>
                    <Show when=move || !searching.get() && results.get().is_empty()>
                        <div class="no-results">
                            {"No results. "}
                            <a href=move || {
                                format!("/create?name={}", urlencoding::encode(&query.get()))
                            }>{move || format!("Create \"{}\"", query.get())}</a>
                        </div>
                    </Show>
                    <Show when=move || !searching.get()>
                        <For each=move || results.get() key=|food| food.id.clone() let:food>
                            <a
                                class="search-result"
                                href=format!("/food?id={}", urlencoding::encode(&food.id))
                            >
                                {food.name.clone()}
                            </a>
                        </For>
                    </Show>
                </div>
            </Show>
        </div>
    }
}
