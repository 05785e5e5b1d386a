use leptos::logging::error;
use leptos::*;
use wasm_bindgen_futures::spawn_local;

use crate::components::star_rating::StarRating;
use crate::stats::{self, HomeStats};
use crate::store::appwrite::AppwriteStore;

/// Landing-page sections: today's top pick and the top-5 leaderboard,
/// computed client-side from the full review stream. Any fetch error shows
/// a generic message instead of partial results.
#[component]
pub fn HomeSections() -> impl IntoView {
    let store = expect_context::<AppwriteStore>();
    let (loading, set_loading) = create_signal(true);
    let (error, set_error) = create_signal(None::<String>);
    let (home, set_home) = create_signal(HomeStats::default());

    let alive = store_value(true);
    on_cleanup(move || alive.set_value(false));

    spawn_local(async move {
        store.ensure_anon_session().await;
        match stats::load_home_stats(&store).await {
            Ok(loaded) => {
                if !alive.get_value() {
                    return;
                }
                set_home.set(loaded);
            }
            Err(err) => {
                error!("[HOME] Failed to load stats: {err}");
                if !alive.get_value() {
                    return;
                }
                set_error.set(Some("Failed to load stats".to_string()));
            }
        }
        if alive.get_value() {
            set_loading.set(false);
        }
    });

    view! {
        <div class="home-sections">
            <Show when=move || !loading.get()>
                <Show when=move || error.get().is_some()>
                    <div class="error">{move || error.get().unwrap_or_default()}</div>
                </Show>
                <Show when=move || error.get().is_none()>
                    <section class="top-pick">
                        <h2>{"Today's top pick"}</h2>
                        {move || match home.get().top_pick {
                            None => view! {
                                <div class="empty">
                                    {"No reviews yet. Be the first to rate a food!"}
                                </div>
                            }
                                .into_view(),
                            Some(pick) => {
                                let avg = pick.stats.rounded_avg();
                                view! {
                                    <a
                                        class="top-pick-card"
                                        href=format!(
                                            "/food?id={}",
                                            urlencoding::encode(&pick.food.id),
                                        )
                                    >
                                        <img src=pick.food.image_url.clone() alt=pick.food.name.clone()/>
                                        <div class="top-pick-body">
                                            <div class="name">{pick.food.name.clone()}</div>
                                            <div class="description">{pick.food.description.clone()}</div>
                                            <StarRating value=Signal::derive(move || avg) read_only=true/>
                                            <span class="count">
                                                {format!("{} review(s)", pick.stats.count)}
                                            </span>
                                        </div>
                                    </a>
                                }
                                    .into_view()
                            }
                        }}
                    </section>
                    <section class="leaderboard">
                        <h2>{"Leaderboard"}</h2>
                        <Show when=move || home.get().leaderboard.is_empty()>
                            <div class="empty">{"No data yet."}</div>
                        </Show>
                        <ol>
                            {move || {
                                home.get()
                                    .leaderboard
                                    .into_iter()
                                    .enumerate()
                                    .map(|(rank, entry)| {
                                        let avg = entry.stats.rounded_avg();
                                        view! {
                                            <li class="leaderboard-row">
                                                <span class="rank">{rank + 1}</span>
                                                <a href=format!(
                                                    "/food?id={}",
                                                    urlencoding::encode(&entry.food.id),
                                                )>{entry.food.name.clone()}</a>
                                                <StarRating
                                                    value=Signal::derive(move || avg)
                                                    read_only=true
                                                />
                                                <span class="count">
                                                    {format!("{} reviews", entry.stats.count)}
                                                </span>
                                            </li>
                                        }
                                    })
                                    .collect::<Vec<_>>()
                            }}
                        </ol>
                    </section>
                </Show>
            </Show>
        </div>
    }
}
