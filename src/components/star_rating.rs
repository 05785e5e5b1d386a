use leptos::*;

/// 0..5 star widget. Interactive unless `read_only`; hovering previews the
/// rating before a click commits it.
#[component]
pub fn StarRating(
    #[prop(into)] value: Signal<f64>,
    #[prop(optional, into)] on_change: Option<Callback<u8>>,
    #[prop(optional, into)] read_only: MaybeSignal<bool>,
) -> impl IntoView {
    let (hover, set_hover) = create_signal(None::<u8>);
    let display = move || hover.get().map(f64::from).unwrap_or_else(|| value.get());

    view! {
        <div class="star-rating">
            {(1..=5u8)
                .map(|star| {
                    let filled = move || display() >= star as f64;
                    view! {
                        <button
                            type="button"
                            class="star"
                            class:filled=filled
                            disabled=move || read_only.get()
                            on:mouseenter=move |_| {
                                if !read_only.get() {
                                    set_hover.set(Some(star));
                                }
                            }
                            on:mouseleave=move |_| {
                                if !read_only.get() {
                                    set_hover.set(None);
                                }
                            }
                            on:click=move |_| {
                                if read_only.get() {
                                    return;
                                }
                                if let Some(on_change) = on_change {
                                    on_change.call(star);
                                }
                            }
                        >
                            {move || if filled() { "★" } else { "☆" }}
                        </button>
                    }
                })
                .collect::<Vec<_>>()}
            <span class="star-rating-value">{move || format!("{}/5", value.get())}</span>
        </div>
    }
}
