use leptos::ev::SubmitEvent;
use leptos::logging::error;
use leptos::*;
use leptos_router::use_query_map;
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;

use crate::components::star_rating::StarRating;
use crate::models::food::Food;
use crate::models::review::{NewReview, Review, MAX_REVIEW_LEN};
use crate::store::appwrite::AppwriteStore;
use crate::store::{Collection, DocumentStore, ErrorKind, Query};

const REVIEW_PAGE_SIZE: usize = 10;

/// Food detail page: the food itself, its reviews paginated ten at a time,
/// and the review form. When the backend signals that the review collection
/// is missing the `foodId` attribute, the form degrades to a disabled state
/// with an explanatory banner instead of failing hard.
#[component]
pub fn FoodPage() -> impl IntoView {
    let store = store_value(expect_context::<AppwriteStore>());
    let params = use_query_map();
    let id = Signal::derive(move || params.with(|p| p.get("id").cloned()));

    let (food, set_food) = create_signal(None::<Food>);
    let (loading, set_loading) = create_signal(true);
    let (error, set_error) = create_signal(None::<String>);

    let (reviews, set_reviews) = create_signal(Vec::<Review>::new());
    let (rev_loading, set_rev_loading) = create_signal(false);
    let (has_more, set_has_more) = create_signal(false);
    let cursor = store_value(None::<String>);
    let (reviews_supported, set_reviews_supported) = create_signal(true);
    let (support_msg, set_support_msg) = create_signal(None::<String>);

    let (author, set_author) = create_signal(String::new());
    let (rating, set_rating) = create_signal(0u8);
    let (text, set_text) = create_signal(String::new());
    let (submitting, set_submitting) = create_signal(false);

    let alive = store_value(true);
    on_cleanup(move || alive.set_value(false));

    let load_reviews = move |food_id: String, after: Option<String>| {
        let store = store.get_value();
        spawn_local(async move {
            set_rev_loading.set(true);
            let mut queries = vec![
                Query::Equal("foodId".to_string(), food_id),
                Query::Limit(REVIEW_PAGE_SIZE),
            ];
            if let Some(after) = &after {
                queries.push(Query::CursorAfter(after.clone()));
            }
            match store.list_documents(Collection::Review, &queries).await {
                Ok(docs) => {
                    if !alive.get_value() {
                        return;
                    }
                    let page: Vec<Review> = docs
                        .into_iter()
                        .filter_map(|doc| serde_json::from_value(doc).ok())
                        .collect();
                    set_has_more.set(page.len() >= REVIEW_PAGE_SIZE);
                    cursor.set_value(page.last().map(|review| review.id.clone()));
                    if after.is_some() {
                        set_reviews.update(|all| all.extend(page));
                    } else {
                        set_reviews.set(page);
                    }
                }
                Err(err) => {
                    error!("[FOOD] Failed to load reviews: {err}");
                    if !alive.get_value() {
                        return;
                    }
                    if err.kind == ErrorKind::MissingAttribute {
                        set_reviews_supported.set(false);
                        set_support_msg.set(Some(
                            "The review collection is missing the \"foodId\" attribute. \
                             Add it to enable reviews."
                                .to_string(),
                        ));
                        set_reviews.set(Vec::new());
                        set_has_more.set(false);
                        cursor.set_value(None);
                    }
                }
            }
            if alive.get_value() {
                set_rev_loading.set(false);
            }
        });
    };

    create_effect(move |_| {
        let Some(food_id) = id.get() else { return };
        set_food.set(None);
        set_loading.set(true);
        set_error.set(None);
        set_reviews.set(Vec::new());
        cursor.set_value(None);
        set_has_more.set(false);

        let store = store.get_value();
        {
            let food_id = food_id.clone();
            spawn_local(async move {
                store.ensure_anon_session().await;
                match store.get_document(Collection::Food, &food_id).await {
                    Ok(doc) => match serde_json::from_value::<Food>(doc) {
                        Ok(loaded) => {
                            if alive.get_value() {
                                set_food.set(Some(loaded));
                            }
                        }
                        Err(err) => {
                            error!("[FOOD] Malformed food document: {err}");
                            if alive.get_value() {
                                set_error.set(Some("Failed to load food".to_string()));
                            }
                        }
                    },
                    Err(err) => {
                        error!("[FOOD] Failed to load food: {err}");
                        if alive.get_value() {
                            let message = if err.kind == ErrorKind::NotFound {
                                "Not found"
                            } else {
                                "Failed to load food"
                            };
                            set_error.set(Some(message.to_string()));
                        }
                    }
                }
                if alive.get_value() {
                    set_loading.set(false);
                }
            });
        }
        load_reviews(food_id, None);
    });

    // Average over the reviews loaded so far, rounded to one decimal.
    let average = Signal::derive(move || {
        reviews.with(|all| {
            if all.is_empty() {
                return 0.0;
            }
            let sum: f64 = all.iter().map(|review| review.rating).sum();
            ((sum / all.len() as f64) * 10.0).round() / 10.0
        })
    });

    let can_submit = move || {
        reviews_supported.get()
            && NewReview {
                food_id: String::new(),
                author: author.get(),
                text: text.get(),
                rating: rating.get(),
            }
            .is_valid()
    };

    let handle_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let Some(food_id) = id.get_untracked() else { return };
        if !can_submit() || submitting.get_untracked() {
            return;
        }
        let new_review = NewReview {
            food_id,
            author: author.get_untracked(),
            text: text.get_untracked(),
            rating: rating.get_untracked(),
        };
        let store = store.get_value();
        set_submitting.set(true);
        spawn_local(async move {
            let doc_id = Uuid::new_v4().to_string();
            match store
                .create_document(Collection::Review, &doc_id, &new_review.fields())
                .await
            {
                Ok(doc) => {
                    if !alive.get_value() {
                        return;
                    }
                    if let Ok(created) = serde_json::from_value::<Review>(doc) {
                        set_reviews.update(|all| all.insert(0, created));
                    }
                    set_author.set(String::new());
                    set_text.set(String::new());
                    set_rating.set(0);
                }
                Err(err) => error!("[FOOD] Failed to submit review: {err}"),
            }
            if alive.get_value() {
                set_submitting.set(false);
            }
        });
    };

    view! {
        <div class="food-page">
            <Show when=move || id.get().is_none()>
                <div class="error">{"Missing id in URL (use /food?id=...)"}</div>
            </Show>
            <Show when=move || id.get().is_some() && loading.get()>
                <div class="loading">{"Loading..."}</div>
            </Show>
            <Show when=move || error.get().is_some()>
                <div class="error">{move || error.get().unwrap_or_default()}</div>
            </Show>
            {move || {
                food.get()
                    .map(|food| {
                        view! {
                            <div class="food-header">
                                <img src=food.image_url.clone() alt=food.name.clone()/>
                                <div>
                                    <h1>{food.name.clone()}</h1>
                                    <p>{food.description.clone()}</p>
                                    <div class="average">
                                        <span>{"Average rating"}</span>
                                        <StarRating value=average read_only=true/>
                                        <span class="count">
                                            {move || format!("{} review(s)", reviews.with(Vec::len))}
                                        </span>
                                    </div>
                                </div>
                            </div>
                        }
                    })
            }}
            <Show when=move || food.get().is_some()>
                <form class="review-form" on:submit=handle_submit>
                    <h2>{"Write a review"}</h2>
                    <Show when=move || !reviews_supported.get()>
                        <div class="banner">{move || support_msg.get().unwrap_or_default()}</div>
                    </Show>
                    <label>{"Username"}</label>
                    <input
                        type="text"
                        prop:value=author
                        disabled=move || !reviews_supported.get()
                        on:input=move |ev| set_author.set(event_target_value(&ev))
                    />
                    <label>{"Rating"}</label>
                    <StarRating
                        value=Signal::derive(move || rating.get() as f64)
                        on_change=Callback::new(move |star| set_rating.set(star))
                        read_only=Signal::derive(move || !reviews_supported.get())
                    />
                    <label>{"Review"}</label>
                    <textarea
                        prop:value=text
                        maxlength=MAX_REVIEW_LEN.to_string()
                        disabled=move || !reviews_supported.get()
                        on:input=move |ev| set_text.set(event_target_value(&ev))
                    ></textarea>
                    <div class="char-count">
                        {move || format!("{}/{}", text.with(|t| t.chars().count()), MAX_REVIEW_LEN)}
                    </div>
                    <button
                        type="submit"
                        disabled=move || !can_submit() || submitting.get()
                    >
                        {move || if submitting.get() { "Submitting..." } else { "Submit review" }}
                    </button>
                </form>
                <section class="reviews">
                    <h2>{"Reviews"}</h2>
                    <ul>
                        <For each=move || reviews.get() key=|review| review.id.clone() let:review>
                            <li class="review">
                                <div class="review-head">
                                    <span class="author">{review.author.clone()}</span>
                                    <StarRating
                                        value=Signal::derive({
                                            let rating = review.rating;
                                            move || rating
                                        })
                                        read_only=true
                                    />
                                </div>
                                <p>{review.text.clone()}</p>
                            </li>
                        </For>
                    </ul>
                    <Show when=move || has_more.get()>
                        <button
                            disabled=move || rev_loading.get()
                            on:click=move |_| {
                                if let Some(food_id) = id.get_untracked() {
                                    load_reviews(food_id, cursor.get_value());
                                }
                            }
                        >
                            {move || if rev_loading.get() { "Loading..." } else { "Load more" }}
                        </button>
                    </Show>
                </section>
            </Show>
        </div>
    }
}
