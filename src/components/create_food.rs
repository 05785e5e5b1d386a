use leptos::ev::SubmitEvent;
use leptos::logging::error;
use leptos::*;
use leptos_router::{use_navigate, use_query_map};
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;

use crate::models::food::{Food, NewFood, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use crate::store::appwrite::AppwriteStore;
use crate::store::{Collection, DocumentStore};

/// Food-creation form. The name is prefilled from the `?name=` query
/// parameter (the search dropdown links here). Validation happens
/// client-side before any network call; on success we navigate to the new
/// food's page.
#[component]
pub fn CreateFoodPage() -> impl IntoView {
    let store = store_value(expect_context::<AppwriteStore>());
    let params = use_query_map();
    let initial_name = params.with_untracked(|p| p.get("name").cloned().unwrap_or_default());

    let (name, set_name) = create_signal(initial_name);
    let (image_url, set_image_url) = create_signal(String::new());
    let (description, set_description) = create_signal(String::new());
    let (loading, set_loading) = create_signal(false);
    let (error, set_error) = create_signal(None::<String>);

    let alive = store_value(true);
    on_cleanup(move || alive.set_value(false));

    {
        let store = store.get_value();
        spawn_local(async move {
            store.ensure_anon_session().await;
        });
    }

    let draft = move || NewFood {
        name: name.get(),
        image_url: image_url.get(),
        description: description.get(),
    };
    let valid = move || draft().is_valid();

    let navigate = use_navigate();
    let handle_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let draft = draft();
        if !valid() || loading.get_untracked() {
            return;
        }
        let store = store.get_value();
        let navigate = navigate.clone();
        set_loading.set(true);
        set_error.set(None);
        spawn_local(async move {
            let doc_id = Uuid::new_v4().to_string();
            match store
                .create_document(Collection::Food, &doc_id, &draft.fields())
                .await
            {
                Ok(doc) => {
                    let created_id = serde_json::from_value::<Food>(doc)
                        .map(|food| food.id)
                        .unwrap_or(doc_id);
                    if !alive.get_value() {
                        return;
                    }
                    navigate(
                        &format!("/food?id={}", urlencoding::encode(&created_id)),
                        Default::default(),
                    );
                }
                Err(err) => {
                    error!("[CREATE] Failed to create food: {err}");
                    if alive.get_value() {
                        set_error.set(Some("Failed to create food".to_string()));
                    }
                }
            }
            if alive.get_value() {
                set_loading.set(false);
            }
        });
    };

    view! {
        <div class="create-food">
            <h1>{"Create a new food"}</h1>
            <form on:submit=handle_submit>
                <label>{"Name"}</label>
                <input
                    type="text"
                    prop:value=name
                    maxlength=MAX_NAME_LEN.to_string()
                    on:input=move |ev| set_name.set(event_target_value(&ev))
                />
                <p class="hint">{format!("Max {MAX_NAME_LEN} chars")}</p>

                <label>{"Image URL"}</label>
                <input
                    type="text"
                    prop:value=image_url
                    placeholder="https://..."
                    on:input=move |ev| set_image_url.set(event_target_value(&ev))
                />

                <label>{"Description"}</label>
                <textarea
                    prop:value=description
                    maxlength=MAX_DESCRIPTION_LEN.to_string()
                    on:input=move |ev| set_description.set(event_target_value(&ev))
                ></textarea>
                <p class="hint">{format!("Max {MAX_DESCRIPTION_LEN} chars")}</p>

                <Show when=move || error.get().is_some()>
                    <div class="error">{move || error.get().unwrap_or_default()}</div>
                </Show>
                <button type="submit" disabled=move || !valid() || loading.get()>
                    {move || if loading.get() { "Creating..." } else { "Create food" }}
                </button>
            </form>
        </div>
    }
}
