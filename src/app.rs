/// Main application entry point for FoodRate.
/// Wires the router, the shared document store, and the three pages.
use leptos::*;
use leptos_meta::*;
use leptos_router::*;

use crate::components::create_food::CreateFoodPage;
use crate::components::food_page::FoodPage;
use crate::components::home_sections::HomeSections;
use crate::components::search_bar::SearchBar;
use crate::store::appwrite::{AppwriteConfig, AppwriteStore};

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    // One store instance for the whole app; components pick it up from
    // context.
    provide_context(AppwriteStore::new(AppwriteConfig::from_env()));

    view! {
        <Title text="FoodRate"/>
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=HomePage/>
                    <Route path="/food" view=FoodPage/>
                    <Route path="/create" view=CreateFoodPage/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <h1>{"FoodRate"}</h1>
            <p>{"Find a food, rate it from 0-5 stars, and leave a tasty review."}</p>
            <SearchBar/>
            <p class="hint">
                {"Can't find it? "}
                <A href="/create">{"Create a new food"}</A>
            </p>
            <HomeSections/>
        </div>
    }
}
