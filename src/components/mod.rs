pub mod create_food;
pub mod food_page;
pub mod home_sections;
pub mod search_bar;
pub mod star_rating;
