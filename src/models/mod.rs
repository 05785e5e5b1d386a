pub mod food;
pub mod review;
