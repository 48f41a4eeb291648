//! Domain entities and value objects, free of persistence and HTTP concerns.

pub mod category;
pub mod product;
pub mod product_image;
pub mod types;
