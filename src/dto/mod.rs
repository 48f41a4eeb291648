//! Data transfer shapes: remote API payloads and template view models.

pub mod api;
pub mod categories;
pub mod products;
