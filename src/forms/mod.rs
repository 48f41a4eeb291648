//! Submitted form payloads and their validation.

pub mod products;
