//! Helpers for integration tests.
#![allow(dead_code)]

use catalog_gallery::db::{DbPool, establish_connection_pool, run_migrations};
use catalog_gallery::dto::api::RemoteProduct;
use serde_json::{Value, json};
use tempfile::NamedTempFile;

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        run_migrations(&pool).expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

/// Remote record with one gallery image per entry of `images`.
pub fn remote_product(id: i32, title: &str, category: &str, images: &[&str]) -> RemoteProduct {
    RemoteProduct {
        id,
        title: Some(title.to_string()),
        description: Some(format!("{title} description")),
        price: 9.99,
        category: Some(category.to_string()),
        thumbnail: Some(format!("https://cdn.example.com/{id}/thumbnail.jpg")),
        images: images.iter().map(|url| url.to_string()).collect(),
    }
}

/// dummyjson-style list envelope wrapping `products`.
pub fn envelope(products: &[RemoteProduct]) -> Value {
    json!({
        "products": products,
        "total": products.len(),
        "skip": 0,
        "limit": products.len(),
    })
}
