use serde::{Deserialize, Serialize};

use crate::domain::types::{ImageUrl, ProductId, ProductImageId};

/// Stored gallery image of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub image_url: ImageUrl,
    /// Set on exactly one image per gallery.
    pub is_main: bool,
}

/// Image row to insert when a product's gallery is replaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProductImage {
    pub image_url: ImageUrl,
    pub is_main: bool,
}
