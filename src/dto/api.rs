//! Payloads exchanged with the remote catalog API.

use serde::{Deserialize, Serialize};

use crate::domain::product::NewProduct;
use crate::domain::types::{
    CategoryName, ImageUrl, ProductDescription, ProductPrice, ProductTitle, RemoteProductId,
    TypeConstraintError,
};

/// A product payload as returned by `GET /products` and `GET /products/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RemoteProduct {
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    pub category: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Envelope of the product collection endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductEnvelope {
    #[serde(default)]
    pub products: Vec<RemoteProduct>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub limit: u32,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl RemoteProduct {
    /// Stand-in returned when a single-product request fails: only `id` is set.
    pub fn placeholder(id: RemoteProductId) -> Self {
        Self {
            id: id.get(),
            ..Self::default()
        }
    }

    /// A record without a title is treated as "not found".
    pub fn is_found(&self) -> bool {
        non_blank(self.title.as_deref()).is_some()
    }

    /// Non-empty category name, if any.
    pub fn category_name(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }

    /// Non-empty image URLs in arrival order.
    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        self.images.iter().filter_map(|url| non_blank(Some(url.as_str())))
    }

    /// Non-empty thumbnail URL, if any.
    pub fn thumbnail_url(&self) -> Option<&str> {
        non_blank(self.thumbnail.as_deref())
    }

    fn parse_image_url(&self, raw: &str) -> Option<ImageUrl> {
        match ImageUrl::new(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("Dropping image '{raw}' of remote product {}: {e}", self.id);
                None
            }
        }
    }
}

impl TryFrom<&RemoteProduct> for NewProduct {
    type Error = TypeConstraintError;

    /// Maps a remote record onto insertable product fields.
    ///
    /// `category_id` is left unset; it is resolved against the category table
    /// during synchronization.
    fn try_from(record: &RemoteProduct) -> Result<Self, Self::Error> {
        let title =
            non_blank(record.title.as_deref()).ok_or(TypeConstraintError::Missing("title"))?;

        Ok(Self {
            title: ProductTitle::new(title)?,
            description: non_blank(record.description.as_deref())
                .map(ProductDescription::new)
                .transpose()?,
            price: ProductPrice::new(record.price)?,
            category_name: record.category_name().map(CategoryName::new).transpose()?,
            category_id: None,
            thumbnail: record
                .thumbnail_url()
                .and_then(|raw| record.parse_image_url(raw)),
            image_urls: record
                .image_urls()
                .filter_map(|raw| record.parse_image_url(raw))
                .collect(),
        })
    }
}
