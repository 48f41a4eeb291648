use serde::Serialize;

use crate::domain::product::Product;
use crate::dto::api::RemoteProduct;

/// Product shape handed to the templates, for stored and live records alike.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub category_id: Option<i32>,
    pub main_image: Option<String>,
    /// Gallery URLs, main image first.
    pub images: Vec<String>,
    /// False for records shown straight from the catalog API.
    pub stored: bool,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        let mut images: Vec<String> = product
            .images
            .iter()
            .map(|image| image.image_url.as_str().to_string())
            .collect();
        if images.is_empty() {
            images.extend(product.thumbnail.as_ref().map(|t| t.as_str().to_string()));
        }

        let main_image = product
            .main_image()
            .map(|image| image.image_url.as_str().to_string())
            .or_else(|| images.first().cloned());

        Self {
            id: product.id.get(),
            title: product.title.into_inner(),
            description: product.description.map(|d| d.into_inner()),
            price: product.price.get(),
            category: product.category_name.map(|c| c.into_inner()),
            category_id: product.category_id.map(|id| id.get()),
            main_image,
            images,
            stored: true,
        }
    }
}

impl From<&RemoteProduct> for ProductDto {
    fn from(record: &RemoteProduct) -> Self {
        let mut images: Vec<String> = record.image_urls().map(str::to_string).collect();
        let extra_thumbnail = record
            .thumbnail_url()
            .filter(|thumbnail| !images.iter().any(|url| url.as_str() == *thumbnail));
        if let Some(thumbnail) = extra_thumbnail {
            images.push(thumbnail.to_string());
        }

        Self {
            id: record.id,
            title: record.title.clone().unwrap_or_default(),
            description: record.description.clone(),
            price: record.price,
            category: record.category_name().map(str::to_string),
            category_id: None,
            main_image: images.first().cloned(),
            images,
            stored: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_record_appends_thumbnail_after_images() {
        let record = RemoteProduct {
            id: 3,
            title: Some("Laptop".into()),
            thumbnail: Some("https://cdn.example.com/t.jpg".into()),
            images: vec!["https://cdn.example.com/1.jpg".into()],
            ..RemoteProduct::default()
        };

        let dto = ProductDto::from(&record);

        assert!(!dto.stored);
        assert_eq!(dto.main_image.as_deref(), Some("https://cdn.example.com/1.jpg"));
        assert_eq!(dto.images.len(), 2);
    }
}
