use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::product_image::{NewProductImage, ProductImage};
use crate::domain::types::{
    CategoryId, CategoryName, ImageUrl, ProductDescription, ProductId, ProductPrice, ProductTitle,
};

/// A product persisted in the local store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: ProductTitle,
    pub description: Option<ProductDescription>,
    pub price: ProductPrice,
    /// Category name as reported by the catalog API.
    pub category_name: Option<CategoryName>,
    /// Foreign key resolved from `category_name` during synchronization.
    pub category_id: Option<CategoryId>,
    pub thumbnail: Option<ImageUrl>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub images: Vec<ProductImage>,
}

impl Product {
    /// Image flagged for primary display, if any.
    pub fn main_image(&self) -> Option<&ProductImage> {
        self.images.iter().find(|image| image.is_main)
    }
}

/// Scalar product fields written on insert and on in-place update.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NewProduct {
    pub title: ProductTitle,
    pub description: Option<ProductDescription>,
    pub price: ProductPrice,
    pub category_name: Option<CategoryName>,
    pub category_id: Option<CategoryId>,
    pub thumbnail: Option<ImageUrl>,
    /// Gallery URLs in arrival order. Never persisted on the product row.
    pub image_urls: Vec<ImageUrl>,
}

impl NewProduct {
    /// Builds the image rows that replace the product's current gallery.
    ///
    /// The first URL is the main image. The thumbnail is appended when it is
    /// not already part of the list and becomes the main image only when the
    /// list is empty. Returns `None` when the record carries neither images
    /// nor a thumbnail, meaning the stored gallery must be left untouched.
    pub fn gallery(&self) -> Option<Vec<NewProductImage>> {
        if self.image_urls.is_empty() && self.thumbnail.is_none() {
            return None;
        }

        let mut images: Vec<NewProductImage> = self
            .image_urls
            .iter()
            .enumerate()
            .map(|(position, url)| NewProductImage {
                image_url: url.clone(),
                is_main: position == 0,
            })
            .collect();

        let extra_thumbnail = self
            .thumbnail
            .as_ref()
            .filter(|thumbnail| !self.image_urls.contains(thumbnail));
        if let Some(thumbnail) = extra_thumbnail {
            images.push(NewProductImage {
                image_url: thumbnail.clone(),
                is_main: images.is_empty(),
            });
        }

        Some(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(value: &str) -> ImageUrl {
        ImageUrl::new(value).unwrap()
    }

    fn sample(image_urls: Vec<ImageUrl>, thumbnail: Option<ImageUrl>) -> NewProduct {
        NewProduct {
            title: ProductTitle::new("iPhone 9").unwrap(),
            description: None,
            price: ProductPrice::new(549.0).unwrap(),
            category_name: None,
            category_id: None,
            thumbnail,
            image_urls,
        }
    }

    #[test]
    fn first_image_is_main() {
        let product = sample(
            vec![
                url("https://cdn.example.com/1.jpg"),
                url("https://cdn.example.com/2.jpg"),
                url("https://cdn.example.com/3.jpg"),
            ],
            None,
        );

        let gallery = product.gallery().unwrap();

        assert_eq!(gallery.len(), 3);
        assert_eq!(gallery.iter().filter(|image| image.is_main).count(), 1);
        assert!(gallery[0].is_main);
        assert_eq!(gallery[0].image_url, "https://cdn.example.com/1.jpg");
    }

    #[test]
    fn appends_missing_thumbnail_as_secondary_image() {
        let product = sample(
            vec![url("https://cdn.example.com/1.jpg")],
            Some(url("https://cdn.example.com/thumb.jpg")),
        );

        let gallery = product.gallery().unwrap();

        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery[1].image_url, "https://cdn.example.com/thumb.jpg");
        assert!(!gallery[1].is_main);
    }

    #[test]
    fn does_not_duplicate_listed_thumbnail() {
        let product = sample(
            vec![url("https://cdn.example.com/1.jpg")],
            Some(url("https://cdn.example.com/1.jpg")),
        );

        assert_eq!(product.gallery().unwrap().len(), 1);
    }

    #[test]
    fn lone_thumbnail_becomes_main() {
        let product = sample(vec![], Some(url("https://cdn.example.com/thumb.jpg")));

        let gallery = product.gallery().unwrap();

        assert_eq!(gallery.len(), 1);
        assert!(gallery[0].is_main);
    }

    #[test]
    fn no_images_leaves_gallery_untouched() {
        assert!(sample(vec![], None).gallery().is_none());
    }
}
