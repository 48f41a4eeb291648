use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{NewProduct as DomainNewProduct, Product as DomainProduct};
use crate::domain::product_image::ProductImage as DomainProductImage;
use crate::domain::types::{
    CategoryName, ImageUrl, ProductDescription, ProductPrice, ProductTitle, TypeConstraintError,
};
use crate::models::product_image::ProductImage as DbProductImage;

/// Diesel model representing a row in the `products` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_name: Option<String>,
    pub category_id: Option<i32>,
    pub thumbnail: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Product`] used for creating new rows.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewProduct<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub price: f64,
    pub category_name: Option<&'a str>,
    pub category_id: Option<i32>,
    pub thumbnail: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset overwriting every scalar column of an existing row.
///
/// `None` clears the column so that a stored product mirrors the remote
/// record exactly.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChangeset<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub price: f64,
    pub category_name: Option<&'a str>,
    pub category_id: Option<i32>,
    pub thumbnail: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Converts the row into a domain product carrying its gallery.
    pub fn into_domain(
        self,
        images: Vec<DbProductImage>,
    ) -> Result<DomainProduct, TypeConstraintError> {
        let mut images = images
            .into_iter()
            .map(DomainProductImage::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        images.sort_by_key(|image| (!image.is_main, image.id));

        Ok(DomainProduct {
            id: self.id.try_into()?,
            title: ProductTitle::new(self.title)?,
            description: self.description.map(ProductDescription::new).transpose()?,
            price: ProductPrice::new(self.price)?,
            category_name: self.category_name.map(CategoryName::new).transpose()?,
            category_id: self.category_id.map(TryInto::try_into).transpose()?,
            thumbnail: self.thumbnail.map(ImageUrl::new).transpose()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            images,
        })
    }
}

impl<'a> NewProduct<'a> {
    pub fn new(product: &'a DomainNewProduct, now: NaiveDateTime) -> Self {
        Self {
            title: product.title.as_str(),
            description: product.description.as_ref().map(|d| d.as_str()),
            price: product.price.get(),
            category_name: product.category_name.as_ref().map(|c| c.as_str()),
            category_id: product.category_id.map(|id| id.get()),
            thumbnail: product.thumbnail.as_ref().map(|t| t.as_str()),
            created_at: now,
            updated_at: now,
        }
    }
}

impl<'a> ProductChangeset<'a> {
    pub fn new(product: &'a DomainNewProduct, now: NaiveDateTime) -> Self {
        Self {
            title: product.title.as_str(),
            description: product.description.as_ref().map(|d| d.as_str()),
            price: product.price.get(),
            category_name: product.category_name.as_ref().map(|c| c.as_str()),
            category_id: product.category_id.map(|id| id.get()),
            thumbnail: product.thumbnail.as_ref().map(|t| t.as_str()),
            updated_at: now,
        }
    }
}
