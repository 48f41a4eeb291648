use chrono::Utc;
use diesel::prelude::*;

use crate::domain::product::{NewProduct, Product};
use crate::domain::product_image::NewProductImage;
use crate::domain::types::{ProductId, ProductTitle};
use crate::models::product::{
    NewProduct as DbNewProduct, Product as DbProduct, ProductChangeset,
};
use crate::models::product_image::{
    NewProductImage as DbNewProductImage, ProductImage as DbProductImage,
};
use crate::repository::{
    DieselRepository, ProductListQuery, ProductReader, ProductWriter, RepositoryResult,
};

/// Makes `%` and `_` match literally in a LIKE pattern escaped with `\`.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl ProductReader for DieselRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = products::table.into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(category_id) = query.category_id {
                items = items.filter(products::category_id.eq(Some(category_id.get())));
            }

            if let Some(search) = &query.search {
                items = items.filter(
                    products::title
                        .like(format!("%{}%", escape_like(search)))
                        .escape('\\'),
                );
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();

        // Apply pagination if requested
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(i64::try_from(pagination.offset()).unwrap_or(i64::MAX))
                .limit(i64::try_from(pagination.per_page).unwrap_or(i64::MAX));
        }

        let rows = items
            .order(products::id.asc())
            .load::<DbProduct>(&mut conn)?;

        let images = DbProductImage::belonging_to(&rows)
            .load::<DbProductImage>(&mut conn)?
            .grouped_by(&rows);

        let items = rows
            .into_iter()
            .zip(images)
            .map(|(product, images)| product.into_domain(images))
            .collect::<Result<Vec<Product>, _>>()?;

        Ok((total, items))
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let Some(row) = products::table
            .find(id.get())
            .first::<DbProduct>(&mut conn)
            .optional()?
        else {
            return Ok(None);
        };

        let images = DbProductImage::belonging_to(&row).load::<DbProductImage>(&mut conn)?;

        Ok(Some(row.into_domain(images)?))
    }

    fn list_product_titles(&self) -> RepositoryResult<Vec<(ProductId, ProductTitle)>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let rows = products::table
            .select((products::id, products::title))
            .order(products::id.asc())
            .load::<(i32, String)>(&mut conn)?;

        let titles = rows
            .into_iter()
            .map(|(id, title)| Ok((ProductId::new(id)?, ProductTitle::new(title)?)))
            .collect::<Result<Vec<_>, crate::domain::types::TypeConstraintError>>()?;

        Ok(titles)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<ProductId> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let id = diesel::insert_into(products::table)
            .values(DbNewProduct::new(product, now))
            .returning(products::id)
            .get_result::<i32>(&mut conn)?;

        Ok(ProductId::new(id)?)
    }

    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let affected = diesel::update(products::table.find(id.get()))
            .set(&ProductChangeset::new(product, now))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn replace_product_images(
        &self,
        id: ProductId,
        images: &[NewProductImage],
    ) -> RepositoryResult<usize> {
        use crate::schema::product_images;

        let mut conn = self.conn()?;

        let rows = images
            .iter()
            .map(|image| DbNewProductImage {
                product_id: id.get(),
                image_url: image.image_url.as_str(),
                is_main: image.is_main,
            })
            .collect::<Vec<_>>();

        let inserted = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(product_images::table.filter(product_images::product_id.eq(id.get())))
                .execute(conn)?;

            if rows.is_empty() {
                return Ok(0);
            }

            diesel::insert_into(product_images::table)
                .values(&rows)
                .execute(conn)
        })?;

        Ok(inserted)
    }
}
