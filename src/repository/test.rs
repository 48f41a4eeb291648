use std::cell::RefCell;

use chrono::Utc;

use crate::domain::category::{Category, NewCategory};
use crate::domain::product::{NewProduct, Product};
use crate::domain::product_image::{NewProductImage, ProductImage};
use crate::domain::types::{CategoryId, CategoryName, ProductId, ProductImageId, ProductTitle};
use crate::repository::{
    CategoryReader, CategoryWriter, ProductListQuery, ProductReader, ProductWriter,
    RepositoryError, RepositoryResult,
};

#[derive(Default)]
struct State {
    categories: Vec<Category>,
    products: Vec<Product>,
    next_image_id: i32,
}

/// Simple in-memory repository used for unit tests.
#[derive(Default)]
pub struct TestRepository {
    state: RefCell<State>,
    fail_all: bool,
    fail_title: Option<String>,
}

impl TestRepository {
    /// Every call returns an error.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Writes of a product with this title return an error.
    pub fn failing_on_title(mut self, title: &str) -> Self {
        self.fail_title = Some(title.to_string());
        self
    }

    fn check(&self) -> RepositoryResult<()> {
        if self.fail_all {
            Err(RepositoryError::ValidationError("store unavailable".into()))
        } else {
            Ok(())
        }
    }

    fn check_write(&self, product: &NewProduct) -> RepositoryResult<()> {
        self.check()?;
        if self.fail_title.as_deref() == Some(product.title.as_str()) {
            return Err(RepositoryError::ValidationError(format!(
                "cannot write '{}'",
                product.title
            )));
        }
        Ok(())
    }
}

impl ProductReader for TestRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        self.check()?;
        let mut items = self.state.borrow().products.clone();
        if let Some(category_id) = query.category_id {
            items.retain(|p| p.category_id == Some(category_id));
        }
        if let Some(search) = query.search {
            let search = search.to_lowercase();
            items.retain(|p| p.title.to_lowercase().contains(&search));
        }
        let total = items.len();
        if let Some(pagination) = query.pagination {
            items = items
                .into_iter()
                .skip(pagination.offset())
                .take(pagination.per_page)
                .collect();
        }
        Ok((total, items))
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        self.check()?;
        Ok(self
            .state
            .borrow()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    fn list_product_titles(&self) -> RepositoryResult<Vec<(ProductId, ProductTitle)>> {
        self.check()?;
        Ok(self
            .state
            .borrow()
            .products
            .iter()
            .map(|p| (p.id, p.title.clone()))
            .collect())
    }
}

impl ProductWriter for TestRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<ProductId> {
        self.check_write(product)?;
        let mut state = self.state.borrow_mut();
        let id = ProductId::new(state.products.iter().map(|p| p.id.get()).max().unwrap_or(0) + 1)?;
        let now = Utc::now().naive_utc();
        state.products.push(Product {
            id,
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price,
            category_name: product.category_name.clone(),
            category_id: product.category_id,
            thumbnail: product.thumbnail.clone(),
            created_at: now,
            updated_at: now,
            images: vec![],
        });
        Ok(id)
    }

    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize> {
        self.check_write(product)?;
        let mut state = self.state.borrow_mut();
        let Some(stored) = state.products.iter_mut().find(|p| p.id == id) else {
            return Ok(0);
        };
        stored.title = product.title.clone();
        stored.description = product.description.clone();
        stored.price = product.price;
        stored.category_name = product.category_name.clone();
        stored.category_id = product.category_id;
        stored.thumbnail = product.thumbnail.clone();
        stored.updated_at = Utc::now().naive_utc();
        Ok(1)
    }

    fn replace_product_images(
        &self,
        id: ProductId,
        images: &[NewProductImage],
    ) -> RepositoryResult<usize> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        let mut next_id = state.next_image_id;
        let gallery = images
            .iter()
            .map(|image| -> RepositoryResult<ProductImage> {
                next_id += 1;
                Ok(ProductImage {
                    id: ProductImageId::new(next_id)?,
                    product_id: id,
                    image_url: image.image_url.clone(),
                    is_main: image.is_main,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        state.next_image_id = next_id;
        let Some(stored) = state.products.iter_mut().find(|p| p.id == id) else {
            return Err(RepositoryError::ValidationError(format!(
                "product {id} does not exist"
            )));
        };
        stored.images = gallery;
        Ok(images.len())
    }
}

impl CategoryReader for TestRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        self.check()?;
        let mut items = self.state.borrow().categories.clone();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        self.check()?;
        Ok(self
            .state
            .borrow()
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    fn find_categories_by_names(&self, names: &[CategoryName]) -> RepositoryResult<Vec<Category>> {
        self.check()?;
        Ok(self
            .state
            .borrow()
            .categories
            .iter()
            .filter(|c| names.contains(&c.name))
            .cloned()
            .collect())
    }
}

impl CategoryWriter for TestRepository {
    fn create_categories(&self, categories: &[NewCategory]) -> RepositoryResult<usize> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        for category in categories {
            let id = CategoryId::new(state.categories.len() as i32 + 1)?;
            state.categories.push(Category {
                id,
                name: category.name.clone(),
                created_at: category.created_at,
                updated_at: category.updated_at,
            });
        }
        Ok(categories.len())
    }
}
