use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, NewCategory};
use crate::domain::product::{NewProduct, Product};
use crate::domain::product_image::NewProductImage;
use crate::domain::types::{CategoryId, CategoryName, ProductId, ProductTitle};
use crate::pagination::Pagination;

pub mod category;
pub mod errors;
pub mod product;
#[cfg(test)]
pub mod test;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters used when listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Filter by category identifier.
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }

    /// True when no filter narrows the result, i.e. an empty result means an empty store.
    pub fn is_unfiltered(&self) -> bool {
        self.category_id.is_none() && self.search.is_none()
    }
}

/// Read-only operations for product entities.
pub trait ProductReader {
    /// List products matching the supplied query, together with the unpaginated total.
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    /// Retrieve a product and its gallery by identifier.
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
    /// Identifier and title of every stored product, used for title matching.
    fn list_product_titles(&self) -> RepositoryResult<Vec<(ProductId, ProductTitle)>>;
}

/// Write operations for product entities and their galleries.
pub trait ProductWriter {
    /// Insert a new product row and return its database identifier.
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<ProductId>;
    /// Overwrite every scalar field of an existing product.
    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize>;
    /// Delete the product's images and insert `images` in one transaction.
    fn replace_product_images(
        &self,
        id: ProductId,
        images: &[NewProductImage],
    ) -> RepositoryResult<usize>;
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// Every category ordered by name.
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    /// Retrieve a category by its identifier.
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    /// Categories whose name exactly matches one of `names`.
    fn find_categories_by_names(&self, names: &[CategoryName]) -> RepositoryResult<Vec<Category>>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Persist new categories.
    fn create_categories(&self, categories: &[NewCategory]) -> RepositoryResult<usize>;
}
