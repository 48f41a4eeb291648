//! Reconciliation of remote catalog records with the local store.
//!
//! Remote records are matched against stored products by lower-cased title,
//! never by remote id. Categories are upserted first so that every product can
//! resolve its category foreign key, then each product is upserted and its
//! gallery replaced. A failing product is logged and skipped; failures while
//! syncing categories or loading lookup tables abort the pass.

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error;

use crate::api_client::ProductSource;
use crate::domain::category::NewCategory;
use crate::domain::product::NewProduct;
use crate::domain::types::{CategoryId, CategoryName, ProductId, RemoteProductId, TypeConstraintError};
use crate::dto::api::RemoteProduct;
use crate::repository::{
    CategoryReader, CategoryWriter, ProductReader, ProductWriter, RepositoryError,
    RepositoryResult,
};

use super::{ServiceError, ServiceResult};

/// Summary of one synchronization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Remote records received.
    pub fetched: usize,
    pub categories_created: usize,
    pub created: usize,
    pub updated: usize,
    /// Records that failed and were left out.
    pub skipped: usize,
    /// Stored ids of the created or updated products, in record order.
    pub product_ids: Vec<ProductId>,
}

impl Display for SyncReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} fetched, {} new categories, {} created, {} updated, {} skipped",
            self.fetched, self.categories_created, self.created, self.updated, self.skipped
        )
    }
}

#[derive(Debug, Error)]
enum SyncError {
    #[error("invalid product data: {0}")]
    Invalid(#[from] TypeConstraintError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

enum Upsert {
    Created(ProductId),
    Updated(ProductId),
}

/// Fetches the whole catalog and reconciles it with the store.
///
/// An empty catalog response is a successful no-op.
pub async fn sync_all_products<R, S>(repo: &R, source: &S) -> ServiceResult<SyncReport>
where
    R: CategoryReader + CategoryWriter + ProductReader + ProductWriter,
    S: ProductSource,
{
    let records = source.get_products().await;
    if records.is_empty() {
        log::warn!("Catalog API did not return any products");
        return Ok(SyncReport::default());
    }

    log::info!("Fetched {} products from catalog API", records.len());

    let report = sync_records(&records, repo)?;
    log::info!("Product synchronization finished: {report}");
    Ok(report)
}

/// Fetches one remote product and reconciles it with the store.
///
/// Returns the stored id, or `None` when the catalog has no such product or
/// the record could not be stored.
pub async fn sync_product_by_id<R, S>(
    id: RemoteProductId,
    repo: &R,
    source: &S,
) -> ServiceResult<Option<ProductId>>
where
    R: CategoryReader + CategoryWriter + ProductReader + ProductWriter,
    S: ProductSource,
{
    let record = source.get_product_by_id(id).await;
    if !record.is_found() {
        log::warn!("Catalog API did not return a product with id {id}");
        return Ok(None);
    }

    let report = sync_records(std::slice::from_ref(&record), repo)?;
    log::info!("Product {id} synchronization finished: {report}");
    Ok(report.product_ids.first().copied())
}

/// Reconciles already fetched records with the store.
pub fn sync_records<R>(records: &[RemoteProduct], repo: &R) -> ServiceResult<SyncReport>
where
    R: CategoryReader + CategoryWriter + ProductReader + ProductWriter,
{
    let mut report = SyncReport {
        fetched: records.len(),
        ..SyncReport::default()
    };

    let names = distinct_category_names(records);

    report.categories_created = sync_categories(&names, repo).map_err(|e| {
        log::error!("Failed to synchronize categories: {e}");
        ServiceError::Internal
    })?;

    let category_ids = load_category_ids(&names, repo).map_err(|e| {
        log::error!("Failed to load categories for product synchronization: {e}");
        ServiceError::Internal
    })?;

    let mut existing = load_title_index(repo).map_err(|e| {
        log::error!("Failed to load stored products for synchronization: {e}");
        ServiceError::Internal
    })?;

    for record in records {
        match sync_record(record, &category_ids, &mut existing, repo) {
            Ok(Upsert::Created(id)) => {
                report.created += 1;
                report.product_ids.push(id);
            }
            Ok(Upsert::Updated(id)) => {
                report.updated += 1;
                report.product_ids.push(id);
            }
            Err(e) => {
                log::error!("Failed to synchronize remote product {}: {e}", record.id);
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

/// Distinct non-empty category names in first-seen order.
fn distinct_category_names(records: &[RemoteProduct]) -> Vec<CategoryName> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(RemoteProduct::category_name)
        .filter_map(|name| CategoryName::new(name).ok())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn sync_categories<R>(names: &[CategoryName], repo: &R) -> RepositoryResult<usize>
where
    R: CategoryReader + CategoryWriter,
{
    if names.is_empty() {
        return Ok(0);
    }

    let existing = repo
        .find_categories_by_names(names)?
        .into_iter()
        .map(|category| category.name)
        .collect::<HashSet<_>>();

    let new_categories = names
        .iter()
        .filter(|name| !existing.contains(*name))
        .cloned()
        .map(NewCategory::now)
        .collect::<Vec<_>>();

    if new_categories.is_empty() {
        return Ok(0);
    }

    let created = repo.create_categories(&new_categories)?;
    log::info!("Added {created} new categories");
    Ok(created)
}

/// Category name to id; duplicate names resolve to the oldest row.
fn load_category_ids<R>(
    names: &[CategoryName],
    repo: &R,
) -> RepositoryResult<HashMap<CategoryName, CategoryId>>
where
    R: CategoryReader,
{
    let mut ids = HashMap::new();
    for category in repo.find_categories_by_names(names)? {
        ids.entry(category.name).or_insert(category.id);
    }
    Ok(ids)
}

/// Lower-cased title to id; duplicate titles resolve to the oldest row.
fn load_title_index<R>(repo: &R) -> RepositoryResult<HashMap<String, ProductId>>
where
    R: ProductReader,
{
    let mut index = HashMap::new();
    for (id, title) in repo.list_product_titles()? {
        index.entry(title.match_key()).or_insert(id);
    }
    Ok(index)
}

fn sync_record<R>(
    record: &RemoteProduct,
    category_ids: &HashMap<CategoryName, CategoryId>,
    existing: &mut HashMap<String, ProductId>,
    repo: &R,
) -> Result<Upsert, SyncError>
where
    R: ProductReader + ProductWriter,
{
    let mut product = NewProduct::try_from(record)?;
    product.category_id = product
        .category_name
        .as_ref()
        .and_then(|name| category_ids.get(name).copied());

    let key = product.title.match_key();
    let upsert = match existing.get(&key) {
        Some(&id) => {
            repo.update_product(id, &product)?;
            log::info!(
                "Updated product '{}' (remote id {}, stored id {id})",
                product.title,
                record.id
            );
            Upsert::Updated(id)
        }
        None => {
            let id = repo.create_product(&product)?;
            existing.insert(key, id);
            log::info!(
                "Added product '{}' (remote id {}, stored id {id})",
                product.title,
                record.id
            );
            Upsert::Created(id)
        }
    };

    let id = match upsert {
        Upsert::Created(id) | Upsert::Updated(id) => id,
    };

    if let Some(gallery) = product.gallery() {
        let stored = repo.replace_product_images(id, &gallery)?;
        log::info!("Stored {stored} images for product {id}");
    }

    Ok(upsert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::test::StaticProductSource;
    use crate::repository::test::TestRepository;
    use crate::repository::ProductListQuery;

    fn record(id: i32, title: &str, category: &str, images: &[&str], thumbnail: &str) -> RemoteProduct {
        RemoteProduct {
            id,
            title: Some(title.to_string()),
            description: Some(format!("{title} description")),
            price: 100.0 + f64::from(id),
            category: Some(category.to_string()),
            thumbnail: Some(thumbnail.to_string()),
            images: images.iter().map(|url| url.to_string()).collect(),
        }
    }

    fn catalog() -> Vec<RemoteProduct> {
        vec![
            record(
                1,
                "iPhone 9",
                "smartphones",
                &[
                    "https://cdn.example.com/1/1.jpg",
                    "https://cdn.example.com/1/2.jpg",
                    "https://cdn.example.com/1/3.jpg",
                ],
                "https://cdn.example.com/1/thumbnail.jpg",
            ),
            record(
                2,
                "iPhone X",
                "smartphones",
                &["https://cdn.example.com/2/1.jpg"],
                "https://cdn.example.com/2/1.jpg",
            ),
            record(
                3,
                "MacBook Pro",
                "laptops",
                &["https://cdn.example.com/3/1.jpg"],
                "https://cdn.example.com/3/thumbnail.jpg",
            ),
        ]
    }

    fn stored_titles(repo: &TestRepository) -> Vec<String> {
        let (_, products) = repo.list_products(ProductListQuery::default()).unwrap();
        products
            .into_iter()
            .map(|p| p.title.into_inner())
            .collect()
    }

    #[actix_web::test]
    async fn creates_distinct_categories() {
        let repo = TestRepository::default();
        let source = StaticProductSource::new(catalog());

        let report = sync_all_products(&repo, &source).await.unwrap();

        let categories = repo.list_categories().unwrap();
        let names: Vec<_> = categories.into_iter().map(|c| c.name.into_inner()).collect();
        assert_eq!(names, vec!["laptops", "smartphones"]);
        assert_eq!(report.categories_created, 2);
        assert_eq!(report.created, 3);
    }

    #[actix_web::test]
    async fn resolves_category_foreign_keys() {
        let repo = TestRepository::default();
        let source = StaticProductSource::new(catalog());

        sync_all_products(&repo, &source).await.unwrap();

        let categories = repo.list_categories().unwrap();
        let laptops = categories.iter().find(|c| c.name == "laptops").unwrap();
        let (_, products) = repo.list_products(ProductListQuery::default()).unwrap();
        let macbook = products.iter().find(|p| p.title == "MacBook Pro").unwrap();
        assert_eq!(macbook.category_id, Some(laptops.id));
    }

    #[actix_web::test]
    async fn updates_title_match_in_place() {
        let repo = TestRepository::default();
        sync_all_products(&repo, &StaticProductSource::new(catalog()))
            .await
            .unwrap();
        let (_, before) = repo.list_products(ProductListQuery::default()).unwrap();
        let original_id = before.iter().find(|p| p.title == "iPhone 9").unwrap().id;

        let mut renamed = record(
            42,
            "IPHONE 9",
            "smartphones",
            &["https://cdn.example.com/1/new.jpg"],
            "https://cdn.example.com/1/new.jpg",
        );
        renamed.price = 499.0;
        let report = sync_all_products(&repo, &StaticProductSource::new(vec![renamed]))
            .await
            .unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(report.created, 0);
        let product = repo.get_product_by_id(original_id).unwrap().unwrap();
        assert_eq!(product.title, "IPHONE 9");
        assert_eq!(product.price, 499.0);
        assert_eq!(stored_titles(&repo).len(), 3);
    }

    #[actix_web::test]
    async fn first_image_is_the_only_main_image() {
        let repo = TestRepository::default();
        sync_all_products(&repo, &StaticProductSource::new(catalog()))
            .await
            .unwrap();

        let (_, products) = repo.list_products(ProductListQuery::default()).unwrap();
        let iphone = products.iter().find(|p| p.title == "iPhone 9").unwrap();
        let main: Vec<_> = iphone.images.iter().filter(|i| i.is_main).collect();
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].image_url, "https://cdn.example.com/1/1.jpg");
    }

    #[actix_web::test]
    async fn appends_thumbnail_missing_from_images() {
        let repo = TestRepository::default();
        sync_all_products(&repo, &StaticProductSource::new(catalog()))
            .await
            .unwrap();

        let (_, products) = repo.list_products(ProductListQuery::default()).unwrap();
        let iphone = products.iter().find(|p| p.title == "iPhone 9").unwrap();
        assert_eq!(iphone.images.len(), 4);
        assert!(
            iphone
                .images
                .iter()
                .any(|i| i.image_url == "https://cdn.example.com/1/thumbnail.jpg" && !i.is_main)
        );

        let iphone_x = products.iter().find(|p| p.title == "iPhone X").unwrap();
        assert_eq!(iphone_x.images.len(), 1);
    }

    #[actix_web::test]
    async fn rerunning_sync_is_idempotent() {
        let repo = TestRepository::default();
        let source = StaticProductSource::new(catalog());

        sync_all_products(&repo, &source).await.unwrap();
        let report = sync_all_products(&repo, &source).await.unwrap();

        assert_eq!(report.categories_created, 0);
        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 3);
        assert_eq!(repo.list_categories().unwrap().len(), 2);
        let (_, products) = repo.list_products(ProductListQuery::default()).unwrap();
        assert_eq!(products.len(), 3);
        for product in products {
            assert_eq!(product.images.iter().filter(|i| i.is_main).count(), 1);
        }
    }

    #[actix_web::test]
    async fn failing_product_is_skipped() {
        let repo = TestRepository::default().failing_on_title("iPhone X");
        let mut records = catalog();
        records.push(RemoteProduct {
            id: 99,
            price: 1.0,
            ..RemoteProduct::default()
        });

        let report = sync_all_products(&repo, &StaticProductSource::new(records))
            .await
            .unwrap();

        assert_eq!(report.created, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(stored_titles(&repo), vec!["iPhone 9", "MacBook Pro"]);
    }

    #[actix_web::test]
    async fn store_failure_is_returned() {
        let repo = TestRepository::default().failing();

        let err = sync_all_products(&repo, &StaticProductSource::new(catalog()))
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::Internal);
    }

    #[actix_web::test]
    async fn empty_catalog_is_a_no_op() {
        let repo = TestRepository::default();

        let report = sync_all_products(&repo, &StaticProductSource::new(vec![]))
            .await
            .unwrap();

        assert_eq!(report, SyncReport::default());
    }

    #[actix_web::test]
    async fn sync_by_id_returns_stored_id() {
        let repo = TestRepository::default();
        let source = StaticProductSource::new(catalog());

        let id = sync_product_by_id(RemoteProductId::new(3).unwrap(), &repo, &source)
            .await
            .unwrap()
            .unwrap();

        let product = repo.get_product_by_id(id).unwrap().unwrap();
        assert_eq!(product.title, "MacBook Pro");
        assert_eq!(stored_titles(&repo).len(), 1);
    }

    #[actix_web::test]
    async fn sync_by_unknown_id_stores_nothing() {
        let repo = TestRepository::default();
        let source = StaticProductSource::new(catalog());

        let id = sync_product_by_id(RemoteProductId::new(500).unwrap(), &repo, &source)
            .await
            .unwrap();

        assert!(id.is_none());
        assert!(stored_titles(&repo).is_empty());
    }
}
