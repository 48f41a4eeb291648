use serde::Serialize;

use crate::api_client::ProductSource;
use crate::domain::types::{CategoryId, ProductId, RemoteProductId};
use crate::dto::api::RemoteProduct;
use crate::dto::categories::CategoryDto;
use crate::dto::products::ProductDto;
use crate::forms::products::FetchProductFormPayload;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    CategoryReader, CategoryWriter, ProductListQuery, ProductReader, ProductWriter,
};

use super::sync::{SyncReport, sync_all_products, sync_product_by_id, sync_records};
use super::{ServiceError, ServiceResult};

/// Filters accepted by the product list page.
#[derive(Debug, Clone, Default)]
pub struct ProductListParams {
    pub page: usize,
    /// Raw category id from the query string. Blank means no filter.
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Everything the product list page renders.
#[derive(Debug, Serialize)]
pub struct ProductListing {
    pub products: Paginated<ProductDto>,
    pub categories: Vec<CategoryDto>,
    pub selected_category: Option<CategoryDto>,
    pub search: Option<String>,
    /// Products come straight from the catalog API and are not stored.
    pub live: bool,
    /// Set when rendering this page triggered a synchronization.
    pub sync_report: Option<SyncReport>,
}

/// Result of an explicit synchronization request.
#[derive(Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced(SyncReport),
    /// Storing failed but the catalog API returned this many products.
    LiveOnly(usize),
    /// Storing failed and the catalog API returned nothing.
    Empty,
}

/// Builds the product list page.
///
/// Reads from the store first. When an unfiltered read finds the store empty,
/// the catalog is synchronized and read again. If the store stays empty or
/// fails, products are served live from the catalog API without storing them.
pub async fn show_products<R, S>(
    params: ProductListParams,
    repo: &R,
    source: &S,
) -> ServiceResult<ProductListing>
where
    R: CategoryReader + CategoryWriter + ProductReader + ProductWriter,
    S: ProductSource,
{
    let page = params.page.max(1);
    let mut query = ProductListQuery::default().paginate(page, DEFAULT_ITEMS_PER_PAGE);

    let mut selected_category = None;
    if let Some(category_id) = parse_category_id(params.category.as_deref())? {
        query = query.category(category_id);
        match repo.get_category_by_id(category_id) {
            Ok(Some(category)) => selected_category = Some(CategoryDto::from(category)),
            Ok(None) => return Err(ServiceError::NotFound),
            Err(e) => log::error!("Failed to get category {category_id}: {e}"),
        }
    }

    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    if let Some(search) = &search {
        query = query.search(search.as_str());
    }

    let categories = load_categories(repo);

    let listing = |products: Paginated<ProductDto>, live: bool, sync_report: Option<SyncReport>| {
        ProductListing {
            products,
            categories: categories.clone(),
            selected_category: selected_category.clone(),
            search: search.clone(),
            live,
            sync_report,
        }
    };

    let mut sync_report = None;

    match repo.list_products(query.clone()) {
        Ok((total, products)) if total > 0 || !query.is_unfiltered() => {
            let products = Paginated::new(products, page, total, DEFAULT_ITEMS_PER_PAGE)
                .map(ProductDto::from);
            return Ok(listing(products, false, None));
        }
        Ok(_) => {
            log::info!("Product store is empty, synchronizing with catalog API");
            if let Ok(report) = sync_all_products(repo, source).await {
                match repo.list_products(query) {
                    Ok((total, products)) if total > 0 => {
                        let products =
                            Paginated::new(products, page, total, DEFAULT_ITEMS_PER_PAGE)
                                .map(ProductDto::from);
                        return Ok(listing(products, false, Some(report)));
                    }
                    Ok(_) => log::warn!("Product store is still empty after synchronization"),
                    Err(e) => log::error!("Failed to list products after synchronization: {e}"),
                }
                sync_report = Some(report);
            }
        }
        Err(e) => {
            log::error!("Failed to list products: {e}");
        }
    }

    log::info!("Serving live products from catalog API");
    let records = source.get_products().await;
    let products = Paginated::single(records.iter().map(ProductDto::from).collect());
    Ok(listing(products, true, sync_report))
}

/// Builds the product details page.
///
/// A product missing from the store is fetched from the catalog API by the
/// same id, stored and read back. When storing fails the live record is shown.
pub async fn show_product<R, S>(id: i32, repo: &R, source: &S) -> ServiceResult<ProductDto>
where
    R: CategoryReader + CategoryWriter + ProductReader + ProductWriter,
    S: ProductSource,
{
    let (Ok(product_id), Ok(remote_id)) = (ProductId::new(id), RemoteProductId::new(id)) else {
        return Err(ServiceError::NotFound);
    };

    let store_available = match repo.get_product_by_id(product_id) {
        Ok(Some(product)) => return Ok(product.into()),
        Ok(None) => true,
        Err(e) => {
            log::error!("Failed to get product {product_id}: {e}");
            false
        }
    };

    log::info!("Product {id} is not stored, fetching it from catalog API");
    let record = source.get_product_by_id(remote_id).await;
    if !record.is_found() {
        return Err(ServiceError::NotFound);
    }

    if store_available {
        if let Some(product) = store_and_reload(&record, repo) {
            return Ok(product);
        }
    }

    Ok(ProductDto::from(&record))
}

fn store_and_reload<R>(record: &RemoteProduct, repo: &R) -> Option<ProductDto>
where
    R: CategoryReader + CategoryWriter + ProductReader + ProductWriter,
{
    let report = sync_records(std::slice::from_ref(record), repo).ok()?;
    let stored_id = report.product_ids.first().copied()?;

    match repo.get_product_by_id(stored_id) {
        Ok(Some(product)) => Some(product.into()),
        Ok(None) => {
            log::warn!("Product {stored_id} disappeared right after synchronization");
            None
        }
        Err(e) => {
            log::error!("Failed to read product {stored_id} after synchronization: {e}");
            None
        }
    }
}

/// Synchronizes the whole catalog, reporting how much is still viewable
/// live when storing fails.
pub async fn sync_catalog<R, S>(repo: &R, source: &S) -> SyncOutcome
where
    R: CategoryReader + CategoryWriter + ProductReader + ProductWriter,
    S: ProductSource,
{
    match sync_all_products(repo, source).await {
        Ok(report) => SyncOutcome::Synced(report),
        Err(_) => {
            let records = source.get_products().await;
            if records.is_empty() {
                SyncOutcome::Empty
            } else {
                SyncOutcome::LiveOnly(records.len())
            }
        }
    }
}

/// Synchronizes the whole catalog.
pub async fn fetch_products<R, S>(repo: &R, source: &S) -> ServiceResult<SyncReport>
where
    R: CategoryReader + CategoryWriter + ProductReader + ProductWriter,
    S: ProductSource,
{
    sync_all_products(repo, source).await
}

/// Fetches and stores a single remote product, returning its stored id.
pub async fn fetch_product_from_api<R, S>(
    payload: FetchProductFormPayload,
    repo: &R,
    source: &S,
) -> ServiceResult<ProductId>
where
    R: CategoryReader + CategoryWriter + ProductReader + ProductWriter,
    S: ProductSource,
{
    match sync_product_by_id(payload.id, repo, source).await? {
        Some(id) => Ok(id),
        None => Err(ServiceError::NotFound),
    }
}

/// Blank input means no filter. Anything that is not a positive id cannot
/// name a category.
fn parse_category_id(raw: Option<&str>) -> ServiceResult<Option<CategoryId>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<i32>()
        .ok()
        .and_then(|id| CategoryId::new(id).ok())
        .map(Some)
        .ok_or(ServiceError::NotFound)
}

fn load_categories<R: CategoryReader>(repo: &R) -> Vec<CategoryDto> {
    match repo.list_categories() {
        Ok(categories) => categories.into_iter().map(CategoryDto::from).collect(),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            vec![]
        }
    }
}
