//! HTTP client for the remote product catalog.
//!
//! Failures never reach the caller: the list request degrades to an empty
//! list and the single-product request to a placeholder carrying only the
//! requested id.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::domain::types::RemoteProductId;
use crate::dto::api::{ProductEnvelope, RemoteProduct};
use crate::models::config::CatalogApiConfig;

/// Source of remote product records.
pub trait ProductSource {
    /// Every product the catalog returns, or an empty list on failure.
    fn get_products(&self) -> impl Future<Output = Vec<RemoteProduct>>;

    /// The product with `id`, or [`RemoteProduct::placeholder`] on failure.
    fn get_product_by_id(&self, id: RemoteProductId) -> impl Future<Output = RemoteProduct>;
}

/// `reqwest`-backed client of a dummyjson-style `/products` API.
#[derive(Clone)]
pub struct CatalogApiClient {
    http: Client,
    base_url: String,
    limit: Option<u32>,
}

impl CatalogApiClient {
    pub fn new(config: &CatalogApiConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limit: config.limit,
        })
    }

    async fn fetch_products(&self) -> Result<ProductEnvelope, reqwest::Error> {
        let mut request = self.http.get(format!("{}/products", self.base_url));
        if let Some(limit) = self.limit {
            request = request.query(&[("limit", limit)]);
        }

        request
            .send()
            .await?
            .error_for_status()?
            .json::<ProductEnvelope>()
            .await
    }

    async fn fetch_product(&self, id: RemoteProductId) -> Result<RemoteProduct, reqwest::Error> {
        self.http
            .get(format!("{}/products/{id}", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json::<RemoteProduct>()
            .await
    }
}

impl ProductSource for CatalogApiClient {
    async fn get_products(&self) -> Vec<RemoteProduct> {
        match self.fetch_products().await {
            Ok(envelope) => {
                log::info!(
                    "Catalog API returned {} of {} products (skip {}, limit {})",
                    envelope.products.len(),
                    envelope.total,
                    envelope.skip,
                    envelope.limit
                );
                envelope.products
            }
            Err(e) => {
                log::error!("Failed to fetch products from catalog API: {e}");
                vec![]
            }
        }
    }

    async fn get_product_by_id(&self, id: RemoteProductId) -> RemoteProduct {
        match self.fetch_product(id).await {
            Ok(product) => product,
            Err(e) => {
                log::error!("Failed to fetch product {id} from catalog API: {e}");
                RemoteProduct::placeholder(id)
            }
        }
    }
}
