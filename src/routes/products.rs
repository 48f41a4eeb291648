use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::api_client::CatalogApiClient;
use crate::forms::products::{FetchProductForm, FetchProductFormPayload};
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::products::{
    ProductListParams, SyncOutcome, fetch_product_from_api as fetch_product_from_api_service,
    fetch_products as fetch_products_service, show_product as show_product_service,
    show_products as show_products_service, sync_catalog as sync_catalog_service,
};

const INDEX_URL: &str = "/Product/Index";

/// The filter form submits empty strings for unset fields, so everything is
/// taken as text and interpreted by the service.
#[derive(Deserialize)]
struct ProductsQueryParams {
    page: Option<String>,
    category: Option<String>,
    search: Option<String>,
}

#[get("/")]
pub async fn index() -> impl Responder {
    redirect(INDEX_URL)
}

#[get("/Product/Index")]
pub async fn show_products(
    params: web::Query<ProductsQueryParams>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    api: web::Data<CatalogApiClient>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let params = params.into_inner();
    let page = params
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<usize>().ok())
        .unwrap_or(1);
    let params = ProductListParams {
        page,
        category: params.category,
        search: params.search,
    };

    match show_products_service(params, repo.get_ref(), api.get_ref()).await {
        Ok(listing) => {
            let mut context = base_context(&flash_messages, "index");
            context.insert("listing", &listing);
            render_template(&tera, "products/index.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Category does not exist").send();
            redirect(INDEX_URL)
        }
        Err(err) => {
            log::error!("Failed to render product list: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/Product/Details/{id}")]
pub async fn show_product(
    id: web::Path<i32>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    api: web::Data<CatalogApiClient>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let id = id.into_inner();
    let mut context = base_context(&flash_messages, "details");

    match show_product_service(id, repo.get_ref(), api.get_ref()).await {
        Ok(product) => {
            context.insert("product", &product);
            render_template(&tera, "products/details.html", &context)
        }
        Err(ServiceError::NotFound) => {
            context.insert("id", &id);
            match tera.render("products/not_found.html", &context) {
                Ok(body) => HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(body),
                Err(e) => {
                    log::error!("Failed to render template 'products/not_found.html': {e}");
                    HttpResponse::NotFound().finish()
                }
            }
        }
        Err(err) => {
            log::error!("Failed to render product {id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/Product/SyncProducts")]
pub async fn sync_products(
    repo: web::Data<DieselRepository>,
    api: web::Data<CatalogApiClient>,
) -> impl Responder {
    match sync_catalog_service(repo.get_ref(), api.get_ref()).await {
        SyncOutcome::Synced(report) if report.fetched == 0 => {
            FlashMessage::warning("The catalog API returned no products").send();
        }
        SyncOutcome::Synced(report) => {
            FlashMessage::success(format!(
                "Products synchronized: {} created, {} updated, {} skipped",
                report.created, report.updated, report.skipped
            ))
            .send();
        }
        SyncOutcome::LiveOnly(count) => {
            FlashMessage::warning(format!(
                "Retrieved {count} products from the catalog API but could not save them"
            ))
            .send();
        }
        SyncOutcome::Empty => {
            FlashMessage::error("Synchronization failed and the catalog API returned no data")
                .send();
        }
    }
    redirect(INDEX_URL)
}

#[get("/Product/FetchProducts")]
pub async fn fetch_products(
    repo: web::Data<DieselRepository>,
    api: web::Data<CatalogApiClient>,
) -> impl Responder {
    match fetch_products_service(repo.get_ref(), api.get_ref()).await {
        Ok(report) => {
            FlashMessage::success(format!("Fetched products from the catalog API: {report}"))
                .send();
        }
        Err(err) => {
            log::error!("Failed to fetch products: {err}");
            FlashMessage::error("Failed to fetch products from the catalog API").send();
        }
    }
    redirect(INDEX_URL)
}

#[post("/Product/FetchProductFromApi")]
pub async fn fetch_product_from_api(
    repo: web::Data<DieselRepository>,
    api: web::Data<CatalogApiClient>,
    web::Form(form): web::Form<FetchProductForm>,
) -> impl Responder {
    let payload = match FetchProductFormPayload::try_from(form) {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(ServiceError::from(e).to_string()).send();
            return redirect(INDEX_URL);
        }
    };

    match fetch_product_from_api_service(payload, repo.get_ref(), api.get_ref()).await {
        Ok(id) => {
            FlashMessage::success("Product fetched from the catalog API").send();
            redirect(&format!("/Product/Details/{id}"))
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error(format!("Product {} was not found in the catalog API", payload.id))
                .send();
            redirect(INDEX_URL)
        }
        Err(err) => {
            log::error!("Failed to fetch product {}: {err}", payload.id);
            FlashMessage::error("Failed to fetch the product from the catalog API").send();
            redirect(INDEX_URL)
        }
    }
}
