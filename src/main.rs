use std::io;

use actix_files::Files;
use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use tera::Tera;

use catalog_gallery::api_client::CatalogApiClient;
use catalog_gallery::db::{establish_connection_pool, run_migrations};
use catalog_gallery::models::config::ServerConfig;
use catalog_gallery::repository::DieselRepository;
use catalog_gallery::routes;

fn cookie_key(secret: Option<&str>) -> Key {
    match secret.map(|s| Key::try_from(s.as_bytes())) {
        Some(Ok(key)) => key,
        Some(Err(e)) => {
            log::warn!("Configured secret is not a usable cookie key ({e}), generating one");
            Key::generate()
        }
        None => {
            log::warn!("No secret configured, flash messages will not survive a restart");
            Key::generate()
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let server_config = ServerConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {e}");
        io::Error::other(e)
    })?;

    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        log::error!("Failed to establish database connection: {e}");
        io::Error::other(e)
    })?;

    run_migrations(&pool).map_err(|e| {
        log::error!("Failed to run database migrations: {e}");
        io::Error::other(e)
    })?;

    let api_client = CatalogApiClient::new(&server_config.catalog_api).map_err(|e| {
        log::error!("Failed to build catalog API client: {e}");
        io::Error::other(e)
    })?;

    let tera = Tera::new(&format!("{}/**/*", server_config.templates_dir)).map_err(|e| {
        log::error!("Failed to parse templates: {e}");
        io::Error::other(e)
    })?;

    let message_store =
        CookieMessageStore::builder(cookie_key(server_config.secret.as_deref())).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let repo = DieselRepository::new(pool);
    let assets_dir = server_config.assets_dir.clone();
    let bind_address = (server_config.address.clone(), server_config.port);

    log::info!(
        "Starting catalog gallery on http://{}:{}",
        bind_address.0,
        bind_address.1
    );

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(Logger::default())
            .service(Files::new("/assets", &assets_dir))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(api_client.clone()))
            .app_data(web::Data::new(tera.clone()))
            .configure(routes::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
