use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod export;
mod model;
mod models;
mod repo;
mod report;
mod routes;
mod storage;
mod utils;

use config::Config;
use db::{init_db, run_migrations};

use crate::docs::ApiDoc;
use crate::repo::MySqlRecords;
use crate::routes::Limiters;
use crate::storage::LocalBlobStore;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "opsdesk.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .context("could not connect to the database")?;

    if config.run_migrations {
        run_migrations(&pool).await.context("migrations failed")?;
    }

    tokio::fs::create_dir_all(&config.storage_root)
        .await
        .with_context(|| format!("could not create {}", config.storage_root.display()))?;

    let limiters = Limiters::from_config(&config)?;
    let records = Data::new(MySqlRecords::new(pool));
    let store = Data::new(LocalBlobStore::new(
        config.storage_root.clone(),
        config.storage_public_url.clone(),
    ));
    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(records.clone())
            .app_data(store.clone())
            .app_data(config_data.clone())
            .configure(routes::extractor_config)
            // Protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config_data, &limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("could not bind {server_addr}"))?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
