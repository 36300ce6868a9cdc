//! # Ironboard Binary
//!
//! The entry point that assembles the application based on compile-time
//! features: environment configuration, directory and schema bootstrap,
//! store/media construction, HTTP server.

use actix_web::{web, App, HttpServer};
use ib_api::handlers::AppState;
use ib_api::middleware;

#[cfg(feature = "db-sqlite")]
use ib_db_sqlite::SqliteBoardStore;

#[cfg(feature = "storage-local")]
use ib_storage_local::LocalMediaStore;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let database_url = env_or("DATABASE_URL", "sqlite:ironboard.db");
    let bind_addr = env_or("BIND_ADDR", "127.0.0.1:8080");
    let uploads_dir = env_or("UPLOADS_DIRECTORY", "./data/uploads");

    // Idempotent: already-existing directories are fine.
    std::fs::create_dir_all(&uploads_dir)?;

    // 1. Database implementation (connects and bootstraps the schema)
    #[cfg(feature = "db-sqlite")]
    let store = SqliteBoardStore::connect(&database_url).await?;

    // 2. Media storage implementation
    #[cfg(feature = "storage-local")]
    let media = LocalMediaStore::new(uploads_dir.into());

    // 3. Wrap in AppState (dynamic dispatch keeps the API crate
    //    plugin-agnostic)
    let state = web::Data::new(AppState {
        store: Box::new(store),
        media: Box::new(media),
    });

    log::info!("ironboard starting on http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .configure(ib_api::configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
