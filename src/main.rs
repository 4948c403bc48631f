use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use courseinfo::auth;
use courseinfo::database::{MemStore, PgStore, Store};
use courseinfo::{config, routes, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::config();
    tracing::info!("starting courseinfo in {:?} mode", config.environment);

    let store = build_store().await;
    let app = routes::app(AppState::new(store));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("courseinfo listening on http://{}", bind_addr);
    axum::serve(listener, app).await.expect("server");
}

async fn build_store() -> Arc<dyn Store> {
    if std::env::var("COURSEINFO_STORE").as_deref() == Ok("memory") {
        // Demo mode: volatile store with a ready-made staff login
        let store = MemStore::new();
        store
            .insert_account("admin", &auth::password_digest("admin"), &auth::all_permissions())
            .await
            .expect("seed admin account");
        tracing::warn!("using in-memory store; data is volatile (login: admin/admin)");
        return Arc::new(store);
    }

    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set (or run with COURSEINFO_STORE=memory)");
    let store = PgStore::connect(&database_url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to {}: {}", database_url, e));
    Arc::new(store)
}
