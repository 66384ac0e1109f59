use std::sync::Arc;

use axum::http::Method;
use campus_events::{
    approval::QuorumPolicy, auth::ensure_jwt_secret_is_valid, connect_to_db, store::PgStore,
};
use envconfig::Envconfig;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[derive(Envconfig)]
struct Config {
    #[envconfig(from = "DATABASE_URL")]
    pub db_url: String,
    #[envconfig(from = "PORT", default = "8080")]
    pub port: u16,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::init_from_env().unwrap();
    ensure_jwt_secret_is_valid();

    let pool = connect_to_db(&config.db_url);
    let store = Arc::new(PgStore::new(pool));
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);
    let app = campus_events::app(store, QuorumPolicy::default()).layer(cors);

    tracing::info!(port = config.port, "listening");
    axum::Server::bind(&([0, 0, 0, 0], config.port).into())
        .serve(app.into_make_service())
        .await
        .unwrap();
}
