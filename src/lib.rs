use std::sync::Arc;

use approval::QuorumPolicy;
use axum::{Extension, Router};
use deadpool::managed::Pool;
use diesel_async::{pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection};
use store::Store;

pub mod api;
pub mod approval;
pub mod auth;
pub mod availability;
pub mod conflict;
pub mod error;
pub mod models;
pub mod policy;
pub mod rsvp;
pub mod schema;
pub mod store;

pub type DbPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub fn connect_to_db(db_url: &str) -> DbPool {
    let db_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    Pool::builder(db_config)
        .build()
        .expect("failed to build database pool")
}

/// The full router. The store backend and quorum policy are injected so
/// tests can run the whole HTTP surface against the in-memory store.
pub fn app(store: Arc<dyn Store>, quorum: QuorumPolicy) -> Router {
    Router::new()
        .nest("/api", api::app())
        .layer(Extension(store))
        .layer(Extension(Arc::new(quorum)))
}
