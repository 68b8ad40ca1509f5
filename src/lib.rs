#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]
#![doc = include_str!("../README.md")]

use anyhow::Result;
use axum::Extension;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::allow_list::AdminAllowList;
use crate::api::JwtKeys;
use crate::api::router;
use crate::connection::ConnectionManager;
use crate::storage::Storage;
use crate::storage::postgres::PgConnector;
use crate::storage::postgres::Postgres;
use crate::utils::env_var_or_else;

pub mod allow_list;
pub mod api;
pub mod connection;
pub mod folders;
pub mod graceful_shutdown;
pub mod items;
pub mod lifecycle;
pub mod password;
pub mod repository;
pub mod shared_notes;
pub mod stats;
pub mod storage;
#[cfg(test)]
mod tests;
pub mod users;
pub mod utils;

/// Create and setup the app with its dependencies
///
/// Nothing connects to storage yet, the first request does
///
/// # Errors
///
/// Will return `Err` when `DATABASE_URL` is not set
pub async fn setup_app() -> Result<Router> {
    let connector = PgConnector::from_env()?;
    let connection_manager = ConnectionManager::<Postgres>::new(connector);

    let jwt_keys = setup_jwt_keys();
    let allow_list = AdminAllowList::from_env();

    Ok(create_router(connection_manager, jwt_keys, allow_list))
}

/// Create the router for the admin backend
pub fn create_router<S: Storage>(
    connection_manager: ConnectionManager<S>,
    jwt_keys: JwtKeys,
    allow_list: AdminAllowList,
) -> Router {
    Router::new()
        .nest("/api/admin", router::<S>())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(connection_manager))
        .layer(Extension(jwt_keys))
        .layer(Extension(allow_list))
}

fn setup_jwt_keys() -> JwtKeys {
    use crate::password::generate;

    let jwt_secret = env_var_or_else("JWT_SECRET", || {
        let jwt_secret = generate();
        tracing::info!("`JWT_SECRET` is not set, generating temporary one: {jwt_secret}");
        jwt_secret
    });

    JwtKeys::new(jwt_secret.as_bytes())
}
