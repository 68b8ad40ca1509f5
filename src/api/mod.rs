//! All API endpoint setup

use axum::Router;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;

pub use current_admin::CurrentAdmin;
pub use current_admin::JwtKeys;
pub use request::Form;
pub use request::PathParameters;
pub use response::Error;
pub use response::Success;

use crate::storage::Storage;

mod current_admin;
mod login;
mod request;
mod response;
mod stats;
mod users;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let users = Router::new()
        .route("/", get(users::list::<S>))
        .route("/{user}", get(users::single::<S>))
        .route("/{user}", patch(users::update::<S>))
        .route("/{user}", delete(users::delete::<S>))
        .route("/{user}/reset-password", post(users::reset_password::<S>))
        .route("/{user}/toggle-tier", post(users::toggle_tier::<S>));

    Router::new()
        .route("/login", post(login::login::<S>))
        .route("/stats", get(stats::overview::<S>))
        .nest("/users", users)
}
