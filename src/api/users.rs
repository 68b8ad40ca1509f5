//! User administration API
//!
//! Search, inspect and mutate accounts. Every handler sits behind the
//! [`CurrentAdmin`] gate.

use axum::Extension;
use axum::extract::Query;
use chrono::naive::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::connection::ConnectionManager;
use crate::lifecycle;
use crate::repository;
use crate::repository::SearchParams;
use crate::storage::Storage;
use crate::users::Tier;
use crate::users::User;

use super::CurrentAdmin;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;

/// The user response information
///
/// Everything the dashboard shows; the credential hash never leaves the
/// backend
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// The user ID
    pub id: Uuid,

    /// The display name
    pub name: String,

    /// The email, lower-cased
    pub email: String,

    /// The subscription tier
    pub tier: Tier,

    /// Billing provider customer reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_customer_id: Option<String>,

    /// Billing provider subscription reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_subscription_id: Option<String>,

    /// Billing provider price reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_price_id: Option<String>,

    /// End of the current billing period
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_period_end: Option<NaiveDateTime>,

    /// When the account was created
    pub created_at: NaiveDateTime,

    /// When the account was last changed
    pub updated_at: NaiveDateTime,
}

impl UserResponse {
    /// Create a user response from a [`User`]
    fn from_user(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            tier: user.tier,
            billing_customer_id: user.billing_customer_id,
            billing_subscription_id: user.billing_subscription_id,
            billing_price_id: user.billing_price_id,
            billing_period_end: user.billing_period_end,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    /// Create a user response from multiple [`User`]s
    fn from_user_multiple(users: Vec<User>) -> Vec<Self> {
        users.into_iter().map(Self::from_user).collect::<Vec<Self>>()
    }
}

/// Raw search query parameters, all optional
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 1-based page number
    page: Option<i64>,

    /// Page size
    limit: Option<i64>,

    /// Free-text filter on name or email
    search: Option<String>,

    /// Tier filter, `free` or `pro`
    tier: Option<String>,
}

/// One page of users
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    /// The users on this page
    users: Vec<UserResponse>,

    /// How many users match in total
    total: i64,

    /// The 1-based page number
    page: i64,

    /// How many pages there are in total
    total_pages: i64,
}

/// A bare confirmation message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// What happened
    message: &'static str,
}

/// Search users with pagination
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:6100/api/admin/users?page=1&limit=20&search=jane&tier=pro'
/// ```
///
/// Response:
/// ```json
/// { "users": [ ... ], "total": 1, "page": 1, "totalPages": 1 }
/// ```
pub async fn list<S: Storage>(
    _current_admin: CurrentAdmin<S>,
    Extension(connection_manager): Extension<ConnectionManager<S>>,
    Query(query): Query<ListQuery>,
) -> Result<Success<ListResponse>, Error> {
    let storage = connection_manager.acquire().await?;

    let params = SearchParams::from_raw(query.page, query.limit, query.search, query.tier);

    let page = repository::search(&storage, &params).await?;

    Ok(Success::ok(ListResponse {
        users: UserResponse::from_user_multiple(page.users),
        total: page.total,
        page: page.page,
        total_pages: page.total_pages,
    }))
}

/// Get a single user
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6100/api/admin/users/<uuid>
/// ```
pub async fn single<S: Storage>(
    _current_admin: CurrentAdmin<S>,
    Extension(connection_manager): Extension<ConnectionManager<S>>,
    PathParameters(user_id): PathParameters<Uuid>,
) -> Result<Success<UserResponse>, Error> {
    let storage = connection_manager.acquire().await?;

    let user = repository::get_by_id(&storage, &user_id)
        .await?
        .ok_or_else(|| Error::not_found("User not found"))?;

    Ok(Success::ok(UserResponse::from_user(user)))
}

/// Update user form, all fields optional
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserForm {
    /// New display name
    name: Option<String>,

    /// New email
    email: Option<String>,

    /// New tier, `free` or `pro`
    tier: Option<String>,
}

/// Update the whitelisted fields of a user
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "tier": "pro" }' \
///     http://localhost:6100/api/admin/users/<uuid>
/// ```
pub async fn update<S: Storage>(
    _current_admin: CurrentAdmin<S>,
    Extension(connection_manager): Extension<ConnectionManager<S>>,
    PathParameters(user_id): PathParameters<Uuid>,
    Form(form): Form<UpdateUserForm>,
) -> Result<Success<UserResponse>, Error> {
    let values = repository::sanitize_update(
        form.tier.as_deref(),
        form.name.as_deref(),
        form.email.as_deref(),
    )
    .ok_or_else(|| Error::bad_request("No valid fields to update"))?;

    let storage = connection_manager.acquire().await?;

    let user = repository::update(&storage, &user_id, &values)
        .await?
        .ok_or_else(|| Error::not_found("User not found"))?;

    Ok(Success::ok(UserResponse::from_user(user)))
}

/// Delete a user and everything it owns
///
/// Request:
/// ```sh
/// curl -v -XDELETE -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6100/api/admin/users/<uuid>
/// ```
///
/// Response:
/// ```json
/// { "message": "User deleted successfully" }
/// ```
pub async fn delete<S: Storage>(
    _current_admin: CurrentAdmin<S>,
    Extension(connection_manager): Extension<ConnectionManager<S>>,
    PathParameters(user_id): PathParameters<Uuid>,
) -> Result<Success<MessageResponse>, Error> {
    let storage = connection_manager.acquire().await?;

    lifecycle::delete_account(&storage, &user_id).await?;

    Ok(Success::ok(MessageResponse {
        message: "User deleted successfully",
    }))
}

/// Reset password form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordForm {
    /// The password to set
    new_password: String,
}

/// Overwrite the password of a user
///
/// Request:
/// ```sh
/// curl -v -XPOST -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "newPassword": "veryverysecret" }' \
///     http://localhost:6100/api/admin/users/<uuid>/reset-password
/// ```
///
/// Response:
/// ```json
/// { "message": "Password reset successfully" }
/// ```
pub async fn reset_password<S: Storage>(
    _current_admin: CurrentAdmin<S>,
    Extension(connection_manager): Extension<ConnectionManager<S>>,
    PathParameters(user_id): PathParameters<Uuid>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Success<MessageResponse>, Error> {
    let storage = connection_manager.acquire().await?;

    lifecycle::reset_credential(&storage, &user_id, &form.new_password).await?;

    Ok(Success::ok(MessageResponse {
        message: "Password reset successfully",
    }))
}

/// Flip a user between the free and pro tiers
///
/// Request:
/// ```sh
/// curl -v -XPOST -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6100/api/admin/users/<uuid>/toggle-tier
/// ```
pub async fn toggle_tier<S: Storage>(
    _current_admin: CurrentAdmin<S>,
    Extension(connection_manager): Extension<ConnectionManager<S>>,
    PathParameters(user_id): PathParameters<Uuid>,
) -> Result<Success<UserResponse>, Error> {
    let storage = connection_manager.acquire().await?;

    let user = lifecycle::toggle_tier(&storage, &user_id).await?;

    Ok(Success::ok(UserResponse::from_user(user)))
}
