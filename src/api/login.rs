//! Admin login
//!
//! Exchange an email/password pair for a short-lived bearer token. Every way
//! to fail the credential check answers with the same message, a caller can
//! not probe which accounts exist or which are administrators.

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use crate::allow_list::AdminAllowList;
use crate::connection::ConnectionManager;
use crate::password::verify;
use crate::storage::Storage;

use super::Error;
use super::Form;
use super::JwtKeys;
use super::Success;
use super::current_admin::generate_token;

/// Login form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    /// Email of the administrator
    email: Option<String>,
    /// Password of the administrator
    password: Option<String>,
}

/// Token information served to the administrator
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// The bearer token to put in the `Authorization` header
    token: String,
}

/// Get a token for an administrator "session"
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "admin@example.com", "password": "verysecret" }' \
///     http://localhost:6100/api/admin/login
/// ```
///
/// Response:
/// ```json
/// { "token": "some token" }
/// ```
pub async fn login<S: Storage>(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(allow_list): Extension<AdminAllowList>,
    Extension(connection_manager): Extension<ConnectionManager<S>>,
    Form(form): Form<LoginForm>,
) -> Result<Success<TokenResponse>, Error> {
    let (Some(email), Some(password)) = (form.email, form.password) else {
        return Err(Error::bad_request("Email and password are required"));
    };

    let email = email.trim().to_lowercase();

    let storage = connection_manager.acquire().await?;

    let user = storage
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !allow_list.is_admin(&user.email) {
        return Err(invalid_credentials());
    }

    // identity-provider-only accounts can not log in here
    let hashed_password = user.hashed_password.as_ref().ok_or_else(invalid_credentials)?;

    if !verify(hashed_password, &password) {
        return Err(invalid_credentials());
    }

    let token = generate_token(&jwt_keys, &user)?;

    Ok(Success::ok(TokenResponse { token }))
}

/// The one rejection every failed credential check hands out
fn invalid_credentials() -> Error {
    Error::unauthorized("Invalid credentials")
}
