//! Current admin service
//!
//! Get the current administrator from the request based on the Authorization
//! header. Every rejection on this path is the same opaque 403, a caller
//! probing the gate learns nothing about which check failed.

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::allow_list::AdminAllowList;
use crate::api::Error;
use crate::connection::ConnectionManager;
use crate::storage::Storage;
use crate::users::User;

/// How long an issued token stays valid, in seconds
const TOKEN_TTL: i64 = 3600;

/// The keys used for encoding/decoding JWT tokens
#[derive(Clone)]
pub struct JwtKeys {
    /// The encoding key
    encoding: EncodingKey,

    /// The decoding key
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create new encoding/decoding keys, derived from a secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// The JWT claims that identify an administrator
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    /// The user ID
    sub: Uuid,

    /// When the token expires, as a UNIX timestamp
    exp: i64,
}

/// Generate a token for the outside world for a given administrator
pub fn generate_token(jwt_keys: &JwtKeys, user: &User) -> Result<String, Error> {
    use jsonwebtoken::Header;
    use jsonwebtoken::encode;

    let claims = Claims {
        sub: user.id,
        exp: chrono::Utc::now().timestamp() + TOKEN_TTL,
    };

    encode(&Header::default(), &claims, &jwt_keys.encoding)
        .map_err(Error::internal_server_error)
}

/// Current admin service
///
/// Handlers that take this extractor are only reached by authenticated,
/// allow-listed administrators
pub struct CurrentAdmin<S>
where
    S: Storage,
{
    /// The actual user behind the token
    user: Arc<User>,

    /// Which storage backend verified the user
    storage: PhantomData<fn() -> S>,
}

impl<S> CurrentAdmin<S>
where
    S: Storage,
{
    /// Create the current admin from a verified user
    fn new(user: User) -> Self {
        Self {
            user: Arc::new(user),
            storage: PhantomData,
        }
    }
}

impl<S> Deref for CurrentAdmin<S>
where
    S: Storage,
{
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

/// The one rejection the gate hands out
fn rejection() -> Error {
    Error::forbidden("Forbidden")
}

impl<B, S> FromRequestParts<B> for CurrentAdmin<S>
where
    B: Send + Sync,
    S: Storage,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &B) -> Result<Self, Self::Rejection> {
        use jsonwebtoken::Validation;
        use jsonwebtoken::decode;

        // Extract the token from the authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| rejection())?;

        let Extension(jwt_keys) = parts
            .extract::<Extension<JwtKeys>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get JWT keys"))?;

        let Extension(allow_list) = parts
            .extract::<Extension<AdminAllowList>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get the allow-list"))?;

        let Extension(connection_manager) = parts
            .extract::<Extension<ConnectionManager<S>>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get a connection manager"))?;

        let token_data = decode::<Claims>(bearer.token(), &jwt_keys.decoding, &Validation::default())
            .map_err(|_| rejection())?;

        // fail closed: an unreachable storage rejects like a bad token
        let storage = connection_manager.acquire().await.map_err(|err| {
            tracing::error!("Admin gate could not reach storage: {err}");
            rejection()
        })?;

        let user = storage
            .find_user_by_id(&token_data.claims.sub)
            .await
            .map_err(|_| rejection())?
            .ok_or_else(rejection)?;

        // a valid token is not enough, the account must be on the allow-list
        if !allow_list.is_admin(&user.email) {
            return Err(rejection());
        }

        Ok(CurrentAdmin::new(user))
    }
}
