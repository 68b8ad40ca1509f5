//! Account lifecycle manager
//!
//! Tier toggling, credential reset and the cascading account deletion across
//! all four collections

use core::fmt;

use uuid::Uuid;

use crate::password;
use crate::storage;
use crate::storage::Storage;
use crate::storage::UpdateUserValues;
use crate::users::User;

/// Lifecycle errors
#[derive(Debug)]
pub enum Error {
    /// The targeted account does not exist
    NotFound,

    /// The request is out of policy
    Validation(String),

    /// The storage gave up on us
    Storage(storage::Error),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "User not found"),
            Error::Validation(message) => write!(f, "{message}"),
            Error::Storage(error) => write!(f, "{error}"),
        }
    }
}

impl From<storage::Error> for Error {
    fn from(error: storage::Error) -> Self {
        Error::Storage(error)
    }
}

/// Result type for all lifecycle operations
pub type Result<T> = core::result::Result<T, Error>;

/// Flip a user between the free and pro tiers
///
/// Toggling twice lands the account back on its original tier
pub async fn toggle_tier<S: Storage>(storage: &S, id: &Uuid) -> Result<User> {
    let user = fetch_user(storage, id).await?;

    let values = UpdateUserValues {
        tier: Some(user.tier.toggle()),
        ..UpdateUserValues::default()
    };

    storage
        .update_user(id, &values)
        .await?
        .ok_or(Error::NotFound)
}

/// Overwrite the credential of a user with a fresh hash of the new secret
///
/// Identity-provider-only accounts have no credential to reset and are
/// rejected; the secret and its hash never leave this function
pub async fn reset_credential<S: Storage>(storage: &S, id: &Uuid, new_password: &str) -> Result<()> {
    if new_password.chars().count() < password::MINIMUM_LENGTH {
        return Err(Error::Validation(format!(
            "Password must be at least {} characters",
            password::MINIMUM_LENGTH,
        )));
    }

    let user = fetch_user(storage, id).await?;

    if user.hashed_password.is_none() {
        return Err(Error::Validation(
            "Cannot reset password for OAuth-only accounts".to_string(),
        ));
    }

    let hashed_password = password::hash(new_password);

    storage.update_credential(id, &hashed_password).await?;

    Ok(())
}

/// Delete an account and everything it owns
///
/// The four deletions run concurrently and are not a transaction: when some
/// of them fail the account is left partially deleted and a single aggregate
/// error is surfaced, no compensation is attempted
pub async fn delete_account<S: Storage>(storage: &S, id: &Uuid) -> Result<()> {
    let user = fetch_user(storage, id).await?;

    let (user_result, items, folders, shared_notes) = tokio::join!(
        storage.delete_user(&user.id),
        storage.delete_items_by_owner(&user.id),
        storage.delete_folders_by_owner(&user.id),
        storage.delete_shared_notes_by_owner(&user.id),
    );

    let mut failures = Vec::new();

    match user_result {
        Ok(()) => tracing::debug!("Deleted user {}", user.id),
        Err(err) => failures.push(format!("user record: {err}")),
    }

    match items {
        Ok(count) => tracing::debug!("Deleted {count} items of user {}", user.id),
        Err(err) => failures.push(format!("items: {err}")),
    }

    match folders {
        Ok(count) => tracing::debug!("Deleted {count} folders of user {}", user.id),
        Err(err) => failures.push(format!("folders: {err}")),
    }

    match shared_notes {
        Ok(count) => tracing::debug!("Deleted {count} shared notes of user {}", user.id),
        Err(err) => failures.push(format!("shared notes: {err}")),
    }

    if failures.is_empty() {
        Ok(())
    } else {
        // partially deleted state, a sweep has to clean up what remains
        tracing::error!(
            "Account deletion of {} left partial state: {}",
            user.id,
            failures.join("; "),
        );

        Err(Error::Storage(storage::Error::Query(format!(
            "account deletion incomplete: {}",
            failures.join("; "),
        ))))
    }
}

/// Fetch the targeted user, or report that there is none
async fn fetch_user<S: Storage>(storage: &S, id: &Uuid) -> Result<User> {
    storage
        .find_user_by_id(id)
        .await?
        .ok_or(Error::NotFound)
}
