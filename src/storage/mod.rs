//! All things related to the storage of users and their synced records
//!
//! The [`Storage`] trait carries every operation the admin backend needs;
//! [`postgres::Postgres`] is the production implementation, [`memory::Memory`]
//! is the substitutable fake used by the test suite

use core::fmt;

use async_trait::async_trait;
use chrono::naive::NaiveDateTime;
use uuid::Uuid;

use crate::users::Tier;
use crate::users::User;

pub mod memory;
pub mod postgres;
mod types;

/// Storage errors
#[derive(Debug)]
pub enum Error {
    /// A connection error with the storage
    Connection(String),

    /// A query failed on an established connection
    Query(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Connection(error) => write!(f, "Connection error: {error}"),
            Error::Query(error) => write!(f, "Query error: {error}"),
        }
    }
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Filter for user queries
///
/// An empty filter matches every user
#[derive(Clone, Debug, Default)]
pub struct UserFilter {
    /// Case-insensitive substring matched against name OR email
    pub text: Option<String>,

    /// Restrict to a single tier
    pub tier: Option<Tier>,
}

impl UserFilter {
    /// Filter matching a single tier
    pub fn by_tier(tier: Tier) -> Self {
        Self {
            text: None,
            tier: Some(tier),
        }
    }
}

/// Whitelisted mutable user fields
///
/// Fields left at `None` keep their stored value
#[derive(Clone, Debug, Default)]
pub struct UpdateUserValues {
    /// New display name, already trimmed
    pub name: Option<String>,

    /// New email, already trimmed and lower-cased
    pub email: Option<String>,

    /// New subscription tier
    pub tier: Option<Tier>,
}

impl UpdateUserValues {
    /// Does the update touch anything at all?
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.tier.is_none()
    }
}

/// Storage with all supported operations
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Finds a single user by its ID
    async fn find_user_by_id(&self, id: &Uuid) -> Result<Option<User>>;

    /// Finds a single user by its email
    ///
    /// Emails are unique case-insensitively, the match is too
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find a page of users matching a filter
    ///
    /// Ordered by creation time, most recent first, with the ID as a
    /// tiebreaker
    async fn find_users_page(
        &self,
        filter: &UserFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>>;

    /// Count all users matching a filter
    async fn count_users(&self, filter: &UserFilter) -> Result<i64>;

    /// Count users created at or after the given instant (UTC)
    async fn count_users_created_since(&self, since: NaiveDateTime) -> Result<i64>;

    /// Update the whitelisted fields of a single user
    ///
    /// Returns the updated user, or `None` when there is no such user
    async fn update_user(&self, id: &Uuid, values: &UpdateUserValues) -> Result<Option<User>>;

    /// Overwrite the credential hash of a single user
    async fn update_credential(&self, id: &Uuid, hashed_password: &str) -> Result<()>;

    /// Physically delete a single user
    ///
    /// Only reached through the cascading account deletion
    async fn delete_user(&self, id: &Uuid) -> Result<()>;

    /// Physically delete all items owned by a user, returns how many went
    async fn delete_items_by_owner(&self, user_id: &Uuid) -> Result<u64>;

    /// Physically delete all folders owned by a user, returns how many went
    async fn delete_folders_by_owner(&self, user_id: &Uuid) -> Result<u64>;

    /// Physically delete all shared notes owned by a user, returns how many
    /// went
    async fn delete_shared_notes_by_owner(&self, user_id: &Uuid) -> Result<u64>;
}

/// Convert any error to a storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}

/// Convert any error to a storage query error
fn query_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Query(err.to_string())
}
