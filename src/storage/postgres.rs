//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use chrono::naive::NaiveDateTime;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::connection::Connector;
use crate::users::User;

use super::Result;
use super::Storage;
use super::UpdateUserValues;
use super::UserFilter;
use super::connection_error;
use super::query_error;
use super::types::MIGRATOR;
use super::types::SqlxUser;
use super::types::UserTierType;

/// The column list of every user-returning query
const USER_COLUMNS: &str = "id, name, email, hashed_password, tier, \
     billing_customer_id, billing_subscription_id, billing_price_id, \
     billing_period_end, api_token, created_at, updated_at";

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage with an existing pool
    ///
    /// Migrations will be run; a failing migration counts as a failed
    /// connection
    pub async fn new_with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(Self { connection_pool })
    }
}

/// Connects to Postgres with the configured connection string
///
/// The timeout is supplied per attempt by the connection manager
pub struct PgConnector {
    /// The `DATABASE_URL` style connection string
    connection_string: String,
}

impl PgConnector {
    /// Create a connector from the `DATABASE_URL` environment variable
    pub fn from_env() -> anyhow::Result<Self> {
        let connection_string = std::env::var("DATABASE_URL")?;

        Ok(Self { connection_string })
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = Postgres;

    async fn connect(&self, timeout: Duration) -> Result<Postgres> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(timeout)
            .connect(&self.connection_string)
            .await
            .map_err(connection_error)?;

        Postgres::new_with_pool(connection_pool).await
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn find_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, SqlxUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 LIMIT 1",
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map(User::from_sqlx_user_optional)
        .map_err(query_error)?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, SqlxUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) LIMIT 1",
        ))
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await
        .map(User::from_sqlx_user_optional)
        .map_err(query_error)?;

        Ok(user)
    }

    async fn find_users_page(
        &self,
        filter: &UserFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, SqlxUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1) \
               AND ($2::user_tier_type IS NULL OR tier = $2) \
             ORDER BY created_at DESC, id \
             LIMIT $3 OFFSET $4",
        ))
        .bind(text_pattern(filter))
        .bind(filter.tier.map(UserTierType::from_tier))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.connection_pool)
        .await
        .map(User::from_sqlx_user_multiple)
        .map_err(query_error)?;

        Ok(users)
    }

    async fn count_users(&self, filter: &UserFilter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users \
             WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1) \
               AND ($2::user_tier_type IS NULL OR tier = $2)",
        )
        .bind(text_pattern(filter))
        .bind(filter.tier.map(UserTierType::from_tier))
        .fetch_one(&self.connection_pool)
        .await
        .map_err(query_error)?;

        Ok(count)
    }

    async fn count_users_created_since(&self, since: NaiveDateTime) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE created_at >= $1")
                .bind(since)
                .fetch_one(&self.connection_pool)
                .await
                .map_err(query_error)?;

        Ok(count)
    }

    async fn update_user(&self, id: &Uuid, values: &UpdateUserValues) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, SqlxUser>(&format!(
            "UPDATE users SET \
                 name = COALESCE($2::text, name), \
                 email = COALESCE($3::text, email), \
                 tier = COALESCE($4::user_tier_type, tier), \
                 updated_at = CURRENT_TIMESTAMP \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}",
        ))
        .bind(id)
        .bind(values.name.as_deref())
        .bind(values.email.as_deref())
        .bind(values.tier.map(UserTierType::from_tier))
        .fetch_optional(&self.connection_pool)
        .await
        .map(User::from_sqlx_user_optional)
        .map_err(query_error)?;

        Ok(user)
    }

    async fn update_credential(&self, id: &Uuid, hashed_password: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET hashed_password = $2, updated_at = CURRENT_TIMESTAMP \
             WHERE id = $1",
        )
        .bind(id)
        .bind(hashed_password)
        .execute(&self.connection_pool)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn delete_user(&self, id: &Uuid) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.connection_pool)
            .await
            .map_err(query_error)?;

        Ok(())
    }

    async fn delete_items_by_owner(&self, user_id: &Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.connection_pool)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_folders_by_owner(&self, user_id: &Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM folders WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.connection_pool)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_shared_notes_by_owner(&self, user_id: &Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM shared_notes WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.connection_pool)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }
}

/// The ILIKE pattern for the free-text filter, if any
///
/// The filter promises substring semantics, so the LIKE metacharacters in
/// the text itself are escaped
fn text_pattern(filter: &UserFilter) -> Option<String> {
    filter.text.as_ref().map(|text| {
        let escaped = text
            .replace('\\', r"\\")
            .replace('%', r"\%")
            .replace('_', r"\_");

        format!("%{escaped}%")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_pattern_escapes_like_metacharacters() {
        let filter = UserFilter {
            text: Some(r"50%_a\b".to_string()),
            tier: None,
        };

        assert_eq!(Some(r"%50\%\_a\\b%".to_string()), text_pattern(&filter));
    }

    #[test]
    fn test_text_pattern_without_text_is_no_pattern() {
        assert_eq!(None, text_pattern(&UserFilter::default()));
    }
}
