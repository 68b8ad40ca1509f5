//! Database storage types

use chrono::NaiveDateTime;
use sqlx::migrate::Migrator;
use uuid::Uuid;

use crate::users::Tier;
use crate::users::User;

/// Migrator to run migrations on connect
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// `SQLx` type for the subscription tier
#[derive(PartialEq, Debug, Clone, Copy, sqlx::Type)]
#[sqlx(type_name = "user_tier_type")]
#[sqlx(rename_all = "lowercase")]
pub enum UserTierType {
    /// Free tier
    Free,

    /// Paid tier
    Pro,
}

impl UserTierType {
    /// Create the `SQLx` tier from a tier
    pub fn from_tier(tier: Tier) -> Self {
        match tier {
            Tier::Free => UserTierType::Free,
            Tier::Pro => UserTierType::Pro,
        }
    }

    /// Create a tier from the `SQLx` tier
    pub fn to_tier(self) -> Tier {
        match self {
            UserTierType::Free => Tier::Free,
            UserTierType::Pro => Tier::Pro,
        }
    }
}

/// `SQLx` version of user
#[derive(Debug, sqlx::FromRow)]
pub struct SqlxUser {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email, stored trimmed
    pub email: String,

    /// Credential hash, absent for identity-provider-only accounts
    pub hashed_password: Option<String>,

    /// Subscription tier
    pub tier: UserTierType,

    /// Billing provider customer ID
    pub billing_customer_id: Option<String>,

    /// Billing provider subscription ID
    pub billing_subscription_id: Option<String>,

    /// Billing provider price ID
    pub billing_price_id: Option<String>,

    /// End of the current billing period
    pub billing_period_end: Option<NaiveDateTime>,

    /// Externally issued API token
    pub api_token: Option<String>,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    pub updated_at: NaiveDateTime,
}

impl User {
    /// Create user from `SQLx` version
    pub fn from_sqlx_user(user: SqlxUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            hashed_password: user.hashed_password,
            tier: user.tier.to_tier(),
            billing_customer_id: user.billing_customer_id,
            billing_subscription_id: user.billing_subscription_id,
            billing_price_id: user.billing_price_id,
            billing_period_end: user.billing_period_end,
            api_token: user.api_token,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    /// Maybe create user from `SQLx` version
    pub fn from_sqlx_user_optional(user: Option<SqlxUser>) -> Option<Self> {
        user.map(Self::from_sqlx_user)
    }

    /// Create multiple users from their `SQLx` versions
    pub fn from_sqlx_user_multiple(mut users: Vec<SqlxUser>) -> Vec<Self> {
        users
            .drain(..)
            .map(Self::from_sqlx_user)
            .collect::<Vec<Self>>()
    }
}
