use chrono::naive::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Subscription tiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Default tier for new accounts
    Free,
    /// Paid tier
    Pro,
}

impl Tier {
    /// Flip between the two tiers
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Tier::Free => Tier::Pro,
            Tier::Pro => Tier::Free,
        }
    }

    /// Parse a tier from its wire value
    ///
    /// Anything other than `free`/`pro` counts as no tier at all; filters and
    /// updates ignore such values
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "free" => Some(Tier::Free),
            "pro" => Some(Tier::Pro),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Absent for identity-provider-only accounts
    pub hashed_password: Option<String>,
    pub tier: Tier,
    pub billing_customer_id: Option<String>,
    pub billing_subscription_id: Option<String>,
    pub billing_price_id: Option<String>,
    pub billing_period_end: Option<NaiveDateTime>,
    pub api_token: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
