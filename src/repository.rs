//! User repository
//!
//! Typed read/write access to the user collection: paginated search, lookup
//! and whitelist-only updates. The credential hash never travels further
//! than this layer's callers strip it.

use uuid::Uuid;

use crate::storage::Result;
use crate::storage::Storage;
use crate::storage::UpdateUserValues;
use crate::storage::UserFilter;
use crate::users::Tier;
use crate::users::User;

/// Default page size when the caller does not pick one
const DEFAULT_LIMIT: i64 = 20;

/// Upper bound on the page size
const MAX_LIMIT: i64 = 100;

/// Normalized search parameters
#[derive(Clone, Debug)]
pub struct SearchParams {
    /// 1-based page number
    pub page: i64,

    /// Page size, within `[1, 100]`
    pub limit: i64,

    /// What to match users against
    pub filter: UserFilter,
}

impl SearchParams {
    /// Clamp raw query values into valid search parameters
    ///
    /// Pages below 1 become 1, limits are clamped to `[1, 100]`, empty
    /// search text is no filter and an unknown tier value is ignored
    pub fn from_raw(
        page: Option<i64>,
        limit: Option<i64>,
        search: Option<String>,
        tier: Option<String>,
    ) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            filter: UserFilter {
                text: search.filter(|search| !search.is_empty()),
                tier: tier.as_deref().and_then(Tier::parse),
            },
        }
    }
}

/// One page of search results
#[derive(Debug)]
pub struct UserPage {
    /// The users on this page, most recently created first
    pub users: Vec<User>,

    /// How many users match the filter in total
    pub total: i64,

    /// The 1-based page number, as requested
    pub page: i64,

    /// `ceil(total / limit)`
    pub total_pages: i64,
}

/// Search users with pagination
///
/// The page fetch and the total count run concurrently
pub async fn search<S: Storage>(storage: &S, params: &SearchParams) -> Result<UserPage> {
    // the page number is unbounded, an absurd value must not overflow
    let offset = params.page.saturating_sub(1).saturating_mul(params.limit);

    let (users, total) = tokio::try_join!(
        storage.find_users_page(&params.filter, offset, params.limit),
        storage.count_users(&params.filter),
    )?;

    Ok(UserPage {
        users,
        total,
        page: params.page,
        // ceiling division, both values are non-negative
        total_pages: (total + params.limit - 1) / params.limit,
    })
}

/// Get a single user by its ID
pub async fn get_by_id<S: Storage>(storage: &S, id: &Uuid) -> Result<Option<User>> {
    storage.find_user_by_id(id).await
}

/// Update the whitelisted fields of a user
///
/// The values are expected to come out of [`sanitize_update`]
pub async fn update<S: Storage>(
    storage: &S,
    id: &Uuid,
    values: &UpdateUserValues,
) -> Result<Option<User>> {
    storage.update_user(id, values).await
}

/// Reduce a raw update request to the whitelisted fields
///
/// Returns `None` when nothing valid remains: names and emails must be
/// non-empty after trimming, emails are lower-cased and any tier other than
/// free/pro is dropped
pub fn sanitize_update(
    tier: Option<&str>,
    name: Option<&str>,
    email: Option<&str>,
) -> Option<UpdateUserValues> {
    let values = UpdateUserValues {
        name: name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string),
        email: email
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_lowercase),
        tier: tier.and_then(Tier::parse),
    };

    if values.is_empty() { None } else { Some(values) }
}

#[cfg(test)]
mod tests {
    use crate::storage::memory::Memory;
    use crate::tests::helper;

    use super::*;

    async fn storage_with_users(count: usize) -> Memory {
        let storage = Memory::new();

        for index in 0..count {
            let user = helper::build_user(
                &format!("User {index}"),
                &format!("user{index}@example.com"),
                Tier::Free,
                None,
            );

            storage.insert_user(user).await;
        }

        storage
    }

    #[tokio::test]
    async fn test_search_rounds_total_pages_up() {
        let storage = storage_with_users(5).await;

        let params = SearchParams::from_raw(Some(1), Some(2), None, None);
        let page = search(&storage, &params).await.unwrap();

        assert_eq!(5, page.total);
        assert_eq!(3, page.total_pages);

        // an empty result set has no pages at all
        let params = SearchParams::from_raw(Some(1), Some(2), Some("nomatch".to_string()), None);
        let page = search(&storage, &params).await.unwrap();

        assert_eq!(0, page.total);
        assert_eq!(0, page.total_pages);
    }

    #[tokio::test]
    async fn test_search_with_an_absurd_page_number() {
        let storage = storage_with_users(1).await;

        let params = SearchParams::from_raw(Some(i64::MAX), Some(100), None, None);
        let page = search(&storage, &params).await.unwrap();

        // far past the end is just an empty page, not an overflow
        assert_eq!(1, page.total);
        assert!(page.users.is_empty());
    }

    #[test]
    fn test_page_and_limit_are_clamped() {
        let params = SearchParams::from_raw(None, None, None, None);
        assert_eq!(1, params.page);
        assert_eq!(20, params.limit);

        let params = SearchParams::from_raw(Some(-3), Some(0), None, None);
        assert_eq!(1, params.page);
        assert_eq!(1, params.limit);

        let params = SearchParams::from_raw(Some(7), Some(1000), None, None);
        assert_eq!(7, params.page);
        assert_eq!(100, params.limit);
    }

    #[test]
    fn test_unknown_tier_filter_is_ignored() {
        let params = SearchParams::from_raw(None, None, None, Some("gold".to_string()));
        assert!(params.filter.tier.is_none());

        let params = SearchParams::from_raw(None, None, None, Some("pro".to_string()));
        assert_eq!(Some(Tier::Pro), params.filter.tier);
    }

    #[test]
    fn test_empty_search_text_is_no_filter() {
        let params = SearchParams::from_raw(None, None, Some(String::new()), None);
        assert!(params.filter.text.is_none());
    }

    #[test]
    fn test_sanitize_update_normalizes_email() {
        let values = sanitize_update(None, None, Some("  Some.User@Example.COM  ")).unwrap();

        assert_eq!(Some("some.user@example.com".to_string()), values.email);
        assert!(values.name.is_none());
        assert!(values.tier.is_none());
    }

    #[test]
    fn test_sanitize_update_rejects_empty_requests() {
        assert!(sanitize_update(None, None, None).is_none());
        assert!(sanitize_update(Some("gold"), Some("   "), Some("")).is_none());
    }

    #[test]
    fn test_sanitize_update_keeps_valid_tier() {
        let values = sanitize_update(Some("free"), None, None).unwrap();
        assert_eq!(Some(Tier::Free), values.tier);
    }
}
