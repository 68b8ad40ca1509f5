//! Usage statistics
//!
//! Aggregated counts over the user collection. All time windows are UTC
//! calendar windows, weeks start on Sunday.

use chrono::DateTime;
use chrono::Datelike;
use chrono::Days;
use chrono::Utc;
use chrono::naive::NaiveDateTime;
use chrono::naive::NaiveTime;
use serde::Serialize;

use crate::storage::Result;
use crate::storage::Storage;
use crate::storage::UserFilter;
use crate::users::Tier;

/// A snapshot of the user base
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// All registered users
    pub total_users: i64,

    /// Users on the pro tier
    pub pro_users: i64,

    /// Users on the free tier
    pub free_users: i64,

    /// Users registered since UTC midnight
    pub new_users_today: i64,

    /// Users registered since the most recent Sunday, UTC midnight
    pub new_users_this_week: i64,

    /// Users registered since the first of the month, UTC midnight
    pub new_users_this_month: i64,
}

/// Compute a snapshot of the user base as of `now`
///
/// All five counts run concurrently; the free count is derived so the split
/// always adds up to the total
pub async fn compute<S: Storage>(storage: &S, now: DateTime<Utc>) -> Result<Stats> {
    let everyone = UserFilter::default();
    let pro = UserFilter::by_tier(Tier::Pro);

    let (total_users, pro_users, new_users_today, new_users_this_week, new_users_this_month) =
        tokio::try_join!(
            storage.count_users(&everyone),
            storage.count_users(&pro),
            storage.count_users_created_since(start_of_day(now)),
            storage.count_users_created_since(start_of_week(now)),
            storage.count_users_created_since(start_of_month(now)),
        )?;

    Ok(Stats {
        total_users,
        pro_users,
        free_users: total_users - pro_users,
        new_users_today,
        new_users_this_week,
        new_users_this_month,
    })
}

/// UTC midnight of the current day
fn start_of_day(now: DateTime<Utc>) -> NaiveDateTime {
    now.date_naive().and_time(NaiveTime::MIN)
}

/// UTC midnight of the most recent Sunday
///
/// On a Sunday that is the current day itself
fn start_of_week(now: DateTime<Utc>) -> NaiveDateTime {
    let days_since_sunday = u64::from(now.weekday().num_days_from_sunday());

    now.date_naive()
        .checked_sub_days(Days::new(days_since_sunday))
        .unwrap_or_else(|| now.date_naive())
        .and_time(NaiveTime::MIN)
}

/// UTC midnight of the first of the current month
fn start_of_month(now: DateTime<Utc>) -> NaiveDateTime {
    now.date_naive()
        .with_day(1)
        .unwrap_or_else(|| now.date_naive())
        .and_time(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap()
    }

    fn naive(year: i32, month: u32, day: u32) -> NaiveDateTime {
        utc(year, month, day, 0, 0).naive_utc()
    }

    #[test]
    fn test_start_of_day() {
        // 2025-08-20 is a Wednesday
        let now = utc(2025, 8, 20, 15, 30);

        assert_eq!(naive(2025, 8, 20), start_of_day(now));
    }

    #[test]
    fn test_start_of_week_midweek() {
        let now = utc(2025, 8, 20, 15, 30);

        // the Sunday before that Wednesday
        assert_eq!(naive(2025, 8, 17), start_of_week(now));
    }

    #[test]
    fn test_start_of_week_on_a_sunday() {
        let now = utc(2025, 8, 17, 0, 5);

        // a Sunday is its own start of week
        assert_eq!(naive(2025, 8, 17), start_of_week(now));
    }

    #[test]
    fn test_start_of_month() {
        let now = utc(2025, 8, 20, 15, 30);

        assert_eq!(naive(2025, 8, 1), start_of_month(now));
    }

    #[test]
    fn test_start_of_month_on_the_first() {
        let now = utc(2025, 8, 1, 0, 0);

        assert_eq!(naive(2025, 8, 1), start_of_month(now));
    }
}
