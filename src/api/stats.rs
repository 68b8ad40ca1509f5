//! Usage statistics API

use axum::Extension;
use chrono::Utc;

use crate::connection::ConnectionManager;
use crate::stats;
use crate::stats::Stats;
use crate::storage::Storage;

use super::CurrentAdmin;
use super::Error;
use super::Success;

/// Get a snapshot of the user base
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6100/api/admin/stats
/// ```
///
/// Response:
/// ```json
/// { "totalUsers": 5, "proUsers": 3, "freeUsers": 2, "newUsersToday": 1, ... }
/// ```
pub async fn overview<S: Storage>(
    _current_admin: CurrentAdmin<S>,
    Extension(connection_manager): Extension<ConnectionManager<S>>,
) -> Result<Success<Stats>, Error> {
    let storage = connection_manager.acquire().await?;

    let stats = stats::compute(&storage, Utc::now()).await?;

    Ok(Success::ok(stats))
}
