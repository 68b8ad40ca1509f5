use chrono::naive::NaiveDateTime;
use uuid::Uuid;

/// A folder grouping items, owned by the sync service
#[derive(Clone, Debug)]
pub struct Folder {
    /// Client-assigned, globally unique idempotency key
    pub client_id: String,
    pub user_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub deleted: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
