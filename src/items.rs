use chrono::naive::NaiveDateTime;
use uuid::Uuid;

/// The kind of record a client stashed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemType {
    Note,
    Url,
    Reminder,
}

/// A synced note/url/reminder record
///
/// Created and mutated by the sync service; the admin backend only deletes
/// them in bulk when the owning account is deleted
#[derive(Clone, Debug)]
pub struct Item {
    /// Client-assigned, globally unique idempotency key
    pub client_id: String,
    pub user_id: Uuid,
    pub item_type: ItemType,
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub reminder_date: Option<NaiveDateTime>,
    pub reminder_completed: bool,
    pub tags: Vec<String>,
    pub pinned: bool,
    pub color: Option<String>,
    /// Client-assigned ID of the containing folder
    pub folder_id: Option<String>,
    /// Soft-delete marker, kept around for sync reconciliation
    pub deleted: bool,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
