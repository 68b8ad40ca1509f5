use chrono::naive::NaiveDateTime;
use uuid::Uuid;

use crate::items::ItemType;

/// A public, possibly time-limited snapshot of an item
///
/// The title/content/tags are a point-in-time copy, not a live reference to
/// the source item
#[derive(Clone, Debug)]
pub struct SharedNote {
    /// Externally dereferenceable share ID
    pub share_id: String,
    /// Client-assigned ID of the source item
    pub item_client_id: String,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub item_type: ItemType,
    pub url: Option<String>,
    pub tags: Vec<String>,
    pub created_at: NaiveDateTime,
    pub expires_at: Option<NaiveDateTime>,
}
