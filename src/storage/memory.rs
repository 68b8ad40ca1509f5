//! Memory storage
//!
//! The substitutable fake for the test suite and local tinkering; everything
//! is gone on shutdown

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use chrono::naive::NaiveDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::folders::Folder;
use crate::items::Item;
use crate::shared_notes::SharedNote;
use crate::users::User;

use super::Result;
use super::Storage;
use super::UpdateUserValues;
use super::UserFilter;

/// An in-memory storage
///
/// Clones share the underlying maps, handing a clone to the router keeps the
/// test's own handle observable
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All users in storage
    users: Arc<Mutex<HashMap<Uuid, User>>>,

    /// All items in storage, keyed by their client-assigned ID
    items: Arc<Mutex<HashMap<String, Item>>>,

    /// All folders in storage, keyed by their client-assigned ID
    folders: Arc<Mutex<HashMap<String, Folder>>>,

    /// All shared notes in storage, keyed by their share ID
    shared_notes: Arc<Mutex<HashMap<String, SharedNote>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user, the way the (out of scope) registration flow would
    pub async fn insert_user(&self, user: User) {
        self.users.lock().await.insert(user.id, user);
    }

    /// Seed an item, the way the sync service would
    pub async fn insert_item(&self, item: Item) {
        self.items.lock().await.insert(item.client_id.clone(), item);
    }

    /// Seed a folder, the way the sync service would
    pub async fn insert_folder(&self, folder: Folder) {
        self.folders
            .lock()
            .await
            .insert(folder.client_id.clone(), folder);
    }

    /// Seed a shared note, the way the sync service would
    pub async fn insert_shared_note(&self, shared_note: SharedNote) {
        self.shared_notes
            .lock()
            .await
            .insert(shared_note.share_id.clone(), shared_note);
    }

    /// All items owned by a user
    pub async fn items_owned_by(&self, user_id: &Uuid) -> Vec<Item> {
        self.items
            .lock()
            .await
            .values()
            .filter(|item| &item.user_id == user_id)
            .cloned()
            .collect()
    }

    /// All folders owned by a user
    pub async fn folders_owned_by(&self, user_id: &Uuid) -> Vec<Folder> {
        self.folders
            .lock()
            .await
            .values()
            .filter(|folder| &folder.user_id == user_id)
            .cloned()
            .collect()
    }

    /// All shared notes owned by a user
    pub async fn shared_notes_owned_by(&self, user_id: &Uuid) -> Vec<SharedNote> {
        self.shared_notes
            .lock()
            .await
            .values()
            .filter(|shared_note| &shared_note.user_id == user_id)
            .cloned()
            .collect()
    }
}

/// Does a user match the filter?
fn matches(user: &User, filter: &UserFilter) -> bool {
    if let Some(text) = &filter.text {
        let text = text.to_lowercase();

        if !user.name.to_lowercase().contains(&text) && !user.email.to_lowercase().contains(&text) {
            return false;
        }
    }

    if let Some(tier) = filter.tier {
        if user.tier != tier {
            return false;
        }
    }

    true
}

#[async_trait]
impl Storage for Memory {
    async fn find_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_users_page(
        &self,
        filter: &UserFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>> {
        let mut users = self
            .users
            .lock()
            .await
            .values()
            .filter(|user| matches(user, filter))
            .cloned()
            .collect::<Vec<User>>();

        // most recent first, the ID keeps equal timestamps stable
        users.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(users
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn count_users(&self, filter: &UserFilter) -> Result<i64> {
        let count = self
            .users
            .lock()
            .await
            .values()
            .filter(|user| matches(user, filter))
            .count();

        Ok(count as i64)
    }

    async fn count_users_created_since(&self, since: NaiveDateTime) -> Result<i64> {
        let count = self
            .users
            .lock()
            .await
            .values()
            .filter(|user| user.created_at >= since)
            .count();

        Ok(count as i64)
    }

    async fn update_user(&self, id: &Uuid, values: &UpdateUserValues) -> Result<Option<User>> {
        Ok(self.users.lock().await.get_mut(id).map(|user| {
            if let Some(name) = &values.name {
                user.name = name.clone();
            }

            if let Some(email) = &values.email {
                user.email = email.clone();
            }

            if let Some(tier) = values.tier {
                user.tier = tier;
            }

            user.updated_at = Utc::now().naive_utc();

            user.clone()
        }))
    }

    async fn update_credential(&self, id: &Uuid, hashed_password: &str) -> Result<()> {
        if let Some(user) = self.users.lock().await.get_mut(id) {
            user.hashed_password = Some(hashed_password.to_string());
            user.updated_at = Utc::now().naive_utc();
        }

        Ok(())
    }

    async fn delete_user(&self, id: &Uuid) -> Result<()> {
        self.users.lock().await.remove(id);

        Ok(())
    }

    async fn delete_items_by_owner(&self, user_id: &Uuid) -> Result<u64> {
        let mut items = self.items.lock().await;
        let before = items.len();

        items.retain(|_, item| &item.user_id != user_id);

        Ok((before - items.len()) as u64)
    }

    async fn delete_folders_by_owner(&self, user_id: &Uuid) -> Result<u64> {
        let mut folders = self.folders.lock().await;
        let before = folders.len();

        folders.retain(|_, folder| &folder.user_id != user_id);

        Ok((before - folders.len()) as u64)
    }

    async fn delete_shared_notes_by_owner(&self, user_id: &Uuid) -> Result<u64> {
        let mut shared_notes = self.shared_notes.lock().await;
        let before = shared_notes.len();

        shared_notes.retain(|_, shared_note| &shared_note.user_id != user_id);

        Ok((before - shared_notes.len()) as u64)
    }
}
