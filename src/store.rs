use crate::entry::Entry;
use crate::error::{EditorError, Result};
use crate::relations::{Blog, Category, Tag};
use crate::services::{RecordRepository, RelationLoader};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub blogs: Vec<Blog>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default = "first_id")]
    pub next_id: i64,
}

fn first_id() -> i64 {
    1
}

impl Default for StoreData {
    fn default() -> Self {
        StoreData {
            entries: Vec::new(),
            tags: Vec::new(),
            blogs: Vec::new(),
            categories: Vec::new(),
            next_id: first_id(),
        }
    }
}

impl StoreData {
    /// Checks the references of `entry` and refreshes its denormalised
    /// blog title and category name from the stored records.
    fn link(&self, entry: &mut Entry) -> Result<()> {
        entry.blog_title = match entry.blog_id {
            Some(id) => {
                let blog = self
                    .blogs
                    .iter()
                    .find(|b| b.id == id)
                    .ok_or_else(|| EditorError::not_found("Blog", id))?;
                Some(blog.title.clone())
            }
            None => None,
        };

        entry.category_name = match entry.category_id {
            Some(id) => {
                let category = self
                    .categories
                    .iter()
                    .find(|c| c.id == id)
                    .ok_or_else(|| EditorError::not_found("Category", id))?;
                Some(category.name.clone())
            }
            None => None,
        };

        for tag in entry.tags.iter_mut() {
            let stored = self
                .tags
                .iter()
                .find(|t| t.id == tag.id)
                .ok_or_else(|| EditorError::not_found("Tag", tag.id))?;
            tag.name = stored.name.clone();
        }

        Ok(())
    }

    fn ensure_next_id(&mut self) {
        let max = self
            .entries
            .iter()
            .filter_map(|e| e.id)
            .max()
            .unwrap_or(0);
        if self.next_id <= max {
            // An entry at i64::MAX leaves no room; `create` reports that.
            self.next_id = max.checked_add(1).unwrap_or(i64::MAX);
        }
    }
}

/// All entities kept in one JSON document on disk.
pub struct JsonStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonStore {
    /// Opens the store at `path`. A missing file yields an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut data = match tokio::fs::read_to_string(&path).await {
            Ok(serialized) => serde_json::from_str::<StoreData>(&serialized)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no existing store, starting empty");
                StoreData::default()
            }
            Err(e) => return Err(e.into()),
        };
        data.ensure_next_id();
        Ok(JsonStore {
            path,
            data: Mutex::new(data),
        })
    }

    /// Creates a store at `path` holding `data`, writing it out immediately.
    pub async fn with_data(path: impl Into<PathBuf>, mut data: StoreData) -> Result<Self> {
        data.ensure_next_id();
        let store = JsonStore {
            path: path.into(),
            data: Mutex::new(data),
        };
        {
            let data = store.data.lock().await;
            store.save_to_file(&data).await?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> StoreData {
        self.data.lock().await.clone()
    }

    pub async fn find_entry(&self, id: i64) -> Option<Entry> {
        self.data
            .lock()
            .await
            .entries
            .iter()
            .find(|e| e.id == Some(id))
            .cloned()
    }

    /// Supplies the record to edit: a blank entry for `None`, the stored
    /// entry otherwise.
    pub async fn resolve_entry(&self, id: Option<i64>) -> Result<Entry> {
        match id {
            None => Ok(Entry::new()),
            Some(id) => self
                .find_entry(id)
                .await
                .ok_or_else(|| EditorError::not_found("Entry", id)),
        }
    }

    async fn save_to_file(&self, data: &StoreData) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&self.path, serialized).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordRepository for JsonStore {
    async fn create(&self, mut entry: Entry) -> Result<Entry> {
        if entry.id.is_some() {
            return Err(EditorError::IdExists);
        }
        let mut data = self.data.lock().await;
        data.link(&mut entry)?;

        let id = data.next_id;
        if data.entries.iter().any(|e| e.id == Some(id)) {
            return Err(EditorError::IdSpaceExhausted);
        }
        let previous_next_id = data.next_id;
        entry.id = Some(id);
        data.next_id = id.checked_add(1).unwrap_or(i64::MAX);
        data.entries.push(entry.clone());

        if let Err(e) = self.save_to_file(&data).await {
            data.entries.pop();
            data.next_id = previous_next_id;
            return Err(e);
        }
        tracing::debug!(entry_id = ?entry.id, "entry created");
        Ok(entry)
    }

    async fn update(&self, mut entry: Entry) -> Result<Entry> {
        let id = entry.id.ok_or(EditorError::IdNull)?;
        let mut data = self.data.lock().await;
        data.link(&mut entry)?;

        let index = data
            .entries
            .iter()
            .position(|e| e.id == Some(id))
            .ok_or_else(|| EditorError::not_found("Entry", id))?;
        let previous = std::mem::replace(&mut data.entries[index], entry.clone());

        if let Err(e) = self.save_to_file(&data).await {
            data.entries[index] = previous;
            return Err(e);
        }
        tracing::debug!(entry_id = id, "entry updated");
        Ok(entry)
    }
}

#[async_trait]
impl RelationLoader<Tag> for JsonStore {
    async fn fetch_all(&self) -> Result<Vec<Tag>> {
        Ok(self.data.lock().await.tags.clone())
    }
}

#[async_trait]
impl RelationLoader<Blog> for JsonStore {
    async fn fetch_all(&self) -> Result<Vec<Blog>> {
        Ok(self.data.lock().await.blogs.clone())
    }
}

#[async_trait]
impl RelationLoader<Category> for JsonStore {
    async fn fetch_all(&self) -> Result<Vec<Category>> {
        Ok(self.data.lock().await.categories.clone())
    }
}
