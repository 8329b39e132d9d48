//! Collaborators the editor talks to.

use crate::entry::Entry;
use crate::error::Result;
use crate::relations::{Blog, Category, Tag};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Produces a snapshot of every record of one related type.
#[async_trait]
pub trait RelationLoader<T>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<T>>;
}

/// Persists entries. The editor picks `create` or `update` by the presence
/// of an identifier on the working copy.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn create(&self, entry: Entry) -> Result<Entry>;
    async fn update(&self, entry: Entry) -> Result<Entry>;
}

pub trait NotificationSink: Send + Sync {
    fn error(&self, message: &str);
}

/// Invoked when the user leaves the editor.
pub trait ExitSignal: Send + Sync {
    fn leave(&self);
}

#[derive(Clone)]
pub struct EditorServices {
    pub tags: Arc<dyn RelationLoader<Tag>>,
    pub blogs: Arc<dyn RelationLoader<Blog>>,
    pub categories: Arc<dyn RelationLoader<Category>>,
    pub repository: Arc<dyn RecordRepository>,
    pub notifications: Arc<dyn NotificationSink>,
    pub exit: Arc<dyn ExitSignal>,
}

impl EditorServices {
    /// Wires one backend that serves every loader and the repository.
    pub fn from_backend<B>(
        backend: Arc<B>,
        notifications: Arc<dyn NotificationSink>,
        exit: Arc<dyn ExitSignal>,
    ) -> Self
    where
        B: RelationLoader<Tag>
            + RelationLoader<Blog>
            + RelationLoader<Category>
            + RecordRepository
            + 'static,
    {
        EditorServices {
            tags: backend.clone(),
            blogs: backend.clone(),
            categories: backend.clone(),
            repository: backend,
            notifications,
            exit,
        }
    }
}

/// Keeps error notifications so a front-end can display them.
#[derive(Debug, Default)]
pub struct AlertLog {
    messages: Mutex<Vec<String>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn latest(&self) -> Option<String> {
        self.messages.lock().ok().and_then(|m| m.last().cloned())
    }
}

impl NotificationSink for AlertLog {
    fn error(&self, message: &str) {
        tracing::error!(alert = message, "notification");
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

/// Latch raised when the editor asks to be left.
#[derive(Debug, Default)]
pub struct ExitFlag {
    raised: AtomicBool,
}

impl ExitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

impl ExitSignal for ExitFlag {
    fn leave(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }
}
