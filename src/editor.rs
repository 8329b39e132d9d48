//! The entry relation editor.
//!
//! One editor owns one working copy of an [`Entry`] plus the candidate lists
//! for its tag, blog and category relations. Loads and saves run as spawned
//! tasks; their outcomes come back as events that are applied on the
//! caller's side through [`EntryRelationEditor::poll_events`],
//! [`EntryRelationEditor::next_event`] or [`EntryRelationEditor::settle`].

use crate::entry::Entry;
use crate::error::{EditorError, Result};
use crate::relations::{Blog, Category, Identified, Tag};
use crate::services::{EditorServices, RelationLoader};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Load state of one candidate collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Candidates<T> {
    #[default]
    Uninitialized,
    Loading,
    Ready(Vec<T>),
    /// The fetch failed; the relation stays unpopulated for this session.
    Failed,
}

impl<T> Candidates<T> {
    pub fn get(&self) -> Option<&[T]> {
        match self {
            Candidates::Ready(items) => Some(items),
            _ => None,
        }
    }

    /// Items to render; empty unless the fetch succeeded.
    pub fn as_slice(&self) -> &[T] {
        self.get().unwrap_or(&[])
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Candidates::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Candidates::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Uninitialized,
    Loading,
    Ready,
    /// Every fetch finished but at least one failed. The editor stays usable.
    PartiallyLoaded,
}

#[derive(Debug)]
enum EditorEvent {
    Tags(Result<Vec<Tag>>),
    Blogs(Result<Vec<Blog>>),
    Categories(Result<Vec<Category>>),
    Saved(Result<Entry>),
}

#[derive(Debug)]
struct Envelope {
    session: u64,
    event: EditorEvent,
}

pub struct EntryRelationEditor {
    services: EditorServices,
    session: u64,
    entry: Entry,
    saving: bool,
    exited: bool,
    tags: Candidates<Tag>,
    blogs: Candidates<Blog>,
    categories: Candidates<Category>,
    events_tx: UnboundedSender<Envelope>,
    events_rx: UnboundedReceiver<Envelope>,
}

impl EntryRelationEditor {
    pub fn new(services: EditorServices) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        EntryRelationEditor {
            services,
            session: 0,
            entry: Entry::new(),
            saving: false,
            exited: false,
            tags: Candidates::Uninitialized,
            blogs: Candidates::Uninitialized,
            categories: Candidates::Uninitialized,
            events_tx,
            events_rx,
        }
    }

    /// Starts an edit session on `entry` and issues the three candidate
    /// fetches. Returns immediately; results arrive as events.
    ///
    /// Must be called from within a tokio runtime.
    pub fn initialize(&mut self, entry: Entry) {
        self.session += 1;
        self.entry = entry;
        self.saving = false;
        self.exited = false;
        self.tags = Candidates::Loading;
        self.blogs = Candidates::Loading;
        self.categories = Candidates::Loading;

        tracing::debug!(
            session = self.session,
            entry_id = ?self.entry.id,
            "edit session started"
        );

        self.spawn_load(self.services.tags.clone(), EditorEvent::Tags);
        self.spawn_load(self.services.blogs.clone(), EditorEvent::Blogs);
        self.spawn_load(self.services.categories.clone(), EditorEvent::Categories);
    }

    fn spawn_load<T>(
        &self,
        loader: Arc<dyn RelationLoader<T>>,
        wrap: fn(Result<Vec<T>>) -> EditorEvent,
    ) where
        T: Send + 'static,
    {
        let tx = self.events_tx.clone();
        let session = self.session;
        tokio::spawn(async move {
            let result = loader.fetch_all().await;
            // The receiver lives as long as the editor; a send error only
            // means the editor is gone.
            let _ = tx.send(Envelope {
                session,
                event: wrap(result),
            });
        });
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn entry_mut(&mut self) -> &mut Entry {
        &mut self.entry
    }

    pub fn tags(&self) -> &Candidates<Tag> {
        &self.tags
    }

    pub fn blogs(&self) -> &Candidates<Blog> {
        &self.blogs
    }

    pub fn categories(&self) -> &Candidates<Category> {
        &self.categories
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub fn load_status(&self) -> LoadStatus {
        let slots = [
            (self.tags.is_loading(), self.tags.is_failed()),
            (self.blogs.is_loading(), self.blogs.is_failed()),
            (self.categories.is_loading(), self.categories.is_failed()),
        ];
        if self.session == 0 {
            LoadStatus::Uninitialized
        } else if slots.iter().any(|(loading, _)| *loading) {
            LoadStatus::Loading
        } else if slots.iter().any(|(_, failed)| *failed) {
            LoadStatus::PartiallyLoaded
        } else {
            LoadStatus::Ready
        }
    }

    /// Persists the working copy: `update` when it carries an identifier,
    /// `create` otherwise. Returns once the request is dispatched.
    pub fn save(&mut self) -> Result<()> {
        if self.session == 0 {
            return Err(EditorError::NotInitialized);
        }
        if self.exited {
            return Err(EditorError::SessionClosed);
        }
        if self.saving {
            return Err(EditorError::SaveInProgress);
        }

        self.saving = true;
        let record = self.entry.clone();
        let repository = self.services.repository.clone();
        let tx = self.events_tx.clone();
        let session = self.session;

        tracing::info!(session, entry_id = ?record.id, "saving entry");

        tokio::spawn(async move {
            let result = if record.is_persisted() {
                repository.update(record).await
            } else {
                repository.create(record).await
            };
            let _ = tx.send(Envelope {
                session,
                event: EditorEvent::Saved(result),
            });
        });

        Ok(())
    }

    /// Leaves the editor without persisting.
    pub fn previous_state(&mut self) {
        self.leave();
    }

    fn leave(&mut self) {
        if self.exited {
            return;
        }
        self.exited = true;
        tracing::debug!(session = self.session, "leaving editor");
        self.services.exit.leave();
    }

    /// Applies every event that has already arrived. Never blocks.
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(envelope) = self.events_rx.try_recv() {
            self.apply(envelope);
            applied += 1;
        }
        applied
    }

    /// Waits for the next event and applies it.
    pub async fn next_event(&mut self) {
        if let Some(envelope) = self.events_rx.recv().await {
            self.apply(envelope);
        }
    }

    /// Applies events until no fetch or save of the current session is
    /// pending. Does not return while a collaborator hangs.
    pub async fn settle(&mut self) {
        while self.is_pending() {
            self.next_event().await;
        }
    }

    fn is_pending(&self) -> bool {
        self.saving
            || self.tags.is_loading()
            || self.blogs.is_loading()
            || self.categories.is_loading()
    }

    fn apply(&mut self, envelope: Envelope) {
        if envelope.session != self.session {
            tracing::debug!(
                session = envelope.session,
                current = self.session,
                "discarding event from a previous session"
            );
            return;
        }

        match envelope.event {
            EditorEvent::Tags(result) => {
                self.tags = self.store_candidates("tags", result);
            }
            EditorEvent::Blogs(result) => {
                self.blogs = self.store_candidates("blogs", result);
            }
            EditorEvent::Categories(result) => {
                self.categories = self.store_candidates("categories", result);
            }
            EditorEvent::Saved(Ok(saved)) => {
                self.saving = false;
                tracing::info!(entry_id = ?saved.id, "entry saved");
                self.leave();
            }
            EditorEvent::Saved(Err(e)) => {
                // Save failures only reset the flag; they are not notified.
                self.saving = false;
                tracing::warn!(error = %e, "saving entry failed");
            }
        }
    }

    fn store_candidates<T>(&self, relation: &str, result: Result<Vec<T>>) -> Candidates<T> {
        match result {
            Ok(items) => {
                tracing::debug!(relation, count = items.len(), "candidates loaded");
                Candidates::Ready(items)
            }
            Err(e) => {
                tracing::warn!(relation, error = %e, "loading candidates failed");
                self.services.notifications.error(&e.to_string());
                Candidates::Failed
            }
        }
    }

    pub fn is_tag_selected(&self, tag: &Tag) -> bool {
        self.entry.has_tag(tag.id)
    }

    /// Adds `tag` to the working copy, or removes the tag with the same
    /// identifier if it is already there.
    pub fn toggle_tag(&mut self, tag: &Tag) {
        if self.entry.has_tag(tag.id) {
            self.entry.tags.retain(|t| t.id != tag.id);
        } else {
            self.entry.tags.push(tag.clone());
        }
    }

    pub fn select_blog(&mut self, blog: Option<&Blog>) {
        self.entry.blog_id = blog.map(|b| b.id);
        self.entry.blog_title = blog.map(|b| b.title.clone());
    }

    pub fn select_category(&mut self, category: Option<&Category>) {
        self.entry.category_id = category.map(|c| c.id);
        self.entry.category_name = category.map(|c| c.name.clone());
    }

    pub fn track_tag_by_id(_index: usize, item: &Tag) -> i64 {
        item.id
    }

    pub fn track_blog_by_id(_index: usize, item: &Blog) -> i64 {
        item.id
    }

    pub fn track_category_by_id(_index: usize, item: &Category) -> i64 {
        item.id
    }
}

/// Returns the element of `selected` with the same identifier as
/// `candidate`, or `candidate` itself when there is none.
///
/// The returned reference points into `selected` when matched, so callers
/// comparing options by address see the already-selected object.
pub fn resolve_selected<'a, T: Identified>(selected: Option<&'a [T]>, candidate: &'a T) -> &'a T {
    selected
        .into_iter()
        .flatten()
        .find(|s| s.id() == candidate.id())
        .unwrap_or(candidate)
}
