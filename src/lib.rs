//! blog_entry_editor - relationship editor for blog entries
//!
//! Loads one entry together with the tag, blog and category candidate
//! lists, keeps the working copy while the user edits it and persists it
//! with create-or-update semantics.

pub mod config;
pub mod editor;
pub mod entry;
pub mod error;
pub mod relations;
pub mod services;
pub mod store;

pub use editor::{resolve_selected, Candidates, EntryRelationEditor, LoadStatus};
pub use entry::{Blob, Entry};
pub use error::{EditorError, Result};
pub use relations::{Blog, Category, Identified, Tag};
pub use services::{
    AlertLog, EditorServices, ExitFlag, ExitSignal, NotificationSink, RecordRepository,
    RelationLoader,
};
pub use store::JsonStore;
