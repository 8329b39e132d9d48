use crate::error::Result;
use crate::relations::Tag;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Binary description content together with its content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Blob {
    pub fn text(text: impl Into<String>) -> Self {
        Blob {
            content_type: "text/plain".to_string(),
            data: text.into().into_bytes(),
        }
    }

    /// Reads `path` and guesses the content type from its extension.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Blob { content_type, data })
    }

    pub fn is_textual(&self) -> bool {
        self.content_type.starts_with("text/")
    }

    pub fn as_text(&self) -> Option<&str> {
        if !self.is_textual() {
            return None;
        }
        std::str::from_utf8(&self.data).ok()
    }

    /// Human readable payload size, e.g. `"1,234 bytes"`.
    pub fn byte_size(&self) -> String {
        let digits = self.data.len().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        format!("{} bytes", grouped)
    }
}

/// The record being edited. `id` is `None` until the entry is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Option<i64>,
    pub title: String,
    pub description: Option<Blob>,
    pub published: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub blog_title: Option<String>,
    pub blog_id: Option<i64>,
    pub category_name: Option<String>,
    pub category_id: Option<i64>,
}

impl Entry {
    pub fn new() -> Self {
        Entry {
            published: false,
            ..Default::default()
        }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Entry {
            title: title.into(),
            ..Entry::new()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn has_tag(&self, id: i64) -> bool {
        self.tags.iter().any(|t| t.id == id)
    }

    /// Replaces the text of the description, keeping a textual content type.
    pub fn set_description_text(&mut self, text: &str) {
        if text.is_empty() {
            self.description = None;
            return;
        }
        let content_type = self
            .description
            .as_ref()
            .filter(|b| b.is_textual())
            .map(|b| b.content_type.clone());
        self.description = Some(match content_type {
            Some(content_type) => Blob {
                content_type,
                data: text.as_bytes().to_vec(),
            },
            None => Blob::text(text),
        });
    }
}
