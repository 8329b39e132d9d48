//! Related entity shapes offered as candidates to the editor.

use crate::entry::{Blob, Entry};
use serde::{Deserialize, Serialize};

/// Anything that can be matched by identifier rather than by value.
pub trait Identified {
    fn id(&self) -> i64;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub description: Option<Blob>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<Entry>,
}

impl Tag {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Tag {
            id,
            name: name.into(),
        }
    }
}

impl Blog {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Blog {
            id,
            title: title.into(),
            description: None,
            entries: Vec::new(),
        }
    }
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Category {
            id,
            name: name.into(),
            entries: Vec::new(),
        }
    }
}

impl Identified for Tag {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Blog {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Category {
    fn id(&self) -> i64 {
        self.id
    }
}
