#![allow(dead_code)]

use async_trait::async_trait;
use blog_entry_editor::{
    AlertLog, Blog, Category, EditorError, EditorServices, Entry, ExitSignal, RecordRepository,
    RelationLoader, Result, Tag,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One scripted loader response.
pub enum Script<T> {
    Items(Vec<T>),
    Fail(String),
    /// Never completes.
    Hang,
    /// Waits for the notify before answering with the inner script.
    Gated(Arc<Notify>, Box<Script<T>>),
}

/// Loader answering from a queue of scripts. The last script repeats.
pub struct ScriptedLoader<T> {
    scripts: Mutex<VecDeque<Script<T>>>,
    calls: AtomicUsize,
}

impl<T: Clone> ScriptedLoader<T> {
    pub fn new(scripts: Vec<Script<T>>) -> Arc<Self> {
        Arc::new(ScriptedLoader {
            scripts: Mutex::new(scripts.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn items(items: Vec<T>) -> Arc<Self> {
        Self::new(vec![Script::Items(items)])
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(vec![Script::Fail(message.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_script(&self) -> Script<T> {
        let mut scripts = self.scripts.lock().unwrap();
        if scripts.len() > 1 || matches!(scripts.front(), Some(Script::Gated(..))) {
            return scripts.pop_front().unwrap();
        }
        match scripts.front().unwrap() {
            Script::Items(items) => Script::Items(items.clone()),
            Script::Fail(message) => Script::Fail(message.clone()),
            Script::Hang => Script::Hang,
            Script::Gated(..) => unreachable!("gated scripts are consumed"),
        }
    }
}

async fn play<T>(script: Script<T>) -> Result<Vec<T>> {
    let mut script = script;
    loop {
        match script {
            Script::Items(items) => return Ok(items),
            Script::Fail(message) => return Err(EditorError::Backend(message)),
            Script::Hang => return futures::future::pending().await,
            Script::Gated(notify, inner) => {
                notify.notified().await;
                script = *inner;
            }
        }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> RelationLoader<T> for ScriptedLoader<T> {
    async fn fetch_all(&self) -> Result<Vec<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.next_script();
        play(script).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Create,
    Update,
}

/// Repository recording every call. Fails with `failure` when set.
pub struct RecordingRepository {
    calls: Mutex<Vec<(Call, Entry)>>,
    failure: Option<String>,
}

impl RecordingRepository {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(RecordingRepository {
            calls: Mutex::new(Vec::new()),
            failure: None,
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(RecordingRepository {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        })
    }

    pub fn calls(&self) -> Vec<(Call, Entry)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call, entry: Entry) -> Result<Entry> {
        self.calls.lock().unwrap().push((call, entry.clone()));
        match &self.failure {
            Some(message) => Err(EditorError::Backend(message.clone())),
            None => Ok(entry),
        }
    }
}

#[async_trait]
impl RecordRepository for RecordingRepository {
    async fn create(&self, entry: Entry) -> Result<Entry> {
        let result = self.record(Call::Create, entry)?;
        Ok(Entry {
            id: Some(100),
            ..result
        })
    }

    async fn update(&self, entry: Entry) -> Result<Entry> {
        self.record(Call::Update, entry)
    }
}

#[derive(Default)]
pub struct ExitCounter {
    count: AtomicUsize,
}

impl ExitCounter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl ExitSignal for ExitCounter {
    fn leave(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn sample_tags() -> Vec<Tag> {
    vec![Tag::new(1, "rust"), Tag::new(2, "async"), Tag::new(3, "tui")]
}

pub fn sample_blogs() -> Vec<Blog> {
    vec![
        Blog::new(10, "Engineering"),
        Blog::new(11, "Travel"),
        Blog::new(12, "Cooking"),
    ]
}

pub fn sample_categories() -> Vec<Category> {
    vec![
        Category::new(20, "Tutorial"),
        Category::new(21, "Opinion"),
        Category::new(22, "News"),
    ]
}

/// Everything a test needs to inspect around one editor.
pub struct Harness {
    pub tags: Arc<ScriptedLoader<Tag>>,
    pub blogs: Arc<ScriptedLoader<Blog>>,
    pub categories: Arc<ScriptedLoader<Category>>,
    pub repository: Arc<RecordingRepository>,
    pub alerts: Arc<AlertLog>,
    pub exit: Arc<ExitCounter>,
}

impl Harness {
    pub fn new(repository: Arc<RecordingRepository>) -> Self {
        Harness {
            tags: ScriptedLoader::items(sample_tags()),
            blogs: ScriptedLoader::items(sample_blogs()),
            categories: ScriptedLoader::items(sample_categories()),
            repository,
            alerts: Arc::new(AlertLog::new()),
            exit: Arc::new(ExitCounter::default()),
        }
    }

    pub fn services(&self) -> EditorServices {
        EditorServices {
            tags: self.tags.clone(),
            blogs: self.blogs.clone(),
            categories: self.categories.clone(),
            repository: self.repository.clone(),
            notifications: self.alerts.clone(),
            exit: self.exit.clone(),
        }
    }
}
