//! Configuration management

use crate::error::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "blog_editor.toml";

#[derive(Parser, Debug, Default)]
#[command(name = "blog_entry_editor")]
#[command(about = "Edit a blog entry with its tags, blog and category", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (default: blog_editor.toml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// JSON data file holding entries, tags, blogs and categories
    #[arg(short, long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Identifier of the entry to edit; omit to write a new one
    #[arg(short, long, value_name = "ID")]
    pub entry: Option<i64>,

    /// File to attach as the entry description before editing
    #[arg(long, value_name = "PATH")]
    pub description_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_file: PathBuf::from("blog_entries.json"),
            log_file: PathBuf::from("blog_editor.log"),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Resolves settings for `cli`: the explicit config file, else
    /// `blog_editor.toml` in `dir` when it exists, else defaults. Command line
    /// values win over file values.
    pub fn resolve(cli: &Cli, dir: &Path) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let fallback = dir.join(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load_from_file(&fallback)?
                } else {
                    Settings::default()
                }
            }
        };

        if let Some(data_file) = &cli.data_file {
            settings.data_file = data_file.clone();
        }

        Ok(settings)
    }

    /// Log level, falling back to `info` when the configured value is unknown.
    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
