mod ui;

use blog_entry_editor::config::{Cli, Settings};
use blog_entry_editor::{AlertLog, Blob, EditorServices, EntryRelationEditor, ExitFlag, JsonStore};
use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use std::fs::File;
use std::sync::{Arc, Mutex};
use ui::UI;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let settings = Settings::resolve(&cli, &std::env::current_dir()?)?;

    // The terminal belongs to the form, so logs go to a file.
    let log_file = File::create(&settings.log_file)?;
    tracing_subscriber::fmt()
        .with_max_level(settings.level())
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    let store = Arc::new(JsonStore::open(&settings.data_file).await?);
    let mut entry = store
        .resolve_entry(cli.entry)
        .await
        .map_err(|e| eyre!("Failed to load entry: {}", e))?;

    if let Some(path) = &cli.description_file {
        let blob = Blob::from_file(path).await?;
        tracing::info!(content_type = %blob.content_type, size = %blob.byte_size(), "description attached");
        entry.description = Some(blob);
    }

    let alerts = Arc::new(AlertLog::new());
    let exit = Arc::new(ExitFlag::new());
    let services = EditorServices::from_backend(store.clone(), alerts.clone(), exit.clone());

    let mut editor = EntryRelationEditor::new(services);
    editor.initialize(entry);

    let mut ui = UI::new()?;
    ui.run(&mut editor, &exit, &alerts)?;
    Ok(())
}
