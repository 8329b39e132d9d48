use blog_entry_editor::{
    resolve_selected, AlertLog, Candidates, EntryRelationEditor, ExitFlag, LoadStatus,
};
use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::{
    io::{stdout, Stdout},
    time::Duration,
};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Title,
    Description,
    Published,
    Tags,
    Blog,
    Category,
}

impl Focus {
    const ORDER: [Focus; 6] = [
        Focus::Title,
        Focus::Description,
        Focus::Published,
        Focus::Tags,
        Focus::Blog,
        Focus::Category,
    ];

    fn next(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    fn previous(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Default)]
struct Cursors {
    tags: usize,
    blogs: usize,
    categories: usize,
}

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    focus: Focus,
    cursors: Cursors,
    status: Option<String>,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI {
            terminal,
            focus: Focus::Title,
            cursors: Cursors::default(),
            status: None,
        })
    }

    /// Drives the form until the editor signals that it should be left.
    pub fn run(
        &mut self,
        editor: &mut EntryRelationEditor,
        exit: &ExitFlag,
        alerts: &AlertLog,
    ) -> Result<()> {
        while !exit.is_raised() {
            editor.poll_events();
            self.terminal
                .draw(|f| render(f, editor, alerts, self.focus, &self.cursors, &self.status))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(editor, key);
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, editor: &mut EntryRelationEditor, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            // The save action is disabled while a save is in flight.
            if !editor.is_saving() {
                self.status = match editor.save() {
                    Ok(()) => None,
                    Err(e) => Some(e.to_string()),
                };
            }
            return;
        }

        match key.code {
            KeyCode::Esc => editor.previous_state(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            _ => match self.focus {
                Focus::Title => edit_text(&mut editor.entry_mut().title, key.code),
                Focus::Description => {
                    let entry = editor.entry_mut();
                    let editable = entry.description.as_ref().map_or(true, |b| b.as_text().is_some());
                    if editable {
                        let mut text = entry
                            .description
                            .as_ref()
                            .and_then(|b| b.as_text())
                            .unwrap_or("")
                            .to_string();
                        edit_text(&mut text, key.code);
                        if key.code == KeyCode::Enter {
                            text.push('\n');
                        }
                        entry.set_description_text(&text);
                    }
                }
                Focus::Published => {
                    if key.code == KeyCode::Char(' ') {
                        let entry = editor.entry_mut();
                        entry.published = !entry.published;
                    }
                }
                Focus::Tags => {
                    let len = editor.tags().as_slice().len();
                    if move_cursor(&mut self.cursors.tags, len, key.code) {
                        return;
                    }
                    if key.code == KeyCode::Char(' ') {
                        if let Some(tag) = editor.tags().as_slice().get(self.cursors.tags).cloned() {
                            editor.toggle_tag(&tag);
                        }
                    }
                }
                Focus::Blog => {
                    let len = editor.blogs().as_slice().len();
                    if move_cursor(&mut self.cursors.blogs, len, key.code) {
                        return;
                    }
                    if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                        if let Some(blog) = editor.blogs().as_slice().get(self.cursors.blogs).cloned() {
                            if editor.entry().blog_id == Some(blog.id) {
                                editor.select_blog(None);
                            } else {
                                editor.select_blog(Some(&blog));
                            }
                        }
                    }
                }
                Focus::Category => {
                    let len = editor.categories().as_slice().len();
                    if move_cursor(&mut self.cursors.categories, len, key.code) {
                        return;
                    }
                    if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                        if let Some(category) = editor
                            .categories()
                            .as_slice()
                            .get(self.cursors.categories)
                            .cloned()
                        {
                            if editor.entry().category_id == Some(category.id) {
                                editor.select_category(None);
                            } else {
                                editor.select_category(Some(&category));
                            }
                        }
                    }
                }
            },
        }
    }
}

fn edit_text(text: &mut String, code: KeyCode) {
    match code {
        KeyCode::Char(c) => text.push(c),
        KeyCode::Backspace => {
            text.pop();
        }
        _ => {}
    }
}

fn move_cursor(cursor: &mut usize, len: usize, code: KeyCode) -> bool {
    match code {
        KeyCode::Up => {
            *cursor = cursor.saturating_sub(1);
            true
        }
        KeyCode::Down => {
            if *cursor + 1 < len {
                *cursor += 1;
            }
            true
        }
        _ => false,
    }
}

/// Column just after `text` inside the bordered `area`, kept on the last
/// inner column when the text is wider than the field.
fn text_cursor_x(text: &str, area: Rect) -> u16 {
    let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
    area.x + 1 + width.min(area.width.saturating_sub(2))
}

fn block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn render(
    f: &mut Frame,
    editor: &EntryRelationEditor,
    alerts: &AlertLog,
    focus: Focus,
    cursors: &Cursors,
    status: &Option<String>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.area());

    let entry = editor.entry();
    let heading = match entry.id {
        Some(id) => format!("Edit Entry #{}", id),
        None => "New Entry".to_string(),
    };
    let title = Paragraph::new(heading)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(title, chunks[0]);

    let title_input =
        Paragraph::new(entry.title.as_str()).block(block("Title", focus == Focus::Title));
    f.render_widget(title_input, chunks[1]);
    if focus == Focus::Title {
        f.set_cursor_position(Position::new(
            text_cursor_x(&entry.title, chunks[1]),
            chunks[1].y + 1,
        ));
    }

    let description = match &entry.description {
        None => String::new(),
        Some(blob) => match blob.as_text() {
            Some(text) => text.to_string(),
            None => format!("<{}, {}>", blob.content_type, blob.byte_size()),
        },
    };
    let description_input = Paragraph::new(description)
        .wrap(Wrap { trim: false })
        .block(block("Description", focus == Focus::Description));
    f.render_widget(description_input, chunks[2]);

    let published = Paragraph::new(format!(
        "[{}] Published",
        if entry.published { "x" } else { " " }
    ))
    .block(block("Status", focus == Focus::Published));
    f.render_widget(published, chunks[3]);

    let relations = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ]
            .as_ref(),
        )
        .split(chunks[4]);

    let tag_rows: Vec<(String, bool)> = editor
        .tags()
        .as_slice()
        .iter()
        .map(|candidate| {
            let shown = resolve_selected(Some(entry.tags.as_slice()), candidate);
            (shown.name.clone(), editor.is_tag_selected(candidate))
        })
        .collect();
    render_choices(
        f,
        relations[0],
        "Tags",
        editor.tags(),
        tag_rows,
        focus == Focus::Tags,
        cursors.tags,
    );

    let blog_rows: Vec<(String, bool)> = editor
        .blogs()
        .as_slice()
        .iter()
        .map(|b| (b.title.clone(), entry.blog_id == Some(b.id)))
        .collect();
    render_choices(
        f,
        relations[1],
        "Blog",
        editor.blogs(),
        blog_rows,
        focus == Focus::Blog,
        cursors.blogs,
    );

    let category_rows: Vec<(String, bool)> = editor
        .categories()
        .as_slice()
        .iter()
        .map(|c| (c.name.clone(), entry.category_id == Some(c.id)))
        .collect();
    render_choices(
        f,
        relations[2],
        "Category",
        editor.categories(),
        category_rows,
        focus == Focus::Category,
        cursors.categories,
    );

    let mut footer = vec![
        Span::raw("Tab: next field, Space: toggle, "),
        Span::styled("Ctrl-S", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" save, "),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" cancel"),
    ];
    if editor.is_saving() {
        footer.push(Span::styled("  Saving...", Style::default().fg(Color::Green)));
    } else if editor.load_status() == LoadStatus::Loading {
        footer.push(Span::raw("  Loading..."));
    }
    if let Some(message) = status.clone().or_else(|| alerts.latest()) {
        footer.push(Span::styled(
            format!("  {}", message),
            Style::default().fg(Color::Red),
        ));
    }
    let controls = Paragraph::new(Line::from(footer))
        .style(Style::default().fg(Color::Yellow))
        .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(controls, chunks[5]);
}

fn render_choices<T>(
    f: &mut Frame,
    area: Rect,
    title: &str,
    candidates: &Candidates<T>,
    rows: Vec<(String, bool)>,
    focused: bool,
    cursor: usize,
) {
    let items: Vec<ListItem> = match candidates {
        Candidates::Uninitialized | Candidates::Loading => {
            vec![ListItem::new(Span::raw("loading..."))]
        }
        Candidates::Failed => vec![ListItem::new(Span::styled(
            "unavailable",
            Style::default().fg(Color::DarkGray),
        ))],
        Candidates::Ready(_) => rows
            .into_iter()
            .map(|(label, selected)| {
                ListItem::new(Line::from(Span::raw(format!(
                    "[{}] {}",
                    if selected { "x" } else { " " },
                    label
                ))))
            })
            .collect(),
    };

    let list = List::new(items)
        .block(block(title, focused))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let selected = candidates.get().filter(|_| focused).map(|_| cursor);
    f.render_stateful_widget(list, area, &mut ListState::default().with_selected(selected));
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
