use crate::model::{ItemId, TodoList};
use crate::storage::{save_config, save_list, Config};
use crate::sync::{EntryKey, ListView, Outcome, SyncError};
use crate::tracker::{self, lock, Geometry, PositionTracker, SharedConfig, SharedGeometry};
use crate::widgets::{
    control_name, Control, FieldValue, Row, StyleContext, DONE_CLASS, EDITING_CLASS,
};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_WIDTH: i32 = 60;
pub const DEFAULT_HEIGHT: i32 = 20;
const MIN_WIDTH: i32 = 30;
const MIN_HEIGHT: i32 = 10;

pub struct Paths {
    pub config: PathBuf,
    pub list: PathBuf,
}

/// Runs the window until it is closed, then writes config and list back.
pub fn run(config: Config, list: TodoList, paths: Paths) -> Result<()> {
    let title = config.current_list.clone();
    let window: SharedGeometry = Arc::new(Mutex::new(initial_geometry(&config)));
    let config: SharedConfig = Arc::new(Mutex::new(config));
    let mut position = PositionTracker::start(Arc::clone(&window), Arc::clone(&config))?;

    let (cols, rows) = crossterm::terminal::size()?;
    let mut app = App::new(list, Arc::clone(&window), (cols, rows), title)?;
    let mut terminal = setup_terminal()?;
    let result = app.event_loop(&mut terminal);

    let saved = shut_down(&mut position, &window, &config, &paths, app.view.model());
    let restored = teardown_terminal(&mut terminal);
    first_failure([
        ("event loop", result),
        ("save on close", saved),
        ("terminal restore", restored),
    ])
}

/// Stops the tracker, records the closing geometry and writes both files.
fn shut_down(
    position: &mut PositionTracker,
    window: &SharedGeometry,
    config: &SharedConfig,
    paths: &Paths,
    list: &TodoList,
) -> Result<()> {
    position.stop();
    tracker::sample(window, config);
    let config = lock(config);
    save_all(paths, &config, list)
}

/// Writes the config and the list. Both are attempted even if one fails.
fn save_all(paths: &Paths, config: &Config, list: &TodoList) -> Result<()> {
    let config_saved = save_config(&paths.config, config);
    if let Err(err) = &config_saved {
        tracing::warn!("config not saved: {:#}", err);
    }
    let list_saved = save_list(&paths.list, &list.todos());
    if list_saved.is_ok() {
        tracing::info!(items = list.len(), "saved list on close");
    }
    config_saved.and(list_saved)
}

/// Returns the first failed step; later failures are only logged.
fn first_failure<const N: usize>(steps: [(&str, Result<()>); N]) -> Result<()> {
    let mut first = Ok(());
    for (step, outcome) in steps {
        if let Err(err) = outcome {
            if first.is_ok() {
                first = Err(err.context(format!("{} failed", step)));
            } else {
                tracing::warn!("{} failed: {:#}", step, err);
            }
        }
    }
    first
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Focus {
    List,
    Add,
}

struct App {
    view: ListView,
    title: String,
    window: SharedGeometry,
    screen: (u16, u16),
    focus: Focus,
    add_entry: FieldValue,
    selected: usize,
    control: Control,
    scroll_offset: usize,
    status: String,
    closing: bool,
}

impl App {
    fn new(
        list: TodoList,
        window: SharedGeometry,
        screen: (u16, u16),
        title: String,
    ) -> Result<Self> {
        let mut view = ListView::new(list);
        view.build_all()?;
        let status = format!("{} item(s)", view.model().len());
        Ok(App {
            view,
            title,
            window,
            screen,
            focus: Focus::List,
            add_entry: FieldValue::default(),
            selected: 0,
            control: Control::Check,
            scroll_offset: 0,
            status,
            closing: false,
        })
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut dirty = true;
        loop {
            let requested = self.view.list_box_mut().take_redraw();
            if dirty || requested {
                terminal.draw(|f| self.draw(f))?;
                dirty = false;
            }
            if self.closing {
                break;
            }
            if event::poll(Duration::from_millis(200))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                        dirty = true;
                    }
                    Event::Resize(cols, rows) => {
                        self.resize_screen(cols, rows);
                        dirty = true;
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                self.close();
                return;
            }
            if self.move_window(key.code) {
                return;
            }
        }
        if key.modifiers.contains(KeyModifiers::SHIFT) && self.resize_window(key.code) {
            return;
        }
        match self.focus {
            Focus::Add => self.handle_add_key(key),
            Focus::List => match self.view.editing() {
                Some(id) => self.handle_edit_key(&id, key),
                None => self.handle_list_key(key),
            },
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.close(),
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.view.list_box().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => self.control = self.control.prev(),
            KeyCode::Right | KeyCode::Char('l') => self.control = self.control.next(),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(self.control),
            KeyCode::Char('d') | KeyCode::Delete => self.activate(Control::Delete),
            KeyCode::Char('e') => self.activate(Control::Edit),
            KeyCode::Char('x') => self.activate(Control::Check),
            KeyCode::Char('a') | KeyCode::Char('i') | KeyCode::Tab => {
                self.focus = Focus::Add;
                self.status = "Type a new thing to do, Enter to add".into();
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, id: &ItemId, key: KeyEvent) {
        let Some(entry_key) = entry_key_for(key) else {
            return;
        };
        let result = self
            .view
            .entry_key(&control_name(Control::Entry, id), entry_key);
        self.report(result);
    }

    fn handle_add_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let result = self.view.add(&mut self.add_entry);
                if let Ok(Outcome::Added { index }) = &result {
                    self.selected = *index;
                }
                self.report(result);
            }
            KeyCode::Esc | KeyCode::Tab => {
                self.focus = Focus::List;
                self.status.clear();
            }
            KeyCode::Backspace => self.add_entry.backspace(),
            KeyCode::Delete => self.add_entry.delete(),
            KeyCode::Left => self.add_entry.move_left(),
            KeyCode::Right => self.add_entry.move_right(),
            KeyCode::Home => self.add_entry.home(),
            KeyCode::End => self.add_entry.end(),
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    self.add_entry.insert_char(c);
                }
            }
            _ => {}
        }
    }

    fn activate(&mut self, control: Control) {
        let name = match self.view.list_box().row_at(self.selected) {
            Some(row) => row.control_name(control),
            None => {
                self.status = "Nothing selected".into();
                return;
            }
        };
        let result = self.view.activate(&name);
        self.selected = self
            .selected
            .min(self.view.list_box().len().saturating_sub(1));
        self.report(result);
    }

    fn report(&mut self, result: Result<Outcome, SyncError>) {
        match result {
            Ok(Outcome::Added { index }) => self.status = format!("Added item {}", index),
            Ok(Outcome::Deleted(todo)) => self.status = format!("Deleted \"{}\"", todo.text),
            Ok(Outcome::EditStarted) => {
                self.status = "Editing (Enter to keep, Esc to cancel)".into()
            }
            Ok(Outcome::Toggled { done }) => {
                self.status = if done {
                    "Marked as done".into()
                } else {
                    "Marked as not done".into()
                }
            }
            Ok(Outcome::Committed) => self.status = "Text updated".into(),
            Ok(Outcome::Canceled) => self.status = "Edit canceled".into(),
            Ok(Outcome::Typed) | Ok(Outcome::Ignored) => {}
            Err(err) => {
                tracing::warn!(error = %err, "interaction failed");
                self.status = format!("Error: {}", err);
            }
        }
    }

    fn close(&mut self) {
        tracing::info!("window closed");
        self.closing = true;
    }

    fn move_window(&mut self, code: KeyCode) -> bool {
        let (dx, dy) = match code {
            KeyCode::Left => (-1, 0),
            KeyCode::Right => (1, 0),
            KeyCode::Up => (0, -1),
            KeyCode::Down => (0, 1),
            _ => return false,
        };
        let mut window = lock(&self.window);
        let mut moved = clamp_geometry(*window, self.screen);
        moved.left += dx;
        moved.top += dy;
        *window = clamp_geometry(moved, self.screen);
        true
    }

    fn resize_window(&mut self, code: KeyCode) -> bool {
        let (dw, dh) = match code {
            KeyCode::Left => (-1, 0),
            KeyCode::Right => (1, 0),
            KeyCode::Up => (0, -1),
            KeyCode::Down => (0, 1),
            _ => return false,
        };
        let mut window = lock(&self.window);
        let mut resized = clamp_geometry(*window, self.screen);
        resized.width += dw;
        resized.height += dh;
        *window = clamp_geometry(resized, self.screen);
        true
    }

    fn resize_screen(&mut self, cols: u16, rows: u16) {
        self.screen = (cols, rows);
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let geometry = *lock(&self.window);
        let area = window_rect(geometry, f.size());
        if area.width < 3 || area.height < 3 {
            return;
        }

        let block = Block::default()
            .title(Span::styled(
                self.title.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        f.render_widget(Clear, area);
        f.render_widget(block, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(inner);

        let label = Paragraph::new(format!("ToDo List : {}", self.title))
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::BOLD));
        f.render_widget(label, layout[0]);
        self.draw_list(f, layout[1]);
        self.draw_add_entry(f, layout[2]);
        self.draw_footer(f, layout[3]);
    }

    fn draw_list(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = self.view.list_box().rows();
        if rows.is_empty() {
            let empty = Paragraph::new("Nothing to do")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, area);
            return;
        }
        self.selected = self.selected.min(rows.len() - 1);
        let list_focused = self.focus == Focus::List;
        let items = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let focused = (list_focused && idx == self.selected).then_some(self.control);
                row_item(row, focused)
            })
            .collect::<Vec<_>>();

        let viewport = area.height as usize;
        self.scroll_offset =
            adjust_offset(self.selected, self.scroll_offset, viewport, 1, items.len());
        let mut state = ListState::default();
        *state.offset_mut() = self.scroll_offset;
        f.render_stateful_widget(List::new(items), area, &mut state);
    }

    fn draw_add_entry(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Add;
        let text = if focused {
            self.add_entry.with_caret()
        } else {
            self.add_entry.value().to_string()
        };
        let accent = if focused { Color::LightGreen } else { Color::DarkGray };
        let entry = Paragraph::new(text).block(
            Block::default()
                .title("Add new thing to do")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent)),
        );
        f.render_widget(entry, area);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            self.footer_help_line(),
            Line::from(vec![
                Span::raw(self.status.clone()),
                Span::raw("  "),
                Span::styled(
                    self.focused_tooltip().unwrap_or_default(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
        ];
        let footer = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(footer, area);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let spans = match (self.focus, self.view.editing().is_some()) {
            (Focus::Add, _) => vec![
                Span::styled("Enter", Style::default().fg(Color::LightGreen)),
                Span::raw(" add  "),
                Span::styled("Esc/Tab", Style::default().fg(Color::LightCyan)),
                Span::raw(" back to list"),
            ],
            (Focus::List, true) => vec![
                Span::styled("Enter", Style::default().fg(Color::LightGreen)),
                Span::raw(" keep  "),
                Span::styled("Esc", Style::default().fg(Color::LightRed)),
                Span::raw(" cancel"),
            ],
            (Focus::List, false) => vec![
                Span::styled("↑↓←→", Style::default().fg(Color::LightCyan)),
                Span::raw(" move  "),
                Span::styled("x", Style::default().fg(Color::LightGreen)),
                Span::raw(" check  "),
                Span::styled("e", Style::default().fg(Color::LightYellow)),
                Span::raw(" edit  "),
                Span::styled("d", Style::default().fg(Color::LightRed)),
                Span::raw(" delete  "),
                Span::styled("a", Style::default().fg(Color::LightMagenta)),
                Span::raw(" add  "),
                Span::styled("q", Style::default().fg(Color::LightRed)),
                Span::raw(" quit"),
            ],
        };
        Line::from(spans)
    }

    fn focused_tooltip(&self) -> Option<&'static str> {
        if self.focus != Focus::List {
            return None;
        }
        let row = self.view.list_box().row_at(self.selected)?;
        match self.control {
            Control::Delete => Some(row.delete.tooltip),
            Control::Edit => Some(row.edit.tooltip),
            Control::Check => Some(row.check.tooltip),
            Control::Entry => None,
        }
    }
}

fn row_item(row: &Row, focused: Option<Control>) -> ListItem<'static> {
    let entry = row.entry.borrow();
    let control_style = |control: Control, color: Color| {
        let style = Style::default().fg(color);
        if focused == Some(control) {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    };
    let check = if row.check.active { "[x]" } else { "[ ]" };
    let text = if entry.editable {
        entry.field.with_caret()
    } else {
        entry.text().to_string()
    };
    let mut text_style = entry_style(&entry.style);
    if focused == Some(Control::Entry) && !entry.editable {
        text_style = text_style.add_modifier(Modifier::REVERSED);
    }
    let spans = vec![
        Span::styled(
            format!("[{}]", row.delete.label),
            control_style(Control::Delete, Color::LightRed),
        ),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", row.edit.label),
            control_style(Control::Edit, Color::LightYellow),
        ),
        Span::raw(" "),
        Span::styled(check, control_style(Control::Check, Color::LightGreen)),
        Span::raw(" "),
        Span::styled(text, text_style),
    ];
    let mut item = ListItem::new(Line::from(spans));
    if focused.is_some() {
        item = item.style(Style::default().bg(Color::Rgb(30, 34, 42)));
    }
    item
}

/// Text style derived from an entry's classes.
fn entry_style(style: &StyleContext) -> Style {
    if style.has_class(EDITING_CLASS) {
        return Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED);
    }
    if style.has_class(DONE_CLASS) {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }
}

fn entry_key_for(key: KeyEvent) -> Option<EntryKey> {
    let entry_key = match key.code {
        KeyCode::Enter => EntryKey::Enter,
        KeyCode::Esc => EntryKey::Escape,
        KeyCode::Backspace => EntryKey::Backspace,
        KeyCode::Delete => EntryKey::Delete,
        KeyCode::Left => EntryKey::Left,
        KeyCode::Right => EntryKey::Right,
        KeyCode::Home => EntryKey::Home,
        KeyCode::End => EntryKey::End,
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            EntryKey::Char(c)
        }
        _ => return None,
    };
    Some(entry_key)
}

/// Saved geometry with the default size filled in where none was saved.
fn initial_geometry(config: &Config) -> Geometry {
    Geometry {
        left: config.left,
        top: config.top,
        width: if config.width == 0 {
            DEFAULT_WIDTH
        } else {
            config.width
        },
        height: if config.height == 0 {
            DEFAULT_HEIGHT
        } else {
            config.height
        },
    }
}

/// Keeps the window on screen and no smaller than the minimum size the
/// screen allows.
fn clamp_geometry(geometry: Geometry, (cols, rows): (u16, u16)) -> Geometry {
    let cols = i32::from(cols);
    let rows = i32::from(rows);
    let width = geometry.width.max(MIN_WIDTH).min(cols);
    let height = geometry.height.max(MIN_HEIGHT).min(rows);
    Geometry {
        left: geometry.left.min(cols - width).max(0),
        top: geometry.top.min(rows - height).max(0),
        width,
        height,
    }
}

/// Where the window is drawn. The stored geometry is left as is, so a
/// window saved on a larger terminal comes back once there is room.
fn window_rect(geometry: Geometry, screen: Rect) -> Rect {
    let shown = clamp_geometry(geometry, (screen.width, screen.height));
    let to_cells = |v: i32| u16::try_from(v.max(0)).unwrap_or(u16::MAX);
    Rect::new(
        to_cells(shown.left),
        to_cells(shown.top),
        to_cells(shown.width),
        to_cells(shown.height),
    )
    .intersection(screen)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut out = stdout();
    let entered = match execute!(out, EnterAlternateScreen) {
        Ok(()) => Terminal::new(CrosstermBackend::new(out)),
        Err(err) => Err(err),
    };
    match entered {
        Ok(terminal) => Ok(terminal),
        Err(err) => {
            let _ = execute!(stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
            Err(err.into())
        }
    }
}

/// Restores the terminal, attempting every step even if an earlier one fails.
fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let cursor = terminal.show_cursor();
    raw.and(screen).and(cursor)?;
    Ok(())
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}
