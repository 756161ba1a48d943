// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod dispatch;

pub use dispatch::{
    DEFAULT_WIDTH, NO_DATA_MESSAGE, OutputFormat, RenderOptions, render, render_for_format,
    run_interactive,
};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use recnav_app::{
    DetailItem, FrameView, LoadJob, LoadOutcome, NavCommand, NavEffect, Navigator,
    StatusKind, abbreviate_id_columns, compute_column_widths, format_elapsed,
    truncate_with_ellipsis,
};
use std::io;
use std::ops::Range;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const SPINNER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
const PREVIEW_MIN_WIDTH: u16 = 90;
const DRILL_ARROW: &str = "↘";
const APP_TITLE: &str = "recnav";

#[derive(Debug)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Loaded(LoadOutcome),
}

#[derive(Debug, Clone, Default)]
struct ViewData {
    status_token: u64,
    tick: usize,
    max_width: usize,
}

/// Runs the interactive navigator until the user quits. `max_width` caps the
/// table width in columns; zero uses the full terminal.
///
/// The terminal is restored on every exit path, including input and draw
/// errors.
pub fn run_navigator(navigator: &mut Navigator, max_width: usize) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(error) = execute!(stdout, terminal::EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(error).context("enter alternate screen");
    }

    let result = Terminal::new(CrosstermBackend::new(stdout))
        .context("create terminal")
        .and_then(|mut terminal| run_loop(&mut terminal, navigator, max_width, read_input));
    let restored = restore_terminal();
    result.and(restored)
}

fn restore_terminal() -> Result<()> {
    let raw = disable_raw_mode().context("disable raw mode");
    let screen =
        execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen");
    raw.and(screen)
}

fn read_input(timeout: Duration) -> Result<Option<Event>> {
    if !event::poll(timeout).context("poll event")? {
        return Ok(None);
    }
    event::read().map(Some).context("read event")
}

/// Draw and input loop. `next_event` waits up to the given timeout and yields
/// `None` when nothing arrived.
fn run_loop<B, F>(
    terminal: &mut Terminal<B>,
    navigator: &mut Navigator,
    max_width: usize,
    mut next_event: F,
) -> Result<()>
where
    B: Backend,
    F: FnMut(Duration) -> Result<Option<Event>>,
{
    let mut view_data = ViewData {
        max_width,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Some(job) = navigator.init() {
        spawn_load_job(&internal_tx, job);
    }

    loop {
        process_internal_events(navigator, &mut view_data, &internal_tx, &internal_rx);

        terminal
            .draw(|frame| render_frame(frame, navigator, &view_data))
            .context("draw frame")?;

        if let Some(Event::Key(key)) = next_event(POLL_INTERVAL)?
            && handle_key_event(navigator, &mut view_data, &internal_tx, key)
        {
            return Ok(());
        }
        view_data.tick = view_data.tick.wrapping_add(1);
    }
}

fn spawn_load_job(internal_tx: &Sender<InternalEvent>, job: LoadJob) {
    let sender = internal_tx.clone();
    tracing::debug!(request = %job.request_id(), label = job.label(), "spawning load worker");
    thread::spawn(move || {
        let outcome = job.run();
        let _ = sender.send(InternalEvent::Loaded(outcome));
    });
}

fn process_internal_events(
    navigator: &mut Navigator,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        apply_internal_event(navigator, view_data, tx, event);
    }
}

fn apply_internal_event(
    navigator: &mut Navigator,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    event: InternalEvent,
) {
    match event {
        InternalEvent::ClearStatus { token } => navigator.clear_status_if(token),
        InternalEvent::Loaded(outcome) => {
            if navigator.apply(outcome) {
                schedule_status_clear_if_new(navigator, view_data, tx);
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Info statuses fade after a few seconds; errors stay until dismissed.
fn schedule_status_clear_if_new(
    navigator: &Navigator,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(status) = navigator.status() else {
        return;
    };
    if status.kind != StatusKind::Info || status.token == view_data.status_token {
        return;
    }
    view_data.status_token = status.token;
    schedule_status_clear(internal_tx, status.token);
}

fn handle_key_event(
    navigator: &mut Navigator,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    for command in commands_for_key(navigator, key) {
        match navigator.handle(command) {
            NavEffect::Quit => return true,
            NavEffect::Load(job) => spawn_load_job(internal_tx, job),
            NavEffect::None => {}
        }
    }
    schedule_status_clear_if_new(navigator, view_data, internal_tx);
    false
}

fn commands_for_key(navigator: &Navigator, key: KeyEvent) -> Vec<NavCommand> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return vec![NavCommand::Quit];
    }

    if navigator.search_query().is_some() {
        return match key.code {
            KeyCode::Esc => vec![NavCommand::SearchCancel],
            KeyCode::Enter => vec![NavCommand::SearchAccept],
            KeyCode::Backspace => vec![NavCommand::SearchBackspace],
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                vec![NavCommand::SearchInput(ch)]
            }
            _ => match movement_for_key(key) {
                Some(command) => vec![NavCommand::SearchCancel, command],
                None => Vec::new(),
            },
        };
    }

    if let Some(command) = movement_for_key(key) {
        return vec![command];
    }
    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('Q'), _) => NavCommand::Quit,
        (KeyCode::Char('?'), _) => NavCommand::ToggleHelp,
        (KeyCode::Char('/'), _) => NavCommand::StartSearch,
        (KeyCode::Enter, _) | (KeyCode::Right, _) | (KeyCode::Char('l'), KeyModifiers::NONE) => {
            NavCommand::Activate
        }
        (KeyCode::Esc, _) if !navigator.can_go_back() => NavCommand::Quit,
        (KeyCode::Esc, _)
        | (KeyCode::Backspace, _)
        | (KeyCode::Left, _)
        | (KeyCode::Char('h'), KeyModifiers::NONE) => NavCommand::Back,
        _ => return Vec::new(),
    };
    vec![command]
}

fn movement_for_key(key: KeyEvent) -> Option<NavCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(NavCommand::Down),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(NavCommand::Up),
        (KeyCode::Char('p'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(NavCommand::Up)
        }
        (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(NavCommand::PageDown)
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(NavCommand::PageUp)
        }
        (KeyCode::PageDown, _) => Some(NavCommand::PageDown),
        (KeyCode::PageUp, _) => Some(NavCommand::PageUp),
        (KeyCode::Home, _) | (KeyCode::Char('g'), KeyModifiers::NONE) => Some(NavCommand::Top),
        (KeyCode::End, _) | (KeyCode::Char('G'), _) => Some(NavCommand::Bottom),
        _ => None,
    }
}

fn render_frame(frame: &mut ratatui::Frame<'_>, navigator: &Navigator, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let breadcrumb = Paragraph::new(navigator.breadcrumb_text())
        .block(Block::default().title(APP_TITLE).borders(Borders::ALL));
    frame.render_widget(breadcrumb, layout[0]);

    render_body(frame, layout[1], navigator, view_data);

    let status_style = match navigator.status() {
        Some(status) if status.kind == StatusKind::Error => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Yellow),
    };
    let status_widget = Paragraph::new(status_text(navigator, view_data.tick))
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if navigator.help_visible() {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_body(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    navigator: &Navigator,
    view_data: &ViewData,
) {
    let Some(top) = navigator.top_frame() else {
        let title = if navigator.title().trim().is_empty() {
            navigator.breadcrumbs().first().cloned().unwrap_or_default()
        } else {
            navigator.title().to_owned()
        };
        let grid = Grid {
            title,
            headers: navigator.headers().to_vec(),
            rows: navigator.rows().to_vec(),
            cursor: navigator.cursor(),
            emphasized: Vec::new(),
        };
        render_with_preview(frame, area, &grid, navigator.preview(), view_data);
        return;
    };

    match &top.view {
        FrameView::Items(view) => {
            let grid = items_grid(&top.title, &view.items, view.cursor);
            render_grid(frame, area, &grid, view_data);
        }
        FrameView::Collection(view) => {
            let grid = Grid {
                title: top.title.clone(),
                headers: view.list.headers().to_vec(),
                rows: view.list.rows().to_vec(),
                cursor: view.cursor,
                emphasized: Vec::new(),
            };
            render_with_preview(frame, area, &grid, navigator.preview(), view_data);
        }
        FrameView::Text(view) => {
            let scroll = u16::try_from(view.scroll).unwrap_or(u16::MAX);
            let body = Paragraph::new(view.content.as_str())
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0))
                .block(Block::default().title(top.title.as_str()).borders(Borders::ALL));
            frame.render_widget(body, area);
        }
    }
}

/// Rows and headers as displayed, independent of where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Grid {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    cursor: usize,
    emphasized: Vec<bool>,
}

fn items_grid(title: &str, items: &[DetailItem], cursor: usize) -> Grid {
    let rows = items
        .iter()
        .map(|item| {
            let label = if item.has_loader() {
                format!("{} {DRILL_ARROW}", item.label)
            } else {
                item.label.clone()
            };
            vec![label, item.display_value()]
        })
        .collect();
    Grid {
        title: title.to_owned(),
        headers: vec!["FIELD".to_owned(), "VALUE".to_owned()],
        rows,
        cursor,
        emphasized: items.iter().map(DetailItem::has_loader).collect(),
    }
}

fn render_with_preview(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    grid: &Grid,
    preview: Option<String>,
    view_data: &ViewData,
) {
    let preview = preview.filter(|text| !text.trim().is_empty());
    let Some(preview) = preview.filter(|_| area.width >= PREVIEW_MIN_WIDTH) else {
        render_grid(frame, area, grid, view_data);
        return;
    };

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    render_grid(frame, panes[0], grid, view_data);
    let detail = Paragraph::new(preview)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("detail").borders(Borders::ALL));
    frame.render_widget(detail, panes[1]);
}

fn render_grid(frame: &mut ratatui::Frame<'_>, area: Rect, grid: &Grid, view_data: &ViewData) {
    let block = Block::default()
        .title(grid_title(grid))
        .borders(Borders::ALL);
    if grid.headers.is_empty() || grid.rows.is_empty() {
        frame.render_widget(Paragraph::new(NO_DATA_MESSAGE).block(block), area);
        return;
    }

    let rows = abbreviate_id_columns(&grid.headers, &grid.rows);
    let budget = table_budget(area.width, grid.headers.len(), view_data.max_width);
    let (widths, _) = compute_column_widths(&grid.headers, &rows, budget);

    let header = Row::new(grid.headers.iter().map(|header| {
        Cell::from(header.as_str()).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let window = visible_range(grid.cursor, rows.len(), usize::from(area.height.saturating_sub(3)));
    let body = window.map(|index| {
        let selected = index == grid.cursor;
        let emphasized = grid.emphasized.get(index).copied().unwrap_or(false);
        let cells = rows[index]
            .iter()
            .zip(&widths)
            .map(|(cell, width)| Cell::from(truncate_with_ellipsis(cell, *width)))
            .collect::<Vec<_>>();
        let mut style = Style::default();
        if emphasized {
            style = style.fg(Color::Cyan);
        }
        if selected {
            style = Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD);
        }
        Row::new(cells).style(style)
    });

    let constraints = widths
        .iter()
        .map(|width| Constraint::Length(u16::try_from(*width).unwrap_or(u16::MAX)));
    let table = Table::new(body, constraints)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn grid_title(grid: &Grid) -> String {
    let total = grid.rows.len();
    if total == 0 {
        return grid.title.clone();
    }
    format!("{} ({}/{total})", grid.title, grid.cursor.min(total - 1) + 1)
}

/// Columns available to cells once borders and inter-column gaps are paid
/// for, capped by `max_width` when it is set.
fn table_budget(area_width: u16, columns: usize, max_width: usize) -> usize {
    let inner = usize::from(area_width.saturating_sub(2));
    let budget = inner.saturating_sub(columns.saturating_sub(1));
    if max_width > 0 {
        budget.min(max_width)
    } else {
        budget
    }
}

/// Rows to draw so that `cursor` stays on screen.
fn visible_range(cursor: usize, len: usize, height: usize) -> Range<usize> {
    if len == 0 || height == 0 {
        return 0..0;
    }
    let cursor = cursor.min(len - 1);
    let start = (cursor + 1).saturating_sub(height);
    start..(start + height).min(len)
}

fn status_text(navigator: &Navigator, tick: usize) -> String {
    let hints = "enter open | esc back | / search | ? help | q quit";
    if let Some(query) = navigator.search_query() {
        return format!("/{query} | enter open | esc cancel");
    }
    if let Some(pending) = navigator.pending() {
        let spinner = SPINNER_FRAMES[tick % SPINNER_FRAMES.len()];
        return format!(
            "{spinner} {} {} | esc cancel",
            pending.message(),
            format_elapsed(pending.started.elapsed())
        );
    }
    match navigator.status() {
        Some(status) if status.kind == StatusKind::Error => {
            format!("{} | esc dismiss", status.message)
        }
        Some(status) => format!("{} | {hints}", status.message),
        None => hints.to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "up/down j/k      : navigate lists\n\
pgup/pgdn ctrl+u/d : page\n\
g/G home/end      : first/last row\n\
enter l right     : open row or field, show value\n\
/<text>           : jump to matching row\n\
esc backspace h   : go to parent, cancel loading\n\
?                 : toggle this help\n\
q ctrl+c          : quit"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
