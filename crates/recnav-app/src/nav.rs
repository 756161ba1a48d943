// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::cache::DetailCache;
use crate::child::{
    ChildView, ChildViewMode, DetailContextProvider, DetailRenderer, LoadContext, RowLoader,
};
use crate::detail::{
    DetailItem, NO_DATA, enrich_detail_items, parse_detail_content, render_record_detail,
    reorder_detail_items, sanitize_preview,
};
use crate::error::NavError;
use crate::header::{normalize_header_key, title_from_label};
use crate::layout::{abbreviate_value, is_id_header};
use crate::record::{Record, RecordRef};
use crate::registry::ChildLoaderRegistry;
use crate::search::find_match_index;
use anyhow::Result;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rows moved by page up / page down.
pub const PAGE_ROWS: usize = 10;

const DEFAULT_ROOT_LABEL: &str = "Items";
const ID_LABEL_LIMIT: usize = 12;
const PRIORITY_COLUMNS: [&str; 4] = ["name", "title", "display name", "slug"];
const CHILD_PRIORITY_COLUMNS: [&str; 1] = ["version"];

#[derive(Clone, Default)]
pub struct NavConfig {
    pub title: String,
    pub root_label: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub parent_type: String,
    pub row_loader: Option<RowLoader>,
    pub detail_renderer: Option<DetailRenderer>,
    pub detail_context: Option<DetailContextProvider>,
    pub initial_row: Option<usize>,
    pub open_initial: bool,
    pub load_context: LoadContext,
    pub registry: Arc<ChildLoaderRegistry>,
}

impl NavConfig {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    pub fn with_row_loader(
        mut self,
        loader: impl Fn(usize) -> Result<ChildView> + Send + Sync + 'static,
    ) -> Self {
        self.row_loader = Some(Arc::new(loader));
        self
    }

    pub fn with_detail_renderer(
        mut self,
        render: impl Fn(usize) -> String + Send + Sync + 'static,
    ) -> Self {
        self.detail_renderer = Some(Arc::new(render));
        self
    }

    pub fn with_detail_context(
        mut self,
        parent_type: impl Into<String>,
        context: impl Fn(usize) -> Option<RecordRef> + Send + Sync + 'static,
    ) -> Self {
        self.parent_type = parent_type.into();
        self.detail_context = Some(Arc::new(context));
        self
    }

    pub fn with_initial_row(mut self, row: usize, open: bool) -> Self {
        self.initial_row = Some(row);
        self.open_initial = open;
        self
    }

    pub fn with_load_context(mut self, context: LoadContext) -> Self {
        self.load_context = context;
        self
    }

    pub fn with_registry(mut self, registry: Arc<ChildLoaderRegistry>) -> Self {
        self.registry = registry;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

pub enum LoadPayload {
    View(ChildView),
    Record(RecordRef),
}

impl fmt::Debug for LoadPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View(view) => f.debug_tuple("View").field(view).finish(),
            Self::Record(record) => f.debug_tuple("Record").field(&record.record_id()).finish(),
        }
    }
}

type LoadTask = Box<dyn FnOnce() -> Result<LoadPayload> + Send>;

/// A blocking loader call waiting to be run off the event loop.
pub struct LoadJob {
    request_id: RequestId,
    label: String,
    task: LoadTask,
}

impl LoadJob {
    fn new(
        request_id: RequestId,
        label: String,
        task: impl FnOnce() -> Result<LoadPayload> + Send + 'static,
    ) -> Self {
        Self {
            request_id,
            label,
            task: Box::new(task),
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runs the loader. A panicking loader is reported as a failed load.
    pub fn run(self) -> LoadOutcome {
        let Self {
            request_id, task, ..
        } = self;
        let result = match panic::catch_unwind(AssertUnwindSafe(task)) {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!("loader panicked")),
        };
        LoadOutcome { request_id, result }
    }
}

impl fmt::Debug for LoadJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadJob")
            .field("request_id", &self.request_id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub request_id: RequestId,
    pub result: Result<LoadPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadTarget {
    RootRow { index: usize },
    Field { frame_id: u64, item: usize },
    RowDetail { frame_id: u64, row: usize, record_id: String },
}

#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: RequestId,
    pub label: String,
    pub started: Instant,
    generation: u64,
    target: LoadTarget,
}

impl PendingRequest {
    pub fn message(&self) -> String {
        format!("Loading {}...", self.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub message: String,
    pub token: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
    Activate,
    Back,
    Quit,
    ToggleHelp,
    StartSearch,
    SearchInput(char),
    SearchBackspace,
    SearchAccept,
    SearchCancel,
}

#[derive(Debug)]
pub enum NavEffect {
    None,
    Load(LoadJob),
    Quit,
}

/// A list opened from a row or field, with the details fetched for its rows.
pub struct ChildList {
    view: ChildView,
    cache: DetailCache,
}

impl ChildList {
    pub fn new(view: ChildView) -> Self {
        Self {
            view,
            cache: DetailCache::new(),
        }
    }

    pub fn view(&self) -> &ChildView {
        &self.view
    }

    pub fn headers(&self) -> &[String] {
        &self.view.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.view.rows
    }

    pub fn parent_type(&self) -> &str {
        &self.view.parent_type
    }

    pub fn cache(&self) -> &DetailCache {
        &self.cache
    }

    pub fn label_for_index(&self, index: usize) -> String {
        row_label(
            &self.view.headers,
            self.view.rows.get(index),
            index,
            &CHILD_PRIORITY_COLUMNS,
        )
    }

    pub fn context(&self, index: usize) -> Option<RecordRef> {
        self.view.context(index)
    }

    /// Full record fetched earlier for this row, if any.
    pub fn cached_detail(&self, index: usize) -> Option<RecordRef> {
        let id = self.context(index)?.record_id()?;
        self.cache.get(&id)
    }

    /// Detail text and the record it describes, preferring a cached fetch.
    pub fn detail(&self, index: usize) -> Option<(String, Option<RecordRef>)> {
        if let Some(record) = self.cached_detail(index) {
            return Some((render_record_detail(record.as_ref()), Some(record)));
        }
        let raw = self.view.render_detail(index)?;
        Some((raw, self.context(index)))
    }
}

pub struct ItemsView {
    pub items: Vec<DetailItem>,
    pub cursor: usize,
}

pub struct CollectionView {
    pub list: ChildList,
    pub cursor: usize,
}

pub struct TextView {
    pub content: String,
    pub scroll: usize,
}

pub enum FrameView {
    Items(ItemsView),
    Collection(CollectionView),
    Text(TextView),
}

/// One level of drill-down above the root table.
pub struct Frame {
    id: u64,
    pub title: String,
    pub parent: Option<RecordRef>,
    pub parent_type: String,
    pub view: FrameView,
}

impl Frame {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn items(&self) -> Option<&[DetailItem]> {
        match &self.view {
            FrameView::Items(view) => Some(&view.items),
            _ => None,
        }
    }

    pub fn list(&self) -> Option<&ChildList> {
        match &self.view {
            FrameView::Collection(view) => Some(&view.list),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.view {
            FrameView::Text(view) => Some(&view.content),
            _ => None,
        }
    }

    pub fn cursor(&self) -> usize {
        match &self.view {
            FrameView::Items(view) => view.cursor,
            FrameView::Collection(view) => view.cursor,
            FrameView::Text(view) => view.scroll,
        }
    }

    fn len(&self) -> usize {
        match &self.view {
            FrameView::Items(view) => view.items.len(),
            FrameView::Collection(view) => view.list.rows().len(),
            FrameView::Text(view) => view.content.lines().count(),
        }
    }

    fn set_cursor(&mut self, cursor: usize) {
        match &mut self.view {
            FrameView::Items(view) => view.cursor = cursor,
            FrameView::Collection(view) => view.cursor = cursor,
            FrameView::Text(view) => view.scroll = cursor,
        }
    }
}

/// What Enter does for the current selection, worked out before any
/// mutation so the frame stack is not borrowed while it changes.
enum Activation {
    Nothing,
    RootLoad(RowLoader, usize),
    RootDetail(usize),
    FieldLoad {
        frame_id: u64,
        item: usize,
        label: String,
        loader: crate::child::ChildLoader,
        parent: Option<RecordRef>,
    },
    ShowValue(String),
    RowFetch {
        frame_id: u64,
        row: usize,
        label: String,
        record_id: String,
        summary: RecordRef,
        fetcher: crate::child::DetailFetcher,
    },
    RowDetail(usize),
}

/// Navigation state for one interactive session: the root table, the stack
/// of opened frames, breadcrumbs, the single in-flight load and the status
/// line. Input arrives as [`NavCommand`]s; loads leave as [`LoadJob`]s and
/// come back through [`Navigator::apply`].
pub struct Navigator {
    config: NavConfig,
    cursor: usize,
    frames: Vec<Frame>,
    breadcrumbs: Vec<String>,
    pending: Option<PendingRequest>,
    generation: u64,
    next_request_id: u64,
    next_frame_id: u64,
    status: Option<StatusLine>,
    next_status_token: u64,
    help_visible: bool,
    search: Option<String>,
    initial_job: Option<LoadJob>,
    quit: bool,
}

impl Navigator {
    pub fn new(config: NavConfig) -> Self {
        let root_label = [config.root_label.trim(), config.title.trim()]
            .into_iter()
            .find(|label| !label.is_empty())
            .unwrap_or(DEFAULT_ROOT_LABEL)
            .to_owned();

        let mut navigator = Self {
            config,
            cursor: 0,
            frames: Vec::new(),
            breadcrumbs: vec![root_label],
            pending: None,
            generation: 0,
            next_request_id: 0,
            next_frame_id: 0,
            status: None,
            next_status_token: 0,
            help_visible: false,
            search: None,
            initial_job: None,
            quit: false,
        };

        if let Some(row) = navigator.config.initial_row
            && row < navigator.config.rows.len()
        {
            navigator.cursor = row;
            if navigator.config.open_initial
                && let Some(loader) = navigator.config.row_loader.clone()
            {
                navigator.initial_job = Some(navigator.load_root_row(loader, row));
            }
        }

        navigator
    }

    /// The auto-open job requested by the configuration. Yields it once.
    pub fn init(&mut self) -> Option<LoadJob> {
        self.initial_job.take()
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn headers(&self) -> &[String] {
        &self.config.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.config.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn top_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn breadcrumbs(&self) -> &[String] {
        &self.breadcrumbs
    }

    pub fn breadcrumb_text(&self) -> String {
        self.breadcrumbs
            .iter()
            .map(|segment| quote_breadcrumb_segment(segment))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(" > ")
    }

    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    /// Clears an info status if it is still the one identified by `token`.
    pub fn clear_status_if(&mut self, token: u64) {
        if self
            .status
            .as_ref()
            .is_some_and(|status| status.token == token && status.kind == StatusKind::Info)
        {
            self.status = None;
        }
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Whether Back has anything to undo: an overlay, a search, an error,
    /// an in-flight load or an open frame.
    pub fn can_go_back(&self) -> bool {
        self.help_visible
            || self.search.is_some()
            || self.pending.is_some()
            || !self.frames.is_empty()
            || self
                .status
                .as_ref()
                .is_some_and(|status| status.kind == StatusKind::Error)
    }

    pub fn row_label(&self, index: usize) -> String {
        row_label(&self.config.headers, self.config.rows.get(index), index, &[])
    }

    /// Moves the cursor of the active table to `index`.
    pub fn select(&mut self, index: usize) -> Result<(), NavError> {
        let len = self.active_len();
        if index >= len {
            return Err(NavError::IndexOutOfRange { index, len });
        }
        self.set_active_cursor(index);
        Ok(())
    }

    pub fn handle(&mut self, command: NavCommand) -> NavEffect {
        if self.quit {
            return NavEffect::Quit;
        }

        match command {
            NavCommand::Up => self.move_cursor(-1),
            NavCommand::Down => self.move_cursor(1),
            NavCommand::PageUp => self.move_cursor(-(PAGE_ROWS as isize)),
            NavCommand::PageDown => self.move_cursor(PAGE_ROWS as isize),
            NavCommand::Top => self.set_active_cursor(0),
            NavCommand::Bottom => {
                let last = self.active_len().saturating_sub(1);
                self.set_active_cursor(last);
            }
            NavCommand::Activate => return self.activate(),
            NavCommand::Back => self.back(),
            NavCommand::Quit => return self.quit(),
            NavCommand::ToggleHelp => self.help_visible = !self.help_visible,
            NavCommand::StartSearch => self.start_search(),
            NavCommand::SearchInput(ch) => {
                if let Some(query) = self.search.as_mut() {
                    query.push(ch);
                    self.apply_search();
                }
            }
            NavCommand::SearchBackspace => match self.search.as_mut() {
                Some(query) if query.is_empty() => self.search = None,
                Some(query) => {
                    query.pop();
                    self.apply_search();
                }
                None => {}
            },
            NavCommand::SearchAccept => {
                if self.search.take().is_some() {
                    return self.activate();
                }
            }
            NavCommand::SearchCancel => self.search = None,
        }
        NavEffect::None
    }

    /// Feeds a finished load back in. Returns whether it was applied; results
    /// for abandoned or superseded requests are dropped.
    pub fn apply(&mut self, outcome: LoadOutcome) -> bool {
        let current = self.pending.as_ref().is_some_and(|pending| {
            pending.id == outcome.request_id && pending.generation == self.generation
        });
        if !current {
            tracing::debug!(request = %outcome.request_id, "discarding stale load result");
            return false;
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };

        let elapsed = pending.started.elapsed();
        let payload = match outcome.result {
            Ok(payload) => payload,
            Err(error) => {
                self.fail_request(&pending, &error, elapsed);
                return true;
            }
        };

        tracing::debug!(
            request = %pending.id,
            label = %pending.label,
            elapsed_ms = elapsed.as_millis() as u64,
            "load finished"
        );

        match (pending.target, payload) {
            (LoadTarget::RootRow { index }, LoadPayload::View(view)) => {
                self.present_root_child(index, view);
            }
            (LoadTarget::Field { frame_id, item }, LoadPayload::View(view)) => {
                self.present_field_child(frame_id, item, &pending.label, view);
            }
            (
                LoadTarget::RowDetail {
                    frame_id,
                    row,
                    record_id,
                },
                LoadPayload::Record(record),
            ) => {
                let Some(frame) = self.frames.iter_mut().find(|frame| frame.id == frame_id) else {
                    return false;
                };
                if let FrameView::Collection(view) = &mut frame.view {
                    view.list.cache.insert(record_id, record);
                }
                self.open_row_detail(row);
            }
            (_, payload) => {
                tracing::warn!(request = %pending.id, ?payload, "load returned an unexpected payload");
                self.set_status(
                    StatusKind::Error,
                    format!("Unable to load {}: unexpected result", pending.label),
                );
                return true;
            }
        }
        self.set_status(
            StatusKind::Info,
            format!("{} loaded in {}", pending.label, format_elapsed(elapsed)),
        );
        true
    }

    /// Preview text for the selected row, without fields that only make
    /// sense when drilled into.
    pub fn preview(&self) -> Option<String> {
        match self.frames.last() {
            None => {
                let render = self.config.detail_renderer.as_ref()?;
                if self.cursor >= self.config.rows.len() {
                    return None;
                }
                let raw = render(self.cursor);
                let parent = self
                    .config
                    .detail_context
                    .as_ref()
                    .and_then(|context| context(self.cursor));
                Some(sanitize_preview(
                    &raw,
                    &self.config.parent_type,
                    parent.as_ref(),
                    &self.config.registry,
                ))
            }
            Some(Frame {
                view: FrameView::Collection(view),
                ..
            }) => {
                if view.cursor >= view.list.rows().len() {
                    return None;
                }
                let (raw, parent) = view.list.detail(view.cursor)?;
                Some(sanitize_preview(
                    &raw,
                    view.list.parent_type(),
                    parent.as_ref(),
                    &self.config.registry,
                ))
            }
            Some(_) => None,
        }
    }

    fn active_len(&self) -> usize {
        match self.frames.last() {
            Some(frame) => frame.len(),
            None => self.config.rows.len(),
        }
    }

    fn active_cursor(&self) -> usize {
        match self.frames.last() {
            Some(frame) => frame.cursor(),
            None => self.cursor,
        }
    }

    fn set_active_cursor(&mut self, cursor: usize) {
        let last = self.active_len().saturating_sub(1);
        let cursor = cursor.min(last);
        match self.frames.last_mut() {
            Some(frame) => frame.set_cursor(cursor),
            None => self.cursor = cursor,
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let current = self.active_cursor();
        let next = current.saturating_add_signed(delta);
        self.set_active_cursor(next);
    }

    fn activate(&mut self) -> NavEffect {
        if let Some(pending) = &self.pending {
            tracing::debug!(request = %pending.id, "ignoring open while a load is in flight");
            return NavEffect::None;
        }

        match self.activation() {
            Activation::Nothing => NavEffect::None,
            Activation::RootLoad(loader, index) => NavEffect::Load(self.load_root_row(loader, index)),
            Activation::RootDetail(index) => {
                self.open_root_detail(index);
                NavEffect::None
            }
            Activation::FieldLoad {
                frame_id,
                item,
                label,
                loader,
                parent,
            } => {
                let context = self.config.load_context.clone();
                let job = self.begin_request(
                    label,
                    LoadTarget::Field { frame_id, item },
                    move || loader(&context, parent).map(LoadPayload::View),
                );
                NavEffect::Load(job)
            }
            Activation::ShowValue(message) => {
                self.set_status(StatusKind::Info, message);
                NavEffect::None
            }
            Activation::RowFetch {
                frame_id,
                row,
                label,
                record_id,
                summary,
                fetcher,
            } => {
                let context = self.config.load_context.clone();
                let job = self.begin_request(
                    label,
                    LoadTarget::RowDetail {
                        frame_id,
                        row,
                        record_id,
                    },
                    move || fetcher(&context, summary).map(LoadPayload::Record),
                );
                NavEffect::Load(job)
            }
            Activation::RowDetail(row) => {
                self.open_row_detail(row);
                NavEffect::None
            }
        }
    }

    fn activation(&self) -> Activation {
        let Some(frame) = self.frames.last() else {
            if self.cursor >= self.config.rows.len() {
                return Activation::Nothing;
            }
            if let Some(loader) = &self.config.row_loader {
                return Activation::RootLoad(Arc::clone(loader), self.cursor);
            }
            if self.config.detail_renderer.is_some() {
                return Activation::RootDetail(self.cursor);
            }
            return Activation::Nothing;
        };

        match &frame.view {
            FrameView::Items(view) => {
                let Some(item) = view.items.get(view.cursor) else {
                    return Activation::Nothing;
                };
                match &item.loader {
                    Some(loader) => Activation::FieldLoad {
                        frame_id: frame.id,
                        item: view.cursor,
                        label: item.label.clone(),
                        loader: Arc::clone(loader),
                        parent: frame.parent.clone(),
                    },
                    None => {
                        let value = item.value.split_whitespace().collect::<Vec<_>>().join(" ");
                        if value.is_empty() {
                            Activation::ShowValue(format!("{}: (empty)", item.label))
                        } else {
                            Activation::ShowValue(format!("{}: {value}", item.label))
                        }
                    }
                }
            }
            FrameView::Collection(view) => {
                let row = view.cursor;
                if row >= view.list.rows().len() {
                    return Activation::Nothing;
                }
                if let Some(fetcher) = &view.list.view.detail_fetcher
                    && let Some(summary) = view.list.context(row)
                    && let Some(record_id) = summary.record_id()
                    && !view.list.cache.contains(&record_id)
                {
                    return Activation::RowFetch {
                        frame_id: frame.id,
                        row,
                        label: view.list.label_for_index(row),
                        record_id,
                        summary,
                        fetcher: Arc::clone(fetcher),
                    };
                }
                Activation::RowDetail(row)
            }
            FrameView::Text(_) => Activation::Nothing,
        }
    }

    fn load_root_row(&mut self, loader: RowLoader, index: usize) -> LoadJob {
        let label = self.row_label(index);
        self.cursor = index;
        self.begin_request(label, LoadTarget::RootRow { index }, move || {
            loader(index).map(LoadPayload::View)
        })
    }

    fn begin_request(
        &mut self,
        label: String,
        target: LoadTarget,
        task: impl FnOnce() -> Result<LoadPayload> + Send + 'static,
    ) -> LoadJob {
        self.next_request_id = self.next_request_id.saturating_add(1);
        let id = RequestId(self.next_request_id);
        let label = if label.trim().is_empty() {
            "request".to_owned()
        } else {
            label.trim().to_owned()
        };
        tracing::debug!(request = %id, label = %label, "dispatching load");
        self.pending = Some(PendingRequest {
            id,
            label: label.clone(),
            started: Instant::now(),
            generation: self.generation,
            target,
        });
        LoadJob::new(id, label, task)
    }

    fn fail_request(&mut self, pending: &PendingRequest, error: &anyhow::Error, elapsed: Duration) {
        let nav_error = NavError::load(&pending.label, error);
        tracing::warn!(request = %pending.id, error = %nav_error, "load failed");

        match &pending.target {
            LoadTarget::RootRow { .. } => {
                self.set_status(
                    StatusKind::Error,
                    format!("Unable to open: {error:#} (after {})", format_elapsed(elapsed)),
                );
            }
            LoadTarget::Field { frame_id, item } => {
                if let Some(Frame {
                    view: FrameView::Items(view),
                    ..
                }) = self.frames.iter_mut().find(|frame| frame.id == *frame_id)
                    && let Some(slot) = view.items.get_mut(*item)
                {
                    slot.value = format!("error: {error:#}");
                }
                self.set_status(
                    StatusKind::Error,
                    format!("Unable to load {}: {error:#}", pending.label),
                );
            }
            LoadTarget::RowDetail { .. } => {
                self.set_status(
                    StatusKind::Error,
                    format!("Unable to load {}: {error:#}", pending.label),
                );
            }
        }
    }

    fn present_root_child(&mut self, index: usize, view: ChildView) {
        let list = ChildList::new(view);
        let title = non_empty(&list.view.title).unwrap_or_else(|| self.row_label(index));
        let context_index = match list.view.mode {
            ChildViewMode::Detail => 0,
            ChildViewMode::List => index,
        };
        let parent = list.context(context_index).or_else(|| {
            self.config
                .detail_context
                .as_ref()
                .and_then(|context| context(index))
        });
        self.present_child(title, parent, list);
    }

    fn present_field_child(&mut self, frame_id: u64, item: usize, label: &str, view: ChildView) {
        let Some(owner) = self.frames.last().filter(|frame| frame.id == frame_id) else {
            tracing::debug!(label, "dropping child view for a frame that is gone");
            return;
        };
        let owner_parent = owner.parent.clone();
        let list = ChildList::new(view);
        let title = non_empty(&list.view.title).unwrap_or_else(|| {
            non_empty(&title_from_label(label)).unwrap_or_else(|| format!("Item {}", item + 1))
        });
        let parent = match list.view.mode {
            ChildViewMode::Detail => list.context(0).or(owner_parent),
            ChildViewMode::List => owner_parent,
        };
        self.present_child(title, parent, list);
    }

    fn present_child(&mut self, title: String, parent: Option<RecordRef>, list: ChildList) {
        let parent_type = list.view.parent_type.clone();
        match list.view.mode {
            ChildViewMode::Detail => {
                let raw = list.view.render_detail(0).unwrap_or_default();
                self.push_card(title, parent, parent_type, &raw);
            }
            ChildViewMode::List
                if list.view.rows.is_empty() && list.view.detail_renderer.is_some() =>
            {
                let content = list.view.render_detail(0).unwrap_or_default();
                self.push_frame(title, parent, parent_type, text_view(content));
            }
            ChildViewMode::List => {
                self.push_frame(
                    title,
                    parent,
                    parent_type,
                    FrameView::Collection(CollectionView { list, cursor: 0 }),
                );
            }
        }
    }

    fn open_root_detail(&mut self, index: usize) {
        let Some(render) = self.config.detail_renderer.clone() else {
            return;
        };
        let raw = render(index);
        let parent = self
            .config
            .detail_context
            .as_ref()
            .and_then(|context| context(index));
        let title = self.row_label(index);
        let parent_type = self.config.parent_type.clone();
        self.push_card(title, parent, parent_type, &raw);
    }

    fn open_row_detail(&mut self, row: usize) {
        let Some(Frame {
            view: FrameView::Collection(view),
            ..
        }) = self.frames.last()
        else {
            return;
        };
        let title = view.list.label_for_index(row);
        let parent_type = view.list.parent_type().to_owned();
        let Some((raw, parent)) = view.list.detail(row) else {
            self.set_status(StatusKind::Info, "No detail view for this row.".to_owned());
            return;
        };
        self.push_card(title, parent, parent_type, &raw);
    }

    /// Pushes a detail card built from rendered text. Text that does not
    /// parse into labelled items is shown as-is.
    fn push_card(&mut self, title: String, parent: Option<RecordRef>, parent_type: String, raw: &str) {
        let items = parse_detail_content(raw);
        if items.is_empty() {
            self.push_frame(title, parent, parent_type, text_view(raw.to_owned()));
            return;
        }
        let items = enrich_detail_items(items, &parent_type, parent.as_ref(), &self.config.registry);
        let items = reorder_detail_items(items);
        self.push_frame(
            title,
            parent,
            parent_type,
            FrameView::Items(ItemsView { items, cursor: 0 }),
        );
    }

    fn push_frame(
        &mut self,
        title: String,
        parent: Option<RecordRef>,
        parent_type: String,
        view: FrameView,
    ) {
        self.next_frame_id += 1;
        self.generation += 1;
        self.status = None;
        self.search = None;
        self.breadcrumbs.push(title.clone());
        self.frames.push(Frame {
            id: self.next_frame_id,
            title,
            parent,
            parent_type,
            view,
        });
    }

    fn back(&mut self) {
        if self.help_visible {
            self.help_visible = false;
            return;
        }
        if self.search.take().is_some() {
            return;
        }
        if self
            .status
            .as_ref()
            .is_some_and(|status| status.kind == StatusKind::Error)
        {
            self.status = None;
            return;
        }

        let abandoned = self.pending.take();
        if self.frames.pop().is_some() {
            self.breadcrumbs.pop();
            self.generation += 1;
            self.status = None;
        }
        if let Some(pending) = abandoned {
            tracing::debug!(request = %pending.id, "abandoning in-flight load");
            self.set_status(StatusKind::Info, format!("Cancelled loading {}", pending.label));
        }
    }

    fn quit(&mut self) -> NavEffect {
        self.frames.clear();
        self.breadcrumbs.truncate(1);
        self.pending = None;
        self.quit = true;
        NavEffect::Quit
    }

    fn start_search(&mut self) {
        if self
            .frames
            .last()
            .is_some_and(|frame| matches!(frame.view, FrameView::Text(_)))
        {
            self.set_status(StatusKind::Info, "Search is not available here.".to_owned());
            return;
        }
        self.search = Some(String::new());
    }

    fn apply_search(&mut self) {
        let Some(query) = self.search.clone() else {
            return;
        };
        let cursor = self.active_cursor();
        let found = match self.frames.last() {
            None => find_match_index(&query, cursor, self.config.rows.len(), |index| {
                self.row_label(index)
            }),
            Some(frame) => match &frame.view {
                FrameView::Items(view) => find_match_index(&query, cursor, view.items.len(), |index| {
                    view.items[index].label.clone()
                }),
                FrameView::Collection(view) => {
                    find_match_index(&query, cursor, view.list.rows().len(), |index| {
                        view.list.label_for_index(index)
                    })
                }
                FrameView::Text(_) => None,
            },
        };
        match found {
            Some(index) => {
                self.set_active_cursor(index);
                if self
                    .status
                    .as_ref()
                    .is_some_and(|status| status.kind == StatusKind::Info)
                {
                    self.status = None;
                }
            }
            None => self.set_status(StatusKind::Info, format!("No match for {query:?}")),
        }
    }

    fn set_status(&mut self, kind: StatusKind, message: String) {
        self.next_status_token = self.next_status_token.saturating_add(1);
        self.status = Some(StatusLine {
            kind,
            message,
            token: self.next_status_token,
        });
    }
}

fn text_view(content: String) -> FrameView {
    let content = if content.trim().is_empty() {
        NO_DATA.to_owned()
    } else {
        content
    };
    FrameView::Text(TextView { content, scroll: 0 })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Human label for a row: a name-like column if one has a value, then an
/// abbreviated ID, then the first non-empty cell.
fn row_label(headers: &[String], row: Option<&Vec<String>>, index: usize, extra: &[&str]) -> String {
    let fallback = || format!("Item {}", index + 1);
    let Some(row) = row else {
        return fallback();
    };
    let keys: Vec<String> = headers.iter().map(|header| normalize_header_key(header)).collect();
    let cell = |column: usize| {
        row.get(column)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    };

    for wanted in PRIORITY_COLUMNS.iter().chain(extra) {
        if let Some(column) = keys.iter().position(|key| key == wanted)
            && let Some(value) = cell(column)
        {
            return value.to_owned();
        }
    }
    for (column, key) in keys.iter().enumerate() {
        if key.contains("name")
            && let Some(value) = cell(column)
        {
            return value.to_owned();
        }
    }
    for (column, key) in keys.iter().enumerate() {
        if is_id_header(key)
            && let Some(value) = cell(column)
        {
            return abbreviate_value(value, ID_LABEL_LIMIT);
        }
    }

    row.iter()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map_or_else(fallback, str::to_owned)
}

fn quote_breadcrumb_segment(segment: &str) -> String {
    let trimmed = segment.trim();
    if trimmed.contains([' ', '>']) {
        format!("{trimmed:?}")
    } else {
        trimmed.to_owned()
    }
}

/// Compact elapsed time: `0.3s`, `5s`, `2min`, `2min 5s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let seconds = (millis + 500) / 1000;
    if seconds < 1 {
        let tenths = (millis + 50) / 100;
        return format!("{}.{}s", tenths / 10, tenths % 10);
    }
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    match seconds % 60 {
        0 => format!("{minutes}min"),
        remainder => format!("{minutes}min {remainder}s"),
    }
}
