// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::record::RecordRef;
use anyhow::Result;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Produces the text shown for row `index` of a list.
pub type DetailRenderer = Arc<dyn Fn(usize) -> String + Send + Sync>;

/// Produces the record behind row `index`, used as the parent of anything
/// opened from that row.
pub type DetailContextProvider = Arc<dyn Fn(usize) -> Option<RecordRef> + Send + Sync>;

/// Loads a child collection for a parent record. Runs on a worker thread.
pub type ChildLoader =
    Arc<dyn Fn(&LoadContext, Option<RecordRef>) -> Result<ChildView> + Send + Sync>;

/// Loads the child view for a row of the root table. Runs on a worker thread.
pub type RowLoader = Arc<dyn Fn(usize) -> Result<ChildView> + Send + Sync>;

/// Fetches the full record behind a list row's summary. Runs on a worker
/// thread; results are cached per list.
pub type DetailFetcher = Arc<dyn Fn(&LoadContext, RecordRef) -> Result<RecordRef> + Send + Sync>;

/// Boxes a closure as a [`ChildLoader`].
pub fn child_loader<F>(loader: F) -> ChildLoader
where
    F: Fn(&LoadContext, Option<RecordRef>) -> Result<ChildView> + Send + Sync + 'static,
{
    Arc::new(loader)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChildViewMode {
    #[default]
    List,
    Detail,
}

#[derive(Clone, Default)]
pub struct ChildView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub detail_renderer: Option<DetailRenderer>,
    pub title: String,
    pub parent_type: String,
    pub detail_context: Option<DetailContextProvider>,
    pub mode: ChildViewMode,
    pub detail_fetcher: Option<DetailFetcher>,
}

impl ChildView {
    pub fn list(title: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            title: title.into(),
            ..Self::default()
        }
    }

    /// A single-card view whose content comes from `render(0)`.
    pub fn detail(
        title: impl Into<String>,
        render: impl Fn(usize) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            title: title.into(),
            mode: ChildViewMode::Detail,
            detail_renderer: Some(Arc::new(render)),
            ..Self::default()
        }
    }

    pub fn with_detail_renderer(
        mut self,
        render: impl Fn(usize) -> String + Send + Sync + 'static,
    ) -> Self {
        self.detail_renderer = Some(Arc::new(render));
        self
    }

    pub fn with_context(
        mut self,
        parent_type: impl Into<String>,
        context: impl Fn(usize) -> Option<RecordRef> + Send + Sync + 'static,
    ) -> Self {
        self.parent_type = parent_type.into();
        self.detail_context = Some(Arc::new(context));
        self
    }

    pub fn with_detail_fetcher(
        mut self,
        fetch: impl Fn(&LoadContext, RecordRef) -> Result<RecordRef> + Send + Sync + 'static,
    ) -> Self {
        self.detail_fetcher = Some(Arc::new(fetch));
        self
    }

    pub fn render_detail(&self, index: usize) -> Option<String> {
        self.detail_renderer.as_ref().map(|render| render(index))
    }

    pub fn context(&self, index: usize) -> Option<RecordRef> {
        self.detail_context.as_ref().and_then(|context| context(index))
    }
}

impl fmt::Debug for ChildView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildView")
            .field("title", &self.title)
            .field("parent_type", &self.parent_type)
            .field("mode", &self.mode)
            .field("headers", &self.headers)
            .field("rows", &self.rows.len())
            .field("detail_renderer", &self.detail_renderer.is_some())
            .field("detail_context", &self.detail_context.is_some())
            .field("detail_fetcher", &self.detail_fetcher.is_some())
            .finish()
    }
}

/// Opaque state handed to every loader: the active profile and whatever
/// client handle the resource modules stored at start-up.
#[derive(Clone, Default)]
pub struct LoadContext {
    profile: Option<String>,
    handle: Option<Arc<dyn Any + Send + Sync>>,
}

impl LoadContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_handle<T: Any + Send + Sync>(mut self, handle: Arc<T>) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn handle<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.handle.clone()?.downcast::<T>().ok()
    }
}

impl fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadContext")
            .field("profile", &self.profile)
            .field("handle", &self.handle.is_some())
            .finish()
    }
}
