// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::catalog::Catalog;
use anyhow::{Context, Result, bail};
use recnav_app::{
    ChildLoaderRegistry, ChildView, LoadContext, Record, RecordRef, normalize_header_key,
    record_from_serialize, render_record_detail, table_from_records,
};
use recnav_tui::{OutputFormat, RenderOptions, render_for_format};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

/// Top-level collections reachable from the home table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Apis,
    ControlPlanes,
    Portals,
}

impl Resource {
    pub const ALL: [Self; 3] = [Self::Apis, Self::ControlPlanes, Self::Portals];

    pub fn name(self) -> &'static str {
        match self {
            Self::Apis => "apis",
            Self::ControlPlanes => "control-planes",
            Self::Portals => "portals",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Apis => "APIs",
            Self::ControlPlanes => "Control Planes",
            Self::Portals => "Portals",
        }
    }

    pub fn parent_type(self) -> &'static str {
        match self {
            Self::Apis => "api",
            Self::ControlPlanes => "control-plane",
            Self::Portals => "portal",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Apis => "API products, their documents and portal listings",
            Self::ControlPlanes => "Gateway control planes with upstreams and targets",
            Self::Portals => "Developer portals and the APIs they publish",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|resource| *resource == self)
            .unwrap_or_default()
    }

    fn count(self, catalog: &Catalog) -> usize {
        match self {
            Self::Apis => catalog.api_count(),
            Self::ControlPlanes => catalog.control_plane_count(),
            Self::Portals => catalog.portal_count(),
        }
    }

    /// Lists the resource through the catalog, paying its latency.
    pub fn fetch(self, catalog: &Catalog) -> Result<RecordSet> {
        match self {
            Self::Apis => RecordSet::new(self.title(), self.parent_type(), &catalog.list_apis()),
            Self::ControlPlanes => RecordSet::new(
                self.title(),
                self.parent_type(),
                &catalog.list_control_planes(),
            ),
            Self::Portals => {
                RecordSet::new(self.title(), self.parent_type(), &catalog.list_portals())
            }
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match normalize_header_key(value).as_str() {
            "api" | "apis" => Ok(Self::Apis),
            "cp" | "control plane" | "control planes" | "gateway" => Ok(Self::ControlPlanes),
            "portal" | "portals" => Ok(Self::Portals),
            _ => bail!(
                "unknown resource {value:?}; expected one of {}",
                Self::ALL.map(Self::name).join(", ")
            ),
        }
    }
}

/// Records of one kind plus the raw payload they were built from.
#[derive(Clone)]
pub struct RecordSet {
    pub title: String,
    pub parent_type: String,
    pub records: Vec<RecordRef>,
    pub raw: serde_json::Value,
}

impl RecordSet {
    pub fn new<T: Serialize>(
        title: impl Into<String>,
        parent_type: impl Into<String>,
        items: &[T],
    ) -> Result<Self> {
        let raw = serde_json::to_value(items).context("encode records")?;
        let records = items
            .iter()
            .map(record_from_serialize)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            title: title.into(),
            parent_type: parent_type.into(),
            records,
            raw,
        })
    }

    /// A list view whose rows open as detail cards typed by `parent_type`.
    pub fn into_child_view(self) -> ChildView {
        let table = table_from_records(
            self.records
                .iter()
                .map(|record| record.as_ref() as &dyn Record),
        );
        let records = Arc::new(self.records);
        let context_records = Arc::clone(&records);
        ChildView::list(self.title, table.headers, table.rows)
            .with_detail_renderer(move |index| render_at(&records, index))
            .with_context(self.parent_type, move |index| {
                context_records.get(index).cloned()
            })
    }
}

fn render_at(records: &[RecordRef], index: usize) -> String {
    records
        .get(index)
        .map(|record| render_record_detail(record.as_ref()))
        .unwrap_or_default()
}

fn catalog_handle(context: &LoadContext) -> Result<Arc<Catalog>> {
    context
        .handle::<Catalog>()
        .context("catalog handle missing from load context")
}

fn parent_id(parent: Option<&RecordRef>, kind: &str) -> Result<String> {
    parent
        .and_then(|record| record.record_id())
        .with_context(|| format!("{kind} record has no id"))
}

/// Child collections reachable from detail cards, keyed by parent type and
/// field.
pub fn registry() -> Arc<ChildLoaderRegistry> {
    let registry = ChildLoaderRegistry::shared();

    registry.register("api", "documents", |context, parent| {
        let catalog = catalog_handle(context)?;
        let api_id = parent_id(parent.as_ref(), "api")?;
        let summaries = catalog.list_documents(&api_id)?;
        let view = RecordSet::new("Documents", "api-document", &summaries)?.into_child_view();
        Ok(view.with_detail_fetcher(move |context, summary| {
            let catalog = catalog_handle(context)?;
            let document_id = summary
                .record_id()
                .context("document summary has no id")?;
            let document = catalog.get_document(&api_id, &document_id)?;
            Ok(record_from_serialize(&document)?)
        }))
    });

    registry.register("control-plane", "upstreams", |context, parent| {
        let catalog = catalog_handle(context)?;
        let control_plane_id = parent_id(parent.as_ref(), "control plane")?;
        let upstreams = catalog.list_upstreams(&control_plane_id)?;
        Ok(RecordSet::new("Upstreams", "upstream", &upstreams)?.into_child_view())
    });

    registry.register("upstream", "targets", |context, parent| {
        let catalog = catalog_handle(context)?;
        let upstream_id = parent_id(parent.as_ref(), "upstream")?;
        let targets = catalog.list_targets(&upstream_id)?;
        Ok(RecordSet::new("Targets", "target", &targets)?.into_child_view())
    });

    registry.register("portal", "apis", |context, parent| {
        let catalog = catalog_handle(context)?;
        let portal_id = parent_id(parent.as_ref(), "portal")?;
        let apis = catalog.list_portal_apis(&portal_id)?;
        Ok(RecordSet::new("APIs", Resource::Apis.parent_type(), &apis)?.into_child_view())
    });

    registry
}

#[derive(Debug, Serialize)]
struct ResourceEntry {
    resource: &'static str,
    count: usize,
    description: &'static str,
}

/// Everything a command needs to show catalog data.
pub struct Session {
    catalog: Arc<Catalog>,
    registry: Arc<ChildLoaderRegistry>,
    context: LoadContext,
    root_label: String,
    max_width: usize,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>, profile: &str, root_label: &str, max_width: usize) -> Self {
        let context = LoadContext::new()
            .with_profile(profile)
            .with_handle(Arc::clone(&catalog));
        Self {
            catalog,
            registry: registry(),
            context,
            root_label: root_label.to_owned(),
            max_width,
        }
    }

    fn home(&self) -> Result<RecordSet> {
        let entries: Vec<ResourceEntry> = Resource::ALL
            .iter()
            .map(|resource| ResourceEntry {
                resource: resource.name(),
                count: resource.count(&self.catalog),
                description: resource.description(),
            })
            .collect();
        RecordSet::new(&self.root_label, "resource", &entries)
    }

    /// Options for the home table: each row loads its resource's list, and
    /// `deep_link` opens one of them straight away.
    pub fn home_options(&self, home: &RecordSet, deep_link: Option<Resource>) -> RenderOptions {
        let catalog = Arc::clone(&self.catalog);
        let records = Arc::new(home.records.clone());
        let mut options = RenderOptions::new()
            .with_root_label(self.root_label.clone())
            .with_registry(Arc::clone(&self.registry))
            .with_load_context(self.context.clone())
            .with_row_loader(move |index| {
                let resource = Resource::ALL
                    .get(index)
                    .copied()
                    .with_context(|| format!("no resource at row {index}"))?;
                Ok(resource.fetch(&catalog)?.into_child_view())
            })
            .with_detail_renderer(move |index| render_at(&records, index));
        if self.max_width > 0 {
            options = options.with_max_width(self.max_width);
        }
        if let Some(resource) = deep_link {
            options = options.with_initial_row(resource.index(), true);
        }
        options
    }

    /// Shows the home table, or one resource's list when printing
    /// non-interactively.
    pub fn show(
        &self,
        out: &mut dyn Write,
        resource: Option<Resource>,
        format: OutputFormat,
        interactive: bool,
    ) -> Result<()> {
        if interactive || resource.is_none() {
            let home = self.home()?;
            let options = self.home_options(&home, resource);
            return render_for_format(
                interactive,
                format,
                out,
                &home.records,
                &home.raw,
                &self.root_label,
                options,
            );
        }

        let Some(resource) = resource else {
            return Ok(());
        };
        let set = resource.fetch(&self.catalog)?;
        let mut options = RenderOptions::new().with_title(set.title.clone());
        if self.max_width > 0 {
            options = options.with_max_width(self.max_width);
        }
        render_for_format(
            false,
            format,
            out,
            &set.records,
            &set.raw,
            &set.title,
            options,
        )
    }
}
