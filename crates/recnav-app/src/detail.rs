// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::child::{ChildLoader, ChildView, child_loader};
use crate::error::NavError;
use crate::header::{format_header, normalize_header_key, title_from_label};
use crate::record::{FieldDescriptor, FieldValue, MappingRecord, Record, RecordRef, field_for_label};
use crate::registry::ChildLoaderRegistry;
use std::fmt;
use std::sync::Arc;

/// Value shown for a field backed by a registered child loader.
pub const CHILD_FIELD_INDICATOR: &str = "[...]";
pub const NIL_INDICATOR: &str = "[nil]";
pub const EMPTY_INDICATOR: &str = "[]";
pub const EXPANDABLE_INDICATOR: &str = "[...]";
pub const MAPPING_INDICATOR: &str = "{...}";

pub const NO_DATA: &str = "(no data)";
const EMPTY_VALUE: &str = "(empty)";

const BLOCK_INDENT: &str = "  ";

/// One `label: value` line of a detail card.
#[derive(Clone, Default)]
pub struct DetailItem {
    pub label: String,
    pub value: String,
    pub loader: Option<ChildLoader>,
}

impl DetailItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            loader: None,
        }
    }

    pub fn with_loader(mut self, loader: ChildLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    /// First line of the value, with a marker when more lines follow.
    pub fn display_value(&self) -> String {
        let mut lines = self.value.lines();
        let first = lines.next().unwrap_or_default().trim();
        if lines.next().is_some() {
            format!("{first} …")
        } else {
            first.to_owned()
        }
    }
}

impl fmt::Debug for DetailItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetailItem")
            .field("label", &self.label)
            .field("value", &self.value)
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

/// Parses pre-rendered detail text into items.
///
/// An unindented `label: value` (or bare `label:`) line starts an item.
/// Indented lines continue the previous item's value as a block, keeping any
/// deeper indentation. Unindented lines without a label separator are
/// appended to the previous value. Text before the first label is dropped.
pub fn parse_detail_content(content: &str) -> Vec<DetailItem> {
    let mut items: Vec<DetailItem> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let indented = line.starts_with([' ', '\t']);
        if !indented && let Some((label, value)) = split_label(trimmed) {
            items.push(DetailItem::new(label, value));
            continue;
        }

        let Some(prev) = items.last_mut() else {
            continue;
        };
        let continuation = if indented {
            line.strip_prefix(BLOCK_INDENT)
                .unwrap_or_else(|| line.trim_start())
                .trim_end()
        } else {
            trimmed
        };
        if prev.value.is_empty() {
            prev.value = continuation.to_owned();
        } else {
            prev.value.push('\n');
            prev.value.push_str(continuation);
        }
    }

    items
}

fn split_label(line: &str) -> Option<(&str, &str)> {
    let index = line.find(':')?;
    let rest = &line[index + 1..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    let label = line[..index].trim();
    if label.is_empty() {
        return None;
    }
    Some((label, rest.trim()))
}

/// Inverse of [`parse_detail_content`]: single-line values stay on the label
/// line, multi-line values become an indented block, empty values render as
/// a bare `label:`.
pub fn render_detail_items(items: &[DetailItem]) -> String {
    let mut out = String::new();
    for item in items {
        let label = item.label.trim();
        if label.is_empty() {
            continue;
        }
        write_labeled(&mut out, label, &item.value);
    }
    out.trim_end_matches('\n').to_owned()
}

fn write_labeled(out: &mut String, label: &str, value: &str) {
    if value.trim().is_empty() {
        out.push_str(label);
        out.push_str(":\n");
        return;
    }

    let lines: Vec<&str> = value.split('\n').collect();
    if lines.len() == 1 {
        out.push_str(&format!("{label}: {}\n", value.trim()));
        return;
    }

    out.push_str(label);
    out.push_str(":\n");
    for line in lines {
        let line = line.trim_end();
        if !line.trim().is_empty() {
            out.push_str(BLOCK_INDENT);
            out.push_str(line);
        }
        out.push('\n');
    }
}

/// Puts `id` first, then `name`, then everything else by normalised label.
pub fn reorder_detail_items(items: Vec<DetailItem>) -> Vec<DetailItem> {
    let mut ids = Vec::new();
    let mut names = Vec::new();
    let mut others = Vec::new();
    for item in items {
        match normalize_header_key(&item.label).as_str() {
            "id" => ids.push(item),
            "name" => names.push(item),
            _ => others.push(item),
        }
    }

    others.sort_by(|left, right| {
        normalize_header_key(&left.label)
            .cmp(&normalize_header_key(&right.label))
            .then_with(|| {
                left.label
                    .trim()
                    .to_lowercase()
                    .cmp(&right.label.trim().to_lowercase())
            })
    });

    ids.into_iter().chain(names).chain(others).collect()
}

/// Field descriptors for `record`, or an introspection mismatch when the
/// record keeps its shape to itself.
pub fn introspect(record: &dyn Record, parent_type: &str) -> Result<Vec<FieldDescriptor>, NavError> {
    record
        .describe_fields()
        .ok_or_else(|| NavError::IntrospectionMismatch {
            parent_type: parent_type.to_owned(),
        })
}

/// Attaches loaders to detail items.
///
/// Registered child loaders for `parent_type` are applied first, registered
/// fields missing from the card are appended, then complex values found on
/// `parent` get indicators and loaders of their own.
pub fn enrich_detail_items(
    items: Vec<DetailItem>,
    parent_type: &str,
    parent: Option<&RecordRef>,
    registry: &ChildLoaderRegistry,
) -> Vec<DetailItem> {
    let mut items = items;
    apply_registered_loaders(&mut items, parent_type, registry);
    append_registered_fields(&mut items, parent_type, registry);
    if let Some(parent) = parent {
        apply_complex_value_loaders(&mut items, parent.as_ref(), parent_type);
    }
    items
}

fn apply_registered_loaders(items: &mut [DetailItem], parent_type: &str, registry: &ChildLoaderRegistry) {
    if parent_type.trim().is_empty() {
        return;
    }
    for item in items.iter_mut() {
        if let Some(loader) = registry.lookup(parent_type, &item.label) {
            item.loader = Some(loader);
            item.value = CHILD_FIELD_INDICATOR.to_owned();
        }
    }
}

fn append_registered_fields(items: &mut Vec<DetailItem>, parent_type: &str, registry: &ChildLoaderRegistry) {
    if parent_type.trim().is_empty() {
        return;
    }
    for registration in registry.fields_for(parent_type) {
        let present = items
            .iter()
            .any(|item| normalize_header_key(&item.label) == registration.field);
        if present {
            continue;
        }
        items.push(
            DetailItem::new(registration.label, CHILD_FIELD_INDICATOR)
                .with_loader(registration.loader),
        );
    }
}

fn apply_complex_value_loaders(items: &mut [DetailItem], parent: &dyn Record, parent_type: &str) {
    let fields = match introspect(parent, parent_type) {
        Ok(fields) => fields,
        Err(error) => {
            tracing::debug!(%error, "skipping complex field loaders");
            return;
        }
    };

    for item in items.iter_mut() {
        let Some(field) = field_for_label(&fields, &item.label) else {
            continue;
        };
        let label = item.label.clone();
        match &field.value {
            FieldValue::Scalar(_) => {}
            FieldValue::Null => {
                item.value = NIL_INDICATOR.to_owned();
            }
            FieldValue::Mapping(entries) => {
                item.value = if entries.is_empty() {
                    EMPTY_INDICATOR
                } else {
                    MAPPING_INDICATOR
                }
                .to_owned();
                let entries = entries.clone();
                item.loader = Some(child_loader(move |_, _| {
                    Ok(build_child_view_for_mapping(&label, &entries))
                }));
            }
            FieldValue::Sequence(values) => {
                item.value = if values.is_empty() {
                    EMPTY_INDICATOR
                } else {
                    EXPANDABLE_INDICATOR
                }
                .to_owned();
                let values = values.clone();
                item.loader = Some(child_loader(move |_, _| {
                    Ok(build_child_view_for_sequence(&label, &values))
                }));
            }
        }
    }
}

pub fn is_preview_indicator(value: &str) -> bool {
    matches!(
        value.trim(),
        CHILD_FIELD_INDICATOR | MAPPING_INDICATOR | NIL_INDICATOR | EMPTY_INDICATOR
    )
}

/// Drops items that only make sense in the interactive card: anything with a
/// loader or an indicator placeholder.
///
/// Matching is on the rendered text, so a scalar whose literal value is an
/// indicator string such as `[]` or `{...}` is dropped too.
pub fn filter_preview_items(items: Vec<DetailItem>) -> Vec<DetailItem> {
    items
        .into_iter()
        .filter(|item| {
            !item.label.trim().is_empty() && item.loader.is_none() && !is_preview_indicator(&item.value)
        })
        .map(|item| DetailItem::new(item.label, item.value))
        .collect()
}

/// Strips drill-down fields from a preview. Text whose record cannot be
/// introspected, or that would end up empty, comes back unchanged.
pub fn sanitize_preview(
    raw: &str,
    parent_type: &str,
    parent: Option<&RecordRef>,
    registry: &ChildLoaderRegistry,
) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let Some(parent) = parent else {
        return raw.to_owned();
    };
    if let Err(error) = introspect(parent.as_ref(), parent_type) {
        tracing::debug!(%error, "preview left as rendered");
        return raw.to_owned();
    }

    let items = parse_detail_content(raw);
    if items.is_empty() {
        return raw.to_owned();
    }

    let enriched = enrich_detail_items(items, parent_type, Some(parent), registry);
    let filtered = filter_preview_items(enriched);
    if filtered.is_empty() {
        return raw.to_owned();
    }
    render_detail_items(&filtered)
}

/// Detail card for a mapping: sorted `key: value` lines.
pub fn build_child_view_for_mapping(label: &str, entries: &[(String, FieldValue)]) -> ChildView {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|left, right| left.0.cmp(&right.0));

    let rendered = if sorted.is_empty() {
        NO_DATA.to_owned()
    } else {
        let mut out = String::new();
        for (key, value) in &sorted {
            let text = value.cell_text();
            let text = if text.trim().is_empty() { EMPTY_VALUE.to_owned() } else { text };
            out.push_str(&format!("{key}: {text}\n"));
        }
        out.trim_end().to_owned()
    };

    let record: RecordRef = Arc::new(MappingRecord::new(sorted));
    ChildView::detail(title_from_label(label), move |_| rendered.clone())
        .with_context(normalize_header_key(label), move |_| Some(Arc::clone(&record)))
}

/// List view for a sequence. Sequences of mappings become a table with one
/// column per key; anything else becomes numbered `#`/`VALUE` rows.
pub fn build_child_view_for_sequence(label: &str, values: &[FieldValue]) -> ChildView {
    let title = title_from_label(label);
    let parent_type = normalize_header_key(label);

    if values.is_empty() {
        let mut view = ChildView::list(title, vec!["VALUE".to_owned()], Vec::new())
            .with_detail_renderer(|_| NO_DATA.to_owned());
        view.parent_type = parent_type;
        return view;
    }

    if let Some(FieldValue::Mapping(first)) = values.first() {
        let keys: Vec<String> = first.iter().map(|(key, _)| key.clone()).collect();
        let records: Arc<Vec<Option<RecordRef>>> = Arc::new(
            values
                .iter()
                .map(|value| match value {
                    FieldValue::Mapping(entries) => {
                        let record: RecordRef = Arc::new(MappingRecord::new(entries.clone()));
                        Some(record)
                    }
                    _ => None,
                })
                .collect(),
        );
        let rows = values
            .iter()
            .map(|value| match value {
                FieldValue::Mapping(entries) => keys
                    .iter()
                    .map(|key| {
                        entries
                            .iter()
                            .find(|(entry_key, _)| entry_key == key)
                            .map(|(_, value)| value.cell_text())
                            .unwrap_or_default()
                    })
                    .collect(),
                other => vec![other.summary()],
            })
            .collect();
        let headers = keys.iter().map(|key| format_header(key)).collect();

        let render_records = Arc::clone(&records);
        return ChildView::list(title, headers, rows)
            .with_detail_renderer(move |index| {
                match render_records.get(index) {
                    Some(Some(record)) => render_record_detail(record.as_ref()),
                    _ => String::new(),
                }
            })
            .with_context(parent_type, move |index| records.get(index).cloned().flatten());
    }

    let rows = values
        .iter()
        .enumerate()
        .map(|(index, value)| vec![(index + 1).to_string(), value.summary()])
        .collect();
    let details: Vec<String> = values.iter().map(FieldValue::detail_text).collect();
    let mut view = ChildView::list(title, vec!["#".to_owned(), "VALUE".to_owned()], rows)
        .with_detail_renderer(move |index| {
            let mut out = String::new();
            if let Some(text) = details.get(index) {
                write_labeled(&mut out, "value", text);
            }
            out.trim_end_matches('\n').to_owned()
        });
    view.parent_type = parent_type;
    view
}

/// Label used for a field in rendered detail text: `LocalUpdatedTime`
/// becomes `local_updated_time`.
pub fn detail_label(name: &str) -> String {
    format_header(name).to_lowercase().replace(' ', "_")
}

/// Renders a record as `label: value` detail text. Complex values are kept
/// on one line; the enrichment step swaps them for indicators.
pub fn render_record_detail(record: &dyn Record) -> String {
    let Some(fields) = record.describe_fields() else {
        return String::new();
    };
    let mut out = String::new();
    for field in fields {
        let value = match &field.value {
            FieldValue::Scalar(value) => value.clone(),
            FieldValue::Null => String::new(),
            complex => complex.cell_text(),
        };
        write_labeled(&mut out, &detail_label(&field.name), &value);
    }
    out.trim_end_matches('\n').to_owned()
}

#[cfg(test)]
mod tests {
    use super::{
        CHILD_FIELD_INDICATOR, DetailItem, EMPTY_INDICATOR, EXPANDABLE_INDICATOR,
        MAPPING_INDICATOR, NIL_INDICATOR, enrich_detail_items, filter_preview_items,
        parse_detail_content, render_detail_items, render_record_detail, reorder_detail_items,
        sanitize_preview,
    };
    use crate::child::{ChildView, ChildViewMode, LoadContext, child_loader};
    use crate::record::{FieldDescriptor, FieldValue, MappingRecord, Record, RecordRef};
    use crate::registry::ChildLoaderRegistry;
    use anyhow::Result;
    use serde_json::json;
    use std::sync::Arc;

    struct Opaque;

    impl Record for Opaque {
        fn describe_fields(&self) -> Option<Vec<FieldDescriptor>> {
            None
        }
    }

    fn record(entries: Vec<(&str, FieldValue)>) -> RecordRef {
        Arc::new(MappingRecord::new(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value))
                .collect(),
        ))
    }

    fn api_record() -> RecordRef {
        record(vec![
            ("ID", "c2a0".into()),
            ("Name", "Flights".into()),
            ("Labels", FieldValue::mapping([("env", "prod")])),
            ("Portals", FieldValue::sequence(["portal-a"])),
            ("Description", "Provides flights".into()),
        ])
    }

    fn open(item: &DetailItem, parent: &RecordRef) -> Result<ChildView> {
        let loader = item.loader.clone().expect("item should carry a loader");
        loader(&LoadContext::new(), Some(Arc::clone(parent)))
    }

    #[test]
    fn mapping_fields_open_a_detail_card() -> Result<()> {
        let parent = record(vec![("Labels", FieldValue::mapping([("foo", "bar")]))]);
        let registry = ChildLoaderRegistry::new();
        let enriched = enrich_detail_items(
            vec![DetailItem::new("labels", "")],
            "",
            Some(&parent),
            &registry,
        );
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].value, MAPPING_INDICATOR);

        let child = open(&enriched[0], &parent)?;
        assert_eq!(child.mode, ChildViewMode::Detail);
        assert!(child.headers.is_empty());
        assert!(child.rows.is_empty());
        assert!(child.render_detail(0).unwrap_or_default().contains("foo: bar"));
        assert_eq!(child.title, "Labels");
        assert_eq!(child.parent_type, "labels");
        Ok(())
    }

    #[test]
    fn empty_mapping_fields_render_no_data() -> Result<()> {
        let parent = record(vec![("Labels", FieldValue::Mapping(Vec::new()))]);
        let registry = ChildLoaderRegistry::new();
        let enriched = enrich_detail_items(
            vec![DetailItem::new("labels", "")],
            "",
            Some(&parent),
            &registry,
        );
        assert_eq!(enriched[0].value, EMPTY_INDICATOR);

        let child = open(&enriched[0], &parent)?;
        assert_eq!(child.mode, ChildViewMode::Detail);
        assert!(child.render_detail(0).unwrap_or_default().contains("(no data)"));
        Ok(())
    }

    #[test]
    fn sequence_fields_open_numbered_rows() -> Result<()> {
        let parent = record(vec![("IDs", FieldValue::sequence(["abc", "defg"]))]);
        let registry = ChildLoaderRegistry::new();
        let enriched =
            enrich_detail_items(vec![DetailItem::new("ids", "")], "", Some(&parent), &registry);
        assert_eq!(enriched[0].value, EXPANDABLE_INDICATOR);

        let child = open(&enriched[0], &parent)?;
        assert_eq!(child.headers, vec!["#", "VALUE"]);
        assert_eq!(
            child.rows,
            vec![
                vec!["1".to_owned(), "abc".to_owned()],
                vec!["2".to_owned(), "defg".to_owned()],
            ]
        );
        assert_eq!(child.render_detail(1).as_deref(), Some("value: defg"));
        Ok(())
    }

    #[test]
    fn empty_sequences_and_nulls_get_their_own_indicators() -> Result<()> {
        let parent = record(vec![
            ("Portals", FieldValue::Sequence(Vec::new())),
            ("Owner", FieldValue::Null),
        ]);
        let registry = ChildLoaderRegistry::new();
        let enriched = enrich_detail_items(
            vec![DetailItem::new("portals", ""), DetailItem::new("owner", "")],
            "",
            Some(&parent),
            &registry,
        );
        assert_eq!(enriched[0].value, EMPTY_INDICATOR);
        assert_eq!(enriched[1].value, NIL_INDICATOR);
        assert!(enriched[1].loader.is_none());

        let child = open(&enriched[0], &parent)?;
        assert_eq!(child.headers, vec!["VALUE"]);
        assert!(child.rows.is_empty());
        assert_eq!(child.render_detail(0).as_deref(), Some("(no data)"));
        Ok(())
    }

    #[test]
    fn sequences_of_mappings_become_tables() -> Result<()> {
        let parent = record(vec![(
            "Targets",
            FieldValue::sequence([
                FieldValue::mapping([("target", "10.0.0.1:80"), ("weight", "100")]),
                FieldValue::mapping([("target", "10.0.0.2:80"), ("weight", "50")]),
            ]),
        )]);
        let registry = ChildLoaderRegistry::new();
        let enriched = enrich_detail_items(
            vec![DetailItem::new("targets", "")],
            "",
            Some(&parent),
            &registry,
        );
        let child = open(&enriched[0], &parent)?;
        assert_eq!(child.headers, vec!["TARGET", "WEIGHT"]);
        assert_eq!(child.rows[1], vec!["10.0.0.2:80".to_owned(), "50".to_owned()]);
        assert!(child.context(0).is_some());
        assert_eq!(
            child.render_detail(0).as_deref(),
            Some("target: 10.0.0.1:80\nweight: 100")
        );
        Ok(())
    }

    #[test]
    fn registered_loaders_mark_and_append_fields() {
        let registry = ChildLoaderRegistry::new();
        registry.register("control-plane", "upstreams", |_, _| Ok(ChildView::default()));
        registry.register("control-plane", "consumers", |_, _| Ok(ChildView::default()));

        let enriched = enrich_detail_items(
            vec![DetailItem::new("id", "cp-1"), DetailItem::new("upstreams", "2")],
            "control-plane",
            None,
            &registry,
        );
        let labels: Vec<&str> = enriched.iter().map(|item| item.label.as_str()).collect();
        assert_eq!(labels, vec!["id", "upstreams", "consumers"]);
        assert_eq!(enriched[1].value, CHILD_FIELD_INDICATOR);
        assert!(enriched[1].has_loader());
        assert!(enriched[2].has_loader());
        assert!(!enriched[0].has_loader());
    }

    #[test]
    fn appended_fields_keep_the_registered_spelling() {
        let registry = ChildLoaderRegistry::new();
        registry.register("control-plane", "Consumer_Groups", |_, _| Ok(ChildView::default()));

        let enriched = enrich_detail_items(
            vec![DetailItem::new("id", "cp-1")],
            "control-plane",
            None,
            &registry,
        );
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[1].label, "Consumer_Groups");
        assert!(enriched[1].has_loader());

        let matched = enrich_detail_items(
            vec![DetailItem::new("consumer groups", "4")],
            "control-plane",
            None,
            &registry,
        );
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].label, "consumer groups");
        assert_eq!(matched[0].value, CHILD_FIELD_INDICATOR);
    }

    #[test]
    fn scalar_values_spelled_like_indicators_are_left_out_of_previews() {
        let parent = record(vec![
            ("ID", "c2a0".into()),
            ("Selector", "{...}".into()),
            ("Pattern", "[]".into()),
        ]);
        let registry = ChildLoaderRegistry::new();
        let raw = "id: c2a0\nselector: {...}\npattern: []";
        let sanitized = sanitize_preview(raw, "api", Some(&parent), &registry);
        assert_eq!(sanitized.trim_end(), "id: c2a0");
    }

    #[test]
    fn sanitize_removes_complex_fields() {
        let raw = "id: c2a0\nname: Flights\nlabels: [...]\nportals: [...]\ndescription:\n  Provides flights\n";
        let registry = ChildLoaderRegistry::new();
        let sanitized = sanitize_preview(raw, "api", Some(&api_record()), &registry);
        assert!(!sanitized.contains("labels"));
        assert!(!sanitized.contains("portals"));
        assert!(sanitized.contains("id: c2a0"));
        assert!(sanitized.contains("name: Flights"));
        assert!(sanitized.contains("description"));
        assert!(sanitized.contains("Provides flights"));
    }

    #[test]
    fn sanitize_falls_back_to_raw_when_everything_is_dropped() {
        let parent = record(vec![("Portals", FieldValue::sequence(["portal-a"]))]);
        let registry = ChildLoaderRegistry::new();
        let raw = "portals: [...]";
        assert_eq!(sanitize_preview(raw, "api", Some(&parent), &registry), raw);
    }

    #[test]
    fn sanitize_leaves_opaque_and_blank_input_alone() {
        let registry = ChildLoaderRegistry::new();
        let opaque: RecordRef = Arc::new(Opaque);
        let raw = "labels: [...]\nname: x";
        assert_eq!(sanitize_preview(raw, "api", Some(&opaque), &registry), raw);
        assert_eq!(sanitize_preview(raw, "api", None, &registry), raw);
        assert_eq!(sanitize_preview("  \n ", "api", Some(&api_record()), &registry), "");
    }

    #[test]
    fn filtering_drops_loader_rows() {
        let filtered = filter_preview_items(vec![
            DetailItem::new("id", "123"),
            DetailItem::new("documents", CHILD_FIELD_INDICATOR)
                .with_loader(child_loader(|_, _| Ok(ChildView::default()))),
        ]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].label, "id");
    }

    #[test]
    fn parsing_keeps_blocks_and_continuations() {
        let items = parse_detail_content(
            "preamble\nid: 1\ndescription:\n  line one\n    nested\nnote: first\nsecond\nurl: http://x\n",
        );
        let pairs: Vec<(&str, &str)> = items
            .iter()
            .map(|item| (item.label.as_str(), item.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("id", "1"),
                ("description", "line one\n  nested"),
                ("note", "first\nsecond"),
                ("url", "http://x"),
            ]
        );
        assert_eq!(
            render_detail_items(&items),
            "id: 1\ndescription:\n  line one\n    nested\nnote:\n  first\n  second\nurl: http://x"
        );
    }

    #[test]
    fn reorder_puts_id_and_name_first() {
        let items = reorder_detail_items(vec![
            DetailItem::new("zeta", ""),
            DetailItem::new("name", ""),
            DetailItem::new("alpha", ""),
            DetailItem::new("ID", ""),
        ]);
        let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
        assert_eq!(labels, vec!["ID", "name", "alpha", "zeta"]);
    }

    #[test]
    fn record_detail_uses_snake_case_labels() {
        let text = render_record_detail(&json!({
            "displayName": "Alpha",
            "notes": "one\ntwo",
            "owner": null,
            "tags": ["a"],
        }));
        assert_eq!(
            text,
            "display_name: Alpha\nnotes:\n  one\n  two\nowner:\ntags: [a]"
        );
    }
}
