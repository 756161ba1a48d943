// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::error::NavError;
use crate::header::{compact_key, format_header, normalize_header_key};
use crate::layout::abbreviate_value;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Longest one-line summary shown for a value in generated child tables.
pub const SUMMARY_LIMIT: usize = 60;

pub type RecordRef = Arc<dyn Record>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Mapping,
    Sequence,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Scalar(String),
    Mapping(Vec<(String, FieldValue)>),
    Sequence(Vec<FieldValue>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Null | Self::Scalar(_) => FieldKind::Scalar,
            Self::Mapping(_) => FieldKind::Mapping,
            Self::Sequence(_) => FieldKind::Sequence,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn sequence<V, I>(items: I) -> Self
    where
        V: Into<FieldValue>,
        I: IntoIterator<Item = V>,
    {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Single-line text suitable for a table cell.
    pub fn cell_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Scalar(value) => value.replace(['\n', '\r'], " "),
            Self::Mapping(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{key}: {}", value.cell_text()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Self::Sequence(items) => {
                let parts: Vec<String> = items.iter().map(Self::cell_text).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }

    /// Abbreviated one-line form used for generated child rows.
    pub fn summary(&self) -> String {
        match self {
            Self::Null => "nil".to_owned(),
            other => abbreviate_value(&other.cell_text(), SUMMARY_LIMIT),
        }
    }

    /// Multi-line form used in detail cards. Mappings become `key: value`
    /// lines and sequences become `- item` lines.
    pub fn detail_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Scalar(value) => value.clone(),
            Self::Mapping(entries) => entries
                .iter()
                .map(|(key, value)| format!("{key}: {}", value.cell_text()))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Sequence(items) => items
                .iter()
                .map(|item| format!("- {}", item.cell_text()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cell_text())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        Self::Scalar(value.clone())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        Self::sequence(items)
    }
}

impl From<&serde_json::Value> for FieldValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Scalar(flag.to_string()),
            serde_json::Value::Number(number) => Self::Scalar(number.to_string()),
            serde_json::Value::String(text) => Self::Scalar(text.clone()),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.iter().map(FieldValue::from).collect())
            }
            serde_json::Value::Object(map) => Self::Mapping(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.into()))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub value: FieldValue,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn scalar(name: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Scalar(value.to_string()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }

    /// Whether this field is the one a detail line labelled `label` refers
    /// to. Labels are compared against the field's formatted heading after
    /// normalisation, and again with all spaces removed.
    pub fn matches_label(&self, label: &str) -> bool {
        let wanted = normalize_header_key(label);
        if wanted.is_empty() {
            return false;
        }
        let candidate = normalize_header_key(&format_header(&self.name));
        candidate == wanted || compact_key(&candidate) == compact_key(&wanted)
    }
}

/// A value the navigator can look inside.
///
/// `describe_fields` returning `None` means the shape is opaque; callers then
/// keep whatever pre-rendered text they already have.
pub trait Record: Send + Sync {
    fn describe_fields(&self) -> Option<Vec<FieldDescriptor>>;

    fn record_id(&self) -> Option<String> {
        self.describe_fields()?
            .into_iter()
            .find(|field| field.matches_label("id"))
            .and_then(|field| match field.value {
                FieldValue::Scalar(value) if !value.trim().is_empty() => Some(value),
                _ => None,
            })
    }
}

pub fn field_for_label<'a>(fields: &'a [FieldDescriptor], label: &str) -> Option<&'a FieldDescriptor> {
    fields.iter().find(|field| field.matches_label(label))
}

impl Record for serde_json::Value {
    fn describe_fields(&self) -> Option<Vec<FieldDescriptor>> {
        let object = self.as_object()?;
        Some(
            object
                .iter()
                .map(|(key, value)| FieldDescriptor::new(key.clone(), value))
                .collect(),
        )
    }
}

/// Record view over a plain list of entries, used for drilled-into mappings
/// and sequence elements.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRecord {
    entries: Vec<(String, FieldValue)>,
}

impl MappingRecord {
    pub fn new(entries: Vec<(String, FieldValue)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, FieldValue)] {
        &self.entries
    }
}

impl Record for MappingRecord {
    fn describe_fields(&self) -> Option<Vec<FieldDescriptor>> {
        Some(
            self.entries
                .iter()
                .map(|(key, value)| FieldDescriptor::new(key.clone(), value.clone()))
                .collect(),
        )
    }
}

/// Wraps any serializable value as an introspectable record.
pub fn record_from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<RecordRef, NavError> {
    let value = serde_json::to_value(value).map_err(|error| NavError::serialize("json", error))?;
    let record: RecordRef = Arc::new(value);
    Ok(record)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordTable {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }
}

/// Lays records out as a table. Columns come from the first record that
/// describes itself; opaque records are skipped.
pub fn table_from_records<'a, I>(records: I) -> RecordTable
where
    I: IntoIterator<Item = &'a dyn Record>,
{
    let mut names: Vec<String> = Vec::new();
    let mut table = RecordTable::default();

    for record in records {
        let Some(fields) = record.describe_fields() else {
            tracing::debug!("skipping record without field descriptors");
            continue;
        };
        if names.is_empty() {
            names = fields.iter().map(|field| field.name.clone()).collect();
            table.headers = names.iter().map(|name| format_header(name)).collect();
        }
        let row = names
            .iter()
            .map(|name| {
                fields
                    .iter()
                    .find(|field| &field.name == name)
                    .map(|field| field.value.cell_text())
                    .unwrap_or_default()
            })
            .collect();
        table.rows.push(row);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::{
        FieldDescriptor, FieldKind, FieldValue, MappingRecord, Record, record_from_serialize,
        table_from_records,
    };
    use anyhow::Result;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Sample {
        id: String,
        display_name: String,
        labels: std::collections::BTreeMap<String, String>,
    }

    #[test]
    fn null_reports_scalar_kind() {
        assert_eq!(FieldValue::Null.kind(), FieldKind::Scalar);
        assert_eq!(FieldValue::mapping([("a", "b")]).kind(), FieldKind::Mapping);
        assert_eq!(FieldValue::sequence(["a"]).kind(), FieldKind::Sequence);
    }

    #[test]
    fn labels_match_formatted_field_names() {
        let field = FieldDescriptor::scalar("LocalUpdatedTime", "now");
        assert!(field.matches_label("local updated time"));
        assert!(field.matches_label("local_updated_time"));
        assert!(field.matches_label("localupdatedtime"));
        assert!(!field.matches_label("updated"));
        assert!(!field.matches_label(""));
    }

    #[test]
    fn json_objects_describe_their_fields() {
        let value = json!({"id": "abc", "tags": ["x"], "meta": {"k": 1}, "gone": null});
        let fields = value.describe_fields().unwrap_or_default();
        assert_eq!(fields.len(), 4);
        assert_eq!(value.record_id().as_deref(), Some("abc"));
        assert!(json!([1, 2]).describe_fields().is_none());
    }

    #[test]
    fn serializable_values_become_records() -> Result<()> {
        let record = record_from_serialize(&Sample {
            id: "c2a0".to_owned(),
            display_name: "Flights".to_owned(),
            labels: [("env".to_owned(), "prod".to_owned())].into_iter().collect(),
        })?;
        let fields = record.describe_fields().unwrap_or_default();
        let labels = fields
            .iter()
            .find(|field| field.name == "labels")
            .map(|field| field.kind());
        assert_eq!(labels, Some(FieldKind::Mapping));
        assert_eq!(record.record_id().as_deref(), Some("c2a0"));
        Ok(())
    }

    #[test]
    fn table_uses_first_record_for_columns() {
        let first = MappingRecord::new(vec![
            ("Name".to_owned(), "Alpha".into()),
            ("Tags".to_owned(), FieldValue::sequence(["a", "b"])),
        ]);
        let second = MappingRecord::new(vec![("Name".to_owned(), "Beta".into())]);
        let opaque = json!("not an object");
        let records: Vec<&dyn Record> = vec![&first, &opaque, &second];
        let table = table_from_records(records);
        assert_eq!(table.headers, vec!["NAME", "TAGS"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["Alpha".to_owned(), "[a, b]".to_owned()],
                vec!["Beta".to_owned(), String::new()],
            ]
        );
    }

    #[test]
    fn detail_text_spreads_complex_values_over_lines() {
        let value = FieldValue::mapping([("env", "prod"), ("team", "core")]);
        assert_eq!(value.detail_text(), "env: prod\nteam: core");
        assert_eq!(FieldValue::sequence(["a", "b"]).detail_text(), "- a\n- b");
        assert_eq!(FieldValue::Null.summary(), "nil");
    }
}
