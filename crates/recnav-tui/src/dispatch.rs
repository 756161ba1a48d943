// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::run_navigator;
use anyhow::{Context, Result, bail};
use is_terminal::IsTerminal;
use recnav_app::{
    ChildLoaderRegistry, ChildView, DetailContextProvider, DetailRenderer, LoadContext, NavConfig,
    NavError, Navigator, Record, RecordRef, RecordTable, RowLoader, abbreviate_id_columns,
    compute_column_widths, fit_to_width, sanitize_preview, table_from_records,
};
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

/// Width assumed for static output when nothing else is known.
pub const DEFAULT_WIDTH: usize = 120;
pub const NO_DATA_MESSAGE: &str = "No data to display.";

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub const ALL: [Self; 3] = [Self::Text, Self::Json, Self::Yaml];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match Self::ALL
            .into_iter()
            .find(|format| format.as_str() == normalized)
        {
            Some(format) => Ok(format),
            None => bail!("unsupported output format {value:?}; expected text, json or yaml"),
        }
    }
}

/// Presentation knobs shared by static and interactive output.
#[derive(Clone, Default)]
pub struct RenderOptions {
    pub title: Option<String>,
    pub table: Option<RecordTable>,
    pub root_label: Option<String>,
    pub row_loader: Option<RowLoader>,
    pub detail_renderer: Option<DetailRenderer>,
    pub detail_context: Option<(String, DetailContextProvider)>,
    pub initial_row: Option<(usize, bool)>,
    pub load_context: LoadContext,
    pub registry: Option<Arc<ChildLoaderRegistry>>,
    pub max_width: Option<usize>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Shows these headers and rows instead of a table built from records.
    pub fn with_table(mut self, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        self.table = Some(RecordTable { headers, rows });
        self
    }

    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = Some(label.into());
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
        self.detail_context = Some((parent_type.into(), Arc::new(context)));
        self
    }

    pub fn with_initial_row(mut self, row: usize, open: bool) -> Self {
        self.initial_row = Some((row, open));
        self
    }

    pub fn with_load_context(mut self, context: LoadContext) -> Self {
        self.load_context = context;
        self
    }

    pub fn with_registry(mut self, registry: Arc<ChildLoaderRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    fn resolve_table(&self, records: &[RecordRef]) -> RecordTable {
        if let Some(table) = &self.table {
            return table.clone();
        }
        let records: Vec<&dyn Record> = records
            .iter()
            .map(|record| record.as_ref() as &dyn Record)
            .collect();
        table_from_records(records)
    }

    fn registry(&self) -> Arc<ChildLoaderRegistry> {
        self.registry.clone().unwrap_or_default()
    }

    /// Navigator configuration for `table`. An explicit root label wins over
    /// `root_label`.
    pub fn nav_config(&self, table: RecordTable, root_label: &str) -> NavConfig {
        let mut config = NavConfig::new(table.headers, table.rows)
            .with_load_context(self.load_context.clone())
            .with_registry(self.registry());
        config.title = self.title.clone().unwrap_or_default();
        config.root_label = self
            .root_label
            .clone()
            .unwrap_or_else(|| root_label.to_owned());
        config.row_loader = self.row_loader.clone();
        config.detail_renderer = self.detail_renderer.clone();
        if let Some((parent_type, context)) = &self.detail_context {
            config.parent_type = parent_type.clone();
            config.detail_context = Some(Arc::clone(context));
        }
        if let Some((row, open)) = self.initial_row {
            config = config.with_initial_row(row, open);
        }
        config
    }

    /// Navigator configuration over `records`, or over the custom table
    /// when one is set.
    pub fn navigator_config(&self, records: &[RecordRef], root_label: &str) -> NavConfig {
        self.nav_config(self.resolve_table(records), root_label)
    }

    fn preview(&self, index: usize) -> Option<String> {
        let render = self.detail_renderer.as_ref()?;
        let raw = render(index);
        let (parent_type, parent) = match &self.detail_context {
            Some((parent_type, context)) => (parent_type.as_str(), context(index)),
            None => ("", None),
        };
        let preview = sanitize_preview(&raw, parent_type, parent.as_ref(), &self.registry());
        (!preview.trim().is_empty()).then_some(preview)
    }
}

/// Writes `records` as a column-aligned table. ID columns are abbreviated
/// and cells are cut to fit the width budget.
///
/// With a detail renderer set, the sanitized preview of the first row only
/// follows the table after a blank line.
pub fn render(out: &mut dyn Write, records: &[RecordRef], options: &RenderOptions) -> Result<()> {
    let table = options.resolve_table(records);
    if table.is_empty() {
        return write_static_message(out, options.title.as_deref(), NO_DATA_MESSAGE);
    }

    let rows = abbreviate_id_columns(&table.headers, &table.rows);
    let gaps = COLUMN_GAP.len() * table.headers.len().saturating_sub(1);
    let budget = options
        .max_width
        .unwrap_or(DEFAULT_WIDTH)
        .saturating_sub(gaps);
    let (widths, _) = compute_column_widths(&table.headers, &rows, budget);

    if let Some(title) = options.title.as_deref().filter(|title| !title.is_empty()) {
        writeln!(out, "{title}").context("write title")?;
    }
    write_row(out, &table.headers, &widths)?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }

    if let Some(preview) = options.preview(0) {
        writeln!(out).context("write separator")?;
        writeln!(out, "{preview}").context("write detail preview")?;
    }
    Ok(())
}

fn write_row(out: &mut dyn Write, cells: &[String], widths: &[usize]) -> Result<()> {
    let line = widths
        .iter()
        .enumerate()
        .map(|(index, width)| fit_to_width(cells.get(index).map_or("", String::as_str), *width))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    writeln!(out, "{}", line.trim_end()).context("write table row")
}

fn write_static_message(out: &mut dyn Write, title: Option<&str>, message: &str) -> Result<()> {
    if let Some(title) = title.filter(|title| !title.is_empty()) {
        writeln!(out, "{title}").context("write title")?;
    }
    writeln!(out, "{message}").context("write message")
}

/// Routes output by mode and format. Interactive mode boots the navigator
/// whatever the format; otherwise text is the static table and JSON/YAML
/// serialize `raw`.
pub fn render_for_format<T>(
    interactive: bool,
    format: OutputFormat,
    out: &mut dyn Write,
    summary: &[RecordRef],
    raw: &T,
    root_label: &str,
    options: RenderOptions,
) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let terminal = interactive && io::stdout().is_terminal();
    dispatch(
        interactive,
        terminal,
        format,
        out,
        summary,
        raw,
        root_label,
        options,
    )
}

#[allow(clippy::too_many_arguments)]
fn dispatch<T>(
    interactive: bool,
    terminal: bool,
    format: OutputFormat,
    out: &mut dyn Write,
    summary: &[RecordRef],
    raw: &T,
    root_label: &str,
    options: RenderOptions,
) -> Result<()>
where
    T: Serialize + ?Sized,
{
    if interactive {
        if terminal {
            return run_interactive(summary, root_label, options);
        }
        tracing::warn!("stdout is not a terminal; printing static output instead");
        return render(out, summary, &options);
    }

    match format {
        OutputFormat::Text => render(out, summary, &options),
        OutputFormat::Json => {
            let body = serde_json::to_string_pretty(raw)
                .map_err(|error| NavError::serialize("json", error))?;
            writeln!(out, "{body}").context("write json output")
        }
        OutputFormat::Yaml => {
            let body =
                serde_yaml::to_string(raw).map_err(|error| NavError::serialize("yaml", error))?;
            write!(out, "{body}").context("write yaml output")
        }
    }
}

/// Boots the interactive navigator over `summary`. Empty data prints the
/// no-data message instead of opening the terminal UI.
pub fn run_interactive(summary: &[RecordRef], root_label: &str, options: RenderOptions) -> Result<()> {
    let table = options.resolve_table(summary);
    if table.is_empty() {
        let mut stdout = io::stdout().lock();
        return write_static_message(&mut stdout, options.title.as_deref(), NO_DATA_MESSAGE);
    }
    let max_width = options.max_width.unwrap_or(0);
    let mut navigator = Navigator::new(options.nav_config(table, root_label));
    tracing::info!(
        rows = navigator.rows().len(),
        root = %navigator.breadcrumb_text(),
        "starting interactive navigator"
    );
    run_navigator(&mut navigator, max_width)
}

#[cfg(test)]
mod tests {
    use super::{NO_DATA_MESSAGE, OutputFormat, RenderOptions, dispatch, render};
    use anyhow::Result;
    use recnav_app::{FieldValue, MappingRecord, NavError, RecordRef};
    use recnav_testkit::{sample_api_detail, sample_api_record, strings};
    use serde_json::json;
    use std::sync::Arc;

    fn api(id: &str, name: &str) -> RecordRef {
        Arc::new(MappingRecord::new(vec![
            ("ID".to_owned(), FieldValue::from(id)),
            ("Name".to_owned(), FieldValue::from(name)),
        ]))
    }

    fn output(records: &[RecordRef], options: &RenderOptions) -> Result<String> {
        let mut out = Vec::new();
        render(&mut out, records, options)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn output_format_parses_case_insensitively() -> Result<()> {
        assert_eq!("JSON".parse::<OutputFormat>()?, OutputFormat::Json);
        assert_eq!(" yaml ".parse::<OutputFormat>()?, OutputFormat::Yaml);
        assert_eq!(OutputFormat::default().to_string(), "text");
        let error = "xml".parse::<OutputFormat>().unwrap_err();
        assert!(error.to_string().contains("unsupported output format"));
        Ok(())
    }

    #[test]
    fn static_table_aligns_columns_and_abbreviates_ids() -> Result<()> {
        let records = [
            api("9f1c2d3e-1111-4222-8333-444455556666", "Flights"),
            api("0a1b2c3d-aaaa-4bbb-8ccc-ddddeeeeffff", "Payments Gateway"),
        ];
        let text = output(&records, &RenderOptions::new().with_title("APIs"))?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "APIs");
        assert_eq!(lines[1], "ID     NAME");
        assert_eq!(lines[2], "9f1c…  Flights");
        assert_eq!(lines[3], "0a1b…  Payments Gateway");
        Ok(())
    }

    #[test]
    fn static_table_respects_width_budget() -> Result<()> {
        let options = RenderOptions::new()
            .with_table(strings(&["NAME", "DESCRIPTION"]), vec![strings(&[
                "Flights",
                "Schedules and fares for every carrier we partner with",
            ])])
            .with_max_width(30);
        let text = output(&[], &options)?;
        for line in text.lines() {
            assert!(line.chars().count() <= 30, "line too wide: {line:?}");
        }
        assert!(text.contains('…'));
        Ok(())
    }

    #[test]
    fn empty_data_prints_message_under_title() -> Result<()> {
        let text = output(&[], &RenderOptions::new().with_title("Portals"))?;
        assert_eq!(text, format!("Portals\n{NO_DATA_MESSAGE}\n"));
        assert_eq!(output(&[], &RenderOptions::new())?, format!("{NO_DATA_MESSAGE}\n"));
        Ok(())
    }

    #[test]
    fn static_output_appends_sanitized_preview() -> Result<()> {
        let record = sample_api_record();
        let context = record.clone();
        let options = RenderOptions::new()
            .with_detail_renderer(|_| sample_api_detail())
            .with_detail_context("api", move |_| Some(context.clone()));
        let text = output(&[record], &options)?;
        let (_, preview) = text
            .split_once("\n\n")
            .expect("preview separated by a blank line");
        assert!(preview.contains("id:"));
        assert!(!preview.contains("{...}"));
        Ok(())
    }

    #[test]
    fn static_output_previews_only_the_first_row() -> Result<()> {
        let records = vec![api("a1", "flights"), api("b2", "hotels")];
        let options = RenderOptions::new().with_detail_renderer(|index| format!("row: {index}"));
        let text = output(&records, &options)?;
        let (table, preview) = text
            .split_once("\n\n")
            .expect("preview separated by a blank line");
        assert!(table.contains("hotels"));
        assert_eq!(preview.trim_end(), "row: 0");
        Ok(())
    }

    #[test]
    fn json_and_yaml_serialize_the_raw_payload() -> Result<()> {
        let raw = json!([{ "id": "c2a0", "name": "Flights" }]);
        let records = [api("c2a0", "Flights")];

        let mut out = Vec::new();
        dispatch(false, false, OutputFormat::Json, &mut out, &records, &raw, "APIs", RenderOptions::new())?;
        let parsed: serde_json::Value = serde_json::from_slice(&out)?;
        assert_eq!(parsed, raw);

        let mut out = Vec::new();
        dispatch(false, false, OutputFormat::Yaml, &mut out, &records, &raw, "APIs", RenderOptions::new())?;
        let text = String::from_utf8(out)?;
        assert!(text.contains("name: Flights"));
        Ok(())
    }

    #[test]
    fn serialization_failures_surface_as_nav_errors() {
        struct Broken;
        impl serde::Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot encode"))
            }
        }

        let mut out = Vec::new();
        let error = dispatch(
            false,
            false,
            OutputFormat::Json,
            &mut out,
            &[],
            &Broken,
            "APIs",
            RenderOptions::new(),
        )
        .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<NavError>(),
            Some(NavError::Serialize { .. })
        ));
    }

    #[test]
    fn interactive_without_terminal_falls_back_to_text() -> Result<()> {
        let raw = json!([]);
        let records = [api("c2a0", "Flights")];
        let mut out = Vec::new();
        dispatch(true, false, OutputFormat::Json, &mut out, &records, &raw, "APIs", RenderOptions::new())?;
        let text = String::from_utf8(out)?;
        assert!(text.starts_with("ID"));
        assert!(text.contains("Flights"));
        Ok(())
    }

    #[test]
    fn nav_config_prefers_explicit_root_label() {
        let options = RenderOptions::new()
            .with_root_label("Catalog")
            .with_initial_row(1, true);
        let table = recnav_app::RecordTable {
            headers: strings(&["NAME"]),
            rows: vec![strings(&["a"]), strings(&["b"])],
        };
        let config = options.nav_config(table.clone(), "APIs");
        assert_eq!(config.root_label, "Catalog");
        assert_eq!(config.initial_row, Some(1));
        assert!(config.open_initial);

        let config = RenderOptions::new().nav_config(table, "APIs");
        assert_eq!(config.root_label, "APIs");
    }
}
