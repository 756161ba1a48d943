// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use recnav_app::{FieldValue, MappingRecord, NavCommand, NavEffect, Navigator, RecordRef};
use std::path::PathBuf;
use std::sync::Arc;

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19 12:34:56"
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

/// An API-shaped record with one field of every kind the navigator treats
/// differently.
pub fn sample_api_record() -> RecordRef {
    Arc::new(MappingRecord::new(vec![
        ("ID".to_owned(), "9f5061ce-78f6-4452-9108-ad7c02821fd5".into()),
        ("Name".to_owned(), "Flights".into()),
        ("Labels".to_owned(), FieldValue::mapping([("env", "prod")])),
        ("Portals".to_owned(), FieldValue::sequence(["portal-a", "portal-b"])),
        ("Description".to_owned(), "Search and book flights".into()),
        ("Deprecated".to_owned(), FieldValue::Null),
        ("LocalUpdatedTime".to_owned(), fixture_datetime().into()),
    ]))
}

/// Detail text matching [`sample_api_record`], as a resource module would
/// render it before enrichment.
pub fn sample_api_detail() -> String {
    [
        "id: 9f5061ce-78f6-4452-9108-ad7c02821fd5",
        "name: Flights",
        "labels: env: prod",
        "portals: [portal-a, portal-b]",
        "description: Search and book flights",
        "deprecated:",
        "local_updated_time: 2026-02-19 12:34:56",
    ]
    .join("\n")
}

/// Runs a load job on the calling thread and applies its outcome. Returns
/// whether the navigator accepted the result; effects without a job are
/// reported as not applied.
pub fn settle(navigator: &mut Navigator, effect: NavEffect) -> bool {
    match effect {
        NavEffect::Load(job) => navigator.apply(job.run()),
        NavEffect::None | NavEffect::Quit => false,
    }
}

/// Sends each command in turn, settling any load it starts before the next.
pub fn drive(navigator: &mut Navigator, commands: &[NavCommand]) {
    for command in commands {
        let effect = navigator.handle(*command);
        settle(navigator, effect);
    }
}

/// Applies the configured auto-open, if any.
pub fn boot(navigator: &mut Navigator) -> bool {
    match navigator.init() {
        Some(job) => navigator.apply(job.run()),
        None => false,
    }
}
