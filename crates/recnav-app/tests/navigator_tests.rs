// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use recnav_app::{
    ChildLoaderRegistry, ChildView, DetailItem, NavCommand, NavConfig, NavEffect, Navigator,
    RecordRef, StatusKind, record_from_serialize, render_record_detail, table_from_records,
};
use serde_json::json;
use std::sync::Arc;

fn services() -> Result<Vec<RecordRef>> {
    Ok(vec![
        record_from_serialize(&json!({
            "id": "svc-1",
            "name": "billing",
            "tags": ["payments", "internal"],
            "owner": {"team": "core", "oncall": "ana"},
            "retries": 3,
        }))?,
        record_from_serialize(&json!({
            "id": "svc-2",
            "name": "search",
            "tags": [],
            "owner": null,
            "retries": 5,
        }))?,
    ])
}

fn registry() -> Arc<ChildLoaderRegistry> {
    let registry = ChildLoaderRegistry::shared();
    registry.register("service", "routes", |_, parent| {
        let parent = parent.ok_or_else(|| anyhow!("routes need a parent service"))?;
        let service = parent.record_id().unwrap_or_default();
        Ok(ChildView::list(
            "Routes",
            vec!["NAME".to_owned(), "SERVICE".to_owned()],
            vec![
                vec!["checkout".to_owned(), service.clone()],
                vec!["refunds".to_owned(), service],
            ],
        ))
    });
    registry
}

fn navigator(records: Vec<RecordRef>) -> Navigator {
    let table = table_from_records(records.iter().map(|record| record.as_ref()));
    let records = Arc::new(records);
    let render_records = Arc::clone(&records);
    let config = NavConfig::new(table.headers, table.rows)
        .with_root_label("Gateway")
        .with_detail_renderer(move |index| {
            render_records
                .get(index)
                .map(|record| render_record_detail(record.as_ref()))
                .unwrap_or_default()
        })
        .with_detail_context("service", move |index| records.get(index).cloned())
        .with_registry(registry());
    Navigator::new(config)
}

fn item_index(navigator: &Navigator, label: &str) -> Result<usize> {
    navigator
        .top_frame()
        .and_then(|frame| frame.items())
        .and_then(|items| items.iter().position(|item| item.label == label))
        .ok_or_else(|| anyhow!("no {label} item in the top frame"))
}

fn open_in_background(navigator: &mut Navigator) -> Result<bool> {
    match navigator.handle(NavCommand::Activate) {
        NavEffect::Load(job) => Ok(navigator.apply(job.run())),
        other => Err(anyhow!("expected a load, got {other:?}")),
    }
}

#[test]
fn records_become_a_table_in_field_order() -> Result<()> {
    let records = services()?;
    let table = table_from_records(records.iter().map(|record| record.as_ref()));
    assert_eq!(table.headers.len(), 5);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][0], "svc-1");
    assert_eq!(table.rows[1][1], "search");
    Ok(())
}

#[test]
fn card_marks_complex_and_registered_fields_as_drillable() -> Result<()> {
    let mut navigator = navigator(services()?);
    assert!(matches!(navigator.handle(NavCommand::Activate), NavEffect::None));
    assert_eq!(navigator.depth(), 1);
    assert_eq!(navigator.breadcrumbs(), ["Gateway", "billing"]);

    let items: Vec<DetailItem> = navigator
        .top_frame()
        .and_then(|frame| frame.items())
        .map(<[DetailItem]>::to_vec)
        .ok_or_else(|| anyhow!("expected a detail card"))?;
    let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels[..2], ["id", "name"]);
    for drillable in ["owner", "routes", "tags"] {
        let item = &items[item_index(&navigator, drillable)?];
        assert!(item.has_loader(), "{drillable} should open a child view");
    }
    let retries = &items[item_index(&navigator, "retries")?];
    assert!(!retries.has_loader());
    assert_eq!(retries.value, "3");
    Ok(())
}

#[test]
fn registered_loader_receives_the_card_record() -> Result<()> {
    let mut navigator = navigator(services()?);
    navigator.handle(NavCommand::Activate);
    navigator.select(item_index(&navigator, "routes")?)?;

    assert!(open_in_background(&mut navigator)?);
    assert_eq!(navigator.depth(), 2);
    assert_eq!(navigator.breadcrumbs().last().map(String::as_str), Some("Routes"));
    let list = navigator
        .top_frame()
        .and_then(|frame| frame.list())
        .ok_or_else(|| anyhow!("expected a list frame"))?;
    assert_eq!(list.rows()[0], ["checkout", "svc-1"]);
    assert!(
        navigator
            .status()
            .is_some_and(|status| status.kind == StatusKind::Info)
    );

    navigator.handle(NavCommand::Back);
    assert_eq!(navigator.depth(), 1);
    assert_eq!(navigator.breadcrumbs(), ["Gateway", "billing"]);
    Ok(())
}

#[test]
fn sequence_fields_open_as_numbered_rows() -> Result<()> {
    let mut navigator = navigator(services()?);
    navigator.handle(NavCommand::Activate);
    navigator.select(item_index(&navigator, "tags")?)?;

    assert!(open_in_background(&mut navigator)?);
    let list = navigator
        .top_frame()
        .and_then(|frame| frame.list())
        .ok_or_else(|| anyhow!("expected a list frame"))?;
    assert_eq!(list.headers(), ["#", "VALUE"]);
    assert_eq!(list.rows().len(), 2);
    Ok(())
}

#[test]
fn result_arriving_after_back_is_discarded() -> Result<()> {
    let mut navigator = navigator(services()?);
    navigator.handle(NavCommand::Activate);
    navigator.select(item_index(&navigator, "routes")?)?;

    let NavEffect::Load(job) = navigator.handle(NavCommand::Activate) else {
        return Err(anyhow!("expected a load"));
    };
    assert!(navigator.pending().is_some());
    navigator.handle(NavCommand::Back);
    assert!(navigator.pending().is_none());

    assert!(!navigator.apply(job.run()));
    assert!(navigator.depth() <= 1);
    assert!(
        navigator
            .breadcrumbs()
            .iter()
            .all(|segment| segment != "Routes")
    );
    Ok(())
}

#[test]
fn root_preview_leaves_out_drillable_fields() -> Result<()> {
    let navigator = navigator(services()?);
    let preview = navigator
        .preview()
        .ok_or_else(|| anyhow!("expected a preview"))?;
    assert!(preview.contains("billing"));
    assert!(preview.contains("retries"));
    assert!(!preview.contains("routes"));
    assert!(!preview.contains("[...]"));
    Ok(())
}

fn checkout() -> Result<Vec<RecordRef>> {
    Ok(vec![record_from_serialize(&json!({
        "id": "svc-3",
        "name": "checkout",
        "endpoints": [
            {"host": "a.internal", "port": 443, "health": {"path": "/status", "interval": "10s"}},
            {"host": "b.internal", "port": 80, "health": {"path": "/ping", "interval": "5s"}},
        ],
    }))?])
}

fn assert_trail(navigator: &Navigator, expected: &[&str]) {
    assert_eq!(navigator.breadcrumbs(), expected);
    assert_eq!(navigator.depth(), expected.len() - 1);
}

#[test]
fn nested_opens_unwind_one_level_per_back() -> Result<()> {
    let mut navigator = navigator(checkout()?);
    assert_trail(&navigator, &["Gateway"]);

    assert!(matches!(navigator.handle(NavCommand::Activate), NavEffect::None));
    assert_trail(&navigator, &["Gateway", "checkout"]);

    navigator.select(item_index(&navigator, "endpoints")?)?;
    assert!(open_in_background(&mut navigator)?);
    assert_trail(&navigator, &["Gateway", "checkout", "Endpoints"]);
    let list = navigator
        .top_frame()
        .and_then(|frame| frame.list())
        .ok_or_else(|| anyhow!("expected the endpoints table"))?;
    assert_eq!(list.headers(), ["HOST", "PORT", "HEALTH"]);
    assert_eq!(list.rows().len(), 2);

    assert!(matches!(navigator.handle(NavCommand::Activate), NavEffect::None));
    assert_trail(&navigator, &["Gateway", "checkout", "Endpoints", "a.internal"]);

    navigator.select(item_index(&navigator, "health")?)?;
    assert!(open_in_background(&mut navigator)?);
    assert_trail(
        &navigator,
        &["Gateway", "checkout", "Endpoints", "a.internal", "Health"],
    );
    let path = navigator
        .top_frame()
        .and_then(|frame| frame.items())
        .and_then(|items| items.iter().find(|item| item.label == "path"))
        .map(|item| item.value.clone());
    assert_eq!(path.as_deref(), Some("/status"));

    navigator.handle(NavCommand::Back);
    assert_trail(&navigator, &["Gateway", "checkout", "Endpoints", "a.internal"]);
    navigator.handle(NavCommand::Back);
    assert_trail(&navigator, &["Gateway", "checkout", "Endpoints"]);
    navigator.handle(NavCommand::Back);
    assert_trail(&navigator, &["Gateway", "checkout"]);
    navigator.handle(NavCommand::Back);
    assert_trail(&navigator, &["Gateway"]);
    assert!(!navigator.can_go_back());
    Ok(())
}
