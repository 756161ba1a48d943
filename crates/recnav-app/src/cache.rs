// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::record::RecordRef;
use std::collections::HashMap;
use std::sync::Arc;

/// Full detail records already fetched for rows of one list, keyed by record
/// id. Lives and dies with the list's frame.
#[derive(Default)]
pub struct DetailCache {
    records: HashMap<String, RecordRef>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<RecordRef> {
        self.records.get(id).map(Arc::clone)
    }

    pub fn insert(&mut self, id: impl Into<String>, record: RecordRef) {
        self.records.insert(id.into(), record);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl std::fmt::Debug for DetailCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&String> = self.records.keys().collect();
        ids.sort();
        f.debug_struct("DetailCache").field("ids", &ids).finish()
    }
}
