// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::child::{ChildLoader, ChildView, LoadContext};
use crate::header::normalize_header_key;
use crate::record::RecordRef;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Clone)]
pub struct ChildRegistration {
    /// Normalised field key, e.g. `consumer groups`. Used for matching only.
    pub field: String,
    /// The field name as registered, trimmed. Shown when the field is
    /// appended to a card.
    pub label: String,
    pub loader: ChildLoader,
}

impl fmt::Debug for ChildRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildRegistration")
            .field("field", &self.field)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Loaders for child collections that a record type exposes beyond its own
/// fields, keyed by `(parent_type, field)`.
///
/// Filled in once at start-up and then only read, so a read-mostly lock is
/// enough. Share it as `Arc<ChildLoaderRegistry>`.
#[derive(Default)]
pub struct ChildLoaderRegistry {
    entries: RwLock<BTreeMap<(String, String), ChildRegistration>>,
}

impl ChildLoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn register<F>(&self, parent_type: &str, field: &str, loader: F)
    where
        F: Fn(&LoadContext, Option<RecordRef>) -> Result<ChildView> + Send + Sync + 'static,
    {
        let parent_key = normalize_parent_type(parent_type);
        let field_key = normalize_header_key(field);
        if parent_key.is_empty() || field_key.is_empty() {
            tracing::warn!(parent_type, field, "ignoring child loader with empty key");
            return;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let registration = ChildRegistration {
            field: field_key.clone(),
            label: field.trim().to_owned(),
            loader: Arc::new(loader),
        };
        if entries
            .insert((parent_key.clone(), field_key.clone()), registration)
            .is_some()
        {
            tracing::warn!(parent = %parent_key, field = %field_key, "replaced child loader");
        }
    }

    pub fn lookup(&self, parent_type: &str, field: &str) -> Option<ChildLoader> {
        let key = (normalize_parent_type(parent_type), normalize_header_key(field));
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&key).map(|registration| Arc::clone(&registration.loader))
    }

    /// Registrations for `parent_type`, ordered by field key.
    pub fn fields_for(&self, parent_type: &str) -> Vec<ChildRegistration> {
        let parent_key = normalize_parent_type(parent_type);
        if parent_key.is_empty() {
            return Vec::new();
        }
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .filter(|((parent, _), _)| *parent == parent_key)
            .map(|(_, registration)| registration.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ChildLoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_list().entries(entries.keys()).finish()
    }
}

fn normalize_parent_type(parent_type: &str) -> String {
    normalize_header_key(parent_type)
}
