// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    /// A loader or detail fetch failed. Carried back to the event loop and
    /// shown as a dismissible status; never fatal.
    #[error("unable to load {label}: {message}")]
    Load { label: String, message: String },

    /// The record does not describe its fields. Callers fall back to the raw
    /// text they already have.
    #[error("record for {parent_type:?} does not describe its fields")]
    IntrospectionMismatch { parent_type: String },

    #[error("row {index} is out of range ({len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("serialize output as {format}")]
    Serialize {
        format: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl NavError {
    pub fn load(label: impl Into<String>, error: &anyhow::Error) -> Self {
        Self::Load {
            label: label.into(),
            message: format!("{error:#}"),
        }
    }

    pub fn serialize(
        format: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Serialize {
            format,
            source: source.into(),
        }
    }
}
