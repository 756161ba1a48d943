// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::demo::{
    Api, ApiDocument, ApiDocumentSummary, CatalogFaker, ControlPlane, Portal, Target, Upstream,
};
use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

pub const DEFAULT_SEED: u64 = 42;

const API_COUNT: usize = 8;
const CONTROL_PLANE_COUNT: usize = 3;
const PORTAL_COUNT: usize = 3;

/// In-memory stand-in for the remote API. Every list or get call sleeps for
/// the configured latency so loads behave like network round trips.
#[derive(Debug, Clone)]
pub struct Catalog {
    apis: Vec<Api>,
    documents: BTreeMap<String, Vec<ApiDocument>>,
    control_planes: Vec<ControlPlane>,
    upstreams: BTreeMap<String, Vec<Upstream>>,
    targets: BTreeMap<String, Vec<Target>>,
    portals: Vec<Portal>,
    latency: Duration,
}

impl Catalog {
    pub fn seeded(seed: u64, latency: Duration) -> Self {
        let mut faker = CatalogFaker::new(seed);

        let portals: Vec<Portal> = (0..PORTAL_COUNT).map(|_| faker.portal()).collect();

        let mut apis = Vec::with_capacity(API_COUNT);
        let mut documents = BTreeMap::new();
        for _ in 0..API_COUNT {
            let mut api = faker.api();
            for portal in &portals {
                if faker.int_n(2) == 0 {
                    api.portals.push(portal.id.clone());
                }
            }
            let count = 1 + faker.int_n(3);
            let docs = (0..count).map(|_| faker.api_document(&api)).collect();
            documents.insert(api.id.clone(), docs);
            apis.push(api);
        }

        let mut control_planes = Vec::with_capacity(CONTROL_PLANE_COUNT);
        let mut upstreams = BTreeMap::new();
        let mut targets = BTreeMap::new();
        for _ in 0..CONTROL_PLANE_COUNT {
            let control_plane = faker.control_plane();
            let count = 1 + faker.int_n(3);
            let mut plane_upstreams = Vec::with_capacity(count);
            for _ in 0..count {
                let upstream = faker.upstream(&control_plane);
                let target_count = 1 + faker.int_n(4);
                let upstream_targets = (0..target_count)
                    .map(|_| faker.target(&upstream))
                    .collect();
                targets.insert(upstream.id.clone(), upstream_targets);
                plane_upstreams.push(upstream);
            }
            upstreams.insert(control_plane.id.clone(), plane_upstreams);
            control_planes.push(control_plane);
        }

        Self {
            apis,
            documents,
            control_planes,
            upstreams,
            targets,
            portals,
            latency,
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn api_count(&self) -> usize {
        self.apis.len()
    }

    pub fn control_plane_count(&self) -> usize {
        self.control_planes.len()
    }

    pub fn portal_count(&self) -> usize {
        self.portals.len()
    }

    pub fn list_apis(&self) -> Vec<Api> {
        self.round_trip("list apis");
        self.apis.clone()
    }

    pub fn list_control_planes(&self) -> Vec<ControlPlane> {
        self.round_trip("list control planes");
        self.control_planes.clone()
    }

    pub fn list_portals(&self) -> Vec<Portal> {
        self.round_trip("list portals");
        self.portals.clone()
    }

    pub fn list_documents(&self, api_id: &str) -> Result<Vec<ApiDocumentSummary>> {
        self.round_trip("list api documents");
        let Some(documents) = self.documents.get(api_id) else {
            bail!("api {api_id} not found");
        };
        Ok(documents.iter().map(ApiDocument::summary).collect())
    }

    pub fn get_document(&self, api_id: &str, document_id: &str) -> Result<ApiDocument> {
        self.round_trip("get api document");
        let Some(documents) = self.documents.get(api_id) else {
            bail!("api {api_id} not found");
        };
        match documents.iter().find(|document| document.id == document_id) {
            Some(document) => Ok(document.clone()),
            None => bail!("document {document_id} not found for api {api_id}"),
        }
    }

    pub fn list_upstreams(&self, control_plane_id: &str) -> Result<Vec<Upstream>> {
        self.round_trip("list upstreams");
        match self.upstreams.get(control_plane_id) {
            Some(upstreams) => Ok(upstreams.clone()),
            None => bail!("control plane {control_plane_id} not found"),
        }
    }

    pub fn list_targets(&self, upstream_id: &str) -> Result<Vec<Target>> {
        self.round_trip("list targets");
        match self.targets.get(upstream_id) {
            Some(targets) => Ok(targets.clone()),
            None => bail!("upstream {upstream_id} not found"),
        }
    }

    /// APIs published to a portal.
    pub fn list_portal_apis(&self, portal_id: &str) -> Result<Vec<Api>> {
        self.round_trip("list portal apis");
        if !self.portals.iter().any(|portal| portal.id == portal_id) {
            bail!("portal {portal_id} not found");
        }
        Ok(self
            .apis
            .iter()
            .filter(|api| api.portals.iter().any(|id| id == portal_id))
            .cloned()
            .collect())
    }

    fn round_trip(&self, call: &str) {
        tracing::debug!(call, latency_ms = self.latency.as_millis() as u64, "catalog request");
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
    }
}
