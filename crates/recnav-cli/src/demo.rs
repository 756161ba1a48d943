// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Serialize;
use std::collections::BTreeMap;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const API_NAMES: [&str; 12] = [
    "Flights",
    "Bookings",
    "Loyalty",
    "Payments",
    "Inventory",
    "Notifications",
    "Search",
    "Pricing",
    "Baggage",
    "Check-in",
    "Crew",
    "Weather",
];

const API_VERSIONS: [&str; 5] = ["v1", "v2", "v2.1", "2025-01", "beta"];

const LABEL_KEYS: [&str; 5] = ["env", "team", "tier", "region", "owner"];
const LABEL_VALUES: [&str; 10] = [
    "prod", "staging", "dev", "payments", "platform", "gold", "silver", "eu", "us", "core",
];

const DOCUMENT_TITLES: [&str; 8] = [
    "Overview",
    "Getting started",
    "Authentication",
    "Rate limits",
    "Errors",
    "Changelog",
    "Webhooks",
    "Pagination",
];

const CONTROL_PLANE_NAMES: [&str; 8] = [
    "default",
    "payments-prod",
    "payments-staging",
    "edge-eu",
    "edge-us",
    "internal-tools",
    "partner-gateway",
    "sandbox",
];
const CLUSTER_TYPES: [&str; 3] = [
    "CLUSTER_TYPE_HYBRID",
    "CLUSTER_TYPE_SERVERLESS",
    "CLUSTER_TYPE_K8S_INGRESS_CONTROLLER",
];

const UPSTREAM_SERVICES: [&str; 10] = [
    "flights", "bookings", "loyalty", "payments", "inventory", "search", "pricing", "crew",
    "weather", "baggage",
];
const BALANCER_ALGORITHMS: [&str; 4] = [
    "round-robin",
    "consistent-hashing",
    "least-connections",
    "latency",
];

const PORTAL_NAMES: [&str; 6] = [
    "Developer Portal",
    "Partner Hub",
    "Internal Docs",
    "Public APIs",
    "Sandbox Portal",
    "Airline Partners",
];

const DESCRIPTION_WORDS: [&str; 24] = [
    "manage",
    "search",
    "retrieve",
    "update",
    "bookings",
    "flights",
    "customers",
    "loyalty",
    "points",
    "partners",
    "schedules",
    "payments",
    "refunds",
    "inventory",
    "seats",
    "routes",
    "airports",
    "fares",
    "notifications",
    "events",
    "securely",
    "quickly",
    "reliably",
    "programmatically",
];

/// Timestamps are generated relative to this instant so seeded runs stay
/// identical from one day to the next.
const REFERENCE_NOW: OffsetDateTime = datetime!(2026-01-01 0:00 UTC);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Api {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub version: Option<String>,
    pub description: String,
    pub labels: BTreeMap<String, String>,
    pub portals: Vec<String>,
    pub deprecated: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Summary row for a document, as returned by a list call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiDocumentSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiDocument {
    pub id: String,
    pub api_id: String,
    pub title: String,
    pub slug: String,
    pub status: String,
    pub content: String,
    pub updated_at: String,
}

impl ApiDocument {
    pub fn summary(&self) -> ApiDocumentSummary {
        ApiDocumentSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            slug: self.slug.clone(),
            status: self.status.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlPlane {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cluster_type: String,
    pub control_plane_endpoint: String,
    pub labels: BTreeMap<String, String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Upstream {
    pub id: String,
    pub control_plane_id: String,
    pub name: String,
    pub algorithm: String,
    pub slots: u32,
    pub healthchecks: BTreeMap<String, String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub id: String,
    pub upstream_id: String,
    pub target: String,
    pub weight: u32,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Portal {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub custom_domain: Option<String>,
    pub authentication_enabled: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Deterministic generator for demo catalog resources. The same seed always
/// yields the same sequence of records.
#[derive(Debug, Clone)]
pub struct CatalogFaker {
    rng: DeterministicRng,
}

impl CatalogFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn api(&mut self) -> Api {
        let name = self.pick(&API_NAMES).to_owned();
        let created = self.random_datetime_between(
            REFERENCE_NOW - Duration::days(730),
            REFERENCE_NOW - Duration::days(30),
        );
        let updated = self.random_datetime_between(created, REFERENCE_NOW);
        let version = if self.int_range(1, 10) <= 7 {
            Some(self.pick(&API_VERSIONS).to_owned())
        } else {
            None
        };
        Api {
            id: self.uuid(),
            slug: slugify(&name),
            name,
            version,
            description: self.sentence(6, 14),
            labels: self.labels(),
            portals: Vec::new(),
            deprecated: self.int_range(1, 10) == 1,
            created_at: format_timestamp(created),
            updated_at: format_timestamp(updated),
        }
    }

    pub fn api_document(&mut self, api: &Api) -> ApiDocument {
        let title = self.pick(&DOCUMENT_TITLES).to_owned();
        let status = if self.int_range(1, 10) <= 8 {
            "published"
        } else {
            "unpublished"
        };
        let content = format!(
            "# {title}\n\n{}\n\n{}",
            self.sentence(8, 16),
            self.sentence(8, 16)
        );
        let updated =
            self.random_datetime_between(REFERENCE_NOW - Duration::days(180), REFERENCE_NOW);
        ApiDocument {
            id: self.uuid(),
            api_id: api.id.clone(),
            slug: slugify(&title),
            title,
            status: status.to_owned(),
            content,
            updated_at: format_timestamp(updated),
        }
    }

    pub fn control_plane(&mut self) -> ControlPlane {
        let name = self.pick(&CONTROL_PLANE_NAMES).to_owned();
        let id = self.uuid();
        let prefix: String = id.chars().take(10).collect();
        let created =
            self.random_datetime_between(REFERENCE_NOW - Duration::days(900), REFERENCE_NOW);
        ControlPlane {
            control_plane_endpoint: format!("https://{prefix}.us.cp0.konghq.com"),
            id,
            name,
            description: self.sentence(4, 10),
            cluster_type: self.pick(&CLUSTER_TYPES).to_owned(),
            labels: self.labels(),
            created_at: format_timestamp(created),
        }
    }

    pub fn upstream(&mut self, control_plane: &ControlPlane) -> Upstream {
        let service = self.pick(&UPSTREAM_SERVICES);
        let mut healthchecks = BTreeMap::new();
        healthchecks.insert("active_type".to_owned(), "http".to_owned());
        healthchecks.insert(
            "healthy_interval".to_owned(),
            format!("{}s", self.int_range(5, 30)),
        );
        healthchecks.insert(
            "unhealthy_threshold".to_owned(),
            self.int_range(1, 5).to_string(),
        );
        let mut tags = vec![service.to_owned()];
        if self.rng.bool() {
            tags.push(self.pick(&LABEL_VALUES).to_owned());
        }
        Upstream {
            id: self.uuid(),
            control_plane_id: control_plane.id.clone(),
            name: format!("{service}.internal"),
            algorithm: self.pick(&BALANCER_ALGORITHMS).to_owned(),
            slots: 10_000,
            healthchecks,
            tags,
        }
    }

    pub fn target(&mut self, upstream: &Upstream) -> Target {
        Target {
            id: self.uuid(),
            upstream_id: upstream.id.clone(),
            target: format!(
                "10.{}.{}.{}:{}",
                self.int_range(0, 255),
                self.int_range(0, 255),
                self.int_range(1, 254),
                self.pick(&["80", "443", "8000", "8443"]),
            ),
            weight: self.int_range(0, 10) * 10,
            tags: Vec::new(),
        }
    }

    pub fn portal(&mut self) -> Portal {
        let display_name = self.pick(&PORTAL_NAMES).to_owned();
        let created =
            self.random_datetime_between(REFERENCE_NOW - Duration::days(400), REFERENCE_NOW);
        let custom_domain = if self.rng.bool() {
            Some(format!("{}.example.com", slugify(&display_name)))
        } else {
            None
        };
        Portal {
            id: self.uuid(),
            name: slugify(&display_name),
            display_name,
            custom_domain,
            authentication_enabled: self.rng.bool(),
            created_at: format_timestamp(created),
        }
    }

    /// Random lower-case hex id in the 8-4-4-4-12 layout.
    pub fn uuid(&mut self) -> String {
        let high = self.rng.next_u64();
        let low = self.rng.next_u64();
        let hex = format!("{high:016x}{low:016x}");
        format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }

    fn labels(&mut self) -> BTreeMap<String, String> {
        let count = self.int_range(0, 3) as usize;
        let mut labels = BTreeMap::new();
        for _ in 0..count {
            labels.insert(
                self.pick(&LABEL_KEYS).to_owned(),
                self.pick(&LABEL_VALUES).to_owned(),
            );
        }
        labels
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = u64::from(max - min) + 1;
        min + (self.rng.next_u64() % span) as u32
    }

    fn random_datetime_between(
        &mut self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> OffsetDateTime {
        let span = (end - start).whole_seconds();
        if span <= 0 {
            return start;
        }
        let offset = self.rng.next_u64() % (span as u64 + 1);
        start + Duration::seconds(offset as i64)
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        let count = self.int_range(min_words as u32, max_words as u32) as usize;
        let mut parts = Vec::with_capacity(count);
        for _ in 0..count {
            parts.push(self.pick(&DESCRIPTION_WORDS).to_owned());
        }
        let mut sentence = parts.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }
}

/// `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_timestamp(value: OffsetDateTime) -> String {
    let value = value.to_offset(time::UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        value.year(),
        u8::from(value.month()),
        value.day(),
        value.hour(),
        value.minute(),
        value.second()
    )
}

pub fn slugify(value: &str) -> String {
    value
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
