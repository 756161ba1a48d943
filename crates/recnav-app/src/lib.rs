// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod cache;
pub mod child;
pub mod detail;
pub mod error;
pub mod header;
pub mod layout;
pub mod nav;
pub mod record;
pub mod registry;
pub mod search;

pub use cache::*;
pub use child::*;
pub use detail::*;
pub use error::*;
pub use header::*;
pub use layout::*;
pub use nav::*;
pub use record::*;
pub use registry::*;
pub use search::*;
