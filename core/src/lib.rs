//! Async API client core for the cloud storage condensing service.
//!
//! # Overview
//! `CondenseClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network. `CondenseApi` pairs it with a
//! `Transport` to expose one `async fn` per backend endpoint.
//!
//! # Design
//! - `CondenseClient` is stateless and holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `Transport` is the only seam that performs I/O; `ReqwestTransport` is
//!   the production implementation.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::CondenseApi;
pub use client::CondenseClient;
pub use config::{ClientConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{CloudStorage, GlobalConfig, GlobalConfigUpdate, Metric, StorageType};
