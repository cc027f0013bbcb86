//! Stateless HTTP request builder and response parser for the condense API.
//!
//! # Design
//! `CondenseClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The round-trip in between belongs to a `Transport`, which
//! keeps this module deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, CONTENT_TYPE, REQUESTED_WITH};
use crate::types::{CloudStorage, GlobalConfig, GlobalConfigUpdate, Metric, StorageType};

/// Synchronous, stateless client for the condense API.
#[derive(Debug, Clone)]
pub struct CondenseClient {
    base_url: String,
}

impl CondenseClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request for `path` under the base URL.
    ///
    /// `headers` are merged with the fixed `Content-Type` and
    /// `X-Requested-With` headers; on a name clash (case-insensitive) the
    /// fixed value wins.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        headers: Vec<(String, String)>,
    ) -> HttpRequest {
        let fixed = [CONTENT_TYPE, REQUESTED_WITH];
        let mut merged: Vec<(String, String)> = headers
            .into_iter()
            .filter(|(name, _)| !fixed.iter().any(|(f, _)| f.eq_ignore_ascii_case(name)))
            .collect();
        merged.extend(fixed.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: merged,
            body,
        }
    }

    fn get(&self, path: &str) -> HttpRequest {
        self.build_request(HttpMethod::Get, path, None, Vec::new())
    }

    fn with_json<T: Serialize>(&self, method: HttpMethod, path: &str, input: &T) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.build_request(method, path, Some(body), Vec::new()))
    }

    pub fn build_get_all_cloud_storages(&self) -> HttpRequest {
        self.get("/cloud-storage")
    }

    pub fn build_add_cloud_storage(&self, storage: &CloudStorage) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, "/cloud-storage", storage)
    }

    pub fn build_get_cloud_storage_types(&self) -> HttpRequest {
        self.get("/cloud-storage/types")
    }

    pub fn build_delete_cloud_storage(&self, id: u64) -> HttpRequest {
        self.build_request(HttpMethod::Delete, &format!("/cloud-storage/{id}"), None, Vec::new())
    }

    pub fn build_condense_cloud_storage(&self, id: u64) -> HttpRequest {
        self.build_request(
            HttpMethod::Post,
            &format!("/cloud-storage/{id}/condense"),
            None,
            Vec::new(),
        )
    }

    pub fn build_get_global_config(&self) -> HttpRequest {
        self.get("/global-config")
    }

    pub fn build_update_global_config(&self, update: &GlobalConfigUpdate) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Put, "/global-config", update)
    }

    pub fn build_get_metric(&self) -> HttpRequest {
        self.get("/metric")
    }

    pub fn parse_get_all_cloud_storages(&self, response: HttpResponse) -> Result<Vec<CloudStorage>, ApiError> {
        parse_json(response)
    }

    pub fn parse_add_cloud_storage(&self, response: HttpResponse) -> Result<CloudStorage, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_cloud_storage_types(&self, response: HttpResponse) -> Result<Vec<StorageType>, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete_cloud_storage(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_condense_cloud_storage(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_get_global_config(&self, response: HttpResponse) -> Result<GlobalConfig, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_global_config(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_get_metric(&self, response: HttpResponse) -> Result<Metric, ApiError> {
        parse_json(response)
    }
}

/// Map any status outside 2xx to `ApiError::Server` carrying the raw body.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    tracing::warn!(status = response.status, "condense backend rejected request");
    Err(ApiError::Server {
        status: response.status,
        body: response.body.clone(),
    })
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
