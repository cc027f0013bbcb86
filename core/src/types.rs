//! Domain DTOs for the condense API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. JSON field
//! names are camelCase; optional fields are omitted rather than sent as
//! `null`.

use serde::{Deserialize, Serialize};

/// A configured remote storage backend.
///
/// `id` is assigned by the server, so it is `None` when creating an entry and
/// is left out of the request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudStorage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(rename = "type")]
    pub storage_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// A storage type the backend supports.
///
/// Older backends list types as bare strings; those decode with
/// `url_required == false`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "StorageTypeRepr")]
#[serde(rename_all = "camelCase")]
pub struct StorageType {
    #[serde(rename = "type")]
    pub name: String,
    pub url_required: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StorageTypeRepr {
    Name(String),
    #[serde(rename_all = "camelCase")]
    Object {
        #[serde(rename = "type")]
        name: String,
        #[serde(default)]
        url_required: bool,
    },
}

impl From<StorageTypeRepr> for StorageType {
    fn from(repr: StorageTypeRepr) -> Self {
        match repr {
            StorageTypeRepr::Name(name) => StorageType {
                name,
                url_required: false,
            },
            StorageTypeRepr::Object { name, url_required } => StorageType { name, url_required },
        }
    }
}

/// Server-wide settings controlling condense scheduling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    pub schedule_rate: u64,
    pub condense_age: u64,
}

/// Partial update of `GlobalConfig`. Only the fields present in the JSON are
/// applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_rate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condense_age: Option<u64>,
}

/// Cumulative disk space saved by condensing, in bytes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub disk_space_saved: u64,
}
