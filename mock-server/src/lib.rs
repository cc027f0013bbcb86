use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// Space credited to the metric for every accepted condense request.
pub const CONDENSE_SAVINGS: u64 = 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudStorage {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub storage_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCloudStorage {
    pub name: String,
    #[serde(rename = "type")]
    pub storage_type: String,
    pub url: Option<String>,
    pub username: String,
    pub password: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageType {
    #[serde(rename = "type")]
    pub name: String,
    pub url_required: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    pub schedule_rate: u64,
    pub condense_age: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfigUpdate {
    pub schedule_rate: Option<u64>,
    pub condense_age: Option<u64>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub disk_space_saved: u64,
}

/// In-memory state behind every route.
pub struct Backend {
    storages: BTreeMap<u64, CloudStorage>,
    next_id: u64,
    types: Vec<StorageType>,
    config: GlobalConfig,
    metric: Metric,
}

impl Default for Backend {
    fn default() -> Self {
        let types = [("S3", true), ("FTP", true), ("DROPBOX", false), ("GOOGLE_DRIVE", false)]
            .into_iter()
            .map(|(name, url_required)| StorageType {
                name: name.to_string(),
                url_required,
            })
            .collect();
        Self {
            storages: BTreeMap::new(),
            next_id: 1,
            types,
            config: GlobalConfig {
                schedule_rate: 3600,
                condense_age: 30,
            },
            metric: Metric { disk_space_saved: 0 },
        }
    }
}

pub type Db = Arc<RwLock<Backend>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Backend::default()));
    Router::new()
        .route("/cloud-storage", get(list_storages).post(add_storage))
        .route("/cloud-storage/types", get(list_types))
        .route("/cloud-storage/{id}", delete(delete_storage))
        .route("/cloud-storage/{id}/condense", post(condense_storage))
        .route("/global-config", get(get_config).put(update_config))
        .route("/metric", get(get_metric))
        .layer(middleware::from_fn(require_xhr))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_xhr(headers: HeaderMap, request: Request, next: Next) -> Response {
    let is_xhr = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "XMLHttpRequest");
    if !is_xhr {
        return (StatusCode::BAD_REQUEST, "missing X-Requested-With header").into_response();
    }
    next.run(request).await
}

async fn list_storages(State(db): State<Db>) -> Json<Vec<CloudStorage>> {
    let backend = db.read().await;
    Json(backend.storages.values().cloned().collect())
}

async fn add_storage(
    State(db): State<Db>,
    Json(input): Json<NewCloudStorage>,
) -> Result<(StatusCode, Json<CloudStorage>), (StatusCode, String)> {
    let mut backend = db.write().await;
    let Some(kind) = backend.types.iter().find(|t| t.name == input.storage_type) else {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("unknown storage type {}", input.storage_type),
        ));
    };
    if kind.url_required && input.url.is_none() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("url is required for storage type {}", input.storage_type),
        ));
    }

    let storage = CloudStorage {
        id: backend.next_id,
        name: input.name,
        storage_type: input.storage_type,
        url: input.url,
        username: input.username,
        password: input.password,
    };
    backend.next_id += 1;
    backend.storages.insert(storage.id, storage.clone());
    tracing::info!(id = storage.id, "storage created");
    Ok((StatusCode::CREATED, Json(storage)))
}

async fn list_types(State(db): State<Db>) -> Json<Vec<StorageType>> {
    Json(db.read().await.types.clone())
}

async fn delete_storage(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut backend = db.write().await;
    backend
        .storages
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found(id))
}

async fn condense_storage(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut backend = db.write().await;
    if !backend.storages.contains_key(&id) {
        return Err(not_found(id));
    }
    backend.metric.disk_space_saved += CONDENSE_SAVINGS;
    tracing::debug!(id, "condensed");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_config(State(db): State<Db>) -> Json<GlobalConfig> {
    Json(db.read().await.config)
}

async fn update_config(State(db): State<Db>, Json(input): Json<GlobalConfigUpdate>) -> StatusCode {
    let mut backend = db.write().await;
    if let Some(rate) = input.schedule_rate {
        backend.config.schedule_rate = rate;
    }
    if let Some(age) = input.condense_age {
        backend.config.condense_age = age;
    }
    tracing::info!(config = ?backend.config, "global config updated");
    StatusCode::NO_CONTENT
}

async fn get_metric(State(db): State<Db>) -> Json<Metric> {
    Json(db.read().await.metric)
}

fn not_found(id: u64) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("no cloud storage with id {id}"))
}
