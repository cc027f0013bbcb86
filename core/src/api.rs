//! Async facade over `CondenseClient` and a `Transport`.
//!
//! Each method builds the request, awaits the transport, and parses the
//! response. Calls share no mutable state, so independent calls may run
//! concurrently in any order.

use crate::client::CondenseClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{CloudStorage, GlobalConfig, GlobalConfigUpdate, Metric, StorageType};

#[derive(Debug, Clone)]
pub struct CondenseApi<T = ReqwestTransport> {
    client: CondenseClient,
    transport: T,
}

impl CondenseApi<ReqwestTransport> {
    /// API over a fresh `reqwest` connection pool.
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: Transport> CondenseApi<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: CondenseClient::from_config(config),
            transport,
        }
    }

    pub fn client(&self) -> &CondenseClient {
        &self.client
    }

    pub async fn get_all_cloud_storages(&self) -> Result<Vec<CloudStorage>, ApiError> {
        let response = self.transport.execute(self.client.build_get_all_cloud_storages()).await?;
        self.client.parse_get_all_cloud_storages(response)
    }

    /// Create a storage entry. The returned value carries the server-assigned id.
    pub async fn add_cloud_storage(&self, storage: &CloudStorage) -> Result<CloudStorage, ApiError> {
        let request = self.client.build_add_cloud_storage(storage)?;
        let response = self.transport.execute(request).await?;
        let created = self.client.parse_add_cloud_storage(response)?;
        tracing::info!(id = ?created.id, name = %created.name, "cloud storage added");
        Ok(created)
    }

    pub async fn get_cloud_storage_types(&self) -> Result<Vec<StorageType>, ApiError> {
        let response = self.transport.execute(self.client.build_get_cloud_storage_types()).await?;
        self.client.parse_get_cloud_storage_types(response)
    }

    pub async fn delete_cloud_storage(&self, id: u64) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_cloud_storage(id)).await?;
        self.client.parse_delete_cloud_storage(response)?;
        tracing::info!(id, "cloud storage deleted");
        Ok(())
    }

    /// Ask the backend to condense storage `id`. Returns once the backend
    /// has accepted the request.
    pub async fn condense_cloud_storage(&self, id: u64) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_condense_cloud_storage(id)).await?;
        self.client.parse_condense_cloud_storage(response)?;
        tracing::info!(id, "condense triggered");
        Ok(())
    }

    pub async fn get_global_config(&self) -> Result<GlobalConfig, ApiError> {
        let response = self.transport.execute(self.client.build_get_global_config()).await?;
        self.client.parse_get_global_config(response)
    }

    pub async fn update_global_config(&self, update: &GlobalConfigUpdate) -> Result<(), ApiError> {
        let request = self.client.build_update_global_config(update)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_global_config(response)
    }

    pub async fn get_metric(&self) -> Result<Metric, ApiError> {
        let response = self.transport.execute(self.client.build_get_metric()).await?;
        self.client.parse_get_metric(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Records every request and answers each with the same canned response.
    #[derive(Clone)]
    struct Recording {
        status: u16,
        body: String,
        seen: Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl Recording {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn last(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for Recording {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        }
    }

    fn api(transport: Recording) -> CondenseApi<Recording> {
        CondenseApi::with_transport(&ClientConfig::new("http://backend"), transport)
    }

    #[tokio::test]
    async fn list_returns_parsed_body() {
        let transport = Recording::new(200, r#"[{"id":1,"name":"s3","type":"S3","username":"u"}]"#);
        let storages = api(transport.clone()).get_all_cloud_storages().await.unwrap();

        assert_eq!(storages.len(), 1);
        assert_eq!(
            serde_json::to_value(&storages[0]).unwrap(),
            serde_json::json!({"id": 1, "name": "s3", "type": "S3", "username": "u"})
        );
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://backend/cloud-storage");
    }

    #[tokio::test]
    async fn add_posts_input_as_json() {
        let transport = Recording::new(201, r#"{"id":5,"name":"nas","type":"FTP","url":"ftp://nas","username":"bob"}"#);
        let input = CloudStorage {
            id: None,
            name: "nas".to_string(),
            storage_type: "FTP".to_string(),
            url: Some("ftp://nas".to_string()),
            username: "bob".to_string(),
            password: Some("hunter2".to_string()),
        };
        let created = api(transport.clone()).add_cloud_storage(&input).await.unwrap();

        assert_eq!(created.id, Some(5));
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        let sent: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, serde_json::to_value(&input).unwrap());
    }

    #[tokio::test]
    async fn delete_targets_literal_id() {
        let transport = Recording::new(204, "");
        api(transport.clone()).delete_cloud_storage(1234).await.unwrap();

        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.url.contains("1234"));
    }

    #[tokio::test]
    async fn condense_posts_to_condense_path() {
        let transport = Recording::new(204, "");
        api(transport.clone()).condense_cloud_storage(3).await.unwrap();
        assert_eq!(transport.last().url, "http://backend/cloud-storage/3/condense");
    }

    #[tokio::test]
    async fn legacy_string_types_are_accepted() {
        let transport = Recording::new(200, r#"["S3","DROPBOX"]"#);
        let types = api(transport).get_cloud_storage_types().await.unwrap();
        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["S3", "DROPBOX"]);
    }

    #[tokio::test]
    async fn global_config_and_metric_round_trip() {
        let config = api(Recording::new(200, r#"{"scheduleRate":3600,"condenseAge":30}"#))
            .get_global_config()
            .await
            .unwrap();
        assert_eq!(
            config,
            GlobalConfig {
                schedule_rate: 3600,
                condense_age: 30
            }
        );

        let metric = api(Recording::new(200, r#"{"diskSpaceSaved":1048576}"#))
            .get_metric()
            .await
            .unwrap();
        assert_eq!(metric.disk_space_saved, 1_048_576);

        let transport = Recording::new(204, "");
        let update = GlobalConfigUpdate {
            schedule_rate: None,
            condense_age: Some(14),
        };
        api(transport.clone()).update_global_config(&update).await.unwrap();
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.body.as_deref(), Some(r#"{"condenseAge":14}"#));
    }

    #[tokio::test]
    async fn every_operation_surfaces_server_body() {
        let api = api(Recording::new(500, "boom"));
        let storage = CloudStorage {
            id: None,
            name: "x".to_string(),
            storage_type: "S3".to_string(),
            url: None,
            username: "u".to_string(),
            password: None,
        };

        let errors = vec![
            api.get_all_cloud_storages().await.unwrap_err(),
            api.add_cloud_storage(&storage).await.unwrap_err(),
            api.get_cloud_storage_types().await.unwrap_err(),
            api.delete_cloud_storage(1).await.unwrap_err(),
            api.condense_cloud_storage(1).await.unwrap_err(),
            api.get_global_config().await.unwrap_err(),
            api.update_global_config(&GlobalConfigUpdate::default()).await.unwrap_err(),
            api.get_metric().await.unwrap_err(),
        ];
        for err in errors {
            assert_eq!(err.status(), Some(500));
            assert!(err.to_string().contains("boom"), "{err}");
        }
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let api = CondenseApi::with_transport(&ClientConfig::default(), Unreachable);
        let err = api.get_metric().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
