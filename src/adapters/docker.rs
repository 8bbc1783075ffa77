use crate::core::context::CallContext;
use crate::domain::model::RemoteResource;
use crate::domain::ports::ClusterClient;
use crate::utils::error::{DeployError, Result};
use crate::utils::validation::validate_engine_host;
use async_trait::async_trait;
use bollard::models::{
    Network as EngineNetwork, NetworkCreateRequest, NetworkCreateResponse,
    Service as EngineService, ServiceCreateResponse, ServiceSpec,
};
use bollard::query_parameters::{ListNetworksOptions, ListServicesOptions};
use bollard::{ClientVersion, Docker, API_DEFAULT_VERSION};
use std::collections::HashMap;

/// bollard 單一請求的逾時秒數；整體期限由 [`CallContext`] 控制
const REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_SOCKET: &str = "unix:///var/run/docker.sock";

/// Docker Engine API 用戶端（swarm 模式）
#[derive(Debug, Clone)]
pub struct DockerClient {
    docker: Docker,
}

impl DockerClient {
    /// `host` 可為 `unix://`、`tcp://` 或 `http://`，未指定時使用本機預設；
    /// `api_version` 例如 `1.43`
    pub fn connect(host: Option<&str>, api_version: Option<&str>) -> Result<Self> {
        let requested;
        let version: &ClientVersion = match api_version {
            Some(value) => {
                requested = parse_api_version(value)?;
                &requested
            }
            None => API_DEFAULT_VERSION,
        };

        let docker = match host {
            Some(host) => {
                validate_engine_host("host", host)?;
                tracing::debug!("Docker engine endpoint: {}", host);
                if host.starts_with("unix://") {
                    Docker::connect_with_socket(host, REQUEST_TIMEOUT_SECS, version)?
                } else {
                    Docker::connect_with_http(host, REQUEST_TIMEOUT_SECS, version)?
                }
            }
            None if api_version.is_none() => Docker::connect_with_defaults()?,
            None => Docker::connect_with_socket(DEFAULT_SOCKET, REQUEST_TIMEOUT_SECS, version)?,
        };

        Ok(Self { docker })
    }
}

/// 解析 `1.43` 或 `v1.43`
fn parse_api_version(value: &str) -> Result<ClientVersion> {
    let invalid = || DeployError::InvalidConfigValueError {
        field: "api_version".to_string(),
        value: value.to_string(),
        reason: "Expected <major>.<minor>, e.g. 1.43".to_string(),
    };

    let (major, minor) = value
        .trim_start_matches('v')
        .split_once('.')
        .ok_or_else(invalid)?;

    Ok(ClientVersion {
        major_version: major.parse().map_err(|_| invalid())?,
        minor_version: minor.parse().map_err(|_| invalid())?,
    })
}

fn name_filter(name: &str) -> HashMap<String, Vec<String>> {
    HashMap::from([("name".to_string(), vec![name.to_string()])])
}

fn network_summary(network: EngineNetwork) -> Option<RemoteResource> {
    Some(RemoteResource {
        id: network.id?,
        name: network.name.unwrap_or_default(),
    })
}

/// 只取 ID 與 `Spec.Name`，其餘欄位（模式、任務範本）不影響比對
fn service_summary(service: EngineService) -> Option<RemoteResource> {
    Some(RemoteResource {
        id: service.id?,
        name: service.spec.and_then(|spec| spec.name).unwrap_or_default(),
    })
}

#[async_trait]
impl ClusterClient for DockerClient {
    async fn network_list(&self, ctx: &CallContext, name: &str) -> Result<Vec<RemoteResource>> {
        tracing::debug!("GET /networks name={}", name);
        let options = ListNetworksOptions {
            filters: Some(name_filter(name)),
            ..Default::default()
        };
        let networks = ctx
            .run("network list", async {
                self.docker
                    .list_networks(Some(options))
                    .await
                    .map_err(DeployError::from)
            })
            .await?;
        Ok(networks.into_iter().filter_map(network_summary).collect())
    }

    async fn network_create(
        &self,
        ctx: &CallContext,
        request: NetworkCreateRequest,
    ) -> Result<NetworkCreateResponse> {
        tracing::debug!("POST /networks/create name={}", request.name);
        ctx.run("network create", async {
            self.docker
                .create_network(request)
                .await
                .map_err(DeployError::from)
        })
        .await
    }

    async fn network_remove(&self, ctx: &CallContext, id: &str) -> Result<()> {
        tracing::debug!("DELETE /networks/{}", id);
        ctx.run("network remove", async {
            self.docker.remove_network(id).await.map_err(DeployError::from)
        })
        .await
    }

    async fn service_list(&self, ctx: &CallContext, name: &str) -> Result<Vec<RemoteResource>> {
        tracing::debug!("GET /services name={}", name);
        let options = ListServicesOptions {
            filters: Some(name_filter(name)),
            ..Default::default()
        };
        let services = ctx
            .run("service list", async {
                self.docker
                    .list_services(Some(options))
                    .await
                    .map_err(DeployError::from)
            })
            .await?;
        Ok(services.into_iter().filter_map(service_summary).collect())
    }

    async fn service_create(
        &self,
        ctx: &CallContext,
        spec: &ServiceSpec,
    ) -> Result<ServiceCreateResponse> {
        tracing::debug!("POST /services/create name={:?}", spec.name);
        ctx.run("service create", async {
            self.docker
                .create_service(spec.clone(), None)
                .await
                .map_err(DeployError::from)
        })
        .await
    }

    async fn service_remove(&self, ctx: &CallContext, id: &str) -> Result<()> {
        tracing::debug!("DELETE /services/{}", id);
        ctx.run("service remove", async {
            self.docker.delete_service(id).await.map_err(DeployError::from)
        })
        .await
    }
}
