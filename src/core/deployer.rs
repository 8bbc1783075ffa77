use crate::config::project::ProjectConfig;
use crate::core::context::CallContext;
use crate::core::report::{DeployReport, ResourceAction};
use crate::domain::model::{
    Network, NetworkCreateOutcome, NetworkPresence, RemoteResource, RemoveOutcome, Service,
};
use crate::domain::ports::ClusterClient;
use crate::utils::error::{DeployError, ResourceKind, Result};
use bollard::models::ServiceCreateResponse;
use std::collections::HashMap;

/// 將專案中的網路與服務部署到 swarm
pub struct Deployer<C: ClusterClient> {
    client: C,
    project: String,
    pub networks: HashMap<String, Network>,
    pub services: HashMap<String, Service>,
}

impl<C: ClusterClient> Deployer<C> {
    pub fn new(project: impl Into<String>, client: C) -> Self {
        Self {
            client,
            project: project.into(),
            networks: HashMap::new(),
            services: HashMap::new(),
        }
    }

    /// 由已驗證的專案設定建立 deployer 並填入網路與服務
    pub fn from_project(config: &ProjectConfig, client: C) -> Result<Self> {
        let mut deployer = Self::new(config.project_name(), client);
        deployer.load_project(config)?;
        Ok(deployer)
    }

    pub fn load_project(&mut self, config: &ProjectConfig) -> Result<()> {
        let (networks, services) = config.resolve()?;
        tracing::debug!(
            "Loaded {} networks and {} services for project {}",
            networks.len(),
            services.len(),
            self.project
        );
        self.networks.extend(networks);
        self.services.extend(services);
        Ok(())
    }

    fn network(&self, key: &str) -> Result<&Network> {
        self.networks
            .get(key)
            .ok_or_else(|| DeployError::UnknownResource {
                kind: ResourceKind::Network,
                key: key.to_string(),
            })
    }

    fn service(&self, key: &str) -> Result<&Service> {
        self.services
            .get(key)
            .ok_or_else(|| DeployError::UnknownResource {
                kind: ResourceKind::Service,
                key: key.to_string(),
            })
    }

    /// 查詢網路是否存在：同名恰好一筆為存在，零筆為不存在，多筆為名稱衝突
    pub async fn check_network_exists(
        &self,
        ctx: &CallContext,
        key: &str,
    ) -> Result<NetworkPresence> {
        let network = self.network(key)?;
        let resources = self.client.network_list(ctx, &network.real_name).await?;

        match single_match(ResourceKind::Network, key, &network.real_name, resources)? {
            Some(resource) => Ok(NetworkPresence::Present(resource)),
            None => Ok(NetworkPresence::Absent),
        }
    }

    pub async fn network_create(
        &self,
        ctx: &CallContext,
        key: &str,
    ) -> Result<NetworkCreateOutcome> {
        let network = self.network(key)?;

        match self.check_network_exists(ctx, key).await? {
            NetworkPresence::Present(resource) => {
                tracing::info!("Network {:?} exists, skipping", network.real_name);
                Ok(NetworkCreateOutcome::AlreadyExists(resource))
            }
            NetworkPresence::Absent => {
                tracing::debug!(
                    "Creating network {:?} with driver {:?}",
                    network.real_name,
                    network.config.driver
                );
                let request = network.config.create_request(&network.real_name);
                let response = self.client.network_create(ctx, request).await?;
                if !response.warning.is_empty() {
                    tracing::warn!("Network {:?}: {}", network.real_name, response.warning);
                }
                tracing::info!("Created network {:?} ({})", network.real_name, response.id);
                Ok(NetworkCreateOutcome::Created(response))
            }
        }
    }

    pub async fn network_remove(&self, ctx: &CallContext, key: &str) -> Result<RemoveOutcome> {
        let network = self.network(key)?;
        let resources = self.client.network_list(ctx, &network.real_name).await?;

        match single_match(ResourceKind::Network, key, &network.real_name, resources)? {
            Some(resource) => {
                self.client.network_remove(ctx, &resource.id).await?;
                tracing::info!("Removed network {:?} ({})", network.real_name, resource.id);
                Ok(RemoveOutcome::Removed { id: resource.id })
            }
            None => {
                tracing::warn!("Network {:?} could not be found", network.real_name);
                Ok(RemoveOutcome::NotFound)
            }
        }
    }

    /// 直接以儲存的規格建立服務，不做存在檢查
    pub async fn service_create(
        &self,
        ctx: &CallContext,
        key: &str,
    ) -> Result<ServiceCreateResponse> {
        let service = self.service(key)?;
        let response = self.client.service_create(ctx, &service.spec).await?;
        for warning in response.warnings.iter().flatten() {
            tracing::warn!("Service {:?}: {}", service.real_name, warning);
        }
        tracing::info!(
            "Created service {:?} ({})",
            service.real_name,
            response.id.as_deref().unwrap_or("-")
        );
        Ok(response)
    }

    pub async fn service_remove(&self, ctx: &CallContext, key: &str) -> Result<RemoveOutcome> {
        let service = self.service(key)?;
        let resources = self.client.service_list(ctx, &service.real_name).await?;

        match single_match(ResourceKind::Service, key, &service.real_name, resources)? {
            Some(resource) => {
                self.client.service_remove(ctx, &resource.id).await?;
                tracing::info!("Removed service {:?} ({})", service.real_name, resource.id);
                Ok(RemoveOutcome::Removed { id: resource.id })
            }
            None => {
                tracing::warn!("Service {:?} could not be found", service.real_name);
                Ok(RemoveOutcome::NotFound)
            }
        }
    }

    /// 依序建立所有網路（外部網路除外）再建立所有服務
    pub async fn up(&self, ctx: &CallContext) -> Result<DeployReport> {
        let mut report = DeployReport::new(&self.project);

        for key in self.managed_network_keys() {
            let action = match self.network_create(ctx, &key).await? {
                NetworkCreateOutcome::Created(response) => ResourceAction::Created { id: response.id },
                NetworkCreateOutcome::AlreadyExists(_) => ResourceAction::Skipped,
            };
            report.record(ResourceKind::Network, key, action);
        }

        for key in sorted_keys(&self.services) {
            let response = self.service_create(ctx, &key).await?;
            report.record(
                ResourceKind::Service,
                key,
                ResourceAction::Created {
                    id: response.id.unwrap_or_default(),
                },
            );
        }

        Ok(report.finish())
    }

    /// 先移除服務，再移除網路（外部網路除外）
    pub async fn down(&self, ctx: &CallContext) -> Result<DeployReport> {
        let mut report = DeployReport::new(&self.project);

        for key in sorted_keys(&self.services) {
            let outcome = self.service_remove(ctx, &key).await?;
            report.record(ResourceKind::Service, key, outcome.into());
        }

        for key in self.managed_network_keys() {
            let outcome = self.network_remove(ctx, &key).await?;
            report.record(ResourceKind::Network, key, outcome.into());
        }

        Ok(report.finish())
    }

    fn managed_network_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .networks
            .iter()
            .filter(|(_, network)| !network.config.external)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

/// 遠端名稱過濾是子字串比對（`demo_net` 也會列出 `demo_net1`），只計算名稱完全相同者
fn single_match(
    kind: ResourceKind,
    key: &str,
    real_name: &str,
    resources: Vec<RemoteResource>,
) -> Result<Option<RemoteResource>> {
    let mut matches: Vec<RemoteResource> = resources
        .into_iter()
        .filter(|resource| resource.name == real_name)
        .collect();

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        count => Err(DeployError::AmbiguousMatch {
            kind,
            key: key.to_string(),
            count,
        }),
    }
}
