use crate::domain::model::{Network, NetworkConfig, Service};
use crate::utils::error::{DeployError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_resource_name, Validate};
use bollard::models::{
    EndpointPortConfig, EndpointPortConfigProtocolEnum, EndpointSpec, NetworkAttachmentConfig,
    ServiceSpec, ServiceSpecMode, ServiceSpecModeReplicated, TaskSpec, TaskSpecContainerSpec,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// 所有由本工具建立的資源都帶此 label
pub const NAMESPACE_LABEL: &str = "com.docker.stack.namespace";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkEntry>,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEntry {
    /// 覆寫 swarm 中的名稱
    pub name: Option<String>,
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub attachable: bool,
    #[serde(default)]
    pub external: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    #[default]
    Replicated,
    Global,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub image: String,
    #[serde(default)]
    pub mode: DeployMode,
    pub replicas: Option<u32>,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default)]
    pub networks: Vec<String>,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

fn default_driver() -> String {
    "overlay".to_string()
}

impl ProjectConfig {
    /// 從 TOML 檔案載入專案
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DeployError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析專案
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DeployError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${IMAGE_TAG})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DeployError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn project_name(&self) -> &str {
        &self.project.name
    }

    /// swarm 中的名稱：`<project>_<key>`
    pub fn real_name(&self, key: &str) -> String {
        format!("{}_{}", self.project.name, key)
    }

    fn network_real_name(&self, key: &str, entry: &NetworkEntry) -> String {
        match (&entry.name, entry.external) {
            (Some(name), _) => name.clone(),
            (None, true) => key.to_string(),
            (None, false) => self.real_name(key),
        }
    }

    fn namespace_labels(&self, extra: &BTreeMap<String, String>) -> HashMap<String, String> {
        let mut labels = to_hash_map(extra);
        labels.insert(NAMESPACE_LABEL.to_string(), self.project.name.clone());
        labels
    }

    /// 產生 deployer 使用的網路與服務對照表
    pub fn resolve(&self) -> Result<(HashMap<String, Network>, HashMap<String, Service>)> {
        let networks: HashMap<String, Network> = self
            .networks
            .iter()
            .map(|(key, entry)| (key.clone(), self.build_network(key, entry)))
            .collect();

        let services = self
            .services
            .iter()
            .map(|(key, entry)| {
                let service = self.build_service(key, entry, &networks)?;
                Ok((key.clone(), service))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok((networks, services))
    }

    fn build_network(&self, key: &str, entry: &NetworkEntry) -> Network {
        let labels = if entry.external {
            to_hash_map(&entry.labels)
        } else {
            self.namespace_labels(&entry.labels)
        };

        Network {
            real_name: self.network_real_name(key, entry),
            config: NetworkConfig {
                driver: entry.driver.clone(),
                driver_opts: to_hash_map(&entry.options),
                labels,
                internal: entry.internal,
                attachable: entry.attachable,
                external: entry.external,
            },
        }
    }

    fn build_service(
        &self,
        key: &str,
        entry: &ServiceEntry,
        networks: &HashMap<String, Network>,
    ) -> Result<Service> {
        let real_name = self.real_name(key);

        let attachments = entry
            .networks
            .iter()
            .map(|network_key| {
                let network = networks.get(network_key).ok_or_else(|| {
                    DeployError::InvalidConfigValueError {
                        field: format!("services.{}.networks", key),
                        value: network_key.clone(),
                        reason: "Network is not defined in [networks]".to_string(),
                    }
                })?;
                Ok(NetworkAttachmentConfig {
                    target: Some(network.real_name.clone()),
                    aliases: Some(vec![key.to_string()]),
                    ..Default::default()
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let ports = entry
            .ports
            .iter()
            .map(|port| parse_port(&format!("services.{}.ports", key), port))
            .collect::<Result<Vec<_>>>()?;

        let mode = match (entry.mode, entry.replicas) {
            (DeployMode::Replicated, replicas) => ServiceSpecMode {
                replicated: Some(ServiceSpecModeReplicated {
                    replicas: Some(i64::from(replicas.unwrap_or(1))),
                }),
                ..Default::default()
            },
            (DeployMode::Global, None) => ServiceSpecMode {
                global: Some(Default::default()),
                ..Default::default()
            },
            (DeployMode::Global, Some(replicas)) => {
                return Err(DeployError::InvalidConfigValueError {
                    field: format!("services.{}.replicas", key),
                    value: replicas.to_string(),
                    reason: "replicas cannot be set for a global service".to_string(),
                });
            }
        };

        let env = entry
            .environment
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<String>>();

        let labels = self.namespace_labels(&entry.labels);

        let spec = ServiceSpec {
            name: Some(real_name.clone()),
            labels: Some(labels.clone()),
            task_template: Some(TaskSpec {
                container_spec: Some(TaskSpecContainerSpec {
                    image: Some(entry.image.clone()),
                    command: non_empty(entry.command.clone()),
                    args: non_empty(entry.args.clone()),
                    env: non_empty(env),
                    labels: Some(labels),
                    ..Default::default()
                }),
                networks: non_empty(attachments),
                ..Default::default()
            }),
            mode: Some(mode),
            endpoint_spec: non_empty(ports).map(|ports| EndpointSpec {
                ports: Some(ports),
                ..Default::default()
            }),
            ..Default::default()
        };

        Ok(Service { real_name, spec })
    }

    /// 驗證專案設定的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_resource_name("project.name", &self.project.name)?;

        for (key, entry) in &self.networks {
            validate_resource_name(&format!("networks.{}", key), key)?;
            validate_non_empty_string(&format!("networks.{}.driver", key), &entry.driver)?;
            if let Some(name) = &entry.name {
                validate_resource_name(&format!("networks.{}.name", key), name)?;
            }
        }

        for (key, entry) in &self.services {
            validate_resource_name(&format!("services.{}", key), key)?;
            validate_non_empty_string(&format!("services.{}.image", key), &entry.image)?;
        }

        // 網路參照、連接埠與模式
        self.resolve().map(|_| ())
    }
}

impl Validate for ProjectConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

fn to_hash_map(map: &BTreeMap<String, String>) -> HashMap<String, String> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// 解析 `published:target[/protocol]` 或 `target[/protocol]`
pub fn parse_port(field: &str, spec: &str) -> Result<EndpointPortConfig> {
    let invalid = |reason: String| DeployError::InvalidConfigValueError {
        field: field.to_string(),
        value: spec.to_string(),
        reason,
    };

    let (ports, protocol) = match spec.split_once('/') {
        Some((ports, "tcp")) => (ports, EndpointPortConfigProtocolEnum::TCP),
        Some((ports, "udp")) => (ports, EndpointPortConfigProtocolEnum::UDP),
        Some((ports, "sctp")) => (ports, EndpointPortConfigProtocolEnum::SCTP),
        Some((_, other)) => return Err(invalid(format!("Unsupported protocol: {}", other))),
        None => (spec, EndpointPortConfigProtocolEnum::TCP),
    };

    let parse = |value: &str| {
        value
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port > 0)
            .ok_or_else(|| invalid(format!("Invalid port number: {}", value)))
    };

    let (published_port, target_port) = match ports.split_once(':') {
        Some((published, target)) => (Some(parse(published)?), parse(target)?),
        None => (None, parse(ports)?),
    };

    Ok(EndpointPortConfig {
        protocol: Some(protocol),
        target_port: Some(i64::from(target_port)),
        published_port: published_port.map(i64::from),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DEMO: &str = r#"
[project]
name = "demo"

[networks.net1]
driver = "overlay"
attachable = true
options = { "com.docker.network.driver.mtu" = "1450" }

[networks.ingress]
external = true

[services.web]
image = "nginx:alpine"
replicas = 2
environment = { NGINX_PORT = "80", MODE = "edge" }
networks = ["net1", "ingress"]
ports = ["8080:80", "53/udp"]

[services.agent]
image = "demo/agent:1.0"
mode = "global"
command = ["agent", "--verbose"]
"#;

    #[test]
    fn test_parse_demo_project() {
        let config = ProjectConfig::from_toml_str(DEMO).unwrap();
        assert_eq!(config.project_name(), "demo");
        assert_eq!(config.networks.len(), 2);
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.networks["ingress"].driver, "overlay");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_real_names_and_specs() {
        let config = ProjectConfig::from_toml_str(DEMO).unwrap();
        let (networks, services) = config.resolve().unwrap();

        let net1 = &networks["net1"];
        assert_eq!(net1.real_name, "demo_net1");
        assert_eq!(net1.config.driver, "overlay");
        assert!(net1.config.attachable);
        assert_eq!(
            net1.config.labels.get(NAMESPACE_LABEL).map(String::as_str),
            Some("demo")
        );

        let ingress = &networks["ingress"];
        assert_eq!(ingress.real_name, "ingress");
        assert!(ingress.config.external);
        assert!(ingress.config.labels.is_empty());

        let web = &services["web"];
        assert_eq!(web.real_name, "demo_web");
        assert_eq!(web.spec.name.as_deref(), Some("demo_web"));
        let task = web.spec.task_template.as_ref().unwrap();
        let container = task.container_spec.as_ref().unwrap();
        assert_eq!(container.image.as_deref(), Some("nginx:alpine"));
        assert_eq!(
            container.env,
            Some(vec!["MODE=edge".to_string(), "NGINX_PORT=80".to_string()])
        );
        assert!(container.command.is_none());
        let targets: Vec<&str> = task
            .networks
            .iter()
            .flatten()
            .filter_map(|n| n.target.as_deref())
            .collect();
        assert_eq!(targets, vec!["demo_net1", "ingress"]);
        let mode = web.spec.mode.as_ref().unwrap();
        assert_eq!(mode.replicated.as_ref().and_then(|r| r.replicas), Some(2));
        assert!(mode.global.is_none());
        let ports = web
            .spec
            .endpoint_spec
            .as_ref()
            .and_then(|e| e.ports.as_ref())
            .unwrap();
        assert_eq!(ports[0].published_port, Some(8080));
        assert_eq!(ports[1].protocol, Some(EndpointPortConfigProtocolEnum::UDP));
        assert_eq!(ports[1].published_port, None);

        let agent = &services["agent"];
        let mode = agent.spec.mode.as_ref().unwrap();
        assert!(mode.global.is_some());
        assert!(mode.replicated.is_none());
        assert!(agent.spec.endpoint_spec.is_none());
    }

    #[test]
    fn test_unknown_network_reference_is_rejected() {
        let content = r#"
[project]
name = "demo"

[services.web]
image = "nginx"
networks = ["backend"]
"#;
        let config = ProjectConfig::from_toml_str(content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            DeployError::InvalidConfigValueError { ref field, ref value, .. }
                if field == "services.web.networks" && value == "backend"
        ));
    }

    #[test]
    fn test_global_service_with_replicas_is_rejected() {
        let content = r#"
[project]
name = "demo"

[services.agent]
image = "agent"
mode = "global"
replicas = 3
"#;
        let config = ProjectConfig::from_toml_str(content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_project_name() {
        let content = r#"
[project]
name = "my project"
"#;
        let config = ProjectConfig::from_toml_str(content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_port() {
        let port = parse_port("ports", "8080:80").unwrap();
        assert_eq!(port.target_port, Some(80));
        assert_eq!(port.published_port, Some(8080));
        assert_eq!(port.protocol, Some(EndpointPortConfigProtocolEnum::TCP));

        assert_eq!(
            parse_port("ports", "53:53/udp").unwrap().protocol,
            Some(EndpointPortConfigProtocolEnum::UDP)
        );
        assert!(parse_port("ports", "80/icmp").is_err());
        assert!(parse_port("ports", "0:80").is_err());
        assert!(parse_port("ports", "http").is_err());
        assert!(parse_port("ports", "70000").is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SWARM_DEPLOYER_TEST_TAG", "1.2.3");

        let content = r#"
[project]
name = "demo"

[services.web]
image = "nginx:${SWARM_DEPLOYER_TEST_TAG}"
command = ["echo", "${SWARM_DEPLOYER_UNSET_VAR}"]
"#;
        let config = ProjectConfig::from_toml_str(content).unwrap();
        assert_eq!(config.services["web"].image, "nginx:1.2.3");
        assert_eq!(config.services["web"].command[1], "${SWARM_DEPLOYER_UNSET_VAR}");

        std::env::remove_var("SWARM_DEPLOYER_TEST_TAG");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(DEMO.as_bytes()).unwrap();

        let config = ProjectConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.project_name(), "demo");
    }

    #[test]
    fn test_missing_file() {
        let err = ProjectConfig::from_file("/nonexistent/stack.toml").unwrap_err();
        assert!(matches!(err, DeployError::IoError(_)));
        // the binary exits through the same category path as other config errors
        assert_eq!(err.category(), crate::utils::error::ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 1);
    }
}
