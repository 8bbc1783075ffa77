use bollard::models::{NetworkCreateRequest, NetworkCreateResponse, ServiceSpec};
use std::collections::HashMap;

/// 網路建立參數（driver 及其他選項）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkConfig {
    pub driver: String,
    pub driver_opts: HashMap<String, String>,
    pub labels: HashMap<String, String>,
    pub internal: bool,
    pub attachable: bool,
    /// 由叢集外部管理，部署時不建立也不移除
    pub external: bool,
}

impl NetworkConfig {
    /// 產生 `POST /networks/create` 的請求內容
    ///
    /// Engine API 1.44 起重複名稱一律由 daemon 檢查，請求中不再帶 `CheckDuplicate`。
    pub fn create_request(&self, name: &str) -> NetworkCreateRequest {
        NetworkCreateRequest {
            name: name.to_string(),
            driver: Some(self.driver.clone()),
            internal: Some(self.internal),
            attachable: Some(self.attachable),
            options: non_empty_map(&self.driver_opts),
            labels: non_empty_map(&self.labels),
            ..Default::default()
        }
    }
}

fn non_empty_map(map: &HashMap<String, String>) -> Option<HashMap<String, String>> {
    if map.is_empty() {
        None
    } else {
        Some(map.clone())
    }
}

/// 專案中的一個網路
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    /// swarm 中的名稱
    pub real_name: String,
    pub config: NetworkConfig,
}

/// 專案中的一個服務
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Service {
    /// swarm 中的名稱
    pub real_name: String,
    pub spec: ServiceSpec,
}

/// 列表查詢回傳的遠端資源，只保留 ID 與名稱
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteResource {
    pub id: String,
    pub name: String,
}

/// 網路存在檢查的結果；查詢失敗以 `Err` 表示
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkPresence {
    Absent,
    Present(RemoteResource),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCreateOutcome {
    Created(NetworkCreateResponse),
    AlreadyExists(RemoteResource),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    Removed { id: String },
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_from_config() {
        let mut config = NetworkConfig {
            driver: "overlay".to_string(),
            attachable: true,
            ..Default::default()
        };
        config
            .driver_opts
            .insert("encrypted".to_string(), "true".to_string());

        let request = config.create_request("demo_net1");
        assert_eq!(request.name, "demo_net1");
        assert_eq!(request.driver.as_deref(), Some("overlay"));
        assert_eq!(request.attachable, Some(true));
        assert_eq!(request.internal, Some(false));
        assert_eq!(
            request
                .options
                .as_ref()
                .and_then(|o| o.get("encrypted"))
                .map(String::as_str),
            Some("true")
        );
        assert!(request.labels.is_none());
    }

    #[test]
    fn test_create_request_uses_engine_field_names() {
        let config = NetworkConfig {
            driver: "overlay".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(config.create_request("demo_net1")).unwrap();
        assert_eq!(value["Name"], "demo_net1");
        assert_eq!(value["Driver"], "overlay");
        assert_eq!(value["Attachable"], false);
    }
}
