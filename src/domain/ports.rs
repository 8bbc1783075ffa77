use crate::core::context::CallContext;
use crate::domain::model::RemoteResource;
use crate::utils::error::Result;
use async_trait::async_trait;
use bollard::models::{
    NetworkCreateRequest, NetworkCreateResponse, ServiceCreateResponse, ServiceSpec,
};

/// 叢集管理 API 的用戶端介面
///
/// 每個呼叫都帶入 [`CallContext`]，取消與逾時由實作負責套用。
/// 列表查詢以名稱過濾；遠端過濾可能是子字串比對，呼叫端需自行比對完整名稱。
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn network_list(&self, ctx: &CallContext, name: &str) -> Result<Vec<RemoteResource>>;

    async fn network_create(
        &self,
        ctx: &CallContext,
        request: NetworkCreateRequest,
    ) -> Result<NetworkCreateResponse>;

    async fn network_remove(&self, ctx: &CallContext, id: &str) -> Result<()>;

    async fn service_list(&self, ctx: &CallContext, name: &str) -> Result<Vec<RemoteResource>>;

    async fn service_create(
        &self,
        ctx: &CallContext,
        spec: &ServiceSpec,
    ) -> Result<ServiceCreateResponse>;

    async fn service_remove(&self, ctx: &CallContext, id: &str) -> Result<()>;
}
