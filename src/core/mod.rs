pub mod context;
pub mod deployer;
pub mod report;

pub use crate::domain::model::{Network, NetworkConfig, RemoteResource, Service};
pub use crate::domain::ports::ClusterClient;
pub use crate::utils::error::Result;
