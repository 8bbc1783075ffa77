pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::adapters::docker::DockerClient;
pub use crate::config::ProjectConfig;
pub use crate::core::{context::CallContext, deployer::Deployer, report::DeployReport};
pub use crate::domain::ports::ClusterClient;
pub use crate::utils::error::{DeployError, Result};
