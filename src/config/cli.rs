use crate::utils::error::Result;
use crate::utils::validation::{
    validate_engine_host, validate_range, validate_resource_name, Validate,
};
use clap::{Parser, Subcommand};
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "swarm-deployer")]
#[command(about = "Deploy a project's networks and services to a Docker swarm")]
pub struct CliConfig {
    /// Project file
    #[arg(short, long, default_value = "stack.toml")]
    pub file: String,

    /// Docker engine endpoint (unix://, tcp:// or http://); the local socket when unset
    #[arg(long, env = "DOCKER_HOST")]
    pub host: Option<String>,

    /// Engine API version, e.g. 1.43
    #[arg(long, env = "DOCKER_API_VERSION")]
    pub api_version: Option<String>,

    /// Override the project name from the project file
    #[arg(short, long)]
    pub project: Option<String>,

    /// Deadline for the whole run
    #[arg(long, default_value = "120")]
    pub timeout_seconds: u64,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create networks, then services
    Up,
    /// Remove services, then networks
    Down,
}

impl CliConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(host) = &self.host {
            validate_engine_host("host", host)?;
        }
        validate_range("timeout_seconds", self.timeout_seconds, 1, 3600)?;
        if let Some(project) = &self.project {
            validate_resource_name("project", project)?;
        }
        Ok(())
    }
}
