#[cfg(feature = "cli")]
pub mod cli;
pub mod project;

pub use project::ProjectConfig;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
