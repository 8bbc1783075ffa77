use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Docker engine request failed: {0}")]
    Engine(#[source] bollard::errors::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Engine API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unknown {kind} '{key}' in project")]
    UnknownResource { kind: ResourceKind, key: String },

    #[error("{kind} {key} matched {count} resources, expected at most one")]
    AmbiguousMatch {
        kind: ResourceKind,
        key: String,
        count: usize,
    },

    #[error("{operation} was cancelled")]
    Cancelled { operation: String },

    #[error("{operation} timed out")]
    Timeout { operation: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, DeployError>;

/// engine 回應的錯誤狀態轉為 `Api`，其餘（連線、解碼）保留原始錯誤
impl From<bollard::errors::Error> for DeployError {
    fn from(err: bollard::errors::Error) -> Self {
        match err {
            bollard::errors::Error::DockerResponseServerError {
                status_code,
                message,
            } => DeployError::Api {
                status: status_code,
                message,
            },
            other => DeployError::Engine(other),
        }
    }
}

/// 資源種類，用於錯誤訊息與日誌
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Network,
    Service,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Network => write!(f, "Network"),
            ResourceKind::Service => write!(f, "Service"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    RemoteApi,
    Transport,
    Cancellation,
    Conflict,
}

impl DeployError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DeployError::Engine(_) => ErrorCategory::Transport,
            DeployError::Api { .. } => ErrorCategory::RemoteApi,
            DeployError::AmbiguousMatch { .. } => ErrorCategory::Conflict,
            DeployError::Cancelled { .. } | DeployError::Timeout { .. } => {
                ErrorCategory::Cancellation
            }
            DeployError::UnknownResource { .. }
            | DeployError::IoError(_)
            | DeployError::ConfigError { .. }
            | DeployError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::RemoteApi => 2,
            ErrorCategory::Transport => 3,
            ErrorCategory::Conflict => 4,
            ErrorCategory::Cancellation => 130,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DeployError::Engine(e) => format!("Could not talk to the Docker engine: {}", e),
            DeployError::Api { status: 503, message } => {
                format!("The engine is not a swarm manager: {}", message)
            }
            DeployError::AmbiguousMatch { kind, key, count } => format!(
                "{} '{}' is ambiguous: {} resources share its name",
                kind, key, count
            ),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the project file and command line options",
            ErrorCategory::RemoteApi => "Inspect the engine response and the swarm state",
            ErrorCategory::Transport => "Make sure the engine is reachable at the configured host",
            ErrorCategory::Conflict => "Rename or remove the colliding resources manually",
            ErrorCategory::Cancellation => "Retry with a longer --timeout-seconds",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_map_to_distinct_exit_codes() {
        let conflict = DeployError::AmbiguousMatch {
            kind: ResourceKind::Network,
            key: "net1".to_string(),
            count: 2,
        };
        assert_eq!(conflict.category(), ErrorCategory::Conflict);
        assert_eq!(conflict.exit_code(), 4);

        let unknown = DeployError::UnknownResource {
            kind: ResourceKind::Service,
            key: "web".to_string(),
        };
        assert_eq!(unknown.category(), ErrorCategory::Configuration);
        assert_eq!(unknown.to_string(), "Unknown Service 'web' in project");

        let timeout = DeployError::Timeout {
            operation: "network list".to_string(),
        };
        assert_eq!(timeout.exit_code(), 130);
    }

    #[test]
    fn test_swarm_inactive_message() {
        let err = DeployError::Api {
            status: 503,
            message: "This node is not a swarm manager.".to_string(),
        };
        assert!(err.user_friendly_message().contains("not a swarm manager"));
        assert_eq!(err.category(), ErrorCategory::RemoteApi);
    }

    #[test]
    fn test_engine_errors_are_mapped() {
        let err: DeployError = bollard::errors::Error::DockerResponseServerError {
            status_code: 409,
            message: "service demo_web already exists".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            DeployError::Api { status: 409, ref message } if message.contains("already exists")
        ));
        assert_eq!(err.exit_code(), 2);

        let err: DeployError = bollard::errors::Error::RequestTimeoutError.into();
        assert!(matches!(err, DeployError::Engine(_)));
        assert_eq!(err.category(), ErrorCategory::Transport);
    }
}
