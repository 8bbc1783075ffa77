use crate::utils::error::{DeployError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// engine 端點：`unix://`、`tcp://` 或 `http://`
pub fn validate_engine_host(field_name: &str, host: &str) -> Result<()> {
    let invalid = |reason: String| DeployError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: host.to_string(),
        reason,
    };

    if host.is_empty() {
        return Err(invalid("Host cannot be empty".to_string()));
    }

    match Url::parse(host) {
        Ok(url) => match url.scheme() {
            "unix" | "tcp" | "http" => Ok(()),
            scheme => Err(invalid(format!("Unsupported host scheme: {}", scheme))),
        },
        Err(e) => Err(invalid(format!("Invalid host format: {}", e))),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// swarm 物件名稱：英數字開頭，只允許英數字、`_`、`.`、`-`
pub fn validate_resource_name(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    let mut chars = value.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if !starts_ok || !rest_ok {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Name must start with a letter or digit and contain only [a-zA-Z0-9_.-]"
                .to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_engine_host() {
        assert!(validate_engine_host("host", "http://127.0.0.1:2375").is_ok());
        assert!(validate_engine_host("host", "tcp://10.0.0.5:2375").is_ok());
        assert!(validate_engine_host("host", "unix:///var/run/docker.sock").is_ok());
        assert!(validate_engine_host("host", "").is_err());
        assert!(validate_engine_host("host", "not a url").is_err());
        assert!(validate_engine_host("host", "ftp://10.0.0.5").is_err());
    }

    #[test]
    fn test_validate_resource_name() {
        assert!(validate_resource_name("project.name", "demo").is_ok());
        assert!(validate_resource_name("project.name", "demo_net-1.a").is_ok());
        assert!(validate_resource_name("project.name", "").is_err());
        assert!(validate_resource_name("project.name", "_demo").is_err());
        assert!(validate_resource_name("project.name", "de mo").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("timeout_seconds", 30, 1, 3600).is_ok());
        assert!(validate_range("timeout_seconds", 0, 1, 3600).is_err());
    }
}
