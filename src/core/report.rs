use crate::domain::model::RemoveOutcome;
use crate::utils::error::ResourceKind;
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceAction {
    Created { id: String },
    Skipped,
    Removed { id: String },
    NotFound,
}

impl From<RemoveOutcome> for ResourceAction {
    fn from(outcome: RemoveOutcome) -> Self {
        match outcome {
            RemoveOutcome::Removed { id } => ResourceAction::Removed { id },
            RemoveOutcome::NotFound => ResourceAction::NotFound,
        }
    }
}

impl fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceAction::Created { id } => write!(f, "created ({})", id),
            ResourceAction::Skipped => write!(f, "exists, skipped"),
            ResourceAction::Removed { id } => write!(f, "removed ({})", id),
            ResourceAction::NotFound => write!(f, "not found"),
        }
    }
}

/// `up` / `down` 的逐項結果
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub project: String,
    pub networks: Vec<(String, ResourceAction)>,
    pub services: Vec<(String, ResourceAction)>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl DeployReport {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            networks: Vec::new(),
            services: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, kind: ResourceKind, key: String, action: ResourceAction) {
        match kind {
            ResourceKind::Network => self.networks.push((key, action)),
            ResourceKind::Service => self.services.push((key, action)),
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn changed(&self) -> usize {
        self.networks
            .iter()
            .chain(self.services.iter())
            .filter(|(_, action)| {
                matches!(
                    action,
                    ResourceAction::Created { .. } | ResourceAction::Removed { .. }
                )
            })
            .count()
    }
}

impl fmt::Display for DeployReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Project {}:", self.project)?;
        for (key, action) in &self.networks {
            writeln!(f, "  network {:<20} {}", key, action)?;
        }
        for (key, action) in &self.services {
            writeln!(f, "  service {:<20} {}", key, action)?;
        }
        if let Some(finished_at) = self.finished_at {
            let elapsed = finished_at - self.started_at;
            write!(
                f,
                "{} changed in {}ms",
                self.changed(),
                elapsed.num_milliseconds()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary() {
        let mut report = DeployReport::new("demo");
        report.record(
            ResourceKind::Network,
            "net1".to_string(),
            ResourceAction::Skipped,
        );
        report.record(
            ResourceKind::Service,
            "web".to_string(),
            ResourceAction::Created {
                id: "abc".to_string(),
            },
        );
        let report = report.finish();

        assert_eq!(report.changed(), 1);
        let text = report.to_string();
        assert!(text.starts_with("Project demo:"));
        assert!(text.contains("exists, skipped"));
        assert!(text.contains("created (abc)"));
        assert!(text.contains("1 changed in"));
    }

    #[test]
    fn test_remove_outcome_conversion() {
        assert_eq!(
            ResourceAction::from(RemoveOutcome::NotFound),
            ResourceAction::NotFound
        );
        assert_eq!(
            ResourceAction::from(RemoveOutcome::Removed {
                id: "x".to_string()
            }),
            ResourceAction::Removed {
                id: "x".to_string()
            }
        );
    }
}
