//! Error types for berth-core.

use crate::event::EventKind;
use crate::types::TargetName;

/// Result type alias using [`ControllerError`].
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Failures raised while driving deployments through their lifecycle.
///
/// Capability and observer errors are implementation-defined, so they are
/// carried as [`anyhow::Error`] sources.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// No container is registered for a target that has work scheduled on it.
    #[error("no container registered for target '{0}'")]
    ContainerNotFound(TargetName),

    /// A subscriber of a lifecycle event failed; publication stopped there.
    #[error("observer of {event} failed")]
    Observer {
        event: EventKind,
        #[source]
        source: anyhow::Error,
    },

    /// The container rejected a deploy.
    #[error("failed to deploy '{deployment}' to container '{container}'")]
    Deploy {
        deployment: String,
        container: String,
        #[source]
        source: anyhow::Error,
    },

    /// The container rejected an undeploy and the failure was not suppressed.
    #[error("failed to undeploy '{deployment}' from container '{container}'")]
    Undeploy {
        deployment: String,
        container: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ControllerError {
    /// Name of the deployment whose physical action failed, if any.
    pub fn failed_deployment(&self) -> Option<&str> {
        match self {
            Self::Deploy { deployment, .. } | Self::Undeploy { deployment, .. } => {
                Some(deployment)
            }
            Self::ContainerNotFound(_) | Self::Observer { .. } => None,
        }
    }
}

/// Errors building or validating a [`DeploymentScenario`](crate::scenario::DeploymentScenario).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioError {
    #[error("deployment '{0}' is declared more than once")]
    DuplicateDeployment(String),

    #[error("no container registered for target(s): {}", join_targets(.0))]
    MissingContainers(Vec<TargetName>),
}

fn join_targets(targets: &[TargetName]) -> String {
    targets
        .iter()
        .map(TargetName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
