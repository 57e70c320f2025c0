//! Deployment scope: the per-action binding set shared between the controller
//! and the observers it notifies.
//!
//! A scope is opened at the start of one deploy or undeploy action, lives on
//! that action's stack, and is closed when it is dropped, on success and on
//! failure alike. Observers receive it by reference and can read whatever the
//! action bound before publishing.

use crate::deployment::{Deployment, DeploymentDescription};
use crate::types::ProtocolMetaData;

/// Semantic role of a scoped binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeRole {
    DeploymentDescription,
    Deployment,
    ProtocolMetaData,
}

#[derive(Debug, Default)]
pub struct DeploymentScope<'a> {
    description: Option<&'a DeploymentDescription>,
    deployment: Option<&'a Deployment>,
    protocol_metadata: Option<ProtocolMetaData>,
}

impl<'a> DeploymentScope<'a> {
    /// Open an empty scope.
    pub fn open() -> Self {
        Self::default()
    }

    /// Open a scope with the deployment and its description already bound.
    pub fn for_deployment(deployment: &'a Deployment) -> Self {
        let mut scope = Self::open();
        scope.bind_description(deployment.description());
        scope.bind_deployment(deployment);
        scope
    }

    pub fn bind_description(&mut self, description: &'a DeploymentDescription) {
        self.description = Some(description);
    }

    pub fn bind_deployment(&mut self, deployment: &'a Deployment) {
        self.deployment = Some(deployment);
    }

    pub fn bind_protocol_metadata(&mut self, metadata: ProtocolMetaData) {
        self.protocol_metadata = Some(metadata);
    }

    pub fn description(&self) -> Option<&'a DeploymentDescription> {
        self.description
    }

    pub fn deployment(&self) -> Option<&'a Deployment> {
        self.deployment
    }

    pub fn protocol_metadata(&self) -> Option<&ProtocolMetaData> {
        self.protocol_metadata.as_ref()
    }

    pub fn is_bound(&self, role: ScopeRole) -> bool {
        match role {
            ScopeRole::DeploymentDescription => self.description.is_some(),
            ScopeRole::Deployment => self.deployment.is_some(),
            ScopeRole::ProtocolMetaData => self.protocol_metadata.is_some(),
        }
    }
}

impl Drop for DeploymentScope<'_> {
    fn drop(&mut self) {
        tracing::trace!(
            deployment = self.deployment.map(Deployment::name),
            "deployment scope closed"
        );
    }
}
