//! Deployment scenario: the ordered, target-partitioned set of deployments a
//! test run works with.

use crate::container::ContainerRegistry;
use crate::deployment::Deployment;
use crate::error::ScenarioError;
use crate::types::TargetName;

#[derive(Debug, Default)]
pub struct DeploymentScenario {
    deployments: Vec<Deployment>,
}

impl DeploymentScenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a deployment. Names are unique across the whole scenario.
    pub fn add(&mut self, deployment: impl Into<Deployment>) -> Result<(), ScenarioError> {
        let deployment = deployment.into();
        if self.deployment(deployment.name()).is_some() {
            return Err(ScenarioError::DuplicateDeployment(
                deployment.name().to_string(),
            ));
        }
        self.deployments.push(deployment);
        Ok(())
    }

    pub fn deployments(&self) -> &[Deployment] {
        &self.deployments
    }

    pub fn deployment(&self, name: &str) -> Option<&Deployment> {
        self.deployments.iter().find(|d| d.name() == name)
    }

    /// Distinct targets in the order they first appear in the scenario.
    pub fn targets(&self) -> Vec<&TargetName> {
        let mut targets: Vec<&TargetName> = Vec::new();
        for deployment in &self.deployments {
            if !targets.contains(&deployment.target()) {
                targets.push(deployment.target());
            }
        }
        targets
    }

    /// Managed deployments of `target`, ordered by their `order` key.
    ///
    /// The sort is stable, so deployments sharing an order keep their
    /// declaration order.
    pub fn startup_deployments_for(&self, target: &TargetName) -> Vec<&Deployment> {
        let mut startup: Vec<&Deployment> = self
            .deployments
            .iter()
            .filter(|d| d.target() == target && d.description().managed)
            .collect();
        startup.sort_by_key(|d| d.description().order);
        startup
    }

    /// Check that every target with startup work resolves to a container.
    pub fn validate(&self, registry: &ContainerRegistry) -> Result<(), ScenarioError> {
        let missing: Vec<TargetName> = self
            .targets()
            .into_iter()
            .filter(|t| !self.startup_deployments_for(t).is_empty())
            .filter(|t| !registry.contains(t))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ScenarioError::MissingContainers(missing))
        }
    }
}
