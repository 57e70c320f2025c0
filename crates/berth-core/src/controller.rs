//! Deployment lifecycle controller.
//!
//! Brings the deployments of a scenario up on, and down from, the containers
//! bound to their targets. Every physical action is bracketed by a before and
//! an after event published through the [`EventChannel`], inside a
//! [`DeploymentScope`] that lives exactly as long as the action.
//!
//! Everything runs sequentially on the calling thread, in scenario order. The
//! first failure stops the run; events already published are the record of
//! what completed.

use tracing::{info, instrument, warn};

use crate::container::{Container, ContainerRegistry};
use crate::deployment::{Deployment, DeploymentKind};
use crate::error::{ControllerError, ControllerResult};
use crate::event::{DeploymentEvent, EventChannel};
use crate::scenario::DeploymentScenario;
use crate::scope::DeploymentScope;

/// Requests the controller reacts to.
#[derive(Debug, Clone, Copy)]
pub enum ControllerTrigger<'a> {
    DeployManagedDeployments(&'a DeploymentScenario),
    UnDeployManagedDeployments(&'a DeploymentScenario),
    DeployDeployment {
        container: &'a Container,
        deployment: &'a Deployment,
    },
    UnDeployDeployment {
        container: &'a Container,
        deployment: &'a Deployment,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct DeploymentController<'a> {
    registry: &'a ContainerRegistry,
    events: &'a EventChannel,
}

impl<'a> DeploymentController<'a> {
    pub fn new(registry: &'a ContainerRegistry, events: &'a EventChannel) -> Self {
        Self { registry, events }
    }

    pub fn dispatch(&self, trigger: ControllerTrigger<'_>) -> ControllerResult<()> {
        match trigger {
            ControllerTrigger::DeployManagedDeployments(scenario) => {
                self.deploy_managed(scenario)
            }
            ControllerTrigger::UnDeployManagedDeployments(scenario) => {
                self.undeploy_managed(scenario)
            }
            ControllerTrigger::DeployDeployment {
                container,
                deployment,
            } => self.deploy(container, deployment),
            ControllerTrigger::UnDeployDeployment {
                container,
                deployment,
            } => self.undeploy(container, deployment),
        }
    }

    /// Deploy every startup deployment of the scenario, target by target.
    #[instrument(skip_all)]
    pub fn deploy_managed(&self, scenario: &DeploymentScenario) -> ControllerResult<()> {
        self.for_each_managed_deployment(scenario, |container, deployment| {
            self.deploy(container, deployment)
        })
    }

    /// Undeploy every startup deployment of the scenario, target by target.
    #[instrument(skip_all)]
    pub fn undeploy_managed(&self, scenario: &DeploymentScenario) -> ControllerResult<()> {
        self.for_each_managed_deployment(scenario, |container, deployment| {
            self.undeploy(container, deployment)
        })
    }

    fn for_each_managed_deployment<F>(
        &self,
        scenario: &DeploymentScenario,
        mut operation: F,
    ) -> ControllerResult<()>
    where
        F: FnMut(&Container, &Deployment) -> ControllerResult<()>,
    {
        for target in scenario.targets() {
            let startup = scenario.startup_deployments_for(target);
            if startup.is_empty() {
                continue;
            }

            // Presence is validated before the run starts.
            let container = self.registry.lookup(target)?;

            for deployment in startup {
                operation(container, deployment)?;
            }
        }
        Ok(())
    }

    /// Deploy a single deployment to `container`.
    ///
    /// On success exactly one `BeforeDeploy` and one `AfterDeploy` are
    /// published around one physical deploy. If the container fails,
    /// `AfterDeploy` is not published; recording the failure on the
    /// deployment is left to whoever handles the returned error.
    #[instrument(
        skip_all,
        fields(container = %container.name(), deployment = %deployment.name())
    )]
    pub fn deploy(&self, container: &Container, deployment: &Deployment) -> ControllerResult<()> {
        let mut scope = DeploymentScope::for_deployment(deployment);
        let description = deployment.description();

        self.events.publish(
            &DeploymentEvent::DeployDeployment {
                container,
                deployment,
            },
            &scope,
        )?;
        self.events.publish(
            &DeploymentEvent::BeforeDeploy {
                container,
                description,
            },
            &scope,
        )?;

        let deployable = container.deployable();
        match &description.kind {
            DeploymentKind::Archive { archive, testable } => {
                let archive = testable.as_ref().unwrap_or(archive);
                info!(archive = %archive.name, "deploying archive");
                let metadata = deployable
                    .deploy_archive(archive)
                    .map_err(|source| deploy_error(container, deployment, source))?;
                scope.bind_protocol_metadata(metadata);
            }
            DeploymentKind::Descriptor(descriptor) => {
                info!(descriptor = %descriptor.name, "deploying descriptor");
                deployable
                    .deploy_descriptor(descriptor)
                    .map_err(|source| deploy_error(container, deployment, source))?;
            }
        }

        self.events.publish(
            &DeploymentEvent::AfterDeploy {
                container,
                description,
            },
            &scope,
        )
    }

    /// Undeploy a single deployment from `container`.
    ///
    /// An archive undeploy failure is swallowed when the deployment already
    /// carries a deployment error: it never came up, so the teardown failure
    /// says nothing new. Descriptor undeploy failures always propagate. A
    /// propagated failure skips `AfterUnDeploy`.
    #[instrument(
        skip_all,
        fields(container = %container.name(), deployment = %deployment.name())
    )]
    pub fn undeploy(&self, container: &Container, deployment: &Deployment) -> ControllerResult<()> {
        let scope = DeploymentScope::for_deployment(deployment);
        let description = deployment.description();

        self.events.publish(
            &DeploymentEvent::UnDeployDeployment {
                container,
                deployment,
            },
            &scope,
        )?;
        self.events.publish(
            &DeploymentEvent::BeforeUnDeploy {
                container,
                description,
            },
            &scope,
        )?;

        let deployable = container.deployable();
        match &description.kind {
            DeploymentKind::Archive { archive, testable } => {
                let archive = testable.as_ref().unwrap_or(archive);
                info!(archive = %archive.name, "undeploying archive");
                if let Err(source) = deployable.undeploy_archive(archive) {
                    match deployment.deployment_error() {
                        Some(reason) => warn!(
                            error = %format!("{source:#}"),
                            deployment_error = reason,
                            "ignoring undeploy failure of a deployment that failed to deploy"
                        ),
                        None => return Err(undeploy_error(container, deployment, source)),
                    }
                }
            }
            DeploymentKind::Descriptor(descriptor) => {
                info!(descriptor = %descriptor.name, "undeploying descriptor");
                deployable
                    .undeploy_descriptor(descriptor)
                    .map_err(|source| undeploy_error(container, deployment, source))?;
            }
        }

        self.events.publish(
            &DeploymentEvent::AfterUnDeploy {
                container,
                description,
            },
            &scope,
        )
    }
}

fn deploy_error(
    container: &Container,
    deployment: &Deployment,
    source: anyhow::Error,
) -> ControllerError {
    ControllerError::Deploy {
        deployment: deployment.name().to_string(),
        container: container.name().to_string(),
        source,
    }
}

fn undeploy_error(
    container: &Container,
    deployment: &Deployment,
    source: anyhow::Error,
) -> ControllerError {
    ControllerError::Undeploy {
        deployment: deployment.name().to_string(),
        container: container.name().to_string(),
        source,
    }
}
