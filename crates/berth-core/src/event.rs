//! Lifecycle events and the synchronous channel that delivers them.
//!
//! Handlers are registered per [`EventKind`] and run on the publishing thread
//! in registration order. The first handler that fails stops delivery; the
//! remaining handlers are not called and the failure is returned to the
//! publisher.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::deployment::{Deployment, DeploymentDescription};
use crate::error::{ControllerError, ControllerResult};
use crate::scope::DeploymentScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DeployDeployment,
    UnDeployDeployment,
    BeforeDeploy,
    AfterDeploy,
    BeforeUnDeploy,
    AfterUnDeploy,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::DeployDeployment,
        EventKind::UnDeployDeployment,
        EventKind::BeforeDeploy,
        EventKind::AfterDeploy,
        EventKind::BeforeUnDeploy,
        EventKind::AfterUnDeploy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::DeployDeployment => "DeployDeployment",
            EventKind::UnDeployDeployment => "UnDeployDeployment",
            EventKind::BeforeDeploy => "BeforeDeploy",
            EventKind::AfterDeploy => "AfterDeploy",
            EventKind::BeforeUnDeploy => "BeforeUnDeploy",
            EventKind::AfterUnDeploy => "AfterUnDeploy",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event published by the deployment controller.
///
/// The per-deployment triggers carry the whole [`Deployment`]; the
/// before/after events carry only its description.
#[derive(Debug, Clone, Copy)]
pub enum DeploymentEvent<'a> {
    DeployDeployment {
        container: &'a Container,
        deployment: &'a Deployment,
    },
    UnDeployDeployment {
        container: &'a Container,
        deployment: &'a Deployment,
    },
    BeforeDeploy {
        container: &'a Container,
        description: &'a DeploymentDescription,
    },
    AfterDeploy {
        container: &'a Container,
        description: &'a DeploymentDescription,
    },
    BeforeUnDeploy {
        container: &'a Container,
        description: &'a DeploymentDescription,
    },
    AfterUnDeploy {
        container: &'a Container,
        description: &'a DeploymentDescription,
    },
}

impl<'a> DeploymentEvent<'a> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DeployDeployment { .. } => EventKind::DeployDeployment,
            Self::UnDeployDeployment { .. } => EventKind::UnDeployDeployment,
            Self::BeforeDeploy { .. } => EventKind::BeforeDeploy,
            Self::AfterDeploy { .. } => EventKind::AfterDeploy,
            Self::BeforeUnDeploy { .. } => EventKind::BeforeUnDeploy,
            Self::AfterUnDeploy { .. } => EventKind::AfterUnDeploy,
        }
    }

    pub fn container(&self) -> &'a Container {
        match *self {
            Self::DeployDeployment { container, .. }
            | Self::UnDeployDeployment { container, .. }
            | Self::BeforeDeploy { container, .. }
            | Self::AfterDeploy { container, .. }
            | Self::BeforeUnDeploy { container, .. }
            | Self::AfterUnDeploy { container, .. } => container,
        }
    }

    pub fn description(&self) -> &'a DeploymentDescription {
        match *self {
            Self::DeployDeployment { deployment, .. }
            | Self::UnDeployDeployment { deployment, .. } => deployment.description(),
            Self::BeforeDeploy { description, .. }
            | Self::AfterDeploy { description, .. }
            | Self::BeforeUnDeploy { description, .. }
            | Self::AfterUnDeploy { description, .. } => description,
        }
    }
}

pub type EventHandler =
    Arc<dyn Fn(&DeploymentEvent<'_>, &DeploymentScope<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Ordered handler lists keyed by event kind.
#[derive(Default)]
pub struct EventChannel {
    handlers: HashMap<EventKind, Vec<EventHandler>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one kind of event.
    pub fn on<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&DeploymentEvent<'_>, &DeploymentScope<'_>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.entry(kind).or_default().push(Arc::new(handler));
    }

    /// Register one handler for every kind of event.
    pub fn on_all<F>(&mut self, handler: F)
    where
        F: Fn(&DeploymentEvent<'_>, &DeploymentScope<'_>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        let handler: EventHandler = Arc::new(handler);
        for kind in EventKind::ALL {
            self.handlers
                .entry(kind)
                .or_default()
                .push(Arc::clone(&handler));
        }
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver an event to its handlers, stopping at the first failure.
    pub fn publish(
        &self,
        event: &DeploymentEvent<'_>,
        scope: &DeploymentScope<'_>,
    ) -> ControllerResult<()> {
        let kind = event.kind();
        tracing::debug!(
            event = %kind,
            container = event.container().name(),
            deployment = %event.description().name,
            "publishing deployment event"
        );

        let Some(handlers) = self.handlers.get(&kind) else {
            return Ok(());
        };
        for handler in handlers {
            handler(event, scope).map_err(|source| ControllerError::Observer {
                event: kind,
                source,
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .handlers
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        f.debug_struct("EventChannel")
            .field("handlers", &counts)
            .finish()
    }
}
