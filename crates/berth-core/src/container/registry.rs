//! Container registry keyed by target.
//!
//! The registry owns every live container; the controller only borrows them
//! by target when it has work for that target.

use crate::error::{ControllerError, ControllerResult};
use crate::types::TargetName;

use super::Container;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("target '{target}' is already bound to container '{existing}'")]
    TargetAlreadyBound { target: TargetName, existing: String },
}

/// Registry of live containers, at most one per target.
#[derive(Debug, Default)]
pub struct ContainerRegistry {
    containers: Vec<Container>,
}

impl ContainerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            containers: Vec::new(),
        }
    }

    /// Register a container. Each target can be bound only once.
    pub fn register(&mut self, container: Container) -> Result<(), RegistrationError> {
        if let Some(existing) = self.get(container.target()) {
            return Err(RegistrationError::TargetAlreadyBound {
                target: container.target().clone(),
                existing: existing.name().to_string(),
            });
        }
        self.containers.push(container);
        Ok(())
    }

    /// All registered containers in registration order.
    pub fn all(&self) -> &[Container] {
        &self.containers
    }

    /// Get the container bound to a target.
    pub fn get(&self, target: &TargetName) -> Option<&Container> {
        self.containers.iter().find(|c| c.target() == target)
    }

    /// Resolve the container bound to a target, failing if none is registered.
    pub fn lookup(&self, target: &TargetName) -> ControllerResult<&Container> {
        self.get(target)
            .ok_or_else(|| ControllerError::ContainerNotFound(target.clone()))
    }

    pub fn contains(&self, target: &TargetName) -> bool {
        self.get(target).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
