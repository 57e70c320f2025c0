//! Berth Core Library
//!
//! Deployment lifecycle control for test orchestration: brings the
//! deployments of a scenario up on, and down from, the containers bound to
//! their targets, publishing lifecycle events around every physical action.

pub mod config;
pub mod container;
pub mod controller;
pub mod deployment;
pub mod error;
pub mod event;
pub mod scenario;
pub mod scope;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Controller
    pub use crate::controller::{ControllerTrigger, DeploymentController};
    pub use crate::error::{ControllerError, ControllerResult, ScenarioError};

    // Events and scope
    pub use crate::event::{DeploymentEvent, EventChannel, EventKind};
    pub use crate::scope::{DeploymentScope, ScopeRole};

    // Containers
    pub use crate::container::{Container, ContainerRegistry, DeployableContainer};

    // Deployments
    pub use crate::deployment::{
        Archive, Deployment, DeploymentDescription, DeploymentKind, Descriptor,
    };
    pub use crate::scenario::DeploymentScenario;
    pub use crate::types::{ProtocolMetaData, TargetName};

    // Configuration
    pub use crate::config::{ScenarioConfig, load_scenario};
}
