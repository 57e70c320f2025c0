//! Container layer: the physical deploy/undeploy capability and the live
//! containers bound to targets.

pub mod registry;

pub use registry::{ContainerRegistry, RegistrationError};

use std::fmt;

use crate::deployment::{Archive, Descriptor};
use crate::types::{ProtocolMetaData, TargetName};

/// Physical actuator that ships artifacts to an execution environment.
///
/// Errors are implementation-defined. Calls may block for as long as the
/// underlying transport needs; no timeout is applied by the caller.
pub trait DeployableContainer: Send + Sync {
    /// Deploy an archive and report how to reach it.
    fn deploy_archive(&self, archive: &Archive) -> anyhow::Result<ProtocolMetaData>;

    fn undeploy_archive(&self, archive: &Archive) -> anyhow::Result<()>;

    fn deploy_descriptor(&self, descriptor: &Descriptor) -> anyhow::Result<()>;

    fn undeploy_descriptor(&self, descriptor: &Descriptor) -> anyhow::Result<()>;
}

/// A live container bound to exactly one target.
pub struct Container {
    name: String,
    target: TargetName,
    deployable: Box<dyn DeployableContainer>,
}

impl Container {
    pub fn new(
        name: impl Into<String>,
        target: impl Into<TargetName>,
        deployable: Box<dyn DeployableContainer>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            deployable,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &TargetName {
        &self.target
    }

    pub fn deployable(&self) -> &dyn DeployableContainer {
        self.deployable.as_ref()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
