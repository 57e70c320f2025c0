//! Deployment descriptions and their runtime error state.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::types::TargetName;

/// A packaged artifact shipped to a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub name: String,
    pub path: PathBuf,
}

impl Archive {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A container-specific resource descriptor (datasource, queue, ...) deployed
/// without an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    pub path: PathBuf,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// What a deployment ships: exactly one of an archive or a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentKind {
    Archive {
        archive: Archive,
        /// Replaces `archive` for both deploy and undeploy when present.
        testable: Option<Archive>,
    },
    Descriptor(Descriptor),
}

/// Static description of a deployment as declared in a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentDescription {
    pub name: String,
    pub target: TargetName,
    /// Managed deployments are deployed at startup and undeployed at shutdown.
    pub managed: bool,
    /// Sort key among the startup deployments of one target.
    pub order: i32,
    pub kind: DeploymentKind,
}

impl DeploymentDescription {
    pub fn archive(
        name: impl Into<String>,
        target: impl Into<TargetName>,
        archive: Archive,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            managed: true,
            order: 0,
            kind: DeploymentKind::Archive {
                archive,
                testable: None,
            },
        }
    }

    pub fn descriptor(
        name: impl Into<String>,
        target: impl Into<TargetName>,
        descriptor: Descriptor,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            managed: true,
            order: 0,
            kind: DeploymentKind::Descriptor(descriptor),
        }
    }

    /// Attach a testable archive. Ignored for descriptor deployments, which
    /// have nothing to enrich.
    pub fn with_testable_archive(mut self, testable: Archive) -> Self {
        if let DeploymentKind::Archive { testable: slot, .. } = &mut self.kind {
            *slot = Some(testable);
        }
        self
    }

    pub fn with_managed(mut self, managed: bool) -> Self {
        self.managed = managed;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn is_archive_deployment(&self) -> bool {
        matches!(self.kind, DeploymentKind::Archive { .. })
    }

    /// The archive handed to the container: the testable archive if one was
    /// attached, the primary archive otherwise. `None` for descriptors.
    pub fn deployable_archive(&self) -> Option<&Archive> {
        match &self.kind {
            DeploymentKind::Archive { archive, testable } => {
                Some(testable.as_ref().unwrap_or(archive))
            }
            DeploymentKind::Descriptor(_) => None,
        }
    }

    pub fn descriptor_ref(&self) -> Option<&Descriptor> {
        match &self.kind {
            DeploymentKind::Descriptor(descriptor) => Some(descriptor),
            DeploymentKind::Archive { .. } => None,
        }
    }
}

/// A deployment description plus the runtime state other components record
/// about it.
#[derive(Debug)]
pub struct Deployment {
    description: DeploymentDescription,
    error: OnceLock<String>,
}

impl Deployment {
    pub fn new(description: DeploymentDescription) -> Self {
        Self {
            description,
            error: OnceLock::new(),
        }
    }

    pub fn description(&self) -> &DeploymentDescription {
        &self.description
    }

    pub fn name(&self) -> &str {
        &self.description.name
    }

    pub fn target(&self) -> &TargetName {
        &self.description.target
    }

    /// Record that this deployment failed to come up.
    ///
    /// The flag is write-once: returns `false` and keeps the original reason
    /// if an error was already recorded.
    pub fn mark_deployment_error(&self, reason: impl Into<String>) -> bool {
        self.error.set(reason.into()).is_ok()
    }

    pub fn has_deployment_error(&self) -> bool {
        self.error.get().is_some()
    }

    pub fn deployment_error(&self) -> Option<&str> {
        self.error.get().map(String::as_str)
    }
}

impl From<DeploymentDescription> for Deployment {
    fn from(description: DeploymentDescription) -> Self {
        Self::new(description)
    }
}
