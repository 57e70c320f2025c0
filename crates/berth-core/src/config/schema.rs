//! Configuration schema for berth.toml
//!
//! A scenario file declares the containers available to the run and the
//! deployments to bring up on them:
//!
//! ```toml
//! [[container]]
//! name = "wildfly"
//! target = "default"
//!
//! [[deployment]]
//! name = "shop"
//! target = "default"
//! archive = "target/shop.war"
//! testable_archive = "target/shop-test.war"
//!
//! [[deployment]]
//! name = "shop-ds"
//! target = "default"
//! order = -1
//! descriptor = "src/test/resources/shop-ds.xml"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::deployment::{Archive, DeploymentDescription, Descriptor};
use crate::scenario::DeploymentScenario;

/// Root configuration structure for berth.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default, rename = "container")]
    pub containers: Vec<ContainerEntry>,

    #[serde(default, rename = "deployment")]
    pub deployments: Vec<DeploymentEntry>,
}

/// Container declaration. The physical implementation is supplied by the
/// caller; `properties` are handed to it untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerEntry {
    pub name: String,

    pub target: String,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Deployment declaration (exactly one of `archive` or `descriptor`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentEntry {
    pub name: String,

    pub target: String,

    /// Deploy at startup and undeploy at shutdown
    #[serde(default = "default_managed")]
    pub managed: bool,

    #[serde(default)]
    pub order: i32,

    #[serde(default)]
    pub archive: Option<PathBuf>,

    /// Enriched archive shipped instead of `archive`
    #[serde(default)]
    pub testable_archive: Option<PathBuf>,

    #[serde(default)]
    pub descriptor: Option<PathBuf>,
}

fn default_managed() -> bool {
    true
}

impl ScenarioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let mut targets = HashSet::new();
        for container in &self.containers {
            container
                .validate()
                .with_context(|| format!("Invalid container '{}'", container.name))?;
            if !targets.insert(container.target.as_str()) {
                anyhow::bail!(
                    "Target '{}' is bound to more than one container",
                    container.target
                );
            }
        }

        let mut names = HashSet::new();
        for deployment in &self.deployments {
            deployment
                .validate()
                .with_context(|| format!("Invalid deployment '{}'", deployment.name))?;
            if !names.insert(deployment.name.as_str()) {
                anyhow::bail!("Deployment '{}' is declared more than once", deployment.name);
            }
        }
        Ok(())
    }

    /// Build the deployment scenario, resolving relative artifact paths
    /// against `base_dir`.
    pub fn to_scenario(&self, base_dir: &Path) -> anyhow::Result<DeploymentScenario> {
        let mut scenario = DeploymentScenario::new();
        for entry in &self.deployments {
            scenario.add(entry.to_description(base_dir)?)?;
        }
        Ok(scenario)
    }
}

impl ContainerEntry {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Container name must not be empty");
        }
        if self.target.trim().is_empty() {
            anyhow::bail!("Container target must not be empty");
        }
        Ok(())
    }
}

impl DeploymentEntry {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Deployment name must not be empty");
        }
        if self.target.trim().is_empty() {
            anyhow::bail!("Deployment target must not be empty");
        }
        match (&self.archive, &self.descriptor) {
            (Some(_), Some(_)) => {
                anyhow::bail!("Cannot specify both 'archive' and 'descriptor'")
            }
            (None, None) => anyhow::bail!("One of 'archive' or 'descriptor' is required"),
            (None, Some(_)) if self.testable_archive.is_some() => {
                anyhow::bail!("'testable_archive' requires 'archive'")
            }
            _ => Ok(()),
        }
    }

    pub fn to_description(&self, base_dir: &Path) -> anyhow::Result<DeploymentDescription> {
        self.validate()
            .with_context(|| format!("Invalid deployment '{}'", self.name))?;

        let description = match (&self.archive, &self.descriptor) {
            (Some(archive), _) => {
                let description = DeploymentDescription::archive(
                    &self.name,
                    self.target.as_str(),
                    Archive::new(file_name(archive), base_dir.join(archive)),
                );
                match &self.testable_archive {
                    Some(testable) => description.with_testable_archive(Archive::new(
                        file_name(testable),
                        base_dir.join(testable),
                    )),
                    None => description,
                }
            }
            (None, Some(descriptor)) => DeploymentDescription::descriptor(
                &self.name,
                self.target.as_str(),
                Descriptor::new(file_name(descriptor), base_dir.join(descriptor)),
            ),
            (None, None) => anyhow::bail!("One of 'archive' or 'descriptor' is required"),
        };

        Ok(description
            .with_managed(self.managed)
            .with_order(self.order))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
