//! In-memory container used by `berth plan` to rehearse a scenario without
//! shipping anything.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use berth_core::prelude::*;
use serde_json::json;

use crate::journal::Journal;

/// Failures to inject into a rehearsal, keyed by deployment artifact name.
#[derive(Debug, Clone, Default)]
pub struct FailurePlan {
    pub deploy: HashSet<String>,
    pub undeploy: HashSet<String>,
}

pub struct SimulatedContainer {
    name: String,
    properties: BTreeMap<String, String>,
    failures: FailurePlan,
    deployed: Mutex<HashSet<String>>,
    journal: Journal,
}

impl SimulatedContainer {
    pub fn new(
        name: &str,
        properties: BTreeMap<String, String>,
        failures: FailurePlan,
        journal: Journal,
    ) -> Self {
        Self {
            name: name.to_string(),
            properties,
            failures,
            deployed: Mutex::new(HashSet::new()),
            journal,
        }
    }

    fn deploy(&self, artifact: &str) -> anyhow::Result<()> {
        self.journal.record_call(&self.name, "deploy", artifact);
        if self.failures.deploy.contains(artifact) {
            anyhow::bail!("simulated deploy failure for {artifact}");
        }
        self.deployed_set()?.insert(artifact.to_string());
        Ok(())
    }

    fn undeploy(&self, artifact: &str) -> anyhow::Result<()> {
        self.journal.record_call(&self.name, "undeploy", artifact);
        if self.failures.undeploy.contains(artifact) {
            anyhow::bail!("simulated undeploy failure for {artifact}");
        }
        if !self.deployed_set()?.remove(artifact) {
            anyhow::bail!("{artifact} is not deployed on {}", self.name);
        }
        Ok(())
    }

    fn deployed_set(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashSet<String>>> {
        self.deployed
            .lock()
            .map_err(|_| anyhow::anyhow!("deployment table of {} is poisoned", self.name))
    }
}

impl DeployableContainer for SimulatedContainer {
    fn deploy_archive(&self, archive: &Archive) -> anyhow::Result<ProtocolMetaData> {
        self.deploy(&archive.name)?;
        let context_root = archive
            .name
            .rsplit_once('.')
            .map_or(archive.name.as_str(), |(stem, _)| stem);
        let port = self
            .properties
            .get("port")
            .map_or("8080", String::as_str);
        Ok(ProtocolMetaData::new().with_context(
            "http",
            json!({ "url": format!("http://localhost:{port}/{context_root}") }),
        ))
    }

    fn undeploy_archive(&self, archive: &Archive) -> anyhow::Result<()> {
        self.undeploy(&archive.name)
    }

    fn deploy_descriptor(&self, descriptor: &Descriptor) -> anyhow::Result<()> {
        self.deploy(&descriptor.name)
    }

    fn undeploy_descriptor(&self, descriptor: &Descriptor) -> anyhow::Result<()> {
        self.undeploy(&descriptor.name)
    }
}
