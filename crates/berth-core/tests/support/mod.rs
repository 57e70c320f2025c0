#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use berth_core::prelude::*;
use serde_json::json;

/// Ordered record of container calls and published events, shared between
/// the recording container and the event handlers.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }

    /// Entries starting with `prefix`, in order.
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }
}

/// Container that records every call and fails on request.
pub struct RecordingContainer {
    journal: Journal,
    fail_deploy: HashSet<String>,
    fail_undeploy: HashSet<String>,
}

impl RecordingContainer {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_deploy: HashSet::new(),
            fail_undeploy: HashSet::new(),
        }
    }

    /// Fail deploys of the archive or descriptor with this file name.
    pub fn failing_deploy(mut self, artifact: &str) -> Self {
        self.fail_deploy.insert(artifact.to_string());
        self
    }

    /// Fail undeploys of the archive or descriptor with this file name.
    pub fn failing_undeploy(mut self, artifact: &str) -> Self {
        self.fail_undeploy.insert(artifact.to_string());
        self
    }

    fn check(&self, failing: &HashSet<String>, action: &str, artifact: &str) -> anyhow::Result<()> {
        self.journal.push(format!("{action}:{artifact}"));
        if failing.contains(artifact) {
            anyhow::bail!("{action} of {artifact} rejected by container");
        }
        Ok(())
    }
}

impl DeployableContainer for RecordingContainer {
    fn deploy_archive(&self, archive: &Archive) -> anyhow::Result<ProtocolMetaData> {
        self.check(&self.fail_deploy, "deploy", &archive.name)?;
        Ok(metadata_for(&archive.name))
    }

    fn undeploy_archive(&self, archive: &Archive) -> anyhow::Result<()> {
        self.check(&self.fail_undeploy, "undeploy", &archive.name)
    }

    fn deploy_descriptor(&self, descriptor: &Descriptor) -> anyhow::Result<()> {
        self.check(&self.fail_deploy, "deploy", &descriptor.name)
    }

    fn undeploy_descriptor(&self, descriptor: &Descriptor) -> anyhow::Result<()> {
        self.check(&self.fail_undeploy, "undeploy", &descriptor.name)
    }
}

/// Metadata the recording container returns for an archive.
pub fn metadata_for(archive: &str) -> ProtocolMetaData {
    ProtocolMetaData::new().with_context("http", json!({ "context_root": archive }))
}

pub fn container(name: &str, target: &str, deployable: RecordingContainer) -> Container {
    Container::new(name, target, Box::new(deployable))
}

pub fn archive_deployment(name: &str, target: &str) -> DeploymentDescription {
    DeploymentDescription::archive(name, target, Archive::new(format!("{name}.war"), name))
}

pub fn descriptor_deployment(name: &str, target: &str) -> DeploymentDescription {
    DeploymentDescription::descriptor(name, target, Descriptor::new(format!("{name}.xml"), name))
}

/// Journal every published event as `Kind(container,deployment)`.
pub fn record_events(channel: &mut EventChannel, journal: &Journal) {
    let journal = journal.clone();
    channel.on_all(move |event, _scope| {
        journal.push(format!(
            "{}({},{})",
            event.kind(),
            event.container().name(),
            event.description().name
        ));
        Ok(())
    });
}
