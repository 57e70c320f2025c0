//! Timestamped record of a rehearsal: container calls and lifecycle events.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use berth_core::prelude::*;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    /// Event kind, or the container call (`deploy`/`undeploy`).
    pub action: String,
    pub container: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProtocolMetaData>,
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<JournalEntry>>>);

impl Journal {
    /// Entries are only ever appended, so a poisoned lock still guards a
    /// consistent list.
    fn lock(&self) -> MutexGuard<'_, Vec<JournalEntry>> {
        self.0.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("journal lock poisoned, recovering entries");
            poisoned.into_inner()
        })
    }

    fn push(&self, entry: JournalEntry) {
        self.lock().push(entry);
    }

    pub fn record_call(&self, container: &str, action: &str, artifact: &str) {
        self.push(JournalEntry {
            at: Utc::now(),
            action: action.to_string(),
            container: container.to_string(),
            subject: artifact.to_string(),
            metadata: None,
        });
    }

    pub fn record_event(&self, event: &DeploymentEvent<'_>, scope: &DeploymentScope<'_>) {
        let metadata = match event.kind() {
            EventKind::AfterDeploy => scope.protocol_metadata().cloned(),
            _ => None,
        };
        self.push(JournalEntry {
            at: Utc::now(),
            action: event.kind().to_string(),
            container: event.container().name().to_string(),
            subject: event.description().name.clone(),
            metadata,
        });
    }

    /// Subscribe this journal to every lifecycle event.
    pub fn attach(&self, events: &mut EventChannel) {
        let journal = self.clone();
        events.on_all(move |event, scope| {
            journal.record_event(event, scope);
            Ok(())
        });
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.lock().clone()
    }

    /// Names of the deployments the controller started deploying.
    pub fn started_deployments(&self) -> HashSet<String> {
        self.lock()
            .iter()
            .filter(|entry| entry.action == EventKind::DeployDeployment.as_str())
            .map(|entry| entry.subject.clone())
            .collect()
    }
}
