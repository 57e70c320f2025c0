//! Shared core types used across the scenario, container and controller layers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of one execution environment configuration.
///
/// Used as the lookup key between deployments and the container bound to them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetName(String);

impl TargetName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TargetName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Result of a successful archive deploy.
///
/// The controller never looks inside; it only binds the value into the
/// deployment scope so later consumers (protocol clients, enrichers) can
/// find out how to reach the deployed artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtocolMetaData {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    contexts: BTreeMap<String, Value>,
}

impl ProtocolMetaData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named context, replacing any previous context of the same name.
    pub fn with_context(mut self, name: impl Into<String>, value: Value) -> Self {
        self.contexts.insert(name.into(), value);
        self
    }

    pub fn context(&self, name: &str) -> Option<&Value> {
        self.contexts.get(name)
    }

    pub fn contexts(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.contexts.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
