//! Scenario configuration (berth.toml).

pub mod parser;
pub mod schema;

use std::path::Path;

use anyhow::Context;

pub use parser::{parse_scenario_toml, parse_scenario_toml_str, to_toml};
pub use schema::{ContainerEntry, DeploymentEntry, ScenarioConfig};

use crate::scenario::DeploymentScenario;

/// Default scenario file name looked up in the working directory.
pub const SCENARIO_FILE_NAME: &str = "berth.toml";

/// Load a scenario file and build its deployment scenario.
///
/// Relative artifact paths are resolved against the file's directory.
pub fn load_scenario(path: &Path) -> anyhow::Result<(ScenarioConfig, DeploymentScenario)> {
    let config = parse_scenario_toml(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let scenario = config
        .to_scenario(base_dir)
        .with_context(|| format!("Failed to build scenario from {}", path.display()))?;
    Ok((config, scenario))
}
