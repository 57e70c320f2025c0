//! TOML parser with helpful error messages

use super::schema::ScenarioConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse berth.toml with detailed error messages
pub fn parse_scenario_toml(path: &Path) -> Result<ScenarioConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;

    parse_scenario_toml_str(&content)
        .with_context(|| format!("Failed to parse scenario file: {}", path.display()))
}

/// Parse berth.toml content from string
pub fn parse_scenario_toml_str(content: &str) -> Result<ScenarioConfig> {
    let config: ScenarioConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    config.validate()?;

    Ok(config)
}

/// Enhance TOML parsing errors with the offending lines
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().to_string();

    match error.span() {
        Some(span) => {
            let offset = span.start.min(content.len());
            let line_num = content[..offset].matches('\n').count() + 1;
            let context = get_line_context(content, line_num);
            anyhow::anyhow!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                context,
                message
            )
        }
        None => anyhow::anyhow!("TOML parsing error: {}", message),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 2).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize a configuration to TOML string
pub fn to_toml(config: &ScenarioConfig) -> Result<String> {
    toml::to_string_pretty(config).with_context(|| "Failed to serialize scenario to TOML")
}
