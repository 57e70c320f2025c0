//! Berth - deployment lifecycle rehearsal
//!
//! Usage:
//!   berth validate              # Check berth.toml and container bindings
//!   berth plan                  # Rehearse managed deploy/undeploy
//!   berth plan --fail-deploy app.war --format json

mod journal;
mod simulated;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use berth_core::config::{SCENARIO_FILE_NAME, ScenarioConfig, load_scenario};
use berth_core::prelude::*;

use crate::journal::{Journal, JournalEntry};
use crate::simulated::{FailurePlan, SimulatedContainer};

#[derive(Parser)]
#[command(name = "berth")]
#[command(about = "Deployment lifecycle rehearsal for test scenarios", long_about = None)]
struct Cli {
    /// Scenario file
    #[arg(long, short, global = true, default_value = SCENARIO_FILE_NAME)]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the scenario file and that every startup target has a container
    Validate {
        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },

    /// Rehearse managed deploy then undeploy against simulated containers
    Plan {
        /// Make the deploy of this artifact fail (repeatable)
        #[arg(long = "fail-deploy", value_name = "ARTIFACT")]
        fail_deploy: Vec<String>,

        /// Make the undeploy of this artifact fail (repeatable)
        #[arg(long = "fail-undeploy", value_name = "ARTIFACT")]
        fail_undeploy: Vec<String>,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "berth=debug,berth_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { format } => run_validate(&cli.file, format),
        Commands::Plan {
            fail_deploy,
            fail_undeploy,
            format,
        } => {
            let failures = FailurePlan {
                deploy: fail_deploy.into_iter().collect::<HashSet<_>>(),
                undeploy: fail_undeploy.into_iter().collect::<HashSet<_>>(),
            };
            run_plan(&cli.file, failures, format)
        }
    }
}

fn run_validate(file: &Path, format: OutputFormat) -> Result<()> {
    let (config, scenario) = load_scenario(file)?;
    let registry = build_registry(&config, &FailurePlan::default(), &Journal::default())?;
    let validation = scenario.validate(&registry);

    match format {
        OutputFormat::Table => {
            for target in scenario.targets() {
                let container = registry
                    .get(target)
                    .map_or("<none>", |c| c.name());
                let startup: Vec<&str> = scenario
                    .startup_deployments_for(target)
                    .into_iter()
                    .map(Deployment::name)
                    .collect();
                println!(
                    "{:<16} {:<16} {}",
                    target.as_str(),
                    container,
                    if startup.is_empty() {
                        "-".to_string()
                    } else {
                        startup.join(", ")
                    }
                );
            }
        }
        OutputFormat::Json => {
            let report = serde_json::json!({
                "valid": validation.is_ok(),
                "targets": scenario
                    .targets()
                    .into_iter()
                    .map(|target| serde_json::json!({
                        "target": target.as_str(),
                        "container": registry.get(target).map(|c| c.name()),
                        "startup": scenario
                            .startup_deployments_for(target)
                            .into_iter()
                            .map(Deployment::name)
                            .collect::<Vec<_>>(),
                    }))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    validation.with_context(|| format!("{} is not runnable", file.display()))
}

fn run_plan(file: &Path, failures: FailurePlan, format: OutputFormat) -> Result<()> {
    let (config, scenario) = load_scenario(file)?;
    let journal = Journal::default();
    let registry = build_registry(&config, &failures, &journal)?;
    scenario.validate(&registry)?;

    let rehearsal = rehearse(&scenario, &registry, &journal);
    print_journal(&journal.entries(), format)?;

    match (rehearsal.deployed, rehearsal.undeployed) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(err), _) | (Ok(()), Err(err)) => Err(err).context("rehearsal failed"),
    }
}

/// Outcome of a managed deploy followed by the matching undeploy.
struct Rehearsal {
    deployed: ControllerResult<()>,
    undeployed: ControllerResult<()>,
}

/// Deploy the scenario's managed deployments, then take them down again.
///
/// A deployment whose physical deploy failed is marked errored before the
/// undeploy phase. After a failed deploy only the deployments the controller
/// started are undeployed.
fn rehearse(
    scenario: &DeploymentScenario,
    registry: &ContainerRegistry,
    journal: &Journal,
) -> Rehearsal {
    let mut events = EventChannel::new();
    journal.attach(&mut events);
    let controller = DeploymentController::new(registry, &events);

    let deployed = controller.deploy_managed(scenario);
    let undeployed = match &deployed {
        Ok(()) => controller.undeploy_managed(scenario),
        Err(err) => {
            tracing::error!(error = %error_chain(err), "managed deploy failed");
            if let Some(deployment) = err
                .failed_deployment()
                .and_then(|name| scenario.deployment(name))
            {
                deployment.mark_deployment_error(error_chain(err));
            }
            undeploy_started(&controller, scenario, registry, &journal.started_deployments())
        }
    };
    if let Err(err) = &undeployed {
        tracing::error!(error = %error_chain(err), "managed undeploy failed");
    }

    Rehearsal {
        deployed,
        undeployed,
    }
}

/// Managed undeploy restricted to `started`, in the same order and with the
/// same first-failure stop as [`DeploymentController::undeploy_managed`].
fn undeploy_started(
    controller: &DeploymentController<'_>,
    scenario: &DeploymentScenario,
    registry: &ContainerRegistry,
    started: &HashSet<String>,
) -> ControllerResult<()> {
    for target in scenario.targets() {
        for deployment in scenario
            .startup_deployments_for(target)
            .into_iter()
            .filter(|d| started.contains(d.name()))
        {
            let container = registry.lookup(target)?;
            controller.dispatch(ControllerTrigger::UnDeployDeployment {
                container,
                deployment,
            })?;
        }
    }
    Ok(())
}

fn build_registry(
    config: &ScenarioConfig,
    failures: &FailurePlan,
    journal: &Journal,
) -> Result<ContainerRegistry> {
    let mut registry = ContainerRegistry::new();
    for entry in &config.containers {
        let simulated = SimulatedContainer::new(
            &entry.name,
            entry.properties.clone(),
            failures.clone(),
            journal.clone(),
        );
        registry.register(Container::new(
            &entry.name,
            entry.target.as_str(),
            Box::new(simulated),
        ))?;
    }
    Ok(registry)
}

fn print_journal(entries: &[JournalEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for entry in entries {
                let metadata = entry
                    .metadata
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?
                    .unwrap_or_default();
                println!(
                    "{} {:<20} {:<16} {:<24} {}",
                    entry.at.format("%H:%M:%S%.3f"),
                    entry.action,
                    entry.container,
                    entry.subject,
                    metadata
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entries)?);
        }
    }
    Ok(())
}

fn error_chain(err: &ControllerError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}
