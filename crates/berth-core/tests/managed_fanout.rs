//! Tests for the managed deploy/undeploy fan-out across targets.

mod support;

use berth_core::prelude::*;
use support::{Journal, RecordingContainer, archive_deployment, container, record_events};

fn trigger_entries(journal: &Journal) -> Vec<String> {
    journal
        .entries()
        .into_iter()
        .filter(|e| e.starts_with("DeployDeployment") || e.starts_with("UnDeployDeployment"))
        .collect()
}

#[test]
fn deploy_managed_skips_targets_without_startup_deployments() {
    let journal = Journal::default();
    let mut registry = ContainerRegistry::new();
    registry
        .register(container("c1", "t1", RecordingContainer::new(&journal)))
        .unwrap();
    // No container for t2: a lookup would fail the run.

    let mut scenario = DeploymentScenario::new();
    scenario.add(archive_deployment("d1", "t1")).unwrap();
    scenario.add(archive_deployment("d2", "t1")).unwrap();
    scenario
        .add(archive_deployment("manual", "t2").with_managed(false))
        .unwrap();

    let mut events = EventChannel::new();
    record_events(&mut events, &journal);

    DeploymentController::new(&registry, &events)
        .deploy_managed(&scenario)
        .unwrap();

    assert_eq!(
        trigger_entries(&journal),
        vec!["DeployDeployment(c1,d1)", "DeployDeployment(c1,d2)"]
    );
    assert!(journal.matching("deploy:manual").is_empty());
}

#[test]
fn deploy_managed_stops_at_first_failure() {
    let journal = Journal::default();
    let mut registry = ContainerRegistry::new();
    registry
        .register(container(
            "c1",
            "t1",
            RecordingContainer::new(&journal).failing_deploy("d1.war"),
        ))
        .unwrap();
    registry
        .register(container("c2", "t2", RecordingContainer::new(&journal)))
        .unwrap();

    let mut scenario = DeploymentScenario::new();
    scenario.add(archive_deployment("d1", "t1")).unwrap();
    scenario.add(archive_deployment("d2", "t1")).unwrap();
    scenario.add(archive_deployment("d3", "t2")).unwrap();

    let mut events = EventChannel::new();
    record_events(&mut events, &journal);

    let err = DeploymentController::new(&registry, &events)
        .deploy_managed(&scenario)
        .unwrap_err();

    assert!(matches!(err, ControllerError::Deploy { ref deployment, .. } if deployment == "d1"));
    assert_eq!(journal.matching("deploy:"), vec!["deploy:d1.war"]);
    assert_eq!(trigger_entries(&journal), vec!["DeployDeployment(c1,d1)"]);
    assert_eq!(journal.count("AfterDeploy(c1,d1)"), 0);
}

#[test]
fn deploy_managed_preserves_target_and_order_sequence() {
    let journal = Journal::default();
    let mut registry = ContainerRegistry::new();
    registry
        .register(container("c1", "t1", RecordingContainer::new(&journal)))
        .unwrap();
    registry
        .register(container("c2", "t2", RecordingContainer::new(&journal)))
        .unwrap();

    let mut scenario = DeploymentScenario::new();
    scenario.add(archive_deployment("b", "t2")).unwrap();
    scenario
        .add(archive_deployment("late", "t1").with_order(10))
        .unwrap();
    scenario.add(archive_deployment("a", "t1")).unwrap();
    scenario.add(archive_deployment("c", "t2")).unwrap();

    let events = EventChannel::new();
    DeploymentController::new(&registry, &events)
        .deploy_managed(&scenario)
        .unwrap();

    assert_eq!(
        journal.matching("deploy:"),
        vec!["deploy:b.war", "deploy:c.war", "deploy:a.war", "deploy:late.war"]
    );
}

#[test]
fn deploy_managed_reports_missing_container() {
    let registry = ContainerRegistry::new();
    let mut scenario = DeploymentScenario::new();
    scenario.add(archive_deployment("app", "nowhere")).unwrap();

    let events = EventChannel::new();
    let err = DeploymentController::new(&registry, &events)
        .deploy_managed(&scenario)
        .unwrap_err();

    assert!(matches!(err, ControllerError::ContainerNotFound(ref t) if t.as_str() == "nowhere"));
}

#[test]
fn observer_failure_aborts_fan_out() {
    let journal = Journal::default();
    let mut registry = ContainerRegistry::new();
    registry
        .register(container("c1", "t1", RecordingContainer::new(&journal)))
        .unwrap();

    let mut scenario = DeploymentScenario::new();
    scenario.add(archive_deployment("d1", "t1")).unwrap();
    scenario.add(archive_deployment("d2", "t1")).unwrap();

    let mut events = EventChannel::new();
    events.on(EventKind::BeforeDeploy, |_, _| {
        anyhow::bail!("environment not ready")
    });

    let err = DeploymentController::new(&registry, &events)
        .deploy_managed(&scenario)
        .unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Observer {
            event: EventKind::BeforeDeploy,
            ..
        }
    ));
    assert!(journal.matching("deploy:").is_empty());
}

#[test]
fn undeploy_managed_mirrors_deploy_order() {
    let journal = Journal::default();
    let mut registry = ContainerRegistry::new();
    registry
        .register(container("c1", "t1", RecordingContainer::new(&journal)))
        .unwrap();

    let mut scenario = DeploymentScenario::new();
    scenario.add(archive_deployment("d1", "t1")).unwrap();
    scenario.add(archive_deployment("d2", "t1")).unwrap();
    scenario
        .add(archive_deployment("manual", "t1").with_managed(false))
        .unwrap();

    let mut events = EventChannel::new();
    record_events(&mut events, &journal);

    DeploymentController::new(&registry, &events)
        .undeploy_managed(&scenario)
        .unwrap();

    assert_eq!(
        trigger_entries(&journal),
        vec!["UnDeployDeployment(c1,d1)", "UnDeployDeployment(c1,d2)"]
    );
    assert_eq!(
        journal.matching("undeploy:"),
        vec!["undeploy:d1.war", "undeploy:d2.war"]
    );
}

#[test]
fn undeploy_managed_stops_at_first_failure() {
    let journal = Journal::default();
    let mut registry = ContainerRegistry::new();
    registry
        .register(container(
            "c1",
            "t1",
            RecordingContainer::new(&journal).failing_undeploy("d1.war"),
        ))
        .unwrap();
    registry
        .register(container("c2", "t2", RecordingContainer::new(&journal)))
        .unwrap();

    let mut scenario = DeploymentScenario::new();
    scenario.add(archive_deployment("d1", "t1")).unwrap();
    scenario.add(archive_deployment("d2", "t1")).unwrap();
    scenario.add(archive_deployment("d3", "t2")).unwrap();

    let mut events = EventChannel::new();
    record_events(&mut events, &journal);

    let err = DeploymentController::new(&registry, &events)
        .undeploy_managed(&scenario)
        .unwrap_err();

    assert!(matches!(err, ControllerError::Undeploy { ref deployment, .. } if deployment == "d1"));
    assert_eq!(journal.matching("undeploy:"), vec!["undeploy:d1.war"]);
    assert_eq!(trigger_entries(&journal), vec!["UnDeployDeployment(c1,d1)"]);
    assert!(journal.matching("AfterUnDeploy").is_empty());
}

#[test]
fn dispatch_routes_managed_triggers() {
    let journal = Journal::default();
    let mut registry = ContainerRegistry::new();
    registry
        .register(container("c1", "t1", RecordingContainer::new(&journal)))
        .unwrap();

    let mut scenario = DeploymentScenario::new();
    scenario.add(archive_deployment("d1", "t1")).unwrap();

    let events = EventChannel::new();
    let controller = DeploymentController::new(&registry, &events);
    controller
        .dispatch(ControllerTrigger::DeployManagedDeployments(&scenario))
        .unwrap();
    controller
        .dispatch(ControllerTrigger::UnDeployManagedDeployments(&scenario))
        .unwrap();

    assert_eq!(
        journal.entries(),
        vec!["deploy:d1.war", "undeploy:d1.war"]
    );
}
