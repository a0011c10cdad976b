//! Start/stop sequencing of the launcher against spy collaborators.

use std::time::Duration;

use presenter_server::collaborator::AppType;
use presenter_server::lifecycle::instance::InstanceLock;
use presenter_server::lifecycle::{launch_with, Launcher, RunOutcome, StartOutcome, TerminationSignal};
use tokio::sync::oneshot;

mod common;

#[tokio::test]
async fn missing_handle_never_starts_web() {
    let (collaborators, log) = common::spies(false, true);
    let mut launcher = Launcher::new(AppType::Display, collaborators);

    assert_eq!(launcher.start_application().await, StartOutcome::StartupAborted);
    assert_eq!(log.calls(), ["app.run"]);
    assert!(!launcher.is_running());

    // Nothing to stop.
    launcher.stop_application().await;
    assert_eq!(log.calls(), ["app.run"]);
}

#[tokio::test]
async fn handle_and_web_success_is_started() {
    let (collaborators, log) = common::spies(true, true);
    let mut launcher = Launcher::new(AppType::Display, collaborators);

    assert_eq!(launcher.start_application().await, StartOutcome::Started);
    assert_eq!(log.calls(), ["app.run", "web.start"]);
    assert!(launcher.is_running());
}

#[tokio::test]
async fn web_failure_stops_application_again() {
    let (collaborators, log) = common::spies(true, false);
    let mut launcher = Launcher::new(AppType::Display, collaborators);

    assert_eq!(launcher.start_application().await, StartOutcome::WebFailed);
    assert_eq!(log.calls(), ["app.run", "web.start", "app.stop"]);
    assert!(!launcher.is_running());
}

#[tokio::test]
async fn stop_runs_web_before_app_exactly_once() {
    let (collaborators, log) = common::spies(true, true);
    let mut launcher = Launcher::new(AppType::Display, collaborators);
    launcher.start_application().await;

    launcher.handle_termination_signal(TerminationSignal::Terminate).await;
    launcher.handle_termination_signal(TerminationSignal::Interrupt).await;

    assert_eq!(log.calls(), ["app.run", "web.start", "web.stop", "app.stop"]);
}

#[tokio::test]
async fn signal_during_serving_stops_and_returns() {
    let (collaborators, log) = common::spies(true, true);
    let launcher = Launcher::new(AppType::Display, collaborators);
    let (tx, rx) = oneshot::channel();

    let run = tokio::spawn(launcher.run_until(async move { rx.await.unwrap_or(TerminationSignal::Terminate) }));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(log.count("web.stop"), 0);

    tx.send(TerminationSignal::Interrupt).unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(2), run).await.unwrap().unwrap();

    assert_eq!(outcome, RunOutcome::Stopped(TerminationSignal::Interrupt));
    assert_eq!(log.calls(), ["app.run", "web.start", "web.stop", "app.stop"]);
}

#[tokio::test]
async fn aborted_start_ignores_termination_future() {
    let (collaborators, log) = common::spies(false, true);
    let launcher = Launcher::new(AppType::Display, collaborators);

    let outcome = launcher.run_until(std::future::pending()).await;
    assert_eq!(outcome, RunOutcome::StartupAborted);
    assert_eq!(log.calls(), ["app.run"]);
}

#[tokio::test]
async fn duplicate_instance_starts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config(dir.path());
    let _held = InstanceLock::try_acquire(dir.path(), AppType::Display).unwrap().unwrap();

    let (collaborators, log) = common::spies(true, true);
    let outcome = launch_with(AppType::Display, &config, collaborators).await.unwrap();

    assert_eq!(outcome, RunOutcome::AlreadyRunning);
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn launch_with_failed_app_returns_after_instance_check() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config(dir.path());

    let (collaborators, log) = common::spies(false, true);
    let outcome = launch_with(AppType::Display, &config, collaborators).await.unwrap();

    assert_eq!(outcome, RunOutcome::StartupAborted);
    assert_eq!(log.calls(), ["app.run"]);

    // The guard was released when launch returned.
    assert!(InstanceLock::try_acquire(dir.path(), AppType::Display).unwrap().is_some());
}
