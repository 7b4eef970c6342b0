//! Integration tests for asynchronous hook tasks run by the worker pool.

mod helpers;

use std::time::Duration;

use serde_json::json;

use helpers::{Behaviour, TestApp, TestModule, case};
use iris_entity::{HookTask, TaskStatus};
use iris_modules::{BindRequest, TaskSubmitter};

const HOOK: &str = "on_postload_evidence_create";

#[tokio::test]
async fn test_fire_and_forget_task_runs_on_worker() {
    let module = TestModule::processor("hasher", Behaviour::Set("hashed", json!(true)));
    let (app, worker) = TestApp::with_worker(&[module.clone()]).await;
    let hasher = app.register("hasher").await;
    app.bind(BindRequest::new(hasher.module_id, HOOK)).await;

    let payload = json!({"evidence_id": 12, "filename": "disk.E01"});
    let result = app.manager.fire(HOOK, payload.clone(), &case()).await.expect("fire");
    assert_eq!(result, payload);

    drop(app);
    let stats = worker.drain().await;

    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.pending, 0);
    assert_eq!(module.received(), vec![(HOOK.to_string(), payload)]);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let module = TestModule::processor("flaky", Behaviour::FailFirst(2));
    let (app, worker) = TestApp::with_worker(&[module.clone()]).await;
    let flaky = app.register("flaky").await;
    app.bind(BindRequest::new(flaky.module_id, HOOK).max_retry(2)).await;

    app.manager.fire(HOOK, json!({"trail": []}), &case()).await.expect("fire");

    drop(app);
    let stats = worker.drain().await;

    assert_eq!(module.call_count(), 3);
    assert_eq!(stats.retried, 2);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_task_fails_once_retries_are_exhausted() {
    let module = TestModule::processor("stubborn", Behaviour::Fail);
    let (app, worker) = TestApp::with_worker(&[module.clone()]).await;
    let stubborn = app.register("stubborn").await;
    app.bind(BindRequest::new(stubborn.module_id, HOOK).max_retry(1)).await;

    let payload = json!({"evidence_id": 1});
    let result = app.manager.fire(HOOK, payload.clone(), &case()).await.expect("fire");
    assert_eq!(result, payload);

    drop(app);
    let stats = worker.drain().await;

    assert_eq!(module.call_count(), 2);
    assert_eq!(stats.retried, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.succeeded, 0);
}

#[tokio::test]
async fn test_wait_for_completion_blocks_the_firing_caller() {
    let module = TestModule::processor("archiver", Behaviour::NoData);
    let (app, worker) = TestApp::with_worker(&[module.clone()]).await;
    let archiver = app.register("archiver").await;
    app.bind(BindRequest::new(archiver.module_id, HOOK).wait_for_completion())
        .await;

    let payload = json!({"evidence_id": 5});
    let result = app.manager.fire(HOOK, payload.clone(), &case()).await.expect("fire");

    assert_eq!(result, payload);
    assert_eq!(module.call_count(), 1);
    assert_eq!(worker.monitor.stats().succeeded, 1);

    drop(app);
    worker.drain().await;
}

#[tokio::test]
async fn test_task_for_unregistered_module_fails_permanently() {
    let (app, worker) = TestApp::with_worker(&[]).await;

    let task = HookTask::new("vanished", HOOK, &json!({}), &case(), 3).expect("task");
    let ticket = worker.queue.submit(task).await.expect("submit");
    let outcome = ticket.wait(Duration::from_secs(5)).await.expect("outcome");

    assert_eq!(outcome.status, TaskStatus::Failed);
    assert_eq!(outcome.attempts, 1);
    assert!(outcome.result.message.contains("no longer registered"));

    drop(app);
    let stats = worker.drain().await;
    assert_eq!(stats.retried, 0);
}

#[tokio::test]
async fn test_module_deactivated_after_enqueue_is_not_run() {
    let module = TestModule::processor("paused", Behaviour::Trail);
    let (app, worker) = TestApp::with_worker(&[module.clone()]).await;
    let paused = app.register("paused").await;
    app.manager.registry().deactivate(paused.module_id).await.expect("deactivate");

    let task = HookTask::new("paused", HOOK, &json!({"trail": []}), &case(), 2).expect("task");
    let ticket = worker.queue.submit(task).await.expect("submit");
    let outcome = ticket.wait(Duration::from_secs(5)).await.expect("outcome");

    assert_eq!(outcome.status, TaskStatus::Failed);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(module.call_count(), 0);

    drop(app);
    worker.drain().await;
}

#[tokio::test]
async fn test_deactivated_module_receives_no_new_tasks() {
    let module = TestModule::processor("retired", Behaviour::NoData);
    let (app, worker) = TestApp::with_worker(&[module.clone()]).await;
    let registered = app.register("retired").await;
    app.bind(BindRequest::new(registered.module_id, HOOK).wait_for_completion())
        .await;

    app.manager.fire(HOOK, json!({"evidence_id": 2}), &case()).await.expect("fire");
    assert_eq!(module.call_count(), 1);

    app.manager.registry().deactivate(registered.module_id).await.expect("deactivate");
    app.manager.fire(HOOK, json!({"evidence_id": 3}), &case()).await.expect("fire");

    drop(app);
    let stats = worker.drain().await;
    assert_eq!(module.call_count(), 1);
    assert_eq!(stats.succeeded, 1);
}
