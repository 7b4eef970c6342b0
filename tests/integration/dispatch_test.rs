//! Integration tests for hook firing and payload threading.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use helpers::{Behaviour, TestApp, TestModule, case};
use iris_core::error::ErrorKind;
use iris_modules::BindRequest;
use iris_worker::TaskQueue;

const HOOK: &str = "on_postload_ioc_create";

fn trail() -> Value {
    json!({"ioc_id": 3, "trail": []})
}

#[tokio::test]
async fn test_fire_without_bindings_returns_payload() {
    let app = TestApp::new(&[]).await;
    let payload = json!({"case_id": 42, "name": "Ransomware"});

    let result = app.manager.fire("on_postload_case_create", payload.clone(), &case()).await.expect("fire");
    assert_eq!(result, payload);
}

#[tokio::test]
async fn test_fire_unknown_hook_fails() {
    let app = TestApp::new(&[]).await;
    let err = app.manager.fire("on_postload_unicorn_create", json!({}), &case()).await.unwrap_err();
    assert!(err.is(ErrorKind::UnknownHook));
}

#[tokio::test]
async fn test_payload_threads_in_binding_order() {
    let app = TestApp::new(&[
        TestModule::processor("alpha", Behaviour::Trail),
        TestModule::processor("bravo", Behaviour::Trail),
        TestModule::processor("charlie", Behaviour::Trail),
    ])
    .await;
    let alpha = app.register("alpha").await;
    let bravo = app.register("bravo").await;
    let charlie = app.register("charlie").await;

    app.bind_sync(charlie.module_id, HOOK).await;
    app.bind_sync(alpha.module_id, HOOK).await;
    app.bind_sync(bravo.module_id, HOOK).await;

    let result = app.manager.fire(HOOK, trail(), &case()).await.expect("fire");
    assert_eq!(result["trail"], json!(["charlie", "alpha", "bravo"]));
}

#[tokio::test]
async fn test_rebinding_keeps_original_position() {
    let app = TestApp::new(&[
        TestModule::processor("first", Behaviour::Trail),
        TestModule::processor("second", Behaviour::Trail),
    ])
    .await;
    let first = app.register("first").await;
    let second = app.register("second").await;

    let original = app.bind_sync(first.module_id, HOOK).await;
    app.bind_sync(second.module_id, HOOK).await;
    let rebound = app
        .bind(BindRequest::new(first.module_id, HOOK).synchronous().max_retry(2))
        .await;
    assert_eq!(rebound.binding_id, original.binding_id);
    assert_eq!(rebound.max_retry, 2);

    let result = app.manager.fire(HOOK, trail(), &case()).await.expect("fire");
    assert_eq!(result["trail"], json!(["first", "second"]));
}

#[tokio::test(start_paused = true)]
async fn test_failing_handlers_are_isolated() {
    let app = TestApp::new(&[
        TestModule::processor("before", Behaviour::Trail),
        TestModule::processor("refuser", Behaviour::Fail),
        TestModule::processor("crasher", Behaviour::Panic),
        TestModule::processor("sleeper", Behaviour::Hang),
        TestModule::processor("after", Behaviour::Trail),
    ])
    .await;
    for name in ["before", "refuser", "crasher", "sleeper", "after"] {
        let module = app.register(name).await;
        app.bind_sync(module.module_id, HOOK).await;
    }

    let result = app.manager.fire(HOOK, trail(), &case()).await.expect("fire");
    assert_eq!(result, json!({"ioc_id": 3, "trail": ["before", "after"]}));
}

#[tokio::test]
async fn test_success_without_data_keeps_payload() {
    let module = TestModule::processor("observer", Behaviour::NoData);
    let app = TestApp::new(&[module.clone()]).await;
    let observer = app.register("observer").await;
    app.bind_sync(observer.module_id, HOOK).await;

    let result = app.manager.fire(HOOK, trail(), &case()).await.expect("fire");
    assert_eq!(result, trail());
    assert_eq!(module.received(), vec![(HOOK.to_string(), trail())]);
}

#[tokio::test]
async fn test_preload_hooks_always_run_inline() {
    let (app, recorder) = TestApp::with_recorder(&[TestModule::processor(
        "report_validator",
        Behaviour::Set("validated", json!(true)),
    )])
    .await;
    let module = app.register("report_validator").await;

    // Bound asynchronously; the preload rule overrides it
    let binding = app.bind(BindRequest::new(module.module_id, "on_preload_report_create")).await;
    assert!(binding.run_asynchronously);

    let result = app
        .manager
        .fire("on_preload_report_create", json!({"report_id": 7}), &case())
        .await
        .expect("fire");

    assert_eq!(result, json!({"report_id": 7, "validated": true}));
    assert!(recorder.tasks().is_empty());
}

#[tokio::test]
async fn test_async_binding_is_enqueued_and_does_not_modify_payload() {
    let module = TestModule::processor("enricher", Behaviour::Set("enriched", json!(true)));
    let (app, recorder) = TestApp::with_recorder(&[module.clone()]).await;
    let enricher = app.register("enricher").await;
    app.bind(BindRequest::new(enricher.module_id, HOOK).max_retry(3)).await;

    let payload = json!({"ioc_id": 3});
    let result = app.manager.fire(HOOK, payload.clone(), &case()).await.expect("fire");
    assert_eq!(result, payload);
    assert_eq!(module.call_count(), 0);

    let tasks = recorder.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].module_name, "enricher");
    assert_eq!(tasks[0].hook_name, HOOK);
    assert_eq!(tasks[0].max_retry, 3);
    assert_eq!(tasks[0].case_id, case().case_id);
    assert_eq!(tasks[0].initiating_user.as_deref(), Some("analyst"));
    assert_eq!(tasks[0].decode_payload().expect("payload"), payload);
}

#[tokio::test]
async fn test_async_bindings_do_not_feed_the_chain() {
    let (app, recorder) = TestApp::with_recorder(&[
        TestModule::processor("sync_one", Behaviour::Trail),
        TestModule::processor("async_one", Behaviour::Trail),
        TestModule::processor("sync_two", Behaviour::Trail),
    ])
    .await;
    let sync_one = app.register("sync_one").await;
    let async_one = app.register("async_one").await;
    let sync_two = app.register("sync_two").await;

    app.bind_sync(sync_one.module_id, HOOK).await;
    app.bind(BindRequest::new(async_one.module_id, HOOK)).await;
    app.bind_sync(sync_two.module_id, HOOK).await;

    let result = app.manager.fire(HOOK, trail(), &case()).await.expect("fire");
    assert_eq!(result["trail"], json!(["sync_one", "sync_two"]));

    // The async task sees the payload as it was when its binding was reached
    let tasks = recorder.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].decode_payload().expect("payload")["trail"], json!(["sync_one"]));
}

#[tokio::test]
async fn test_inactive_module_is_skipped() {
    let module = TestModule::processor("sleepy", Behaviour::Trail);
    let app = TestApp::new(&[module.clone(), TestModule::processor("idle", Behaviour::Trail).not_ready()]).await;
    let sleepy = app.register("sleepy").await;
    let idle = app.register("idle").await;
    app.bind_sync(sleepy.module_id, HOOK).await;
    app.bind_sync(idle.module_id, HOOK).await;

    app.manager.registry().deactivate(sleepy.module_id).await.expect("deactivate");

    let result = app.manager.fire(HOOK, trail(), &case()).await.expect("fire");
    assert_eq!(result, trail());
    assert_eq!(module.call_count(), 0);

    app.manager.registry().activate(sleepy.module_id).await.expect("activate");
    let result = app.manager.fire(HOOK, trail(), &case()).await.expect("fire");
    assert_eq!(result["trail"], json!(["sleepy"]));
}

#[tokio::test]
async fn test_failed_bind_leaves_dispatch_untouched() {
    let app = TestApp::new(&[TestModule::processor("stray", Behaviour::Trail)]).await;
    let stray = app.register("stray").await;

    assert!(
        app.manager
            .bind(BindRequest::new(stray.module_id, "on_postload_ioc_teleport"))
            .await
            .is_err()
    );

    let result = app.manager.fire(HOOK, trail(), &case()).await.expect("fire");
    assert_eq!(result, trail());
}

#[tokio::test]
async fn test_manual_triggers_are_listed_and_run() {
    let module = TestModule::processor("ioc_lookup", Behaviour::Set("looked_up", json!(true)));
    let app = TestApp::new(&[module.clone()]).await;
    let lookup = app.register("ioc_lookup").await;
    let binding = app
        .bind(
            BindRequest::new(lookup.module_id, "on_manual_trigger_ioc")
                .display_name("Look up in VT")
                .synchronous(),
        )
        .await;

    let entries = app
        .manager
        .dispatcher()
        .manual_hooks("on_manual_trigger_ioc")
        .await
        .expect("manual hooks");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].binding_id, binding.binding_id);
    assert_eq!(entries[0].display_name, "Look up in VT");
    assert_eq!(entries[0].module_name, "ioc_lookup");

    let result = app
        .manager
        .dispatcher()
        .trigger_manual(binding.binding_id, json!({"ioc_id": 9}), &case())
        .await
        .expect("trigger");
    assert_eq!(result, json!({"ioc_id": 9, "looked_up": true}));
    assert_eq!(module.call_count(), 1);
}

#[tokio::test]
async fn test_trigger_manual_rejects_automatic_bindings() {
    let app = TestApp::new(&[TestModule::processor("auto", Behaviour::Trail)]).await;
    let auto = app.register("auto").await;
    let binding = app.bind_sync(auto.module_id, HOOK).await;

    let err = app
        .manager
        .dispatcher()
        .trigger_manual(binding.binding_id, trail(), &case())
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Validation));

    app.manager.registry().deactivate(auto.module_id).await.expect("deactivate");
    let manual = app
        .bind(BindRequest::new(auto.module_id, "on_manual_trigger_note").synchronous())
        .await;
    let err = app
        .manager
        .dispatcher()
        .trigger_manual(manual.binding_id, json!({}), &case())
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_concurrent_fires_are_independent() {
    let app = TestApp::new(&[TestModule::processor("tracer", Behaviour::Trail)]).await;
    let tracer = app.register("tracer").await;
    app.bind_sync(tracer.module_id, HOOK).await;

    let fires = (0..8).map(|i| {
        let manager = app.manager.clone();
        async move {
            manager
                .fire(HOOK, json!({"ioc_id": i, "trail": []}), &case())
                .await
                .expect("fire")
        }
    });
    let results = futures::future::join_all(fires).await;

    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result, json!({"ioc_id": i, "trail": ["tracer"]}));
    }
}

#[tokio::test]
async fn test_full_queue_does_not_block_fire() {
    let module = TestModule::processor("backlogged", Behaviour::Trail);
    let mut app = TestApp::new(&[module.clone()]).await;
    // Nothing drains the receiver, so the single slot stays taken
    let (queue, _receiver) = TaskQueue::bounded(1);
    app.manager = app.manager.clone().with_submitter(Arc::new(queue.clone()));

    let backlogged = app.register("backlogged").await;
    app.bind(BindRequest::new(backlogged.module_id, HOOK)).await;

    for _ in 0..2 {
        let result = tokio::time::timeout(Duration::from_secs(2), app.manager.fire(HOOK, trail(), &case()))
            .await
            .expect("fire returned while the queue was full")
            .expect("fire");
        assert_eq!(result, trail());
    }

    assert_eq!(queue.stats().pending, 1);
    assert_eq!(module.call_count(), 0);
}

#[tokio::test]
async fn test_async_binding_without_worker_runs_detached() {
    let module = TestModule::processor("detached", Behaviour::Trail);
    let app = TestApp::new(&[module.clone()]).await;
    let detached = app.register("detached").await;
    app.bind(BindRequest::new(detached.module_id, HOOK).wait_for_completion()).await;

    let result = app.manager.fire(HOOK, trail(), &case()).await.expect("fire");

    assert_eq!(result, trail());
    assert_eq!(module.call_count(), 1);
    assert_eq!(module.received(), vec![(HOOK.to_string(), trail())]);
}

#[tokio::test]
async fn test_panicking_detached_handler_does_not_break_fire() {
    let crasher = TestModule::processor("detached_crasher", Behaviour::Panic);
    let follower = TestModule::processor("sync_follower", Behaviour::Trail);
    let app = TestApp::new(&[crasher.clone(), follower.clone()]).await;
    let crasher_id = app.register("detached_crasher").await.module_id;
    let follower_id = app.register("sync_follower").await.module_id;
    app.bind(BindRequest::new(crasher_id, HOOK).wait_for_completion()).await;
    app.bind_sync(follower_id, HOOK).await;

    let result = app.manager.fire(HOOK, trail(), &case()).await.expect("fire");

    assert_eq!(result["trail"], json!(["sync_follower"]));
    assert_eq!(crasher.call_count(), 1);
    assert_eq!(follower.call_count(), 1);
}
