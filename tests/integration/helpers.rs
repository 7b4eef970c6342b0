//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use iris_core::config::AppConfig;
use iris_core::result::AppResult;
use iris_core::types::{CaseId, ModuleId, StatusResult};
use iris_entity::{CaseContext, ConfigOption, HookBinding, HookTask, RegisteredModule};
use iris_modules::{
    BindRequest, InvocationContext, MemoryModuleStore, ModuleLoader, ModuleManager, ModulePort, ModuleStore,
    StaticModuleLoader, TaskSubmitter, TaskTicket,
};
use iris_worker::{HookTaskExecutor, QueueMonitor, QueueStats, TaskQueue, WorkerRunner};

/// What a [`TestModule`] does when a hook fires
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Sets `payload[key] = value` on object payloads
    Set(&'static str, Value),
    /// Appends the module name to the `trail` array of the payload
    Trail,
    /// Reports a failure status
    Fail,
    /// Panics
    Panic,
    /// Never returns
    Hang,
    /// Succeeds without data
    NoData,
    /// Fails until the given number of calls have been made, then behaves like `Trail`
    FailFirst(u32),
}

/// Configurable module used across the integration tests
#[derive(Debug, Clone)]
pub struct TestModule {
    pub name: &'static str,
    pub interface_version: &'static str,
    pub module_type: &'static str,
    pub ready: bool,
    pub behaviour: Behaviour,
    pub pipeline_info: Option<Value>,
    pub config: Vec<ConfigOption>,
    /// Payloads received, shared by every instance the loader builds
    pub received: Arc<Mutex<Vec<(String, Value)>>>,
    /// Number of handler calls, shared by every instance
    pub calls: Arc<AtomicU32>,
}

impl TestModule {
    /// A ready processor on interface 1.0
    pub fn processor(name: &'static str, behaviour: Behaviour) -> Self {
        Self {
            name,
            interface_version: "1.0",
            module_type: "processor",
            ready: true,
            behaviour,
            pipeline_info: None,
            config: Vec::new(),
            received: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// A ready pipeline module with complete pipeline information
    pub fn pipeline(name: &'static str) -> Self {
        let mut module = Self::processor(name, Behaviour::NoData);
        module.module_type = "pipeline";
        module.pipeline_info = Some(serde_json::json!({
            "pipeline_internal_name": format!("{name}_pipeline"),
            "pipeline_human_name": name,
            "pipeline_args": [["files", "required", "Files to import"]],
            "pipeline_update_support": true,
            "pipeline_import_support": true,
        }));
        module
    }

    pub fn interface(mut self, version: &'static str) -> Self {
        self.interface_version = version;
        self
    }

    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn with_config(mut self, config: Vec<ConfigOption>) -> Self {
        self.config = config;
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<(String, Value)> {
        self.received.lock().expect("received lock").clone()
    }
}

#[async_trait]
impl ModulePort for TestModule {
    fn module_name(&self) -> &str {
        self.name
    }

    fn module_version(&self) -> &str {
        "0.1.0"
    }

    fn interface_version(&self) -> &str {
        self.interface_version
    }

    fn module_type(&self) -> &str {
        self.module_type
    }

    fn is_providing_pipeline(&self) -> bool {
        self.pipeline_info.is_some()
    }

    fn pipeline_info(&self) -> Value {
        self.pipeline_info.clone().unwrap_or(Value::Null)
    }

    fn init_configuration(&self) -> Vec<ConfigOption> {
        self.config.clone()
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn hooks_handler(&self, hook_name: &str, data: Value, _context: &InvocationContext) -> StatusResult {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.received
            .lock()
            .expect("received lock")
            .push((hook_name.to_string(), data.clone()));

        match &self.behaviour {
            Behaviour::Set(key, value) => {
                let mut data = data;
                if let Some(object) = data.as_object_mut() {
                    object.insert(key.to_string(), value.clone());
                }
                StatusResult::success(data)
            }
            Behaviour::Trail => StatusResult::success(append_trail(data, self.name)),
            Behaviour::Fail => StatusResult::failure(format!("{} refused the payload", self.name)),
            Behaviour::Panic => panic!("{} exploded", self.name),
            Behaviour::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                StatusResult::ok("too late")
            }
            Behaviour::NoData => StatusResult::ok("seen"),
            Behaviour::FailFirst(failures) if call <= *failures => {
                StatusResult::failure(format!("attempt {call} failed"))
            }
            Behaviour::FailFirst(_) => StatusResult::success(append_trail(data, self.name)),
        }
    }
}

fn append_trail(mut data: Value, name: &str) -> Value {
    if let Some(trail) = data.get_mut("trail").and_then(Value::as_array_mut) {
        trail.push(Value::String(name.to_string()));
    }
    data
}

/// Submitter that records tasks without running them
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    pub tasks: Mutex<Vec<HookTask>>,
}

impl RecordingSubmitter {
    pub fn tasks(&self) -> Vec<HookTask> {
        self.tasks.lock().expect("tasks lock").clone()
    }
}

#[async_trait]
impl TaskSubmitter for RecordingSubmitter {
    async fn submit(&self, task: HookTask) -> AppResult<TaskTicket> {
        let (_reply, outcome) = tokio::sync::oneshot::channel();
        let ticket = TaskTicket::new(task.task_id, outcome);
        self.tasks.lock().expect("tasks lock").push(task);
        Ok(ticket)
    }
}

/// Load the shared test configuration
pub fn test_config() -> AppConfig {
    AppConfig::load("tests/fixtures/test_config.toml").expect("Failed to load test config")
}

/// Build a loader over test modules
pub fn loader(modules: &[TestModule]) -> StaticModuleLoader {
    let mut loader = StaticModuleLoader::new();
    for module in modules {
        let module = module.clone();
        loader.register(module.name, move || Arc::new(module.clone()));
    }
    loader
}

/// Default case context
pub fn case() -> CaseContext {
    CaseContext::new(CaseId::new(42)).with_user("analyst")
}

/// Test application context
pub struct TestApp {
    /// The module engine
    pub manager: ModuleManager,
    /// Store shared with the engine
    pub store: Arc<dyn ModuleStore>,
    /// Loader shared with the engine
    pub loader: Arc<dyn ModuleLoader>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create an engine with default hooks seeded and no worker pool
    pub async fn new(modules: &[TestModule]) -> Self {
        let config = test_config();
        let store: Arc<dyn ModuleStore> = Arc::new(MemoryModuleStore::new());
        let loader: Arc<dyn ModuleLoader> = Arc::new(loader(modules));
        let manager = ModuleManager::new(store.clone(), loader.clone(), &config.modules).expect("manager");
        manager.initialize(&[]).await.expect("initialize");

        Self {
            manager,
            store,
            loader,
            config,
        }
    }

    /// Create an engine whose asynchronous bindings are recorded, not run
    pub async fn with_recorder(modules: &[TestModule]) -> (Self, Arc<RecordingSubmitter>) {
        let mut app = Self::new(modules).await;
        let recorder = Arc::new(RecordingSubmitter::default());
        app.manager = app.manager.clone().with_submitter(recorder.clone());
        (app, recorder)
    }

    /// Create an engine backed by a running worker pool
    pub async fn with_worker(modules: &[TestModule]) -> (Self, TestWorker) {
        let mut app = Self::new(modules).await;
        let (queue, receiver) = TaskQueue::bounded(app.config.worker.queue_capacity);
        app.manager = app.manager.clone().with_submitter(Arc::new(queue.clone()));

        let executor = Arc::new(HookTaskExecutor::new(
            app.loader.clone(),
            app.store.clone(),
            std::time::Duration::from_secs(app.config.modules.handler_timeout_seconds),
        ));
        let runner = WorkerRunner::new(executor, app.config.worker.clone(), "test-worker".to_string());
        let (shutdown, cancel) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(receiver, cancel).await });

        (
            app,
            TestWorker {
                monitor: queue.monitor(),
                queue,
                shutdown,
                handle,
            },
        )
    }

    /// Register a module, panicking on failure
    pub async fn register(&self, name: &str) -> RegisteredModule {
        self.manager
            .registry()
            .register(name)
            .await
            .unwrap_or_else(|e| panic!("register {name}: {e}"))
    }

    /// Bind a module synchronously to a hook
    pub async fn bind_sync(&self, module_id: ModuleId, hook_name: &str) -> HookBinding {
        self.manager
            .bind(BindRequest::new(module_id, hook_name).synchronous())
            .await
            .expect("bind")
    }

    /// Bind a module to a hook with the given request
    pub async fn bind(&self, request: BindRequest) -> HookBinding {
        self.manager.bind(request).await.expect("bind")
    }
}

/// Running worker pool used by the tests
pub struct TestWorker {
    pub queue: TaskQueue,
    pub monitor: QueueMonitor,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl TestWorker {
    /// Process everything queued, then stop; returns final statistics
    ///
    /// The engine holding the other producer must be dropped first.
    pub async fn drain(self) -> QueueStats {
        let TestWorker {
            queue,
            monitor,
            shutdown,
            handle,
        } = self;
        drop(queue);
        handle.await.expect("worker task");
        drop(shutdown);
        monitor.stats()
    }
}
