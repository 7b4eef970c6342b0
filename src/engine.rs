//! Wiring of the module engine and its worker pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use iris_core::config::AppConfig;
use iris_core::error::AppError;
use iris_modules::{MemoryModuleStore, ModuleLoader, ModuleManager, ModuleStore, StaticModuleLoader};
use iris_worker::{HookTaskExecutor, TaskQueue, TaskReceiver, WorkerRunner};
use plugin_iris_check::{IrisCheckModule, MODULE_NAME as IRIS_CHECK};

/// A wired module engine.
pub struct Engine {
    /// Module registry, catalog, and dispatcher.
    pub manager: ModuleManager,
    /// Worker pool, when enabled.
    pub worker: Option<Worker>,
}

/// Worker pool not started yet.
pub struct Worker {
    runner: WorkerRunner,
    receiver: TaskReceiver,
    queue: TaskQueue,
}

/// Handle to a started worker pool.
pub struct RunningWorker {
    /// Producer side, for queue statistics.
    pub queue: TaskQueue,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Module implementations linked into this binary.
pub fn module_loader() -> StaticModuleLoader {
    StaticModuleLoader::new().with_module(IRIS_CHECK, || Arc::new(IrisCheckModule::new()))
}

/// Build the engine: seed hooks and register the autoload modules.
pub async fn build(config: &AppConfig) -> Result<Engine, AppError> {
    let store: Arc<dyn ModuleStore> = Arc::new(MemoryModuleStore::new());
    let loader: Arc<dyn ModuleLoader> = Arc::new(module_loader());
    let timeout = Duration::from_secs(config.modules.handler_timeout_seconds);

    let mut manager = ModuleManager::new(store.clone(), loader.clone(), &config.modules)?;

    let worker = if config.worker.enabled {
        let (queue, receiver) = TaskQueue::bounded(config.worker.queue_capacity);
        manager = manager.with_submitter(Arc::new(queue.clone()));

        let executor = Arc::new(HookTaskExecutor::new(loader, store, timeout));
        let runner = WorkerRunner::new(
            executor,
            config.worker.clone(),
            format!("iris-worker-{}", std::process::id()),
        );
        Some(Worker {
            runner,
            receiver,
            queue,
        })
    } else {
        tracing::warn!("Worker pool disabled; asynchronous hooks run on detached tasks");
        None
    };

    manager.initialize(&config.modules.autoload).await?;

    Ok(Engine { manager, worker })
}

impl Worker {
    /// Spawn the worker runner.
    pub fn start(self) -> RunningWorker {
        let (shutdown, cancel) = watch::channel(false);
        let Worker {
            runner,
            receiver,
            queue,
        } = self;

        let handle = tokio::spawn(async move {
            runner.run(receiver, cancel).await;
        });

        RunningWorker {
            queue,
            shutdown,
            handle,
        }
    }
}

impl RunningWorker {
    /// Stop taking new tasks and wait for the runner to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::error!("Worker task failed: {}", e);
        }
    }

    /// Wait until every queued task is processed, then stop.
    ///
    /// Every other producer must already be dropped.
    pub async fn drain(self) {
        let RunningWorker {
            queue,
            shutdown,
            handle,
        } = self;
        drop(queue);
        if let Err(e) = handle.await {
            tracing::error!("Worker task failed: {}", e);
        }
        drop(shutdown);
    }
}
