//! # Batch Job Coordinator
//!
//! Owns the rendering worker, hands it one [`BatchJob`] at a time and fans the
//! worker's messages out to the registered observers.
//!
//! Every submission gets a fresh job id. Messages are only delivered while
//! their id matches the job in flight; anything else is a leftover from an
//! earlier job and is dropped. A `Done` or `Error` message ends the job. When
//! no done observer is registered, the finished archive is parked until
//! [`BatchCoordinator::take_archive`] collects it.

use crate::error::BatchError;
use crate::worker::{self, render::QrRenderer};
use common::jobs::WorkerMessage;
use common::model::batch::{BatchItem, BatchJob, OutputFormat, RenderOptions};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Called with `(job_id, progress, processed, total)`, where `progress` is
/// `processed / total`.
pub type ProgressObserver = Box<dyn Fn(&str, f64, usize, usize) + Send + Sync>;
/// Called with `(job_id, error)`.
pub type ErrorObserver = Box<dyn Fn(&str, &str) + Send + Sync>;
/// Called with the job id and the finished archive.
pub type DoneObserver = Box<dyn Fn(String, Vec<u8>) + Send + Sync>;

#[derive(Default)]
struct Observers {
    progress: Option<ProgressObserver>,
    error: Option<ErrorObserver>,
    done: Option<DoneObserver>,
}

/// State shared between the coordinator and its message pump.
#[derive(Default)]
struct Shared {
    current: Mutex<Option<String>>,
    observers: RwLock<Observers>,
    parked: Mutex<Option<(String, Vec<u8>)>>,
}

impl Shared {
    async fn dispatch(&self, message: WorkerMessage) {
        {
            let mut current = self.current.lock().await;
            if current.as_deref() != Some(message.id()) {
                log::debug!("Dropping message for stale job {}", message.id());
                return;
            }
            if message.is_terminal() {
                *current = None;
            }
        }

        let observers = self.observers.read().await;
        match message {
            WorkerMessage::Progress {
                id,
                progress,
                processed,
                total,
            } => {
                log::debug!("Job {}: {}/{}", id, processed, total);
                if let Some(observer) = &observers.progress {
                    observer(&id, progress, processed, total);
                }
            }
            WorkerMessage::Error { id, error } => {
                log::error!("Job {} failed: {}", id, error);
                if let Some(observer) = &observers.error {
                    observer(&id, &error);
                }
            }
            WorkerMessage::Done { id, buffer } => {
                log::info!("Job {} done ({} bytes)", id, buffer.len());
                match &observers.done {
                    Some(observer) => observer(id, buffer),
                    None => *self.parked.lock().await = Some((id, buffer)),
                }
            }
        }
    }
}

async fn pump_messages(shared: Arc<Shared>, mut messages: mpsc::Receiver<WorkerMessage>) {
    while let Some(message) = messages.recv().await {
        shared.dispatch(message).await;
    }
}

/// Front door to the rendering worker.
///
/// Created once at startup and shared across requests. Observers registered
/// with `on_progress`, `on_error` and `on_done` are called from the message
/// pump task and must not block.
pub struct BatchCoordinator {
    jobs: Mutex<Option<mpsc::Sender<BatchJob>>>,
    shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl BatchCoordinator {
    /// Spawns the worker and the message pump. Must be called inside a Tokio
    /// runtime.
    pub fn create(renderer: Arc<dyn QrRenderer>) -> Self {
        let channels = worker::spawn_worker(renderer);
        let shared = Arc::new(Shared::default());
        let pump = tokio::spawn(pump_messages(Arc::clone(&shared), channels.messages));
        BatchCoordinator {
            jobs: Mutex::new(Some(channels.jobs)),
            shared,
            tasks: Mutex::new(vec![channels.task, pump]),
        }
    }

    pub async fn on_progress<F>(&self, observer: F)
    where
        F: Fn(&str, f64, usize, usize) + Send + Sync + 'static,
    {
        self.shared.observers.write().await.progress = Some(Box::new(observer));
    }

    pub async fn on_error<F>(&self, observer: F)
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        self.shared.observers.write().await.error = Some(Box::new(observer));
    }

    pub async fn on_done<F>(&self, observer: F)
    where
        F: Fn(String, Vec<u8>) + Send + Sync + 'static,
    {
        self.shared.observers.write().await.done = Some(Box::new(observer));
    }

    /// Hands `items` to the worker as a new job and returns its id.
    ///
    /// Only one job runs at a time: while a job is in flight further
    /// submissions fail with [`BatchError::JobInFlight`].
    pub async fn submit(
        &self,
        items: Vec<BatchItem>,
        format: OutputFormat,
        options: RenderOptions,
    ) -> Result<String, BatchError> {
        if items.is_empty() {
            return Err(BatchError::EmptyBatch);
        }
        let sender = self
            .jobs
            .lock()
            .await
            .clone()
            .ok_or(BatchError::WorkerUnavailable)?;

        // Held until the job is registered so the pump cannot see its
        // messages before the id is current.
        let mut current = self.shared.current.lock().await;
        if let Some(running) = current.as_ref() {
            return Err(BatchError::JobInFlight(running.clone()));
        }

        let job = BatchJob {
            id: Uuid::new_v4().to_string(),
            items,
            format,
            options,
        };
        let job_id = job.id.clone();
        let count = job.items.len();
        sender
            .send(job)
            .await
            .map_err(|_| BatchError::WorkerUnavailable)?;
        *current = Some(job_id.clone());
        log::info!("Submitted job {} with {} items as {:?}", job_id, count, format);
        Ok(job_id)
    }

    /// Id of the job in flight, if any.
    pub async fn current_job(&self) -> Option<String> {
        self.shared.current.lock().await.clone()
    }

    /// Takes the archive parked while no done observer was registered.
    pub async fn take_archive(&self) -> Option<(String, Vec<u8>)> {
        self.shared.parked.lock().await.take()
    }

    /// Stops the worker and drops every pending result. Safe to call twice;
    /// later submissions fail with [`BatchError::WorkerUnavailable`].
    pub async fn dispose(&self) {
        self.jobs.lock().await.take();
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
        *self.shared.current.lock().await = None;
        *self.shared.parked.lock().await = None;
        *self.shared.observers.write().await = Observers::default();
        log::debug!("Batch coordinator disposed");
    }
}

impl Drop for BatchCoordinator {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}
