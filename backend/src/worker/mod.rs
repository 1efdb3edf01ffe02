//! # Rendering Worker
//!
//! The worker owns the CPU-heavy part of a batch: rendering every QR symbol
//! and packing the results into a zip archive. It runs as a long-lived task
//! that takes [`BatchJob`]s from a channel and processes them one at a time on
//! the blocking thread pool, so the async runtime never stalls on rendering.
//! Every outcome travels back as a [`WorkerMessage`] tagged with the job id.

pub mod archive;
pub mod engine;
pub mod render;

use crate::worker::engine::ArchiveEngine;
use crate::worker::render::QrRenderer;
use common::jobs::WorkerMessage;
use common::model::batch::BatchJob;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Channel capacity for jobs and for worker messages.
const CHANNEL_CAPACITY: usize = 100;

/// The two ends the coordinator talks to, plus the worker task itself.
pub struct WorkerChannels {
    pub jobs: mpsc::Sender<BatchJob>,
    pub messages: mpsc::Receiver<WorkerMessage>,
    pub task: JoinHandle<()>,
}

/// Spawns the worker task. It stops once every job sender is dropped.
pub fn spawn_worker(renderer: Arc<dyn QrRenderer>) -> WorkerChannels {
    let (jobs_tx, jobs_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (messages_tx, messages_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let task = tokio::spawn(run_worker(renderer, jobs_rx, messages_tx));
    WorkerChannels {
        jobs: jobs_tx,
        messages: messages_rx,
        task,
    }
}

async fn run_worker(
    renderer: Arc<dyn QrRenderer>,
    mut jobs: mpsc::Receiver<BatchJob>,
    messages: mpsc::Sender<WorkerMessage>,
) {
    while let Some(job) = jobs.recv().await {
        let job_id = job.id.clone();
        log::info!("Worker picked up job {} ({} items)", job_id, job.items.len());

        let tx = messages.clone();
        let renderer = Arc::clone(&renderer);
        let handle = tokio::task::spawn_blocking(move || {
            let mut engine = ArchiveEngine::new(renderer.as_ref());
            engine.run(job, &mut |msg| {
                // The receiver is gone only when the coordinator was disposed.
                let _ = tx.blocking_send(msg);
            })
        });

        match handle.await {
            Ok(state) => log::debug!("Job {} finished in state {:?}", job_id, state),
            Err(e) => {
                let _ = messages
                    .send(WorkerMessage::Error {
                        id: job_id,
                        error: format!("Task join error: {}", e),
                    })
                    .await;
            }
        }
    }
    log::debug!("Worker stopped: job channel closed");
}
