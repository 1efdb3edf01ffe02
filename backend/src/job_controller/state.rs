//! Tracks batch jobs for the HTTP layer.
//!
//! The coordinator only knows about the job in flight. `JobsState` keeps a
//! record per submitted job so clients can poll its status and download its
//! archive after it is done.
//!
//! - `JobsState`: clonable shared state, injected into the Actix app in `main.rs`.
//! - `JobUpdate`: a status change sent by the coordinator observers.
//! - `start_job_updater`: the task that applies `JobUpdate`s to the records.

use common::jobs::JobStatus;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Download name used when the upload had no usable file name.
pub const FALLBACK_BASENAME: &str = "qr-codes";

/// Finished jobs kept for status polling. Older finished records are evicted;
/// jobs still pending or running are never evicted.
pub const MAX_FINISHED_JOBS: usize = 100;

/// What the HTTP layer knows about one submitted job.
///
/// `archive` is only present on the most recently completed job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub status: JobStatus,
    /// Name offered to the browser when downloading the archive.
    pub file_name: String,
    pub archive: Option<Vec<u8>>,
}

impl JobRecord {
    pub fn pending(file_name: String) -> Self {
        JobRecord {
            status: JobStatus::Pending,
            file_name,
            archive: None,
        }
    }
}

/// Shared job table plus the sender feeding `start_job_updater`.
#[derive(Clone)]
pub struct JobsState {
    /// Job id to record. Readers are the status and download endpoints; the
    /// start endpoint and `start_job_updater` write.
    pub jobs: Arc<RwLock<HashMap<String, JobRecord>>>,

    /// Unbounded so the coordinator observers, which are synchronous, never
    /// have to wait.
    pub tx: mpsc::UnboundedSender<JobUpdate>,
}

impl JobsState {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<JobUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }
}

/// A status change for one job, produced by the coordinator observers.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
    /// Set only on completion.
    pub(crate) archive: Option<Vec<u8>>,
}

impl JobUpdate {
    pub fn status(job_id: &str, status: JobStatus) -> Self {
        JobUpdate {
            job_id: job_id.to_string(),
            status,
            archive: None,
        }
    }

    pub fn completed(job_id: String, archive: Vec<u8>, entries: usize) -> Self {
        JobUpdate {
            job_id,
            status: JobStatus::Completed { entries },
            archive: Some(archive),
        }
    }
}

/// Applies updates until every sender is gone.
///
/// Only the most recent archive is kept in memory: storing a new one drops
/// the archives of older jobs. At most [`MAX_FINISHED_JOBS`] finished records
/// are kept.
pub async fn start_job_updater(state: JobsState, rx: mpsc::UnboundedReceiver<JobUpdate>) {
    apply_updates(state, rx, MAX_FINISHED_JOBS).await;
}

async fn apply_updates(
    state: JobsState,
    mut rx: mpsc::UnboundedReceiver<JobUpdate>,
    max_finished: usize,
) {
    let mut finished: VecDeque<String> = VecDeque::new();
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        if update.archive.is_some() {
            for record in jobs.values_mut() {
                record.archive = None;
            }
        }
        let record = jobs
            .entry(update.job_id.clone())
            .or_insert_with(|| JobRecord::pending(format!("{FALLBACK_BASENAME}.zip")));
        let newly_finished = !record.status.is_finished() && update.status.is_finished();
        record.status = update.status;
        if let Some(archive) = update.archive {
            record.archive = Some(archive);
        }

        if newly_finished {
            finished.push_back(update.job_id);
            while finished.len() > max_finished {
                if let Some(evicted) = finished.pop_front() {
                    log::debug!("Evicting finished job {}", evicted);
                    jobs.remove(&evicted);
                }
            }
        }
    }
}
