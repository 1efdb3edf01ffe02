pub mod coordinator;
pub mod state;

use crate::job_controller::coordinator::BatchCoordinator;
use crate::job_controller::state::{JobUpdate, JobsState};
use common::jobs::JobStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Forwards every coordinator notification into the job records.
///
/// A job only completes after rendering every item, and the worker always
/// reports `processed == total` before `Done`, so the last progress total is
/// the number of archive entries.
pub async fn connect(coordinator: &BatchCoordinator, state: &JobsState) {
    let last_total = Arc::new(AtomicUsize::new(0));

    let tx = state.tx.clone();
    let totals = Arc::clone(&last_total);
    coordinator
        .on_progress(move |job_id, _progress, processed, total| {
            totals.store(total, Ordering::Relaxed);
            let _ = tx.send(JobUpdate::status(job_id, JobStatus::InProgress { processed, total }));
        })
        .await;

    let tx = state.tx.clone();
    coordinator
        .on_error(move |job_id, error| {
            let _ = tx.send(JobUpdate::status(job_id, JobStatus::Failed(error.to_string())));
        })
        .await;

    let tx = state.tx.clone();
    coordinator
        .on_done(move |job_id, archive| {
            let entries = last_total.swap(0, Ordering::Relaxed);
            let _ = tx.send(JobUpdate::completed(job_id, archive, entries));
        })
        .await;
}
