//! # Batch Start Service
//!
//! `POST /api/batch/start` takes a multipart body with a `json` part
//! ([`StartBatchRequest`]) and a `file` part (the CSV), and starts rendering.
//!
//! 1.  The CSV is parsed and every row validated; rejected rows are counted
//!     but never rendered.
//! 2.  The valid rows are submitted to the [`BatchCoordinator`] as one job.
//! 3.  The job is registered as `Pending` in [`JobsState`] and its id is
//!     returned right away. Progress, failure and the finished archive reach
//!     the job record through the coordinator observers.

use crate::config::ServerConfig;
use crate::data_sources::csv::read_rows;
use crate::error::BatchError;
use crate::ingest::ingest_rows;
use crate::job_controller::coordinator::BatchCoordinator;
use crate::job_controller::state::{JobRecord, JobsState};
use crate::services::batch::download::download_file_name;
use crate::services::batch::upload::read_upload;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use common::model::batch::RenderOptions;
use common::requests::StartBatchRequest;

#[derive(Debug)]
struct StartedBatch {
    job_id: String,
    valid: usize,
    rejected: usize,
}

#[derive(Debug)]
enum StartFailure {
    BadRequest(String),
    Batch(BatchError),
}

/// Starts a batch job from an uploaded spreadsheet.
///
/// # Arguments
/// * `state` - The shared `JobsState`, where the job record is created.
/// * `coordinator` - The `BatchCoordinator` that runs the job.
/// * `config` - Upload limit and default progress chunk.
/// * `payload` - Multipart body with the `file` part and an optional `json` part.
///
/// # Returns
/// The `job_id` with the valid and rejected row counts, `BadRequest` when the
/// upload is unusable or has no valid rows, `Conflict` while another job runs,
/// or `ServiceUnavailable` when the worker is gone.
pub(crate) async fn process(
    state: web::Data<JobsState>,
    coordinator: web::Data<BatchCoordinator>,
    config: web::Data<ServerConfig>,
    payload: Multipart,
) -> impl Responder {
    match schedule_batch_job(&state, &coordinator, &config, payload).await {
        Ok(started) => HttpResponse::Ok().json(serde_json::json!({
            "job_id": started.job_id,
            "valid": started.valid,
            "rejected": started.rejected,
        })),
        Err(StartFailure::BadRequest(e)) => HttpResponse::BadRequest().body(format!("Error: {}", e)),
        Err(StartFailure::Batch(e)) => {
            let body = format!("Error: {}", e);
            match e {
                BatchError::EmptyBatch => HttpResponse::BadRequest().body(body),
                BatchError::JobInFlight(_) => HttpResponse::Conflict().body(body),
                BatchError::WorkerUnavailable => HttpResponse::ServiceUnavailable().body(body),
            }
        }
    }
}

async fn schedule_batch_job(
    state: &JobsState,
    coordinator: &BatchCoordinator,
    config: &ServerConfig,
    payload: Multipart,
) -> Result<StartedBatch, StartFailure> {
    let upload = read_upload(payload, config.max_upload_bytes)
        .await
        .map_err(bad_request)?;
    let request: StartBatchRequest = upload
        .request
        .ok_or_else(|| bad_request("Missing json part"))?;
    let rows = read_rows(&upload.bytes).map_err(bad_request)?;
    let report = web::block(move || ingest_rows(rows))
        .await
        .map_err(bad_request)?;

    let options = resolve_options(request.options, config.default_chunk);
    let file_name = download_file_name(&upload.file_name, Local::now().date_naive());

    // Held across the submission so the record exists before the updater
    // can apply the first progress update.
    let mut jobs = state.jobs.write().await;
    let job_id = coordinator
        .submit(report.items, request.format, options)
        .await
        .map_err(StartFailure::Batch)?;
    jobs.insert(job_id.clone(), JobRecord::pending(file_name));

    Ok(StartedBatch {
        job_id,
        valid: report.valid,
        rejected: report.rejected,
    })
}

fn bad_request(e: impl std::fmt::Display) -> StartFailure {
    StartFailure::BadRequest(e.to_string())
}

/// Request options, with the configured chunk when none is given.
fn resolve_options(options: Option<RenderOptions>, default_chunk: u32) -> RenderOptions {
    let mut options = options.unwrap_or_else(|| RenderOptions {
        chunk: 0,
        ..RenderOptions::default()
    });
    if options.chunk == 0 {
        options.chunk = default_chunk;
    }
    options
}
