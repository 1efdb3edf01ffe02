use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};

/// Reports the status of a batch job.
///
/// # Arguments
/// * `job_id` - The id returned by the start endpoint.
/// * `state` - The shared `JobsState`, injected by Actix.
///
/// # Returns
/// The `JobStatus` as JSON, or `NotFound` when the id is unknown or was evicted.
pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    let jobs = state.jobs.read().await;
    match jobs.get(&job_id.into_inner()) {
        Some(record) => HttpResponse::Ok().json(&record.status),
        None => HttpResponse::NotFound().body("Job ID not found"),
    }
}
