//! Batch QR generation over HTTP.
//!
//! - `POST /api/batch/validate`: multipart `file` with the CSV. Returns the row
//!   report (valid and rejected counts, then every row with its errors).
//! - `POST /api/batch/start`: multipart `json` (format and render options) and
//!   `file`. Starts a job and returns its `job_id`.
//! - `GET /api/batch/status/{job_id}`: the `JobStatus` of a job.
//! - `GET /api/batch/download/{job_id}`: the finished zip archive.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod download;
mod start;
mod status;
mod upload;
mod validate;

const API_PATH: &str = "/api/batch";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/validate", post().to(validate::process))
        .route("/start", post().to(start::process))
        .route("/status/{job_id}", get().to(status::process))
        .route("/download/{job_id}", get().to(download::process))
}
