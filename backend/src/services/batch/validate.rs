//! `POST /api/batch/validate`: previews what a spreadsheet would produce.
//!
//! Every row comes back with its resolved type, slug, payload and errors, so
//! the client can show rejected rows before starting a job.

use crate::config::ServerConfig;
use crate::data_sources::csv::read_rows;
use crate::ingest::{ingest_rows, IngestReport};
use crate::services::batch::upload::read_upload;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};

/// Returns the `IngestReport` for the uploaded file, or `BadRequest` when it
/// cannot be read.
pub(crate) async fn process(config: web::Data<ServerConfig>, payload: Multipart) -> impl Responder {
    match validate_upload(payload, config.max_upload_bytes).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => HttpResponse::BadRequest().body(format!("Error: {}", e)),
    }
}

async fn validate_upload(
    payload: Multipart,
    limit: usize,
) -> Result<IngestReport, Box<dyn std::error::Error>> {
    let upload = read_upload(payload, limit).await?;
    let rows = read_rows(&upload.bytes)?;
    let report = web::block(move || ingest_rows(rows))
        .await
        .map_err(|e| e.to_string())?;
    Ok(report)
}
