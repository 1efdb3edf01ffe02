use crate::job_controller::state::{JobsState, FALLBACK_BASENAME};
use actix_web::http::header::CONTENT_DISPOSITION;
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use common::jobs::JobStatus;
use std::path::Path;

/// `{basename}-{yyyy-mm-dd}.zip`, where `basename` is the uploaded file name
/// without its extension.
pub(crate) fn download_file_name(source: &str, date: NaiveDate) -> String {
    let stem = Path::new(source)
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    let basename: String = stem
        .trim()
        .chars()
        .map(|c| if c.is_control() || c == '"' || c == '\\' { '_' } else { c })
        .collect();
    let basename = if basename.is_empty() {
        FALLBACK_BASENAME
    } else {
        basename.as_str()
    };
    format!("{}-{}.zip", basename, date.format("%Y-%m-%d"))
}

/// Sends the archive of a completed job as a zip attachment.
///
/// # Arguments
/// * `job_id` - The id returned by the start endpoint.
/// * `state` - The shared `JobsState`, injected by Actix.
///
/// # Returns
/// `Ok` with the archive; `NotFound` for unknown ids; `Gone` when a newer job
/// replaced the archive; `Conflict` while the job is unfinished or after it failed.
pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    let jobs = state.jobs.read().await;
    let Some(record) = jobs.get(&job_id.into_inner()) else {
        return HttpResponse::NotFound().body("Job ID not found");
    };

    match (&record.status, &record.archive) {
        (JobStatus::Completed { .. }, Some(archive)) => HttpResponse::Ok()
            .content_type("application/zip")
            .insert_header((
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", record.file_name),
            ))
            .body(archive.clone()),
        (JobStatus::Completed { .. }, None) => {
            HttpResponse::Gone().body("The archive was replaced by a newer job")
        }
        (JobStatus::Failed(e), _) => HttpResponse::Conflict().body(format!("Error: {}", e)),
        _ => HttpResponse::Conflict().body("Job is not finished"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
    }

    #[test]
    fn names_archive_after_upload_and_date() {
        assert_eq!(download_file_name("menu-codes.csv", day()), "menu-codes-2024-03-12.zip");
        assert_eq!(download_file_name("dir/guests.final.csv", day()), "guests.final-2024-03-12.zip");
    }

    #[test]
    fn falls_back_when_name_is_missing() {
        assert_eq!(download_file_name("", day()), "qr-codes-2024-03-12.zip");
        assert_eq!(download_file_name("  .csv", day()), "qr-codes-2024-03-12.zip");
    }

    #[test]
    fn header_breaking_characters_are_replaced() {
        assert_eq!(download_file_name("a\"b.csv", day()), "a_b-2024-03-12.zip");
    }
}
