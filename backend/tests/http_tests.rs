use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use qrbatch::config::ServerConfig;
use qrbatch::job_controller::coordinator::BatchCoordinator;
use qrbatch::job_controller::state::{start_job_updater, JobRecord, JobsState};
use qrbatch::job_controller;
use qrbatch::services;
use qrbatch::worker::render::QrCodeRenderer;
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use zip::ZipArchive;

const BOUNDARY: &str = "batch-test-boundary";

const SHEET: &str = "type,url,slug\nurl,example.com,home\nfax,example.org,bad\nurl,docs.example.com,docs\n";

fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
    let mut body = String::new();
    for (name, file_name, content) in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match file_name {
            Some(file_name) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\nContent-Type: application/json\r\n\r\n"
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body.into_bytes()
}

fn multipart_request(uri: &str, body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")))
        .set_payload(body)
}

async fn app_state() -> (JobsState, web::Data<BatchCoordinator>) {
    let (state, rx) = JobsState::new();
    tokio::spawn(start_job_updater(state.clone(), rx));
    let coordinator = web::Data::new(BatchCoordinator::create(Arc::new(QrCodeRenderer)));
    job_controller::connect(&coordinator, &state).await;
    (state, coordinator)
}

macro_rules! batch_app {
    ($state:expr, $coordinator:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data($coordinator.clone())
                .app_data(web::Data::new(ServerConfig::default()))
                .service(services::batch::configure_routes()),
        )
        .await
    };
}

#[actix_web::test]
async fn validate_reports_every_row() {
    let (state, coordinator) = app_state().await;
    let app = batch_app!(state, coordinator);

    let req = multipart_request(
        "/api/batch/validate",
        multipart(&[("file", Some("codes.csv"), SHEET)]),
    )
    .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(report["valid"], 2);
    assert_eq!(report["rejected"], 1);
    assert_eq!(report["rows"][0]["type"], "url");
    assert_eq!(report["rows"][0]["payload"], "https://example.com");
    assert_eq!(report["rows"][1]["type"], Value::Null);
    assert_eq!(report["rows"][1]["errors"][0]["field"], "type");
}

#[actix_web::test]
async fn validate_without_file_is_a_bad_request() {
    let (state, coordinator) = app_state().await;
    let app = batch_app!(state, coordinator);

    let req = multipart_request("/api/batch/validate", multipart(&[("json", None, "{}")])).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn started_job_can_be_downloaded() {
    let (state, coordinator) = app_state().await;
    let app = batch_app!(state, coordinator);

    let req = multipart_request(
        "/api/batch/start",
        multipart(&[
            ("json", None, r#"{"format":"svg","options":{"size":100,"chunk":1}}"#),
            ("file", Some("menu.csv"), SHEET),
        ]),
    )
    .to_request();
    let started: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(started["valid"], 2);
    assert_eq!(started["rejected"], 1);
    let job_id = started["job_id"].as_str().unwrap().to_string();

    let mut status = Value::Null;
    for _ in 0..500 {
        let req = test::TestRequest::get()
            .uri(&format!("/api/batch/status/{job_id}"))
            .to_request();
        status = test::call_and_read_body_json(&app, req).await;
        if status.get("Completed").is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(status["Completed"]["entries"], 2);

    let req = test::TestRequest::get()
        .uri(&format!("/api/batch/download/{job_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap(), "application/zip");
    let disposition = resp.headers().get(CONTENT_DISPOSITION).unwrap().to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"menu-"), "{disposition}");
    assert!(disposition.ends_with(".zip\""), "{disposition}");

    let body = test::read_body(resp).await;
    let zip = ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
    let names: Vec<&str> = zip.file_names().collect();
    assert!(names.contains(&"0001_url_home.svg"));
    assert!(names.contains(&"0003_url_docs.svg"));
}

#[actix_web::test]
async fn start_with_only_invalid_rows_is_a_bad_request() {
    let (state, coordinator) = app_state().await;
    let app = batch_app!(state, coordinator);

    let req = multipart_request(
        "/api/batch/start",
        multipart(&[
            ("json", None, r#"{"format":"png"}"#),
            ("file", Some("bad.csv"), "type,text\nfax,hello\n"),
        ]),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(state.jobs.read().await.is_empty());
}

#[actix_web::test]
async fn unknown_and_unfinished_jobs() {
    let (state, coordinator) = app_state().await;
    state
        .jobs
        .write()
        .await
        .insert("pending".to_string(), JobRecord::pending("x-2024-01-01.zip".to_string()));
    let app = batch_app!(state, coordinator);

    let req = test::TestRequest::get().uri("/api/batch/status/nope").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/batch/download/nope").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/batch/status/pending").to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status, "Pending");

    let req = test::TestRequest::get().uri("/api/batch/download/pending").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
}
