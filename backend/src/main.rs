use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use qrbatch::config::ServerConfig;
use qrbatch::job_controller::coordinator::BatchCoordinator;
use qrbatch::job_controller::state::{start_job_updater, JobsState};
use qrbatch::job_controller;
use qrbatch::services;
use qrbatch::worker::render::QrCodeRenderer;
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e));
        }
    };

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new();
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        start_job_updater(updater_state, rx).await;
    });

    let coordinator = web::Data::new(BatchCoordinator::create(Arc::new(QrCodeRenderer)));
    job_controller::connect(&coordinator, &jobs_state).await;

    let bind = (config.host.clone(), config.port);
    info!("Server running at http://{}:{}", bind.0, bind.1);

    let server_coordinator = coordinator.clone();
    let server_config = web::Data::new(config.clone());
    let result = HttpServer::new(move || {
        App::new()
            .app_data(web::PayloadConfig::default().limit(config.max_upload_bytes))
            .app_data(web::JsonConfig::default().limit(config.max_upload_bytes))
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(server_coordinator.clone())
            .app_data(server_config.clone())
            .service(services::batch::configure_routes())
    })
    .bind(bind)?
    .run()
    .await;

    coordinator.dispose().await;
    result
}
