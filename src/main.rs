use actix_web::middleware::{Logger, NormalizePath, from_fn};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod docs;
mod error;
mod middleware;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use store::init_store;

use crate::docs::ApiDoc;
use crate::middleware::cors_middleware;
use crate::service::{attendance::AttendanceService, report::ReportBuilder};
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // app.log under LOG_DIR, rotated daily; `_guard` flushes it when main returns
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store = init_store(&config)?;
    let attendance = Data::new(AttendanceService::new(store.clone(), config.facility));
    let reports = Data::new(ReportBuilder::new(store, config.work));

    let facility = attendance.facility();
    info!(
        lat = facility.lat,
        lng = facility.lng,
        radius_m = facility.radius_m,
        data_dir = %config.data_dir.display(),
        "Facility geofence loaded"
    );

    let server_addr = config.server_addr();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(cors_middleware))
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(attendance.clone())
            .app_data(reports.clone())
            .configure(|cfg| routes::configure(cfg, &config_data))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
