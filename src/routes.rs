use crate::{
    api::{attendance, report},
    auth::handlers,
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, get, web};
use std::sync::Arc;

#[get("/")]
async fn index() -> impl Responder {
    "welcome to Attendance app"
}

async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("route not found".into()))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Refills one request every `60s / requests_per_min`, bursting up to a full minute.
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let burst = requests_per_min.max(1);
        let per_ms = 60_000 / burst as u64;
        let cfg = GovernorConfigBuilder::default()
            .milliseconds_per_request(per_ms.max(1))
            .burst_size(burst)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("period and burst are both non-zero");
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));

    // Bodies are fully buffered by the extractors; decode failures surface as 400 {msg, code}
    cfg.app_data(
        web::JsonConfig::default()
            .content_type_required(false)
            .error_handler(|err, _req| {
                AppError::validation(format!("Invalid JSON body: {err}")).into()
            }),
    )
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid query string: {err}")).into()
    }));

    cfg.service(index);

    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter)
                    .route(web::post().to(handlers::register)),
            ),
    );

    cfg.service(web::resource("/in").route(web::post().to(attendance::check_in)))
        .service(web::resource("/out").route(web::post().to(attendance::check_out)))
        .service(web::resource("/delete").route(web::post().to(attendance::delete_records)))
        .service(web::resource("/report").route(web::get().to(report::report)))
        .service(web::resource("/report/daily").route(web::get().to(report::daily_report)))
        .service(web::resource("/summary").route(web::get().to(report::summary)));

    cfg.default_service(web::to(not_found));
}
