use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    error::AppError,
    models::{LoginReqDto, RegisterReq},
    service::attendance::AttendanceService,
};

/// Stores a new user once the required fields are present and the email is unused.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body(
        content = Object,
        description = "name, email and password are required; other fields are kept as sent",
        content_type = "application/json",
        example = json!({
            "name": "A",
            "email": "a@lab.test",
            "password": "secret",
            "department": "chemistry"
        })
    ),
    responses(
        (status = 200, description = "User stored", body = Object, example = json!({
            "msg": "registered successfully",
            "code": 200,
            "data": { "name": "A", "email": "a@lab.test", "password": "secret" }
        })),
        (status = 400, description = "name, email or password missing"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    payload: web::Json<RegisterReq>,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    let user = web::block(move || service.register(req)).await??;

    Ok(HttpResponse::Ok().json(json!({
        "msg": "registered successfully",
        "code": 200,
        "data": user
    })))
}

/// Login handler. Returns the stored user record on a credential match.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Credentials matched", body = Object, example = json!({
            "msg": "welcome back",
            "code": 200,
            "data": { "name": "A", "email": "a@lab.test", "password": "secret" }
        })),
        (status = 400, description = "email or password missing"),
        (status = 404, description = "User not registered")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(payload, service),
    fields(email = payload.email.as_deref().unwrap_or(""))
)]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let req = payload.into_inner();
    let user = web::block(move || service.login(&req)).await??;

    info!("Login successful");

    Ok(HttpResponse::Ok().json(json!({
        "msg": "welcome back",
        "code": 200,
        "data": user
    })))
}
