use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::info;

use crate::{
    error::AppError,
    model::attendance::EventKind,
    models::{CheckEventReq, DeleteReq},
    service::attendance::AttendanceService,
};

/// Records a check-in made inside the facility radius.
#[utoipa::path(
    post,
    path = "/in",
    request_body = CheckEventReq,
    responses(
        (status = 200, description = "Checked in", body = Object, example = json!({
            "msg": "Check in ✅", "code": 200, "data": []
        })),
        (status = 400, description = "Missing or malformed fields"),
        (status = 403, description = "Outside the facility geofence"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "msg": "Already checked in", "code": 409
        }))
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    service: web::Data<AttendanceService>,
    payload: web::Json<CheckEventReq>,
) -> Result<HttpResponse, AppError> {
    record_event(EventKind::In, service, payload.into_inner()).await
}

/// Closes the open check-in for the same name and date.
#[utoipa::path(
    post,
    path = "/out",
    request_body = CheckEventReq,
    responses(
        (status = 200, description = "Checked out", body = Object, example = json!({
            "msg": "Check out ✅ Go home", "code": 200, "data": []
        })),
        (status = 400, description = "Missing or malformed fields"),
        (status = 403, description = "Outside the facility geofence"),
        (status = 409, description = "No open session for today", body = Object, example = json!({
            "msg": "Check-in required first", "code": 409
        }))
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    service: web::Data<AttendanceService>,
    payload: web::Json<CheckEventReq>,
) -> Result<HttpResponse, AppError> {
    record_event(EventKind::Out, service, payload.into_inner()).await
}

async fn record_event(
    kind: EventKind,
    service: web::Data<AttendanceService>,
    req: CheckEventReq,
) -> Result<HttpResponse, AppError> {
    let records = web::block(move || service.check_event(kind, &req)).await??;

    let msg = match kind {
        EventKind::In => "Check in ✅",
        EventKind::Out => "Check out ✅ Go home",
    };

    Ok(HttpResponse::Ok().json(json!({
        "msg": msg,
        "code": 200,
        "data": records
    })))
}

/// Delete every record matching name, date and type
#[utoipa::path(
    post,
    path = "/delete",
    request_body = DeleteReq,
    responses(
        (status = 200, description = "Matching records removed", body = Object, example = json!({
            "msg": "deleted", "code": 200, "removed": 1, "data": []
        })),
        (status = 400, description = "Missing fields or unknown type")
    ),
    tag = "Attendance"
)]
pub async fn delete_records(
    service: web::Data<AttendanceService>,
    payload: web::Json<DeleteReq>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    let (removed, remaining) = web::block(move || service.delete_matching(&req)).await??;

    info!(removed, remaining = remaining.len(), "Delete request served");

    Ok(HttpResponse::Ok().json(json!({
        "msg": "deleted",
        "code": 200,
        "removed": removed,
        "data": remaining
    })))
}
