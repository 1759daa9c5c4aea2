use actix_web::{HttpResponse, http::header, web};
use serde_json::json;

use crate::{
    error::AppError,
    models::{ReportQuery, SummaryQuery},
    service::report::ReportBuilder,
};

fn csv_attachment(body: String, filename: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
        ))
        .body(body)
}

/// Raw check-in/out events as CSV
#[utoipa::path(
    get,
    path = "/report",
    params(ReportQuery),
    responses(
        (
            status = 200,
            description = "CSV attachment: name,date,time,type",
            content_type = "text/csv",
            body = String
        ),
        (status = 400, description = "Malformed month"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn report(
    reports: web::Data<ReportBuilder>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let csv = web::block(move || reports.raw_report(&query)).await??;
    Ok(csv_attachment(csv, "attendance_report.csv"))
}

/// One row per person and day with hours worked and late/early flags
#[utoipa::path(
    get,
    path = "/report/daily",
    params(ReportQuery),
    responses(
        (
            status = 200,
            description = "CSV attachment of daily summaries",
            content_type = "text/csv",
            body = String
        ),
        (status = 400, description = "Malformed month"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn daily_report(
    reports: web::Data<ReportBuilder>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let csv = web::block(move || reports.daily_report(&query)).await??;
    Ok(csv_attachment(csv, "daily_report.csv"))
}

/// Monthly totals per person
#[utoipa::path(
    get,
    path = "/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Aggregates keyed by name", body = Object, example = json!({
            "msg": "monthly summary",
            "code": 200,
            "month": "2024-01",
            "data": { "A": { "days": 1, "total_hours": 7.83, "late": 1, "early": 0 } }
        })),
        (status = 400, description = "Missing or malformed month"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn summary(
    reports: web::Data<ReportBuilder>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse, AppError> {
    let month = query
        .into_inner()
        .month
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::validation("month is required (YYYY-MM)"))?;

    let policy = reports.policy();
    let lookup = month.clone();
    let data = web::block(move || reports.monthly_summary(&lookup)).await??;

    Ok(HttpResponse::Ok().json(json!({
        "msg": "monthly summary",
        "code": 200,
        "month": month,
        "policy": {
            "work_start": policy.work_start.format("%H:%M").to_string(),
            "work_end": policy.work_end.format("%H:%M").to_string(),
            "late_after": policy.late_after.format("%H:%M").to_string(),
            "early_before": policy.early_before.format("%H:%M").to_string(),
        },
        "data": data
    })))
}
