use crate::model::attendance::{AttendanceRecord, EventKind};
use crate::model::summary::{DailySummary, MonthlySummary};
use crate::models::{CheckEventReq, DeleteReq, LoginReqDto, ReportQuery, SummaryQuery};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance API",
        version = "0.1.0",
        description = r#"
## Geofenced attendance tracker

Employees check in and out from their phones; an event is accepted only when
the reported coordinates fall inside the facility radius.

### 🔹 Key Features
- **Registration / Login** with plaintext credential match
- **Check-in / Check-out**, one session per person per day
- **Reports**: raw CSV, daily summary CSV, monthly JSON aggregate

### 📦 Response Format
- JSON bodies shaped `{msg, code, ...}`; errors are `{msg, code}`
- CSV downloads as attachments
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::delete_records,

        crate::api::report::report,
        crate::api::report::daily_report,
        crate::api::report::summary
    ),
    components(
        schemas(
            LoginReqDto,
            CheckEventReq,
            DeleteReq,
            ReportQuery,
            SummaryQuery,
            AttendanceRecord,
            EventKind,
            DailySummary,
            MonthlySummary
        )
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Attendance", description = "Check-in, check-out and record deletion"),
        (name = "Report", description = "CSV reports and monthly summaries"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let routes = [
            "/auth/register",
            "/auth/login",
            "/in",
            "/out",
            "/delete",
            "/report",
            "/report/daily",
            "/summary",
        ];
        for path in routes {
            assert!(doc.paths.paths.contains_key(path), "{path} missing from OpenAPI");
        }
    }
}
