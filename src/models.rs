use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

/// Registration body. Documented as a free-form object since extra fields pass through.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Any other profile fields are stored as sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "a@lab.test")]
    pub email: Option<String>,
    #[schema(example = "secret")]
    pub password: Option<String>,
}

/// Body of `/in` and `/out`. Coordinates may arrive as numbers or numeric strings.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckEventReq {
    #[schema(example = "A")]
    pub name: Option<String>,
    #[schema(example = "2024-01-01")]
    pub date: Option<String>,
    #[serde(alias = "time")]
    #[schema(example = "09:00")]
    pub now: Option<String>,
    #[schema(value_type = Option<f64>, example = 25.58883)]
    pub lat: Option<Value>,
    #[schema(value_type = Option<f64>, example = 56.26589)]
    pub lng: Option<Value>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeleteReq {
    #[schema(example = "A")]
    pub name: Option<String>,
    #[schema(example = "2024-01-01")]
    pub date: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "in")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    /// Inclusive lower bound, YYYY-MM-DD
    #[schema(example = "2024-01-01")]
    pub start: Option<String>,
    /// Inclusive upper bound, YYYY-MM-DD
    #[schema(example = "2024-01-31")]
    pub end: Option<String>,
    /// YYYY-MM; takes precedence over start/end
    #[schema(example = "2024-01")]
    pub month: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    #[schema(example = "2024-01")]
    pub month: Option<String>,
}
