use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailySummary {
    pub name: String,
    pub date: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub working_hours: f64,
    pub late: bool,
    pub early_leave: bool,
}

impl DailySummary {
    pub fn is_complete(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_some()
    }
}

/// Per-person totals over a calendar month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct MonthlySummary {
    /// days with both a check-in and a check-out
    pub days: u32,
    pub total_hours: f64,
    pub late: u32,
    pub early: u32,
}
