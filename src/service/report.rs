use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, instrument};

use crate::{
    config::WorkPolicy,
    error::AppError,
    model::{
        attendance::{AttendanceRecord, EventKind},
        summary::{DailySummary, MonthlySummary},
    },
    models::ReportQuery,
    store::{Collection, RecordStore},
};

/// Columns of the raw event report.
pub const RAW_COLUMNS: &[&str] = &["name", "date", "time", "type"];

/// Columns of the per-day summary report.
pub const DAILY_COLUMNS: &[&str] = &[
    "name",
    "date",
    "check_in",
    "check_out",
    "working_hours",
    "late",
    "early_leave",
];

/// A row that can be rendered into a CSV line by column name.
pub trait CsvRow {
    /// Unknown columns render as an empty field.
    fn field(&self, column: &str) -> String;
}

impl CsvRow for AttendanceRecord {
    fn field(&self, column: &str) -> String {
        match column {
            "name" => self.name.clone(),
            "date" => self.date.clone(),
            "time" | "now" => self.now.clone(),
            "type" => self.kind.to_string(),
            "lat" => self.lat.to_string(),
            "lng" => self.lng.to_string(),
            "distance" => self.distance.to_string(),
            _ => String::new(),
        }
    }
}

impl CsvRow for DailySummary {
    fn field(&self, column: &str) -> String {
        match column {
            "name" => self.name.clone(),
            "date" => self.date.clone(),
            "check_in" => self.check_in.clone().unwrap_or_default(),
            "check_out" => self.check_out.clone().unwrap_or_default(),
            "working_hours" => format!("{:.2}", self.working_hours),
            "late" => self.late.to_string(),
            "early_leave" => self.early_leave.to_string(),
            _ => String::new(),
        }
    }
}

/// Header line, then one comma-joined line per row. Values are not escaped.
pub fn to_csv<R: CsvRow>(rows: &[R], columns: &[&str]) -> String {
    let mut out = columns.join(",");
    out.push('\n');
    for row in rows {
        let line: Vec<String> = columns.iter().map(|c| row.field(c)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Inclusive bounds; ISO dates order correctly as strings.
pub fn filter_by_range(
    records: &[AttendanceRecord],
    start: Option<&str>,
    end: Option<&str>,
) -> Vec<AttendanceRecord> {
    records
        .iter()
        .filter(|r| start.is_none_or(|s| r.date.as_str() >= s))
        .filter(|r| end.is_none_or(|e| r.date.as_str() <= e))
        .cloned()
        .collect()
}

pub fn filter_by_month(records: &[AttendanceRecord], month: &str) -> Vec<AttendanceRecord> {
    records
        .iter()
        .filter(|r| r.date.starts_with(month))
        .cloned()
        .collect()
}

/// A person's records for one day, keyed by (name, date).
pub type DayGroup = ((String, String), Vec<AttendanceRecord>);

/// Groups keep the order in which each (name, date) first appears.
pub fn group_by_person_day(records: &[AttendanceRecord]) -> Vec<DayGroup> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<DayGroup> = Vec::new();

    for record in records {
        let key = (record.name.clone(), record.date.clone());
        match index.get(&key) {
            Some(&i) => groups[i].1.push(record.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![record.clone()]));
            }
        }
    }

    groups
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `YYYY-MM`, month 01..=12.
fn valid_month(month: &str) -> bool {
    month.len() == 7 && NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").is_ok()
}

/// Applies `month` when given (validated), otherwise the inclusive `start`/`end` range.
pub fn select_from(
    records: &[AttendanceRecord],
    query: &ReportQuery,
) -> Result<Vec<AttendanceRecord>, AppError> {
    match query.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        Some(month) if !valid_month(month) => Err(AppError::validation("month must be YYYY-MM")),
        Some(month) => Ok(filter_by_month(records, month)),
        None => Ok(filter_by_range(
            records,
            query.start.as_deref().filter(|s| !s.is_empty()),
            query.end.as_deref().filter(|s| !s.is_empty()),
        )),
    }
}

/// Daily and monthly aggregation plus the CSV artifacts written to disk.
#[derive(Clone)]
pub struct ReportBuilder {
    store: RecordStore,
    policy: WorkPolicy,
}

impl ReportBuilder {
    pub fn new(store: RecordStore, policy: WorkPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> WorkPolicy {
        self.policy
    }

    /// First `in` and first `out` of the group win; later duplicates are ignored.
    pub fn build_daily_summary(
        &self,
        key: &(String, String),
        group: &[AttendanceRecord],
    ) -> DailySummary {
        let first = |kind: EventKind| {
            group
                .iter()
                .find(|r| r.kind == kind)
                .and_then(|r| parse_time(&r.now).map(|t| (r.now.clone(), t)))
        };
        let check_in = first(EventKind::In);
        let check_out = first(EventKind::Out);

        let working_hours = match (&check_in, &check_out) {
            (Some((_, t_in)), Some((_, t_out))) => {
                let secs = (*t_out - *t_in).num_seconds().max(0);
                round2(secs as f64 / 3600.0)
            }
            _ => 0.0,
        };

        DailySummary {
            name: key.0.clone(),
            date: key.1.clone(),
            late: check_in
                .as_ref()
                .is_some_and(|(_, t)| *t > self.policy.late_after),
            early_leave: check_out
                .as_ref()
                .is_some_and(|(_, t)| *t < self.policy.early_before),
            check_in: check_in.map(|(raw, _)| raw),
            check_out: check_out.map(|(raw, _)| raw),
            working_hours,
        }
    }

    pub fn build_daily_summaries(&self, records: &[AttendanceRecord]) -> Vec<DailySummary> {
        group_by_person_day(records)
            .iter()
            .map(|(key, group)| self.build_daily_summary(key, group))
            .collect()
    }

    /// Only days with both legs count toward `days`.
    pub fn build_monthly_summary(&self, groups: &[DayGroup]) -> BTreeMap<String, MonthlySummary> {
        let mut totals: BTreeMap<String, MonthlySummary> = BTreeMap::new();

        for (key, group) in groups {
            let day = self.build_daily_summary(key, group);
            let entry = totals.entry(day.name.clone()).or_default();
            if day.is_complete() {
                entry.days += 1;
            }
            entry.total_hours += day.working_hours;
            entry.late += u32::from(day.late);
            entry.early += u32::from(day.early_leave);
        }

        for summary in totals.values_mut() {
            summary.total_hours = round2(summary.total_hours);
        }
        totals
    }

    /// Loads the collection and applies `month`, or else `start`/`end`.
    pub fn select(&self, query: &ReportQuery) -> Result<Vec<AttendanceRecord>, AppError> {
        let records: Vec<AttendanceRecord> = self.store.load(Collection::Attendance)?;
        select_from(&records, query)
    }

    /// Raw event CSV for the query. The report file always receives the
    /// whole collection, whatever the filter, before the response is built.
    #[instrument(name = "raw_report", skip_all)]
    pub fn raw_report(&self, query: &ReportQuery) -> Result<String, AppError> {
        let records: Vec<AttendanceRecord> = self.store.load(Collection::Attendance)?;
        let selected = select_from(&records, query)?;

        self.store.write_report(&to_csv(&records, RAW_COLUMNS))?;
        debug!(rows = records.len(), "Raw report written");

        Ok(to_csv(&selected, RAW_COLUMNS))
    }

    /// Per-day CSV. Returned only; the report file is left alone.
    #[instrument(name = "daily_report", skip_all)]
    pub fn daily_report(&self, query: &ReportQuery) -> Result<String, AppError> {
        let records = self.select(query)?;
        let days = self.build_daily_summaries(&records);
        debug!(rows = days.len(), "Daily report built");
        Ok(to_csv(&days, DAILY_COLUMNS))
    }

    #[instrument(name = "monthly_summary", skip(self))]
    pub fn monthly_summary(
        &self,
        month: &str,
    ) -> Result<BTreeMap<String, MonthlySummary>, AppError> {
        let query = ReportQuery {
            month: Some(month.to_string()),
            ..Default::default()
        };
        let records = self.select(&query)?;
        Ok(self.build_monthly_summary(&group_by_person_day(&records)))
    }
}
