use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::{
    error::AppError,
    model::{
        attendance::{AttendanceRecord, EventKind},
        user::User,
    },
    models::{CheckEventReq, DeleteReq, LoginReqDto, RegisterReq},
    service::report::{RAW_COLUMNS, to_csv},
    store::{Collection, RecordStore},
    utils::geofence::{Facility, Point},
};

/// Registration, login and the check-in/check-out rules.
///
/// A person has at most one open session per day. Nothing is kept between
/// calls: the state of a day is re-derived from the stored records each time.
#[derive(Clone)]
pub struct AttendanceService {
    store: RecordStore,
    facility: Facility,
}

impl AttendanceService {
    pub fn new(store: RecordStore, facility: Facility) -> Self {
        Self { store, facility }
    }

    pub fn facility(&self) -> Facility {
        self.facility
    }

    #[instrument(name = "register", skip_all)]
    pub fn register(&self, req: RegisterReq) -> Result<User, AppError> {
        let (Some(name), Some(email), Some(password)) = (
            present(&req.name),
            present(&req.email),
            present(&req.password),
        ) else {
            return Err(AppError::validation("name, email and password are required"));
        };

        let mut users: Vec<User> = self.store.load(Collection::Users)?;

        if users.iter().any(|u| u.email == email) {
            info!(email, "Registration rejected: email taken");
            return Err(AppError::Conflict("Email already registered".into()));
        }

        let user = User {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            extra: req.extra,
        };

        users.push(user.clone());
        self.store.save_all(Collection::Users, &users)?;

        info!(email, total = users.len(), "User registered");
        Ok(user)
    }

    /// Plaintext comparison against the stored credentials.
    #[instrument(name = "login", skip_all)]
    pub fn login(&self, req: &LoginReqDto) -> Result<User, AppError> {
        let (Some(email), Some(password)) = (present(&req.email), present(&req.password)) else {
            return Err(AppError::validation("email and password are required"));
        };

        let users: Vec<User> = self.store.load(Collection::Users)?;

        users
            .into_iter()
            .find(|u| u.email == email && u.password == password)
            .ok_or_else(|| {
                debug!(email, "No matching credentials");
                AppError::NotFound("User not registered".into())
            })
    }

    /// Validates and appends a check-in or check-out. Returns the whole
    /// collection after the append.
    #[instrument(name = "check_event", skip_all, fields(kind = %kind))]
    pub fn check_event(
        &self,
        kind: EventKind,
        req: &CheckEventReq,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        // Coordinates first: an out-of-fence request is refused before anything else is looked at.
        let point = Point {
            lat: coordinate(&req.lat, "lat", 90.0)?,
            lng: coordinate(&req.lng, "lng", 180.0)?,
        };

        let distance = self.facility.distance_to(point);
        if !self.facility.contains(point) {
            info!(distance, radius = self.facility.radius_m, "Outside geofence");
            return Err(AppError::Geofence(format!(
                "Outside the facility: {} m away, allowed {} m",
                distance.round(),
                self.facility.radius_m
            )));
        }

        let name = present(&req.name).ok_or_else(|| AppError::validation("name is required"))?;
        let date = valid_date(present(&req.date))?;
        let now = valid_time(present(&req.now))?;

        let mut records: Vec<AttendanceRecord> = self.store.load(Collection::Attendance)?;

        let day = records.iter().filter(|r| r.is_for(name, date));
        let (mut has_in, mut has_out) = (false, false);
        for r in day {
            match r.kind {
                EventKind::In => has_in = true,
                EventKind::Out => has_out = true,
            }
        }

        match kind {
            EventKind::In if has_in => return Err(AppError::state("Already checked in")),
            EventKind::Out if !has_in => return Err(AppError::state("Check-in required first")),
            EventKind::Out if has_out => return Err(AppError::state("Already checked out")),
            _ => {}
        }

        records.push(AttendanceRecord {
            name: name.to_string(),
            date: date.to_string(),
            now: now.to_string(),
            kind,
            lat: point.lat,
            lng: point.lng,
            distance: distance.round() as u64,
        });
        self.store.save_all(Collection::Attendance, &records)?;

        info!(name, date, now, distance, "Attendance recorded");
        Ok(records)
    }

    /// Removes every record matching (name, date, type) and regenerates the
    /// CSV report from what is left.
    #[instrument(name = "delete_matching", skip_all)]
    pub fn delete_matching(
        &self,
        req: &DeleteReq,
    ) -> Result<(usize, Vec<AttendanceRecord>), AppError> {
        let (Some(name), Some(date), Some(kind)) =
            (present(&req.name), present(&req.date), present(&req.kind))
        else {
            return Err(AppError::validation("name, date and type are required"));
        };
        let kind = EventKind::from_str(kind)
            .map_err(|_| AppError::validation("type must be \"in\" or \"out\""))?;

        let mut records: Vec<AttendanceRecord> = self.store.load(Collection::Attendance)?;
        let before = records.len();
        records.retain(|r| !r.matches(name, date, kind));
        let removed = before - records.len();

        self.store.save_all(Collection::Attendance, &records)?;
        self.store.write_report(&to_csv(&records, RAW_COLUMNS))?;

        info!(name, date, kind = %kind, removed, "Records deleted");
        Ok((removed, records))
    }
}

/// Trimmed, non-empty value of an optional field.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn coordinate(value: &Option<Value>, field: &str, limit: f64) -> Result<f64, AppError> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite() && v.abs() <= limit)
        .ok_or_else(|| AppError::validation(format!("{field} must be a number")))
}

/// Dates must be zero-padded ISO so string ordering matches calendar ordering.
fn valid_date(date: Option<&str>) -> Result<&str, AppError> {
    let date = date.ok_or_else(|| AppError::validation("date is required"))?;
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) if d.format("%Y-%m-%d").to_string() == date => Ok(date),
        _ => Err(AppError::validation("date must be YYYY-MM-DD")),
    }
}

fn valid_time(now: Option<&str>) -> Result<&str, AppError> {
    let now = now.ok_or_else(|| AppError::validation("time is required"))?;
    match NaiveTime::parse_from_str(now, "%H:%M") {
        Ok(t) if t.format("%H:%M").to_string() == now => Ok(now),
        _ => Err(AppError::validation("time must be HH:MM")),
    }
}
